use serde::{Deserialize, Serialize};

/// Where to send a check's passing/failing transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    /// Empty for tenant-wide defaults
    #[serde(skip_serializing_if = "String::is_empty")]
    pub check_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Notification {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self { check_id: String::new(), kind: kind.into(), value: value.into() }
    }

    /// Both `type` and `value` are set; anything else is never created.
    pub fn is_deliverable(&self) -> bool {
        !self.kind.is_empty() && !self.value.is_empty()
    }

    /// Read a loosely typed `{type, value}` object. Missing or non-string
    /// fields read as empty.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let field = |name: &str| value.get(name).and_then(|v| v.as_str()).unwrap_or_default();
        Self::new(field("type"), field("value"))
    }
}

/// Notifications to create for one check in a bulk request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBatch {
    #[serde(rename = "check-id")]
    pub check_id: String,
    pub notifications: Vec<Notification>,
}
