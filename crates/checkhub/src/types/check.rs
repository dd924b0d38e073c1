use std::fmt;

use serde::{Deserialize, Serialize};

use super::notification::Notification;
use super::payload::CheckSpec;
use super::result::CheckResult;
use crate::registry::Envelope;

/// Kind of thing a check targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[serde(rename = "dbinstance")]
    DbInstance,
    Instance,
    #[serde(rename = "asg")]
    AutoscalingGroup,
    #[serde(rename = "sg")]
    SecurityGroup,
    #[serde(rename = "elb")]
    LoadBalancer,
    Host,
    EcsService,
    /// A third-party host, checked by the shared executor pool
    ExternalHost,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::DbInstance => "dbinstance",
            TargetType::Instance => "instance",
            TargetType::AutoscalingGroup => "asg",
            TargetType::SecurityGroup => "sg",
            TargetType::LoadBalancer => "elb",
            TargetType::Host => "host",
            TargetType::EcsService => "ecs_service",
            TargetType::ExternalHost => "external_host",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resource a check points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TargetType,
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assertion {
    pub key: String,
    pub value: String,
    pub relationship: String,
    pub operand: String,
}

/// A monitoring check definition.
///
/// `check_spec` is the spec as the check service stores it; `spec` is the
/// decoded form. `results` and `notifications` are attached at read time and
/// never written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Check {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    /// Seconds between runs
    pub interval: u32,
    pub target: Option<Target>,
    pub assertions: Vec<Assertion>,
    pub min_failing_count: u32,
    pub min_failing_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<CheckSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_spec: Option<Envelope>,
    pub results: Vec<CheckResult>,
    pub notifications: Vec<Notification>,
}

impl Check {
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    /// Check the fields a write needs: a target and a spec in either form.
    pub fn validate(&self) -> Result<(), String> {
        if self.target.is_none() {
            return Err("check is missing a target".to_string());
        }

        if self.spec.is_none() && self.check_spec.is_none() {
            return Err("check is missing a spec".to_string());
        }

        Ok(())
    }

    /// Encode `spec` into `check_spec`, the form the check service stores.
    ///
    /// A decoded spec always wins over an envelope carried along from a
    /// previous read. The envelope is kept only when there is no `spec`.
    pub fn ensure_envelope(&mut self) -> Result<(), serde_json::Error> {
        if let Some(spec) = &self.spec {
            self.check_spec = Some(spec.to_envelope()?);
        }
        Ok(())
    }
}
