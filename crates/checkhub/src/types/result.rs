use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::check::Target;
use super::payload::CheckReply;
use crate::registry::Envelope;

/// Outcome of probing one target during a check run.
///
/// `response` is the enveloped reply as the result service stores it, `reply`
/// the decoded form. Either may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub target: Target,
    pub passing: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Envelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<CheckReply>,
}

impl CheckResponse {
    pub fn new(target: Target, passing: bool) -> Self {
        Self { target, passing, error: String::new(), response: None, reply: None }
    }
}

/// One execution of a check at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub check_name: String,
    pub timestamp: DateTime<Utc>,
    pub passing: bool,
    #[serde(default)]
    pub responses: Vec<CheckResponse>,
}

impl CheckResult {
    pub fn passing_responses(&self) -> impl Iterator<Item = &CheckResponse> {
        self.responses.iter().filter(|response| response.passing)
    }

    pub fn failing_responses(&self) -> impl Iterator<Item = &CheckResponse> {
        self.responses.iter().filter(|response| !response.passing)
    }

    pub fn passing_count(&self) -> usize {
        self.passing_responses().count()
    }

    pub fn failing_count(&self) -> usize {
        self.failing_responses().count()
    }

    pub fn targets(&self) -> Vec<&Target> {
        self.responses.iter().map(|response| &response.target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::check::TargetType;

    fn target(id: &str) -> Target {
        Target { name: id.to_string(), kind: TargetType::Instance, id: id.to_string() }
    }

    #[test]
    fn test_passing_and_failing_counts() {
        let result = CheckResult {
            check_id: "c1".to_string(),
            customer_id: "t1".to_string(),
            check_name: "web".to_string(),
            timestamp: Utc::now(),
            passing: false,
            responses: vec![
                CheckResponse::new(target("i-1"), true),
                CheckResponse::new(target("i-2"), false),
                CheckResponse::new(target("i-3"), true),
            ],
        };

        assert_eq!(result.passing_count(), 2);
        assert_eq!(result.failing_count(), 1);
        assert_eq!(result.failing_responses().next().unwrap().target.id, "i-2");
        let ids: Vec<_> = result.targets().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["i-1", "i-2", "i-3"]);
    }
}
