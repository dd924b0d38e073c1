use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::Resolver;
use crate::error::{Error, Result};
use crate::registry::{reply_registry, spec_registry};
use crate::types::{Check, CheckResult, Notification, User};

/// Output of one best-effort fetch. Each task produces exactly one.
enum Attachment {
    Results(anyhow::Result<Vec<CheckResult>>),
    Notifications(anyhow::Result<Vec<Notification>>),
}

impl Resolver {
    /// Fetch checks together with their results and notifications.
    ///
    /// Checks come from the check service and must succeed. Results and
    /// notifications are fetched concurrently on their own tasks; if either
    /// fails the checks are returned without that attachment. A payload that
    /// carries a known tag but does not decode fails the whole call.
    pub async fn list_checks(&self, user: &User, check_id: Option<&str>) -> Result<Vec<Check>> {
        info!(customer_id = %user.customer_id, email = %user.email, check_id, "list checks request");

        // Dropping the set aborts whatever is still running.
        let mut attachments = JoinSet::new();

        {
            let results = Arc::clone(&self.results);
            let user = user.clone();
            let check_id = check_id.map(str::to_owned);
            attachments.spawn(async move {
                let fetched = match &check_id {
                    Some(id) => results.list_results_for_check(&user, id).await,
                    None => results.list_results(&user).await,
                };
                Attachment::Results(fetched)
            });
        }

        {
            let notifications = Arc::clone(&self.notifications);
            let user = user.clone();
            let check_id = check_id.map(str::to_owned);
            attachments.spawn(async move {
                let fetched = match &check_id {
                    Some(id) => notifications.list_notifications_for_check(&user, id).await,
                    None => notifications.list_notifications(&user).await,
                };
                Attachment::Notifications(fetched)
            });
        }

        let fetched = match check_id {
            Some(id) => self.checks.get_check(user, id).await.map(|check| vec![check]),
            None => self.checks.list_checks(user).await,
        };

        let mut checks = match fetched {
            Ok(checks) => checks,
            Err(e) => {
                error!(customer_id = %user.customer_id, "couldn't list checks: {:#}", e);
                return Err(Error::Source(e));
            }
        };

        let mut results = Vec::new();
        let mut notifications = Vec::new();

        while let Some(joined) = attachments.join_next().await {
            match joined {
                Ok(Attachment::Results(Ok(fetched))) => results = fetched,
                Ok(Attachment::Results(Err(e))) => {
                    warn!(customer_id = %user.customer_id, "couldn't list results, returning checks without them: {:#}", e);
                }
                Ok(Attachment::Notifications(Ok(fetched))) => notifications = fetched,
                Ok(Attachment::Notifications(Err(e))) => {
                    warn!(customer_id = %user.customer_id, "couldn't list notifications, returning checks without them: {:#}", e);
                }
                Err(e) => error!("attachment fetch task failed: {}", e),
            }
        }

        attach(&mut checks, results, notifications);
        decode_payloads(&mut checks)?;

        Ok(checks)
    }
}

/// Group by check id, keeping each group in delivery order.
fn group_by_check<T>(items: Vec<T>, check_id: impl Fn(&T) -> &str) -> HashMap<String, Vec<T>> {
    let mut grouped: HashMap<String, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(check_id(&item).to_string()).or_default().push(item);
    }
    grouped
}

fn attach(checks: &mut [Check], results: Vec<CheckResult>, notifications: Vec<Notification>) {
    let mut results = group_by_check(results, |result| result.check_id.as_str());
    let mut notifications = group_by_check(notifications, |notification| notification.check_id.as_str());

    for check in checks.iter_mut() {
        check.results = results.remove(&check.id).unwrap_or_default();
        check.notifications = notifications.remove(&check.id).unwrap_or_default();
    }
}

/// Decode every still-enveloped spec and reply in place.
fn decode_payloads(checks: &mut [Check]) -> Result<()> {
    for check in checks.iter_mut() {
        if check.spec.is_none() {
            if let Some(envelope) = &check.check_spec {
                check.spec = spec_registry().decode(envelope)?;
                if check.spec.is_none() {
                    debug!("check {} has unregistered spec type {}", check.id, envelope.type_url);
                }
            }
        }

        for result in check.results.iter_mut() {
            for response in result.responses.iter_mut() {
                if response.reply.is_some() {
                    continue;
                }
                if let Some(envelope) = &response.response {
                    response.reply = reply_registry().decode(envelope)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Envelope, encode};
    use crate::types::payload::{CheckReply, HttpCheck, HttpResponse};
    use crate::types::{CheckResponse, Target, TargetType};
    use chrono::Utc;

    fn result(check_id: &str, passing: bool) -> CheckResult {
        CheckResult {
            check_id: check_id.to_string(),
            customer_id: "t1".to_string(),
            check_name: String::new(),
            timestamp: Utc::now(),
            passing,
            responses: vec![],
        }
    }

    fn check(id: &str) -> Check {
        Check { id: id.to_string(), customer_id: "t1".to_string(), ..Default::default() }
    }

    #[test]
    fn test_attach_groups_in_delivery_order() {
        let mut checks = vec![check("c1"), check("c2"), check("c3")];
        let results = vec![result("c2", true), result("c1", false), result("c2", false), result("gone", true)];
        let mut email = Notification::new("email", "ops@example.com");
        email.check_id = "c1".to_string();

        attach(&mut checks, results, vec![email.clone()]);

        let passing: Vec<_> = checks[1].results.iter().map(|r| r.passing).collect();
        assert_eq!(passing, [true, false]);
        assert_eq!(checks[0].results.len(), 1);
        assert!(checks[2].results.is_empty());
        assert_eq!(checks[0].notifications, vec![email]);
        assert!(checks[1].notifications.is_empty());
    }

    #[test]
    fn test_decode_fills_spec_and_reply() {
        let target = Target { name: "web".into(), kind: TargetType::Host, id: "web".into() };
        let reply = HttpResponse { code: 503, ..Default::default() };

        let mut response = CheckResponse::new(target, false);
        response.response = Some(encode(&reply).unwrap());

        let mut c1 = check("c1");
        c1.check_spec = Some(encode(&HttpCheck { port: 8080, ..Default::default() }).unwrap());
        c1.results = vec![CheckResult { responses: vec![response], ..result("c1", false) }];

        let mut checks = vec![c1];
        decode_payloads(&mut checks).unwrap();

        assert!(matches!(checks[0].spec, Some(crate::types::CheckSpec::HttpCheck(ref h)) if h.port == 8080));
        assert_eq!(checks[0].results[0].responses[0].reply, Some(CheckReply::HttpResponse(reply)));
    }

    #[test]
    fn test_decode_leaves_unknown_tags_unset() {
        let mut c1 = check("c1");
        c1.check_spec = Some(Envelope::new("DnsCheck", b"???".to_vec()));

        let mut checks = vec![c1];
        decode_payloads(&mut checks).unwrap();
        assert!(checks[0].spec.is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_known_tag() {
        let mut c1 = check("c1");
        c1.check_spec = Some(Envelope::new("HttpCheck", b"[1, 2".to_vec()));

        let err = decode_payloads(&mut [c1]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
