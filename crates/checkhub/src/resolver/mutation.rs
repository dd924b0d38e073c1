use serde_json::{Map, Value};
use tracing::{error, info, warn};

use super::Resolver;
use crate::error::{Error, Result};
use crate::types::{Check, Notification, NotificationBatch, User};

/// One upsert input split into the check and the notifications that came
/// with it. `None` means the input carried no `notifications` key.
struct CheckInput {
    check: Check,
    notifications: Option<Vec<Notification>>,
}

fn parse_check_input(input: Value) -> Result<CheckInput> {
    let Value::Object(mut fields) = input else {
        return Err(Error::InvalidInput("error decoding check input".to_string()));
    };

    let notifications = fields.remove("notifications").map(|list| {
        list.as_array()
            .map(|items| {
                items
                    .iter()
                    .map(Notification::from_json)
                    .filter(Notification::is_deliverable)
                    .collect()
            })
            .unwrap_or_default()
    });

    let check = decode_check(fields)?;
    Ok(CheckInput { check, notifications })
}

fn decode_check(fields: Map<String, Value>) -> Result<Check> {
    let mut check: Check = serde_json::from_value(Value::Object(fields))
        .map_err(|e| Error::InvalidInput(format!("error decoding check: {e}")))?;

    check.validate().map_err(Error::InvalidInput)?;
    check
        .ensure_envelope()
        .map_err(|e| Error::InvalidInput(format!("error encoding check spec: {e}")))?;

    Ok(check)
}

impl Resolver {
    /// Create or update each input check, then create the notifications that
    /// came with it.
    ///
    /// An input with an empty `id` is created, anything else updated. The
    /// first failure aborts the remaining inputs; checks written before it stay
    /// written.
    pub async fn upsert_checks(&self, user: &User, inputs: Vec<Value>) -> Result<Vec<Check>> {
        info!(customer_id = %user.customer_id, email = %user.email, count = inputs.len(), "upsert checks request");

        let mut upserted = Vec::with_capacity(inputs.len());

        for input in inputs {
            let CheckInput { check, notifications } = parse_check_input(input)?;

            let written = if check.is_persisted() {
                self.checks.update_check(user, &check).await
            } else {
                self.checks.create_check(user, &check).await
            };

            let mut written = written.map_err(|e| {
                error!(customer_id = %user.customer_id, "couldn't write check {:?}: {:#}", check.name, e);
                Error::Source(e)
            })?;

            if let Some(notifications) = notifications {
                if !notifications.is_empty() {
                    let batch = NotificationBatch { check_id: written.id.clone(), notifications };

                    self.notifications
                        .create_notifications_bulk(user, std::slice::from_ref(&batch))
                        .await
                        .map_err(|e| {
                            error!(customer_id = %user.customer_id, "couldn't create notifications for check {}: {:#}", written.id, e);
                            Error::Source(e)
                        })?;

                    written.notifications.extend(batch.notifications.into_iter().map(|mut notification| {
                        notification.check_id = written.id.clone();
                        notification
                    }));
                }
            }

            upserted.push(written);
        }

        Ok(upserted)
    }

    /// Delete checks by id, best effort.
    ///
    /// Failed deletes are skipped. The returned ids are the ones actually
    /// deleted and are the only reliable record of what happened.
    pub async fn delete_checks(&self, user: &User, ids: &[String]) -> Result<Vec<String>> {
        info!(customer_id = %user.customer_id, email = %user.email, count = ids.len(), "delete checks request");

        let mut deleted = Vec::with_capacity(ids.len());

        for id in ids {
            match self.checks.delete_check(user, id).await {
                Ok(()) => deleted.push(id.clone()),
                Err(e) => warn!(customer_id = %user.customer_id, "couldn't delete check {}: {:#}", id, e),
            }
        }

        Ok(deleted)
    }
}
