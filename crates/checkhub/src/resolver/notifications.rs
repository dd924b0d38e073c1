use serde_json::Value;
use tracing::{error, info};

use super::Resolver;
use crate::error::{Error, Result};
use crate::types::{Notification, User};

impl Resolver {
    /// Tenant-wide default notifications.
    ///
    /// Only defaults are first-class today; per-check notifications are read
    /// through [`Resolver::list_checks`], so `default_only = false` yields an
    /// empty list.
    pub async fn get_notifications(&self, user: &User, default_only: bool) -> Result<Vec<Notification>> {
        info!(customer_id = %user.customer_id, email = %user.email, "get notifications request");

        if !default_only {
            return Ok(Vec::new());
        }

        self.notifications.list_default_notifications(user).await.map_err(|e| {
            error!(customer_id = %user.customer_id, "couldn't list default notifications: {:#}", e);
            Error::Source(e)
        })
    }

    /// Create tenant default notifications from loosely typed `{type, value}`
    /// objects. Entries missing either field are dropped.
    pub async fn put_default_notifications(&self, user: &User, inputs: Vec<Value>) -> Result<Vec<Notification>> {
        info!(customer_id = %user.customer_id, email = %user.email, "put notifications request");

        let notifications: Vec<Notification> =
            inputs.iter().map(Notification::from_json).filter(Notification::is_deliverable).collect();

        self.notifications
            .create_default_notifications(user, &notifications)
            .await
            .map_err(|e| {
                error!(customer_id = %user.customer_id, "couldn't create default notifications: {:#}", e);
                Error::Source(e)
            })?;

        Ok(notifications)
    }
}
