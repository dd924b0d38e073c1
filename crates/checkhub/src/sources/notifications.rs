use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use super::NotificationSource;
use super::client::ServiceClient;
use crate::types::{Notification, NotificationBatch, User};

#[derive(Debug, Serialize)]
struct DefaultNotificationsRequest<'a> {
    notifications: &'a [Notification],
}

/// Notification service over HTTP JSON
pub struct HttpNotificationSource {
    client: ServiceClient,
}

impl HttpNotificationSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self { client: ServiceClient::new("notifications", endpoint, timeout)? })
    }

    async fn list(&self, user: &User, segments: &[&str]) -> Result<Vec<Notification>> {
        let request = self.client.request(user, Method::GET, segments)?;
        self.client.send_json(request).await
    }
}

#[async_trait]
impl NotificationSource for HttpNotificationSource {
    async fn list_notifications(&self, user: &User) -> Result<Vec<Notification>> {
        self.list(user, &["notifications"]).await
    }

    async fn list_notifications_for_check(&self, user: &User, check_id: &str) -> Result<Vec<Notification>> {
        self.list(user, &["notifications", check_id]).await
    }

    async fn list_default_notifications(&self, user: &User) -> Result<Vec<Notification>> {
        self.list(user, &["notifications-default"]).await
    }

    async fn create_notifications_bulk(&self, user: &User, batches: &[NotificationBatch]) -> Result<()> {
        let request = self.client.request(user, Method::POST, &["notifications-multicheck"])?.json(batches);
        self.client.send(request).await?;
        Ok(())
    }

    async fn create_default_notifications(&self, user: &User, notifications: &[Notification]) -> Result<()> {
        let body = DefaultNotificationsRequest { notifications };
        let request = self.client.request(user, Method::POST, &["notifications-default"])?.json(&body);
        self.client.send(request).await?;
        Ok(())
    }
}
