use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Method;

use super::CheckSource;
use super::client::ServiceClient;
use crate::types::{Check, User};

/// Check definition service over HTTP JSON
pub struct HttpCheckSource {
    client: ServiceClient,
}

impl HttpCheckSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self { client: ServiceClient::new("checks", endpoint, timeout)? })
    }
}

#[async_trait]
impl CheckSource for HttpCheckSource {
    async fn get_check(&self, user: &User, id: &str) -> Result<Check> {
        let request = self.client.request(user, Method::GET, &["checks", id])?;
        self.client.send_json(request).await
    }

    async fn list_checks(&self, user: &User) -> Result<Vec<Check>> {
        let request = self.client.request(user, Method::GET, &["checks"])?;
        self.client.send_json(request).await
    }

    async fn create_check(&self, user: &User, check: &Check) -> Result<Check> {
        let request = self.client.request(user, Method::POST, &["checks"])?.json(check);
        self.client.send_json(request).await
    }

    async fn update_check(&self, user: &User, check: &Check) -> Result<Check> {
        let request = self.client.request(user, Method::PUT, &["checks", check.id.as_str()])?.json(check);
        self.client.send_json(request).await
    }

    async fn delete_check(&self, user: &User, id: &str) -> Result<()> {
        let request = self.client.request(user, Method::DELETE, &["checks", id])?;
        self.client.send(request).await?;
        Ok(())
    }
}
