//! Shared HTTP plumbing for the backend services.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::User;

/// Thin reqwest wrapper that authenticates every call as the requesting user.
///
/// The services take the caller's identity as `Authorization: Basic` with the
/// base64 of the user's JSON.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    name: &'static str,
    endpoint: Url,
    client: reqwest::Client,
}

impl ServiceClient {
    pub fn new(name: &'static str, endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).with_context(|| format!("invalid {name} endpoint: {endpoint}"))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("checkhub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { name, endpoint, client })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Endpoint URL with `segments` appended. Each segment is percent-encoded,
    /// so ids never change the shape of the path.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} endpoint cannot carry a path: {}", self.name, self.endpoint))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn request(&self, user: &User, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let token = serde_json::to_vec(user)?;

        Ok(self
            .client
            .request(method, self.url(segments)?)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", STANDARD.encode(token)))
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    /// Send and fail on any status >= 400.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.with_context(|| format!("{} request failed", self.name))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(anyhow!("{} responded with error status: {}", self.name, status));
        }

        Ok(response)
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response.json::<T>().await.with_context(|| format!("couldn't decode {} response", self.name))
    }
}
