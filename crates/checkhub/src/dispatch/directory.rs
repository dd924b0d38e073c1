//! Coordination directory access.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

/// One node of the directory tree. Leaves carry a value, directories carry
/// children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryNode {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub dir: bool,
    pub nodes: Vec<DirectoryNode>,
}

impl DirectoryNode {
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: Some(value.into()), dir: false, nodes: Vec::new() }
    }

    pub fn directory(key: impl Into<String>, nodes: Vec<DirectoryNode>) -> Self {
        Self { key: key.into(), value: None, dir: true, nodes }
    }

    /// Every leaf under this node, depth first, in directory order
    pub fn leaves(&self) -> Vec<&DirectoryNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a DirectoryNode>) {
        if self.value.is_some() {
            leaves.push(self);
        }
        for node in &self.nodes {
            node.collect_leaves(leaves);
        }
    }
}

/// Read access to the coordination directory.
///
/// Implementations must not cache: executor membership changes often and a
/// stale read would route to a node that is gone.
#[async_trait]
pub trait Directory: Send + Sync {
    /// `Ok(None)` when nothing exists at `path`
    async fn read(&self, path: &str, recursive: bool) -> Result<Option<DirectoryNode>>;
}

#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: DirectoryNode,
}

/// etcd v2 keys API client
pub struct EtcdDirectory {
    endpoint: Url,
    client: reqwest::Client,
}

impl EtcdDirectory {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).with_context(|| format!("invalid directory endpoint: {endpoint}"))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    fn keys_url(&self, path: &str) -> Result<Url> {
        let path = format!("/v2/keys/{}", path.trim_start_matches('/'));
        Ok(self.endpoint.join(&path)?)
    }
}

#[async_trait]
impl Directory for EtcdDirectory {
    async fn read(&self, path: &str, recursive: bool) -> Result<Option<DirectoryNode>> {
        let response = self
            .client
            .get(self.keys_url(path)?)
            .query(&[("recursive", recursive)])
            .send()
            .await
            .context("directory request failed")?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let keys: KeysResponse = response.json().await.context("couldn't decode directory response")?;
                Ok(Some(keys.node))
            }
            status => Err(anyhow!("directory responded with error status: {}", status)),
        }
    }
}
