//! Executor routes read from directory entries.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use tracing::warn;

use super::directory::DirectoryNode;

/// Address of one executor able to serve a routing key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorRoute {
    pub route_key: String,
    pub host: String,
    pub port: u16,
}

impl ExecutorRoute {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ExecutorRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address(), self.route_key)
    }
}

/// Ports show up both as numbers and as strings in registrations.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Port {
    Number(u16),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct ServiceAddress {
    hostname: String,
    port: Port,
}

/// Parse one directory entry value: `{"<service>": {"hostname": .., "port": ..}, ..}`
fn parse_entry(value: &str, service_name: &str) -> Result<Option<(String, u16)>, String> {
    let services: HashMap<String, ServiceAddress> = serde_json::from_str(value).map_err(|e| e.to_string())?;

    let Some(service) = services.get(service_name) else {
        return Ok(None);
    };

    let port = match &service.port {
        Port::Number(port) => *port,
        Port::Text(port) => port.parse().map_err(|_| format!("invalid port: {port}"))?,
    };

    Ok(Some((service.hostname.clone(), port)))
}

/// Every usable route under `node`, in directory order. Entries that do not
/// expose `service_name` or cannot be parsed are skipped.
pub fn routes_from_node(route_key: &str, node: &DirectoryNode, service_name: &str) -> Vec<ExecutorRoute> {
    node.leaves()
        .into_iter()
        .filter_map(|leaf| {
            let value = leaf.value.as_deref()?;
            match parse_entry(value, service_name) {
                Ok(Some((host, port))) => Some(ExecutorRoute { route_key: route_key.to_string(), host, port }),
                Ok(None) => None,
                Err(e) => {
                    warn!("Skipping unreadable executor entry {}: {}", leaf.key, e);
                    None
                }
            }
        })
        .collect()
}
