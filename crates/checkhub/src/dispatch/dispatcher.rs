use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::directory::Directory;
use super::executor::{ExecutorConnector, TestCheckRequest};
use super::route::{ExecutorRoute, routes_from_node};
use crate::config::DispatchConfig;
use crate::error::{Error, Result};
use crate::types::{Check, CheckResponse, TargetType, User};

/// Progress of a single test-check dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    DirectoryLookup,
    NoExecutors,
    Dispatching,
    Responded,
    Failed,
    TimedOut,
}

impl DispatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchState::NoExecutors | DispatchState::Responded | DispatchState::Failed | DispatchState::TimedOut
        )
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchState::Idle => "idle",
            DispatchState::DirectoryLookup => "directory-lookup",
            DispatchState::NoExecutors => "no-executors",
            DispatchState::Dispatching => "dispatching",
            DispatchState::Responded => "responded",
            DispatchState::Failed => "failed",
            DispatchState::TimedOut => "timed-out",
        };
        f.write_str(name)
    }
}

struct Dispatch<'a> {
    route_key: &'a str,
    state: DispatchState,
}

impl Dispatch<'_> {
    fn advance(&mut self, next: DispatchState) {
        debug!(route = self.route_key, from = %self.state, to = %next, "dispatch state");
        self.state = next;
    }

    fn fail(&mut self, next: DispatchState, error: Error) -> Error {
        self.advance(next);
        error
    }
}

/// A route key names exactly one directory entry under the routes path. An
/// empty key or one with path syntax would read a parent or sibling subtree.
fn validate_route_key(route_key: &str) -> Result<()> {
    if route_key.is_empty() {
        return Err(Error::InvalidInput("route key is empty".to_string()));
    }

    if route_key.contains('/') || route_key.contains("..") {
        return Err(Error::InvalidInput(format!("route key {route_key:?} is not a single path segment")));
    }

    Ok(())
}

/// Sends ad-hoc check runs to an executor discovered in the directory.
///
/// The directory is read on every call. Only the first discovered executor is
/// tried; a failed or late answer is reported, not retried elsewhere.
pub struct Dispatcher {
    directory: Arc<dyn Directory>,
    connector: Arc<dyn ExecutorConnector>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(directory: Arc<dyn Directory>, connector: Arc<dyn ExecutorConnector>, config: DispatchConfig) -> Self {
        Self { directory, connector, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Routing key for a check: the tenant, or the shared external route for
    /// checks against third-party hosts.
    pub fn route_key(&self, user: &User, check: &Check) -> Result<String> {
        let target = check
            .target
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("check is missing a target".to_string()))?;

        let route_key = if target.kind == TargetType::ExternalHost {
            &self.config.external_route
        } else {
            &user.customer_id
        };

        validate_route_key(route_key)?;
        Ok(route_key.clone())
    }

    /// All executors currently registered for `route_key`
    pub async fn discover(&self, route_key: &str) -> Result<Vec<ExecutorRoute>> {
        validate_route_key(route_key)?;
        let path = format!("{}/{}", self.config.routes_path.trim_end_matches('/'), route_key);

        let node = self.directory.read(&path, true).await.map_err(Error::Directory)?;

        Ok(node
            .map(|node| routes_from_node(route_key, &node, &self.config.service_name))
            .unwrap_or_default())
    }

    /// Run `check` once on an executor and return its responses.
    pub async fn test_check(&self, user: &User, check: &Check) -> Result<Vec<CheckResponse>> {
        let route_key = self.route_key(user, check)?;
        let mut dispatch = Dispatch { route_key: &route_key, state: DispatchState::Idle };

        dispatch.advance(DispatchState::DirectoryLookup);
        let routes = match self.discover(&route_key).await {
            Ok(routes) => routes,
            Err(e) => return Err(dispatch.fail(DispatchState::Failed, e)),
        };

        let Some(route) = routes.into_iter().next() else {
            warn!("No executors registered for route {}", route_key);
            return Err(dispatch.fail(DispatchState::NoExecutors, Error::NoExecutors(route_key.clone())));
        };

        dispatch.advance(DispatchState::Dispatching);
        info!(customer_id = %user.customer_id, executor = %route, "Dispatching test check");

        let dial_timeout = self.config.dial_timeout();
        let mut client = match timeout(dial_timeout, self.connector.connect(&route, dial_timeout)).await {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => return Err(dispatch.fail(DispatchState::Failed, Error::Dispatch(e))),
            Err(_) => {
                let error = Error::Dispatch(anyhow::anyhow!("dial to {} timed out after {:?}", route, dial_timeout));
                return Err(dispatch.fail(DispatchState::Failed, error));
            }
        };

        let window = self.config.request_window();
        let deadline = Utc::now() + chrono::Duration::milliseconds(window.as_millis() as i64);
        let request = TestCheckRequest { deadline, check: check.clone() };

        match timeout(window, client.test_check(request)).await {
            Err(_) => Err(dispatch.fail(DispatchState::TimedOut, Error::Timeout(window))),
            Ok(Err(e)) => Err(dispatch.fail(DispatchState::Failed, Error::Dispatch(e))),
            Ok(Ok(response)) => {
                if let Some(message) = response.error {
                    let error = Error::Dispatch(anyhow::anyhow!("executor {} reported: {}", route, message));
                    return Err(dispatch.fail(DispatchState::Failed, error));
                }

                dispatch.advance(DispatchState::Responded);
                info!("Executor {} returned {} responses", route, response.responses.len());
                Ok(response.responses)
            }
        }
    }
}
