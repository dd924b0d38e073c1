//! In-memory collaborators for integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;

use checkhub::dispatch::{
    Directory, DirectoryNode, Dispatcher, ExecutorClient, ExecutorConnector, ExecutorRoute, TestCheckRequest,
    TestCheckResponse,
};
use checkhub::config::DispatchConfig;
use checkhub::sources::{CheckSource, NotificationSource, ResultSource};
use checkhub::types::{
    Check, CheckResponse, CheckResult, Notification, NotificationBatch, Target, TargetType, User,
};
use checkhub::Resolver;

pub fn user() -> User {
    User::new("t1", "ops@example.com")
}

pub fn check(id: &str) -> Check {
    Check {
        id: id.to_string(),
        customer_id: "t1".to_string(),
        name: format!("check {id}"),
        interval: 30,
        target: Some(target(TargetType::Instance, "i-1")),
        ..Default::default()
    }
}

pub fn target(kind: TargetType, id: &str) -> Target {
    Target { name: id.to_string(), kind, id: id.to_string() }
}

pub fn result(check_id: &str, passing: bool) -> CheckResult {
    CheckResult {
        check_id: check_id.to_string(),
        customer_id: "t1".to_string(),
        check_name: String::new(),
        timestamp: Utc::now(),
        passing,
        responses: vec![],
    }
}

pub fn notification(check_id: &str, kind: &str, value: &str) -> Notification {
    Notification { check_id: check_id.to_string(), kind: kind.to_string(), value: value.to_string() }
}

#[derive(Default)]
pub struct MockCheckSource {
    pub checks: Mutex<Vec<Check>>,
    pub fail: bool,
    pub fail_writes: bool,
    pub undeletable: HashSet<String>,
    pub created: AtomicUsize,
    pub updated: AtomicUsize,
}

impl MockCheckSource {
    pub fn with_checks(checks: Vec<Check>) -> Self {
        Self { checks: Mutex::new(checks), ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }
}

#[async_trait]
impl CheckSource for MockCheckSource {
    async fn get_check(&self, _user: &User, id: &str) -> Result<Check> {
        if self.fail {
            return Err(anyhow!("checks responded with error status: 503 Service Unavailable"));
        }
        self.checks
            .lock()
            .unwrap()
            .iter()
            .find(|check| check.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("checks responded with error status: 404 Not Found"))
    }

    async fn list_checks(&self, _user: &User) -> Result<Vec<Check>> {
        if self.fail {
            return Err(anyhow!("checks responded with error status: 503 Service Unavailable"));
        }
        Ok(self.checks.lock().unwrap().clone())
    }

    async fn create_check(&self, user: &User, check: &Check) -> Result<Check> {
        if self.fail_writes {
            return Err(anyhow!("checks responded with error status: 500 Internal Server Error"));
        }
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let mut created = check.clone();
        created.id = format!("new-{n}");
        created.customer_id = user.customer_id.clone();
        self.checks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_check(&self, _user: &User, check: &Check) -> Result<Check> {
        if self.fail_writes {
            return Err(anyhow!("checks responded with error status: 500 Internal Server Error"));
        }
        self.updated.fetch_add(1, Ordering::SeqCst);
        let mut checks = self.checks.lock().unwrap();
        let existing = checks
            .iter_mut()
            .find(|existing| existing.id == check.id)
            .ok_or_else(|| anyhow!("checks responded with error status: 404 Not Found"))?;
        *existing = check.clone();
        Ok(check.clone())
    }

    async fn delete_check(&self, _user: &User, id: &str) -> Result<()> {
        if self.undeletable.contains(id) {
            return Err(anyhow!("checks responded with error status: 500 Internal Server Error"));
        }
        self.checks.lock().unwrap().retain(|check| check.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockResultSource {
    pub results: Vec<CheckResult>,
    pub fail: bool,
    pub delay: Option<Duration>,
    pub scoped_calls: AtomicUsize,
    pub bulk_calls: AtomicUsize,
}

impl MockResultSource {
    pub fn with_results(results: Vec<CheckResult>) -> Self {
        Self { results, ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    async fn respond(&self, results: Vec<CheckResult>) -> Result<Vec<CheckResult>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(anyhow!("results request failed: connection refused"));
        }
        Ok(results)
    }
}

#[async_trait]
impl ResultSource for MockResultSource {
    async fn list_results(&self, _user: &User) -> Result<Vec<CheckResult>> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(self.results.clone()).await
    }

    async fn list_results_for_check(&self, _user: &User, check_id: &str) -> Result<Vec<CheckResult>> {
        self.scoped_calls.fetch_add(1, Ordering::SeqCst);
        let results = self.results.iter().filter(|result| result.check_id == check_id).cloned().collect();
        self.respond(results).await
    }
}

#[derive(Default)]
pub struct MockNotificationSource {
    pub notifications: Vec<Notification>,
    pub defaults: Mutex<Vec<Notification>>,
    pub batches: Mutex<Vec<NotificationBatch>>,
    pub fail: bool,
    pub scoped_calls: AtomicUsize,
}

impl MockNotificationSource {
    pub fn with_notifications(notifications: Vec<Notification>) -> Self {
        Self { notifications, ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    fn check_up(&self) -> Result<()> {
        if self.fail {
            return Err(anyhow!("notifications responded with error status: 502 Bad Gateway"));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSource for MockNotificationSource {
    async fn list_notifications(&self, _user: &User) -> Result<Vec<Notification>> {
        self.check_up()?;
        Ok(self.notifications.clone())
    }

    async fn list_notifications_for_check(&self, _user: &User, check_id: &str) -> Result<Vec<Notification>> {
        self.scoped_calls.fetch_add(1, Ordering::SeqCst);
        self.check_up()?;
        Ok(self.notifications.iter().filter(|n| n.check_id == check_id).cloned().collect())
    }

    async fn list_default_notifications(&self, _user: &User) -> Result<Vec<Notification>> {
        self.check_up()?;
        Ok(self.defaults.lock().unwrap().clone())
    }

    async fn create_notifications_bulk(&self, _user: &User, batches: &[NotificationBatch]) -> Result<()> {
        self.check_up()?;
        self.batches.lock().unwrap().extend_from_slice(batches);
        Ok(())
    }

    async fn create_default_notifications(&self, _user: &User, notifications: &[Notification]) -> Result<()> {
        self.check_up()?;
        self.defaults.lock().unwrap().extend_from_slice(notifications);
        Ok(())
    }
}

/// Directory serving a fixed tree for one path
#[derive(Default)]
pub struct MockDirectory {
    pub path: String,
    pub node: Option<DirectoryNode>,
    pub fail: bool,
    pub reads: AtomicUsize,
}

impl MockDirectory {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register executors under `path`, one leaf per address
    pub fn with_executors(path: &str, addresses: &[(&str, u16)]) -> Self {
        let leaves = addresses
            .iter()
            .enumerate()
            .map(|(i, (host, port))| {
                DirectoryNode::leaf(
                    format!("{path}/executor-{i}"),
                    format!(r#"{{"checker": {{"hostname": "{host}", "port": {port}}}}}"#),
                )
            })
            .collect();

        Self { path: path.to_string(), node: Some(DirectoryNode::directory(path, leaves)), ..Default::default() }
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn read(&self, path: &str, _recursive: bool) -> Result<Option<DirectoryNode>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("directory request failed: connection refused"));
        }
        if path == self.path { Ok(self.node.clone()) } else { Ok(None) }
    }
}

#[derive(Clone)]
pub enum ExecutorBehavior {
    Respond(Vec<CheckResponse>),
    ReportError(String),
    CallError(String),
    Hang,
    Unreachable,
    /// Connect never completes
    SlowDial,
}

pub struct MockConnector {
    pub behavior: ExecutorBehavior,
    pub connects: AtomicUsize,
    pub calls: Arc<AtomicUsize>,
    pub dialed: Mutex<Vec<String>>,
    pub requests: Arc<Mutex<Vec<TestCheckRequest>>>,
}

impl MockConnector {
    pub fn new(behavior: ExecutorBehavior) -> Self {
        Self {
            behavior,
            connects: AtomicUsize::new(0),
            calls: Arc::new(AtomicUsize::new(0)),
            dialed: Mutex::new(Vec::new()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

struct MockExecutor {
    behavior: ExecutorBehavior,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<TestCheckRequest>>>,
}

#[async_trait]
impl ExecutorConnector for MockConnector {
    async fn connect(&self, route: &ExecutorRoute, _dial_timeout: Duration) -> Result<Box<dyn ExecutorClient>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.dialed.lock().unwrap().push(route.address());

        match self.behavior {
            ExecutorBehavior::Unreachable => {
                return Err(anyhow!("dial to {} failed: connection refused", route.address()));
            }
            ExecutorBehavior::SlowDial => tokio::time::sleep(Duration::from_secs(3600)).await,
            _ => {}
        }

        Ok(Box::new(MockExecutor {
            behavior: self.behavior.clone(),
            calls: Arc::clone(&self.calls),
            requests: Arc::clone(&self.requests),
        }))
    }
}

#[async_trait]
impl ExecutorClient for MockExecutor {
    async fn test_check(&mut self, request: TestCheckRequest) -> Result<TestCheckResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        match &self.behavior {
            ExecutorBehavior::Respond(responses) => {
                Ok(TestCheckResponse { responses: responses.clone(), error: None })
            }
            ExecutorBehavior::ReportError(message) => {
                Ok(TestCheckResponse { responses: vec![], error: Some(message.clone()) })
            }
            ExecutorBehavior::CallError(message) => Err(anyhow!("{}", message)),
            ExecutorBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(TestCheckResponse::default())
            }
            ExecutorBehavior::Unreachable | ExecutorBehavior::SlowDial => {
                unreachable!("connect never hands out a client for this behavior")
            }
        }
    }
}

pub fn dispatch_config() -> DispatchConfig {
    DispatchConfig::default()
        .with_routes_path("/checkhub/routes")
        .with_external_route("external-hosts")
        .with_dial_timeout(Duration::from_millis(500))
        .with_request_window(Duration::from_millis(300))
}

pub fn dispatcher(directory: Arc<MockDirectory>, connector: Arc<MockConnector>) -> Dispatcher {
    Dispatcher::new(directory, connector, dispatch_config())
}

/// Resolver over mocks with a dispatcher that has nowhere to send anything
pub fn resolver(
    checks: Arc<MockCheckSource>,
    results: Arc<MockResultSource>,
    notifications: Arc<MockNotificationSource>,
) -> Resolver {
    let dispatcher = dispatcher(
        Arc::new(MockDirectory::empty()),
        Arc::new(MockConnector::new(ExecutorBehavior::Unreachable)),
    );
    Resolver::new(checks, results, notifications, dispatcher)
}
