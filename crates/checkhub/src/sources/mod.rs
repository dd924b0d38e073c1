//! Backend collaborators.
//!
//! The check service is authoritative; the result and notification services
//! are best-effort. Each is consumed through a narrow trait so the resolver
//! can be driven by the HTTP adapters in this module or by test doubles.

mod checks;
mod client;
mod notifications;
mod results;

use anyhow::Result;
use async_trait::async_trait;

pub use checks::HttpCheckSource;
pub use client::ServiceClient;
pub use notifications::HttpNotificationSource;
pub use results::HttpResultSource;

use crate::types::{Check, CheckResult, Notification, NotificationBatch, User};

/// Owner of check definitions
#[async_trait]
pub trait CheckSource: Send + Sync {
    async fn get_check(&self, user: &User, id: &str) -> Result<Check>;

    async fn list_checks(&self, user: &User) -> Result<Vec<Check>>;

    /// Persist a new check and return it with its assigned id
    async fn create_check(&self, user: &User, check: &Check) -> Result<Check>;

    async fn update_check(&self, user: &User, check: &Check) -> Result<Check>;

    async fn delete_check(&self, user: &User, id: &str) -> Result<()>;
}

/// Owner of historical check results
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn list_results(&self, user: &User) -> Result<Vec<CheckResult>>;

    async fn list_results_for_check(&self, user: &User, check_id: &str) -> Result<Vec<CheckResult>>;
}

/// Owner of notification targets
#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn list_notifications(&self, user: &User) -> Result<Vec<Notification>>;

    async fn list_notifications_for_check(&self, user: &User, check_id: &str) -> Result<Vec<Notification>>;

    /// Tenant-wide notifications not tied to a check
    async fn list_default_notifications(&self, user: &User) -> Result<Vec<Notification>>;

    async fn create_notifications_bulk(&self, user: &User, batches: &[NotificationBatch]) -> Result<()>;

    async fn create_default_notifications(&self, user: &User, notifications: &[Notification]) -> Result<()>;
}
