//! Resolver - the single entry point the presentation layer calls.
//!
//! The resolver:
//! - Merges checks with their results and notifications (`checks`)
//! - Applies check writes and their notification side effects (`mutation`)
//! - Manages tenant default notifications (`notifications`)
//! - Forwards test-check requests to the [`Dispatcher`]

mod checks;
mod mutation;
mod notifications;

use std::sync::Arc;

use anyhow::Result as AnyResult;
use tracing::info;

use crate::config::Config;
use crate::dispatch::{Dispatcher, EtcdDirectory, TcpExecutorConnector};
use crate::error::Result;
use crate::sources::{
    CheckSource, HttpCheckSource, HttpNotificationSource, HttpResultSource, NotificationSource, ResultSource,
};
use crate::types::{Check, CheckResponse, User};

pub struct Resolver {
    checks: Arc<dyn CheckSource>,
    results: Arc<dyn ResultSource>,
    notifications: Arc<dyn NotificationSource>,
    dispatcher: Dispatcher,
}

impl Resolver {
    pub fn new(
        checks: Arc<dyn CheckSource>,
        results: Arc<dyn ResultSource>,
        notifications: Arc<dyn NotificationSource>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self { checks, results, notifications, dispatcher }
    }

    /// Wire the HTTP sources, the etcd directory and the TCP executor
    /// transport from configuration.
    pub fn from_config(config: &Config) -> AnyResult<Self> {
        let timeout = config.services.request_timeout();

        info!("Checks service at {}", config.services.checks);
        info!("Results service at {}", config.services.results);
        info!("Notifications service at {}", config.services.notifications);
        info!("Coordination directory at {}", config.services.directory);

        let dispatcher = Dispatcher::new(
            Arc::new(EtcdDirectory::new(&config.services.directory, timeout)?),
            Arc::new(TcpExecutorConnector),
            config.dispatch.clone(),
        );

        Ok(Self::new(
            Arc::new(HttpCheckSource::new(&config.services.checks, timeout)?),
            Arc::new(HttpResultSource::new(&config.services.results, timeout)?),
            Arc::new(HttpNotificationSource::new(&config.services.notifications, timeout)?),
            dispatcher,
        ))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run a check once on an executor. Bypasses aggregation entirely.
    pub async fn test_check(&self, user: &User, check: &Check) -> Result<Vec<CheckResponse>> {
        info!(customer_id = %user.customer_id, email = %user.email, "test check request");
        self.dispatcher.test_check(user, check).await
    }
}
