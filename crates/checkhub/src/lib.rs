//! checkhub - one coherent view of a monitoring check
//!
//! A check's definition, its run results and its notification targets live in
//! three separate services. This library stitches them back together, decodes
//! the type-tagged payloads they carry, applies check writes, and hands
//! "test this check now" requests to an executor found through the
//! coordination directory.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod sources;
pub mod types;

// Re-export main types
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use registry::{Envelope, Payload, TypeRegistry};
pub use resolver::Resolver;
pub use types::{Check, CheckResponse, CheckResult, Notification, Target, TargetType, User};
