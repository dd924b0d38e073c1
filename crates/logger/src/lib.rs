//! Tracing setup shared by the checkhub binaries.

mod subscriber;

pub use subscriber::{init, init_with_level};
