//! Domain types shared by the resolver, the sources and the dispatcher.

pub mod check;
pub mod notification;
pub mod payload;
pub mod result;
pub mod user;

pub use check::{Assertion, Check, Target, TargetType};
pub use notification::{Notification, NotificationBatch};
pub use payload::{CheckReply, CheckSpec};
pub use result::{CheckResponse, CheckResult};
pub use user::User;
