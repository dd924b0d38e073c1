//! Directory-based dispatch of ad-hoc check runs.
//!
//! Executors register under `<routes_path>/<route key>` in the coordination
//! directory. A test request resolves the route key, reads the registrations,
//! connects to the first executor within the dial timeout and waits for its
//! answer until the request deadline.

pub mod directory;
pub mod dispatcher;
pub mod executor;
pub mod route;

pub use directory::{Directory, DirectoryNode, EtcdDirectory};
pub use dispatcher::{DispatchState, Dispatcher};
pub use executor::{
    ExecutorClient, ExecutorConnector, TcpExecutorConnector, TestCheckRequest, TestCheckResponse,
};
pub use route::ExecutorRoute;
