//! AJAX service dispatch.
//!
//! Requests of the form `/?__service__=<subsystem>.<action>` are answered by
//! the dispatcher registered for `<subsystem>` instead of the regular router.
//! Plain values returned by a dispatcher become `application/json` responses;
//! complete responses are passed through.

pub mod cache;
pub mod dispatcher;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod reply;
pub mod request;

pub use cache::{add_never_cache_headers, never_cache};
pub use dispatcher::{from_fn, Dispatcher, FnDispatcher, SimpleDispatcher};
pub use error::ServiceError;
pub use middleware::{service_middleware, ServiceState, DEFAULT_MAX_BODY_BYTES};
pub use registry::{Registration, RegistryError, ServiceRegistry, ServiceRegistryBuilder};
pub use reply::ServiceReply;
pub use request::ServiceRequest;
