//! fleetgrid-client — typed access to the scheduler's unit API.
//!
//! The scheduler agent serves its HTTP API on a local Unix socket. This
//! crate wraps one persistent connection to it and exposes the four
//! operations the lifecycle layer needs.
//!
//! # Architecture
//!
//! ```text
//! SchedulerClient<T: Transport>
//!   ├── submit_unit   PUT    /v1-alpha/units/{name}.service
//!   ├── delete_unit   DELETE /v1-alpha/units/{name}.service
//!   ├── query_state   GET    /v1-alpha/state[?unitName={name}.service]
//!   └── query_machines GET   /v1-alpha/machines
//!         │
//!         ▼
//!   UnixTransport (hyper HTTP/1.1 over tokio::net::UnixStream)
//! ```
//!
//! Every method takes `&mut self`: a client and its connection serve one
//! exchange at a time. There is no reconnection; once the connection
//! drops, every call fails with [`TransportError`].

pub mod api;
pub mod error;
pub mod transport;
pub mod types;

pub use api::SchedulerClient;
pub use error::{ApiError, ApiResult, TransportError, TransportResult};
pub use transport::{Transport, UnixTransport};
pub use types::{DesiredState, Machine, SubState, UnitState, UnitSubmission};
