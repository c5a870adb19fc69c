//! fleetgrid-lifecycle — drives scheduler units through their lifecycle.
//!
//! Turns `create`/`start`/`run`/`destroy` into unit submissions and
//! reconciles against the scheduler's reported state with bounded polling.
//!
//! # Architecture
//!
//! ```text
//! LifecycleManager<T: Transport>
//!   ├── WorkloadName::parse + UnitTemplate::render (fleetgrid-core)
//!   ├── SchedulerClient<T> (fleetgrid-client)
//!   │     submit/delete retried up to `submit_attempts`
//!   └── Poll loops
//!       ├── StartWatch   running|exited → done, N× failed → abort
//!       └── DestroyWatch empty state list → done
//! ```
//!
//! The watches are plain state machines; the manager performs the I/O and
//! sleeps with `tokio::time`, so tests run against a paused clock.

pub mod error;
pub mod manager;
pub mod policy;
pub mod poll;

pub use error::{LifecycleError, LifecycleResult};
pub use manager::{CreateOptions, LifecycleManager};
pub use policy::{LifecyclePolicy, PollPolicy};
pub use poll::{DestroyWatch, PollStep, StartWatch};
