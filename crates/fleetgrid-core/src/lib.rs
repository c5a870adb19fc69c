//! fleetgrid-core — value types shared by the fleetgrid client crates.
//!
//! - [`WorkloadName`]: structured `app[_vN][.type].num` identifiers
//! - [`UnitTemplate`] / [`UnitDefinition`]: scheduler unit directives and
//!   placeholder rendering
//! - [`FleetConfig`]: `fleetgrid.toml` parsing

pub mod config;
pub mod error;
pub mod name;
pub mod template;
pub mod unit;

pub use config::{FleetConfig, parse_duration};
pub use error::{NameError, RenderError};
pub use name::WorkloadName;
pub use template::{RenderParameters, ResourceLimits};
pub use unit::{UnitDefinition, UnitDirective, UnitTemplate};
