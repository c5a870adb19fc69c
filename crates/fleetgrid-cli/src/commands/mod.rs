pub mod status;
pub mod unit;

use std::path::{Path, PathBuf};

use anyhow::Context;
use fleetgrid_client::{SchedulerClient, UnixTransport};
use fleetgrid_core::FleetConfig;
use fleetgrid_lifecycle::{LifecycleManager, LifecyclePolicy};
use tracing::debug;

const DEFAULT_CONFIG: &str = "fleetgrid.toml";

/// Load `path`, or `./fleetgrid.toml` when it exists, or defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FleetConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None if Path::new(DEFAULT_CONFIG).exists() => PathBuf::from(DEFAULT_CONFIG),
        None => return Ok(FleetConfig::default()),
    };
    debug!(config = %path.display(), "loading configuration");
    FleetConfig::from_file(&path).with_context(|| format!("failed to load {}", path.display()))
}

/// A connected lifecycle manager plus the config it was built from.
pub struct Session {
    pub manager: LifecycleManager<UnixTransport>,
    pub config: FleetConfig,
}

impl Session {
    pub async fn connect(config: FleetConfig, socket: Option<PathBuf>) -> anyhow::Result<Self> {
        let policy = LifecyclePolicy::from_config(&config.lifecycle)?;
        let socket = socket.unwrap_or_else(|| config.socket_path());
        let transport = UnixTransport::connect(&socket).await?;
        let manager = LifecycleManager::new(SchedulerClient::new(transport), policy);
        Ok(Self { manager, config })
    }
}
