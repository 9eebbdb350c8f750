use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Installs a global fmt subscriber filtered by `config.logging_config`.
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_logging(config: &Config) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_new(&config.logging_config)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
