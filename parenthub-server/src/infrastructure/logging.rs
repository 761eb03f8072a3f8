use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

/// Library crates that are noisy at `info`.
const QUIET_TARGETS: &str = "sqlx=warn,hyper=warn,reqwest=warn";

pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{default_level},{QUIET_TARGETS}")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(())
}
