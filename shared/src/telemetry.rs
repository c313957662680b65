use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Sets up `tracing` output filtered by `RUST_LOG`, defaulting to `info`
/// for everything and for the calling crate.
pub fn init(crate_name: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{crate_name}=info,shared=info")));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!(err.to_string()))
}
