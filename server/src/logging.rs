use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, filtering with the given directives
pub fn init(filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter).context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("could not install the log subscriber: {}", e))
}
