use anyhow::Result;
use portal_cave::config::Config;
use portal_cave::{app, snapshot};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wgpu_core=warn,wgpu_hal=warn,naga=warn")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(snapshot) = &config.snapshot {
        snapshot::write(snapshot)?;
        return Ok(());
    }
    app::run(&config)
}
