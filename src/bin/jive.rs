//! The jive search server.
//!
//! Usage: `jive [--config <path>]`. Without `--config` the default config
//! path is read when it exists, else built-in defaults are used.

use std::path::PathBuf;

use anyhow::Context;
use jive::{Frontend, JiveConfig, Orchestrator};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: jive [--config <path>]";

fn config_path() -> anyhow::Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(None),
        Some("--config" | "-c") => {
            let path = args.next().context(USAGE)?;
            Ok(Some(PathBuf::from(path)))
        }
        Some("--help" | "-h") => {
            eprintln!("{USAGE}");
            std::process::exit(0);
        }
        Some(other) => anyhow::bail!("unexpected argument `{other}`\n{USAGE}"),
    }
}

fn load_config() -> anyhow::Result<JiveConfig> {
    let config = match config_path()? {
        Some(path) => JiveConfig::from_file(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => {
            let path = JiveConfig::default_config_path();
            if path.exists() {
                JiveConfig::from_file(&path)
                    .with_context(|| format!("failed to load {}", path.display()))?
            } else {
                JiveConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jive=info,jive_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;
    let orchestrator = Orchestrator::from_config(&config)?;
    let frontend = Frontend::start(orchestrator, &config).await?;
    info!("jive v{} serving on port {}", env!("CARGO_PKG_VERSION"), frontend.port());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    frontend.shutdown();
    Ok(())
}
