//! Command implementations.

mod info;
mod publish;
mod run;
mod validate;

pub use info::run_info;
pub use publish::run_publish;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use tracing::error;

/// Load config (or defaults) with environment overrides applied
fn load_blueprint(config: Option<&Path>) -> Result<PipelineBlueprint> {
    if let Some(path) = config {
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
    }

    config_loader::ConfigLoader::load_with_env(config).with_context(|| match config {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load default configuration".to_string(),
    })
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
