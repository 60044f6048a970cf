use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use oblivion_storage::{Selector, StorageConfig};
use tracing::debug;

mod objects;
mod probe;

pub use objects::run_objects;
pub use probe::run_probe;

pub async fn run_command(
    config_file: PathBuf,
    local_data_dir: &Path,
    prefer_mock: bool,
    cmd: crate::Commands,
) -> Result<()> {
    match cmd {
        crate::Commands::Config { cmd } => cmd.run(&config_file, local_data_dir),
        crate::Commands::Probe => {
            let config = load_config(&config_file)?;
            run_probe(&config, prefer_mock).await
        }
        crate::Commands::Objects(cmd) => {
            let config = load_config(&config_file)?;
            let client = Selector::new(&config).resolve(prefer_mock).await;
            run_objects(cmd, &client).await
        }
    }
}

/// Reads the config file if present and applies environment overrides.
fn load_config(config_file: &Path) -> Result<StorageConfig> {
    let config = if config_file.exists() {
        let toml_content = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read {}", config_file.display()))?;
        toml::from_str(&toml_content)
            .with_context(|| format!("could not parse {}", config_file.display()))?
    } else {
        debug!("no config at {}, using defaults", config_file.display());
        StorageConfig::default()
    };
    Ok(config.with_env_overrides(|name| std::env::var(name).ok()))
}
