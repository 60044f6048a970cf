use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Subcommand;
use oblivion_core::Timeouts;
use toml_edit::{DocumentMut, Item, Table, value};
use tracing::info;

#[derive(Subcommand)]
pub enum CmdConfig {
    /// Creates the storage config if it doesn't exist and fills in defaults
    Init,
}

impl CmdConfig {
    pub fn run(self, config_file: &Path, local_data_dir: &Path) -> anyhow::Result<()> {
        let mut doc = if config_file.exists() {
            fs::read_to_string(config_file)?
        } else {
            if let Some(parent) = config_file.parent() {
                fs::create_dir_all(parent)?;
            }
            "".to_owned()
        }
        .parse::<DocumentMut>()
        .context("could not parse storage config file")?;

        match self {
            Self::Init => {
                let mock_dir = local_data_dir.join("ipfs_mock");
                let mock = table_mut(&mut doc, "mock")?;
                if !mock.contains_key("base_path") {
                    mock.insert("base_path", value(mock_dir.to_string_lossy().into_owned()));
                }

                let defaults = Timeouts::default();
                let timeouts = table_mut(&mut doc, "timeouts")?;
                for (key, secs) in [
                    ("transfer_secs", defaults.transfer_secs),
                    ("request_secs", defaults.request_secs),
                    ("probe_secs", defaults.probe_secs),
                ] {
                    if !timeouts.contains_key(key) {
                        timeouts.insert(key, value(secs as i64));
                    }
                }
            }
        }

        info!("writing to config file {config_file:?}");
        write_atomic(config_file, doc.to_string().as_bytes())
    }
}

fn table_mut<'a>(doc: &'a mut DocumentMut, key: &str) -> anyhow::Result<&'a mut Table> {
    doc.entry(key)
        .or_insert(Item::Table(Table::new()))
        .as_table_mut()
        .with_context(|| format!("`{key}` in the storage config is not a table"))
}

fn write_atomic(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let tmp_path: PathBuf = path.with_extension("tmp");
    let mut tmp = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;
    tmp.write_all(contents)?;
    tmp.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use oblivion_storage::StorageConfig;

    use super::*;

    #[test]
    fn init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("nested").join("storage.toml");

        CmdConfig::Init.run(&config_file, dir.path()).unwrap();

        let config: StorageConfig =
            toml::from_str(&fs::read_to_string(&config_file).unwrap()).unwrap();
        assert!(config.is_mock_only());
        assert_eq!(
            Path::new(&config.mock.base_path),
            dir.path().join("ipfs_mock")
        );
        assert_eq!(config.timeouts, Timeouts::default());
        assert!(!config_file.with_extension("tmp").exists());
    }

    #[test]
    fn init_keeps_existing_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("storage.toml");
        fs::write(
            &config_file,
            "# node credentials\n[pinata]\njwt = \"token\"\n\n[timeouts]\nprobe_secs = 3\n",
        )
        .unwrap();

        CmdConfig::Init.run(&config_file, dir.path()).unwrap();

        let text = fs::read_to_string(&config_file).unwrap();
        assert!(text.starts_with("# node credentials"));
        let config: StorageConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.pinata.unwrap().jwt.as_deref(), Some("token"));
        assert_eq!(config.timeouts.probe_secs, 3);
        assert_eq!(config.timeouts.transfer_secs, 120);
    }

    #[test]
    fn init_rejects_non_table_section() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("storage.toml");
        fs::write(&config_file, "mock = 5\n").unwrap();
        assert!(CmdConfig::Init.run(&config_file, dir.path()).is_err());
    }
}
