use crate::init_config::CmdConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use directories::ProjectDirs;
use std::path::PathBuf;

mod cmd;
mod init_config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Storage config file [default: <config dir>/oblivion/storage.toml]
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Skip the remote backends and use the local mock store
    #[arg(long, global = true)]
    mock: bool,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modify the storage config
    Config {
        #[command(subcommand)]
        cmd: CmdConfig,
    },
    /// Show which backend would be selected and why
    Probe,
    #[command(flatten)]
    Objects(ObjectsCmd),
}

#[derive(Subcommand)]
enum ObjectsCmd {
    /// Upload a local file
    Upload {
        path: PathBuf,
        /// Object name; defaults to the file name
        #[arg(long)]
        name: Option<String>,
    },
    /// Upload a local JSON document
    UploadJson {
        path: PathBuf,
        /// Object name; defaults to the file name
        #[arg(long)]
        name: Option<String>,
    },
    /// Download an object into a local file
    Download {
        cid: String,
        /// Output file path to write the object to
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a stored JSON document
    CatJson { cid: String },
    /// Ask the backend to retain an object
    Pin {
        cid: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the public URL of an object
    Gateway { cid: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    // Config under ~/.config/oblivion/storage.toml, data under
    // ~/.local/share/oblivion/
    let dirs = ProjectDirs::from("", "", "oblivion")
        .context("failed to determine config directory path")?;

    let config_file = cli
        .config
        .unwrap_or_else(|| dirs.config_dir().join("storage.toml"));

    cmd::run_command(config_file, dirs.data_dir(), cli.mock, cli.cmd).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn object_commands_stay_top_level() {
        let cli = Cli::try_parse_from(["oblivion", "--mock", "upload", "w.bin", "--name", "weights"])
            .unwrap();
        assert!(cli.mock);
        assert!(matches!(
            cli.cmd,
            Commands::Objects(ObjectsCmd::Upload { ref path, name: Some(ref name) })
                if path == &PathBuf::from("w.bin") && name == "weights"
        ));

        let cli = Cli::try_parse_from(["oblivion", "download", "ipfs://QmX", "--out", "x.bin"])
            .unwrap();
        assert!(matches!(cli.cmd, Commands::Objects(ObjectsCmd::Download { .. })));

        let cli = Cli::try_parse_from(["oblivion", "config", "init"]).unwrap();
        assert!(matches!(cli.cmd, Commands::Config { cmd: CmdConfig::Init }));
    }
}
