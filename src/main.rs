use std::path::PathBuf;

use anyhow::{Context, Result};
use capture_replay::config::{Config, StoreConfig, ENV_CAPTURE_REPLAY_MODE};
use capture_replay::data::{CallIdentity, CapturedRecord};
use capture_replay::store::{CaptureStore, DirectoryCaptureStore, DEFAULT_CAPTURE_FILE_EXTENSION};
use clap::{Args, Parser, Subcommand};

/// Inspect and maintain capture directories.
#[derive(Parser, Debug)]
#[command(name = "capture-replay", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the capture keys stored in a directory
    List(StoreArgs),
    /// Print the type and value stored under a capture key
    Show {
        #[command(flatten)]
        store: StoreArgs,
        /// Capture key, e.g. `getString` or `convert-123-0`
        key: String,
    },
    /// Print the capture key a call would be stored under
    Key {
        /// Method name
        method: String,
        /// Arguments as JSON literals (`null`, `42`, `"text"`); anything that
        /// is not valid JSON is taken as a plain string
        args: Vec<String>,
    },
    /// Delete every capture file in a directory
    Purge(StoreArgs),
    /// Print the configuration a test run would be wired with
    Config {
        /// TOML config file; defaults apply when omitted
        #[arg(long, short = 'f', value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Capture directory
    #[arg(long, short = 'd', value_name = "DIR")]
    dir: PathBuf,

    /// Capture file extension
    #[arg(long, short = 'e', default_value = DEFAULT_CAPTURE_FILE_EXTENSION)]
    extension: String,
}

impl StoreArgs {
    fn open(&self) -> Result<DirectoryCaptureStore> {
        Ok(DirectoryCaptureStore::with_extension(
            self.dir.to_string_lossy(),
            self.extension.as_str(),
        )?)
    }
}

fn print_config(config: &Config) {
    match config.mode {
        Some(mode) => println!("mode: {mode}"),
        None => println!("mode: (unset)"),
    }
    match &config.store {
        StoreConfig::Directory { path, extension } => println!(
            "store: directory {} ({extension})",
            path.as_deref().unwrap_or("(unset)")
        ),
        StoreConfig::Temporary => println!("store: temporary"),
    }
    println!("pretty: {}", config.pretty);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List(store) => {
            for key in store.open()?.keys()? {
                println!("{key}");
            }
        }
        Command::Show { store, key } => {
            let slot = store.open()?.existing_slot(&key)?;
            let bytes = slot.read_bytes()?;
            let record: CapturedRecord = serde_json::from_slice(&bytes)
                .with_context(|| format!("{} is not a capture record", slot.path().display()))?;
            println!("type: {}", record.type_name);
            println!("{}", serde_json::to_string_pretty(&record.value)?);
        }
        Command::Key { method, args } => {
            let values: Vec<serde_json::Value> = args
                .iter()
                .map(|raw| {
                    serde_json::from_str(raw)
                        .unwrap_or_else(|_| serde_json::Value::String(raw.clone()))
                })
                .collect();
            println!("{}", CallIdentity::from_values(method, &values).capture_key());
        }
        Command::Purge(store) => {
            let removed = store.open()?.purge_all()?;
            println!("removed {removed} capture file(s)");
        }
        Command::Config { file } => {
            let config = Config::resolve(file.as_deref()).with_context(|| {
                format!("could not resolve config (env {ENV_CAPTURE_REPLAY_MODE})")
            })?;
            print_config(&config);
        }
    }

    Ok(())
}
