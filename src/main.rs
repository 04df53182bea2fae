use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shardctl::config::{ConfigLoader, ConfigOverlay, ShardctlConfig};
use shardctl::mongo::ClusterClient;
use shardctl::normalize::normalize_output;
use shardctl::report::parse_status_report;
use shardctl::subprocess::TokioProcessRunner;
use shardctl::ShardctlError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, trace};

/// Inspect MongoDB sharded clusters through the mongo shell
#[derive(Parser)]
#[command(name = "shardctl", version)]
#[command(about = "Inspect MongoDB sharded clusters through the mongo shell", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a configuration file (.toml, .yml or .yaml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Endpoint to connect to, e.g. 127.0.0.1:27017
    #[arg(long, global = true)]
    host: Option<String>,

    /// Database the expression is evaluated in
    #[arg(long, global = true)]
    context: Option<String>,

    /// Backoff budget: retry while the next wait is at most 2^N seconds
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cluster status report as JSON
    Status,
    /// List every shard with its host and collection shard keys
    Shards,
    /// Show one shard by name
    Shard {
        /// Shard name (the `_id` in the status report)
        name: String,
    },
    /// Evaluate an expression and print its output as JSON
    Eval {
        /// Shell expression, e.g. 'db.version()'
        expression: String,
    },
    /// Parse captured `sh.status()` output without contacting a server
    ParseStatus {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Normalize captured shell output to JSON without contacting a server
    Normalize {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = load_config(&cli).await;
    let configured_level = config.as_ref().ok().and_then(|c| c.log_level.clone());
    init_tracing(cli.verbose, configured_level.as_deref());

    debug!("shardctl started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match config {
        Ok(config) => run(cli.command, config, cli.pretty).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        let code = match e.downcast_ref::<ShardctlError>() {
            Some(err) => {
                eprintln!("Error [E{:04}]: {}", err.code(), err.user_message());
                err.exit_code()
            }
            None => {
                eprintln!("Error: {e:#}");
                1
            }
        };
        std::process::exit(code);
    }
}

fn init_tracing(verbose: u8, configured: Option<&str>) {
    let log_level = match verbose {
        0 => configured.unwrap_or("info"),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .init();
}

async fn load_config(cli: &Cli) -> shardctl::Result<ShardctlConfig> {
    let mut loader = ConfigLoader::new();
    loader.load_global().await?;
    if let Some(path) = &cli.config {
        loader.load_file(path).await?;
    }
    loader.load_env()?;
    loader.apply(ConfigOverlay {
        host: cli.host.clone(),
        context: cli.context.clone(),
        max_retries: cli.retries,
        ..Default::default()
    })?;
    loader.finish()
}

async fn run(command: Commands, config: ShardctlConfig, pretty: bool) -> anyhow::Result<()> {
    let client = || ClusterClient::from_config(&config, Arc::new(TokioProcessRunner));

    match command {
        Commands::Status => print_json(&client().status().await?, pretty),
        Commands::Shards => print_json(&client().shards().await?, pretty),
        Commands::Shard { name } => {
            let shard = client()
                .shard(&name)
                .await?
                .ok_or_else(|| anyhow!("Shard '{}' not found on {}", name, config.host))?;
            print_json(&shard, pretty)
        }
        Commands::Eval { expression } => {
            print_json(&client().eval_json(&expression).await?, pretty)
        }
        Commands::ParseStatus { file } => {
            let raw = read_input(file.as_deref()).await?;
            print_json(&parse_status_report(&raw), pretty)
        }
        Commands::Normalize { file } => {
            let raw = read_input(file.as_deref()).await?;
            print_json(&normalize_output(&raw)?, pretty)
        }
    }
}

async fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
