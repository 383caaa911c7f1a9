//! Remit daemon: entry point for running a ledger node against scripts.

mod script;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use remit_node::{LedgerNode, NodeConfig};
use remit_nullables::NullCustody;
use remit_types::Identity;
use remit_utils::LogFormat;

#[derive(Parser)]
#[command(name = "remit-daemon", about = "Remit escrow ledger daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "REMIT_CONFIG")]
    config: Option<PathBuf>,

    /// Owner identity for a fresh ledger.
    #[arg(long, env = "REMIT_OWNER")]
    owner: Option<Identity>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "REMIT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "REMIT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a JSON operation script and print one result line per step.
    Replay {
        /// Script file: a JSON array of tagged operations.
        #[arg(long)]
        script: PathBuf,

        /// Snapshot file to load before and save after the run.
        #[arg(long, env = "REMIT_SNAPSHOT")]
        snapshot: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    ShowConfig,
}

/// Merge the optional config file with CLI overrides.
fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)?,
        None => NodeConfig::default(),
    };
    if let Some(owner) = &cli.owner {
        config.owner = Some(owner.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Command::Replay { snapshot: Some(path), .. } = &cli.command {
        config.snapshot_path = Some(path.clone());
    }
    Ok(config)
}

/// Open the ledger: restore it from the snapshot when one exists, otherwise
/// start a fresh one owned by the configured owner.
///
/// `custody_funding` seeds the external wallets of a fresh ledger only. A
/// restored ledger starts with empty wallets and custody holding exactly
/// what the engine owes, so funds deposited in an earlier run are not
/// handed out twice.
async fn open_node(config: &NodeConfig) -> anyhow::Result<LedgerNode<NullCustody>> {
    match config.snapshot_path.as_deref() {
        Some(path) if tokio::fs::try_exists(path).await? => {
            let node = LedgerNode::restore_with(path, |engine| {
                NullCustody::new().with_held(engine.liabilities())
            })
            .with_context(|| format!("restoring snapshot {}", path.display()))?;
            Ok(node)
        }
        _ => Ok(LedgerNode::new(
            config.require_owner()?.clone(),
            NullCustody::with_funding(config.funding()),
        )),
    }
}

async fn replay(config: &NodeConfig, script_path: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(script_path)
        .await
        .with_context(|| format!("reading script {}", script_path.display()))?;
    let ops = script::parse(&text).context("parsing script")?;
    let node = Arc::new(open_node(config).await?);

    tracing::info!(steps = ops.len(), script = %script_path.display(), "replaying script");
    let worker = Arc::clone(&node);
    let rejected = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let rejected = script::replay(&worker, &ops, &mut out)?;
        out.flush()?;
        anyhow::Ok(rejected)
    })
    .await??;

    let stats = node.stats();
    tracing::info!(
        operations = stats.total(),
        rejected,
        outcomes = ?stats.snapshot(),
        tick = %node.current_tick(),
        "replay finished"
    );

    if let Some(path) = &config.snapshot_path {
        node.save_snapshot(path)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    remit_utils::init_logging(config.log_format, &config.log_level);

    match &cli.command {
        Command::Replay { script, .. } => replay(&config, script).await,
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
