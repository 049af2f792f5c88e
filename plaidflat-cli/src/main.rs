use anyhow::Result;
use clap::{Parser, Subcommand};
use plaidflat_client::{
    load_seed_ids, run_identity, run_institutions, run_items, run_transactions, HttpTransport,
    RunSummary, SandboxClient, Transport,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

mod config;
mod logging;

use config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PLAIDFLAT_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "plaidflat",
    version,
    long_version = LONG_VERSION,
    about = "Fetch sandbox institution data and flatten it into CSV"
)]
struct Cli {
    /// Config file (default: configs/plaidflat.toml, used when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory, overriding `data_dir` from the config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List institutions and write the seed CSV
    Institutions,

    /// Fetch item details for each seed institution
    Items,

    /// Fetch identity data and flatten it to one row per account owner
    Identity,

    /// Fetch transactions and flatten them joined with their accounts
    Transactions,

    /// Institutions, then items, identity and transactions
    All,

    /// Write the default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig = cli.command {
        return config::init_config(cli.config.as_deref());
    }

    let cfg = config::load_config(cli.config.as_deref())?;
    logging::init(&cfg.logging)?;
    cfg.validate()?;

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| cfg.data_dir.clone());
    info!(
        version = LONG_VERSION,
        data_dir = %data_dir.display(),
        command = ?cli.command,
        "plaidflat starting"
    );

    let credentials = config::load_credentials(cfg.env_file.as_deref())?;
    let transport = HttpTransport::new(Duration::from_secs(cfg.api.timeout_secs))?;
    let client = SandboxClient::new(transport, cfg.api.clone(), credentials);

    let summaries = run(cli.command, &client, &cfg, &data_dir).await?;
    for summary in &summaries {
        summary.log();
    }
    Ok(())
}

async fn run<T: Transport>(
    command: Command,
    client: &SandboxClient<T>,
    cfg: &Config,
    data_dir: &Path,
) -> Result<Vec<RunSummary>> {
    let seed_path = cfg.seed_path(data_dir);

    let summaries = match command {
        Command::Institutions => {
            vec![run_institutions(client, data_dir, &cfg.institutions).await?]
        }
        Command::Items => {
            let ids = load_seed_ids(&seed_path)?;
            vec![run_items(client, data_dir, &ids).await]
        }
        Command::Identity => {
            let ids = load_seed_ids(&seed_path)?;
            vec![run_identity(client, data_dir, &ids).await]
        }
        Command::Transactions => {
            let ids = load_seed_ids(&seed_path)?;
            vec![run_transactions(client, data_dir, &ids, &cfg.transactions).await]
        }
        Command::All => {
            let mut summaries = vec![run_institutions(client, data_dir, &cfg.institutions).await?];
            let ids = load_seed_ids(&seed_path)?;
            summaries.push(run_items(client, data_dir, &ids).await);
            summaries.push(run_identity(client, data_dir, &ids).await);
            summaries.push(run_transactions(client, data_dir, &ids, &cfg.transactions).await);
            summaries
        }
        Command::InitConfig => Vec::new(),
    };
    Ok(summaries)
}
