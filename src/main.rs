use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use squares_pool::application::assigner::RandomAssigner;
use squares_pool::application::registry::GameRegistry;
use squares_pool::config::EngineConfig;
use squares_pool::domain::money::Balance;
use squares_pool::domain::ports::Stores;
use squares_pool::interfaces::csv::balance_writer::BalanceWriter;
use squares_pool::interfaces::csv::command_reader::CommandReader;
use squares_pool::interfaces::replay::ScriptRunner;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command script (CSV)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "SQUARES_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Seed for digit assignment. Random when omitted.
    #[arg(long, env = "SQUARES_SEED")]
    seed: Option<u64>,

    /// Balance granted to each newly registered user
    #[arg(long, env = "SQUARES_STARTING_BALANCE", default_value = "1000")]
    starting_balance: Decimal,

    /// Maximum number of boards returned by a board listing
    #[arg(long, env = "SQUARES_BOARD_LIST_LIMIT", default_value_t = 100)]
    board_list_limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let stores = open_stores(cli.db_path)?;
    let assigner = match cli.seed {
        Some(seed) => RandomAssigner::seeded(seed),
        None => RandomAssigner::from_entropy(),
    };
    let config = EngineConfig {
        starting_balance: Balance::new(cli.starting_balance),
        board_list_limit: cli.board_list_limit,
    };
    let registry = GameRegistry::new(stores, assigner, config);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let mut runner = ScriptRunner::new(&registry);
    for (index, command) in reader.commands().enumerate() {
        // line 1 is the header
        let line = index + 2;
        match command {
            Ok(command) => {
                if let Err(e) = runner.apply(command).await {
                    warn!(line, kind = ?e.kind(), error = %e, "Error processing command");
                }
            }
            Err(e) => {
                warn!(line, error = %e, "Error reading command");
            }
        }
    }

    let accounts = registry.accounts().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_accounts(&accounts).into_diagnostic()?;

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    use squares_pool::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => Ok(RocksDBStore::open(path).into_diagnostic()?.stores()),
        None => Ok(Stores::in_memory()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        warn!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Stores::in_memory())
}
