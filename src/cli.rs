//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::StockfolioError;
use crate::logging::{LogFormat, init_tracing};

#[cfg(feature = "sqlite")]
use crate::adapters::sqlite_adapter::SqliteAdapter;
#[cfg(feature = "sqlite")]
use crate::domain::service::HoldingService;
#[cfg(feature = "sqlite")]
use crate::ports::config_port::ConfigPort;
#[cfg(feature = "sqlite")]
use crate::ports::price_port::PricePort;
#[cfg(feature = "sqlite")]
use std::sync::Arc;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

#[derive(Parser, Debug)]
#[command(name = "stockfolio", about = "Stock portfolio tracker and valuation service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Load an S&P 500 constituents CSV into the store
    ImportConstituents {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print the current portfolio valuation as JSON
    Valuation {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Value the portfolio and store the resolved prices
    Refresh {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Read a token from stdin and print its argon2 hash
    HashToken,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::ImportConstituents { config, csv } => run_import_constituents(&config, &csv),
        Command::Valuation { config } => run_valuation(&config, false),
        Command::Refresh { config } => run_valuation(&config, true),
        Command::HashToken => run_hash_token(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

/// Load the INI file and install the tracing subscriber it asks for.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StockfolioError> {
    let config = FileConfigAdapter::from_file(path)?;
    init_tracing(LogFormat::from_config(&config));
    Ok(config)
}

#[cfg(feature = "sqlite")]
pub fn open_store(config: &dyn ConfigPort) -> Result<Arc<SqliteAdapter>, StockfolioError> {
    let store = SqliteAdapter::from_config(config)?;
    store.initialize_schema()?;
    Ok(Arc::new(store))
}

/// `[provider] kind` picks the price source; Alpha Vantage unless told otherwise.
#[cfg(feature = "sqlite")]
pub fn build_price_port(
    config: &dyn ConfigPort,
    store: Arc<SqliteAdapter>,
) -> Result<Arc<dyn PricePort>, StockfolioError> {
    use crate::adapters::alpha_vantage_adapter::AlphaVantageAdapter;
    use crate::adapters::constituent_price_adapter::ConstituentPriceAdapter;

    match config.get_string("provider", "kind").as_deref() {
        Some("constituents") => Ok(Arc::new(ConstituentPriceAdapter::new(store))),
        _ => Ok(Arc::new(AlphaVantageAdapter::from_config(config)?)),
    }
}

#[cfg(feature = "sqlite")]
pub fn build_service(
    config: &dyn ConfigPort,
    store: Arc<SqliteAdapter>,
) -> Result<HoldingService, StockfolioError> {
    use crate::domain::config_validation::build_service_settings;

    let settings = build_service_settings(config)?;
    let prices = build_price_port(config, store.clone())?;
    tracing::info!(provider = prices.name(), "price provider selected");
    Ok(HoldingService::new(store, prices, settings))
}

/// Parse a constituents CSV and upsert every row. Returns the row count.
#[cfg(feature = "sqlite")]
pub fn import_constituents(store: &SqliteAdapter, csv: &Path) -> Result<usize, StockfolioError> {
    use crate::adapters::csv_adapter::ConstituentsCsv;
    use crate::ports::constituents_port::ConstituentsPort;

    let rows = ConstituentsCsv::new(csv.to_path_buf()).load()?;
    store.upsert_constituents(&rows)
}

/// First line of `reader`, trimmed. An empty token is rejected.
pub fn read_token<R: BufRead>(reader: R) -> Result<String, StockfolioError> {
    let token = reader
        .lines()
        .next()
        .transpose()?
        .map(|line| line.trim().to_string())
        .unwrap_or_default();
    if token.is_empty() {
        return Err(StockfolioError::invalid("token must not be empty"));
    }
    Ok(token)
}

fn runtime() -> Result<tokio::runtime::Runtime, StockfolioError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

#[cfg(feature = "sqlite")]
fn run_import_constituents(config_path: &Path, csv: &Path) -> Result<(), StockfolioError> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    eprintln!("Importing constituents from {}", csv.display());
    let count = import_constituents(&store, csv)?;
    println!("Imported {count} constituents");
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn run_import_constituents(_config_path: &Path, _csv: &Path) -> Result<(), StockfolioError> {
    Err(StockfolioError::invalid(
        "sqlite feature is required for import-constituents",
    ))
}

#[cfg(feature = "sqlite")]
fn run_valuation(config_path: &Path, save: bool) -> Result<(), StockfolioError> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let service = build_service(&config, store)?;

    let as_of = chrono::Local::now().date_naive();
    let valuation = runtime()?.block_on(async {
        if save {
            service.refresh_and_save(as_of).await
        } else {
            service.valuation(as_of).await
        }
    })?;

    let json = serde_json::to_string_pretty(&valuation).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn run_valuation(_config_path: &Path, _save: bool) -> Result<(), StockfolioError> {
    Err(StockfolioError::invalid("sqlite feature is required for valuation"))
}

#[cfg(feature = "web")]
fn run_serve(config_path: &Path) -> Result<(), StockfolioError> {
    use crate::adapters::web::{AccessGate, AppState, build_router};
    use std::net::SocketAddr;

    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    let store = open_store(&config)?;
    let service = build_service(&config, store.clone())?;
    let access = AccessGate::from_config(&config)?;

    let listen = config
        .get_string("server", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    let addr: SocketAddr = listen.parse().map_err(|e| StockfolioError::ConfigInvalid {
        section: "server".into(),
        key: "listen".into(),
        reason: format!("'{listen}': {e}"),
    })?;

    let router = build_router(AppState {
        service: Arc::new(service),
        constituents: store,
        access,
    });

    runtime()?.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, "listening");
        axum::serve(listener, router).await?;
        Ok::<(), StockfolioError>(())
    })
}

#[cfg(not(feature = "web"))]
fn run_serve(_config_path: &Path) -> Result<(), StockfolioError> {
    Err(StockfolioError::invalid("web feature is required for serve"))
}

#[cfg(feature = "web")]
fn run_hash_token() -> Result<(), StockfolioError> {
    eprintln!("Enter token to hash:");
    let token = read_token(io::stdin().lock())?;
    println!("{}", crate::adapters::web::hash_token(&token)?);
    Ok(())
}

#[cfg(not(feature = "web"))]
fn run_hash_token() -> Result<(), StockfolioError> {
    Err(StockfolioError::invalid("web feature is required for hash-token"))
}
