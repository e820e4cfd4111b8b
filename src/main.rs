use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use bizhours::config::Config;
use bizhours::ingest::{load_csv, LoadSummary};
use bizhours::queries::QueryService;
use bizhours::storage::{SqliteStorage, Storage};
use bizhours::{logging, server};

#[derive(Parser)]
#[command(name = "bizhours")]
#[command(about = "Business directory loader and open-hours query API")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the CSV batch load into the local store
    Ingest {
        /// Path to the CSV export
        #[arg(long)]
        csv: Option<String>,
        /// Path to the SQLite database file
        #[arg(long)]
        db: Option<String>,
    },
    /// Serve the read-only query API over an already-loaded store
    Serve {
        /// Path to the SQLite database file
        #[arg(long)]
        db: Option<String>,
        /// Address to bind, e.g. 127.0.0.1:8000
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run the batch load, then serve the query API
    Run {
        /// Path to the CSV export
        #[arg(long)]
        csv: Option<String>,
        /// Path to the SQLite database file
        #[arg(long)]
        db: Option<String>,
        /// Address to bind, e.g. 127.0.0.1:8000
        #[arg(long)]
        bind: Option<String>,
    },
}

fn print_summary(summary: &LoadSummary) {
    println!("\n📊 Batch load results:");
    println!("   Rows read: {}", summary.rows_read);
    println!("   Businesses loaded: {}", summary.businesses_loaded);
    println!("   Rows skipped: {}", summary.rows_skipped);
    println!("   Field warnings: {}", summary.field_warnings);

    if !summary.skipped.is_empty() {
        println!("\n⚠️  Skipped rows:");
        for reason in &summary.skipped {
            println!("   - {}", reason);
        }
    }
}

async fn run_ingest(csv_path: &str, storage: &dyn Storage) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔄 Loading {} ...", csv_path);
    match load_csv(csv_path, storage).await {
        Ok(summary) => {
            print_summary(&summary);
            println!("✅ Load completed");
            Ok(())
        }
        Err(e) => {
            error!("Batch load failed: {}", e);
            println!("❌ Load failed: {}", e);
            Err(e.into())
        }
    }
}

async fn run_serve(
    bind: &str,
    storage: Arc<dyn Storage>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| format!("Invalid bind address '{}': {}", bind, e))?;
    let queries = Arc::new(QueryService::new(storage));
    server::run_server(addr, queries).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Ingest { csv, db } => {
            let csv_path = csv.unwrap_or(config.csv_path);
            let db_path = db.unwrap_or(config.db_path);
            let storage = SqliteStorage::open(&db_path)?;
            info!("Ingesting {} into {}", csv_path, db_path);
            run_ingest(&csv_path, &storage).await?;
        }
        Commands::Serve { db, bind } => {
            let db_path = db.unwrap_or(config.db_path);
            let bind = bind.unwrap_or(config.bind_addr);
            let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open(&db_path)?);
            run_serve(&bind, storage).await?;
        }
        Commands::Run { csv, db, bind } => {
            let csv_path = csv.unwrap_or(config.csv_path);
            let db_path = db.unwrap_or(config.db_path);
            let bind = bind.unwrap_or(config.bind_addr);
            let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open(&db_path)?);
            run_ingest(&csv_path, storage.as_ref()).await?;
            run_serve(&bind, storage).await?;
        }
    }

    Ok(())
}
