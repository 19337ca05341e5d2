use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use sitetrack::{api, config::AppConfig, db, progress::ProgressSync};

#[derive(Parser)]
#[command(name = "sitetrack")]
#[command(about = "Construction project tracking with phase-weighted progress")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print a project's current phase and progress
    Progress {
        /// Project UUID
        project_id: Uuid,
    },
    /// Recompute, advance and persist a project's progress
    Sync {
        /// Project UUID
        project_id: Uuid,
    },
    /// Print the active phase catalog
    Phases,
    /// Print the effective configuration after environment overrides
    Config,
}

/// Initialize tracing, honouring RUST_LOG
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "sitetrack=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(config: &AppConfig) -> anyhow::Result<db::Database> {
    let db = match &config.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: &AppConfig, port: u16) -> anyhow::Result<()> {
    let catalog = config.phase_catalog()?;
    let db = open_database(config)?;
    let app = api::create_router_with_state(api::AppState::new(db, catalog));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("SiteTrack server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load()?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            serve(&config, port.unwrap_or(config.port)).await?;
        }
        Some(Commands::Progress { project_id }) => {
            let sync = ProgressSync::new(open_database(&config)?, config.phase_catalog()?);
            let snapshot = sync.try_progress_snapshot(project_id)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Some(Commands::Sync { project_id }) => {
            let sync = ProgressSync::new(open_database(&config)?, config.phase_catalog()?);
            let report = sync.try_sync_all_project_data(project_id)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some(Commands::Phases) => {
            let catalog = config.phase_catalog()?;
            for entry in catalog.entries() {
                println!("{:<24} {:>3}%", entry.phase.as_str(), entry.weight);
            }
        }
        Some(Commands::Config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        None => {
            serve(&config, config.port).await?;
        }
    }

    Ok(())
}
