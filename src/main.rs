use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inventory_api::config::AppConfig;
use inventory_api::database::{migrations, MemoryStore, PgStore, Store};
use inventory_api::{app, AppState};

#[derive(Parser)]
#[command(name = "inventory-api")]
#[command(about = "Multi-tenant inventory API server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Keep all data in memory instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Apply the database schema")]
    Migrate,

    #[command(about = "Create a platform super admin")]
    CreateSuperAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up JWT_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command.unwrap_or(Command::Serve { memory: false }) {
        Command::Serve { memory } => serve(config, memory).await,
        Command::Migrate => {
            let store = PgStore::connect(&config.database).await?;
            migrations::run(store.pool()).await?;
            Ok(())
        }
        Command::CreateSuperAdmin { email, name, password } => {
            let store = postgres_store(&config).await?;
            let state = AppState::new(config, store);
            let admin = state
                .auth
                .create_super_admin(&name, &email, &password)
                .await
                .map_err(|e| anyhow::anyhow!("could not create super admin: {}", e))?;
            println!("Created super admin {} ({})", admin.email, admin.id);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, memory: bool) -> anyhow::Result<()> {
    info!("Starting inventory API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = if memory {
        warn!("Using the in-memory store; all data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        postgres_store(&config).await?
    };

    let port = config.server.port;
    let bootstrap = config.security.super_admin_bootstrap.clone();
    let state = AppState::new(config, store);

    if let Some(bootstrap) = bootstrap {
        match state
            .auth
            .bootstrap_super_admin(&bootstrap.email, &bootstrap.password)
            .await
        {
            Ok(Some(admin)) => info!("Bootstrapped super admin {}", admin.email),
            Ok(None) => {}
            Err(e) => anyhow::bail!("super admin bootstrap failed: {}", e),
        }
    }

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Inventory API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn postgres_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL is not set; pass --memory to run without PostgreSQL");
    }
    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;
    migrations::run(store.pool()).await?;
    Ok(Arc::new(store))
}
