use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use branch_asset_api::config::config;
use branch_asset_api::database::DatabaseManager;
use branch_asset_api::{app, is_production, AppState};

#[derive(Parser)]
#[command(name = "branch-asset-api")]
#[command(about = "Branch asset registry API server")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides API_PORT / PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Run on in-memory stores instead of MongoDB; data is lost on exit
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so MONGODB_URI, JWT_SECRET, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("branch_asset_api=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = config();
    tracing::info!("Starting Branch Asset API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }
    if is_production!() && args.memory {
        anyhow::bail!("--memory is not allowed in production");
    }

    let (state, database) = if args.memory {
        tracing::warn!("Using in-memory stores");
        (AppState::memory(config), None)
    } else {
        let db = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to MongoDB")?;
        db.ensure_indexes().await.context("failed to create indexes")?;
        (AppState::mongo(config, db.clone()), Some(db))
    };

    if let (Some(username), Some(password)) = (
        config.security.bootstrap_admin.as_deref(),
        config.security.bootstrap_admin_password.as_deref(),
    ) {
        let created = state
            .users
            .bootstrap_admin(username, password, &config.security.bootstrap_admin_branch)
            .await
            .context("admin bootstrap failed")?;
        if created {
            tracing::info!("Created bootstrap admin '{}'", username);
        }
    }

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Branch Asset API listening on http://{}", bind_addr);

    axum::serve(listener, app(config, state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(db) = database {
        db.shutdown().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
