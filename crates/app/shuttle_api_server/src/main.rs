//! Shuttle API server binary.
//!
//! `serve` runs the REST API; `issue-token` prints a signed bearer token for
//! an existing user (development aid).

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use shuttle_api::config::ApiConfig;
use shuttle_api::services::auth::{
    ACCESS_TOKEN_EXPIRY_SECS, issue_access_token, resolve_jwt_secret,
};
use shuttle_core::models::auth::SchoolRole;
use shuttle_core::store::{MemorySchoolStore, PgSchoolStore, SchoolStore};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use uuid::Uuid;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(name = "shuttle_api_server", version, about = "Shuttle school roster API server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the REST API.
    Serve(ServeArgs),
    /// Print a signed bearer token for a user.
    IssueToken(IssueTokenArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind (port 0 = ephemeral).
    #[arg(long, env = "BIND_ADDR")]
    bind: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Keep everything in process memory instead of PostgreSQL.
    ///
    /// Seeds one school with a `school_admin` user and logs a token for it.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[derive(Args, Debug)]
struct IssueTokenArgs {
    /// User id (`sub` claim).
    #[arg(long)]
    user_id: Uuid,

    /// Username recorded as `created_by` on new students.
    #[arg(long)]
    username: String,

    /// Token lifetime in minutes.
    #[arg(long, default_value_t = ACCESS_TOKEN_EXPIRY_SECS / 60)]
    ttl_minutes: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for `issue-token`.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,shuttle_api=debug,shuttle_core=debug")
                }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::IssueToken(args) => {
            let secret = resolve_jwt_secret();
            let token = issue_access_token(
                args.user_id,
                &args.username,
                args.ttl_minutes * 60,
                secret.as_bytes(),
            )?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ApiConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    let store: Arc<dyn SchoolStore> = if args.in_memory {
        warn!("using in-memory store; data is lost on exit");
        Arc::new(seed_memory_store(&config).await?)
    } else {
        info!(
            max_connections = args.max_connections,
            "configuring connection pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;

        info!("running database migrations");
        shuttle_api::migrate(&pool).await?;
        Arc::new(PgSchoolStore::new(pool))
    };

    let state = shuttle_api::AppState {
        store,
        config: config.clone(),
    };
    let app = shuttle_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Memory store with one school and its administrator.
async fn seed_memory_store(
    config: &ApiConfig,
) -> Result<MemorySchoolStore, Box<dyn std::error::Error>> {
    let store = MemorySchoolStore::new();
    let school = store.add_school("Demo School").await;
    let admin = store
        .add_user("admin", SchoolRole::SchoolAdmin, Some(school))
        .await?;
    let token = issue_access_token(
        admin,
        "admin",
        ACCESS_TOKEN_EXPIRY_SECS,
        config.jwt_secret.as_bytes(),
    )?;
    info!(%school, user_id = %admin, %token, "seeded demo school admin");
    Ok(store)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
