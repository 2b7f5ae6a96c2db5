use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use larder_api::{app, AppState, ServerConfig, StorageBackend};
use larder_core::{InMemoryRecipeRepository, RecipeRepository};
use larder_db::{log_pool_metrics, Database};

/// Install the global subscriber.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables daily-rotated file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter (default: "larder_api=debug,tower_http=debug")
///
/// The returned guard flushes the file writer and must be held for the life
/// of the process.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "larder_api=debug,larder_db=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("larder-api.log");
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(file_dir, file_name));

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(log_ansi.unwrap_or(false)),
                )
                .init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let config = ServerConfig::from_env()?;
    info!(
        storage = %config.storage,
        max_body_bytes = config.max_body_bytes,
        "Configuration loaded"
    );

    let recipes: Arc<dyn RecipeRepository> = match config.storage {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let db = Database::connect_with_config(&config.database_url, config.pool_config())
                .await?;

            info!("Running database migrations...");
            db.migrate().await?;
            log_pool_metrics(db.pool());
            info!("Database ready");

            Arc::new(db.recipes)
        }
        StorageBackend::Memory => {
            info!("Using in-memory recipe store; data will not survive a restart");
            Arc::new(InMemoryRecipeRepository::new())
        }
    };

    let app = app(AppState::new(recipes), config.max_body_bytes);

    let addr = config.bind_addr()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
