//! Paper Translator Web - Web server for translating English paper PDFs into Korean.

mod helpers;
mod routes;
mod state;
mod templates;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, header};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use clap::Parser;
use paper_translator_core::{AppConfig, workflow_from_config};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use state::AppState;

/// Sessions idle for longer than this are dropped.
const SESSION_MAX_IDLE: Duration = Duration::from_secs(60 * 60);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const UPLOAD_LIMIT_BYTES: usize = 100 * 1024 * 1024;

/// Resolve the static files directory.
///
/// Priority:
/// 1. Explicit path if provided
/// 2. ./static if it exists
/// 3. Crate's built-in static directory
fn resolve_static_dir(explicit_path: Option<&str>) -> PathBuf {
    if let Some(path) = explicit_path {
        return PathBuf::from(path);
    }

    let local_static = PathBuf::from("static");
    if local_static.is_dir() {
        return local_static;
    }

    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

#[derive(Parser, Debug)]
#[command(name = "paper-translator-web")]
#[command(author, version, about = "Paper Translator Web Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Translation history database
    #[arg(long, env = "PAPER_TRANSLATOR_DB")]
    db: Option<PathBuf>,

    /// Model name (default depends on the provider)
    #[arg(long)]
    model: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Static files directory (defaults to ./static or crate's static dir)
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };
    if let Some(db) = args.db {
        config.store.path = Some(db);
    }
    if let Some(model) = args.model {
        config.translator.model = Some(model);
    }

    let workflow =
        workflow_from_config(&config).context("Failed to initialize translation workflow")?;
    let translator = workflow.translator();
    if translator.info().requires_api_key && !translator.is_available() {
        tracing::warn!(
            "No API key configured; set {} to enable translation",
            config.translator.provider.api_key_env()
        );
    }

    let state = Arc::new(AppState::new(workflow));

    // Spawn background task for session cleanup
    let cleanup_state = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(CLEANUP_INTERVAL).await;
            let removed = cleanup_state.cleanup_old_sessions(SESSION_MAX_IDLE).await;
            info!(
                "Completed session cleanup, {} idle sessions dropped, {} active",
                removed,
                cleanup_state.session_count().await
            );
        }
    });

    let app = Router::new()
        // Pages
        .route("/", get(routes::index))
        .route("/s/{session_id}", get(routes::view_session))
        // Events (POST-Redirect-GET)
        .route("/s/{session_id}/upload", post(routes::upload_pdf))
        .route("/s/{session_id}/translate", post(routes::translate))
        .route("/s/{session_id}/new", post(routes::new_translation))
        .route("/s/{session_id}/history/{id}", post(routes::restore_translation))
        .route("/s/{session_id}/history/{id}/delete", post(routes::delete_translation))
        .route("/s/{session_id}/history/{id}/cancel", post(routes::cancel_delete))
        // Binary responses
        .route("/s/{session_id}/pdf", get(routes::view_pdf))
        .route("/s/{session_id}/download/{kind}", get(routes::download_export))
        // Static files with Cache-Control: no-cache (cache but always revalidate via ETag)
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-cache"),
                ))
                .service(ServeDir::new(resolve_static_dir(args.static_dir.as_deref()))),
        )
        // Middleware
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        ))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
