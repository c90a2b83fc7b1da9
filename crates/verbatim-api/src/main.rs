//! verbatim-api - HTTP API server for verbatim

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use verbatim_api::handlers::{account, chat, export, guest, settings, transcripts};
use verbatim_api::{ApiConfig, AppState};
use verbatim_db::Database;
use verbatim_inference::chat::{ChatBackend, OpenAiChatBackend};
use verbatim_inference::transcription::AssemblyAiBackend;
use verbatim_media::{AudioConverter, ConverterConfig, TranscriptionPipeline};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// CORS CONFIGURATION HELPER
// =============================================================================

/// Convert the configured origin whitelist into header values, dropping
/// anything unparseable.
fn allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

// =============================================================================
// MISC HANDLERS
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve OpenAPI YAML spec
async fn openapi_yaml() -> impl IntoResponse {
    const SPEC: &str = include_str!("openapi.yaml");
    ([(header::CONTENT_TYPE, "application/yaml")], SPEC)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   RUST_LOG    - standard env filter (default: "verbatim_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "verbatim_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("verbatim-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
        None
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
        None
    };

    let config = ApiConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        "Configuration loaded"
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Drop expired auth tokens left over from previous runs
    match db.tokens.purge_expired().await {
        Ok(purged) if purged > 0 => info!(purged, "Purged expired auth tokens"),
        Ok(_) => {}
        Err(e) => warn!("Failed to purge expired tokens: {e}"),
    }

    // Provider backends: missing keys degrade the endpoints that need them,
    // never the whole process.
    let converter = AudioConverter::new(ConverterConfig::default());
    if !converter.health_check().await.unwrap_or(false) {
        warn!("ffmpeg not found on PATH; transcription requests will fail");
    }

    let pipeline = match AssemblyAiBackend::from_env() {
        Some(backend) => Some(Arc::new(TranscriptionPipeline::new(
            converter,
            Arc::new(backend),
            config.output_dir.clone(),
        ))),
        None => {
            warn!("AAI_API_KEY not set; transcription endpoints disabled");
            None
        }
    };

    let chat_backend: Option<Arc<dyn ChatBackend>> = match OpenAiChatBackend::from_env() {
        Some(backend) => Some(Arc::new(backend)),
        None => {
            warn!("OPENAI_API_KEY not set; chat endpoint disabled");
            None
        }
    };

    let state = AppState {
        db,
        config: Arc::new(config.clone()),
        pipeline,
        chat_backend,
    };

    // Build router
    let app = Router::new()
        // Health check and API docs
        .route("/health", get(health_check))
        .route("/openapi.yaml", get(openapi_yaml))
        // Accounts and sessions
        .route("/register", post(account::register))
        .route("/token", post(account::login))
        .route("/refresh", post(account::refresh))
        .route("/me", get(account::me).delete(account::delete_account))
        .route("/me/password", put(account::change_password))
        .route("/me/email", put(account::change_email))
        // Transcription workflow
        .route("/transcribe", post(transcripts::transcribe))
        .route("/transcripts/list", get(transcripts::list))
        .route(
            "/transcripts/:id",
            get(transcripts::download)
                .patch(transcripts::rename)
                .delete(transcripts::delete),
        )
        .route("/transcripts/:id/utterances", get(transcripts::utterances))
        .route("/transcripts/:id/speakers", put(transcripts::update_speaker))
        // Transcript chat
        .route("/chat/:id", post(chat::send))
        .route("/chat/:id/history", get(chat::history).delete(chat::clear))
        // Settings
        .route("/settings", get(settings::get).put(settings::update))
        // Data export
        .route("/export", get(export::export))
        // Guest mode
        .route("/guest/transcribe", post(guest::transcribe))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins(&config.cors_origins)))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
