//! HTTP surface.
//!
//! - `POST /api/analyze` takes `{"image": "<data url>"}` and answers with an
//!   [`AnalysisReport`](crate::analysis::AnalysisReport)
//! - `GET /health` answers `{"status":"ok"}`

mod error;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::analysis::Analyzer;
use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};

pub use error::ErrorBody;
pub use routes::AnalyzeRequest;

/// State shared by all handlers.
#[derive(Debug)]
pub struct AppState {
    /// The analysis pipeline.
    pub analyzer: Analyzer,
}

/// Build the CORS layer. No configured origins means any origin.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the application router.
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/analyze", post(routes::analyze_handler))
        .route("/health", get(routes::health_handler))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the analyzer cannot be built, the address cannot be
/// bound, or the server fails while running.
pub async fn serve(config: &Config) -> Result<()> {
    info!("Initializing state...");
    let state = Arc::new(AppState {
        analyzer: Analyzer::from_config(config)?,
    });

    let address = config.bind_address()?;
    info!("Binding to {address}");

    let listener = TcpListener::bind(address).await.map_err(|source| Error::Bind {
        address: address.to_string(),
        source,
    })?;
    info!("Server running on http://{address}");

    axum::serve(listener, router(state, &config.server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
