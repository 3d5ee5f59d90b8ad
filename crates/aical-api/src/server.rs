//! HTTP API Server
//!
//! Starts and manages the axum-based HTTP server.

use axum::Router;
use http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use aical_calendar::CalendarClient;
use aical_core::{Config, LlmClient};

use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: Arc<LlmClient>,
    pub calendar: Arc<CalendarClient>,
}

impl AppState {
    pub fn new(config: Config, llm: LlmClient, calendar: CalendarClient) -> Self {
        Self {
            config,
            llm: Arc::new(llm),
            calendar: Arc::new(calendar),
        }
    }

    /// Zone used when a request does not name one
    pub fn default_timezone(&self) -> &str {
        &self.config.calendar.default_timezone
    }
}

/// CORS policy for the configured origins (`*` allows any origin)
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the application router with all layers applied
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.api.allowed_origins);

    Router::new()
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP API server
pub async fn start_server(config: Config, llm: LlmClient, calendar: CalendarClient) -> anyhow::Result<()> {
    let port = config.api.port;
    let state = AppState::new(config, llm, calendar);

    info!(
        "Using model {} ({:?}), calendar backend {}",
        state.llm.model(),
        state.llm.provider(),
        state.calendar.base_url()
    );

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("HTTP API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
