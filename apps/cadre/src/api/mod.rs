//! # Cadre HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Store status (entity counts, backend)
//! - `POST /cycles` - Create a review cycle (DRAFT)
//! - `GET /cycles` - List cycles
//! - `GET /cycles/{id}` - Get one cycle
//! - `POST /cycles/{id}/activate` - DRAFT → ACTIVE
//! - `POST /cycles/{id}/calibration` - ACTIVE → CALIBRATION
//! - `POST /cycles/{id}/complete` - CALIBRATION → COMPLETED
//! - `POST /cycles/{id}/nominations` - Nominate a reviewer
//! - `POST /cycles/{id}/feedback` - Submit peer feedback
//! - `GET /cycles/{id}/reviewees/{employee_id}/summary` - Anonymized aggregate
//! - `POST /export` - Export the store as a base64 snapshot
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `CADRE_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `CADRE_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `CADRE_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `cadre::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    activate_cycle_handler, calibrate_cycle_handler, complete_cycle_handler, create_cycle_handler,
    export_handler, get_cycle_handler, health_handler, list_cycles_handler, nominate_handler,
    status_handler, submit_feedback_handler, summary_handler,
};
#[allow(unused_imports)]
pub use types::{
    CreateCycleRequest, CycleJson, CycleListResponse, CycleResponse, ExportResponse,
    FeedbackRequest, FeedbackResponse, HealthResponse, NominationRequest, NominationResponse,
    StatusResponse, SummaryResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use cadre_core::{ReviewError, ReviewRepository};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the review repository.
#[derive(Clone)]
pub struct AppState {
    /// The repository holding cycles, nominations, and feedback.
    pub repo: Arc<RwLock<ReviewRepository>>,
}

impl AppState {
    /// Create new app state with a repository.
    #[must_use]
    pub fn new(repo: ReviewRepository) -> Self {
        Self {
            repo: Arc::new(RwLock::new(repo)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `CADRE_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("CADRE_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (CADRE_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in CADRE_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No CADRE_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    // Check if rate limiting is enabled
    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    // Review data is sensitive; warn loudly when auth is off.
    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "⚠️  API key authentication DISABLED - all endpoints are publicly accessible! \
             Set CADRE_API_KEY environment variable to enable authentication."
        );
    }

    // Build base router with routes
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/cycles",
            get(handlers::list_cycles_handler).post(handlers::create_cycle_handler),
        )
        .route("/cycles/{id}", get(handlers::get_cycle_handler))
        .route("/cycles/{id}/activate", post(handlers::activate_cycle_handler))
        .route(
            "/cycles/{id}/calibration",
            post(handlers::calibrate_cycle_handler),
        )
        .route("/cycles/{id}/complete", post(handlers::complete_cycle_handler))
        .route("/cycles/{id}/nominations", post(handlers::nominate_handler))
        .route("/cycles/{id}/feedback", post(handlers::submit_feedback_handler))
        .route(
            "/cycles/{id}/reviewees/{employee_id}/summary",
            get(handlers::summary_handler),
        )
        .route("/export", post(handlers::export_handler));

    // Apply authentication middleware (innermost - runs last on request)
    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, repo: ReviewRepository) -> Result<(), ReviewError> {
    let state = AppState::new(repo);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ReviewError::Storage(format!("Bind failed: {}", e)))?;

    tracing::info!("Cadre HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| ReviewError::Storage(format!("Server error: {}", e)))
}
