use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{FromRequestParts, rejection::QueryRejection},
    http::{HeaderName, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use log::{error, info};
use playbook_domain::{ServiceError, app::AppState};
use tower_http::cors::{Any, CorsLayer};

mod requests;
mod search;
mod stats;
mod status;

pub use requests::{InFlightRequests, RateLimiter};

/// Requests admitted per client within one rate-limit window.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: u32,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .expect("API_PORT must be a valid u16");
        let rate_limit = std::env::var("RATE_LIMIT")
            .map(|v| v.parse::<u32>().expect("RATE_LIMIT must be a valid u32"))
            .unwrap_or(DEFAULT_RATE_LIMIT);
        Self {
            host,
            port,
            rate_limit,
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-authorization"),
            HeaderName::from_static(stats::ENTITY_TYPE_HEADER),
            HeaderName::from_static(stats::STATS_TYPE_HEADER),
        ])
}

pub fn build_router(
    app: AppState,
    rate_limiter: RateLimiter,
    in_flight: InFlightRequests,
) -> Router {
    Router::new()
        .route("/", get(stats::dispatch))
        .route("/stats", get(stats::summary))
        .route("/search", get(search::search_players))
        .route("/search-team", get(search::search_teams))
        .route("/status", get(status::status))
        .route("/status/", get(status::status))
        .route("/routes", get(status::routes))
        .route("/test-db", get(status::test_db))
        .route("/test-cors", get(status::test_cors))
        .merge(stats::deprecated_routes())
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            requests::rate_limit,
        ))
        .layer(cors_layer())
        .layer(middleware::from_fn(requests::log_request))
        .layer(middleware::from_fn_with_state(
            in_flight,
            requests::track_in_flight,
        ))
        .with_state(app)
}

pub async fn run(
    app: AppState,
    config: ServerConfig,
    in_flight: InFlightRequests,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    info!(
        "Rate limiting set to {} requests per 15 minutes.",
        config.rate_limit
    );
    let router = build_router(app, RateLimiter::new(config.rate_limit), in_flight);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port))
        .await
        .expect("Failed to bind API listener");

    info!("API server listening on {}:{}", config.host, config.port);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await
    .expect("API server failed");

    info!("HTTP API shut down gracefully");
}

pub struct ApiError(ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self.0 {
            ServiceError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServiceError::Unavailable(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ServiceError::Internal(msg) => {
                error!("Database query error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        error_response(status, msg)
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        ApiError(value)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(ServiceError::BadRequest(rejection.body_text()))
    }
}

/// Query string extractor that rejects with the JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

pub(crate) fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": msg.into() });
    (status, Json(body)).into_response()
}
