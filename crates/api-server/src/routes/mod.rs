//! Route handlers

pub mod health;
pub mod task;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{log_request, require_basic_auth, Credentials};
use crate::state::AppState;

/// Knobs applied when assembling the router
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Upper bound on a whole request/response transaction
    pub request_timeout: Duration,
    /// When set, the task routes require these Basic credentials
    pub auth: Option<Credentials>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(1),
            auth: None,
        }
    }
}

/// Build the full application router
pub fn app(state: AppState, options: &RouterOptions) -> Router {
    let mut tasks = task::router();
    if let Some(credentials) = options.auth.clone() {
        tasks = tasks.route_layer(middleware::from_fn_with_state(
            Arc::new(credentials),
            require_basic_auth,
        ));
    }

    let router = Router::new()
        .merge(health::router())
        .merge(tasks)
        .with_state(state);
    with_common_layers(router, options)
}

/// Layers every route shares: access log, transaction timeout, HTTP tracing
fn with_common_layers(router: Router, options: &RouterOptions) -> Router {
    router
        .layer(middleware::from_fn(log_request))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            options.request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}
