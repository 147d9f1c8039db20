use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::Config,
    error::GameError,
    redeem::{RedeemCodes, RedeemError},
    session::SessionStore,
};

mod http;

pub const SESSION_COOKIE: &str = "session_id";

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<Mutex<SessionStore>>,
    codes: Arc<Mutex<RedeemCodes>>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            SessionStore::new(config.starting_balance),
            RedeemCodes::new(config.redeem_codes.clone(), config.admin_code.clone()),
        )
    }

    pub fn with_parts(sessions: SessionStore, codes: RedeemCodes) -> Self {
        AppState {
            sessions: Arc::new(Mutex::new(sessions)),
            codes: Arc::new(Mutex::new(codes)),
        }
    }

    // A panic while holding a lock leaves the store usable; every mutation
    // validates before it writes.
    pub(crate) fn sessions(&self) -> MutexGuard<'_, SessionStore> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn codes(&self) -> MutexGuard<'_, RedeemCodes> {
        self.codes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/api/init", post(http::init))
        .route("/api/state", get(http::state))
        .route("/api/new_round", post(http::new_round))
        .route("/api/hit", post(http::hit))
        .route("/api/stand", post(http::stand))
        .route("/api/redeem", post(http::redeem))
        .route("/healthz", get(http::healthz))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Redeem(#[from] RedeemError),
    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "request rejected");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
