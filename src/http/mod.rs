use axum::{Json, Router};
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::Serialize;

use crate::App;
use crate::error::AppError;

pub mod cors;
pub mod database;
pub mod params;
pub mod player;

pub fn routes(app: App) -> Router {
    Router::new()
        .route("/play", get(player::current).post(player::play).fallback(method_not_allowed))
        .route("/pause", post(player::pause).fallback(method_not_allowed))
        .route("/volume", post(player::volume).fallback(method_not_allowed))
        .route("/database", get(database::index).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(app)
}

/// Body of every response: `{"ok": bool, "message": string, "data"?: any}`.
#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub type Reply<T> = Json<Envelope<T>>;

impl<T> Envelope<T> {
    pub fn data(message: impl Into<String>, data: T) -> Reply<T> {
        Json(Envelope { ok: true, message: message.into(), data: Some(data) })
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Envelope { ok: false, message: message.into(), data: None }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Reply<()> {
        Json(Envelope { ok: true, message: message.into(), data: None })
    }
}

async fn method_not_allowed() -> AppError {
    AppError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

async fn not_found() -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "not found")
}
