use axum::response::{Response, IntoResponse};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{NotInCatalog, VolumeError};
use crate::http::Envelope;
use crate::http::params::ConflictingParam;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        AppError { status, error: anyhow::Error::msg(message.into()) }
    }
}

fn status_for(error: &anyhow::Error) -> StatusCode {
    if error.downcast_ref::<VolumeError>().is_some()
        || error.downcast_ref::<ConflictingParam>().is_some()
    {
        StatusCode::BAD_REQUEST
    } else if error.downcast_ref::<NotInCatalog>().is_some() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("http request error: {:?}", self.error);
        } else {
            log::warn!("http request rejected ({}): {:#}", self.status, self.error);
        }

        let envelope = Envelope::<()>::failure(format!("{:#}", self.error));
        (self.status, Json(envelope)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        AppError { status: status_for(&error), error }
    }
}
