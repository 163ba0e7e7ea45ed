use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use chirp_core::Error as ChirpError;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug)]
pub struct ServerError(anyhow::Error);

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        let err = &self.0;
        for cause in err.chain() {
            if cause.downcast_ref::<diesel::r2d2::PoolError>().is_some() {
                return StatusCode::SERVICE_UNAVAILABLE;
            }
            if let Some(err) = cause.downcast_ref::<ChirpError>() {
                match err {
                    ChirpError::ObjectNotFound(_) => return StatusCode::NOT_FOUND,
                    ChirpError::ObjectAlreadyExists(_) => return StatusCode::CONFLICT,
                    ChirpError::NotLoggedIn(_) => return StatusCode::UNAUTHORIZED,
                    ChirpError::InvalidRequest(_) => return StatusCode::BAD_REQUEST,
                    ChirpError::DatabaseError(_) => return StatusCode::INTERNAL_SERVER_ERROR,
                    // Look further down the chain
                    ChirpError::Other(_) => {}
                }
            }
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
