use actix_web::{http::StatusCode, HttpResponse};
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum ServerError {
    #[display(fmt = "not authenticated")]
    Unauthenticated,
    #[display(fmt = "invalid argument: {}", _0)]
    InvalidArgument(String),
    #[display(fmt = "note not found: {}", _0)]
    NotFound(String),
    #[display(fmt = "duplicate note id: {}", _0)]
    DuplicateId(String),
    #[display(fmt = "unknown method: {}", _0)]
    UnknownMethod(String),
    DieselError,
    R2D2Error,
    EnvironmentError,
    MigrationError,
}

impl ServerError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        ServerError::InvalidArgument(reason.into())
    }
}

impl From<r2d2::Error> for ServerError {
    fn from(e: r2d2::Error) -> ServerError {
        log::error!("connection pool: {e}");
        ServerError::R2D2Error
    }
}

impl From<diesel::result::Error> for ServerError {
    fn from(e: diesel::result::Error) -> ServerError {
        log::error!("diesel: {e}");
        ServerError::DieselError
    }
}

impl actix_web::error::ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) | ServerError::UnknownMethod(_) => StatusCode::NOT_FOUND,
            ServerError::DuplicateId(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ServerError::DieselError => "Library Error: Diesel Error.".to_string(),
            ServerError::R2D2Error => "Server Error: Pooling Error.".to_string(),
            ServerError::EnvironmentError => {
                "Server Error: Missing or invalid environment variable.".to_string()
            }
            ServerError::MigrationError => "Server Error: Database Migration Failed.".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
