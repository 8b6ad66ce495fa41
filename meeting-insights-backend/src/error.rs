use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use meeting_insights_config::ConfigError;
use meeting_insights_database::error::DatabaseError;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Bad request input; the message is shown to the client as is.
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Config(_) | Self::File(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        }
        (status, self.to_string()).into_response()
    }
}
