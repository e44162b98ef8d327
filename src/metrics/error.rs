use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

/// Failure kinds of the derived-metrics core.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("owner {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl MetricsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MetricsError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            MetricsError::NotFound(_) => StatusCode::NOT_FOUND,
            MetricsError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MetricsError> for (StatusCode, String) {
    fn from(e: MetricsError) -> Self {
        let status = e.status();
        if status.is_server_error() {
            tracing::error!(error = %e, "metrics operation failed");
            (status, "Internal error".into())
        } else {
            (status, e.to_string())
        }
    }
}
