use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use doakan_engine::{AuthApiError, TransactionFlowError};
use log::error;
use thiserror::Error;

use crate::data_objects::ApiResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The notification signature is invalid")]
    InvalidSignature,
    #[error("{0}")]
    TransactionError(#[from] TransactionFlowError),
}

impl ServerError {
    /// The message that is safe to show to API clients. Server-side failures are summarised, since their details
    /// can include storage or gateway internals.
    pub fn public_message(&self) -> String {
        match self {
            Self::AuthenticationError(_) => "Unauthorized".to_string(),
            Self::TransactionError(TransactionFlowError::DatabaseError(_)) => "Internal server error".to_string(),
            Self::TransactionError(TransactionFlowError::GatewayUnavailable(_)) => {
                "The payment gateway is unavailable. Please try again later.".to_string()
            },
            Self::TransactionError(TransactionFlowError::GatewayRejected(_)) => {
                "The payment gateway rejected the charge.".to_string()
            },
            Self::InitializeError(_) | Self::BackendError(_) | Self::IOError(_) | Self::ConfigurationError(_) => {
                "Internal server error".to_string()
            },
            e => e.to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TransactionError(e) => match e {
                TransactionFlowError::DonationNotFound(_) => StatusCode::NOT_FOUND,
                TransactionFlowError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
                TransactionFlowError::DonationClosed(_) => StatusCode::BAD_REQUEST,
                TransactionFlowError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                TransactionFlowError::AmountMismatch { .. } => StatusCode::BAD_REQUEST,
                TransactionFlowError::UnknownGatewayStatus(_) => StatusCode::BAD_REQUEST,
                TransactionFlowError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
                TransactionFlowError::GatewayRejected(_) => StatusCode::BAD_GATEWAY,
                TransactionFlowError::NotDonationOwner { .. } => StatusCode::FORBIDDEN,
                TransactionFlowError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed with {status}. {self}");
        }
        HttpResponse::build(status).json(ApiResponse::<()>::error(status, self.public_message()))
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No bearer token was provided.")]
    MissingToken,
    #[error("The access token is invalid.")]
    InvalidToken,
    #[error("The access token has expired.")]
    ExpiredToken,
    #[error("The token subject does not exist.")]
    UnknownUser,
    #[error("Could not create an access token. {0}")]
    TokenCreation(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::UserNotFound(_) => Self::AuthenticationError(AuthError::UnknownUser),
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
