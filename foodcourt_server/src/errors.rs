use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use foodcourt_engine::traits::{CheckoutError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    CheckoutError(#[from] CheckoutError),
    #[error("{0}")]
    OrderFlowError(#[from] OrderFlowError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CheckoutError(e) => match e {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::UnresolvableItem(_) => StatusCode::BAD_REQUEST,
                CheckoutError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CheckoutError::PaymentVerificationFailed => StatusCode::FORBIDDEN,
                CheckoutError::IntentNotFound(_) => StatusCode::NOT_FOUND,
                CheckoutError::IntentAlreadyConsumed(_) => StatusCode::CONFLICT,
                CheckoutError::AmountMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::OrderNumberConflict => StatusCode::CONFLICT,
                CheckoutError::GatewayError(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::OrderFlowError(e) => match e {
                OrderFlowError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                OrderFlowError::LineNotFound(_) => StatusCode::NOT_FOUND,
                OrderFlowError::InvalidTransition { .. } => StatusCode::CONFLICT,
                OrderFlowError::OrderNotModifiable(_) => StatusCode::CONFLICT,
                OrderFlowError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                OrderFlowError::ConcurrentModification(_) => StatusCode::CONFLICT,
                OrderFlowError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}
