/**
 * Chat Service Errors
 *
 * `ServiceError` is what the message, presence and notification services
 * return. The socket path turns it into an `error` frame for the sender;
 * the HTTP path turns it into a `BackendError` response.
 */
use thiserror::Error;

use crate::backend::realtime::policy::PolicyError;
use crate::backend::store::StoreError;
use crate::shared::SharedError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The draft failed validation.
    #[error(transparent)]
    Invalid(#[from] SharedError),

    /// The draft could not be addressed.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Whether the caller caused this error (as opposed to the backend).
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Invalid(_) | Self::Policy(_) | Self::Forbidden(_) => true,
            Self::Store(StoreError::NotFound(_)) => true,
            Self::Store(_) => false,
        }
    }

    /// Text safe to send back to a client.
    ///
    /// Backend failures are reported generically so store details do not
    /// leak over the socket.
    pub fn client_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            "internal error, message not delivered".to_string()
        }
    }
}
