//! Error types for the EMQX admin client.
//!
//! # Design
//! Two failure families: the exchange never completed (`Transport`), or it
//! completed but the response is not what the operation expects (`Status`,
//! `Deserialization`). `Status` keeps the raw body, which is where EMQX puts
//! its diagnostic message.

use thiserror::Error;

use crate::http::TransportError;

/// Errors returned by `EmqxClient` operations and `parse_*` methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP exchange did not complete.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// The server answered with a status the operation does not accept.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// MQTT only defines QoS 0, 1 and 2.
    #[error("invalid QoS level {0}, expected 0, 1 or 2")]
    InvalidQos(u8),
}

impl ApiError {
    /// True when the server reported the client (or route) as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// Status code of a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors loading client configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is missing or not valid unicode")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_body() {
        let err = ApiError::Status {
            status: 404,
            body: r#"{"code":112,"message":"Client not found"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"HTTP 404: {"code":112,"message":"Client not found"}"#
        );
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn server_error_is_not_not_found() {
        let err = ApiError::Status {
            status: 500,
            body: String::new(),
        };
        assert!(!err.is_not_found());
        assert_eq!(ApiError::InvalidQos(3).status(), None);
    }
}
