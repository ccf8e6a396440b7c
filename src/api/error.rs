//! Transport error types and the user-facing error surface

use serde::Deserialize;
use std::fmt;

use super::messages;

/// Errors that can occur while talking to the TeamTacles API
///
/// List operations log these and fall back to a safe state. Mutations wrap
/// them in [`ActionError`] so the caller gets a displayable message.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Request never produced a response (DNS, refused connection, timeout)
    Network(String),
    /// Non-2xx response carrying a domain `errorCode`
    Domain {
        status: u16,
        error_code: String,
        message: Option<String>,
    },
    /// Non-2xx response without a domain `errorCode`
    Http { status: u16, message: Option<String> },
    /// Response arrived but the body did not match the expected shape
    Decode(String),
    /// Operation requires a session token and none is stored
    NotAuthenticated,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Domain {
                status,
                error_code,
                message,
            } => match message {
                Some(message) => write!(f, "API error ({} {}): {}", status, error_code, message),
                None => write!(f, "API error ({} {})", status, error_code),
            },
            Self::Http { status, message } => match message {
                Some(message) => write!(f, "HTTP error ({}): {}", status, message),
                None => write!(f, "HTTP error ({})", status),
            },
            Self::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
            Self::NotAuthenticated => write!(f, "Not signed in"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Domain { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 401 that the session treats as an expired login
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. })
    }

    /// Build from a non-2xx response body
    ///
    /// The body is parsed leniently: anything that isn't the
    /// `{ errorCode, message }` shape degrades to a code-less error.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed.message.filter(|m| !m.trim().is_empty());

        match parsed.error_code.filter(|c| !c.trim().is_empty()) {
            Some(error_code) => Self::Domain {
                status,
                error_code,
                message,
            },
            None => Self::Http { status, message },
        }
    }

    /// Human-readable message for display
    pub fn user_message(&self) -> String {
        messages::user_message(self)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: Option<String>,
    message: Option<String>,
}

/// Failure of a user-initiated mutation (create, invite, import)
///
/// Carries the message to show the user alongside the underlying cause.
#[derive(Debug, Clone)]
pub struct ActionError {
    pub message: String,
    pub cause: ApiError,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

impl From<ApiError> for ActionError {
    fn from(cause: ApiError) -> Self {
        Self {
            message: cause.user_message(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_with_error_code() {
        let err = ApiError::from_response(
            409,
            r#"{"errorCode":"PROJECT_TITLE_ALREADY_EXISTS","message":"Title taken"}"#,
        );
        match err {
            ApiError::Domain {
                status,
                error_code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(error_code, "PROJECT_TITLE_ALREADY_EXISTS");
                assert_eq!(message.as_deref(), Some("Title taken"));
            }
            other => panic!("Expected Domain error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_response_without_error_code() {
        let err = ApiError::from_response(401, r#"{"message":"Unauthorized"}"#);
        assert!(err.is_session_expired());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_from_response_non_json_body() {
        let err = ApiError::from_response(502, "<html>Bad Gateway</html>");
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 502);
                assert!(message.is_none());
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_error_code_is_treated_as_missing() {
        let err = ApiError::from_response(401, r#"{"errorCode":"  "}"#);
        assert!(err.is_session_expired());
    }

    #[test]
    fn test_action_error_uses_user_message() {
        let cause = ApiError::Domain {
            status: 404,
            error_code: "USER_NOT_FOUND".to_string(),
            message: None,
        };
        let err = ActionError::from(cause);
        assert_eq!(err.to_string(), err.message);
        assert!(!err.message.is_empty());
    }
}
