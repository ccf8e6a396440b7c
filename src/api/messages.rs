//! Error-code lookup table for user-facing messages
//!
//! Resolution order: known `errorCode` → server-provided message → generic
//! default. Only mutations surface these; list fetches just log.

use super::error::ApiError;

/// Shown when nothing more specific is known
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the server. Check your connection and try again.";

const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Map a backend `errorCode` to a message
pub fn message_for_code(code: &str) -> Option<&'static str> {
    let message = match code {
        "PROJECT_TITLE_ALREADY_EXISTS" => "A project with this title already exists.",
        "TEAM_NAME_ALREADY_EXISTS" => "A team with this name already exists.",
        "PROJECT_NOT_FOUND" => "This project no longer exists.",
        "TEAM_NOT_FOUND" => "This team no longer exists.",
        "TASK_NOT_FOUND" => "This task no longer exists.",
        "USER_NOT_FOUND" => "No user was found with this email.",
        "USER_ALREADY_MEMBER" => "This user is already a member.",
        "INVITATION_ALREADY_SENT" => "An invitation was already sent to this user.",
        "INVALID_EMAIL" => "Please enter a valid email address.",
        "ACCESS_DENIED" | "NOT_PROJECT_ADMIN" | "NOT_TEAM_ADMIN" => {
            "You don't have permission to do that."
        }
        "TEAM_HAS_NO_MEMBERS" => "This team has no members to import.",
        "INVALID_DATE_RANGE" => "The start date must be before the end date.",
        _ => return None,
    };
    Some(message)
}

/// Resolve the message to show for an API failure
pub fn user_message(err: &ApiError) -> String {
    match err {
        ApiError::Domain {
            error_code,
            message,
            ..
        } => message_for_code(error_code)
            .map(str::to_string)
            .or_else(|| message.clone())
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        ApiError::Http { status: 401, .. } | ApiError::NotAuthenticated => {
            SESSION_EXPIRED_MESSAGE.to_string()
        }
        ApiError::Http { message, .. } => message
            .clone()
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        ApiError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
        ApiError::Decode(_) => DEFAULT_ERROR_MESSAGE.to_string(),
    }
}
