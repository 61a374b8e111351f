//! Error types for the todo client.
//!
//! # Design
//! Three layers of failure live here. `ApiError` is what the request
//! parsers and the host transport produce. `ErrorKind` is the fixed,
//! user-facing taxonomy shown in the banner; every `ApiError` is collapsed
//! into one of its variants at settlement time, so the banner never depends
//! on status codes. `StoreError` covers intents the store refuses
//! synchronously, before any request exists.

use std::fmt;

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods and by host transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404; the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connection refused, reset, ...).
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Fixed set of user-visible failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LoadFailed,
    AddFailed,
    DeleteFailed,
    UpdateFailed,
    EmptyTitle,
}

impl ErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::LoadFailed => "Unable to load todos",
            ErrorKind::AddFailed => "Unable to add a todo",
            ErrorKind::DeleteFailed => "Unable to delete a todo",
            ErrorKind::UpdateFailed => "Unable to update a todo",
            ErrorKind::EmptyTitle => "Title should not be empty",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Identifies one raised banner notice, so a delayed expiry only clears the
/// notice it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(pub(crate) u64);

/// Intents the store rejects without issuing a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The trimmed title was empty. The banner now shows
    /// [`ErrorKind::EmptyTitle`] under `notice`.
    #[error("title should not be empty")]
    EmptyTitle { notice: NoticeId },

    #[error("a todo is already being created")]
    CreateInFlight,

    #[error("todo {0} is not in the list")]
    UnknownTodo(i64),

    #[error("todo {0} already has a request in flight")]
    Busy(i64),

    /// The request payload could not be encoded; the matching failure is
    /// already on the banner.
    #[error("request could not be built: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_displays_banner_text() {
        assert_eq!(ErrorKind::LoadFailed.to_string(), "Unable to load todos");
        assert_eq!(ErrorKind::EmptyTitle.to_string(), "Title should not be empty");
    }

    #[test]
    fn http_error_display_includes_status() {
        let err = ApiError::HttpError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }
}
