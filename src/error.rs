//! Error types
//!
//! Registration errors abort startup. Everything raised while serving a single
//! event ends up as a [`HandlerError`] and is turned into a 500 envelope by the
//! dispatcher.

use thiserror::Error;

use crate::routing::PlaceholderType;

/// Errors raised while compiling or registering a route
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Malformed route pattern \"{pattern}\": {reason}")]
    Malformed { pattern: String, reason: String },

    #[error("Unknown converter \"{converter}\" in route pattern \"{pattern}\"")]
    UnknownConverter { pattern: String, converter: String },

    #[error("Duplicate route detected: \"{0}\". URL paths must be unique.")]
    Duplicate(String),

    #[error("Route \"{0}\" must allow at least one method")]
    NoMethods(String),
}

impl RouteError {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// A captured path segment could not be parsed as its declared type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind} value \"{raw}\" for path argument \"{name}\": {reason}")]
pub struct ConversionError {
    pub name: String,
    pub kind: PlaceholderType,
    pub raw: String,
    pub reason: String,
}

/// A query-string parameter could not be decoded as its declared type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value \"{value}\" for query parameter \"{key}\": expected {expected}")]
pub struct QueryError {
    pub key: String,
    pub value: String,
    pub expected: String,
}

/// Failures reported by the raster backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Raster backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid scene id: {0}")]
    InvalidScene(String),

    #[error("Tile {z}/{x}/{y} is outside the bounds of scene {scene}")]
    TileOutsideBounds { scene: String, z: i64, x: i64, y: i64 },

    #[error("{0}")]
    Other(String),
}

/// Any failure while preparing or running a handler
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Failed to serialize reply: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Binary body is not valid UTF-8 and cannot be sent as {content_type}")]
    BinaryBody { content_type: String },

    #[error("{0}")]
    Message(String),
}

impl HandlerError {
    /// Free-form handler failure; the message becomes the `errorMessage` body.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_message_is_verbatim() {
        let err = HandlerError::msg("bad scene id");
        assert_eq!(err.to_string(), "bad scene id");
    }

    #[test]
    fn test_wrapped_errors_are_transparent() {
        let err: HandlerError = QueryError {
            key: "pmin".to_string(),
            value: "abc".to_string(),
            expected: "a number".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid value \"abc\" for query parameter \"pmin\": expected a number"
        );
    }

    #[test]
    fn test_duplicate_route_message() {
        let err = RouteError::Duplicate("/landsat/bounds/<scene>".to_string());
        assert!(err.to_string().contains("Duplicate route detected"));
    }
}
