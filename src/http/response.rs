//! Gateway response building
//!
//! Maps an outcome kind, content type and body into the wire envelope.
//! The content type alone decides whether the body travels base64 encoded.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::BTreeMap;

use crate::error::HandlerError;
use crate::http::gateway::OutboundResponse;

/// Semantic result of handling one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    Empty,
    BadRequest,
    /// No route matched. Shares the generic bad-request code.
    NotFound,
    MethodNotAllowed,
    Found,
    /// A route matched but the requested resource does not exist
    ResourceNotFound,
    Conflict,
    HandlerError,
}

impl Outcome {
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Empty => 204,
            Self::BadRequest | Self::NotFound | Self::MethodNotAllowed => 400,
            Self::Found => 302,
            Self::ResourceNotFound => 404,
            Self::Conflict => 409,
            Self::HandlerError => 500,
        }
    }
}

/// Handler response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Binary(Vec<u8>),
}

impl Body {
    /// Wire text and `isBase64Encoded` flag for `content_type`
    ///
    /// Binary content types always get base64, whatever the variant. Other
    /// content types need text; raw bytes pass only if they are UTF-8.
    fn into_wire(self, content_type: &str) -> Result<(String, bool), HandlerError> {
        if is_binary_content_type(content_type) {
            let bytes = match self {
                Self::Text(text) => text.into_bytes(),
                Self::Binary(bytes) => bytes,
            };
            return Ok((BASE64.encode(bytes), true));
        }

        match self {
            Self::Text(text) => Ok((text, false)),
            Self::Binary(bytes) => String::from_utf8(bytes)
                .map(|text| (text, false))
                .map_err(|_| HandlerError::BinaryBody {
                    content_type: content_type.to_string(),
                }),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

/// Content types the gateway must treat as binary. `image/jpg` is not one
/// of them; normalize to `image/jpeg` before building the response.
pub fn is_binary_content_type(content_type: &str) -> bool {
    matches!(content_type, "image/png" | "image/jpeg")
}

/// Build the gateway response envelope
///
/// A body that cannot be represented under `content_type` becomes a 500
/// error envelope; use [`try_build`] to observe the failure instead.
pub fn build(
    outcome: Outcome,
    content_type: &str,
    body: impl Into<Body>,
    cors: bool,
) -> OutboundResponse {
    try_build(outcome, content_type, body, cors)
        .unwrap_or_else(|err| build_error_response(Outcome::HandlerError, &err.to_string(), cors))
}

pub fn try_build(
    outcome: Outcome,
    content_type: &str,
    body: impl Into<Body>,
    cors: bool,
) -> Result<OutboundResponse, HandlerError> {
    let (body, is_base64_encoded) = body.into().into_wire(content_type)?;

    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_string(), content_type.to_string());

    if cors {
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert("Access-Control-Allow-Methods".to_string(), "GET".to_string());
    }

    Ok(OutboundResponse {
        status_code: outcome.status_code().to_string(),
        body,
        headers,
        is_base64_encoded,
    })
}

/// `{"errorMessage": "<message>"}` as `application/json`
pub fn build_error_response(outcome: Outcome, message: &str, cors: bool) -> OutboundResponse {
    build(outcome, "application/json", error_body(message), cors)
}

/// Error body in the gateway's conventional layout, with a space after the
/// colon as the Python runtime renders it
pub fn error_body(message: &str) -> String {
    let quoted = serde_json::Value::String(message.to_string()).to_string();
    format!("{{\"errorMessage\": {quoted}}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let table = [
            (Outcome::Ok, 200),
            (Outcome::Empty, 204),
            (Outcome::BadRequest, 400),
            (Outcome::NotFound, 400),
            (Outcome::MethodNotAllowed, 400),
            (Outcome::Found, 302),
            (Outcome::ResourceNotFound, 404),
            (Outcome::Conflict, 409),
            (Outcome::HandlerError, 500),
        ];
        for (outcome, code) in table {
            assert_eq!(outcome.status_code(), code, "{outcome:?}");
            assert_eq!(build(outcome, "text/plain", "", false).status(), code);
        }
    }

    #[test]
    fn test_binary_flag_only_for_png_and_jpeg() {
        assert!(build(Outcome::Ok, "image/png", vec![1_u8], false).is_base64_encoded);
        assert!(build(Outcome::Ok, "image/jpeg", vec![1_u8], false).is_base64_encoded);
        for content_type in ["application/json", "text/plain", "image/jpg", "image/webp", "IMAGE/PNG"] {
            assert!(
                !build(Outcome::Ok, content_type, "x", false).is_base64_encoded,
                "{content_type}"
            );
        }
    }

    #[test]
    fn test_binary_body_is_base64_encoded() {
        let response = build(Outcome::Ok, "image/png", vec![0x89_u8, b'P', b'N', b'G'], false);
        assert_eq!(response.body, "iVBORw==");
        assert_eq!(response.header("Content-Type"), Some("image/png"));
    }

    #[test]
    fn test_utf8_bytes_under_text_type_are_sent_as_text() {
        let response = build(Outcome::Ok, "application/json", b"{}".to_vec(), false);
        assert_eq!(response.body, "{}");
        assert!(!response.is_base64_encoded);
    }

    #[test]
    fn test_raw_bytes_under_text_type_are_rejected() {
        let err = try_build(Outcome::Ok, "application/octet-stream", vec![0xff_u8, 0, 1], false)
            .unwrap_err();
        assert!(matches!(err, HandlerError::BinaryBody { .. }));

        let fallback = build(Outcome::Ok, "application/octet-stream", vec![0xff_u8, 0, 1], true);
        assert_eq!(fallback.status(), 500);
        assert!(!fallback.is_base64_encoded);
        assert_eq!(fallback.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_text_under_image_type_is_base64_encoded() {
        let response = build(Outcome::Ok, "image/png", "raw", false);
        assert!(response.is_base64_encoded);
        assert_eq!(response.body, "cmF3");
        assert_eq!(BASE64.decode(&response.body).unwrap(), b"raw");
    }

    #[test]
    fn test_cors_headers() {
        let with = build(Outcome::Ok, "application/json", "{}", true);
        assert_eq!(with.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(with.header("Access-Control-Allow-Methods"), Some("GET"));

        let without = build(Outcome::Ok, "application/json", "{}", false);
        assert!(without.header("Access-Control-Allow-Origin").is_none());
        assert!(without.header("Access-Control-Allow-Methods").is_none());
    }

    #[test]
    fn test_error_body_layout_and_escaping() {
        assert_eq!(
            error_body("No view function for: /unknown/path"),
            r#"{"errorMessage": "No view function for: /unknown/path"}"#
        );
        let escaped = error_body("bad \"scene\"");
        let parsed: serde_json::Value = serde_json::from_str(&escaped).unwrap();
        assert_eq!(parsed["errorMessage"], "bad \"scene\"");
    }
}
