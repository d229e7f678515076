//! HTTP <-> gateway translation
//!
//! Plays the gateway's part for local runs: a hyper request becomes an
//! [`InboundEvent`], and an [`OutboundResponse`] becomes a hyper response with
//! base64 bodies decoded back to raw bytes.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, Uri};
use serde_json::Value;

use crate::http::{response, InboundEvent, OutboundResponse, Outcome};
use crate::logger;

/// Build the gateway event for an HTTP request line
///
/// Like the gateway, a request without a query string carries `null`
/// parameters rather than an empty map.
pub fn to_event(method: &Method, uri: &Uri) -> InboundEvent {
    let query_string_parameters = uri.query().map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<HashMap<String, Value>>()
    });

    InboundEvent {
        path: Some(uri.path().to_string()),
        http_method: method.as_str().to_string(),
        query_string_parameters,
    }
}

/// Convert a gateway response into an HTTP response
pub fn to_http_response(outbound: OutboundResponse) -> Response<Full<Bytes>> {
    let status = outbound.status();
    let body = if outbound.is_base64_encoded {
        match BASE64.decode(outbound.body.as_bytes()) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                logger::log_error(&format!("Response body is not valid base64: {e}"));
                return internal_error("Invalid binary response body");
            }
        }
    } else {
        Bytes::from(outbound.body)
    };

    let mut builder = Response::builder().status(status);
    for (name, value) in &outbound.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build response: {e}"));
        internal_error("Failed to build response")
    })
}

/// 500 response used when dispatch itself could not run
pub fn internal_error(message: &str) -> Response<Full<Bytes>> {
    let outbound = response::build_error_response(Outcome::HandlerError, message, false);
    Response::builder()
        .status(500)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(outbound.body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}
