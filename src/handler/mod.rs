//! Request handler module
//!
//! Defines what a route handler is and what it returns, plus the dispatcher
//! that drives handlers from gateway events.

pub mod dispatch;

use serde::Serialize;

use crate::error::HandlerError;
use crate::http::{Body, InboundEvent, Outcome, QueryParams};
use crate::routing::PathArgs;

// Re-export main entry point
pub use dispatch::{Api, ApiBuilder};

/// Everything a handler sees besides its positional path arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: QueryParams,
}

impl Request {
    pub(crate) fn from_event(event: &InboundEvent, path: &str) -> Self {
        Self {
            method: event.http_method.clone(),
            path: path.to_string(),
            query: QueryParams::from_event(event.query_string_parameters.as_ref()),
        }
    }
}

/// The `(outcome, content type, body)` triple a handler produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub outcome: Outcome,
    pub content_type: String,
    pub body: Body,
}

impl Reply {
    pub fn new(outcome: Outcome, content_type: impl Into<String>, body: impl Into<Body>) -> Self {
        Self {
            outcome,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// `Outcome::Ok` with a JSON-serialized body
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, HandlerError> {
        Ok(Self::new(
            Outcome::Ok,
            "application/json",
            serde_json::to_string(value)?,
        ))
    }
}

pub type HandlerResult = Result<Reply, HandlerError>;

/// A route handler
///
/// Implemented for any `Fn(&PathArgs, &Request) -> HandlerResult`.
pub trait Handler: Send + Sync {
    fn call(&self, args: &PathArgs, request: &Request) -> HandlerResult;

    /// Display name used when a route is registered without one
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

impl<F> Handler for F
where
    F: Fn(&PathArgs, &Request) -> HandlerResult + Send + Sync,
{
    fn call(&self, args: &PathArgs, request: &Request) -> HandlerResult {
        self(args, request)
    }
}

/// `landsat_tiler::landsat::favicon` -> `favicon`
fn short_type_name(full: &'static str) -> &'static str {
    let mut name = full;
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }
    name.rsplit("::").next().unwrap_or(name)
}
