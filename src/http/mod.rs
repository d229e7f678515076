//! HTTP protocol layer module
//!
//! Gateway envelopes, typed query decoding and response building, decoupled
//! from routing and from the Landsat handlers.

pub mod gateway;
pub mod mime;
pub mod query;
pub mod response;

// Re-export commonly used types
pub use gateway::{InboundEvent, OutboundResponse};
pub use query::{QueryParams, QueryValue};
pub use response::{
    build, build_error_response, is_binary_content_type, try_build, Body, Outcome,
};
