//! Landsat tiler request routing
//!
//! A thin dispatch layer between a serverless gateway and raster tile
//! handlers: typed route patterns, an immutable route table, and a dispatcher
//! that always answers with a well-formed gateway response.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod landsat;
pub mod logger;
pub mod routing;
pub mod server;

pub use config::Config;
pub use error::{BackendError, ConversionError, HandlerError, QueryError, RouteError};
pub use handler::{Api, ApiBuilder, Handler, HandlerResult, Reply, Request};
pub use http::{Body, InboundEvent, OutboundResponse, Outcome};
pub use routing::{PathArg, PathArgs, RouteOptions};
