//! Routing module
//!
//! Provides the path-pattern routing used by the dispatcher:
//! - Route template compilation with typed placeholders
//! - Ordered, append-only route registration
//! - Typed path argument conversion

mod convert;
mod pattern;
mod table;

pub use convert::{convert, PathArg, PathArgs};
pub use pattern::{Placeholder, PlaceholderType, RoutePattern};
pub use table::{RouteEntry, RouteMatch, RouteOptions, RouteTable};
