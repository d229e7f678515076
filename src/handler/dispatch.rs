//! Event dispatch
//!
//! Entry point for gateway events: route lookup, method validation,
//! argument conversion, handler invocation, response building. Every path
//! through `dispatch` ends in a well-formed response.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{HandlerError, RouteError};
use crate::handler::{Handler, HandlerResult, Request};
use crate::http::{response, InboundEvent, OutboundResponse, Outcome};
use crate::logger;
use crate::routing::{RouteEntry, RouteMatch, RouteOptions, RouteTable};

/// Collects routes before serving starts
#[derive(Debug)]
pub struct ApiBuilder {
    app_name: String,
    routes: RouteTable,
}

impl ApiBuilder {
    /// Register a route; see [`RouteTable::register`]
    pub fn route<H>(
        &mut self,
        pattern: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self, RouteError>
    where
        H: Handler + 'static,
    {
        self.routes.register(pattern, handler, options)?;
        Ok(self)
    }

    /// Freeze the route table
    pub fn build(self) -> Api {
        Api {
            app_name: self.app_name,
            routes: self.routes,
        }
    }
}

/// An immutable set of routes that turns gateway events into responses
#[derive(Debug)]
pub struct Api {
    app_name: String,
    routes: RouteTable,
}

impl Api {
    pub fn builder(app_name: impl Into<String>) -> ApiBuilder {
        ApiBuilder {
            app_name: app_name.into(),
            routes: RouteTable::new(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Dispatch one gateway event
    pub fn dispatch(&self, event: &InboundEvent) -> OutboundResponse {
        self.dispatch_routed(event).0
    }

    /// Dispatch one gateway event, also returning the name of the matched
    /// route when there was one
    pub fn dispatch_routed(&self, event: &InboundEvent) -> (OutboundResponse, Option<&str>) {
        // 1. Path must be present
        let Some(path) = event.path.as_deref() else {
            logger::log_warning("Event without a path");
            let response = response::build_error_response(
                Outcome::BadRequest,
                "Bad Route: missing path",
                false,
            );
            return (response, None);
        };

        // 2. Find the route; no entry means no CORS policy either
        let Some(matched) = self.routes.lookup(path) else {
            let response = response::build_error_response(
                Outcome::NotFound,
                &format!("No view function for: {path}"),
                false,
            );
            return (response, None);
        };
        let entry = matched.entry;
        (respond(entry, &matched, event, path), Some(entry.name()))
    }

    /// Dispatch a raw JSON gateway payload
    ///
    /// A payload that is not a valid event is answered like a missing path.
    pub fn dispatch_json(&self, payload: &str) -> OutboundResponse {
        match serde_json::from_str::<InboundEvent>(payload) {
            Ok(event) => self.dispatch(&event),
            Err(e) => {
                logger::log_warning(&format!("Malformed event: {e}"));
                response::build_error_response(
                    Outcome::BadRequest,
                    &format!("Bad Route: malformed event ({e})"),
                    false,
                )
            }
        }
    }
}

/// Steps 3 to 6 once a route entry is known
fn respond(
    entry: &RouteEntry,
    matched: &RouteMatch<'_, '_>,
    event: &InboundEvent,
    path: &str,
) -> OutboundResponse {
    // 3. Check HTTP method
    if !entry.allows(&event.http_method) {
        return response::build_error_response(
            Outcome::MethodNotAllowed,
            &format!("Unsupported method: {}", event.http_method),
            entry.cors(),
        );
    }

    // 4-6. Convert arguments, call the handler, build the envelope
    let request = Request::from_event(event, path);
    let built = invoke(matched, &request).and_then(|reply| {
        response::try_build(reply.outcome, &reply.content_type, reply.body, entry.cors())
    });
    built.unwrap_or_else(|err| {
        let message = err.to_string();
        logger::log_handler_error(entry.name(), &message);
        response::build_error_response(Outcome::HandlerError, &message, entry.cors())
    })
}

thread_local! {
    static HANDLER_RUNNING: Cell<bool> = const { Cell::new(false) };
}

/// True while the current thread is inside a route handler
///
/// Panics raised there are reported by the dispatcher, so the panic hook
/// installed by [`logger::init`] records them only at DEBUG.
pub fn handler_running() -> bool {
    HANDLER_RUNNING.with(Cell::get)
}

/// Clears the running flag even when the handler unwinds
struct RunningGuard;

impl RunningGuard {
    fn enter() -> Self {
        HANDLER_RUNNING.with(|running| running.set(true));
        Self
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        HANDLER_RUNNING.with(|running| running.set(false));
    }
}

fn invoke(matched: &RouteMatch<'_, '_>, request: &Request) -> HandlerResult {
    let args = matched.arguments()?;
    let handler = matched.entry.handler();
    panic::catch_unwind(AssertUnwindSafe(|| {
        let _running = RunningGuard::enter();
        handler.call(&args, request)
    }))
    .unwrap_or_else(|payload| Err(HandlerError::msg(panic_message(matched.entry, &*payload))))
}

fn panic_message(entry: &RouteEntry, payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("Handler {} panicked: {detail}", entry.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Reply;
    use crate::routing::PathArgs;

    fn echo(args: &PathArgs, request: &Request) -> HandlerResult {
        let scene = args.str(0)?;
        let pmin: f64 = request.query.decode("pmin", 2.0)?;
        Ok(Reply::new(Outcome::Ok, "text/plain", format!("{scene}:{pmin}")))
    }

    fn explode(_: &PathArgs, _: &Request) -> HandlerResult {
        panic!("raster exploded")
    }

    fn running(_: &PathArgs, _: &Request) -> HandlerResult {
        Ok(Reply::new(Outcome::Ok, "text/plain", handler_running().to_string()))
    }

    fn raw_bytes(_: &PathArgs, _: &Request) -> HandlerResult {
        Ok(Reply::new(Outcome::Ok, "application/octet-stream", vec![0xff_u8, 0xfe]))
    }

    fn api() -> Api {
        let mut builder = Api::builder("test-app");
        builder
            .route("/echo/<scene>", RouteOptions::new().cors(true), echo)
            .unwrap()
            .route("/boom", RouteOptions::new(), explode)
            .unwrap()
            .route("/running", RouteOptions::new(), running)
            .unwrap()
            .route("/raw", RouteOptions::new().cors(true), raw_bytes)
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_dispatch_success_passes_query() {
        let event = InboundEvent::new("GET", "/echo/LC8").with_query("pmin", "5");
        let response = api().dispatch(&event);
        assert_eq!(response.status(), 200);
        assert_eq!(response.body, "LC8:5");
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_dispatch_missing_path() {
        let event = InboundEvent {
            path: None,
            http_method: "GET".to_string(),
            query_string_parameters: None,
        };
        let response = api().dispatch(&event);
        assert_eq!(response.status(), 400);
        assert!(response.body.contains("errorMessage"));
        assert!(response.header("Access-Control-Allow-Origin").is_none());
    }

    #[test]
    fn test_dispatch_query_error_is_handler_error() {
        let event = InboundEvent::new("GET", "/echo/LC8").with_query("pmin", "low");
        let response = api().dispatch(&event);
        assert_eq!(response.status(), 500);
        assert!(response.body.contains("pmin"));
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_dispatch_catches_panics() {
        let response = api().dispatch(&InboundEvent::new("GET", "/boom"));
        assert_eq!(response.status(), 500);
        assert!(response.body.contains("raster exploded"));
        assert!(response.header("Access-Control-Allow-Origin").is_none());
    }

    #[test]
    fn test_dispatch_json() {
        let api = api();
        let ok = api.dispatch_json(r#"{"path": "/echo/abc", "httpMethod": "GET"}"#);
        assert_eq!(ok.status(), 200);

        let malformed = api.dispatch_json("not json");
        assert_eq!(malformed.status(), 400);
        assert!(malformed.body.starts_with(r#"{"errorMessage": "Bad Route"#));
    }

    #[test]
    fn test_dispatch_routed_reports_route_name() {
        let api = api();
        let (ok, route) = api.dispatch_routed(&InboundEvent::new("GET", "/echo/LC8"));
        assert_eq!(ok.status(), 200);
        assert_eq!(route, Some("echo"));

        let (wrong_method, route) = api.dispatch_routed(&InboundEvent::new("PUT", "/echo/LC8"));
        assert_eq!(wrong_method.status(), 400);
        assert_eq!(route, Some("echo"));

        let (missing, route) = api.dispatch_routed(&InboundEvent::new("GET", "/nope"));
        assert_eq!(missing.status(), 400);
        assert_eq!(route, None);
    }

    #[test]
    fn test_handler_running_flag() {
        let api = api();
        assert!(!handler_running());
        assert_eq!(api.dispatch(&InboundEvent::new("GET", "/running")).body, "true");
        assert!(!handler_running());

        api.dispatch(&InboundEvent::new("GET", "/boom"));
        assert!(!handler_running());
    }

    #[test]
    fn test_unrepresentable_body_is_handler_error() {
        let response = api().dispatch(&InboundEvent::new("GET", "/raw"));
        assert_eq!(response.status(), 500);
        assert!(!response.is_base64_encoded);
        assert!(response.body.contains("application/octet-stream"));
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }
}
