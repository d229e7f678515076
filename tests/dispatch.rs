use std::io::Write;
use std::sync::{Arc, Mutex};

use landsat_tiler::logger::GatewayFormat;
use landsat_tiler::{
    Api, HandlerError, HandlerResult, InboundEvent, Outcome, PathArg, PathArgs, Reply,
    Request, RouteOptions,
};

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .event_format(GatewayFormat::new("test-app"))
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, capture.contents())
}

fn tile_api(seen: Arc<Mutex<Option<PathArgs>>>) -> Api {
    let mut builder = Api::builder("test-app");
    builder
        .route(
            "/tiles/<scene>/<int:z>/<int:x>/<int:y>.<ext>",
            RouteOptions::new(),
            move |args: &PathArgs, _req: &Request| -> HandlerResult {
                *seen.lock().unwrap() = Some(args.clone());
                Ok(Reply::new(Outcome::Ok, "text/plain", "tile"))
            },
        )
        .unwrap();
    builder.build()
}

#[test]
fn typed_placeholders_reach_the_handler_in_order() {
    let seen = Arc::new(Mutex::new(None));
    let api = tile_api(Arc::clone(&seen));

    let response = api.dispatch(&InboundEvent::new("GET", "/tiles/LC8_001/5/3/2.png"));
    assert_eq!(response.status_code, "200");

    let args = seen.lock().unwrap().clone().unwrap();
    assert_eq!(
        args.as_slice(),
        &[
            PathArg::from("LC8_001"),
            PathArg::Int(5),
            PathArg::Int(3),
            PathArg::Int(2),
            PathArg::from("png"),
        ]
    );
}

#[test]
fn unknown_path_is_rejected_without_cors() {
    let api = tile_api(Arc::new(Mutex::new(None)));
    let response = api.dispatch(&InboundEvent::new("GET", "/unknown/path"));

    assert_eq!(response.status_code, "400");
    assert_eq!(
        response.body,
        r#"{"errorMessage": "No view function for: /unknown/path"}"#
    );
    assert!(response.header("Access-Control-Allow-Origin").is_none());
    assert!(!response.is_base64_encoded);
}

#[test]
fn wrong_method_keeps_cors_header() {
    let mut builder = Api::builder("test-app");
    builder
        .route(
            "/bounds/<scene>",
            RouteOptions::new().cors(true),
            |_: &PathArgs, _: &Request| -> HandlerResult {
                Ok(Reply::new(Outcome::Ok, "application/json", "{}"))
            },
        )
        .unwrap();
    let api = builder.build();

    let response = api.dispatch(&InboundEvent::new("POST", "/bounds/LC8"));
    assert_eq!(response.status(), 400);
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    assert!(response.body.contains("POST"));
}

#[test]
fn handler_failure_is_500_and_logged_once() {
    let mut builder = Api::builder("test-app");
    builder
        .route(
            "/scene/<scene>",
            RouteOptions::new().name("scene"),
            |_: &PathArgs, _: &Request| -> HandlerResult { Err(HandlerError::msg("bad scene id")) },
        )
        .unwrap();
    let api = builder.build();

    let (response, logs) =
        with_captured_logs(|| api.dispatch(&InboundEvent::new("GET", "/scene/nope")));

    assert_eq!(response.status_code, "500");
    assert_eq!(response.body, r#"{"errorMessage": "bad scene id"}"#);

    let error_lines = logs
        .lines()
        .filter(|line| line.contains("[ERROR]") && line.contains("bad scene id"))
        .count();
    assert_eq!(error_lines, 1, "captured logs: {logs}");
}

#[test]
fn png_bytes_are_base64_encoded() {
    let mut builder = Api::builder("test-app");
    builder
        .route(
            "/img",
            RouteOptions::new(),
            |_: &PathArgs, _: &Request| -> HandlerResult {
                Ok(Reply::new(Outcome::Ok, "image/png", vec![0x89_u8, b'P', b'N', b'G']))
            },
        )
        .unwrap();
    let api = builder.build();

    let response = api.dispatch(&InboundEvent::new("GET", "/img"));
    assert_eq!(response.status(), 200);
    assert!(response.is_base64_encoded);
    assert_eq!(response.header("Content-Type"), Some("image/png"));
    assert_eq!(response.body, "iVBORw==");
}

#[test]
fn first_registration_wins_for_overlapping_patterns() {
    let mut builder = Api::builder("test-app");
    builder
        .route(
            "/items/<id>",
            RouteOptions::new(),
            |_: &PathArgs, _: &Request| -> HandlerResult {
                Ok(Reply::new(Outcome::Ok, "text/plain", "generic"))
            },
        )
        .unwrap()
        .route(
            "/items/<int:id>",
            RouteOptions::new(),
            |_: &PathArgs, _: &Request| -> HandlerResult {
                Ok(Reply::new(Outcome::Ok, "text/plain", "typed"))
            },
        )
        .unwrap();
    let api = builder.build();

    let response = api.dispatch(&InboundEvent::new("GET", "/items/42"));
    assert_eq!(response.body, "generic");
}

#[test]
fn every_response_is_well_formed_json() {
    let api = tile_api(Arc::new(Mutex::new(None)));
    let payloads = [
        r#"{"path": "/tiles/LC8/1/2/3.png", "httpMethod": "GET"}"#,
        r#"{"path": "/tiles/LC8/1/2/3.png", "httpMethod": "DELETE"}"#,
        r#"{"path": "/nowhere", "httpMethod": "GET", "queryStringParameters": null}"#,
        r#"{"httpMethod": "GET"}"#,
        "garbage",
    ];

    for payload in payloads {
        let response = api.dispatch_json(payload);
        let value: serde_json::Value = serde_json::from_str(&response.to_json()).unwrap();
        assert!(value["statusCode"].is_string(), "{payload}");
        assert!(value["body"].is_string(), "{payload}");
        assert!(value["headers"]["Content-Type"].is_string(), "{payload}");
        assert!(value["isBase64Encoded"].is_boolean(), "{payload}");
    }
}

#[test]
fn landsat_routes_answer_through_the_dispatcher() {
    use landsat_tiler::landsat::{self, UnavailableBackend};

    let api = landsat::build_api("test-app", Arc::new(UnavailableBackend)).unwrap();

    let favicon = api.dispatch(&InboundEvent::new("GET", "/favicon.ico"));
    assert_eq!(favicon.status(), 400);
    assert_eq!(favicon.body, "");

    let bounds = api.dispatch(&InboundEvent::new("GET", "/landsat/bounds/LC80230312016320LGN00"));
    assert_eq!(bounds.status(), 500);
    assert_eq!(bounds.header("Access-Control-Allow-Origin"), Some("*"));
}

#[test]
fn out_of_range_int_segment_is_500() {
    let api = tile_api(Arc::new(Mutex::new(None)));
    let response = api.dispatch(&InboundEvent::new(
        "GET",
        "/tiles/LC8/99999999999999999999999/1/1.png",
    ));
    assert_eq!(response.status(), 500);
    assert!(response.body.starts_with(r#"{"errorMessage": "#));
}

#[test]
fn handler_panic_is_500_and_logged_once() {
    landsat_tiler::logger::install_panic_hook();

    let mut builder = Api::builder("test-app");
    builder
        .route(
            "/explode",
            RouteOptions::new().name("explode"),
            |_: &PathArgs, _: &Request| -> HandlerResult { panic!("raster exploded") },
        )
        .unwrap();
    let api = builder.build();

    let (response, logs) =
        with_captured_logs(|| api.dispatch(&InboundEvent::new("GET", "/explode")));

    assert_eq!(response.status(), 500);
    assert_eq!(
        response.body,
        r#"{"errorMessage": "Handler explode panicked: raster exploded"}"#
    );

    let error_lines = logs
        .lines()
        .filter(|line| line.contains("[ERROR]") && line.contains("raster exploded"))
        .count();
    assert_eq!(error_lines, 1, "captured logs: {logs}");
    assert!(
        logs.lines().any(|line| line.contains("[DEBUG]") && line.contains("panicked at")),
        "captured logs: {logs}"
    );
}
