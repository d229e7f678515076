//! Landsat 8 tiler routes
//!
//! | Route | Handler |
//! |---|---|
//! | `/landsat/bounds/<scene>` | scene bounds |
//! | `/landsat/metadata/<scene>` | scene metadata, `pmin`/`pmax` percentiles |
//! | `/landsat/tiles/<scene>/<int:z>/<int:x>/<int:y>.<ext>` | PNG or JPEG tile |
//! | `/favicon.ico` | always rejected |

mod backend;
mod cache;

pub use backend::{BandRange, RasterBackend, TileFormat, TileRequest, UnavailableBackend};
pub use cache::{CacheKey, ReplyCache, DEFAULT_CACHE_SIZE};

use std::sync::Arc;

use crate::error::{HandlerError, RouteError};
use crate::handler::{Api, ApiBuilder, HandlerResult, Reply, Request};
use crate::http::Outcome;
use crate::routing::{PathArgs, RouteOptions};

pub const BOUNDS_ROUTE: &str = "/landsat/bounds/<scene>";
pub const METADATA_ROUTE: &str = "/landsat/metadata/<scene>";
pub const TILE_ROUTE: &str = "/landsat/tiles/<scene>/<int:z>/<int:x>/<int:y>.<ext>";
pub const FAVICON_ROUTE: &str = "/favicon.ico";

const BOUNDS_NAME: &str = "landsat_bounds";
const METADATA_NAME: &str = "landsat_metadata";
const TILE_NAME: &str = "landsat_tile";

const DEFAULT_PMIN: f64 = 2.0;
const DEFAULT_PMAX: f64 = 98.0;
const DEFAULT_BANDS: [u8; 3] = [4, 3, 2];
const DEFAULT_BAND_RANGE: BandRange = [0, 16000];
const DEFAULT_TILE_SIZE: u32 = 256;

/// Build the Landsat API over `backend` with a default-sized reply cache
pub fn build_api(app_name: &str, backend: Arc<dyn RasterBackend>) -> Result<Api, RouteError> {
    build_api_with_cache(app_name, backend, ReplyCache::default())
}

pub fn build_api_with_cache(
    app_name: &str,
    backend: Arc<dyn RasterBackend>,
    cache: ReplyCache,
) -> Result<Api, RouteError> {
    let mut builder = Api::builder(app_name);
    register(&mut builder, backend, cache)?;
    Ok(builder.build())
}

/// Register the Landsat routes; the three data routes share `cache`
pub fn register(
    builder: &mut ApiBuilder,
    backend: Arc<dyn RasterBackend>,
    cache: ReplyCache,
) -> Result<(), RouteError> {
    let options = |name: &str| RouteOptions::new().methods(["GET"]).cors(true).name(name);

    let (bounds_backend, bounds_cache) = (Arc::clone(&backend), cache.clone());
    builder.route(
        BOUNDS_ROUTE,
        options(BOUNDS_NAME),
        move |args: &PathArgs, _request: &Request| {
            bounds(bounds_backend.as_ref(), &bounds_cache, args)
        },
    )?;

    let (metadata_backend, metadata_cache) = (Arc::clone(&backend), cache.clone());
    builder.route(
        METADATA_ROUTE,
        options(METADATA_NAME),
        move |args: &PathArgs, request: &Request| {
            metadata(metadata_backend.as_ref(), &metadata_cache, args, request)
        },
    )?;

    builder.route(
        TILE_ROUTE,
        options(TILE_NAME),
        move |args: &PathArgs, request: &Request| tile(backend.as_ref(), &cache, args, request),
    )?;

    builder.route(FAVICON_ROUTE, options("favicon"), favicon)?;
    Ok(())
}

fn bounds(backend: &dyn RasterBackend, cache: &ReplyCache, args: &PathArgs) -> HandlerResult {
    let scene = args.str(0)?;
    cache.get_or_try_insert(CacheKey::new(BOUNDS_NAME, &scene), || {
        Reply::json(&backend.bounds(scene)?)
    })
}

fn metadata(
    backend: &dyn RasterBackend,
    cache: &ReplyCache,
    args: &PathArgs,
    request: &Request,
) -> HandlerResult {
    let scene = args.str(0)?;
    let pmin = request.query.decode("pmin", DEFAULT_PMIN)?;
    let pmax = request.query.decode("pmax", DEFAULT_PMAX)?;

    cache.get_or_try_insert(CacheKey::new(METADATA_NAME, &(scene, pmin, pmax)), || {
        Reply::json(&backend.metadata(scene, pmin, pmax)?)
    })
}

fn tile(
    backend: &dyn RasterBackend,
    cache: &ReplyCache,
    args: &PathArgs,
    request: &Request,
) -> HandlerResult {
    let tile_request = tile_request(args, request)?;
    cache.get_or_try_insert(CacheKey::new(TILE_NAME, &tile_request), || {
        let image = backend.tile(&tile_request)?;
        Ok(Reply::new(Outcome::Ok, tile_request.format.content_type(), image))
    })
}

/// Decode path arguments and query parameters for a tile
fn tile_request(args: &PathArgs, request: &Request) -> Result<TileRequest, HandlerError> {
    let ext = args.str(4)?;
    let format = TileFormat::from_extension(ext)
        .ok_or_else(|| HandlerError::msg(format!("Unsupported tile format: {ext}")))?;

    let query = &request.query;
    Ok(TileRequest {
        scene: args.str(0)?.to_string(),
        z: args.int(1)?,
        x: args.int(2)?,
        y: args.int(3)?,
        bands: query.decode("rgb", DEFAULT_BANDS)?,
        r_bds: query.decode("r_bds", DEFAULT_BAND_RANGE)?,
        g_bds: query.decode("g_bds", DEFAULT_BAND_RANGE)?,
        b_bds: query.decode("b_bds", DEFAULT_BAND_RANGE)?,
        pan: query.flag("pan"),
        tile_size: query.decode("tile", DEFAULT_TILE_SIZE)?,
        format,
    })
}

fn favicon(_args: &PathArgs, _request: &Request) -> HandlerResult {
    Ok(Reply::new(Outcome::BadRequest, "text/plain", ""))
}
