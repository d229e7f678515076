//! Raster backend seam
//!
//! Reading scenes, reprojecting and encoding tiles happen behind this trait.
//! The tiler only shapes requests and replies.

use serde_json::Value;

use crate::error::BackendError;
use crate::http::mime::image_content_type;

/// Encoded image format of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
    Png,
    Jpeg,
}

impl TileFormat {
    /// Parse a tile extension; `jpg` and `jpeg` are the same format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match image_content_type(ext)? {
            "image/png" => Some(Self::Png),
            _ => Some(Self::Jpeg),
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

/// Min/max rescaling range for one band
pub type BandRange = [i64; 2];

/// Everything needed to render one mercator tile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub scene: String,
    pub x: i64,
    pub y: i64,
    pub z: i64,
    /// Band combination, e.g. `[4, 3, 2]` for natural color
    pub bands: [u8; 3],
    pub r_bds: BandRange,
    pub g_bds: BandRange,
    pub b_bds: BandRange,
    /// Pan-sharpen with band 8
    pub pan: bool,
    pub tile_size: u32,
    pub format: TileFormat,
}

/// The external raster library
pub trait RasterBackend: Send + Sync {
    /// Scene bounds as JSON
    fn bounds(&self, scene: &str) -> Result<Value, BackendError>;

    /// Scene metadata with per-band percentile statistics
    fn metadata(&self, scene: &str, pmin: f64, pmax: f64) -> Result<Value, BackendError>;

    /// Encoded tile image
    fn tile(&self, request: &TileRequest) -> Result<Vec<u8>, BackendError>;
}

/// Backend used when no raster library is wired in; every call fails
#[derive(Debug, Clone, Default)]
pub struct UnavailableBackend;

impl UnavailableBackend {
    fn unavailable<T>() -> Result<T, BackendError> {
        Err(BackendError::Unavailable(
            "no raster backend configured".to_string(),
        ))
    }
}

impl RasterBackend for UnavailableBackend {
    fn bounds(&self, _scene: &str) -> Result<Value, BackendError> {
        Self::unavailable()
    }

    fn metadata(&self, _scene: &str, _pmin: f64, _pmax: f64) -> Result<Value, BackendError> {
        Self::unavailable()
    }

    fn tile(&self, _request: &TileRequest) -> Result<Vec<u8>, BackendError> {
        Self::unavailable()
    }
}
