//! Image MIME type mapping
//!
//! Tile extensions are normalized here so `jpg` always leaves as `image/jpeg`.

/// Get the image Content-Type for a tile extension
///
/// # Examples
/// ```
/// use landsat_tiler::http::mime::image_content_type;
/// assert_eq!(image_content_type("png"), Some("image/png"));
/// assert_eq!(image_content_type("jpg"), Some("image/jpeg"));
/// assert_eq!(image_content_type("tif"), None);
/// ```
pub fn image_content_type(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_types() {
        assert_eq!(image_content_type("png"), Some("image/png"));
        assert_eq!(image_content_type("jpeg"), Some("image/jpeg"));
        assert_eq!(image_content_type("jpg"), Some("image/jpeg"));
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(image_content_type("gif"), None);
        assert_eq!(image_content_type("PNG"), None);
        assert_eq!(image_content_type(""), None);
    }
}
