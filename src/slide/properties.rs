//! Well-known slide property names and value parsing.
//!
//! Property names follow the OpenSlide vocabulary so that any reader backed by
//! an OpenSlide-compatible decoder can expose them unchanged.

use image::Rgba;
use tracing::warn;

use super::reader::SlideReader;

/// Background colour as a hex triplet (`RRGGBB`).
pub const PROPERTY_BACKGROUND_COLOR: &str = "openslide.background-color";

/// Height of the non-empty region, in level 0 pixels.
pub const PROPERTY_BOUNDS_HEIGHT: &str = "openslide.bounds-height";

/// Width of the non-empty region, in level 0 pixels.
pub const PROPERTY_BOUNDS_WIDTH: &str = "openslide.bounds-width";

/// X offset of the non-empty region, in level 0 pixels.
pub const PROPERTY_BOUNDS_X: &str = "openslide.bounds-x";

/// Y offset of the non-empty region, in level 0 pixels.
pub const PROPERTY_BOUNDS_Y: &str = "openslide.bounds-y";

/// Background used when the slide does not declare one.
pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// [`DEFAULT_BACKGROUND`] as a property value.
pub const DEFAULT_BACKGROUND_HEX: &str = "FFFFFF";

/// Read an integer property, treating absent or unparsable values as `None`.
pub fn integer_property<S: SlideReader + ?Sized>(slide: &S, name: &str) -> Option<i64> {
    let value = slide.property(name)?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    match value.parse::<i64>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(property = name, value, error = %e, "Ignoring non-integer slide property");
            None
        }
    }
}

/// Parse a `RRGGBB` hex triplet (an optional leading `#` is accepted).
pub fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255]))
}

/// Background colour declared by the slide, or white.
pub fn background_color<S: SlideReader + ?Sized>(slide: &S) -> Rgba<u8> {
    let value = slide.property_or(PROPERTY_BACKGROUND_COLOR, DEFAULT_BACKGROUND_HEX);
    parse_hex_color(&value).unwrap_or_else(|| {
        warn!(value = %value, "Ignoring malformed background colour");
        DEFAULT_BACKGROUND
    })
}
