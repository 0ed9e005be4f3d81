//! Deep Zoom Image (DZI) descriptor.
//!
//! Viewers such as OpenSeadragon load a pyramid from a small XML descriptor
//! plus a directory of tiles laid out as `<level>/<col>_<row>.<format>`.

/// Default tile format written into descriptors.
pub const DEFAULT_TILE_FORMAT: &str = "jpeg";

/// Generate the DZI XML descriptor for a pyramid.
///
/// # Example Output
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Image xmlns="http://schemas.microsoft.com/deepzoom/2008"
///        TileSize="254"
///        Overlap="1"
///        Format="jpeg">
///   <Size Width="46920" Height="33600" />
/// </Image>
/// ```
pub fn generate_dzi_xml(
    width: u32,
    height: u32,
    tile_size: u32,
    overlap: u32,
    format: &str,
) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Image xmlns="http://schemas.microsoft.com/deepzoom/2008"
       TileSize="{tile_size}"
       Overlap="{overlap}"
       Format="{format}">
  <Size Width="{width}" Height="{height}" />
</Image>"#
    )
}

/// Relative path of a tile inside the `_files` directory.
pub fn dzi_tile_path(level: usize, col: u32, row: u32, format: &str) -> String {
    format!("{level}/{col}_{row}.{format}")
}
