//! PNG previews of the generated region.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use strata_terrain::ChunkCoord;
use strata_terrain::debug_viz::{DebugImage, PreviewRegion};

/// Largest preview side in pixels. Bigger regions are subsampled.
const MAX_PREVIEW_SIZE: u32 = 1024;

/// Errors writing a preview image.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Failed to create the output file or directory.
    #[error("failed to create preview file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode the image.
    #[error("failed to encode preview: {0}")]
    Encode(#[from] png::EncodingError),
}

/// The preview region covering every chunk within `radius` of the origin.
pub fn region_for_radius(radius: u32) -> PreviewRegion {
    let chunks = 2 * radius + 1;
    let blocks = chunks * strata_terrain::CHUNK_SIZE as u32;
    let step = blocks.div_ceil(MAX_PREVIEW_SIZE).max(1);
    let (origin_x, origin_z) = ChunkCoord::new(-(radius as i32), -(radius as i32)).origin();
    PreviewRegion {
        origin_x,
        origin_z,
        width: blocks / step,
        height: blocks / step,
        step,
    }
}

/// Encode `image` as an 8-bit RGBA PNG at `path`.
pub fn write_png(path: &Path, image: &DebugImage) -> Result<(), PreviewError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(file, image.width, image.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&image.pixels)?;
    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_covers_all_chunks() {
        let region = region_for_radius(2);
        assert_eq!((region.origin_x, region.origin_z), (-32, -32));
        assert_eq!((region.width, region.height, region.step), (80, 80, 1));
    }

    #[test]
    fn test_large_region_is_subsampled() {
        let region = region_for_radius(40);
        assert!(region.width <= MAX_PREVIEW_SIZE);
        assert_eq!(region.step, 2);
    }

    #[test]
    fn test_write_png_round_trips_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("heights.png");
        let mut image = DebugImage::new(12, 7);
        image.set_rgb(3, 4, [10, 200, 30]);
        write_png(&path, &image).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 12);
        assert_eq!(reader.info().height, 7);
    }
}
