//! Preview rendering of generated terrain.
//!
//! Provides [`DebugImage`] and renderers for column heights, variant cell
//! ownership and height viability. Images are raw RGBA; encoding is left to
//! the caller.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    height_to_color, render_height_debug, render_terrain_map, render_viability, variant_color,
};

/// A rectangle of world columns sampled into an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewRegion {
    /// World X of the top-left pixel.
    pub origin_x: i32,
    /// World Z of the top-left pixel.
    pub origin_z: i32,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// World columns per pixel. Zero is treated as one.
    pub step: u32,
}

impl PreviewRegion {
    /// A region of `width`×`height` pixels, `step` columns apart, centred on `(x, z)`.
    pub fn centered(x: i32, z: i32, width: u32, height: u32, step: u32) -> Self {
        let step = step.max(1);
        Self {
            origin_x: x - (width * step / 2) as i32,
            origin_z: z - (height * step / 2) as i32,
            width,
            height,
            step,
        }
    }
}
