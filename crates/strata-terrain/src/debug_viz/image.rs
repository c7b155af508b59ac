//! A 2D debug image represented as a flat array of RGBA pixels.

/// A 2D preview image, stored as row-major RGBA pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl DebugImage {
    /// Create a transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Set an opaque pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let idx = self.offset(x, y);
        self.pixels[idx..idx + 3].copy_from_slice(&rgb);
        self.pixels[idx + 3] = u8::MAX;
    }

    /// Read a pixel as `[r, g, b, a]`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.offset(x, y);
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of distinct RGB colours, alpha ignored.
    pub fn unique_color_count(&self) -> usize {
        let mut colors = std::collections::HashSet::new();
        for px in self.pixels.chunks_exact(4) {
            colors.insert((px[0], px[1], px[2]));
        }
        colors.len()
    }
}
