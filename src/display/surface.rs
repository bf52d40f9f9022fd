//! Decoded RGB image surfaces for blitting

use std::path::Path;

/// Owned RGB pixel buffer, row-major, one `[r, g, b]` triple per pixel.
#[derive(Clone, Debug)]
pub struct Surface {
    width: i32,
    height: i32,
    pixels: Vec<[u8; 3]>,
}

impl Surface {
    /// Decode an image file (PNG/JPEG/BMP) into a surface.
    pub fn from_file(path: &Path) -> Result<Surface, String> {
        let decoded = image::open(path)
            .map_err(|e| format!("Failed to decode image {}: {}", path.display(), e))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb.pixels().map(|p| p.0).collect();
        Ok(Surface {
            width: width as i32,
            height: height as i32,
            pixels,
        })
    }

    pub fn from_pixels(width: i32, height: i32, pixels: Vec<[u8; 3]>) -> Surface {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Surface { width, height, pixels }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn pixel(&self, x: i32, y: i32) -> [u8; 3] {
        self.pixels[(y * self.width + x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_lookup_is_row_major() {
        let surface = Surface::from_pixels(2, 2, vec![[1, 0, 0], [2, 0, 0], [3, 0, 0], [4, 0, 0]]);
        assert_eq!(surface.pixel(0, 0), [1, 0, 0]);
        assert_eq!(surface.pixel(1, 0), [2, 0, 0]);
        assert_eq!(surface.pixel(0, 1), [3, 0, 0]);
        assert_eq!(surface.pixel(1, 1), [4, 0, 0]);
    }
}
