//! PSF console font loading and metrics

use std::fs;
use std::io;
use std::path::Path;

const PSF1_MAGIC: [u8; 2] = [0x36, 0x04];
const PSF1_MODE_512: u8 = 0x01;
const PSF2_MAGIC: [u8; 4] = [0x72, 0xb5, 0x4a, 0x86];

/// Monospace bitmap font with one 1-bpp glyph per character cell.
///
/// Glyph rows are packed most-significant-bit first, `(width + 7) / 8`
/// bytes per row, as in the Linux console PSF formats.
#[derive(Clone, Debug)]
pub struct Font {
    char_width: i32,
    char_height: i32,
    bytes_per_row: usize,
    bytes_per_glyph: usize,
    glyph_count: usize,
    glyphs: Vec<u8>,
}

impl Font {
    /// Load a PSF1 or PSF2 font from disk.
    pub fn load(path: &Path) -> io::Result<Font> {
        let bytes = fs::read(path)?;
        Font::parse(&bytes)
    }

    /// Parse an in-memory PSF1 or PSF2 image.
    pub fn parse(bytes: &[u8]) -> io::Result<Font> {
        if bytes.len() >= 4 && bytes[0..2] == PSF1_MAGIC {
            return Font::parse_psf1(bytes);
        }
        if bytes.len() >= 32 && bytes[0..4] == PSF2_MAGIC {
            return Font::parse_psf2(bytes);
        }
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "not a PSF1/PSF2 font image",
        ))
    }

    fn parse_psf1(bytes: &[u8]) -> io::Result<Font> {
        let mode = bytes[2];
        let char_height = bytes[3] as usize;
        let glyph_count = if mode & PSF1_MODE_512 != 0 { 512 } else { 256 };
        if char_height == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "PSF1 font with zero glyph height",
            ));
        }

        let data_len = glyph_count * char_height;
        let glyphs = bytes
            .get(4..4 + data_len)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "truncated PSF1 glyph table"))?
            .to_vec();

        Ok(Font {
            char_width: 8,
            char_height: char_height as i32,
            bytes_per_row: 1,
            bytes_per_glyph: char_height,
            glyph_count,
            glyphs,
        })
    }

    fn parse_psf2(bytes: &[u8]) -> io::Result<Font> {
        let read_u32 = |offset: usize| -> u32 {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };

        let header_size = read_u32(8) as usize;
        let glyph_count = read_u32(16) as usize;
        let bytes_per_glyph = read_u32(20) as usize;
        let char_height = read_u32(24);
        let char_width = read_u32(28);

        if char_width == 0 || char_height == 0 || glyph_count == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "PSF2 font with empty geometry",
            ));
        }

        let bytes_per_row = (char_width as usize + 7) / 8;
        if bytes_per_glyph < bytes_per_row * char_height as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "PSF2 glyph size does not cover the declared cell",
            ));
        }

        let data_len = glyph_count * bytes_per_glyph;
        let glyphs = bytes
            .get(header_size..header_size + data_len)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "truncated PSF2 glyph table"))?
            .to_vec();

        Ok(Font {
            char_width: char_width as i32,
            char_height: char_height as i32,
            bytes_per_row,
            bytes_per_glyph,
            glyph_count,
            glyphs,
        })
    }

    pub fn char_width(&self) -> i32 {
        self.char_width
    }

    pub fn char_height(&self) -> i32 {
        self.char_height
    }

    /// A font with zero cell metrics must never reach the layout math.
    pub fn is_usable(&self) -> bool {
        self.char_width > 0 && self.char_height > 0
    }

    /// Pixel width of `text` rendered in this font.
    pub fn measure(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.char_width
    }

    /// Packed rows for one glyph. Characters beyond the glyph table fall
    /// back to '?', or to the first glyph in tables too small to hold it.
    pub fn glyph(&self, c: char) -> &[u8] {
        let mut index = c as usize;
        if index >= self.glyph_count {
            index = '?' as usize;
            if index >= self.glyph_count {
                index = 0;
            }
        }
        let start = index * self.bytes_per_glyph;
        &self.glyphs[start..start + self.bytes_per_glyph]
    }

    /// True when the pixel at (col, row) of the glyph is set.
    pub fn glyph_pixel(&self, glyph: &[u8], col: i32, row: i32) -> bool {
        let byte = glyph[row as usize * self.bytes_per_row + col as usize / 8];
        byte & (0x80 >> (col % 8)) != 0
    }

    /// Blank font with fixed cell metrics, for layout tests.
    #[cfg(test)]
    pub fn fixed_cell(char_width: i32, char_height: i32) -> Font {
        let bytes_per_row = (char_width as usize + 7) / 8;
        let bytes_per_glyph = bytes_per_row * char_height as usize;
        Font {
            char_width,
            char_height,
            bytes_per_row,
            bytes_per_glyph,
            glyph_count: 256,
            glyphs: vec![0; 256 * bytes_per_glyph],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn psf1_image(height: u8) -> Vec<u8> {
        let mut bytes = vec![0x36, 0x04, 0x00, height];
        bytes.extend(std::iter::repeat(0u8).take(256 * height as usize));
        bytes
    }

    fn psf2_image(width: u32, height: u32, count: u32) -> Vec<u8> {
        let bytes_per_glyph = ((width + 7) / 8) * height;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&PSF2_MAGIC);
        bytes.extend_from_slice(&0u32.to_le_bytes()); // version
        bytes.extend_from_slice(&32u32.to_le_bytes()); // header size
        bytes.extend_from_slice(&0u32.to_le_bytes()); // flags
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&bytes_per_glyph.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend(std::iter::repeat(0u8).take((count * bytes_per_glyph) as usize));
        bytes
    }

    #[test]
    fn parses_psf1_metrics() {
        let font = Font::parse(&psf1_image(16)).unwrap();
        assert_eq!(font.char_width(), 8);
        assert_eq!(font.char_height(), 16);
        assert!(font.is_usable());
        assert_eq!(font.measure("12:45"), 40);
    }

    #[test]
    fn parses_psf2_metrics() {
        let font = Font::parse(&psf2_image(10, 20, 256)).unwrap();
        assert_eq!(font.char_width(), 10);
        assert_eq!(font.char_height(), 20);
        assert_eq!(font.measure("100%"), 40);
    }

    #[test]
    fn rejects_truncated_glyph_table() {
        let mut bytes = psf1_image(16);
        bytes.truncate(100);
        assert!(Font::parse(&bytes).is_err());
    }

    #[test]
    fn rejects_unknown_magic() {
        assert!(Font::parse(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }

    #[test]
    fn tiny_glyph_tables_fall_back_to_the_first_glyph() {
        // 10 glyphs, too few to hold '?' (index 63)
        let mut image = psf2_image(8, 16, 10);
        let header = 32;
        image[header] = 0xff;
        let font = Font::parse(&image).unwrap();
        assert_eq!(font.glyph('A'), font.glyph('\u{0}'));
        assert!(font.glyph_pixel(font.glyph('A'), 0, 0));
    }

    #[test]
    fn out_of_table_characters_fall_back() {
        let mut image = psf1_image(16);
        // Mark the first row of the '?' glyph.
        let qmark_offset = 4 + ('?' as usize) * 16;
        image[qmark_offset] = 0xff;
        let font = Font::parse(&image).unwrap();
        assert_eq!(font.glyph('\u{30AB}'), font.glyph('?'));
        assert!(font.glyph_pixel(font.glyph('?'), 0, 0));
        assert!(!font.glyph_pixel(font.glyph('?'), 0, 1));
    }
}
