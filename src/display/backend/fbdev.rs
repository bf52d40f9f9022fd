use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::Pixel;
use log::{debug, info, warn};

use crate::config::ChargerConfig;
use crate::display::font::Font;
use crate::display::surface::Surface;

use super::{GraphicsBackend, Rotation};

const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;
const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;
const FBIOBLANK: libc::c_ulong = 0x4611;

const FB_BLANK_UNBLANK: libc::c_int = 0;
const FB_BLANK_POWERDOWN: libc::c_int = 4;

#[repr(C)]
#[derive(Clone, Copy)]
struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct FbVarScreeninfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

#[repr(C)]
#[derive(Clone, Copy)]
struct FbFixScreeninfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    fb_type: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

/// Linux fbdev implementation of [`GraphicsBackend`].
///
/// Draws into an offscreen buffer in the panel's native orientation;
/// `flip` copies the whole buffer into the mapped framebuffer memory.
pub struct FbdevBackend {
    file: File,
    device: PathBuf,
    mapped: *mut u8,
    mapped_len: usize,
    xres: i32,
    yres: i32,
    line_length: usize,
    bytes_per_pixel: usize,
    red_shift: u32,
    green_shift: u32,
    blue_shift: u32,
    rotation: Rotation,
    color: [u8; 4],
    back: Vec<u8>,
}

impl FbdevBackend {
    pub fn initialize(config: &ChargerConfig) -> Result<Self, String> {
        let device = config.fb_device.clone();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&device)
            .map_err(|e| format!("Failed to open framebuffer {}: {}", device.display(), e))?;
        let fd = file.as_raw_fd();

        let mut var: FbVarScreeninfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::ioctl(fd, FBIOGET_VSCREENINFO, &mut var) } != 0 {
            return Err(format!(
                "FBIOGET_VSCREENINFO on {} failed: {}",
                device.display(),
                io::Error::last_os_error()
            ));
        }

        let mut fix: FbFixScreeninfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::ioctl(fd, FBIOGET_FSCREENINFO, &mut fix) } != 0 {
            return Err(format!(
                "FBIOGET_FSCREENINFO on {} failed: {}",
                device.display(),
                io::Error::last_os_error()
            ));
        }

        let bytes_per_pixel = match var.bits_per_pixel {
            16 => 2,
            32 => 4,
            other => {
                return Err(format!(
                    "Unsupported framebuffer depth: {} bits per pixel",
                    other
                ))
            }
        };

        let mapped_len = fix.smem_len as usize;
        let mapped = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                mapped_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };
        if mapped == libc::MAP_FAILED {
            return Err(format!(
                "mmap of {} failed: {}",
                device.display(),
                io::Error::last_os_error()
            ));
        }

        let line_length = fix.line_length as usize;
        let back = vec![0u8; line_length * var.yres as usize];

        info!(
            "Framebuffer {}: {}x{} @ {}bpp, line length {}",
            device.display(),
            var.xres,
            var.yres,
            var.bits_per_pixel,
            line_length
        );

        Ok(FbdevBackend {
            file,
            device,
            mapped: mapped as *mut u8,
            mapped_len,
            xres: var.xres as i32,
            yres: var.yres as i32,
            line_length,
            bytes_per_pixel,
            red_shift: var.red.offset,
            green_shift: var.green.offset,
            blue_shift: var.blue.offset,
            rotation: Rotation::None,
            color: [255, 255, 255, 255],
            back,
        })
    }

    /// Next framebuffer device in the node numbering, e.g. fb0 -> fb1.
    fn secondary_device(&self) -> Option<PathBuf> {
        let name = self.device.file_name()?.to_str()?;
        let digits_at = name.find(|c: char| c.is_ascii_digit())?;
        let index: usize = name[digits_at..].parse().ok()?;
        let next = format!("{}{}", &name[..digits_at], index + 1);
        Some(self.device.with_file_name(next))
    }

    fn to_physical(&self, x: i32, y: i32) -> (i32, i32) {
        match self.rotation {
            Rotation::None => (x, y),
            Rotation::Right => (self.xres - 1 - y, x),
        }
    }

    fn encode(&self, r: u8, g: u8, b: u8) -> u32 {
        match self.bytes_per_pixel {
            2 => ((r as u32 >> 3) << 11) | ((g as u32 >> 2) << 5) | (b as u32 >> 3),
            _ => {
                ((r as u32) << self.red_shift)
                    | ((g as u32) << self.green_shift)
                    | ((b as u32) << self.blue_shift)
            }
        }
    }

    fn decode(&self, value: u32) -> [u8; 3] {
        match self.bytes_per_pixel {
            2 => [
                (((value >> 11) & 0x1f) << 3) as u8,
                (((value >> 5) & 0x3f) << 2) as u8,
                ((value & 0x1f) << 3) as u8,
            ],
            _ => [
                ((value >> self.red_shift) & 0xff) as u8,
                ((value >> self.green_shift) & 0xff) as u8,
                ((value >> self.blue_shift) & 0xff) as u8,
            ],
        }
    }

    fn read_back(&self, offset: usize) -> u32 {
        match self.bytes_per_pixel {
            2 => u16::from_le_bytes([self.back[offset], self.back[offset + 1]]) as u32,
            _ => u32::from_le_bytes([
                self.back[offset],
                self.back[offset + 1],
                self.back[offset + 2],
                self.back[offset + 3],
            ]),
        }
    }

    fn write_back(&mut self, offset: usize, value: u32) {
        match self.bytes_per_pixel {
            2 => self.back[offset..offset + 2].copy_from_slice(&(value as u16).to_le_bytes()),
            _ => self.back[offset..offset + 4].copy_from_slice(&value.to_le_bytes()),
        }
    }

    fn put_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if a == 0 || x < 0 || y < 0 || x >= self.logical_width() || y >= self.logical_height() {
            return;
        }
        let (px, py) = self.to_physical(x, y);
        let offset = py as usize * self.line_length + px as usize * self.bytes_per_pixel;

        let value = if a == 255 {
            self.encode(r, g, b)
        } else {
            let [dr, dg, db] = self.decode(self.read_back(offset));
            let blend = |src: u8, dst: u8| -> u8 {
                ((src as u32 * a as u32 + dst as u32 * (255 - a as u32) + 127) / 255) as u8
            };
            self.encode(blend(r, dr), blend(g, dg), blend(b, db))
        };
        self.write_back(offset, value);
    }

    fn logical_width(&self) -> i32 {
        match self.rotation {
            Rotation::None => self.xres,
            Rotation::Right => self.yres,
        }
    }

    fn logical_height(&self) -> i32 {
        match self.rotation {
            Rotation::None => self.yres,
            Rotation::Right => self.xres,
        }
    }

    fn current_rgb(&self) -> Rgb888 {
        Rgb888::new(self.color[0], self.color[1], self.color[2])
    }
}

impl Drop for FbdevBackend {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.mapped as *mut libc::c_void, self.mapped_len);
        }
    }
}

impl GraphicsBackend for FbdevBackend {
    fn fb_width(&self) -> i32 {
        self.logical_width()
    }

    fn fb_height(&self) -> i32 {
        self.logical_height()
    }

    fn set_color(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.color = [r, g, b, a];
    }

    fn clear(&mut self) {
        let color = self.current_rgb();
        let alpha = 255;
        let _ = FbCanvas::new(self, alpha).clear(color);
    }

    fn draw_text(&mut self, font: &Font, x: i32, y: i32, text: &str) {
        let color = self.current_rgb();
        let alpha = self.color[3];
        let mut canvas = FbCanvas::new(self, alpha);

        let mut pen_x = x;
        for c in text.chars() {
            let glyph = font.glyph(c);
            let pixels = (0..font.char_height()).flat_map(|row| {
                (0..font.char_width()).filter_map(move |col| {
                    if font.glyph_pixel(glyph, col, row) {
                        Some(Pixel(Point::new(pen_x + col, y + row), color))
                    } else {
                        None
                    }
                })
            });
            let _ = canvas.draw_iter(pixels);
            pen_x += font.char_width();
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        let color = self.current_rgb();
        let alpha = self.color[3];
        let style = PrimitiveStyle::with_fill(color);
        let rect = Rectangle::new(Point::new(x, y), Size::new(width as u32, height as u32));
        let _ = rect.into_styled(style).draw(&mut FbCanvas::new(self, alpha));
    }

    fn blit(&mut self, surface: &Surface, x: i32, y: i32) {
        let mut canvas = FbCanvas::new(self, 255);
        let pixels = (0..surface.height()).flat_map(|row| {
            (0..surface.width()).map(move |col| {
                let [r, g, b] = surface.pixel(col, row);
                Pixel(Point::new(x + col, y + row), Rgb888::new(r, g, b))
            })
        });
        let _ = canvas.draw_iter(pixels);
    }

    fn flip(&mut self) {
        debug!("flipping {} bytes to {}", self.back.len(), self.device.display());
        let len = self.back.len().min(self.mapped_len);
        unsafe {
            std::ptr::copy_nonoverlapping(self.back.as_ptr(), self.mapped, len);
        }
    }

    fn blank(&mut self, blank: bool, display: usize) -> io::Result<()> {
        let arg = if blank { FB_BLANK_POWERDOWN } else { FB_BLANK_UNBLANK };
        let ret = if display == 0 {
            unsafe { libc::ioctl(self.file.as_raw_fd(), FBIOBLANK, arg) }
        } else {
            let path = self
                .secondary_device()
                .filter(|p| p.exists())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no secondary framebuffer"))?;
            let file = OpenOptions::new().read(true).write(true).open(&path)?;
            unsafe { libc::ioctl(file.as_raw_fd(), FBIOBLANK, arg) }
        };
        if ret != 0 {
            let err = io::Error::last_os_error();
            warn!("FBIOBLANK({}) failed: {}", blank, err);
            return Err(err);
        }
        Ok(())
    }

    fn rotate(&mut self, rotation: Rotation) {
        if self.rotation != rotation {
            debug!("rotating framebuffer to {:?}", rotation);
            self.rotation = rotation;
        }
    }

    fn has_multiple_connectors(&self) -> bool {
        self.secondary_device().map_or(false, |p| p.exists())
    }
}

/// embedded-graphics draw target over the backend's offscreen buffer,
/// in the current logical (rotation-adjusted) orientation.
struct FbCanvas<'a> {
    backend: &'a mut FbdevBackend,
    alpha: u8,
}

impl<'a> FbCanvas<'a> {
    fn new(backend: &'a mut FbdevBackend, alpha: u8) -> Self {
        FbCanvas { backend, alpha }
    }
}

impl OriginDimensions for FbCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(
            self.backend.logical_width() as u32,
            self.backend.logical_height() as u32,
        )
    }
}

impl DrawTarget for FbCanvas<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.backend
                .put_pixel(point.x, point.y, color.r(), color.g(), color.b(), self.alpha);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChargerConfig;

    #[test]
    fn initialize_fails_cleanly_on_missing_device() {
        let config = ChargerConfig {
            fb_device: PathBuf::from("/dev/does-not-exist-fb9"),
            ..ChargerConfig::default()
        };
        let err = FbdevBackend::initialize(&config)
            .err()
            .expect("initialize succeeded on a missing device");
        assert!(err.contains("Failed to open framebuffer"), "{}", err);
    }
}
