use std::io;

use crate::config::ChargerConfig;
use crate::display::font::Font;
use crate::display::surface::Surface;

mod fbdev;

pub use fbdev::FbdevBackend;

/// Screen orientation, landscape for the unfolded panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    None,
    Right,
}

/// Narrow capability seam over the raw display, so the render passes can be
/// exercised against a recording double in tests.
///
/// Drawing operations use the color most recently set with `set_color` and
/// become visible after `flip`.
pub trait GraphicsBackend {
    fn fb_width(&self) -> i32;
    fn fb_height(&self) -> i32;
    fn set_color(&mut self, r: u8, g: u8, b: u8, a: u8);
    fn clear(&mut self);
    fn draw_text(&mut self, font: &Font, x: i32, y: i32, text: &str);
    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn blit(&mut self, surface: &Surface, x: i32, y: i32);
    fn flip(&mut self);
    fn blank(&mut self, blank: bool, display: usize) -> io::Result<()>;
    fn rotate(&mut self, rotation: Rotation);
    fn has_multiple_connectors(&self) -> bool;
}

/// Open and map the framebuffer named by the configuration.
pub fn create_backend(config: &ChargerConfig) -> Result<Box<dyn GraphicsBackend>, String> {
    let backend = FbdevBackend::initialize(config)?;
    Ok(Box::new(backend))
}
