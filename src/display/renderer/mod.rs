//! Splash screen render passes and screen lifecycle controls

use chrono::Local;
use log::{debug, error, warn};

use crate::config::ChargerConfig;
use crate::display::backend::{create_backend, GraphicsBackend, Rotation};
use crate::display::font::Font;
use crate::display::gradient::Gradient;
use crate::display::layout::{determine_xy, Placement, ScreenGeometry};
use crate::display::surface::Surface;
use crate::models::animation::{Animation, OverlaySource, TextField, TextOverlay};
use crate::models::battery::BatteryStatus;

const CLOCK_FORMAT: &str = "%H:%M";
const CLOCK_LENGTH: usize = 5;

/// Vertical gap between the percentage field and the date line.
const DATE_MARGIN: i32 = 50;

const BAR_HEIGHT: i32 = 30;
const BAR_WIDTH_PERCENT: i32 = 60;

/// Temperature bands, in tenths of a degree Celsius.
const TEMP_COLD_DECI: i32 = 150;
const TEMP_HOT_DECI: i32 = 450;
const TEMP_DANGER_DECI: i32 = 550;

/// Immediate-mode renderer for the charging splash screen.
///
/// Construction resolves fonts and split-screen configuration once; every
/// `redraw` call re-reads the screen geometry from the backend so rotation
/// and hotplug changes take effect on the next frame.
pub struct ChargerRenderer {
    backend: Box<dyn GraphicsBackend>,
    split_screen: bool,
    split_offset: i32,
    sys_font: Option<Font>,
    percent_gradient: Gradient,
    bar_gradient: Gradient,
}

impl ChargerRenderer {
    /// Initialize the graphics backend and build a renderer. Fails only if
    /// the backend cannot be brought up; font problems are logged and the
    /// affected overlays skipped.
    pub fn create(config: &ChargerConfig, anim: &mut Animation) -> Result<Self, String> {
        let backend = create_backend(config)?;
        Ok(Self::with_backend(backend, config, anim))
    }

    /// Build a renderer on an already-initialized backend.
    pub fn with_backend(
        backend: Box<dyn GraphicsBackend>,
        config: &ChargerConfig,
        anim: &mut Animation,
    ) -> Self {
        let sys_font = match &config.sys_font {
            Some(path) => match Font::load(path) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!(
                        "No system font ({}): {}; screen fallback text not available",
                        path.display(),
                        e
                    );
                    None
                }
            },
            None => {
                warn!("No system font configured, screen fallback text not available");
                None
            }
        };

        resolve_field_font(&mut anim.text_clock, "clock", &sys_font);
        resolve_field_font(&mut anim.text_percent, "percent", &sys_font);
        for overlay in &mut anim.overlays {
            resolve_field_font(&mut overlay.field, "overlay", &sys_font);
        }

        ChargerRenderer {
            backend,
            split_screen: config.split_screen,
            split_offset: config.split_offset,
            sys_font,
            percent_gradient: Gradient::battery_percent(),
            bar_gradient: Gradient::progress_bar(),
        }
    }

    /// Render one frame: clear, draw either the unknown-state fallback or
    /// the full battery view, then present.
    pub fn redraw(&mut self, anim: &Animation, surf_unknown: Option<&Surface>) {
        self.clear_screen();

        // try to display *something*
        if anim.cur_status == BatteryStatus::Unknown || anim.cur_level < 0 || anim.num_frames == 0
        {
            self.draw_unknown(surf_unknown);
        } else {
            self.draw_battery(anim);
        }
        self.backend.flip();
    }

    pub fn blank_screen(&mut self, blank: bool, display: usize) {
        if let Err(e) = self.backend.blank(blank, display) {
            warn!("Could not blank display {}: {}", display, e);
        }
    }

    /// Foldable support: display 0 is driven in landscape, any other in
    /// its native portrait orientation.
    pub fn rotate_screen(&mut self, display: usize) {
        let rotation = if display == 0 {
            Rotation::Right
        } else {
            Rotation::None
        };
        self.backend.rotate(rotation);
    }

    pub fn has_multiple_connectors(&self) -> bool {
        self.backend.has_multiple_connectors()
    }

    /// Logical geometry of one panel half, refreshed from the backend.
    fn geometry(&self) -> ScreenGeometry {
        let halves = if self.split_screen { 2 } else { 1 };
        ScreenGeometry {
            width: self.backend.fb_width() / halves,
            height: self.backend.fb_height(),
            split_offset: self.split_offset,
        }
    }

    fn clear_screen(&mut self) {
        self.backend.set_color(0, 0, 0, 255);
        self.backend.clear();
    }

    /// Draw text with the current color. Negative coordinates center the
    /// text on that axis. Returns the y offset below the drawn line.
    fn draw_text(&mut self, font: &Font, x: i32, y: i32, text: &str) -> i32 {
        let geo = self.geometry();
        let x = if x < 0 { (geo.width - font.measure(text)) / 2 } else { x };
        let y = if y < 0 { (geo.height - font.char_height()) / 2 } else { y };

        self.backend.draw_text(font, x, y, text);
        if self.split_screen {
            self.backend
                .draw_text(font, x + geo.width - 2 * self.split_offset, y, text);
        }
        y + font.char_height()
    }

    /// Returns the y offset below the blitted surface.
    fn draw_surface_centered(&mut self, surface: &Surface) -> i32 {
        let geo = self.geometry();
        let x = (geo.width - surface.width()) / 2;
        let y = (geo.height - surface.height()) / 2;

        debug!(
            "drawing surface {}x{}+{}+{}",
            surface.width(),
            surface.height(),
            x,
            y
        );
        self.backend.blit(surface, x, y);
        if self.split_screen {
            self.backend
                .blit(surface, x + geo.width - 2 * self.split_offset, y);
        }
        y + surface.height()
    }

    fn fill_rect_mirrored(&mut self, x: i32, y: i32, width: i32, height: i32, geo: &ScreenGeometry) {
        self.backend.fill_rect(x, y, width, height);
        if self.split_screen {
            self.backend
                .fill_rect(x + geo.width - 2 * self.split_offset, y, width, height);
        }
    }

    fn draw_unknown(&mut self, surf_unknown: Option<&Surface>) {
        if let Some(surface) = surf_unknown {
            self.draw_surface_centered(surface);
        } else if let Some(font) = self.sys_font.clone().filter(|f| f.is_usable()) {
            self.backend.set_color(0xa4, 0xc6, 0x39, 255);
            let y = self.draw_text(&font, -1, -1, "Charging!");
            self.draw_text(&font, -1, y + 25, "??/100");
        } else {
            warn!("Charging, level unknown");
        }
    }

    fn draw_battery(&mut self, anim: &Animation) {
        self.draw_progress_bar(anim);
        self.draw_percent(anim);
        self.draw_clock(anim);
        for overlay in &anim.overlays {
            self.draw_overlay(anim, overlay);
        }
    }

    fn draw_percent(&mut self, anim: &Animation) {
        let mut level = anim.cur_level;
        if anim.cur_status == BatteryStatus::Full {
            level = 100;
        }
        if level < 0 {
            return;
        }

        let field = &anim.text_percent;
        let font = match field.usable_font() {
            Some(font) => font.clone(),
            None => return,
        };

        let [r, g, b] = self.percent_gradient.color_for(level);
        let text = format!("{}%", level);
        let geo = self.geometry();
        let (x, y) = determine_xy(field, &font, text.chars().count(), &geo);

        self.backend.set_color(r, g, b, field.color[3]);
        self.draw_text(&font, x, y, &text);
    }

    fn draw_clock(&mut self, anim: &Animation) {
        let field = &anim.text_clock;
        let font = match field.usable_font() {
            Some(font) => font.clone(),
            None => return,
        };

        let clock_str = Local::now().format(CLOCK_FORMAT).to_string();
        if clock_str.chars().count() != CLOCK_LENGTH {
            error!("Could not format time: {:?}", clock_str);
            return;
        }

        let geo = self.geometry();
        let (x, y) = determine_xy(field, &font, CLOCK_LENGTH, &geo);

        debug!("drawing clock {} {} {}", clock_str, x, y);
        self.backend
            .set_color(field.color[0], field.color[1], field.color[2], field.color[3]);
        self.draw_text(&font, x, y, &clock_str);
    }

    /// Date line sits one character height plus a fixed margin below the
    /// percentage field and shares its font.
    fn draw_date(&mut self, anim: &Animation, format: &str) {
        let field = &anim.text_percent;
        let font = match field.usable_font() {
            Some(font) => font.clone(),
            None => return,
        };

        let date_str = Local::now().format(format).to_string();
        if date_str.is_empty() {
            return;
        }

        let geo = self.geometry();
        let (x, mut y) = determine_xy(field, &font, date_str.chars().count(), &geo);
        y += font.char_height() + DATE_MARGIN;

        self.backend.set_color(255, 255, 255, 255);
        self.draw_text(&font, x, y, &date_str);
    }

    fn draw_overlay(&mut self, anim: &Animation, overlay: &TextOverlay) {
        let (text, banded_color) = match &overlay.source {
            OverlaySource::Literal { text } => (text.clone(), None),
            OverlaySource::Version => (format!("v{}", env!("CARGO_PKG_VERSION")), None),
            OverlaySource::Date { format } => return self.draw_date(anim, format),
            OverlaySource::Temperature => (
                format_temperature(anim.cur_temp_deci),
                Some(temperature_color(anim.cur_temp_deci)),
            ),
        };

        let field = &overlay.field;
        let font = match field.usable_font() {
            Some(font) => font.clone(),
            None => return,
        };

        let geo = self.geometry();
        let (x, y) = determine_xy(field, &font, text.chars().count(), &geo);
        let [r, g, b] = banded_color.unwrap_or([field.color[0], field.color[1], field.color[2]]);

        self.backend.set_color(r, g, b, field.color[3]);
        self.draw_text(&font, x, y, &text);
    }

    fn draw_progress_bar(&mut self, anim: &Animation) {
        let bar = &anim.progress_bar;
        if !bar.enabled {
            return;
        }

        let level = if anim.cur_status == BatteryStatus::Full {
            100
        } else {
            anim.cur_level.clamp(0, 100)
        };

        let geo = self.geometry();
        let bar_width = geo.width * BAR_WIDTH_PERCENT / 100;
        let x = (geo.width - bar_width) / 2;
        let y = match bar.pos_y {
            Placement::Center => (geo.height - BAR_HEIGHT) / 2,
            Placement::FromNear(py) => py,
            Placement::FromFar(margin) => geo.height + margin - BAR_HEIGHT,
        };

        let [tr, tg, tb, ta] = bar.track_color;
        self.backend.set_color(tr, tg, tb, ta);
        self.fill_rect_mirrored(x, y, bar_width, BAR_HEIGHT, &geo);

        let fill_width = bar_width * level / 100;
        if fill_width > 0 {
            let [r, g, b] = self.bar_gradient.color_for(level);
            self.backend.set_color(r, g, b, 255);
            self.fill_rect_mirrored(x, y, fill_width, BAR_HEIGHT, &geo);
        }
    }
}

fn resolve_field_font(field: &mut TextField, label: &str, sys_font: &Option<Font>) {
    if let Some(path) = &field.font_file {
        match Font::load(path) {
            Ok(font) => field.font = Some(font),
            Err(e) => error!("Could not load {} font {}: {}", label, path.display(), e),
        }
    }
    if field.font.is_none() {
        field.font = sys_font.clone();
    }
}

fn format_temperature(temp_deci: i32) -> String {
    let whole = temp_deci / 10;
    let frac = (temp_deci % 10).abs();
    if temp_deci < 0 && whole == 0 {
        format!("-0.{}\u{00B0}C", frac)
    } else {
        format!("{}.{}\u{00B0}C", whole, frac)
    }
}

fn temperature_color(temp_deci: i32) -> [u8; 3] {
    if temp_deci < TEMP_COLD_DECI {
        [100, 181, 246]
    } else if temp_deci < TEMP_HOT_DECI {
        [255, 255, 255]
    } else if temp_deci < TEMP_DANGER_DECI {
        [255, 140, 0]
    } else {
        [255, 30, 30]
    }
}
