//! Charger configuration structure and methods

use std::path::PathBuf;

use log::warn;

use super::{CliArgs, EnvVars};

fn default_sys_font() -> Option<PathBuf> {
    Some(PathBuf::from("/usr/share/consolefonts/default.psf"))
}

/// Configuration for the splash renderer and the redraw loop.
#[derive(Clone, Debug)]
pub struct ChargerConfig {
    pub fb_device: PathBuf,
    /// The panel shows the same image mirrored into two halves.
    pub split_screen: bool,
    /// Pixels to offset graphics towards the center split.
    pub split_offset: i32,
    pub sys_font: Option<PathBuf>,
    pub animation: Option<PathBuf>,
    pub unknown_image: Option<PathBuf>,
    pub power_supply: Option<String>,
    pub interval_ms: u64,
    pub once: bool,
}

impl Default for ChargerConfig {
    fn default() -> Self {
        ChargerConfig {
            fb_device: PathBuf::from("/dev/fb0"),
            split_screen: false,
            split_offset: 0,
            sys_font: default_sys_font(),
            animation: None,
            unknown_image: None,
            power_supply: None,
            interval_ms: 1000,
            once: false,
        }
    }
}

impl ChargerConfig {
    /// Combine CLI arguments and environment variables; the environment
    /// takes precedence so init scripts can override baked-in defaults.
    pub fn new(cli_args: CliArgs, env_vars: EnvVars) -> Self {
        let fb_device = env_vars
            .fb_device
            .or(cli_args.fb_device)
            .unwrap_or_else(|| PathBuf::from("/dev/fb0"));

        let split_screen = env_vars.split_screen.unwrap_or(cli_args.split_screen);
        let split_offset = clamp_split_offset(env_vars.split_offset.unwrap_or(cli_args.split_offset));

        let sys_font = env_vars
            .sys_font
            .or(cli_args.sys_font)
            .or_else(default_sys_font);

        let animation = env_vars.animation.or(cli_args.animation);
        let unknown_image = env_vars.unknown_image.or(cli_args.unknown_image);
        let power_supply = env_vars.power_supply.or(cli_args.power_supply);
        let interval_ms = env_vars.interval_ms.unwrap_or(cli_args.interval_ms);

        ChargerConfig {
            fb_device,
            split_screen,
            split_offset,
            sys_font,
            animation,
            unknown_image,
            power_supply,
            interval_ms,
            once: cli_args.once,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.interval_ms == 0 {
            errors.push("Redraw interval must be greater than 0 ms".to_string());
        }

        if self.split_screen && self.split_offset < 0 {
            errors.push("Split offset must not be negative in split-screen mode".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// The offset arrives as an i64 from configuration; values outside the
/// native int range are clamped, not rejected.
fn clamp_split_offset(value: i64) -> i32 {
    if value < i64::from(i32::MIN) {
        warn!("split_offset = {} overflows an i32; resetting to {}", value, i32::MIN);
        i32::MIN
    } else if value > i64::from(i32::MAX) {
        warn!("split_offset = {} overflows an i32; resetting to {}", value, i32::MAX);
        i32::MAX
    } else {
        value as i32
    }
}
