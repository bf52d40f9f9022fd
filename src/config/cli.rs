//! Command-line argument parsing

use std::path::PathBuf;

/// Battery charging splash screen renderer
///
/// Draws the charge-only mode splash screen onto a raw framebuffer.
#[derive(argh::FromArgs, Debug, Clone)]
pub struct CliArgs {
    #[argh(option)]
    /// framebuffer device node. Default: /dev/fb0
    pub fb_device: Option<PathBuf>,

    #[argh(switch)]
    /// mirror the image into two halves of the panel. Default: false
    pub split_screen: bool,

    #[argh(option, default = "0")]
    /// pixels to offset graphics towards the center split. Default: 0
    pub split_offset: i64,

    #[argh(option)]
    /// PSF font used for fallback text and fields without their own font.
    /// Default: /usr/share/consolefonts/default.psf
    pub sys_font: Option<PathBuf>,

    #[argh(option)]
    /// JSON animation description; a built-in layout is used when omitted
    pub animation: Option<PathBuf>,

    #[argh(option)]
    /// image shown while the battery state is unknown (PNG/JPEG/BMP)
    pub unknown_image: Option<PathBuf>,

    #[argh(option)]
    /// power supply name under /sys/class/power_supply.
    /// Default: first battery-type supply
    pub power_supply: Option<String>,

    #[argh(option, default = "1000")]
    /// milliseconds between redraws. Default: 1000
    pub interval_ms: u64,

    #[argh(switch)]
    /// render a single frame and exit
    pub once: bool,
}

impl CliArgs {
    /// Parse CLI arguments
    pub fn parse() -> Self {
        argh::from_env()
    }

    #[cfg(test)]
    pub fn default_for_tests() -> Self {
        CliArgs {
            fb_device: None,
            split_screen: false,
            split_offset: 0,
            sys_font: None,
            animation: None,
            unknown_image: None,
            power_supply: None,
            interval_ms: 1000,
            once: false,
        }
    }
}
