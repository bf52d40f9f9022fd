//! Environment variable handling

use std::path::PathBuf;

/// Environment variables for the charger splash screen, the equivalent of
/// the vendor system properties on the original platform.
#[derive(Debug, Default, Clone)]
pub struct EnvVars {
    pub fb_device: Option<PathBuf>,
    pub split_screen: Option<bool>,
    pub split_offset: Option<i64>,
    pub sys_font: Option<PathBuf>,
    pub animation: Option<PathBuf>,
    pub unknown_image: Option<PathBuf>,
    pub power_supply: Option<String>,
    pub interval_ms: Option<u64>,
}

/// Load configuration from environment variables
pub fn load_env_vars() -> EnvVars {
    let mut env = EnvVars::default();

    if let Ok(value) = std::env::var("CHARGER_FB_DEVICE") {
        env.fb_device = Some(PathBuf::from(value));
    }

    if let Ok(value) = std::env::var("CHARGER_SPLIT_SCREEN") {
        if let Ok(enabled) = value.parse::<bool>() {
            env.split_screen = Some(enabled);
        } else if let Ok(enabled) = value.parse::<u8>() {
            // Also support numeric values (0/1)
            env.split_screen = Some(enabled != 0);
        }
    }

    if let Ok(value) = std::env::var("CHARGER_SPLIT_OFFSET") {
        if let Ok(offset) = value.parse() {
            env.split_offset = Some(offset);
        }
    }

    if let Ok(value) = std::env::var("CHARGER_SYS_FONT") {
        env.sys_font = Some(PathBuf::from(value));
    }

    if let Ok(value) = std::env::var("CHARGER_ANIMATION") {
        env.animation = Some(PathBuf::from(value));
    }

    if let Ok(value) = std::env::var("CHARGER_UNKNOWN_IMAGE") {
        env.unknown_image = Some(PathBuf::from(value));
    }

    if let Ok(value) = std::env::var("CHARGER_POWER_SUPPLY") {
        env.power_supply = Some(value);
    }

    if let Ok(value) = std::env::var("CHARGER_INTERVAL_MS") {
        if let Ok(interval) = value.parse() {
            env.interval_ms = Some(interval);
        }
    }

    env
}
