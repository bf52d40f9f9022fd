mod config;
mod display;
mod models;
mod power;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;
use colored::*;
use env_logger::Builder;
use log::{debug, error, info, warn, LevelFilter};
use std::io::Write;

use crate::config::init_config;
use crate::display::renderer::ChargerRenderer;
use crate::display::surface::Surface;
use crate::models::animation::Animation;
use crate::power::PowerSupply;

// Global shutdown flag
static SHUTDOWN_FLAG: AtomicBool = AtomicBool::new(false);

fn main() {
    // Initialize the logger with a custom format that includes timestamps and colors
    Builder::new()
        .format(|buf, record| {
            // Color based on log level
            let level = match record.level() {
                log::Level::Error => record.level().to_string().red().bold(),
                log::Level::Warn => record.level().to_string().yellow().bold(),
                log::Level::Info => record.level().to_string().green(),
                log::Level::Debug => record.level().to_string().blue(),
                log::Level::Trace => record.level().to_string().purple(),
            };

            // Apply appropriate colors to the message based on level
            let message = match record.level() {
                log::Level::Error => record.args().to_string().red(),
                log::Level::Warn => record.args().to_string().yellow(),
                log::Level::Info => record.args().to_string().normal(),
                log::Level::Debug => record.args().to_string().blue(),
                log::Level::Trace => record.args().to_string().purple(),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                message
            )
        })
        .filter(None, LevelFilter::Info) // Set default log level to Info
        .parse_env("RUST_LOG") // Allow overriding with RUST_LOG environment variable
        .init();

    info!("Starting charger splash renderer");

    if !nix::unistd::Uid::effective().is_root() {
        warn!("Not running as root; opening the framebuffer device may fail");
    }

    // Initialize configuration
    let charger_config = init_config();

    // Validate configuration
    if let Err(errors) = charger_config.validate() {
        for error in errors {
            error!("{}", error);
        }
        std::process::exit(1);
    }

    let mut animation = match &charger_config.animation {
        Some(path) => match Animation::load(path) {
            Ok(animation) => {
                info!("Loaded animation description from {}", path.display());
                animation
            }
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            info!("No animation file given, using built-in layout");
            Animation::default_layout()
        }
    };

    let surf_unknown = charger_config.unknown_image.as_ref().and_then(|path| {
        match Surface::from_file(path) {
            Ok(surface) => Some(surface),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    });

    let power_supply = PowerSupply::discover(charger_config.power_supply.as_deref());
    if power_supply.is_none() {
        warn!("No battery power supply found; rendering the unknown state");
    }

    info!(
        "Initializing framebuffer renderer on {}",
        charger_config.fb_device.display()
    );
    let mut renderer = match ChargerRenderer::create(&charger_config, &mut animation) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("Failed to initialize the graphics backend: {}", e);
            std::process::exit(1);
        }
    };

    // Foldables drive the cover panel portrait-mounted
    if renderer.has_multiple_connectors() {
        debug!("Secondary display connector detected, rotating the primary panel");
        renderer.rotate_screen(0);
    }

    // Set up signal handler for clean shutdown
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received termination signal, shutting down...");
        SHUTDOWN_FLAG.store(true, Ordering::SeqCst);
    }) {
        error!("Error setting Ctrl-C handler: {}", e);
    }

    // Make sure the panel is on before the first frame
    renderer.blank_screen(false, 0);

    let interval = Duration::from_millis(charger_config.interval_ms);
    while !SHUTDOWN_FLAG.load(Ordering::SeqCst) {
        if let Some(supply) = &power_supply {
            let reading = supply.read();
            animation.cur_status = reading.status;
            animation.cur_level = reading.level;
            animation.cur_temp_deci = reading.temp_deci;
        }

        renderer.redraw(&animation, surf_unknown.as_ref());

        if charger_config.once {
            break;
        }
        std::thread::sleep(interval);
    }

    info!("Exiting, blanking the screen");
    renderer.blank_screen(true, 0);
}
