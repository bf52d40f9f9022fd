//! Configuration module that handles all application settings

mod charger;
mod cli;
mod env;

pub use charger::ChargerConfig;
pub use cli::CliArgs;
pub use env::{load_env_vars, EnvVars};

/// Initialize configuration from all sources (CLI, environment, etc.)
pub fn init_config() -> ChargerConfig {
    // Parse CLI args first
    let cli_args = CliArgs::parse();

    // Load environment variables
    let env_vars = load_env_vars();

    // Create ChargerConfig by combining CLI args and environment variables
    ChargerConfig::new(cli_args, env_vars)
}
