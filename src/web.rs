#![cfg(not(tarpaulin_include))]

use clap::Parser;
use exercise_browser::app;
use exercise_browser::config::Config;

/// Main entry point for the exercise browser web server
///
/// Reads settings from a `.env` file, the environment and the command line
/// (in increasing order of precedence), loads any previously uploaded
/// spreadsheet and starts serving.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    app::run(config).await
}
