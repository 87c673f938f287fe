mod cli;
mod config;
mod constants;
mod screenshot;
mod types;
mod viewer;
mod x11_utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::{debug, info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use config::Config;
use viewer::{run_viewer, ViewerOptions};
use x11_utils::{capture_window, monitor_refresh_rate, pointer_position, select_window, X11Context};

fn log_level(verbose: bool) -> TraceLevel {
    let level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    };

    // More verbose levels compare greater
    if verbose { level.max(TraceLevel::DEBUG) } else { level }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;
    debug!(cli = ?cli, "Parsed command line");

    if let Some(target) = cli.new_config {
        let path = match target {
            Some(path) => path,
            None => Config::default_path()?,
        };
        Config::write_default(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if let Some(seconds) = cli.delay.filter(|s| *s > 0.0) {
        info!(seconds = seconds, "Delaying capture");
        std::thread::sleep(Duration::from_secs_f32(seconds));
    }

    let config = Config::load(&config_path)?;
    info!(config = ?config, "Loaded configuration");

    let ctx = X11Context::connect()?;
    let target = if cli.select { select_window(&ctx)? } else { ctx.root() };
    let screenshot = capture_window(&ctx, target)?;
    let options = ViewerOptions {
        windowed: cli.windowed,
        rate: monitor_refresh_rate(&ctx),
        cursor: pointer_position(&ctx)?,
        screen_size: (ctx.screen().width_in_pixels, ctx.screen().height_in_pixels),
    };
    drop(ctx);

    run_viewer(config, screenshot, options)
}
