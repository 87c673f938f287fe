use clap::Parser;
use std::path::PathBuf;

/// Freeze the screen and zoom into it
#[derive(Debug, Parser)]
#[command(name = "coomer", version, about)]
pub struct Cli {
    /// Delay execution of the program by <SECONDS>
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_delay)]
    pub delay: Option<f32>,

    /// Use config at <FILEPATH>
    #[arg(short, long, value_name = "FILEPATH")]
    pub config: Option<PathBuf>,

    /// Generate a new default config at [FILEPATH] (default config path when omitted) and exit
    #[arg(long, value_name = "FILEPATH", num_args = 0..=1)]
    pub new_config: Option<Option<PathBuf>>,

    /// Windowed mode instead of fullscreen
    #[arg(short, long)]
    pub windowed: bool,

    /// Select the window to capture with the mouse instead of the whole screen
    #[arg(short, long)]
    pub select: bool,

    /// Make the output more verbose
    #[arg(long)]
    pub verbose: bool,
}

fn parse_delay(raw: &str) -> Result<f32, String> {
    let seconds: f32 = raw
        .trim()
        .parse()
        .map_err(|e| format!("`{raw}` is not a number of seconds: {e}"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("delay must be a non-negative number of seconds, got {raw}"));
    }
    Ok(seconds)
}
