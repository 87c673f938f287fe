//! Fullscreen viewer - shows the frozen screenshot and lets the user pan and zoom it

mod app;
mod camera;
mod event_handler;
mod flashlight;
mod renderer;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{anyhow, Result};
use eframe::NativeOptions;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::window;
use crate::screenshot::Screenshot;
use crate::types::Vec2;

use app::ViewerApp;
use event_handler::Scene;

pub struct ViewerOptions {
    pub windowed: bool,
    /// Monitor refresh rate in Hz
    pub rate: u16,
    /// Pointer position when the viewer opens
    pub cursor: Vec2,
    /// Root window size, used as the windowed-mode size
    pub screen_size: (u16, u16),
}

/// Register SIGINT/SIGTERM so the frame loop can shut down cleanly
fn termination_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&flag)) {
            warn!(signal = signal, error = %e, "Failed to register signal handler");
        }
    }
    flag
}

/// Window setup. Without `--windowed` the viewer covers the whole root window
/// (every monitor) from (0, 0), so root coordinates are window coordinates.
fn viewport(options: &ViewerOptions) -> egui::ViewportBuilder {
    let (width, height) = options.screen_size;
    let builder = egui::ViewportBuilder::default()
        .with_title(window::WM_NAME)
        .with_app_id(window::WM_CLASS)
        .with_inner_size([f32::from(width), f32::from(height)]);

    if options.windowed {
        builder.with_decorations(true)
    } else {
        builder
            .with_position([0.0, 0.0])
            .with_decorations(false)
            .with_resizable(false)
            .with_window_level(egui::WindowLevel::AlwaysOnTop)
    }
}

pub fn run_viewer(config: Config, screenshot: Screenshot, options: ViewerOptions) -> Result<()> {
    let (width, height) = options.screen_size;
    let fullscreen = !options.windowed;

    let native_options = NativeOptions {
        viewport: viewport(&options),
        renderer: eframe::Renderer::Glow,
        vsync: true,
        ..Default::default()
    };

    let scene = Scene::new(options.cursor, f32::from(options.rate));
    let terminate = termination_flag();
    info!(fullscreen = fullscreen, width = width, height = height, "Opening viewer window");

    eframe::run_native(
        window::WM_NAME,
        native_options,
        Box::new(move |cc| {
            let app = ViewerApp::new(cc, config, screenshot, scene, terminate, fullscreen)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|err| anyhow!("Failed to run viewer window: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(windowed: bool) -> ViewerOptions {
        ViewerOptions {
            windowed,
            rate: 60,
            cursor: Vec2::new(2500.0, 400.0),
            screen_size: (3840, 1080),
        }
    }

    #[test]
    fn test_cover_mode_spans_root_window() {
        let viewport = viewport(&options(false));
        assert_eq!(viewport.position, Some(egui::pos2(0.0, 0.0)));
        assert_eq!(viewport.inner_size, Some(egui::vec2(3840.0, 1080.0)));
        assert_eq!(viewport.decorations, Some(false));
        assert_eq!(viewport.window_level, Some(egui::WindowLevel::AlwaysOnTop));
        assert_eq!(viewport.fullscreen, None);
    }

    #[test]
    fn test_windowed_mode_is_decorated() {
        let viewport = viewport(&options(true));
        assert_eq!(viewport.decorations, Some(true));
        assert_eq!(viewport.position, None);
        assert_eq!(viewport.window_level, None);
    }
}
