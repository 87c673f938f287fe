use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use eframe::egui_glow;
use eframe::glow;
use egui::mutex::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::{input, window};
use crate::screenshot::Screenshot;
use crate::types::Vec2;

use super::event_handler::{handle_event, Button, InputEvent, Key, Scene, ScrollDirection};
use super::renderer::{ScreenshotRenderer, Uniforms};

/// Turns egui input into viewer events
#[derive(Debug, Default)]
pub struct InputTranslator {
    /// Fractional wheel notches not yet turned into a scroll step
    pending_scroll: f32,
}

impl InputTranslator {
    pub fn translate(&mut self, event: &egui::Event, pixels_per_point: f32, out: &mut Vec<InputEvent>) {
        match event {
            egui::Event::PointerMoved(pos) => {
                out.push(InputEvent::PointerMoved(Vec2::new(pos.x, pos.y) * pixels_per_point));
            }
            egui::Event::PointerButton { button, pressed, .. } => {
                if let Some(button) = translate_button(*button) {
                    out.push(if *pressed {
                        InputEvent::ButtonPressed(button)
                    } else {
                        InputEvent::ButtonReleased(button)
                    });
                }
            }
            egui::Event::MouseWheel { unit, delta, modifiers, .. } => {
                let steps = self.scroll_steps(*unit, delta.y);
                let direction = if steps > 0 { ScrollDirection::Up } else { ScrollDirection::Down };
                for _ in 0..steps.unsigned_abs() {
                    out.push(InputEvent::Scroll { direction, ctrl: modifiers.ctrl });
                }
            }
            egui::Event::Key { key, pressed: true, modifiers, .. } => {
                if let Some(key) = translate_key(*key) {
                    out.push(InputEvent::KeyPressed { key, ctrl: modifiers.ctrl });
                }
            }
            _ => (),
        }
    }

    /// Whole wheel notches in `delta_y`; positive means scrolling up
    pub fn scroll_steps(&mut self, unit: egui::MouseWheelUnit, delta_y: f32) -> i32 {
        let notches = match unit {
            egui::MouseWheelUnit::Point => delta_y / input::SCROLL_POINTS_PER_STEP,
            egui::MouseWheelUnit::Line | egui::MouseWheelUnit::Page => delta_y,
        };
        self.pending_scroll += notches;
        let steps = self.pending_scroll.trunc();
        self.pending_scroll -= steps;
        steps as i32
    }
}

fn translate_button(button: egui::PointerButton) -> Option<Button> {
    match button {
        egui::PointerButton::Primary => Some(Button::Left),
        egui::PointerButton::Secondary => Some(Button::Right),
        egui::PointerButton::Middle => Some(Button::Middle),
        _ => None,
    }
}

fn translate_key(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::Equals | egui::Key::Plus => Some(Key::Equals),
        egui::Key::Minus => Some(Key::Minus),
        egui::Key::Num0 => Some(Key::Zero),
        egui::Key::F => Some(Key::F),
        egui::Key::Q => Some(Key::Q),
        egui::Key::Escape => Some(Key::Escape),
        _ => None,
    }
}

fn uniforms(scene: &Scene) -> Uniforms {
    Uniforms {
        camera_pos: scene.camera.position,
        camera_scale: scene.camera.scale,
        cursor_pos: scene.mouse.curr,
        fl_shadow: scene.flashlight.shadow,
        fl_radius: scene.flashlight.radius,
    }
}

pub struct ViewerApp {
    config: Config,
    scene: Scene,
    input: InputTranslator,
    renderer: Arc<Mutex<ScreenshotRenderer>>,
    terminate: Arc<AtomicBool>,
    closing: bool,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        screenshot: Screenshot,
        scene: Scene,
        terminate: Arc<AtomicBool>,
        fullscreen: bool,
    ) -> Result<Self> {
        let gl = cc
            .gl
            .as_ref()
            .context("Viewer needs the glow (OpenGL) backend")?;
        let renderer = ScreenshotRenderer::new(gl, &screenshot)
            .context("Failed to set up screenshot rendering")?;

        // Ctrl +/- belong to the flashlight, not to egui's UI zoom
        cc.egui_ctx.options_mut(|o| o.zoom_with_keyboard = false);
        if fullscreen {
            cc.egui_ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
        }
        info!(rate = scene.rate, "Viewer ready");

        Ok(Self {
            config,
            scene,
            input: InputTranslator::default(),
            renderer: Arc::new(Mutex::new(renderer)),
            terminate,
            closing: false,
        })
    }

    fn process_input(&mut self, ctx: &egui::Context) {
        let pixels_per_point = ctx.pixels_per_point();
        let (mut events, close_requested) = ctx.input(|i| {
            let mut events = Vec::with_capacity(i.events.len());
            for event in &i.events {
                self.input.translate(event, pixels_per_point, &mut events);
            }
            (events, i.viewport().close_requested())
        });
        if close_requested {
            events.push(InputEvent::CloseRequested);
        }

        for event in events {
            handle_event(&mut self.scene, &self.config, event);
        }

        if self.terminate.load(Ordering::Relaxed) && !self.scene.quit {
            info!("Termination signal received");
            self.scene.quit = true;
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_input(ctx);

        if self.scene.quit {
            if !self.closing {
                debug!("Closing viewer window");
                self.closing = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            return;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let pixels_per_point = ctx.pixels_per_point();
                let window_size = Vec2::new(rect.width(), rect.height()) * pixels_per_point;
                self.scene.update(&self.config, window_size);

                let uniforms = uniforms(&self.scene);
                let renderer = self.renderer.clone();
                let callback = egui::PaintCallback {
                    rect,
                    callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                        let viewport = info.viewport_in_pixels();
                        let size = Vec2::new(viewport.width_px as f32, viewport.height_px as f32);
                        renderer.lock().paint(painter.gl(), &uniforms, size);
                    })),
                };
                ui.painter().add(callback);
            });

        ctx.request_repaint();
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        let [r, g, b] = window::CLEAR_COLOR;
        [r, g, b, 1.0]
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.renderer.lock().destroy(gl);
        }
        info!("Viewer exiting");
    }
}
