use tracing::{debug, info};

use crate::config::Config;
use crate::types::Vec2;

use super::camera::Camera;
use super::flashlight::Flashlight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `=` / `+`: zoom in
    Equals,
    /// `-`: zoom out
    Minus,
    /// `0`: reset the camera
    Zero,
    /// `f`: toggle the flashlight
    F,
    Q,
    Escape,
}

/// Window-system input, already translated to window pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved(Vec2),
    ButtonPressed(Button),
    ButtonReleased(Button),
    Scroll { direction: ScrollDirection, ctrl: bool },
    KeyPressed { key: Key, ctrl: bool },
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mouse {
    pub curr: Vec2,
    pub prev: Vec2,
    pub drag: bool,
}

/// Everything the frame loop mutates
#[derive(Debug)]
pub struct Scene {
    pub camera: Camera,
    pub mouse: Mouse,
    pub flashlight: Flashlight,
    pub quit: bool,
    /// Monitor refresh rate in Hz, the simulation steps at 1/rate
    pub rate: f32,
}

impl Scene {
    pub fn new(cursor: Vec2, rate: f32) -> Self {
        Self {
            camera: Camera::default(),
            mouse: Mouse { curr: cursor, prev: cursor, drag: false },
            flashlight: Flashlight::default(),
            quit: false,
            rate,
        }
    }

    pub fn dt(&self) -> f32 {
        1.0 / self.rate
    }

    pub fn update(&mut self, config: &Config, window_size: Vec2) {
        let dt = self.dt();
        self.camera.update(config, self.mouse.drag, window_size, dt);
        self.flashlight.update(dt);
    }

    fn zoom_in(&mut self, config: &Config, ctrl: bool) {
        if ctrl && self.flashlight.enabled {
            self.flashlight.shrink();
        } else {
            self.camera.zoom_in(config, self.mouse.curr);
        }
    }

    fn zoom_out(&mut self, config: &Config, ctrl: bool) {
        if ctrl && self.flashlight.enabled {
            self.flashlight.grow();
        } else {
            self.camera.zoom_out(config, self.mouse.curr);
        }
    }
}

pub fn handle_event(scene: &mut Scene, config: &Config, event: InputEvent) {
    match event {
        InputEvent::PointerMoved(pos) => {
            scene.mouse.curr = pos;
            if scene.mouse.drag {
                scene.camera.drag(scene.mouse.prev, scene.mouse.curr, scene.rate);
            }
            scene.mouse.prev = scene.mouse.curr;
        }
        InputEvent::ButtonPressed(Button::Left) => {
            scene.mouse.prev = scene.mouse.curr;
            scene.mouse.drag = true;
            scene.camera.velocity = Vec2::ZERO;
        }
        InputEvent::ButtonReleased(Button::Left) => {
            scene.mouse.drag = false;
        }
        InputEvent::ButtonPressed(_) | InputEvent::ButtonReleased(_) => (),
        InputEvent::Scroll { direction: ScrollDirection::Up, ctrl } => scene.zoom_in(config, ctrl),
        InputEvent::Scroll { direction: ScrollDirection::Down, ctrl } => scene.zoom_out(config, ctrl),
        InputEvent::KeyPressed { key, ctrl } => match key {
            Key::Equals => scene.zoom_in(config, ctrl),
            Key::Minus => scene.zoom_out(config, ctrl),
            Key::Zero => {
                debug!("Camera reset");
                scene.camera.reset();
            }
            Key::F => {
                scene.flashlight.toggle();
                debug!(enabled = scene.flashlight.enabled, "Flashlight toggled");
            }
            Key::Q | Key::Escape => {
                info!(key = ?key, "Quit requested");
                scene.quit = true;
            }
        },
        InputEvent::CloseRequested => {
            info!("Window close requested");
            scene.quit = true;
        }
    }
}
