use crate::config::Config;
use crate::constants::camera::{DELTA_SCALE_THRESHOLD, VELOCITY_THRESHOLD};
use crate::types::Vec2;

/// View onto the screenshot: pan offset in image pixels plus zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    /// Pan momentum (image pixels/second)
    pub velocity: Vec2,
    /// Window point that stays fixed while zooming
    pub scale_pivot: Vec2,
    pub scale: f32,
    /// Pending zoom impulse, drained by `update`
    pub delta_scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            scale_pivot: Vec2::ZERO,
            scale: 1.0,
            delta_scale: 0.0,
        }
    }
}

impl Camera {
    /// Window-space vector to image space
    pub fn world(&self, v: Vec2) -> Vec2 {
        v / self.scale
    }

    pub fn zoom_in(&mut self, config: &Config, pivot: Vec2) {
        self.delta_scale += config.scroll_speed;
        self.scale_pivot = pivot;
    }

    pub fn zoom_out(&mut self, config: &Config, pivot: Vec2) {
        self.delta_scale -= config.scroll_speed;
        self.scale_pivot = pivot;
    }

    pub fn reset(&mut self) {
        *self = Self {
            scale_pivot: self.scale_pivot,
            ..Self::default()
        };
    }

    /// Follow a pointer drag from `prev` to `curr` (window pixels) so the
    /// grabbed image point stays under the pointer.
    /// The drag speed is kept as momentum for when the button is released.
    pub fn drag(&mut self, prev: Vec2, curr: Vec2, rate: f32) {
        let delta = self.world(prev) - self.world(curr);
        self.position += delta;
        self.velocity = delta * rate;
    }

    /// Advance zoom and momentum by one frame
    pub fn update(&mut self, config: &Config, dragging: bool, window_size: Vec2, dt: f32) {
        if self.delta_scale.abs() > DELTA_SCALE_THRESHOLD {
            let half_window = window_size * 0.5;
            let before = (self.scale_pivot - half_window) / self.scale;
            self.scale = (self.scale + self.delta_scale * dt).max(config.min_scale);
            let after = (self.scale_pivot - half_window) / self.scale;

            self.position += before - after;
            self.delta_scale -= self.delta_scale * dt * config.scale_friction;
        }

        if !dragging && self.velocity.length() > VELOCITY_THRESHOLD {
            let step = self.velocity * dt;
            self.position += step;
            self.velocity -= step * config.drag_friction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const WINDOW: Vec2 = Vec2::new(800.0, 600.0);

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_default_is_identity() {
        let camera = Camera::default();
        assert_eq!(camera.scale, 1.0);
        assert_eq!(camera.position, Vec2::ZERO);
        assert_eq!(camera.world(Vec2::new(10.0, 20.0)), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_world_divides_by_scale() {
        let camera = Camera { scale: 2.0, ..Camera::default() };
        assert_eq!(camera.world(Vec2::new(10.0, 20.0)), Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_zoom_accumulates_impulse_and_pivot() {
        let config = Config::default();
        let mut camera = Camera::default();

        camera.zoom_in(&config, Vec2::new(100.0, 50.0));
        camera.zoom_in(&config, Vec2::new(120.0, 60.0));
        assert_eq!(camera.delta_scale, 2.0 * config.scroll_speed);
        assert_eq!(camera.scale_pivot, Vec2::new(120.0, 60.0));

        camera.zoom_out(&config, Vec2::new(0.0, 0.0));
        assert_eq!(camera.delta_scale, config.scroll_speed);
    }

    #[test]
    fn test_zoom_in_grows_scale_and_decays() {
        let config = Config::default();
        let mut camera = Camera::default();
        camera.zoom_in(&config, WINDOW * 0.5);

        camera.update(&config, false, WINDOW, DT);
        assert!(approx(camera.scale, 1.0 + config.scroll_speed * DT));
        assert!(camera.delta_scale < config.scroll_speed);

        for _ in 0..600 {
            camera.update(&config, false, WINDOW, DT);
        }
        let settled = camera.scale;
        camera.update(&config, false, WINDOW, DT);
        assert_eq!(camera.scale, settled, "zoom stops once the impulse drops below threshold");
        assert!(camera.delta_scale.abs() <= DELTA_SCALE_THRESHOLD);
    }

    #[test]
    fn test_small_impulse_ignored() {
        let config = Config::default();
        let mut camera = Camera { delta_scale: 0.4, ..Camera::default() };
        camera.update(&config, false, WINDOW, DT);
        assert_eq!(camera.scale, 1.0);
        assert_eq!(camera.delta_scale, 0.4);
    }

    #[test]
    fn test_zoom_keeps_pivot_fixed() {
        let config = Config::default();
        let pivot = Vec2::new(700.0, 100.0);
        let mut camera = Camera::default();
        camera.zoom_in(&config, pivot);

        // Image point under the pivot: position + (pivot - center) / scale
        let image_point = |c: &Camera| c.position + (pivot - WINDOW * 0.5) / c.scale;
        let before = image_point(&camera);
        for _ in 0..10 {
            camera.update(&config, false, WINDOW, DT);
        }
        let after = image_point(&camera);

        assert!(camera.scale > 1.0);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
    }

    #[test]
    fn test_zoom_out_clamped_to_min_scale() {
        let config = Config { min_scale: 0.5, ..Config::default() };
        let mut camera = Camera { delta_scale: -1000.0, ..Camera::default() };
        camera.update(&config, false, WINDOW, DT);
        assert_eq!(camera.scale, 0.5);
    }

    #[test]
    fn test_reset() {
        let mut camera = Camera {
            position: Vec2::new(5.0, 5.0),
            velocity: Vec2::new(100.0, 0.0),
            scale_pivot: Vec2::new(1.0, 2.0),
            scale: 3.0,
            delta_scale: 2.0,
        };
        camera.reset();
        assert_eq!(camera.scale, 1.0);
        assert_eq!(camera.delta_scale, 0.0);
        assert_eq!(camera.position, Vec2::ZERO);
        assert_eq!(camera.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_drag_keeps_grabbed_point_under_pointer() {
        let mut camera = Camera { scale: 2.0, ..Camera::default() };
        let (prev, curr) = (Vec2::new(100.0, 100.0), Vec2::new(120.0, 90.0));
        let image_point = |c: &Camera, p: Vec2| c.position + (p - WINDOW * 0.5) / c.scale;
        let grabbed = image_point(&camera, prev);

        camera.drag(prev, curr, 60.0);

        // Pointer moved (+20, -10) on screen = (+10, -5) in image space
        assert_eq!(camera.position, Vec2::new(-10.0, 5.0));
        assert_eq!(image_point(&camera, curr), grabbed);
        assert_eq!(camera.velocity, Vec2::new(-600.0, 300.0));
    }

    #[test]
    fn test_momentum_continues_drag_direction() {
        let config = Config::default();
        let mut camera = Camera::default();
        camera.drag(Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0), 60.0);
        let after_drag = camera.position;

        camera.update(&config, false, WINDOW, DT);
        assert!(camera.position.x < after_drag.x);
    }

    #[test]
    fn test_momentum_decays_after_release() {
        let config = Config::default();
        let mut camera = Camera { velocity: Vec2::new(600.0, 0.0), ..Camera::default() };

        camera.update(&config, false, WINDOW, DT);
        assert!(approx(camera.position.x, 10.0));
        assert!(camera.velocity.x < 600.0);

        for _ in 0..600 {
            camera.update(&config, false, WINDOW, DT);
        }
        assert!(camera.velocity.length() <= VELOCITY_THRESHOLD);
        let resting = camera.position;
        camera.update(&config, false, WINDOW, DT);
        assert_eq!(camera.position, resting);
    }

    #[test]
    fn test_no_momentum_while_dragging() {
        let config = Config::default();
        let mut camera = Camera { velocity: Vec2::new(600.0, 0.0), ..Camera::default() };
        camera.update(&config, true, WINDOW, DT);
        assert_eq!(camera.position, Vec2::ZERO);
        assert_eq!(camera.velocity, Vec2::new(600.0, 0.0));
    }
}
