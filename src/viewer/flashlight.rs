use crate::constants::flashlight::*;

/// Spotlight around the cursor; everything outside `radius` is darkened by `shadow`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flashlight {
    pub enabled: bool,
    /// Current darkness outside the spotlight, 0..=MAX_SHADOW
    pub shadow: f32,
    /// Spotlight radius in image pixels
    pub radius: f32,
    /// Pending radius impulse, drained by `update`
    pub delta_radius: f32,
}

impl Default for Flashlight {
    fn default() -> Self {
        Self {
            enabled: false,
            shadow: 0.0,
            radius: INITIAL_RADIUS,
            delta_radius: 0.0,
        }
    }
}

impl Flashlight {
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn shrink(&mut self) {
        self.delta_radius -= RADIUS_STEP;
    }

    pub fn grow(&mut self) {
        self.delta_radius += RADIUS_STEP;
    }

    pub fn update(&mut self, dt: f32) {
        if self.delta_radius.abs() > DELTA_RADIUS_THRESHOLD {
            self.radius = (self.radius + self.delta_radius * dt).max(0.0);
            self.delta_radius -= self.delta_radius * RADIUS_FRICTION * dt;
        }

        self.shadow = if self.enabled {
            (self.shadow + SHADOW_SPEED * dt).min(MAX_SHADOW)
        } else {
            (self.shadow - SHADOW_SPEED * dt).max(0.0)
        };
    }
}
