//! Application-wide constants
//!
//! Tuning values for the camera and flashlight simulation, X11 plumbing
//! numbers and config file locations live here.

/// Config file location and defaults
pub mod config {
    /// Directory under the XDG config dir
    pub const APP_DIR: &str = "coomer";

    /// Config file name inside `APP_DIR`
    pub const FILENAME: &str = "config.cfg";

    pub const DEFAULT_MIN_SCALE: f32 = 0.01;
    pub const DEFAULT_SCROLL_SPEED: f32 = 1.5;
    pub const DEFAULT_DRAG_FRICTION: f32 = 6.0;
    pub const DEFAULT_SCALE_FRICTION: f32 = 4.0;
}

/// Camera simulation constants
pub mod camera {
    /// Pan momentum below this speed (pixels/second) is dropped
    pub const VELOCITY_THRESHOLD: f32 = 10.0;

    /// Pending zoom below this magnitude is ignored
    pub const DELTA_SCALE_THRESHOLD: f32 = 0.5;
}

/// Flashlight overlay constants
pub mod flashlight {
    pub const INITIAL_RADIUS: f32 = 200.0;

    /// Radius impulse applied per Ctrl+scroll step
    pub const RADIUS_STEP: f32 = 250.0;

    /// Radius impulses below this magnitude are ignored
    pub const DELTA_RADIUS_THRESHOLD: f32 = 1.0;

    /// Decay rate of the radius impulse (1/second)
    pub const RADIUS_FRICTION: f32 = 10.0;

    /// Shadow fade speed (alpha/second)
    pub const SHADOW_SPEED: f32 = 6.0;

    /// Darkest shadow outside the spotlight
    pub const MAX_SHADOW: f32 = 0.8;
}

/// Viewer window constants
pub mod window {
    pub const WM_NAME: &str = "coomer";
    pub const WM_CLASS: &str = "Coomer";

    /// Background behind the screenshot quad (RGB)
    pub const CLEAR_COLOR: [f32; 3] = [0.1, 0.1, 0.1];

    /// Used when RandR reports no usable refresh rate
    pub const FALLBACK_REFRESH_RATE: u16 = 60;
}

/// X11 protocol constants
pub mod x11 {
    /// Core cursor font
    pub const CURSOR_FONT: &[u8] = b"cursor";

    /// `XC_crosshair` glyph in the cursor font
    pub const CROSSHAIR_GLYPH: u16 = 34;

    /// All planes for GetImage
    pub const ALL_PLANES: u32 = !0;
}


/// Input translation constants
pub mod input {
    /// Smooth (touchpad) scrolling distance in points that counts as one wheel notch
    pub const SCROLL_POINTS_PER_STEP: f32 = 50.0;
}
