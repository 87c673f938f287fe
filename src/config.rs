//! Viewer tuning loaded from `~/.config/coomer/config.cfg`
//!
//! The file is a flat list of `key = value` lines with `#` comments. Each
//! line is picked up on its own: a bad value or an unknown key is logged and
//! skipped instead of rejecting the whole file.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, value};
use tracing::{debug, error, info, warn};

use crate::constants::config::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Lower bound for the camera scale
    pub min_scale: f32,
    /// Zoom impulse added per scroll step
    pub scroll_speed: f32,
    /// Decay rate of pan momentum
    pub drag_friction: f32,
    /// Decay rate of pending zoom
    pub scale_friction: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            scroll_speed: DEFAULT_SCROLL_SPEED,
            drag_friction: DEFAULT_DRAG_FRICTION,
            scale_friction: DEFAULT_SCALE_FRICTION,
        }
    }
}

/// Key names and the comment written above each in a generated config
const KEY_DOCS: [(&str, &str); 4] = [
    ("min_scale", "Smallest zoom factor allowed when zooming out"),
    ("scroll_speed", "Zoom impulse added per scroll step or +/- key press"),
    ("drag_friction", "How quickly panning momentum dies out after a drag"),
    ("scale_friction", "How quickly a zoom impulse settles"),
];

impl Config {
    /// `<config dir>/coomer/config.cfg`, creating the directory when missing
    pub fn default_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .context("Could not determine the user config directory (is HOME set?)")?;
        path.push(APP_DIR);
        fs::create_dir_all(&path)
            .context(format!("Failed to create config directory: {}", path.display()))?;
        path.push(FILENAME);
        debug!(path = %path.display(), "Resolved default config path");
        Ok(path)
    }

    /// Load the config at `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => {
                info!(path = %path.display(), "Loading config");
                Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => {
                Err(e).context(format!("Failed to read config file {}", path.display()))
            }
        }
    }

    /// Read `key = value` lines. Lines without `=` are skipped, a repeated
    /// key keeps the last value.
    pub fn parse(contents: &str) -> Self {
        let mut config = Self::default();
        for (line_no, line) in contents.lines().enumerate() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, raw)) = line.split_once('=') else {
                debug!(line = line_no + 1, "Skipping config line without `=`");
                continue;
            };
            let (key, raw) = (key.trim(), raw.trim());
            debug!(key = %key, value = %raw, "Got config entry");

            let (slot, default) = match key {
                "min_scale" => (&mut config.min_scale, DEFAULT_MIN_SCALE),
                "scroll_speed" => (&mut config.scroll_speed, DEFAULT_SCROLL_SPEED),
                "drag_friction" => (&mut config.drag_friction, DEFAULT_DRAG_FRICTION),
                "scale_friction" => (&mut config.scale_friction, DEFAULT_SCALE_FRICTION),
                _ => {
                    error!(key = %key, line = line_no + 1, "Unknown config key, ignoring");
                    continue;
                }
            };
            *slot = parse_number(raw).unwrap_or_else(|| {
                error!(key = %key, value = %raw, "Config value is not a finite number, using default");
                default
            });
        }

        config.validate_and_clamp();
        config
    }

    /// Replace values the simulation can't work with
    fn validate_and_clamp(&mut self) {
        if self.min_scale <= 0.0 {
            warn!(min_scale = self.min_scale, using = DEFAULT_MIN_SCALE, "min_scale must be positive, using default");
            self.min_scale = DEFAULT_MIN_SCALE;
        }

        if self.scroll_speed <= 0.0 {
            warn!(scroll_speed = self.scroll_speed, using = DEFAULT_SCROLL_SPEED, "scroll_speed must be positive, using default");
            self.scroll_speed = DEFAULT_SCROLL_SPEED;
        }

        if self.drag_friction < 0.0 {
            warn!(drag_friction = self.drag_friction, "drag_friction is negative, clamping to 0");
            self.drag_friction = 0.0;
        }

        if self.scale_friction < 0.0 {
            warn!(scale_friction = self.scale_friction, "scale_friction is negative, clamping to 0");
            self.scale_friction = 0.0;
        }
    }

    /// Render this config as a commented `key = value` document
    pub fn to_document(&self) -> String {
        let mut doc = DocumentMut::new();
        let values = [
            self.min_scale,
            self.scroll_speed,
            self.drag_friction,
            self.scale_friction,
        ];

        for ((key, comment), number) in KEY_DOCS.iter().zip(values) {
            doc[*key] = value(round_for_display(number));
            if let Some(mut entry) = doc.as_table_mut().key_mut(key) {
                entry.leaf_decor_mut().set_prefix(format!("# {comment}\n"));
            }
        }

        doc.to_string()
    }

    /// Write the default config to `path`, creating parent directories
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {}", parent.display()))?;
        }
        fs::write(path, Self::default().to_document())
            .context(format!("Failed to write config file to {}", path.display()))?;
        info!(path = %path.display(), "Wrote default config");
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(before, _)| before)
}

/// TOML number syntax (`1_000`, `8`, `+1.5e2`), falling back to plain float
/// syntax for forms TOML rejects such as `.5`
fn parse_number(raw: &str) -> Option<f32> {
    let number = match raw.parse::<toml_edit::Value>() {
        Ok(toml_edit::Value::Float(f)) => *f.value() as f32,
        Ok(toml_edit::Value::Integer(i)) => *i.value() as f32,
        _ => raw.parse::<f32>().ok()?,
    };
    number.is_finite().then_some(number)
}

/// f32 -> f64 widening shows float noise (0.01 -> 0.009999999776...)
fn round_for_display(number: f32) -> f64 {
    (f64::from(number) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("coomer-test-{}-{name}", std::process::id()))
            .join(FILENAME)
    }

    #[test]
    fn test_parse_all_keys() {
        let config = Config::parse(
            "min_scale = 0.5\nscroll_speed = 2.0\ndrag_friction = 3.0\nscale_friction = 1.25\n",
        );

        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.scroll_speed, 2.0);
        assert_eq!(config.drag_friction, 3.0);
        assert_eq!(config.scale_friction, 1.25);
    }

    #[test]
    fn test_parse_empty_gives_defaults() {
        assert_eq!(Config::parse(""), Config::default());
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let config = Config::parse(
            "# zoom settings\n\n   scroll_speed = 3.0   # faster\n\n# min_scale = 9\n",
        );

        assert_eq!(config.scroll_speed, 3.0);
        assert_eq!(config.min_scale, DEFAULT_MIN_SCALE);
    }

    #[test]
    fn test_parse_accepts_integers() {
        let config = Config::parse("drag_friction = 8");
        assert_eq!(config.drag_friction, 8.0);
    }

    #[test]
    fn test_parse_unknown_key_ignored() {
        let config = Config::parse("zoom_level = 4.0\nscroll_speed = 2.5");
        assert_eq!(config.scroll_speed, 2.5);
        assert_eq!(config.min_scale, DEFAULT_MIN_SCALE);
    }

    #[test]
    fn test_parse_invalid_value_keeps_default() {
        let config = Config::parse("scroll_speed = \"fast\"\ndrag_friction = 2.0");
        assert_eq!(config.scroll_speed, DEFAULT_SCROLL_SPEED);
        assert_eq!(config.drag_friction, 2.0);
    }

    #[test]
    fn test_parse_non_finite_value_keeps_default() {
        let config = Config::parse("scale_friction = nan\nmin_scale = inf");
        assert_eq!(config.scale_friction, DEFAULT_SCALE_FRICTION);
        assert_eq!(config.min_scale, DEFAULT_MIN_SCALE);
    }

    #[test]
    fn test_parse_skips_lines_without_equals() {
        let config = Config::parse("min_scale 0.5\n= 3\n[section]\nscroll_speed = 2.0");
        assert_eq!(config.min_scale, DEFAULT_MIN_SCALE);
        assert_eq!(config.scroll_speed, 2.0);
    }

    #[test]
    fn test_parse_unquoted_word_keeps_default() {
        let config = Config::parse("scroll_speed = fast\ndrag_friction = 2.0");
        assert_eq!(config.scroll_speed, DEFAULT_SCROLL_SPEED);
        assert_eq!(config.drag_friction, 2.0);
    }

    #[test]
    fn test_parse_leading_dot_float() {
        let config = Config::parse("min_scale = .5\nscale_friction = 1_000");
        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.scale_friction, 1000.0);
    }

    #[test]
    fn test_parse_repeated_key_takes_last_value() {
        let config = Config::parse("scroll_speed = 2.0\nscroll_speed = 3.0");
        assert_eq!(config.scroll_speed, 3.0);
    }

    #[test]
    fn test_parse_bad_repeat_resets_to_default() {
        let config = Config::parse("scroll_speed = 2.0\nscroll_speed = oops");
        assert_eq!(config.scroll_speed, DEFAULT_SCROLL_SPEED);
    }

    #[test]
    fn test_parse_trims_around_equals() {
        let config = Config::parse("  drag_friction=7.5  \r\nscale_friction   =   2\r\n");
        assert_eq!(config.drag_friction, 7.5);
        assert_eq!(config.scale_friction, 2.0);
    }

    #[test]
    fn test_validate_and_clamp() {
        let config = Config::parse(
            "min_scale = 0\nscroll_speed = -1\ndrag_friction = -2\nscale_friction = -0.5",
        );

        assert_eq!(config.min_scale, DEFAULT_MIN_SCALE);
        assert_eq!(config.scroll_speed, DEFAULT_SCROLL_SPEED);
        assert_eq!(config.drag_friction, 0.0);
        assert_eq!(config.scale_friction, 0.0);
    }

    #[test]
    fn test_document_has_every_key_with_comment() {
        let doc = Config::default().to_document();

        for (key, comment) in KEY_DOCS {
            assert!(doc.contains(&format!("# {comment}\n{key} = ")), "missing {key} in:\n{doc}");
        }
        assert!(doc.contains("min_scale = 0.01\n"));
        assert!(doc.contains("scroll_speed = 1.5\n"));
    }

    #[test]
    fn test_document_parses_back_to_same_config() {
        let config = Config {
            min_scale: 0.25,
            scroll_speed: 2.0,
            drag_friction: 5.5,
            scale_friction: 3.0,
        };
        assert_eq!(Config::parse(&config.to_document()), config);
    }

    #[test]
    fn test_write_default_then_load() {
        let path = temp_path("write-default");
        Config::write_default(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, Config::default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = temp_path("does-not-exist");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
