use crate::error::{FieldError, Result};
use clap::Parser;

pub const DEFAULT_SURFACE_ID: &str = "bg-3d";
pub const DEFAULT_PARTICLE_COUNT: usize = 1500;
pub const DEFAULT_SPREAD: f32 = 60.0;
pub const DEFAULT_POINT_SIZE: f32 = 0.03;
pub const DEFAULT_OPACITY: f32 = 0.6;
/// Neon cyan accent.
pub const DEFAULT_COLOR: u32 = 0x00f3ff;
pub const DEFAULT_DRIFT_SPEED: f32 = 0.05;
pub const DEFAULT_POINTER_INFLUENCE: f32 = 0.2;
pub const DEFAULT_MAX_PIXEL_RATIO: f64 = 2.0;
pub const DEFAULT_STATS_INTERVAL: u64 = 600;

/// `particle-field` - a decorative, pointer-reactive particle background.
///
/// Every option can also be supplied through the environment so the same
/// binary can be embedded in different pages without changing its arguments.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Element id of the drawable surface the field renders into.
    #[arg(long, env = "PARTICLE_SURFACE_ID", default_value = DEFAULT_SURFACE_ID)]
    pub surface_id: String,

    /// Number of points in the cloud. Fixed for the lifetime of the field.
    #[arg(long, env = "PARTICLE_COUNT", default_value_t = DEFAULT_PARTICLE_COUNT)]
    pub particles: usize,

    /// Edge length of the cube, centred on the origin, that points are sampled from.
    #[arg(long, env = "PARTICLE_SPREAD", default_value_t = DEFAULT_SPREAD)]
    pub spread: f32,

    /// Sprite size in world units.
    #[arg(long, env = "PARTICLE_POINT_SIZE", default_value_t = DEFAULT_POINT_SIZE)]
    pub point_size: f32,

    /// Sprite opacity in [0, 1].
    #[arg(long, env = "PARTICLE_OPACITY", default_value_t = DEFAULT_OPACITY)]
    pub opacity: f32,

    /// Sprite color as a hex sRGB triplet, e.g. `00f3ff` or `#00f3ff`.
    #[arg(long, env = "PARTICLE_COLOR", default_value = "00f3ff", value_parser = parse_hex_color)]
    pub color: u32,

    /// Autonomous yaw drift in radians per second.
    #[arg(long, env = "PARTICLE_DRIFT_SPEED", default_value_t = DEFAULT_DRIFT_SPEED)]
    pub drift_speed: f32,

    /// Radians of rotation per unit of normalized pointer offset.
    #[arg(long, env = "PARTICLE_POINTER_INFLUENCE", default_value_t = DEFAULT_POINTER_INFLUENCE)]
    pub pointer_influence: f32,

    /// Upper bound applied to the device pixel ratio.
    #[arg(long, env = "PARTICLE_MAX_PIXEL_RATIO", default_value_t = DEFAULT_MAX_PIXEL_RATIO)]
    pub max_pixel_ratio: f64,

    /// Stop after this many frames instead of running until the window closes.
    #[arg(long, env = "PARTICLE_FRAMES")]
    pub frames: Option<u64>,

    /// Seed for the point cloud generator; random when omitted.
    #[arg(long, env = "PARTICLE_SEED")]
    pub seed: Option<u64>,

    /// Frames between debug-level frame statistics. 0 disables them.
    #[arg(long, env = "PARTICLE_STATS_INTERVAL", default_value_t = DEFAULT_STATS_INTERVAL)]
    pub stats_interval: u64,

    /// Initial logical window width.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial logical window height.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            surface_id: DEFAULT_SURFACE_ID.to_string(),
            particles: DEFAULT_PARTICLE_COUNT,
            spread: DEFAULT_SPREAD,
            point_size: DEFAULT_POINT_SIZE,
            opacity: DEFAULT_OPACITY,
            color: DEFAULT_COLOR,
            drift_speed: DEFAULT_DRIFT_SPEED,
            pointer_influence: DEFAULT_POINTER_INFLUENCE,
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
            frames: None,
            seed: None,
            stats_interval: DEFAULT_STATS_INTERVAL,
            width: 1280,
            height: 720,
        }
    }
}

impl Config {
    /// Rejects values that would produce an empty or degenerate field.
    pub fn validate(&self) -> Result<()> {
        if self.surface_id.trim().is_empty() {
            return Err(FieldError::Config("surface id must not be empty".into()));
        }
        if self.particles == 0 {
            return Err(FieldError::Config("particle count must be at least 1".into()));
        }
        if !(self.spread.is_finite() && self.spread > 0.0) {
            return Err(FieldError::Config(format!(
                "spread must be positive, got {}",
                self.spread
            )));
        }
        if !(self.point_size.is_finite() && self.point_size > 0.0) {
            return Err(FieldError::Config(format!(
                "point size must be positive, got {}",
                self.point_size
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(FieldError::Config(format!(
                "opacity must lie in [0, 1], got {}",
                self.opacity
            )));
        }
        if !(self.max_pixel_ratio.is_finite() && self.max_pixel_ratio >= 1.0) {
            return Err(FieldError::Config(format!(
                "max pixel ratio must be >= 1, got {}",
                self.max_pixel_ratio
            )));
        }
        Ok(())
    }
}

/// Parses `rrggbb`, `#rrggbb` or `0xrrggbb`.
pub fn parse_hex_color(s: &str) -> Result<u32, String> {
    let digits = s
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    if digits.len() != 6 {
        return Err(format!("expected 6 hex digits, got '{s}'"));
    }
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex color '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let parsed = Config::try_parse_from(["particle-field"]).unwrap();
        assert_eq!(parsed, Config::default());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("00f3ff"), Ok(0x00f3ff));
        assert_eq!(parse_hex_color("#FF0080"), Ok(0xff0080));
        assert_eq!(parse_hex_color("0x123456"), Ok(0x123456));
        assert!(parse_hex_color("fff").is_err());
        assert!(parse_hex_color("zzzzzz").is_err());
    }

    #[test]
    fn rejects_degenerate_values() {
        let cfg = Config { particles: 0, ..Config::default() };
        assert!(matches!(cfg.validate(), Err(FieldError::Config(_))));

        let cfg = Config { opacity: 1.5, ..Config::default() };
        assert!(cfg.validate().is_err());

        let cfg = Config { spread: -1.0, ..Config::default() };
        assert!(cfg.validate().is_err());

        let cfg = Config { max_pixel_ratio: 0.5, ..Config::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bounded_run_from_command_line() {
        let cfg = Config::try_parse_from([
            "particle-field",
            "--frames",
            "120",
            "--seed",
            "7",
            "--color",
            "#ffffff",
        ])
        .unwrap();
        assert_eq!(cfg.frames, Some(120));
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.color, 0xffffff);
    }
}
