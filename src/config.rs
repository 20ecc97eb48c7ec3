//! Configuration parsing and management for GoldenEyes

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::demo::Screen;
use crate::error::{ConfigError, GoldenEyesError};
use crate::eyes::ScaleCurve;
use crate::tracking::TrackingOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub eyes: EyesConfig,
    pub camera: CameraConfig,
    pub audio: AudioConfig,
    pub app: AppConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GoldenEyesError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> Result<Self, GoldenEyesError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self, GoldenEyesError> {
        let paths = [
            PathBuf::from("goldeneyes.toml"),
            PathBuf::from("config/default.toml"),
            dirs_path().join("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GoldenEyesError> {
        if self.tracking.port == 0 {
            return Err(invalid("tracking.port", "Port must be greater than 0"));
        }

        if self.eyes.radius <= 0.0 {
            return Err(invalid("eyes.radius", "Radius must be greater than 0"));
        }

        if self.eyes.collision_half_extent <= 0.0 {
            return Err(invalid(
                "eyes.collision_half_extent",
                "Collision half-extent must be greater than 0",
            ));
        }

        for (field, curve) in [
            ("eyes.procedural_curve", &self.eyes.procedural_curve),
            ("eyes.scene_file_curve", &self.eyes.scene_file_curve),
        ] {
            if !(curve.base > 0.0 && curve.base.is_finite()) {
                return Err(invalid(field, "Base must be greater than 0"));
            }
            if !(curve.gain >= 0.0 && curve.gain.is_finite()) {
                return Err(invalid(field, "Gain must not be negative"));
            }
        }

        if self.camera.viewport_width <= 0.0 || self.camera.viewport_height <= 0.0 {
            return Err(invalid("camera.viewport", "Viewport size must be positive"));
        }

        if !(self.camera.vertical_fov_deg > 0.0 && self.camera.vertical_fov_deg < 180.0) {
            return Err(invalid(
                "camera.vertical_fov_deg",
                "Field of view must be between 0 and 180 degrees",
            ));
        }

        if self.audio.enabled {
            let path = self.audio.sounds_dir.join(&self.audio.tap_sound);
            if !path.exists() {
                tracing::warn!(
                    "Tap sound not found at {}, taps will be silent",
                    path.display()
                );
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> GoldenEyesError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}

/// Wire protocol spoken by the face tracker feeding us frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingProtocol {
    /// VMC over OSC (iFacialMocap, VSeeFace, ...)
    #[default]
    Vmc,
    /// JSON-over-UDP packets from a MediaPipe Face Landmarker helper
    MediaPipe,
}

/// Face tracking input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub protocol: TrackingProtocol,
    /// Listen address for the UDP socket
    pub listen_address: String,
    /// UDP port to receive tracking data on
    pub port: u16,
    /// Forget the cached head pose when a session starts
    pub reset_tracking: bool,
    /// Drop frames queued before a session starts
    pub remove_existing_anchors: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            protocol: TrackingProtocol::Vmc,
            listen_address: "0.0.0.0".to_string(),
            port: 39539,
            reset_tracking: true,
            remove_existing_anchors: true,
        }
    }
}

impl TrackingConfig {
    pub fn options(&self) -> TrackingOptions {
        TrackingOptions {
            reset_tracking: self.reset_tracking,
            remove_existing_anchors: self.remove_existing_anchors,
        }
    }
}

/// Eye marker geometry and animation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EyesConfig {
    /// Sphere radius in meters
    pub radius: f32,
    /// Half-extent of the cubic collision box in meters
    pub collision_half_extent: f32,
    /// Left eye offset from the head anchor
    pub left_offset: [f32; 3],
    /// Right eye offset from the head anchor
    pub right_offset: [f32; 3],
    /// Material base color (RGB, 0-1)
    pub color: [f32; 3],
    pub metallic: bool,
    /// jawOpen -> scale mapping for the procedural screen
    pub procedural_curve: ScaleCurve,
    /// jawOpen -> scale mapping for the scene-file screen
    pub scene_file_curve: ScaleCurve,
}

impl Default for EyesConfig {
    fn default() -> Self {
        Self {
            radius: 0.015,
            collision_half_extent: 0.03,
            left_offset: [0.03, 0.02, 0.05],
            right_offset: [-0.03, 0.02, 0.05],
            color: [1.0, 1.0, 0.0],
            metallic: true,
            procedural_curve: ScaleCurve::PROCEDURAL,
            scene_file_curve: ScaleCurve::SCENE_FILE,
        }
    }
}

/// Front camera model used to resolve taps to entities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Screen width in points
    pub viewport_width: f32,
    /// Screen height in points
    pub viewport_height: f32,
    /// Vertical field of view in degrees
    pub vertical_fov_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport_width: 390.0,
            viewport_height: 844.0,
            vertical_fov_deg: 60.0,
        }
    }
}

/// Tap sound configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Play a click when a marker is tapped
    pub enabled: bool,
    /// Directory holding sound resources
    pub sounds_dir: PathBuf,
    /// Resource name of the tap click
    pub tap_sound: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sounds_dir: PathBuf::from("assets/sounds"),
            tap_sound: "mixkit-classic-click.wav".to_string(),
        }
    }
}

/// Application-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Screen to open on startup instead of the menu
    pub start_screen: Option<Screen>,
}

/// Get the platform-specific configuration directory
fn dirs_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("goldeneyes");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/goldeneyes");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/goldeneyes");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("goldeneyes");
        }
    }

    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tracking.protocol, TrackingProtocol::Vmc);
        assert_eq!(TrackingProtocol::default(), TrackingProtocol::Vmc);
        assert_eq!(config.tracking.port, 39539);
        assert_eq!(config.eyes.radius, 0.015);
        assert_eq!(config.eyes.collision_half_extent, 0.03);
        assert_eq!(config.eyes.left_offset, [0.03, 0.02, 0.05]);
        assert_eq!(config.eyes.right_offset, [-0.03, 0.02, 0.05]);
        assert_eq!(config.audio.tap_sound, "mixkit-classic-click.wav");
        assert!(config.app.start_screen.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [tracking]
            protocol = "mediapipe"
            port = 12346
            reset_tracking = false

            [eyes.procedural_curve]
            base = 1.0
            gain = 2.0

            [app]
            start_screen = "pure_code"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.tracking.protocol, TrackingProtocol::MediaPipe);
        assert_eq!(config.tracking.port, 12346);
        assert!(!config.tracking.reset_tracking);
        assert!(config.tracking.remove_existing_anchors);
        assert_eq!(config.eyes.procedural_curve.gain, 2.0);
        assert_eq!(config.eyes.scene_file_curve, ScaleCurve::SCENE_FILE);
        assert_eq!(config.app.start_screen, Some(Screen::PureCode));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        config.camera.vertical_fov_deg = 180.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.eyes.radius = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.eyes.scene_file_curve.gain = -0.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tracking.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.eyes.procedural_curve.base = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.eyes.scene_file_curve.gain = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_default_matches_builtin() {
        let shipped = Config::from_str(include_str!("../config/default.toml")).unwrap();
        let builtin = Config::default();
        assert_eq!(shipped.tracking.port, builtin.tracking.port);
        assert_eq!(shipped.eyes.left_offset, builtin.eyes.left_offset);
        assert_eq!(shipped.eyes.procedural_curve, builtin.eyes.procedural_curve);
        assert_eq!(shipped.eyes.scene_file_curve, builtin.eyes.scene_file_curve);
        assert_eq!(shipped.audio.sounds_dir, builtin.audio.sounds_dir);
        assert!(shipped.validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_str("[tracking]\nport = \"nope\"").unwrap_err();
        assert!(matches!(
            err,
            GoldenEyesError::Config(ConfigError::Parse(_))
        ));
    }
}
