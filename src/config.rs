use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::camera::CameraSettings;
use crate::graphics::{VideoInfo, DEFAULT_ASPECT};
use crate::logging::LogLevel;
use crate::propfile::parse_pairs;

/// Frontend options that can be set via CLI or config file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    // Driver selection
    pub video_driver: Option<String>,
    pub input_driver: Option<String>,
    pub camera_driver: Option<String>,

    // Camera
    pub camera_device: Option<String>,
    pub camera_width: Option<u32>,
    pub camera_height: Option<u32>,
    pub camera_allow: Option<bool>,
    pub camera_request: Option<bool>,

    // Video
    pub resolution: Option<Resolution>,
    pub fullscreen: Option<bool>,
    pub vsync: Option<bool>,
    pub smooth: Option<bool>,
    pub force_aspect: Option<bool>,
    pub aspect_ratio: Option<f32>,

    // Launcher and logging
    pub max_frames: Option<u64>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Options {
    /// Video creation parameters, defaults filled in.
    pub fn video_info(&self) -> VideoInfo {
        let defaults = VideoInfo::default();
        let resolution = self.resolution.unwrap_or(Resolution {
            width: defaults.width,
            height: defaults.height,
        });

        VideoInfo {
            width: resolution.width,
            height: resolution.height,
            fullscreen: self.fullscreen.unwrap_or(defaults.fullscreen),
            vsync: self.vsync.unwrap_or(defaults.vsync),
            force_aspect: self.force_aspect.unwrap_or(defaults.force_aspect),
            smooth: self.smooth.unwrap_or(defaults.smooth),
            aspect_ratio: self.aspect_ratio.unwrap_or(DEFAULT_ASPECT),
            ..defaults
        }
    }

    /// Camera settings, defaults filled in.
    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            driver: self.camera_driver.clone().unwrap_or_default(),
            device: self.camera_device.clone().unwrap_or_default(),
            width: self.camera_width.unwrap_or(0),
            height: self.camera_height.unwrap_or(0),
            allow: self.camera_allow.unwrap_or(false),
        }
    }

    /// Apply one config file entry.
    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let text = || Some(value.to_string());
        match key.to_ascii_lowercase().as_str() {
            "video_driver" => self.video_driver = text(),
            "input_driver" => self.input_driver = text(),
            "camera_driver" => self.camera_driver = text(),
            "camera_device" => self.camera_device = text(),
            "camera_width" => self.camera_width = Some(parse_size(value)?),
            "camera_height" => self.camera_height = Some(parse_size(value)?),
            "camera_allow" => self.camera_allow = Some(parse_bool(value)?),
            "video_width" => {
                let width = parse_size(value)?;
                let height = self.resolution.map_or(0, |r| r.height);
                self.resolution = Some(Resolution { width, height });
            }
            "video_height" => {
                let height = parse_size(value)?;
                let width = self.resolution.map_or(0, |r| r.width);
                self.resolution = Some(Resolution { width, height });
            }
            "video_fullscreen" => self.fullscreen = Some(parse_bool(value)?),
            "video_vsync" => self.vsync = Some(parse_bool(value)?),
            "video_smooth" => self.smooth = Some(parse_bool(value)?),
            "video_force_aspect" => self.force_aspect = Some(parse_bool(value)?),
            "video_aspect_ratio" => self.aspect_ratio = Some(parse_aspect(value)?),
            "log_level" => self.log_level = Some(LogLevel::parse(value)?),
            "log_file" => self.log_file = text(),
            _ => warn!(key, "ignoring unknown config key"),
        }
        Ok(())
    }

    /// Fill a half-specified window size from the defaults.
    fn complete_resolution(&mut self) {
        if let Some(res) = self.resolution.as_mut() {
            let defaults = VideoInfo::default();
            if res.width == 0 {
                res.width = defaults.width;
            }
            if res.height == 0 {
                res.height = defaults.height;
            }
        }
    }
}

/// Load options from a config file.
///
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Options> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Options::default());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&data).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Parse config file content.
pub fn parse_config(data: &str) -> Result<Options> {
    let mut opts = Options::default();
    for (key, value) in parse_pairs(data) {
        opts.apply(&key, &value)
            .with_context(|| format!("Invalid value for {}: \"{}\"", key, value))?;
    }
    opts.complete_resolution();
    Ok(opts)
}

/// Parse a resolution string in the format "WIDTHxHEIGHT"
pub fn parse_resolution(s: &str) -> Result<Resolution> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        anyhow::bail!("Resolution must be in WIDTHxHEIGHT format");
    }

    let width: u32 = parts[0].trim().parse().context("Invalid width value")?;
    let height: u32 = parts[1].trim().parse().context("Invalid height value")?;

    if width == 0 || height == 0 {
        anyhow::bail!("Resolution values must be positive");
    }

    Ok(Resolution { width, height })
}

/// Parse a boolean: true/false, yes/no, on/off, 1/0
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Expected a boolean, got \"{}\"", s),
    }
}

/// Parse a size in pixels. 0 means "driver default".
pub fn parse_size(s: &str) -> Result<u32> {
    s.trim().parse().context("Invalid size value")
}

/// Parse an aspect ratio given as "W:H" or as a decimal number
pub fn parse_aspect(s: &str) -> Result<f32> {
    let ratio = match s.split_once(':') {
        Some((w, h)) => {
            let w: f32 = w.trim().parse().context("Invalid aspect width")?;
            let h: f32 = h.trim().parse().context("Invalid aspect height")?;
            if h == 0.0 {
                anyhow::bail!("Aspect height must not be zero");
            }
            w / h
        }
        None => s.trim().parse().context("Invalid aspect ratio")?,
    };

    if !ratio.is_finite() || ratio <= 0.0 {
        anyhow::bail!("Aspect ratio must be positive");
    }
    Ok(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_resolution_valid() {
        let res = parse_resolution("640x480").unwrap();
        assert_eq!(res.width, 640);
        assert_eq!(res.height, 480);
    }

    #[test]
    fn test_parse_resolution_invalid_format() {
        assert!(parse_resolution("640-480").is_err());
        assert!(parse_resolution("640x480x120").is_err());
    }

    #[test]
    fn test_parse_resolution_invalid_values() {
        assert!(parse_resolution("0x480").is_err());
        assert!(parse_resolution("640x0").is_err());
        assert!(parse_resolution("abcxdef").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("ON").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_parse_aspect() {
        assert!((parse_aspect("16:9").unwrap() - 16.0 / 9.0).abs() < 1e-6);
        assert!((parse_aspect("1.25").unwrap() - 1.25).abs() < 1e-6);
        assert!(parse_aspect("4:0").is_err());
        assert!(parse_aspect("-1").is_err());
        assert!(parse_aspect("wide").is_err());
    }

    #[test]
    fn test_options_default() {
        let opts = Options::default();
        assert!(opts.resolution.is_none());
        let info = opts.video_info();
        assert_eq!((info.width, info.height), (640, 480));
        assert!(info.vsync);
        assert!(!opts.camera_settings().allow);
    }

    #[test]
    fn test_parse_config_all_keys() {
        let opts = parse_config(
            r#"
# driver selection
video_driver = "null"
input_driver = "null"
camera_driver = "pattern"
camera_device = "/dev/video1"
camera_width = 320
camera_height = 240
camera_allow = true

video_width = 1024
video_height = 768
video_fullscreen = false
video_vsync = false
video_smooth = true
video_force_aspect = false
video_aspect_ratio = "16:10"
log_level = debug
log_file = "frontend.log"
"#,
        )
        .unwrap();

        assert_eq!(opts.video_driver.as_deref(), Some("null"));
        assert_eq!(opts.resolution, Some(Resolution { width: 1024, height: 768 }));
        assert_eq!(opts.log_level, Some(LogLevel::Debug));

        let info = opts.video_info();
        assert!(!info.vsync);
        assert!(info.smooth);
        assert!(!info.force_aspect);
        assert!((info.aspect_ratio - 1.6).abs() < 1e-6);

        let camera = opts.camera_settings();
        assert_eq!(camera.driver, "pattern");
        assert_eq!(camera.device, "/dev/video1");
        assert_eq!((camera.width, camera.height), (320, 240));
        assert!(camera.allow);
    }

    #[test]
    fn test_half_resolution_uses_default_for_other_axis() {
        let opts = parse_config("video_width = 800").unwrap();
        assert_eq!(opts.resolution, Some(Resolution { width: 800, height: 480 }));
    }

    #[test]
    fn test_unknown_key_ignored() {
        let opts = parse_config("audio_driver = alsa\nvideo_vsync = true").unwrap();
        assert_eq!(opts.vsync, Some(true));
    }

    #[test]
    fn test_bad_value_names_key() {
        let err = parse_config("camera_allow = sometimes").unwrap_err();
        assert!(format!("{:#}", err).contains("camera_allow"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "video_driver = \"gl\"").unwrap();
        writeln!(file, "camera_allow = yes").unwrap();

        let opts = load_config(file.path()).unwrap();
        assert_eq!(opts.video_driver.as_deref(), Some("gl"));
        assert_eq!(opts.camera_allow, Some(true));
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let opts = load_config(&dir.path().join("frontend.cfg")).unwrap();
        assert_eq!(opts, Options::default());
    }
}
