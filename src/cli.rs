use std::path::PathBuf;

use crate::config::{parse_aspect, parse_resolution, Options};
use crate::logging::LogLevel;
use anyhow::{Context, Result};
use clap::Parser;

/// Driver frontend: camera capture, video output and input behind swappable drivers
#[derive(Parser, Debug, Default)]
#[command(name = "mediafront")]
#[command(version)]
#[command(about = "Multimedia frontend with interchangeable camera, video and input drivers", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Video driver name (see --list-drivers)
    #[arg(long, value_name = "NAME")]
    pub video_driver: Option<String>,

    /// Input driver name
    #[arg(long, value_name = "NAME")]
    pub input_driver: Option<String>,

    /// Camera driver name
    #[arg(long, value_name = "NAME")]
    pub camera_driver: Option<String>,

    /// Camera device hint (e.g., /dev/video0)
    #[arg(long, value_name = "DEVICE")]
    pub camera_device: Option<String>,

    /// Camera resolution (e.g., 640x480)
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub camera_res: Option<String>,

    /// Bring the camera up
    #[arg(long)]
    pub camera: bool,

    /// Allow the camera to start capturing
    #[arg(long)]
    pub allow_camera: bool,

    /// Window resolution (e.g., 640x480)
    #[arg(short, long, value_name = "WIDTHxHEIGHT")]
    pub res: Option<String>,

    /// Enable fullscreen mode
    #[arg(short, long)]
    pub fullscreen: bool,

    /// Enable windowed mode
    #[arg(short, long)]
    pub windowed: bool,

    /// Sync presentation to the display refresh
    #[arg(long)]
    pub vsync: bool,

    /// Present without waiting for the display refresh
    #[arg(long)]
    pub novsync: bool,

    /// Linear texture filtering
    #[arg(short, long)]
    pub smooth: bool,

    /// Letterbox to the aspect ratio instead of stretching
    #[arg(short = 'k', long)]
    pub force_aspect: bool,

    /// Aspect ratio kept when letterboxing (e.g., 4:3 or 1.333)
    #[arg(long, value_name = "RATIO")]
    pub aspect: Option<String>,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    pub frames: Option<u64>,

    /// Log level (nothing, user, error, warning, info, debug, all)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log file path
    #[arg(short, long, value_name = "FILE")]
    pub log_file: Option<String>,

    /// Print the compiled-in drivers of every kind and exit
    #[arg(long)]
    pub list_drivers: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref name) = self.video_driver {
            opts.video_driver = Some(name.clone());
        }
        if let Some(ref name) = self.input_driver {
            opts.input_driver = Some(name.clone());
        }
        if let Some(ref name) = self.camera_driver {
            opts.camera_driver = Some(name.clone());
        }

        if let Some(ref device) = self.camera_device {
            opts.camera_device = Some(device.clone());
        }
        if let Some(ref res) = self.camera_res {
            let res = parse_resolution(res).context("Invalid camera resolution format")?;
            opts.camera_width = Some(res.width);
            opts.camera_height = Some(res.height);
        }
        if self.camera {
            opts.camera_request = Some(true);
        }
        if self.allow_camera {
            opts.camera_allow = Some(true);
        }

        if let Some(ref res) = self.res {
            opts.resolution = Some(parse_resolution(res).context("Invalid resolution format")?);
        }

        if self.fullscreen {
            opts.fullscreen = Some(true);
        }
        if self.windowed {
            opts.fullscreen = Some(false);
        }
        if self.vsync {
            opts.vsync = Some(true);
        }
        if self.novsync {
            opts.vsync = Some(false);
        }
        if self.smooth {
            opts.smooth = Some(true);
        }
        if self.force_aspect {
            opts.force_aspect = Some(true);
        }
        if let Some(ref aspect) = self.aspect {
            opts.aspect_ratio = Some(parse_aspect(aspect).context("Invalid aspect ratio")?);
        }

        if let Some(frames) = self.frames {
            opts.max_frames = Some(frames);
        }
        if let Some(ref level) = self.log_level {
            opts.log_level = Some(LogLevel::parse(level)?);
        }
        if let Some(ref log_file) = self.log_file {
            opts.log_file = Some(log_file.clone());
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "mediafront",
            "--video-driver",
            "null",
            "--camera-res",
            "320x240",
            "--novsync",
            "--frames",
            "10",
            "--list-drivers",
        ])
        .unwrap();
        assert_eq!(cli.video_driver.as_deref(), Some("null"));
        assert!(cli.novsync);
        assert_eq!(cli.frames, Some(10));
        assert!(cli.list_drivers);
    }

    #[test]
    fn test_merge_basic_options() {
        let cli = Cli {
            res: Some("800x600".to_string()),
            fullscreen: true,
            ..Default::default()
        };

        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(
            opts.resolution,
            Some(Resolution {
                width: 800,
                height: 600
            })
        );
        assert_eq!(opts.fullscreen, Some(true));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let file = Options {
            video_driver: Some("gl".to_string()),
            vsync: Some(true),
            camera_allow: Some(false),
            ..Default::default()
        };
        let cli = Cli {
            video_driver: Some("null".to_string()),
            novsync: true,
            allow_camera: true,
            camera: true,
            camera_res: Some("320x240".to_string()),
            ..Default::default()
        };

        let opts = cli.merge_into_options(file).unwrap();
        assert_eq!(opts.video_driver.as_deref(), Some("null"));
        assert_eq!(opts.vsync, Some(false));
        assert_eq!(opts.camera_allow, Some(true));
        assert_eq!(opts.camera_request, Some(true));
        assert_eq!((opts.camera_width, opts.camera_height), (Some(320), Some(240)));
    }

    #[test]
    fn test_unset_flags_keep_file_values() {
        let file = Options {
            smooth: Some(true),
            fullscreen: Some(true),
            ..Default::default()
        };
        let opts = Cli::default().merge_into_options(file.clone()).unwrap();
        assert_eq!(opts, file);
    }

    #[test]
    fn test_invalid_resolution() {
        let cli = Cli {
            res: Some("invalid".to_string()),
            ..Default::default()
        };

        let result = cli.merge_into_options(Options::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_aspect_and_level() {
        let cli = Cli {
            aspect: Some("0:3".to_string()),
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).is_err());

        let cli = Cli {
            log_level: Some("shouty".to_string()),
            ..Default::default()
        };
        assert!(cli.merge_into_options(Options::default()).is_err());
    }
}
