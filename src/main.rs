use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};

use mediafront::camera::{self, CameraCallback, CameraCaps, FrameSink};
use mediafront::config::load_config;
use mediafront::graphics::{self, PixelFormat};
use mediafront::input::{self, InputEvent};
use mediafront::logging::init_logging;
use mediafront::{Cli, Drivers};

const DEFAULT_CONFIG: &str = "mediafront.cfg";

/// Size of the generated frame shown when no camera is streaming.
const IDLE_WIDTH: u32 = 320;
const IDLE_HEIGHT: u32 = 240;

/// Keeps the most recent camera frame.
#[derive(Debug, Default)]
struct LatestFrame {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
    pitch: usize,
}

impl LatestFrame {
    /// Fill with a moving gradient.
    fn fill_idle(&mut self, tick: u64) {
        self.width = IDLE_WIDTH;
        self.height = IDLE_HEIGHT;
        self.pitch = IDLE_WIDTH as usize * 4;
        self.pixels.clear();
        let shift = (tick % 256) as u32;
        for y in 0..IDLE_HEIGHT {
            for x in 0..IDLE_WIDTH {
                let r = (x + shift) & 0xff;
                let g = (y + shift) & 0xff;
                self.pixels.push((r << 16) | (g << 8) | 0x40);
            }
        }
    }
}

impl FrameSink for LatestFrame {
    fn raw_framebuffer(&mut self, pixels: &[u32], width: u32, height: u32, pitch: usize) {
        self.pixels.clear();
        self.pixels.extend_from_slice(pixels);
        self.width = width;
        self.height = height;
        self.pitch = pitch;
    }
}

fn list_drivers() {
    let video = graphics::registry();
    let input = input::registry();
    let camera = camera::registry();
    println!("{}: {}", video.kind().title(), video.options());
    println!("{}: {}", input.kind().title(), input.options());
    println!("{}: {}", camera.kind().title(), camera.options());
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_drivers {
        list_drivers();
        return Ok(());
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let options = cli.merge_into_options(load_config(&config_path)?)?;

    init_logging(
        options.log_level.unwrap_or_default(),
        options.log_file.as_deref().map(Path::new),
    )?;
    info!(config = %config_path.display(), "mediafront starting");
    debug!(?options, "configuration");

    let mut drivers = Drivers::new(&options);
    // Frames handed to video are camera-native XRGB8888.
    drivers
        .video_mut()
        .set_info(options.video_info().with_pixel_format(PixelFormat::Xrgb8888));
    if options.camera_request.unwrap_or(false) {
        drivers.request_camera(CameraCallback {
            caps: CameraCaps::RAW_FRAMEBUFFER,
            width: camera::pattern::DEFAULT_WIDTH,
            height: camera::pattern::DEFAULT_HEIGHT,
            ..CameraCallback::default()
        });
    }
    drivers.init()?;

    let streaming = drivers.camera().is_live()
        && match drivers.start_camera() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "camera not started");
                false
            }
        };

    let mut latest = LatestFrame::default();
    let mut last_message: Option<String> = None;
    let mut tick: u64 = 0;

    loop {
        let events = drivers.poll_input();
        if events.contains(&InputEvent::Quit) {
            info!("quit requested");
            break;
        }

        if !drivers.poll_camera(&mut latest) && !streaming {
            latest.fill_idle(tick);
        }
        if !latest.pixels.is_empty() {
            let bytes: &[u8] = bytemuck::cast_slice(&latest.pixels);
            if let Err(err) = drivers
                .video_mut()
                .frame(bytes, latest.width, latest.height, latest.pitch)
            {
                warn!(error = %err, "frame dropped");
            }
        }

        let message = drivers.messages_mut().pull().map(str::to_string);
        if message.is_some() && message != last_message {
            info!(text = message.as_deref().unwrap_or_default(), "on-screen message");
        }
        last_message = message;

        tick += 1;
        if options.max_frames.is_some_and(|max| tick >= max) {
            debug!(tick, "frame limit reached");
            break;
        }
    }

    if let Some(fps) = drivers.video().fps() {
        info!(fps, frames = tick, "final frame rate");
    }
    drivers.uninit();
    Ok(())
}
