//!
//! Video output drivers.
//!
//! # Architecture
//!
//! - `viewport`: letterbox math for aspect-locked presentation
//! - `timing`: frame counter and FPS sampling
//! - `pipeline`: the per-frame sequence (clear, parameter update, upload,
//!   draw, FPS, present) over a `RenderBackend`
//! - `manager`: selection and lifecycle of the single live video driver
//! - `sdl`: SDL2 window + OpenGL backend (feature `opengl`)
//! - `null`: backend that discards everything
//!
//! Every built-in video driver is a `FramePipeline` over some backend, so
//! frame validation, timing and non-block handling behave the same for all.

pub mod manager;
pub mod null;
pub mod pipeline;
#[cfg(feature = "opengl")]
pub mod sdl;
pub mod timing;
pub mod viewport;

use crate::driver::{Driver, DriverDescriptor, DriverKind, DriverRegistry, DriverResult, NULL_IDENT};
use crate::input::InputDriver;

pub use manager::VideoManager;
pub use pipeline::{FramePipeline, PipelineState, RenderBackend, RenderSurfaceState, TextureFilter};
pub use timing::{Clock, FpsSample, FrameTimingState, SystemClock, FPS_UPDATE_INTERVAL};
pub use viewport::{compute_viewport, Viewport, DEFAULT_ASPECT};

/// Pixel layouts a video driver accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 16-bit, 5 bits per channel, top bit unused.
    #[default]
    Xrgb1555,
    /// 16-bit, 5/6/5 bits.
    Rgb565,
    /// 32-bit, 8 bits per channel, top byte unused.
    Xrgb8888,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Xrgb1555 | Self::Rgb565 => 2,
            Self::Xrgb8888 => 4,
        }
    }

    /// Name used in config files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Xrgb1555 => "xrgb1555",
            Self::Rgb565 => "rgb565",
            Self::Xrgb8888 => "xrgb8888",
        }
    }

    /// Parse a config name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "xrgb1555" | "0rgb1555" => Some(Self::Xrgb1555),
            "rgb565" => Some(Self::Rgb565),
            "xrgb8888" => Some(Self::Xrgb8888),
            _ => None,
        }
    }
}

/// Creation parameters for a video driver.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Window width in pixels.
    pub width: u32,
    /// Window height in pixels.
    pub height: u32,
    /// Fullscreen mode flag.
    pub fullscreen: bool,
    /// Sync presentation to the display refresh.
    pub vsync: bool,
    /// Letterbox to `aspect_ratio` instead of stretching.
    pub force_aspect: bool,
    /// Linear texture filtering instead of nearest.
    pub smooth: bool,
    /// Aspect ratio kept when `force_aspect` is set.
    pub aspect_ratio: f32,
    /// Layout of submitted frames.
    pub pixel_format: PixelFormat,
    /// Window title, also the prefix of the FPS title.
    pub title: String,
}

impl Default for VideoInfo {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fullscreen: false,
            vsync: true,
            force_aspect: true,
            smooth: false,
            aspect_ratio: DEFAULT_ASPECT,
            pixel_format: PixelFormat::default(),
            title: concat!("mediafront v", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl VideoInfo {
    /// Windowed configuration of the given size.
    #[must_use]
    pub fn windowed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Fullscreen configuration of the given size.
    #[must_use]
    pub fn fullscreen(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fullscreen: true,
            ..Self::default()
        }
    }

    /// Set linear filtering.
    #[must_use]
    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    /// Set vsync.
    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Set aspect locking.
    #[must_use]
    pub fn with_force_aspect(mut self, force_aspect: bool) -> Self {
        self.force_aspect = force_aspect;
        self
    }

    /// Set the frame pixel layout.
    #[must_use]
    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }
}

/// Video capability implemented by each backend.
pub trait VideoDriver: Driver {
    /// Present one frame of `width` x `height` pixels, `pitch` bytes per row.
    fn frame(&mut self, frame: &[u8], width: u32, height: u32, pitch: usize) -> DriverResult<()>;

    /// Drop vsync for fast-forward presentation, or restore it.
    fn set_nonblock_state(&mut self, nonblock: bool);

    /// React to a window or viewport size change.
    fn resize(&mut self, width: u32, height: u32);

    /// Most recent FPS sample, if one has been taken.
    fn fps(&self) -> Option<f32> {
        None
    }

    /// Current presentation viewport, for drivers that track one.
    fn viewport(&self) -> Option<Viewport> {
        None
    }

    /// Whether non-block presentation is on.
    fn is_nonblock(&self) -> bool {
        false
    }
}

/// What a video init operation produces.
pub struct VideoInit {
    /// The live video handle.
    pub video: Box<dyn VideoDriver>,
    /// Input driver bound to the same window, when the backend owns one.
    pub input: Option<Box<dyn InputDriver>>,
}

impl std::fmt::Debug for VideoInit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoInit")
            .field("video", &self.video.ident())
            .field("input", &self.input.as_ref().map(|i| i.ident()))
            .finish()
    }
}

/// Init operation stored in the video registry.
pub type VideoInitFn = fn(&VideoInfo) -> DriverResult<VideoInit>;

/// Registry of video drivers compiled into this build.
pub fn registry() -> DriverRegistry<VideoInitFn> {
    #[allow(unused_mut)]
    let mut preferred = Vec::new();
    #[cfg(feature = "opengl")]
    preferred.push(DriverDescriptor::new(
        sdl::opengl::IDENT,
        sdl::opengl::init as VideoInitFn,
    ));

    DriverRegistry::new(
        DriverKind::Video,
        preferred,
        DriverDescriptor::new(NULL_IDENT, null::init as VideoInitFn),
    )
}
