//! Per-frame render sequence shared by every video driver.

use tracing::{debug, trace};

use crate::driver::{Driver, DriverError, DriverKind, DriverResult};

use super::timing::{Clock, FrameTimingState};
use super::viewport::{compute_viewport, Viewport};
use super::{PixelFormat, VideoDriver, VideoInfo};

/// Texture sampling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    /// Nearest-neighbour, crisp pixels.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
}

impl TextureFilter {
    /// Filter for the `smooth` option.
    #[must_use]
    pub const fn from_smooth(smooth: bool) -> Self {
        if smooth {
            Self::Linear
        } else {
            Self::Nearest
        }
    }
}

/// A frame as handed to the backend: already validated.
#[derive(Debug, Clone, Copy)]
pub struct FrameRef<'a> {
    /// Pixel data, `pitch * (height - 1) + width * bpp` bytes at least.
    pub data: &'a [u8],
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per row, may exceed `width * bpp`.
    pub pitch: usize,
    /// Pixel layout.
    pub format: PixelFormat,
}

impl FrameRef<'_> {
    /// Row length in pixels derived from the pitch.
    #[must_use]
    pub fn row_length(&self) -> usize {
        self.pitch / self.format.bytes_per_pixel()
    }
}

/// Native operations a render backend provides.
///
/// The pipeline calls them in a fixed order per frame: `clear`,
/// `set_video_size`, `upload`, `draw`, optionally `set_title`, then
/// `swap_buffers`.
pub trait RenderBackend {
    /// Identifier of the video driver built on this backend.
    fn ident(&self) -> &'static str;

    /// Current drawable size of the output surface.
    fn surface_size(&self) -> (u32, u32);

    /// Texture handle frames are uploaded into, if the backend has one.
    fn texture_id(&self) -> Option<u32> {
        None
    }

    /// 1 presents on vblank, 0 presents immediately.
    fn set_swap_interval(&mut self, interval: u32);

    /// Set the presentation viewport.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clear the colour target.
    fn clear(&mut self);

    /// Tell the shading stage the size of the incoming frame.
    fn set_video_size(&mut self, width: u32, height: u32);

    /// Upload a frame into the texture.
    fn upload(&mut self, frame: &FrameRef<'_>) -> DriverResult<()>;

    /// Draw the textured quad.
    fn draw(&mut self);

    /// Publish a status string, e.g. as the window title. Must not block.
    fn set_title(&mut self, title: &str);

    /// Present the back buffer.
    fn swap_buffers(&mut self);

    /// Release native resources in reverse order of acquisition.
    fn destroy(&mut self);
}

/// Presentation settings owned by the live render handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSurfaceState {
    /// Backend texture receiving frames.
    pub texture_id: Option<u32>,
    /// Sampling mode chosen at creation.
    pub filter: TextureFilter,
    /// Creation-time vsync preference. Never changed by non-block toggling.
    pub vsync: bool,
    /// Whether presentation keeps `aspect_ratio`.
    pub aspect_locked: bool,
    /// Aspect ratio kept when locked.
    pub aspect_ratio: f32,
    /// Current surface size.
    pub logical_width: u32,
    /// Current surface size.
    pub logical_height: u32,
    /// Current presentation viewport.
    pub viewport: Viewport,
}

/// Pipeline lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Backend created, no viewport yet.
    Created,
    /// Ready to present.
    Ready,
    /// Recomputing the viewport.
    Resizing,
    /// Resources released.
    Destroyed,
}

/// A video driver built from a backend and a clock.
#[derive(Debug)]
pub struct FramePipeline<B: RenderBackend, C: Clock> {
    backend: B,
    clock: C,
    surface: RenderSurfaceState,
    timing: FrameTimingState,
    state: PipelineState,
    pixel_format: PixelFormat,
    title: String,
    nonblock: bool,
    last_fps: Option<f32>,
}

impl<B: RenderBackend, C: Clock> FramePipeline<B, C> {
    /// Wrap an initialized backend and size the viewport to its surface.
    pub fn new(mut backend: B, clock: C, info: &VideoInfo) -> Self {
        backend.set_swap_interval(u32::from(info.vsync));
        let (width, height) = backend.surface_size();

        let surface = RenderSurfaceState {
            texture_id: backend.texture_id(),
            filter: TextureFilter::from_smooth(info.smooth),
            vsync: info.vsync,
            aspect_locked: info.force_aspect,
            aspect_ratio: info.aspect_ratio,
            logical_width: width,
            logical_height: height,
            viewport: Viewport::full(width, height),
        };

        let mut pipeline = Self {
            backend,
            clock,
            surface,
            timing: FrameTimingState::new(),
            state: PipelineState::Created,
            pixel_format: info.pixel_format,
            title: info.title.clone(),
            nonblock: false,
            last_fps: None,
        };
        pipeline.resize(width, height);
        pipeline
    }

    /// Lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Presentation settings.
    pub fn surface(&self) -> &RenderSurfaceState {
        &self.surface
    }

    /// Frame counter and sampling window.
    pub fn timing(&self) -> &FrameTimingState {
        &self.timing
    }

    /// Whether non-block presentation is on.
    pub fn is_nonblock(&self) -> bool {
        self.nonblock
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Recompute the viewport for a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state == PipelineState::Destroyed {
            return;
        }

        self.state = PipelineState::Resizing;
        let viewport = compute_viewport(
            width,
            height,
            self.surface.aspect_locked,
            self.surface.aspect_ratio,
        );
        debug!(width, height, ?viewport, "resize");
        self.backend.set_viewport(viewport);
        self.surface.logical_width = width;
        self.surface.logical_height = height;
        self.surface.viewport = viewport;
        self.state = PipelineState::Ready;
    }

    /// Validate, upload, draw and present one frame.
    pub fn submit_frame(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        pitch: usize,
    ) -> DriverResult<()> {
        if self.state == PipelineState::Destroyed {
            return Err(DriverError::NotActive(DriverKind::Video));
        }

        let frame = FrameRef {
            data,
            width,
            height,
            pitch,
            format: self.pixel_format,
        };
        validate(&frame)?;

        self.backend.clear();
        self.backend.set_video_size(width, height);
        self.backend.upload(&frame)?;
        self.backend.draw();

        if let Some(sample) = self.timing.tick(&mut self.clock) {
            trace!(fps = sample.fps, frames = sample.frames, "fps sample");
            self.last_fps = Some(sample.fps);
            self.backend.set_title(&sample.title(&self.title));
        }

        self.backend.swap_buffers();
        Ok(())
    }

    /// Drop vsync while `nonblock` is set. Only acts on vsync-created surfaces.
    pub fn set_nonblock(&mut self, nonblock: bool) {
        self.nonblock = nonblock;
        if self.surface.vsync && self.state != PipelineState::Destroyed {
            self.backend.set_swap_interval(if nonblock { 0 } else { 1 });
        }
    }

    /// Release backend resources. Idempotent.
    pub fn destroy(&mut self) {
        if self.state == PipelineState::Destroyed {
            return;
        }
        self.backend.destroy();
        self.surface.texture_id = None;
        self.state = PipelineState::Destroyed;
    }
}

/// Largest pitch, width or height a backend can take as a GL `GLint`.
const MAX_EXTENT: usize = i32::MAX as usize;

fn validate(frame: &FrameRef<'_>) -> DriverResult<()> {
    let bpp = frame.format.bytes_per_pixel();

    if frame.pitch > MAX_EXTENT
        || frame.width as usize > MAX_EXTENT
        || frame.height as usize > MAX_EXTENT
    {
        return Err(DriverError::InvalidFrame(format!(
            "{}x{} with pitch {} exceeds the backend limit of {}",
            frame.width, frame.height, frame.pitch, MAX_EXTENT
        )));
    }

    let row_bytes = (frame.width as usize)
        .checked_mul(bpp)
        .ok_or_else(|| DriverError::InvalidFrame(format!("{} pixel row overflows", frame.width)))?;

    if frame.pitch < row_bytes {
        return Err(DriverError::InvalidFrame(format!(
            "pitch {} shorter than {} pixel row ({} bytes)",
            frame.pitch, frame.width, row_bytes
        )));
    }
    if frame.pitch % bpp != 0 {
        return Err(DriverError::InvalidFrame(format!(
            "pitch {} is not a multiple of {} bytes per pixel",
            frame.pitch, bpp
        )));
    }

    let needed = match frame.height {
        0 => Some(0),
        h => frame
            .pitch
            .checked_mul(h as usize - 1)
            .and_then(|rows| rows.checked_add(row_bytes)),
    };
    let Some(needed) = needed else {
        return Err(DriverError::InvalidFrame(format!(
            "{}x{} with pitch {} overflows the address space",
            frame.width, frame.height, frame.pitch
        )));
    };
    if frame.data.len() < needed {
        return Err(DriverError::InvalidFrame(format!(
            "buffer holds {} bytes, {}x{} with pitch {} needs {}",
            frame.data.len(),
            frame.width,
            frame.height,
            frame.pitch,
            needed
        )));
    }
    Ok(())
}

impl<B: RenderBackend, C: Clock> Driver for FramePipeline<B, C> {
    fn ident(&self) -> &'static str {
        self.backend.ident()
    }

    fn free(&mut self) {
        self.destroy();
    }
}

impl<B: RenderBackend, C: Clock> VideoDriver for FramePipeline<B, C> {
    fn frame(&mut self, frame: &[u8], width: u32, height: u32, pitch: usize) -> DriverResult<()> {
        self.submit_frame(frame, width, height, pitch)
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.set_nonblock(nonblock);
    }

    fn resize(&mut self, width: u32, height: u32) {
        FramePipeline::resize(self, width, height);
    }

    fn fps(&self) -> Option<f32> {
        self.last_fps
    }

    fn viewport(&self) -> Option<Viewport> {
        Some(self.surface.viewport)
    }

    fn is_nonblock(&self) -> bool {
        self.nonblock
    }
}

impl<B: RenderBackend, C: Clock> Drop for FramePipeline<B, C> {
    fn drop(&mut self) {
        self.destroy();
    }
}
