//! Software camera producing scrolling colour bars.
//!
//! Stands in for a capture device on machines without one. Like most
//! capture backends it only fills system-memory buffers, so it refuses
//! consumers that cannot take a raw framebuffer.

use tracing::{debug, info};

use crate::driver::{Driver, DriverError, DriverResult};

use super::{CameraCaps, CameraDriver, CameraRequest, FrameSink};

/// Registry identifier.
pub const IDENT: &str = "pattern";

/// Width used when the request leaves it at 0.
pub const DEFAULT_WIDTH: u32 = 640;
/// Height used when the request leaves it at 0.
pub const DEFAULT_HEIGHT: u32 = 480;

const BARS: [u32; 8] = [
    0x00ff_ffff,
    0x00ff_ff00,
    0x0000_ffff,
    0x0000_ff00,
    0x00ff_00ff,
    0x00ff_0000,
    0x0000_00ff,
    0x0000_0000,
];

/// Test-pattern camera.
#[derive(Debug)]
pub struct PatternCamera {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    offset: u32,
    started: bool,
}

impl PatternCamera {
    /// Build a camera for `request`.
    pub fn new(request: &CameraRequest<'_>) -> DriverResult<Self> {
        if !request.caps.contains(CameraCaps::RAW_FRAMEBUFFER) {
            return Err(DriverError::Unsupported(
                "pattern camera without raw framebuffer".to_string(),
            ));
        }

        let width = if request.width == 0 { DEFAULT_WIDTH } else { request.width };
        let height = if request.height == 0 { DEFAULT_HEIGHT } else { request.height };
        if let Some(device) = request.device {
            debug!(device, "pattern camera ignores device hint");
        }
        info!(width, height, "pattern camera opened");

        Ok(Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            offset: 0,
            started: false,
        })
    }

    /// Frame width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    fn render(&mut self) {
        let bar_width = (self.width / BARS.len() as u32).max(1);
        let width = self.width as usize;
        for (y, row) in self.pixels.chunks_exact_mut(width).enumerate() {
            let shade = if y % 2 == 0 { 0x0000_0000 } else { 0x0010_1010 };
            for (x, px) in row.iter_mut().enumerate() {
                let column = (x as u32 + self.offset) % self.width;
                let bar = ((column / bar_width) as usize).min(BARS.len() - 1);
                *px = BARS[bar] ^ shade;
            }
        }
    }
}

/// Registry init operation.
pub fn init(request: &CameraRequest<'_>) -> DriverResult<Box<dyn CameraDriver>> {
    Ok(Box::new(PatternCamera::new(request)?))
}

impl Driver for PatternCamera {
    fn ident(&self) -> &'static str {
        IDENT
    }

    fn free(&mut self) {
        self.started = false;
        self.pixels = Vec::new();
    }
}

impl CameraDriver for PatternCamera {
    fn start(&mut self) -> DriverResult<()> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn poll(&mut self, sink: &mut dyn FrameSink) -> bool {
        if !self.started {
            return false;
        }

        self.render();
        sink.raw_framebuffer(
            &self.pixels,
            self.width,
            self.height,
            self.width as usize * std::mem::size_of::<u32>(),
        );
        self.offset = (self.offset + 1) % self.width;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture {
        frames: Vec<(Vec<u32>, u32, u32, usize)>,
    }

    impl FrameSink for Capture {
        fn raw_framebuffer(&mut self, pixels: &[u32], width: u32, height: u32, pitch: usize) {
            self.frames.push((pixels.to_vec(), width, height, pitch));
        }
    }

    fn request(caps: CameraCaps, width: u32, height: u32) -> CameraRequest<'static> {
        CameraRequest {
            device: None,
            caps,
            width,
            height,
        }
    }

    #[test]
    fn test_defaults_when_unsized() {
        let cam = PatternCamera::new(&request(CameraCaps::RAW_FRAMEBUFFER, 0, 0)).unwrap();
        assert_eq!((cam.width(), cam.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    }

    #[test]
    fn test_rejects_texture_only_consumer() {
        let err = PatternCamera::new(&request(CameraCaps::GL_TEXTURE, 64, 48)).unwrap_err();
        assert!(matches!(err, DriverError::Unsupported(_)));
    }

    #[test]
    fn test_poll_requires_start() {
        let mut cam = PatternCamera::new(&request(CameraCaps::RAW_FRAMEBUFFER, 16, 4)).unwrap();
        let mut sink = Capture::default();
        assert!(!cam.poll(&mut sink));

        cam.start().unwrap();
        assert!(cam.poll(&mut sink));
        cam.stop();
        assert!(!cam.poll(&mut sink));
        assert_eq!(sink.frames.len(), 1);
    }

    #[test]
    fn test_frame_geometry_and_scroll() {
        let mut cam = PatternCamera::new(&request(CameraCaps::all(), 16, 2)).unwrap();
        cam.start().unwrap();
        let mut sink = Capture::default();
        cam.poll(&mut sink);
        cam.poll(&mut sink);

        let (first, width, height, pitch) = &sink.frames[0];
        assert_eq!((*width, *height, *pitch), (16, 2, 64));
        assert_eq!(first.len(), 32);
        assert_eq!(first[0], BARS[0]);
        assert_eq!(first[2], BARS[1]);

        let second = &sink.frames[1].0;
        assert_eq!(second[1], first[2]);
    }
}
