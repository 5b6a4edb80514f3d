//! Video driver that validates and times frames but draws nothing.

use crate::driver::{DriverResult, NULL_IDENT};

use super::pipeline::{FrameRef, FramePipeline, RenderBackend};
use super::timing::SystemClock;
use super::viewport::Viewport;
use super::{VideoInfo, VideoInit};

/// Backend with a fixed surface size and no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullBackend {
    width: u32,
    height: u32,
    uploaded: u64,
}

impl NullBackend {
    /// Backend pretending to own a `width` x `height` surface.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            uploaded: 0,
        }
    }

    /// Frames uploaded so far.
    #[must_use]
    pub const fn uploaded(&self) -> u64 {
        self.uploaded
    }
}

impl RenderBackend for NullBackend {
    fn ident(&self) -> &'static str {
        NULL_IDENT
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_swap_interval(&mut self, _interval: u32) {}

    fn set_viewport(&mut self, _viewport: Viewport) {}

    fn clear(&mut self) {}

    fn set_video_size(&mut self, _width: u32, _height: u32) {}

    fn upload(&mut self, _frame: &FrameRef<'_>) -> DriverResult<()> {
        self.uploaded += 1;
        Ok(())
    }

    fn draw(&mut self) {}

    fn set_title(&mut self, _title: &str) {}

    fn swap_buffers(&mut self) {}

    fn destroy(&mut self) {}
}

/// Null video pipeline.
pub type NullVideo = FramePipeline<NullBackend, SystemClock>;

/// Registry init operation. Never fails and brings no input driver.
pub fn init(info: &VideoInfo) -> DriverResult<VideoInit> {
    let backend = NullBackend::new(info.width, info.height);
    Ok(VideoInit {
        video: Box::new(NullVideo::new(backend, SystemClock::new(), info)),
        input: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverError, DriverKind};

    #[test]
    fn test_null_video_accepts_frames() {
        let init = init(&VideoInfo::windowed(320, 240)).unwrap();
        assert!(init.input.is_none());
        let mut video = init.video;
        assert_eq!(video.ident(), "null");
        video.frame(&[0u8; 8], 2, 2, 4).unwrap();
        video.set_nonblock_state(true);
        video.resize(0, 0);
        assert!(video.fps().is_none());
    }

    #[test]
    fn test_null_video_still_validates() {
        let mut video = init(&VideoInfo::default()).unwrap().video;
        assert!(matches!(
            video.frame(&[0u8; 2], 2, 2, 4),
            Err(DriverError::InvalidFrame(_))
        ));
        video.free();
        assert_eq!(
            video.frame(&[0u8; 8], 2, 2, 4).unwrap_err(),
            DriverError::NotActive(DriverKind::Video)
        );
    }

    #[test]
    fn test_backend_counts_uploads() {
        let mut p = NullVideo::new(NullBackend::new(4, 4), SystemClock::new(), &VideoInfo::default());
        p.submit_frame(&[0u8; 4], 2, 1, 4).unwrap();
        p.submit_frame(&[0u8; 4], 2, 1, 4).unwrap();
        assert_eq!(p.backend().uploaded(), 2);
    }
}
