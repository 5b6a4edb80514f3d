//! Video lifecycle: driver selection, init, per-frame calls and teardown.

use tracing::{debug, warn};

use crate::driver::{DriverKind, DriverRegistry, DriverResult, Lifecycle, LifecycleState};
use crate::input::InputDriver;

use super::{VideoDriver, VideoInfo, VideoInitFn, Viewport};

/// Owns the video driver registry and the single live video handle.
#[derive(Debug)]
pub struct VideoManager {
    registry: DriverRegistry<VideoInitFn>,
    driver: String,
    info: VideoInfo,
    lifecycle: Lifecycle<dyn VideoDriver>,
}

impl VideoManager {
    /// Create a manager selecting `driver` from `registry`.
    pub fn new(registry: DriverRegistry<VideoInitFn>, driver: impl Into<String>, info: VideoInfo) -> Self {
        Self {
            registry,
            driver: driver.into(),
            info,
            lifecycle: Lifecycle::new(DriverKind::Video),
        }
    }

    /// Registry this manager selects from.
    pub fn registry(&self) -> &DriverRegistry<VideoInitFn> {
        &self.registry
    }

    /// Creation parameters.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Replace the creation parameters. Takes effect at the next `init`.
    pub fn set_info(&mut self, info: VideoInfo) {
        self.info = info;
    }

    /// Whether a video handle is live.
    pub fn is_live(&self) -> bool {
        self.lifecycle.is_live()
    }

    /// Lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Identifier of the live driver.
    pub fn ident(&self) -> Option<&'static str> {
        self.lifecycle.ident()
    }

    /// Latest FPS sample of the live driver.
    pub fn fps(&self) -> Option<f32> {
        self.lifecycle.handle().and_then(|v| v.fps())
    }

    /// Presentation viewport of the live driver.
    pub fn viewport(&self) -> Option<Viewport> {
        self.lifecycle.handle().and_then(|v| v.viewport())
    }

    /// Whether the live driver presents without waiting for vsync.
    pub fn is_nonblock(&self) -> bool {
        self.lifecycle.handle().is_some_and(|v| v.is_nonblock())
    }

    /// Select and initialize the video driver.
    ///
    /// Returns the input driver the backend brought along, if any. Calling
    /// again while a handle is live does nothing and returns `None`.
    pub fn init(&mut self) -> DriverResult<Option<Box<dyn InputDriver>>> {
        if self.lifecycle.is_live() {
            debug!("video already initialized");
            return Ok(None);
        }

        let descriptor = self.registry.select_descriptor(&self.driver)?;
        let mut input = None;
        let info = &self.info;
        self.lifecycle.init_with(|| {
            let init = (descriptor.init)(info)?;
            input = init.input;
            Ok(init.video)
        })?;
        Ok(input)
    }

    /// Present a frame on the live driver.
    ///
    /// Without a live handle this is a no-op, so a frontend whose video
    /// init failed keeps running.
    pub fn frame(&mut self, data: &[u8], width: u32, height: u32, pitch: usize) -> DriverResult<()> {
        match self.lifecycle.handle_mut() {
            Some(video) => video.frame(data, width, height, pitch),
            None => Ok(()),
        }
    }

    /// Toggle non-block presentation.
    pub fn set_nonblock_state(&mut self, nonblock: bool) {
        if let Some(video) = self.lifecycle.handle_mut() {
            debug!(nonblock, "video non-block state");
            video.set_nonblock_state(nonblock);
        }
    }

    /// Forward a surface size change.
    pub fn resize(&mut self, width: u32, height: u32) {
        match self.lifecycle.handle_mut() {
            Some(video) => video.resize(width, height),
            None => warn!(width, height, "resize without a video driver"),
        }
    }

    /// Tear the video driver down.
    pub fn uninit(&mut self) {
        self.lifecycle.uninit();
    }
}
