//! Camera driver that opens nothing and never produces a frame.

use crate::driver::{Driver, DriverResult, NULL_IDENT};

use super::{CameraDriver, CameraRequest, FrameSink};

/// No-op camera. Always initializes.
#[derive(Debug, Default)]
pub struct NullCamera {
    started: bool,
}

impl NullCamera {
    /// Create a null camera.
    #[must_use]
    pub const fn new() -> Self {
        Self { started: false }
    }

    /// Whether `start` was called more recently than `stop`.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }
}

/// Registry init operation.
pub fn init(_request: &CameraRequest<'_>) -> DriverResult<Box<dyn CameraDriver>> {
    Ok(Box::new(NullCamera::new()))
}

impl Driver for NullCamera {
    fn ident(&self) -> &'static str {
        NULL_IDENT
    }
}

impl CameraDriver for NullCamera {
    fn start(&mut self) -> DriverResult<()> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn poll(&mut self, _sink: &mut dyn FrameSink) -> bool {
        false
    }
}
