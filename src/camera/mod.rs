//!
//! Camera capture drivers.
//!
//! A camera driver is opened with a device hint, the buffer kinds the
//! consumer can take (`CameraCaps`) and a preferred resolution. Once started
//! it is polled once per tick and hands captured frames to a `FrameSink`.
//!
//! Built-in drivers, in priority order:
//! - `pattern`: software test-pattern source
//! - `null`: never produces frames

pub mod manager;
pub mod null;
pub mod pattern;

use bitflags::bitflags;

use crate::driver::{
    Driver, DriverDescriptor, DriverKind, DriverRegistry, DriverResult, Listener, NULL_IDENT,
};

pub use manager::{CameraManager, CameraSettings};
pub use null::NullCamera;
pub use pattern::PatternCamera;

bitflags! {
    /// Buffer kinds a camera consumer accepts.
    pub struct CameraCaps: u64 {
        /// Frames delivered as a GPU texture.
        const GL_TEXTURE = 1 << 0;
        /// Frames delivered as an XRGB8888 buffer in system memory.
        const RAW_FRAMEBUFFER = 1 << 1;
    }
}

impl Default for CameraCaps {
    fn default() -> Self {
        Self::RAW_FRAMEBUFFER
    }
}

/// Parameters handed to a camera driver's init operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRequest<'a> {
    /// Device hint, `None` for the driver's default device.
    pub device: Option<&'a str>,
    /// Buffer kinds the consumer accepts.
    pub caps: CameraCaps,
    /// Requested width, 0 for the driver default.
    pub width: u32,
    /// Requested height, 0 for the driver default.
    pub height: u32,
}

/// Receives captured frames during `CameraDriver::poll`.
pub trait FrameSink {
    /// A frame in system memory, XRGB8888, `pitch` bytes per row.
    fn raw_framebuffer(&mut self, _pixels: &[u32], _width: u32, _height: u32, _pitch: usize) {}

    /// A frame living in a GPU texture, with its texture-coordinate transform.
    fn gl_texture(&mut self, _texture_id: u32, _texture_target: u32, _affine: &[f32; 9]) {}
}

/// Camera capability implemented by each backend.
pub trait CameraDriver: Driver {
    /// Begin streaming.
    fn start(&mut self) -> DriverResult<()>;

    /// Stop streaming. The handle stays usable for a later `start`.
    fn stop(&mut self);

    /// Deliver at most one new frame to `sink`. Returns whether one was delivered.
    fn poll(&mut self, sink: &mut dyn FrameSink) -> bool;
}

/// Init operation stored in the camera registry.
pub type CameraInitFn = for<'a> fn(&CameraRequest<'a>) -> DriverResult<Box<dyn CameraDriver>>;

/// Registry of camera drivers compiled into this build.
pub fn registry() -> DriverRegistry<CameraInitFn> {
    DriverRegistry::new(
        DriverKind::Camera,
        vec![DriverDescriptor::new(
            pattern::IDENT,
            pattern::init as CameraInitFn,
        )],
        DriverDescriptor::new(NULL_IDENT, null::init as CameraInitFn),
    )
}

/// What the camera consumer asks for, plus its lifecycle listeners.
#[derive(Default)]
pub struct CameraCallback {
    /// Buffer kinds the consumer accepts.
    pub caps: CameraCaps,
    /// Default width used when the configured width is 0.
    pub width: u32,
    /// Default height used when the configured height is 0.
    pub height: u32,
    /// Fired after a driver has been initialized.
    pub on_initialized: Option<Listener>,
    /// Fired before the driver is freed.
    pub on_deinitialized: Option<Listener>,
}

impl std::fmt::Debug for CameraCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCallback")
            .field("caps", &self.caps)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("on_initialized", &self.on_initialized.is_some())
            .field("on_deinitialized", &self.on_deinitialized.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let reg = registry();
        assert_eq!(reg.list_identifiers(), vec!["pattern", "null"]);
        assert!(reg.ends_with_null());
    }

    #[test]
    fn test_caps_bits() {
        assert_eq!(CameraCaps::GL_TEXTURE.bits(), 1);
        assert_eq!(CameraCaps::RAW_FRAMEBUFFER.bits(), 2);
        assert_eq!(CameraCaps::default(), CameraCaps::RAW_FRAMEBUFFER);
    }
}
