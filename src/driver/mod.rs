//!
//! Driver registry and lifecycle core.
//!
//! Every capability the frontend consumes (camera capture, video output,
//! input polling) is provided by one of several interchangeable drivers.
//! This module holds the pieces shared by all kinds:
//!
//! - `registry`: the ordered, compile-time populated list of drivers per kind
//!   and the name-based selector with its fall-back-to-first policy
//! - `lifecycle`: the owner of the single live handle per kind
//! - `error`: the error taxonomy
//!
//! The kind-specific capability traits live in `camera`, `graphics` and
//! `input`.

pub mod error;
pub mod lifecycle;
pub mod registry;

use std::fmt;

pub use error::{DriverError, DriverResult};
pub use lifecycle::{Lifecycle, LifecycleState, Listener};
pub use registry::{DriverDescriptor, DriverRegistry};

/// Identifier every registry reserves for its no-op driver.
pub const NULL_IDENT: &str = "null";

/// Driver kinds managed by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    /// Camera capture.
    Camera,
    /// Video output.
    Video,
    /// Input polling.
    Input,
}

impl DriverKind {
    /// Lower-case name used in logs and config keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Video => "video",
            Self::Input => "input",
        }
    }

    /// Capitalised name used in user-facing messages.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Camera => "Camera",
            Self::Video => "Video",
            Self::Input => "Input",
        }
    }

    /// Config key naming the driver for this kind, e.g. `camera_driver`.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::Camera => "camera_driver",
            Self::Video => "video_driver",
            Self::Input => "input_driver",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operations every live driver handle supports, whatever its kind.
pub trait Driver {
    /// Human-readable identifier, matching the registry entry that built it.
    fn ident(&self) -> &'static str;

    /// Release native resources.
    ///
    /// Called exactly once by the lifecycle manager before the handle is
    /// dropped. Drivers without native resources keep the default.
    fn free(&mut self) {}
}
