//! Error types shared by every driver kind.

use super::DriverKind;

/// Error types for driver operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// No driver of this kind is compiled in. Selection cannot continue.
    #[error("no {0} driver available")]
    NoDriverAvailable(DriverKind),

    /// The kind has no live handle (never initialized, init failed, or torn down).
    #[error("{0} driver is not active")]
    NotActive(DriverKind),

    /// The user turned this capability off.
    #[error("{} is explicitly disabled.", .0.title())]
    Disabled(DriverKind),

    /// The native backend refused or failed an operation.
    #[error("{ident}: {reason}")]
    Backend {
        /// Identifier of the failing driver.
        ident: &'static str,
        /// Backend supplied reason.
        reason: String,
    },

    /// A submitted frame does not match its declared geometry.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The driver does not implement the requested capability.
    #[error("{0} is not supported")]
    Unsupported(String),
}

impl DriverError {
    /// Shorthand for a backend failure.
    pub fn backend(ident: &'static str, reason: impl Into<String>) -> Self {
        Self::Backend {
            ident,
            reason: reason.into(),
        }
    }

    /// Whether the error must abort startup rather than drop the capability.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::NoDriverAvailable(_))
    }
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
