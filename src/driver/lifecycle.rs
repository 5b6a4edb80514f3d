//! Ownership of the single live handle per driver kind.

use std::fmt;

use tracing::{debug, warn};

use super::{Driver, DriverKind, DriverResult};

/// Zero-argument notification fired synchronously on the owning thread.
pub type Listener = Box<dyn FnMut()>;

/// Lifecycle states of one driver kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// No handle.
    #[default]
    Uninitialized,
    /// The descriptor's init operation is running.
    Initializing,
    /// A handle is live and running.
    Active,
    /// A handle is live but stopped.
    Stopped,
}

/// Owns at most one live handle of kind `D`.
///
/// Init is idempotent: a second init while a handle is live is a no-op, so
/// a backend is never allocated twice. Uninit fires the deinitialized
/// listener while the handle is still live, then frees and drops it.
pub struct Lifecycle<D: ?Sized + Driver> {
    kind: DriverKind,
    state: LifecycleState,
    handle: Option<Box<D>>,
    active: bool,
    on_initialized: Option<Listener>,
    on_deinitialized: Option<Listener>,
}

impl<D: ?Sized + Driver> Lifecycle<D> {
    /// Create an empty lifecycle for `kind`.
    pub fn new(kind: DriverKind) -> Self {
        Self {
            kind,
            state: LifecycleState::Uninitialized,
            handle: None,
            active: false,
            on_initialized: None,
            on_deinitialized: None,
        }
    }

    /// Kind this lifecycle manages.
    pub fn kind(&self) -> DriverKind {
        self.kind
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether a handle is live.
    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether the capability is wanted and has not failed.
    ///
    /// Cleared when init fails so the rest of the frontend carries on
    /// without the capability.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Request or drop the capability.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Install or clear the initialized listener.
    pub fn set_on_initialized(&mut self, listener: Option<Listener>) {
        self.on_initialized = listener;
    }

    /// Install or clear the deinitialized listener.
    pub fn set_on_deinitialized(&mut self, listener: Option<Listener>) {
        self.on_deinitialized = listener;
    }

    /// Identifier of the live driver, if any.
    pub fn ident(&self) -> Option<&'static str> {
        self.handle.as_ref().map(|h| h.ident())
    }

    /// Shared access to the live handle.
    pub fn handle(&self) -> Option<&D> {
        self.handle.as_deref()
    }

    /// Exclusive access to the live handle.
    pub fn handle_mut(&mut self) -> Option<&mut D> {
        self.handle.as_deref_mut()
    }

    /// Run `init` unless a handle is already live.
    ///
    /// On failure the kind returns to `Uninitialized`, is marked inactive, and
    /// the error is handed back so the caller can decide how loud to be.
    pub fn init_with<F>(&mut self, init: F) -> DriverResult<()>
    where
        F: FnOnce() -> DriverResult<Box<D>>,
    {
        if self.handle.is_some() {
            debug!(kind = %self.kind, "already initialized, ignoring init");
            return Ok(());
        }

        self.state = LifecycleState::Initializing;
        match init() {
            Ok(handle) => {
                debug!(kind = %self.kind, driver = handle.ident(), "driver initialized");
                self.handle = Some(handle);
                self.state = LifecycleState::Active;
                self.active = true;
                if let Some(listener) = self.on_initialized.as_mut() {
                    listener();
                }
                Ok(())
            }
            Err(err) => {
                warn!(
                    kind = %self.kind,
                    error = %err,
                    "failed to initialize {} driver, will continue without {}",
                    self.kind,
                    self.kind
                );
                self.state = LifecycleState::Uninitialized;
                self.active = false;
                Err(err)
            }
        }
    }

    /// Record that the live handle is running. No-op without a handle.
    pub fn mark_running(&mut self) {
        if self.handle.is_some() {
            self.state = LifecycleState::Active;
        }
    }

    /// Record that the live handle is stopped. No-op without a handle.
    pub fn mark_stopped(&mut self) {
        if self.handle.is_some() {
            self.state = LifecycleState::Stopped;
        }
    }

    /// Tear down the live handle, if any.
    pub fn uninit(&mut self) {
        if self.handle.is_none() {
            self.state = LifecycleState::Uninitialized;
            return;
        }

        if let Some(listener) = self.on_deinitialized.as_mut() {
            listener();
        }

        if let Some(mut handle) = self.handle.take() {
            debug!(kind = %self.kind, driver = handle.ident(), "freeing driver");
            handle.free();
        }
        self.state = LifecycleState::Uninitialized;
    }
}

impl<D: ?Sized + Driver> Drop for Lifecycle<D> {
    fn drop(&mut self) {
        self.uninit();
    }
}

impl<D: ?Sized + Driver> fmt::Debug for Lifecycle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("driver", &self.ident())
            .field("active", &self.active)
            .finish()
    }
}
