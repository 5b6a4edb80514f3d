//! Ordered driver registry and name-based selection.

use std::fmt;

use tracing::{error, info, warn};

use super::{DriverError, DriverKind, DriverResult, NULL_IDENT};

/// One registry entry: an identifier plus the kind-specific init operation.
///
/// `F` is the init function pointer type of the kind, so descriptors are
/// `Copy` and can be shared freely.
#[derive(Clone, Copy)]
pub struct DriverDescriptor<F> {
    /// Unique, human-readable identifier.
    pub ident: &'static str,
    /// Builds a live handle.
    pub init: F,
}

impl<F> DriverDescriptor<F> {
    /// Create a descriptor.
    pub const fn new(ident: &'static str, init: F) -> Self {
        Self { ident, init }
    }
}

impl<F> fmt::Debug for DriverDescriptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverDescriptor")
            .field("ident", &self.ident)
            .finish_non_exhaustive()
    }
}

/// Ordered list of drivers for one kind. Earlier entries are preferred.
#[derive(Clone)]
pub struct DriverRegistry<F> {
    kind: DriverKind,
    drivers: Vec<DriverDescriptor<F>>,
}

impl<F> fmt::Debug for DriverRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("kind", &self.kind)
            .field(
                "drivers",
                &self.drivers.iter().map(|d| d.ident).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<F: Copy> DriverRegistry<F> {
    /// Build a registry whose last entry is always `null`.
    ///
    /// `null` is appended after `preferred`, so a registry built this way can
    /// never be empty and default selection never fails.
    pub fn new(
        kind: DriverKind,
        preferred: Vec<DriverDescriptor<F>>,
        null: DriverDescriptor<F>,
    ) -> Self {
        let mut drivers = preferred;
        drivers.push(null);
        Self { kind, drivers }
    }

    /// Build a registry from an arbitrary list, without the null guarantee.
    pub fn from_descriptors(kind: DriverKind, drivers: Vec<DriverDescriptor<F>>) -> Self {
        Self { kind, drivers }
    }

    /// Kind this registry serves.
    #[must_use]
    pub fn kind(&self) -> DriverKind {
        self.kind
    }

    /// Number of registered drivers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Whether no driver is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Descriptor at `index`, if any.
    #[must_use]
    pub fn find(&self, index: usize) -> Option<&DriverDescriptor<F>> {
        self.drivers.get(index)
    }

    /// Identifier at `index`, if any.
    #[must_use]
    pub fn find_ident(&self, index: usize) -> Option<&'static str> {
        self.drivers.get(index).map(|d| d.ident)
    }

    /// Index of the driver named `name`, compared ASCII case-insensitively.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.drivers
            .iter()
            .position(|d| d.ident.eq_ignore_ascii_case(name))
    }

    /// All identifiers in priority order.
    #[must_use]
    pub fn list_identifiers(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|d| d.ident).collect()
    }

    /// All identifiers joined with `|`, for help text and config UIs.
    #[must_use]
    pub fn options(&self) -> String {
        self.list_identifiers().join("|")
    }

    /// Whether the registry ends with the no-op driver.
    #[must_use]
    pub fn ends_with_null(&self) -> bool {
        self.drivers.last().is_some_and(|d| d.ident == NULL_IDENT)
    }

    /// Resolve a configured name to an index.
    ///
    /// An empty or unknown name logs the available drivers and falls back to
    /// index 0, the most preferred compiled-in driver. Only an empty registry
    /// is an error, and that error is fatal.
    pub fn select(&self, name: &str) -> DriverResult<usize> {
        if let Some(index) = self.find_by_name(name) {
            info!(kind = %self.kind, driver = self.drivers[index].ident, "selected driver");
            return Ok(index);
        }

        error!(kind = %self.kind, name, "couldn't find any {} driver named \"{}\"", self.kind, name);
        info!(kind = %self.kind, "available {} drivers are:", self.kind);
        for ident in self.list_identifiers() {
            info!(kind = %self.kind, driver = ident, "\t{}", ident);
        }

        if self.drivers.is_empty() {
            error!(kind = %self.kind, "no {} driver compiled in", self.kind);
            return Err(DriverError::NoDriverAvailable(self.kind));
        }

        warn!(
            kind = %self.kind,
            driver = self.drivers[0].ident,
            "going to default to first {} driver...",
            self.kind
        );
        Ok(0)
    }

    /// Select and return the descriptor itself.
    pub fn select_descriptor(&self, name: &str) -> DriverResult<DriverDescriptor<F>> {
        let index = self.select(name)?;
        Ok(self.drivers[index])
    }
}
