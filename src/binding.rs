//! Logical-to-physical pin resolution and pin construction.
//!
//! Callers address pins by a logical ID. [`PinMap`] turns that into a
//! physical pin number and a [`Locality`]; [`PinFactory`] then asks its
//! [`Binder`] for the matching primitives and builds the [`OutputPin`].
//!
//! IDs the map does not know pass through unchanged as the physical number
//! and are treated as remote.
//!
//! # Example
//!
//! ```rust
//! use pinbox::{Locality, PinMap};
//!
//! let map = PinMap::default();
//! assert_eq!(map.resolve(100), (0, Locality::Local));
//! assert_eq!(map.resolve(103), (8, Locality::Local));
//! assert_eq!(map.resolve(999), (999, Locality::Remote));
//! ```

use heapless::Vec as HVec;
use log::{info, warn};

use crate::output::OutputPin;
use crate::traits::{Binder, Locality, OutputType};

/// Maximum number of entries a [`PinMap`] holds.
pub const MAX_MAPPED_PINS: usize = 16;

/// One row of the pin map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinMapping {
    /// Caller-facing ID.
    pub logical: i32,
    /// Header pin the ID is wired to.
    pub physical: i32,
}

/// Table of logical IDs wired to local header pins.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinMap {
    entries: HVec<PinMapping, MAX_MAPPED_PINS>,
}

impl PinMap {
    /// An empty map: every ID resolves to a remote pin.
    pub fn empty() -> Self {
        Self {
            entries: HVec::new(),
        }
    }

    /// Add or replace the entry for `logical`.
    ///
    /// Entries past [`MAX_MAPPED_PINS`] are dropped with a warning.
    pub fn with_entry(mut self, logical: i32, physical: i32) -> Self {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.logical == logical) {
            existing.physical = physical;
        } else if self.entries.push(PinMapping { logical, physical }).is_err() {
            warn!(
                "pin map full, dropping mapping {} -> {}",
                logical, physical
            );
        }
        self
    }

    /// Physical pin number and locality for a logical ID.
    pub fn resolve(&self, logical: i32) -> (i32, Locality) {
        self.entries
            .iter()
            .find(|e| e.logical == logical)
            .map(|e| (e.physical, Locality::Local))
            .unwrap_or((logical, Locality::Remote))
    }

    /// Mapped entries in insertion order.
    pub fn entries(&self) -> &[PinMapping] {
        &self.entries
    }

    /// Number of mapped entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PinMap {
    /// The four header pins wired on the reference board.
    fn default() -> Self {
        Self::empty()
            .with_entry(100, 0)
            .with_entry(101, 7)
            .with_entry(102, 9)
            .with_entry(103, 8)
    }
}

/// Builds [`OutputPin`]s from logical IDs.
///
/// # Type Parameter
///
/// - `B`: supplies primitives per locality ([`Binder`] trait)
#[derive(Clone, Debug)]
pub struct PinFactory<B: Binder> {
    map: PinMap,
    binder: B,
}

impl<B: Binder> PinFactory<B> {
    /// Create a factory over `map`, binding through `binder`.
    pub fn new(map: PinMap, binder: B) -> Self {
        Self { map, binder }
    }

    /// The map this factory resolves through.
    pub fn map(&self) -> &PinMap {
        &self.map
    }

    /// The binder this factory binds through.
    pub fn binder(&self) -> &B {
        &self.binder
    }

    /// Resolve `logical`, bind its primitives and return the initialized pin.
    ///
    /// Never fails; a pin nothing can drive is returned inert.
    pub fn create(&self, logical: i32, output_type: OutputType) -> OutputPin {
        let (physical, locality) = self.map.resolve(logical);
        let controller = self.binder.bind(physical, locality);
        info!(
            "pin {} -> physical {} ({}, {})",
            logical,
            physical,
            output_type.as_str(),
            locality.as_str()
        );
        OutputPin::new(physical, output_type, locality, controller)
    }
}

#[cfg(feature = "rpi")]
impl OutputPin {
    /// Create a pin on this board's header through the default pin map.
    ///
    /// Requires [`initialize_core`](crate::hal::rpi::initialize_core) to have
    /// succeeded; otherwise every write to a local pin fails and is logged.
    pub fn factory(logical: i32, output_type: OutputType) -> OutputPin {
        PinFactory::new(PinMap::default(), crate::hal::rpi::RpiBinder).create(logical, output_type)
    }
}
