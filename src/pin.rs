//! Identity and lifecycle shared by all pin kinds.
//!
//! A pin is identified by its physical pin number, which never changes after
//! construction. Two pins are "the same pin" exactly when their numbers match.
//!
//! # Lifecycle
//!
//! ```text
//!  Unbound ──init()──▶ Initialized ──un_init()──▶ Deinitialized
//! ```
//!
//! There is no way back to `Initialized`. Concrete pin types run `init` from
//! their constructor and `un_init` from `Drop`.

/// Where a pin is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PinLifecycle {
    /// Constructed, primitives not yet in use.
    #[default]
    Unbound,
    /// Ready for writes.
    Initialized,
    /// Switched off for good.
    Deinitialized,
}

/// Physical identity plus lifecycle state.
///
/// Embedded by concrete pin types to implement the bookkeeping half of
/// [`Pin`].
#[derive(Debug)]
pub struct PinCore {
    pin_num: i32,
    lifecycle: PinLifecycle,
}

impl PinCore {
    /// Creates the core for physical pin `pin_num` in the `Unbound` state.
    pub const fn new(pin_num: i32) -> Self {
        Self {
            pin_num,
            lifecycle: PinLifecycle::Unbound,
        }
    }

    /// Physical pin number.
    #[inline]
    pub const fn pin_num(&self) -> i32 {
        self.pin_num
    }

    /// Current lifecycle state.
    #[inline]
    pub const fn lifecycle(&self) -> PinLifecycle {
        self.lifecycle
    }

    /// True while in the `Initialized` state.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.lifecycle == PinLifecycle::Initialized
    }

    /// `Unbound -> Initialized`. Returns false (and changes nothing) from any
    /// other state.
    pub fn mark_initialized(&mut self) -> bool {
        if self.lifecycle != PinLifecycle::Unbound {
            return false;
        }
        self.lifecycle = PinLifecycle::Initialized;
        true
    }

    /// `Initialized -> Deinitialized`. Returns false (and changes nothing)
    /// from any other state.
    pub fn mark_deinitialized(&mut self) -> bool {
        if self.lifecycle != PinLifecycle::Initialized {
            return false;
        }
        self.lifecycle = PinLifecycle::Deinitialized;
        true
    }
}

/// A pin with a stable physical identity and an init/deinit protocol.
///
/// Implementors supply [`init`](Pin::init) and [`un_init`](Pin::un_init);
/// comparisons against raw pin numbers come for free.
///
/// # Example
///
/// ```rust
/// use pinbox::hal::MockBinder;
/// use pinbox::{OutputType, Pin, PinFactory, PinMap};
///
/// let factory = PinFactory::new(PinMap::default(), MockBinder::new());
/// let pin = factory.create(101, OutputType::Digital);
///
/// assert!(pin.is_initialized());
/// assert_eq!(pin.pin_num(), 7);
/// assert!(pin.equals(7));
/// assert!(pin.not_equals(101));
/// ```
pub trait Pin {
    /// Physical pin number.
    fn pin_num(&self) -> i32;

    /// True between `init` and `un_init`.
    fn is_initialized(&self) -> bool;

    /// Bring the pin into service. Only effective on an unbound pin.
    fn init(&mut self);

    /// Take the pin out of service for good. Only effective on an
    /// initialized pin.
    fn un_init(&mut self);

    /// True if this pin's physical number is `other`.
    fn equals(&self, other: i32) -> bool {
        self.pin_num() == other
    }

    /// True if this pin's physical number is not `other`.
    fn not_equals(&self, other: i32) -> bool {
        !self.equals(other)
    }
}
