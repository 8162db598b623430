//! Hardware abstraction traits for output pins.
//!
//! This module defines the low-level capability set an [`OutputPin`] drives
//! and the locality resolver that supplies it.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`PinController`] | Set mode, write digital level, write analog level |
//! | [`Binder`] | Supplies a [`PinController`] for a pin's [`Locality`] |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For a Raspberry Pi, use the implementations
//! from `hal::rpi` (requires the `rpi` feature).
//!
//! # Example
//!
//! ```rust
//! use pinbox::traits::{Binder, Locality, OutputType, PinController};
//! use pinbox::hal::MockBinder;
//!
//! let binder = MockBinder::new();
//! let mut controller = binder.bind(7, Locality::Local).unwrap();
//! controller.set_mode(7, OutputType::Digital).unwrap();
//! controller.write_digital(7, true).unwrap();
//!
//! assert_eq!(binder.calls().len(), 2);
//! assert!(binder.bind(999, Locality::Remote).is_none());
//! ```
//!
//! [`OutputPin`]: crate::OutputPin

use crate::error::HardwareError;

/// Level written by [`OutputPin::digital_write`](crate::OutputPin::digital_write)
/// when a pin is switched on, on the analog scale.
pub const ANALOG_FULL_SCALE: i32 = 1024;

/// Analog levels at or above this are treated as "on" by a digital pin.
pub const DIGITAL_THRESHOLD: i32 = 512;

/// Kind of signal an output pin produces.
///
/// Fixed for the lifetime of the pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutputType {
    /// On/off output.
    Digital,
    /// Level output on a 0..=1024 scale.
    Analog,
}

impl OutputType {
    /// Returns the type as a lowercase string.
    ///
    /// ```
    /// use pinbox::OutputType;
    ///
    /// assert_eq!(OutputType::Digital.as_str(), "digital");
    /// assert_eq!(OutputType::Analog.as_str(), "analog");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            OutputType::Digital => "digital",
            OutputType::Analog => "analog",
        }
    }
}

/// Where a pin's primitives live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Locality {
    /// Wired to the GPIO controller of this board.
    Local,
    /// Behind a remote transport. No transport exists yet, so remote pins
    /// stay inert.
    Remote,
}

impl Locality {
    /// Returns the locality as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Locality::Local => "local",
            Locality::Remote => "remote",
        }
    }
}

/// Low-level output primitives for one physical pin.
///
/// This is the capability set an [`OutputPin`](crate::OutputPin) is bound to
/// at construction. Every call carries the physical pin number so a single
/// controller may serve several pins, but the pin types in this crate hand
/// each pin its own instance.
///
/// # Implementation Notes
///
/// - `set_mode` is called exactly once, before any write
/// - Analog levels are on a 0..=1024 scale; values outside it are passed
///   through and clamping is up to the implementation
/// - Errors are reported, never panicked on; the owning pin logs them
///
/// # Example Implementation
///
/// ```rust,ignore
/// use pinbox::traits::{OutputType, PinController};
/// use pinbox::HardwareError;
///
/// struct MyController { /* hardware handles */ }
///
/// impl PinController for MyController {
///     fn set_mode(&mut self, pin: i32, ty: OutputType) -> Result<(), HardwareError> {
///         // Configure the line as an output...
///         Ok(())
///     }
///
///     fn write_digital(&mut self, pin: i32, state: bool) -> Result<(), HardwareError> {
///         // Drive the line high or low...
///         Ok(())
///     }
///
///     fn write_analog(&mut self, pin: i32, level: i32) -> Result<(), HardwareError> {
///         // Set the PWM duty cycle...
///         Ok(())
///     }
/// }
/// ```
pub trait PinController {
    /// Configure the pin as an output of the given type.
    fn set_mode(&mut self, pin: i32, output_type: OutputType) -> Result<(), HardwareError>;

    /// Drive the pin high (`true`) or low (`false`).
    fn write_digital(&mut self, pin: i32, state: bool) -> Result<(), HardwareError>;

    /// Drive the pin at an analog level.
    fn write_analog(&mut self, pin: i32, level: i32) -> Result<(), HardwareError>;
}

/// Owned, sendable controller as stored inside a pin.
pub type BoxedController = Box<dyn PinController + Send>;

/// Supplies the primitives for a pin according to its locality.
///
/// Returning `None` leaves the pin unbound: every write on it is a no-op.
pub trait Binder {
    /// Bind primitives for physical pin `pin` at `locality`.
    fn bind(&self, pin: i32, locality: Locality) -> Option<BoxedController>;
}

impl<B: Binder + ?Sized> Binder for &B {
    fn bind(&self, pin: i32, locality: Locality) -> Option<BoxedController> {
        (**self).bind(pin, locality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_type_as_str() {
        assert_eq!(OutputType::Digital.as_str(), "digital");
        assert_eq!(OutputType::Analog.as_str(), "analog");
    }

    #[test]
    fn locality_as_str() {
        assert_eq!(Locality::Local.as_str(), "local");
        assert_eq!(Locality::Remote.as_str(), "remote");
    }

    #[test]
    fn threshold_is_half_scale() {
        assert_eq!(DIGITAL_THRESHOLD * 2, ANALOG_FULL_SCALE);
    }

    struct NullBinder;

    impl Binder for NullBinder {
        fn bind(&self, _pin: i32, _locality: Locality) -> Option<BoxedController> {
            None
        }
    }

    #[test]
    fn binder_by_reference() {
        let binder = NullBinder;
        let by_ref = &binder;
        assert!(by_ref.bind(0, Locality::Local).is_none());
    }
}
