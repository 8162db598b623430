//! Digital and analog output pins.
//!
//! An [`OutputPin`] drives one physical pin through the
//! [`PinController`](crate::traits::PinController)
//! its locality supplied at construction. Pins are created through a
//! [`PinFactory`](crate::PinFactory), which maps logical IDs to physical pins
//! and picks the binding.
//!
//! # Write semantics
//!
//! | Pin type | `digital_write(s)` | `analog_write(l)` |
//! |----------|--------------------|-------------------|
//! | Digital | primitive `write_digital(s)`, state `0`/`1024` | `digital_write(l >= 512)` |
//! | Analog | `analog_write(if s { 1024 } else { 0 })` | primitive `write_analog(l)`, state `l` |
//!
//! Writes on a pin that is not initialized, or that has no primitives bound
//! (remote pins), are silently ignored.
//!
//! # Example
//!
//! ```rust
//! use pinbox::hal::{ControllerCall, MockBinder};
//! use pinbox::{OutputType, PinFactory, PinMap};
//!
//! let binder = MockBinder::new();
//! let factory = PinFactory::new(PinMap::default(), binder.clone());
//!
//! let mut pin = factory.create(100, OutputType::Digital);
//! pin.analog_write(700);
//!
//! assert_eq!(pin.current_state(), 1024);
//! assert_eq!(
//!     binder.calls().last(),
//!     Some(&ControllerCall::WriteDigital { pin: 0, state: true })
//! );
//! ```

use log::{debug, warn};

use crate::error::HardwareError;
use crate::pin::{Pin, PinCore, PinLifecycle};
use crate::traits::{BoxedController, Locality, OutputType, ANALOG_FULL_SCALE, DIGITAL_THRESHOLD};

/// A single digital or analog output.
///
/// Owns its primitives exclusively. Nothing stops two `OutputPin`s from
/// being created for the same physical number; keeping them unique is up to
/// the caller.
///
/// Dropping the pin switches it off and moves it to
/// [`PinLifecycle::Deinitialized`].
pub struct OutputPin {
    core: PinCore,
    output_type: OutputType,
    locality: Locality,
    controller: Option<BoxedController>,
    current_state: i32,
}

impl OutputPin {
    /// Create and initialize a pin.
    ///
    /// `controller` is the binding for `locality`; `None` leaves the pin
    /// inert. The pin comes back initialized and switched off.
    pub fn new(
        pin_num: i32,
        output_type: OutputType,
        locality: Locality,
        controller: Option<BoxedController>,
    ) -> Self {
        if controller.is_none() {
            debug!(
                "pin {} ({}) has no primitives bound, writes will be ignored",
                pin_num,
                locality.as_str()
            );
        }

        let mut pin = Self {
            core: PinCore::new(pin_num),
            output_type,
            locality,
            controller,
            current_state: 0,
        };
        pin.init();
        pin
    }

    /// Output type, fixed at construction.
    #[inline]
    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    /// Locality this pin was bound for.
    #[inline]
    pub fn locality(&self) -> Locality {
        self.locality
    }

    /// True if primitives were bound at construction.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.controller.is_some()
    }

    /// Where the pin is in its lifecycle.
    #[inline]
    pub fn lifecycle(&self) -> PinLifecycle {
        self.core.lifecycle()
    }

    /// Last level written: the analog level, or `0`/`1024` for digital pins.
    #[inline]
    pub fn current_state(&self) -> i32 {
        self.current_state
    }

    /// Switch the pin on or off.
    pub fn digital_write(&mut self, state: bool) {
        if !self.core.is_initialized() {
            return;
        }

        match self.output_type {
            OutputType::Digital => {
                let pin_num = self.core.pin_num();
                let Some(controller) = self.controller.as_mut() else {
                    return;
                };
                report(pin_num, controller.write_digital(pin_num, state));
                self.current_state = if state { ANALOG_FULL_SCALE } else { 0 };
            }
            OutputType::Analog => {
                self.analog_write(if state { ANALOG_FULL_SCALE } else { 0 });
            }
        }
    }

    /// Drive the pin at `level` on the 0..=1024 scale.
    pub fn analog_write(&mut self, level: i32) {
        if !self.core.is_initialized() {
            return;
        }

        match self.output_type {
            OutputType::Digital => self.digital_write(level >= DIGITAL_THRESHOLD),
            OutputType::Analog => {
                let pin_num = self.core.pin_num();
                let Some(controller) = self.controller.as_mut() else {
                    return;
                };
                report(pin_num, controller.write_analog(pin_num, level));
                self.current_state = level;
            }
        }
    }
}

impl Pin for OutputPin {
    fn pin_num(&self) -> i32 {
        self.core.pin_num()
    }

    fn is_initialized(&self) -> bool {
        self.core.is_initialized()
    }

    fn init(&mut self) {
        if !self.core.mark_initialized() {
            return;
        }
        let pin_num = self.core.pin_num();
        if let Some(controller) = self.controller.as_mut() {
            report(pin_num, controller.set_mode(pin_num, self.output_type));
        }
        self.digital_write(false);
    }

    fn un_init(&mut self) {
        if !self.core.is_initialized() {
            return;
        }
        self.digital_write(false);
        self.core.mark_deinitialized();
    }
}

impl PartialEq<i32> for OutputPin {
    fn eq(&self, other: &i32) -> bool {
        self.equals(*other)
    }
}

impl Drop for OutputPin {
    fn drop(&mut self) {
        self.un_init();
    }
}

impl core::fmt::Debug for OutputPin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutputPin")
            .field("pin_num", &self.core.pin_num())
            .field("lifecycle", &self.core.lifecycle())
            .field("output_type", &self.output_type)
            .field("locality", &self.locality)
            .field("bound", &self.controller.is_some())
            .field("current_state", &self.current_state)
            .finish()
    }
}

fn report(pin_num: i32, result: Result<(), HardwareError>) {
    if let Err(e) = result {
        warn!("pin {}: {}", pin_num, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{ControllerCall, MockController};

    fn local_pin(num: i32, ty: OutputType) -> (OutputPin, MockController) {
        let mock = MockController::new();
        let pin = OutputPin::new(num, ty, Locality::Local, Some(Box::new(mock.clone())));
        mock.clear();
        (pin, mock)
    }

    #[test]
    fn construction_sets_mode_then_switches_off() {
        let mock = MockController::new();
        let pin = OutputPin::new(4, OutputType::Digital, Locality::Local, Some(Box::new(mock.clone())));

        assert!(pin.is_initialized());
        assert_eq!(pin.lifecycle(), PinLifecycle::Initialized);
        assert_eq!(
            mock.calls(),
            vec![
                ControllerCall::SetMode { pin: 4, output_type: OutputType::Digital },
                ControllerCall::WriteDigital { pin: 4, state: false },
            ]
        );
        assert_eq!(pin.current_state(), 0);
    }

    #[test]
    fn analog_construction_writes_zero_level() {
        let mock = MockController::new();
        let _pin = OutputPin::new(2, OutputType::Analog, Locality::Local, Some(Box::new(mock.clone())));

        assert_eq!(
            mock.calls(),
            vec![
                ControllerCall::SetMode { pin: 2, output_type: OutputType::Analog },
                ControllerCall::WriteAnalog { pin: 2, level: 0 },
            ]
        );
    }

    #[test]
    fn digital_write_records_sentinel() {
        let (mut pin, mock) = local_pin(0, OutputType::Digital);

        pin.digital_write(true);
        assert_eq!(pin.current_state(), 1024);
        pin.digital_write(false);
        assert_eq!(pin.current_state(), 0);

        assert_eq!(
            mock.calls(),
            vec![
                ControllerCall::WriteDigital { pin: 0, state: true },
                ControllerCall::WriteDigital { pin: 0, state: false },
            ]
        );
    }

    #[test]
    fn digital_pin_thresholds_analog_writes() {
        let (mut pin, mock) = local_pin(0, OutputType::Digital);

        pin.analog_write(511);
        assert_eq!(pin.current_state(), 0);
        pin.analog_write(512);
        assert_eq!(pin.current_state(), 1024);
        pin.analog_write(-5);
        assert_eq!(pin.current_state(), 0);

        assert_eq!(
            mock.calls(),
            vec![
                ControllerCall::WriteDigital { pin: 0, state: false },
                ControllerCall::WriteDigital { pin: 0, state: true },
                ControllerCall::WriteDigital { pin: 0, state: false },
            ]
        );
    }

    #[test]
    fn analog_pin_records_level_verbatim() {
        let (mut pin, mock) = local_pin(3, OutputType::Analog);

        pin.analog_write(300);
        assert_eq!(pin.current_state(), 300);
        pin.analog_write(2000);
        assert_eq!(pin.current_state(), 2000);

        assert_eq!(
            mock.calls(),
            vec![
                ControllerCall::WriteAnalog { pin: 3, level: 300 },
                ControllerCall::WriteAnalog { pin: 3, level: 2000 },
            ]
        );
    }

    #[test]
    fn analog_pin_digital_write_maps_to_full_scale() {
        let (mut pin, mock) = local_pin(3, OutputType::Analog);

        pin.digital_write(true);
        assert_eq!(pin.current_state(), 1024);
        pin.digital_write(false);
        assert_eq!(pin.current_state(), 0);

        assert_eq!(
            mock.calls(),
            vec![
                ControllerCall::WriteAnalog { pin: 3, level: 1024 },
                ControllerCall::WriteAnalog { pin: 3, level: 0 },
            ]
        );
    }

    #[test]
    fn unbound_pin_ignores_writes() {
        let mut pin = OutputPin::new(999, OutputType::Digital, Locality::Remote, None);

        assert!(pin.is_initialized());
        assert!(!pin.is_bound());
        pin.digital_write(true);
        pin.analog_write(900);
        assert_eq!(pin.current_state(), 0);
    }

    #[test]
    fn deinitialized_pin_ignores_writes() {
        let (mut pin, mock) = local_pin(7, OutputType::Digital);

        pin.digital_write(true);
        pin.un_init();
        assert_eq!(pin.lifecycle(), PinLifecycle::Deinitialized);
        assert_eq!(pin.current_state(), 0);

        mock.clear();
        pin.digital_write(true);
        pin.analog_write(1000);
        assert!(mock.calls().is_empty());
        assert_eq!(pin.current_state(), 0);
    }

    #[test]
    fn init_after_un_init_is_ignored() {
        let (mut pin, mock) = local_pin(7, OutputType::Digital);

        pin.un_init();
        mock.clear();
        pin.init();

        assert!(!pin.is_initialized());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn drop_switches_pin_off() {
        let (mut pin, mock) = local_pin(9, OutputType::Digital);
        pin.digital_write(true);
        mock.clear();

        drop(pin);

        assert_eq!(mock.calls(), vec![ControllerCall::WriteDigital { pin: 9, state: false }]);
    }

    #[test]
    fn drop_after_un_init_writes_nothing() {
        let (mut pin, mock) = local_pin(9, OutputType::Digital);
        pin.un_init();
        mock.clear();

        drop(pin);

        assert!(mock.calls().is_empty());
    }

    #[test]
    fn controller_failure_still_records_state() {
        let mock = MockController::new().failing();
        let mut pin = OutputPin::new(8, OutputType::Digital, Locality::Local, Some(Box::new(mock.clone())));

        pin.digital_write(true);

        assert_eq!(pin.current_state(), 1024);
        assert!(mock.calls().contains(&ControllerCall::WriteDigital { pin: 8, state: true }));
    }

    #[test]
    fn compares_with_raw_pin_number() {
        let (pin, _mock) = local_pin(8, OutputType::Digital);
        assert!(pin == 8);
        assert!(pin != 9);
        assert_eq!(pin.locality(), Locality::Local);
        assert_eq!(pin.output_type(), OutputType::Digital);
    }

    #[test]
    fn debug_shows_identity() {
        let pin = OutputPin::new(5, OutputType::Analog, Locality::Remote, None);
        let text = format!("{:?}", pin);
        assert!(text.contains("pin_num: 5"));
        assert!(text.contains("bound: false"));
    }
}
