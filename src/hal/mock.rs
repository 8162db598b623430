//! Mock implementations for testing without hardware.
//!
//! These record every primitive call so tests can assert exactly what a pin
//! sent to the hardware. Clones share one call log, so a test can keep a
//! handle while the pin owns the boxed controller.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockController`] | [`PinController`] | Records set-mode/write calls |
//! | [`MockBinder`] | [`Binder`] | Hands out [`MockController`]s for local pins |
//!
//! # Example
//!
//! ```rust
//! use pinbox::hal::{ControllerCall, MockController};
//! use pinbox::{Locality, OutputPin, OutputType};
//!
//! let mock = MockController::new();
//! let mut pin = OutputPin::new(3, OutputType::Digital, Locality::Local, Some(Box::new(mock.clone())));
//! mock.clear();
//!
//! pin.digital_write(true);
//! assert_eq!(mock.calls(), vec![ControllerCall::WriteDigital { pin: 3, state: true }]);
//! ```
//!
//! [`PinController`]: crate::traits::PinController
//! [`Binder`]: crate::traits::Binder

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::HardwareError;
use crate::traits::{Binder, BoxedController, Locality, OutputType, PinController};

/// One primitive invocation seen by a mock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerCall {
    /// `set_mode(pin, output_type)`
    SetMode {
        /// Physical pin.
        pin: i32,
        /// Requested output type.
        output_type: OutputType,
    },
    /// `write_digital(pin, state)`
    WriteDigital {
        /// Physical pin.
        pin: i32,
        /// Level written.
        state: bool,
    },
    /// `write_analog(pin, level)`
    WriteAnalog {
        /// Physical pin.
        pin: i32,
        /// Level written.
        level: i32,
    },
}

type CallLog = Arc<Mutex<Vec<ControllerCall>>>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock pin controller.
///
/// Records each call, then succeeds, or fails with
/// [`HardwareError::NotConfigured`] when built with
/// [`failing`](Self::failing).
#[derive(Clone, Debug, Default)]
pub struct MockController {
    calls: CallLog,
    fail: bool,
}

impl MockController {
    /// Creates a mock with an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every primitive return an error after recording the call.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Snapshot of the calls recorded so far.
    pub fn calls(&self) -> Vec<ControllerCall> {
        lock(&self.calls).clone()
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: ControllerCall, pin: i32) -> Result<(), HardwareError> {
        lock(&self.calls).push(call);
        if self.fail {
            Err(HardwareError::NotConfigured(pin))
        } else {
            Ok(())
        }
    }
}

impl PinController for MockController {
    fn set_mode(&mut self, pin: i32, output_type: OutputType) -> Result<(), HardwareError> {
        self.record(ControllerCall::SetMode { pin, output_type }, pin)
    }

    fn write_digital(&mut self, pin: i32, state: bool) -> Result<(), HardwareError> {
        self.record(ControllerCall::WriteDigital { pin, state }, pin)
    }

    fn write_analog(&mut self, pin: i32, level: i32) -> Result<(), HardwareError> {
        self.record(ControllerCall::WriteAnalog { pin, level }, pin)
    }
}

/// Mock binder.
///
/// Binds local pins to [`MockController`]s that all share this binder's call
/// log. Remote pins get nothing, like the real binders.
#[derive(Clone, Debug, Default)]
pub struct MockBinder {
    controller: MockController,
    bound: Arc<Mutex<Vec<(i32, Locality)>>>,
}

impl MockBinder {
    /// Creates a binder with an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made by every controller this binder handed out.
    pub fn calls(&self) -> Vec<ControllerCall> {
        self.controller.calls()
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.controller.clear();
    }

    /// Pins that received a controller, in bind order.
    pub fn bound_pins(&self) -> Vec<(i32, Locality)> {
        lock(&self.bound).clone()
    }
}

impl Binder for MockBinder {
    fn bind(&self, pin: i32, locality: Locality) -> Option<BoxedController> {
        match locality {
            Locality::Local => {
                lock(&self.bound).push((pin, locality));
                Some(Box::new(self.controller.clone()))
            }
            Locality::Remote => None,
        }
    }
}
