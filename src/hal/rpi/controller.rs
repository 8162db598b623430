//! Local pin controller on the Raspberry Pi GPIO header.
//!
//! Each bound pin gets its own [`RpiController`], which claims the BCM line
//! as an output in `set_mode` and keeps it for the life of the pin.
//!
//! Analog levels are produced with software PWM:
//! - level <= 0: PWM off, line low
//! - level >= 1024: PWM off, line high
//! - otherwise: duty cycle `level / 1024` at [`RpiController::PWM_FREQUENCY_HZ`]

use log::debug;
use rppal::gpio::{Gpio, OutputPin as GpioOutput};

use super::pins::wiring_pi_to_bcm;
use crate::error::HardwareError;
use crate::traits::{
    Binder, BoxedController, Locality, OutputType, PinController, ANALOG_FULL_SCALE,
};

/// Primitives for one header pin.
pub struct RpiController {
    gpio: Option<&'static Gpio>,
    line: Option<GpioOutput>,
}

impl RpiController {
    /// Software PWM frequency used for analog writes.
    pub const PWM_FREQUENCY_HZ: f64 = 1000.0;

    /// Controller on the process-wide GPIO handle.
    ///
    /// If [`initialize_core`](super::initialize_core) has not succeeded, every
    /// primitive reports [`HardwareError::NotInitialized`].
    pub fn new() -> Self {
        Self {
            gpio: super::gpio(),
            line: None,
        }
    }

    fn line(&mut self, pin: i32) -> Result<&mut GpioOutput, HardwareError> {
        self.line.as_mut().ok_or(HardwareError::NotConfigured(pin))
    }
}

impl Default for RpiController {
    fn default() -> Self {
        Self::new()
    }
}

impl PinController for RpiController {
    fn set_mode(&mut self, pin: i32, output_type: OutputType) -> Result<(), HardwareError> {
        let gpio = self.gpio.ok_or(HardwareError::NotInitialized)?;
        let bcm = wiring_pi_to_bcm(pin).ok_or(HardwareError::UnmappedPin(pin))?;
        let line = gpio.get(bcm)?.into_output_low();
        debug!(
            "wiringPi {} (BCM {}) configured as {} output",
            pin,
            bcm,
            output_type.as_str()
        );
        self.line = Some(line);
        Ok(())
    }

    fn write_digital(&mut self, pin: i32, state: bool) -> Result<(), HardwareError> {
        let line = self.line(pin)?;
        if state {
            line.set_high();
        } else {
            line.set_low();
        }
        Ok(())
    }

    fn write_analog(&mut self, pin: i32, level: i32) -> Result<(), HardwareError> {
        let line = self.line(pin)?;
        if level <= 0 {
            line.clear_pwm()?;
            line.set_low();
        } else if level >= ANALOG_FULL_SCALE {
            line.clear_pwm()?;
            line.set_high();
        } else {
            let duty = f64::from(level) / f64::from(ANALOG_FULL_SCALE);
            line.set_pwm_frequency(Self::PWM_FREQUENCY_HZ, duty)?;
        }
        Ok(())
    }
}

/// Binds local pins to [`RpiController`]s.
///
/// Remote pins get no primitives.
#[derive(Clone, Copy, Debug, Default)]
pub struct RpiBinder;

impl Binder for RpiBinder {
    fn bind(&self, _pin: i32, locality: Locality) -> Option<BoxedController> {
        match locality {
            Locality::Local => Some(Box::new(RpiController::new())),
            // TODO: bind the UART-attached expander once its wire protocol exists.
            Locality::Remote => None,
        }
    }
}
