//! Raspberry Pi hardware abstraction layer.
//!
//! Drives header pins through `rppal`. Physical pin numbers handed to this
//! backend use wiringPi numbering, which [`pins::wiring_pi_to_bcm`] turns
//! into BCM GPIO lines.
//!
//! # Setup
//!
//! Call [`initialize_core`] once before creating any pin. Failure means the
//! GPIO peripheral is unavailable and the process cannot drive anything.
//!
//! ```ignore
//! use pinbox::hal::rpi::initialize_core;
//! use pinbox::{OutputPin, OutputType};
//!
//! initialize_core()?;
//! let mut lamp = OutputPin::factory(100, OutputType::Digital);
//! lamp.digital_write(true);
//! ```

mod controller;

pub use controller::{RpiBinder, RpiController};

use log::info;
use once_cell::sync::OnceCell;
use rppal::gpio::Gpio;

use crate::error::HardwareError;

static GPIO: OnceCell<Gpio> = OnceCell::new();

/// Acquire the GPIO peripheral for this process.
///
/// Idempotent: later calls return immediately once the first succeeded.
/// There is no matching teardown.
pub fn initialize_core() -> Result<(), HardwareError> {
    GPIO.get_or_try_init(|| {
        let gpio = Gpio::new()?;
        info!("GPIO controller acquired");
        Ok::<_, HardwareError>(gpio)
    })?;
    Ok(())
}

/// The process-wide GPIO handle, if [`initialize_core`] has succeeded.
pub(crate) fn gpio() -> Option<&'static Gpio> {
    GPIO.get()
}

/// Header pin numbering for the Raspberry Pi Model B rev 2.
pub mod pins {
    /// BCM GPIO line for each wiringPi pin number, indexed by wiringPi number.
    ///
    /// 17 to 20 are the P5 header.
    pub const WIRING_PI_TO_BCM: [u8; 21] = [
        17, 18, 27, 22, 23, 24, 25, 4, // 0-7
        2, 3, // 8-9: I2C
        8, 7, // 10-11: SPI CE0/CE1
        10, 9, 11, // 12-14: SPI MOSI/MISO/SCLK
        14, 15, // 15-16: UART
        28, 29, 30, 31, // 17-20: P5
    ];

    /// BCM line for a wiringPi pin number, `None` if the header has no such pin.
    ///
    /// ```ignore
    /// use pinbox::hal::rpi::pins::wiring_pi_to_bcm;
    ///
    /// assert_eq!(wiring_pi_to_bcm(0), Some(17));
    /// assert_eq!(wiring_pi_to_bcm(7), Some(4));
    /// assert_eq!(wiring_pi_to_bcm(21), None);
    /// ```
    pub fn wiring_pi_to_bcm(pin: i32) -> Option<u8> {
        usize::try_from(pin)
            .ok()
            .and_then(|idx| WIRING_PI_TO_BCM.get(idx).copied())
    }

}
