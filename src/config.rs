//! Deployment configuration.
//!
//! Uses `heapless` containers so the whole configuration is a fixed-size
//! value that can be built at compile time or deserialized with the `serde`
//! feature.
//!
//! # Example
//!
//! ```rust
//! use pinbox::config::{Config, MessengerConfig, PinsConfig, StartupPin};
//! use pinbox::OutputType;
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.messenger.socket_path.as_str(), "/tmp/pbOffApp.socket");
//!
//! // Or customize
//! let config = Config::default()
//!     .with_messenger(MessengerConfig::default().with_socket_path("/run/pinbox.socket"))
//!     .with_pins(PinsConfig::empty().with_startup(StartupPin::digital(100, true)));
//! assert_eq!(config.pins.startup.len(), 1);
//! ```

use heapless::String as HString;
use heapless::Vec as HVec;
use log::warn;

use crate::binding::PinMap;
use crate::messenger::DEFAULT_BUFFER_SIZE;
use crate::traits::OutputType;

/// Maximum length for longer config strings (paths)
pub const MAX_LONG_STRING: usize = 128;

/// Maximum number of pins created at startup
pub const MAX_STARTUP_PINS: usize = 16;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

/// Socket path the stock deployment listens on
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/pbOffApp.socket";

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a LongString from a &str, truncating at a char boundary if too long
pub fn long_string(s: &str) -> LongString {
    let mut hs = LongString::new();
    let take = s.len().min(MAX_LONG_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Socket listener configuration
    pub messenger: MessengerConfig,
    /// Pin wiring and startup states
    pub pins: PinsConfig,
}

impl Config {
    /// Set messenger configuration
    pub fn with_messenger(mut self, messenger: MessengerConfig) -> Self {
        self.messenger = messenger;
        self
    }

    /// Set pin configuration
    pub fn with_pins(mut self, pins: PinsConfig) -> Self {
        self.pins = pins;
        self
    }
}

// ============================================================================
// Messenger Config
// ============================================================================

/// Local socket configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessengerConfig {
    /// Filesystem path of the listening socket
    pub socket_path: LongString,
    /// Read chunk size in bytes
    pub buffer_size: usize,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            socket_path: long_string(DEFAULT_SOCKET_PATH),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl MessengerConfig {
    /// Set the socket path
    pub fn with_socket_path(mut self, path: &str) -> Self {
        self.socket_path = long_string(path);
        self
    }

    /// Set the read chunk size
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}

// ============================================================================
// Pins Config
// ============================================================================

/// A pin created at startup and its first write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartupPin {
    /// Logical pin ID
    pub logical: i32,
    /// Output type
    pub output_type: OutputType,
    /// Written with `digital_write` right after creation
    pub initial_on: bool,
}

impl StartupPin {
    /// A digital pin switched to `initial_on` at startup
    pub const fn digital(logical: i32, initial_on: bool) -> Self {
        Self {
            logical,
            output_type: OutputType::Digital,
            initial_on,
        }
    }

    /// An analog pin switched to full scale or zero at startup
    pub const fn analog(logical: i32, initial_on: bool) -> Self {
        Self {
            logical,
            output_type: OutputType::Analog,
            initial_on,
        }
    }
}

/// Pin wiring and the pins brought up at startup
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinsConfig {
    /// Logical to physical pin table
    pub map: PinMap,
    /// Pins created at startup, in order
    pub startup: HVec<StartupPin, MAX_STARTUP_PINS>,
}

impl Default for PinsConfig {
    /// Four digital pins: 100 on, 101 off, 102 on, 103 off.
    fn default() -> Self {
        Self::empty()
            .with_startup(StartupPin::digital(100, true))
            .with_startup(StartupPin::digital(101, false))
            .with_startup(StartupPin::digital(102, true))
            .with_startup(StartupPin::digital(103, false))
    }
}

impl PinsConfig {
    /// Default wiring, no startup pins
    pub fn empty() -> Self {
        Self {
            map: PinMap::default(),
            startup: HVec::new(),
        }
    }

    /// Set the pin map
    pub fn with_map(mut self, map: PinMap) -> Self {
        self.map = map;
        self
    }

    /// Append a startup pin. Entries past [`MAX_STARTUP_PINS`] are dropped.
    pub fn with_startup(mut self, pin: StartupPin) -> Self {
        if self.startup.push(pin).is_err() {
            warn!("startup pin list full, dropping pin {}", pin.logical);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Locality;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.messenger.socket_path.as_str(), DEFAULT_SOCKET_PATH);
        assert_eq!(config.messenger.buffer_size, 255);
        assert_eq!(config.pins.startup.len(), 4);
        assert_eq!(config.pins.map, PinMap::default());
    }

    #[test]
    fn default_startup_states() {
        let states: Vec<(i32, bool)> = PinsConfig::default()
            .startup
            .iter()
            .map(|p| (p.logical, p.initial_on))
            .collect();
        assert_eq!(states, vec![(100, true), (101, false), (102, true), (103, false)]);
    }

    #[test]
    fn long_string_truncation() {
        let long = "a".repeat(200);
        assert_eq!(long_string(&long).len(), MAX_LONG_STRING);
    }

    #[test]
    fn long_string_respects_char_boundary() {
        let s = format!("{}é", "a".repeat(MAX_LONG_STRING - 1));
        let hs = long_string(&s);
        assert_eq!(hs.len(), MAX_LONG_STRING - 1);
        assert!(hs.chars().all(|c| c == 'a'));
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_messenger(
                MessengerConfig::default()
                    .with_socket_path("/run/pinbox.socket")
                    .with_buffer_size(64),
            )
            .with_pins(
                PinsConfig::empty()
                    .with_map(PinMap::empty().with_entry(1, 2))
                    .with_startup(StartupPin::analog(1, false)),
            );

        assert_eq!(config.messenger.socket_path.as_str(), "/run/pinbox.socket");
        assert_eq!(config.messenger.buffer_size, 64);
        assert_eq!(config.pins.map.resolve(1), (2, Locality::Local));
        assert_eq!(config.pins.startup[0].output_type, OutputType::Analog);
    }

    #[test]
    fn startup_list_is_bounded() {
        let mut pins = PinsConfig::empty();
        for i in 0..(MAX_STARTUP_PINS as i32 + 2) {
            pins = pins.with_startup(StartupPin::digital(i, false));
        }
        assert_eq!(pins.startup.len(), MAX_STARTUP_PINS);
    }
}
