//! Set of output pins addressed by logical ID.
//!
//! [`PinBank`] owns the pins a deployment drives and executes decoded
//! [`PinCommand`]s against them. It is the piece the socket handler feeds.
//!
//! # Example
//!
//! ```rust
//! use pinbox::hal::MockBinder;
//! use pinbox::{OutputType, PinBank, PinFactory, PinMap};
//!
//! let mut bank = PinBank::new(PinFactory::new(PinMap::default(), MockBinder::new()));
//! bank.add(100, OutputType::Digital);
//! bank.add(102, OutputType::Analog);
//!
//! let applied = bank.handle_message("digital 100 on\nanalog 102 300\nd 555 on\n");
//! assert_eq!(applied, 2);
//! assert_eq!(bank.get(100).map(|p| p.current_state()), Some(1024));
//! assert_eq!(bank.get(102).map(|p| p.current_state()), Some(300));
//! ```

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::binding::PinFactory;
use crate::commands::{parse_message, PinCommand};
use crate::config::StartupPin;
use crate::error::CommandError;
use crate::output::OutputPin;
use crate::traits::{Binder, OutputType};

/// Output pins keyed by logical ID.
///
/// Dropping the bank drops every pin, which switches each one off.
pub struct PinBank<B: Binder> {
    factory: PinFactory<B>,
    pins: BTreeMap<i32, OutputPin>,
}

impl<B: Binder> PinBank<B> {
    /// Create an empty bank that builds pins through `factory`.
    pub fn new(factory: PinFactory<B>) -> Self {
        Self {
            factory,
            pins: BTreeMap::new(),
        }
    }

    /// Create the pin for `logical` and register it.
    ///
    /// A pin already registered under `logical` is dropped first, which
    /// switches it off.
    pub fn add(&mut self, logical: i32, output_type: OutputType) -> &mut OutputPin {
        if self.pins.remove(&logical).is_some() {
            debug!("replacing pin {}", logical);
        }
        let pin = self.factory.create(logical, output_type);
        self.pins.entry(logical).or_insert(pin)
    }

    /// Create each startup pin in order and give it its first write.
    pub fn start(&mut self, startup: &[StartupPin]) {
        for pin in startup {
            self.add(pin.logical, pin.output_type)
                .digital_write(pin.initial_on);
        }
        debug!("{} startup pin(s) ready", startup.len());
    }

    /// Pin registered under `logical`.
    pub fn get(&self, logical: i32) -> Option<&OutputPin> {
        self.pins.get(&logical)
    }

    /// Mutable pin registered under `logical`.
    pub fn get_mut(&mut self, logical: i32) -> Option<&mut OutputPin> {
        self.pins.get_mut(&logical)
    }

    /// Registered logical IDs in ascending order.
    pub fn logical_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.pins.keys().copied()
    }

    /// Number of registered pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// True if no pin is registered.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Execute one command.
    pub fn apply(&mut self, cmd: PinCommand) -> Result<(), CommandError> {
        let pin = self
            .pins
            .get_mut(&cmd.pin())
            .ok_or(CommandError::UnknownPin(cmd.pin()))?;
        match cmd {
            PinCommand::Digital { state, .. } => pin.digital_write(state),
            PinCommand::Analog { level, .. } => pin.analog_write(level),
        }
        Ok(())
    }

    /// Decode a message and execute every valid command in it.
    ///
    /// Malformed lines and unknown pins are logged and skipped. Returns the
    /// number of commands executed.
    pub fn handle_message(&mut self, text: &str) -> usize {
        let mut applied = 0;
        for parsed in parse_message(text) {
            match parsed.and_then(|cmd| self.apply(cmd)) {
                Ok(()) => applied += 1,
                Err(e) => warn!("ignoring command: {}", e),
            }
        }
        applied
    }
}
