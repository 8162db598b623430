//! # pinbox
//!
//! Output pin controller for single-board computers, driven by text
//! messages over a local Unix socket.
//!
//! ## Features
//!
//! - **Pin abstraction**: digital and analog outputs behind one [`OutputPin`]
//!   type, bound once to the primitives of their locality
//! - **Logical addressing**: callers use logical IDs; a [`PinMap`] wires them
//!   to header pins, anything unmapped is treated as a remote pin
//! - **Socket messenger**: one message per connection, handled synchronously
//!   with cooperative stop
//! - **Command decoding**: `digital <id> on` / `analog <id> <level>` lines
//!   executed by a [`PinBank`]
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Pin controller and binder abstractions
//! - `pin` - Pin identity and lifecycle
//! - `output` - Output pins
//! - `binding` - Logical-to-physical mapping and pin construction
//! - `messenger` - Local socket listener
//! - `commands` / `bank` - Message decoding and execution
//! - `hal` - Concrete implementations (mock for testing, rpi for hardware)
//!
//! ## Example
//!
//! ```rust
//! use pinbox::{hal::MockBinder, OutputType, PinFactory, PinMap, Pin};
//!
//! // Create a factory with mock primitives
//! let factory = PinFactory::new(PinMap::default(), MockBinder::new());
//!
//! // Logical 100 is header pin 0 on this board
//! let mut lamp = factory.create(100, OutputType::Digital);
//! assert_eq!(lamp.pin_num(), 0);
//!
//! lamp.digital_write(true);
//! assert_eq!(lamp.current_state(), 1024);
//!
//! // Unmapped IDs are remote and inert
//! let mut far = factory.create(999, OutputType::Digital);
//! far.digital_write(true);
//! assert_eq!(far.current_state(), 0);
//! ```

#![warn(missing_docs)]

/// Pin collection that executes decoded commands.
pub mod bank;
/// Logical-to-physical pin mapping and pin construction.
pub mod binding;
/// Text command decoding.
pub mod commands;
/// Deployment configuration.
pub mod config;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Logger setup for binaries.
pub mod logging;
/// Local socket listener.
pub mod messenger;
/// Output pins.
pub mod output;
/// Pin identity and lifecycle.
pub mod pin;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use bank::PinBank;
pub use binding::{PinFactory, PinMap, PinMapping};
pub use commands::PinCommand;
pub use config::{Config, MessengerConfig, PinsConfig, StartupPin};
pub use error::{CommandError, HardwareError, MessengerError};
pub use messenger::{InputMessenger, StopHandle};
pub use output::OutputPin;
pub use pin::{Pin, PinCore, PinLifecycle};
pub use traits::{Binder, BoxedController, Locality, OutputType, PinController};
