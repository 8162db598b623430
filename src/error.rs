//! Error types for pin hardware, the socket messenger and command decoding.

use std::io;
use std::path::PathBuf;

/// `EINVAL` on Linux; reported for addresses the OS never sees.
pub const EINVAL: i32 = 22;

/// Failure of a hardware controller primitive or of hardware setup.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The process-wide controller was used before `initialize_core`.
    #[error("hardware controller not initialized")]
    NotInitialized,

    /// The physical pin has no line on this header.
    #[error("physical pin {0} is not on the header")]
    UnmappedPin(i32),

    /// A write reached a pin whose mode was never set.
    #[error("physical pin {0} has not been configured as an output")]
    NotConfigured(i32),

    /// Error from the GPIO peripheral.
    #[cfg(feature = "rpi")]
    #[error(transparent)]
    Gpio(#[from] rppal::gpio::Error),
}

/// Failure while setting up or serving the local socket.
#[derive(Debug, thiserror::Error)]
pub enum MessengerError {
    /// No socket address was given.
    #[error("socket address is empty")]
    EmptyAddress,

    /// The socket could not be created.
    #[error("failed to create socket: {0}")]
    Socket(#[source] io::Error),

    /// The socket could not be bound to its path.
    #[error("failed to bind {}: {source}", path.display())]
    Bind {
        /// Path that was being bound.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The bound socket could not be put into listening state.
    #[error("failed to listen on {}: {source}", path.display())]
    Listen {
        /// Bound path.
        path: PathBuf,
        /// Underlying OS error.
        source: io::Error,
    },

    /// Accepting a connection failed. Terminal for the run loop.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// Reading a connection failed. The message is dropped.
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
}

impl MessengerError {
    /// errno-equivalent code for this error, never 0.
    ///
    /// ```
    /// use pinbox::MessengerError;
    ///
    /// assert_eq!(MessengerError::EmptyAddress.code(), 22);
    /// ```
    pub fn code(&self) -> i32 {
        let source = match self {
            MessengerError::EmptyAddress => return EINVAL,
            MessengerError::Bind { source, .. } | MessengerError::Listen { source, .. } => source,
            MessengerError::Socket(source)
            | MessengerError::Accept(source)
            | MessengerError::Read(source) => source,
        };
        match source.raw_os_error() {
            Some(code) if code != 0 => code,
            _ if source.kind() == io::ErrorKind::InvalidInput => EINVAL,
            _ => -1,
        }
    }
}

/// A line of a message that could not be turned into a pin write.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line had no tokens.
    #[error("empty command")]
    Empty,

    /// The first token is not a known command.
    #[error("unknown command '{0}'")]
    UnknownVerb(String),

    /// A required argument is missing.
    #[error("missing {0}")]
    MissingArgument(&'static str),

    /// The pin argument is not an integer.
    #[error("invalid pin '{0}'")]
    InvalidPin(String),

    /// The value argument is not a valid level for the command.
    #[error("invalid level '{0}'")]
    InvalidLevel(String),

    /// No pin is registered under this logical ID.
    #[error("no pin with logical id {0}")]
    UnknownPin(i32),
}
