//! Raspberry Pi pin controller daemon.
//!
//! This is the main entry point for the board. It:
//! - Acquires the GPIO controller (fatal if unavailable)
//! - Brings up the configured startup pins
//! - Listens on the configured Unix socket and executes each message's
//!   pin commands
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features rpi
//! ```
//!
//! # Sending commands
//!
//! ```bash
//! printf 'digital 100 off\nanalog 102 512\n' | nc -U -N /tmp/pbOffApp.socket
//! ```

use log::{debug, error, info};
use pinbox::hal::rpi::{initialize_core, RpiBinder};
use pinbox::logging::init_logger;
use pinbox::{Config, InputMessenger, PinBank, PinFactory};

fn main() -> anyhow::Result<()> {
    init_logger();

    // =========================================================================
    // Configuration
    // =========================================================================
    let config = Config::default();

    // =========================================================================
    // Hardware
    // =========================================================================
    initialize_core()?;

    let mut bank = PinBank::new(PinFactory::new(config.pins.map.clone(), RpiBinder));
    bank.start(&config.pins.startup);
    info!("{} pins ready", bank.len());

    // =========================================================================
    // Socket
    // =========================================================================
    let mut messenger = InputMessenger::new(config.messenger.socket_path.as_str(), |text: &str| {
        debug!("message: {:?}", text);
        let applied = bank.handle_message(text);
        info!("applied {} command(s)", applied);
    })
    .with_buffer_size(config.messenger.buffer_size);

    if messenger.error_id() != 0 {
        anyhow::bail!(
            "messenger failed to start (error {}): {}",
            messenger.error_id(),
            messenger
                .last_error()
                .map(ToString::to_string)
                .unwrap_or_default()
        );
    }

    messenger.run_loop();

    if let Some(e) = messenger.last_error() {
        error!("run loop ended (error {}): {}", messenger.error_id(), e);
    }

    Ok(())
}
