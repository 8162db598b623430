//! Logger setup for binaries.
//!
//! The library only emits through the `log` facade; whoever runs it picks
//! the backend. [`init_logger`] installs `env_logger`, honouring `RUST_LOG`
//! and defaulting to `info`.

use log::LevelFilter;

/// Install `env_logger`. Safe to call more than once; later calls do nothing.
pub fn init_logger() {
    let mut builder = env_logger::Builder::from_default_env();

    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(LevelFilter::Info);
    }

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        )
    });

    let _ = builder.try_init();
}
