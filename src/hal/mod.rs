//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Recording test doubles for desktop development
//! - `rpi`: Raspberry Pi header pins through `rppal` (requires `rpi` feature)

pub mod mock;

#[cfg(feature = "rpi")]
pub mod rpi;

pub use mock::*;
