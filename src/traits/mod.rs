//! Trait definitions for hardware abstraction.
//!
//! This module defines the seam that lets pinbox:
//! - Run on a Raspberry Pi through `rppal`
//! - Run tests on a desktop against recording mocks
//! - Grow a remote pin transport later without touching [`OutputPin`]
//!
//! # Hardware Abstraction
//!
//! - [`PinController`]: set mode, digital write, analog write
//! - [`Binder`]: resolves a [`Locality`] into a [`PinController`]
//!
//! [`OutputPin`]: crate::OutputPin

pub mod hardware;

pub use hardware::*;
