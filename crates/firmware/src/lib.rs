//! Firmware entry points for the sound mixing module.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (this crate: main.rs, examples/emulator.rs)
//!         v
//! Protocol Layer (protocol crate — command adapter, mixer task glue)
//!         v
//! Playback Engine (playback crate — decode, mix, ring buffers)
//!         v
//! Platform HAL (platform crate — Storage/Sink/Bus traits)
//! ```
//!
//! # Features
//!
//! - `hardware` - build the `firmware` binary for the STM32 target.
//! - `emulator` - build the desktop demo (`examples/emulator.rs`) on tokio.
//! - `std` - enable standard library support (for the emulator and testing).

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Stub UART command bus for the hardware target; see module docs.
pub mod bus_hardware;
/// Stub I2S/DAC audio sink for the hardware target; see module docs.
pub mod sink_hardware;

#[cfg(feature = "hardware")]
pub mod tasks;
