//! Multi-source WAV playback and mixing engine (C3-C5).
//!
//! Owns the lock-free ring buffers, the fixed-size slot table, the decoder
//! task body, and the periodic mixer tick that drains every playing slot
//! into a single PCM stream for the sink. See `engine::Engine` for the
//! entry point a command adapter or firmware binary wires up.
//!
//! # Features
//!
//! - `std`: enable standard library support (desktop/emulator, testing).

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod convert;
pub mod decoder;
pub mod engine;
pub mod flags;
pub mod mixer;
pub mod ring_buffer;
pub mod slot;
pub mod volume;
pub mod wav;

pub use decoder::{DecodeSource, DecoderExit};
pub use engine::{CreateSourceError, Engine};
pub use slot::{FinishReason, SlotChannel, SlotState};
