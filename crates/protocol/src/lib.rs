//! Command protocol and adapter task (C6).
//!
//! Defines the fixed-layout bus frames the module speaks to its external
//! controller (`frame`), the error codes those frames carry (`error`), and
//! the adapter task that dispatches them against a `playback::Engine`
//! (`adapter`). `spawn` abstracts decoder-task creation so the adapter stays
//! generic over storage backends without needing a generic Embassy task.
//!
//! # Features
//!
//! - `std`: enable standard library support (desktop/emulator, testing),
//!   pulling in `tokio` for [`spawn::TokioSpawner`].

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod error;
pub mod frame;
pub mod spawn;
pub mod tasks;

pub use adapter::{CommandAdapter, FinishedChannel};
pub use error::ErrorCode;
pub use tasks::run_mixer_loop;

/// `Engine::new` owns process-wide `StaticCell`s, so at most one `Engine`
/// may exist per test binary. Every test module in this crate shares the
/// instance this returns instead of constructing its own.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::OnceLock;

    use playback::Engine;

    pub fn engine() -> &'static Engine {
        static ENGINE: OnceLock<Engine> = OnceLock::new();
        ENGINE.get_or_init(Engine::new)
    }
}
