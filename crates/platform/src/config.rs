//! Application configuration and constants.
//!
//! This module defines central configuration values used across the mixer
//! engine. Branding and sizing constants live here rather than scattered
//! through the crates that consume them.

/// The application name.
pub const APP_NAME: &str = "Sound Module";

/// The application short name (used in compact displays/logs).
pub const APP_NAME_SHORT: &str = "SoundMod";

/// The application type/category.
pub const APP_TYPE: &str = "Audio Mixer Module";

/// Application version (synchronized with Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Full application title (name + type).
#[must_use]
pub const fn app_title() -> &'static str {
    APP_NAME
}

/// Development mode banner.
#[must_use]
pub const fn dev_banner() -> &'static str {
    "Sound Module - Development Mode"
}

/// Sink sample rate in Hz. Stereo, 16-bit signed, fixed at compile time.
pub const SAMPLE_RATE_HZ: u32 = 44_100;

/// Sink channel count (stereo).
pub const SINK_CHANNELS: u16 = 2;

/// Number of concurrent source slots.
pub const MAX_SOURCES: usize = 4;

/// Per-slot ring buffer capacity, in bytes of 16-bit PCM.
pub const RING_BYTES: usize = 16 * 1024;

/// Output stereo frames produced per mixer tick.
pub const FRAMES_PER_TICK: usize = 512;

/// Input frames read per decoder chunk (before conversion/resampling).
pub const CHUNK_IN_FRAMES: usize = 512;

/// Worst-case resample expansion factor used to size decoder scratch buffers.
///
/// Sufficient for the rate ratios this engine supports (e.g. 22050 -> 44100).
pub const RESAMPLE_EXPANSION_FACTOR: usize = 3;

/// Milliseconds a DRAINING slot waits before transitioning to STOPPED, to
/// exceed the sink's own buffered audio latency.
pub const DRAIN_MS: u64 = 30;

/// Milliseconds between periodic SOUND_STATUS emissions.
pub const STATUS_INTERVAL_MS: u64 = 5_000;

/// Timeout in milliseconds for a single bus receive, so the command adapter
/// can also service periodic status emission.
pub const BUS_RECV_TIMEOUT_MS: u64 = 100;

/// Mixer idle sleep in milliseconds when no slot is PLAYING or the sink isn't ready.
pub const MIXER_IDLE_SLEEP_MS: u64 = 10;
