//! I2S/DAC audio sink stub for the hardware target.
//!
//! This is a placeholder that compiles but never reports readiness, so the
//! mixer never attempts a write against it (see `playback::mixer::tick`,
//! which gates every write on `Engine::set_sink_ready`). The full
//! implementation requires an Embassy I2S/SAI peripheral streaming to the
//! DAC, which is blocked on board bring-up.
//!
//! # TODO
//! Replace `sink_write` with a real DMA transfer once the I2S peripheral is
//! wired, and flip `sink_ready` to reflect the peripheral's actual state.

use platform::Sink;

/// Error type for the hardware audio sink.
#[derive(Debug)]
pub enum HardwareSinkError {
    /// This stub operation is not yet implemented.
    NotImplemented,
}

impl core::fmt::Display for HardwareSinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotImplemented => f.write_str("hardware audio sink not yet implemented"),
        }
    }
}

/// I2S/DAC-backed audio sink — stub implementation.
///
/// Construct with `HardwareSink::new(i2s_peripheral)` once the DAC path is
/// wired. For now `sink_ready` always reports `false`, so the mixer loop
/// never calls `sink_write` against it.
pub struct HardwareSink;

impl HardwareSink {
    /// Create a new (stub) hardware audio sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for HardwareSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for HardwareSink {
    type Error = HardwareSinkError;

    fn sink_ready(&self) -> bool {
        false
    }

    async fn sink_write(&mut self, _frames_le16: &[i16]) -> Result<usize, Self::Error> {
        Err(HardwareSinkError::NotImplemented)
    }
}
