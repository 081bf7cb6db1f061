//! Audio sink abstraction: the real-time output boundary the mixer writes to.
//!
//! The sink format is fixed at compile time (stereo, 16-bit signed PCM at
//! [`crate::config::SAMPLE_RATE_HZ`]) — there is no runtime reconfiguration.

/// A fixed-format stereo 16-bit PCM audio output.
pub trait Sink {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Whether the sink can currently accept writes.
    ///
    /// Gates the mixer's first write; once observed `true` the mixer does
    /// not re-check before every tick.
    fn sink_ready(&self) -> bool;

    /// Write interleaved stereo 16-bit samples at [`crate::config::SAMPLE_RATE_HZ`].
    ///
    /// `frames_le16` holds `bytes / 2` `i16` samples (L, R interleaved).
    /// Blocks (yields, on an async executor) until the sink has accepted
    /// some or all of the data; returns the number of bytes actually
    /// consumed.
    fn sink_write(
        &mut self,
        frames_le16: &[i16],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;
}
