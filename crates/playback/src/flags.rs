//! Cross-task flags shared between a decoder and the mixer for one slot.
//!
//! These are the only fields the decoder and mixer touch without going
//! through the slot table's mutex: the decoder publishes `channels` once
//! (right after parsing the WAV header) and `eof_reached` once (when input
//! is exhausted and looping is off or has been disabled), and polls
//! `stopping`, which the mixer (via the slot table) sets on `STOP_SOUND`,
//! `STOP_ALL`, or a reclaiming `PLAY_SOUND`.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Shared, lock-free state between a slot's decoder task and the mixer.
pub struct SlotFlags {
    /// Set by the mixer/command adapter; observed by the decoder to exit.
    pub stopping: AtomicBool,
    /// Set by the decoder once input is exhausted (and not looping).
    pub eof_reached: AtomicBool,
    /// Decoded channel count (1 or 2), 0 until the WAV header is parsed.
    channels: AtomicU8,
}

impl SlotFlags {
    /// A fresh flag block for a slot about to start decoding.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stopping: AtomicBool::new(false),
            eof_reached: AtomicBool::new(false),
            channels: AtomicU8::new(0),
        }
    }

    /// Reset to the pre-decode state, ready for reuse by a new playback.
    pub fn reset(&self) {
        self.stopping.store(false, Ordering::Relaxed);
        self.eof_reached.store(false, Ordering::Relaxed);
        self.channels.store(0, Ordering::Relaxed);
    }

    /// `true` once the mixer/adapter has asked the decoder to stop.
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// `true` once the decoder has exhausted its input.
    pub fn is_eof(&self) -> bool {
        self.eof_reached.load(Ordering::Acquire)
    }

    /// Decoder: publish the channel count parsed from the WAV header.
    pub fn publish_channels(&self, channels: u8) {
        self.channels.store(channels, Ordering::Release);
    }

    /// Mixer: read the published channel count, `0` if not yet known.
    pub fn channels(&self) -> u8 {
        self.channels.load(Ordering::Acquire)
    }
}

impl Default for SlotFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean() {
        let flags = SlotFlags::new();
        assert!(!flags.is_stopping());
        assert!(!flags.is_eof());
        assert_eq!(flags.channels(), 0);
    }

    #[test]
    fn publish_and_read_channels() {
        let flags = SlotFlags::new();
        flags.publish_channels(2);
        assert_eq!(flags.channels(), 2);
    }

    #[test]
    fn reset_clears_all_fields() {
        let flags = SlotFlags::new();
        flags.stopping.store(true, Ordering::Relaxed);
        flags.eof_reached.store(true, Ordering::Relaxed);
        flags.publish_channels(1);
        flags.reset();
        assert!(!flags.is_stopping());
        assert!(!flags.is_eof());
        assert_eq!(flags.channels(), 0);
    }
}
