//! Command-protocol frame encode/decode (C6 wire format).
//!
//! Frames are fixed-length bus frames (`platform::Frame`): an 11-bit id and
//! a 0..=8 byte payload, little-endian multi-byte fields, all reserved
//! bytes zeroed on emit and ignored on receive.

use platform::{Frame, QueueId, SoundIndex};

use crate::error::ErrorCode;

/// Frame ids this module knows about.
pub mod id {
    /// Boot/query response describing the module.
    pub const MODULE_ANNOUNCE: u16 = 0x410;
    /// Request a [`super::id::MODULE_ANNOUNCE`] reply.
    pub const MODULE_QUERY: u16 = 0x411;
    /// Start a playback.
    pub const PLAY_SOUND: u16 = 0x420;
    /// Stop a tagged playback.
    pub const STOP_SOUND: u16 = 0x421;
    /// Periodic module status.
    pub const SOUND_STATUS: u16 = 0x422;
    /// Response to `PLAY_SOUND`/`STOP_SOUND`.
    pub const SOUND_ACK: u16 = 0x423;
    /// Stop every playing slot.
    pub const STOP_ALL: u16 = 0x424;
    /// Emitted once per tagged playback when it terminates.
    pub const SOUND_FINISHED: u16 = 0x425;
}

const FLAG_INTERRUPT: u8 = 1 << 0;
const FLAG_HIGH_PRIORITY: u8 = 1 << 1;
const FLAG_LOOP: u8 = 1 << 2;

/// Decoded `PLAY_SOUND` (`0x420`) payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaySoundCmd {
    /// Sound to resolve (storage path, then asset registry fallback).
    pub sound_index: SoundIndex,
    /// Bit 0 of `flags`: stop every other slot before starting this one.
    pub interrupt: bool,
    /// Bit 1 of `flags`: advisory, not enforced by the mixer.
    pub high_priority: bool,
    /// Bit 2 of `flags`: restart at EOF instead of finishing.
    pub loop_enabled: bool,
    /// Per-source volume override, `None` when the byte was `0xFF`.
    pub volume: Option<u8>,
    /// Echoed back in the `SOUND_ACK`.
    pub request_id: u16,
}

impl PlaySoundCmd {
    /// Decode a `PLAY_SOUND` frame's payload.
    ///
    /// Returns `None` if the payload is shorter than the 6 bytes this
    /// command needs (`FrameMalformed` at the call site).
    #[must_use]
    pub fn decode(frame: &Frame) -> Option<Self> {
        let p = frame.payload();
        if p.len() < 6 {
            return None;
        }
        // SAFETY: p.len() >= 6 checked above.
        #[allow(clippy::indexing_slicing)]
        {
            let sound_index = u16::from_le_bytes([p[0], p[1]]);
            let flags = p[2];
            let volume_raw = p[3];
            let request_id = u16::from_le_bytes([p[4], p[5]]);
            Some(Self {
                sound_index: SoundIndex::new(sound_index),
                interrupt: flags & FLAG_INTERRUPT != 0,
                high_priority: flags & FLAG_HIGH_PRIORITY != 0,
                loop_enabled: flags & FLAG_LOOP != 0,
                volume: if volume_raw == 0xFF { None } else { Some(volume_raw) },
                request_id,
            })
        }
    }
}

/// Decoded `STOP_SOUND` (`0x421`) payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopSoundCmd {
    /// Slot to stop, identified by its external tag.
    pub queue_id: QueueId,
    /// Echoed back in the `SOUND_ACK`.
    pub request_id: u16,
}

impl StopSoundCmd {
    /// Decode a `STOP_SOUND` frame's payload.
    #[must_use]
    pub fn decode(frame: &Frame) -> Option<Self> {
        let p = frame.payload();
        if p.len() < 5 {
            return None;
        }
        // SAFETY: p.len() >= 5 checked above.
        #[allow(clippy::indexing_slicing)]
        {
            let queue_id = p[0];
            let request_id = u16::from_le_bytes([p[3], p[4]]);
            Some(Self { queue_id: QueueId::new(queue_id), request_id })
        }
    }
}

/// Build a `MODULE_ANNOUNCE` (`0x410`) frame.
///
/// Payload: `[module_type, version_major, version_minor, capabilities,
/// can_block=0x42, node_id, 0, 0]`.
#[must_use]
pub fn module_announce(module_type: u8, version_major: u8, version_minor: u8, capabilities: u8, node_id: u8) -> Frame {
    Frame::new(
        id::MODULE_ANNOUNCE,
        &[module_type, version_major, version_minor, capabilities, 0x42, node_id, 0, 0],
    )
}

/// Build a `SOUND_STATUS` (`0x422`) frame.
///
/// Payload: `[state_bits, current_sound_lo, current_sound_hi, error_code,
/// volume, uptime_lo, uptime_hi, 0]`.
#[must_use]
pub fn sound_status(state_bits: u8, current_sound: SoundIndex, error: ErrorCode, volume: u8, uptime_s: u16) -> Frame {
    let sound = current_sound.get().to_le_bytes();
    let uptime = uptime_s.to_le_bytes();
    Frame::new(id::SOUND_STATUS, &[state_bits, sound[0], sound[1], error as u8, volume, uptime[0], uptime[1], 0])
}

/// Build a `SOUND_ACK` (`0x423`) frame.
///
/// Payload: `[ok, sound_index_lo, sound_index_hi, queue_id, error_code,
/// request_id_lo, request_id_hi, 0]`.
#[must_use]
pub fn sound_ack(ok: bool, sound_index: SoundIndex, queue_id: QueueId, error: ErrorCode, request_id: u16) -> Frame {
    let sound = sound_index.get().to_le_bytes();
    let request = request_id.to_le_bytes();
    Frame::new(
        id::SOUND_ACK,
        &[u8::from(ok), sound[0], sound[1], queue_id.get(), error as u8, request[0], request[1], 0],
    )
}

/// Reason a tagged playback reached `SOUND_FINISHED`, wire-encoded as
/// `0=completed, 1=stopped, 2=error`.
#[must_use]
pub fn finish_reason_code(reason: playback::FinishReason) -> u8 {
    match reason {
        playback::FinishReason::Completed => 0,
        playback::FinishReason::Stopped => 1,
        playback::FinishReason::Error => 2,
    }
}

/// Build a `SOUND_FINISHED` (`0x425`) frame.
///
/// Payload: `[queue_id, sound_index_lo, sound_index_hi, reason, 0, 0, 0, 0]`.
#[must_use]
pub fn sound_finished(queue_id: QueueId, sound_index: SoundIndex, reason: playback::FinishReason) -> Frame {
    let sound = sound_index.get().to_le_bytes();
    Frame::new(id::SOUND_FINISHED, &[queue_id.get(), sound[0], sound[1], finish_reason_code(reason), 0, 0, 0, 0])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn play_sound_decodes_flags_and_fields() {
        let frame = Frame::new(id::PLAY_SOUND, &[1, 0, 0b101, 50, 7, 0]);
        let cmd = PlaySoundCmd::decode(&frame).expect("payload is long enough");
        assert_eq!(cmd.sound_index.get(), 1);
        assert!(cmd.interrupt);
        assert!(!cmd.high_priority);
        assert!(cmd.loop_enabled);
        assert_eq!(cmd.volume, Some(50));
        assert_eq!(cmd.request_id, 7);
    }

    #[test]
    fn play_sound_volume_0xff_means_use_external() {
        let frame = Frame::new(id::PLAY_SOUND, &[1, 0, 0, 0xFF, 0, 0]);
        let cmd = PlaySoundCmd::decode(&frame).expect("payload is long enough");
        assert_eq!(cmd.volume, None);
    }

    #[test]
    fn play_sound_rejects_short_payload() {
        let frame = Frame::new(id::PLAY_SOUND, &[1, 0]);
        assert!(PlaySoundCmd::decode(&frame).is_none());
    }

    #[test]
    fn stop_sound_decodes_queue_id_and_request_id() {
        let frame = Frame::new(id::STOP_SOUND, &[9, 0, 0, 3, 0]);
        let cmd = StopSoundCmd::decode(&frame).expect("payload is long enough");
        assert_eq!(cmd.queue_id.get(), 9);
        assert_eq!(cmd.request_id, 3);
    }

    #[test]
    fn module_announce_payload_matches_wire_layout() {
        let frame = module_announce(0x01, 0, 1, 0b111, 5);
        assert_eq!(frame.payload(), &[0x01, 0, 1, 0b111, 0x42, 5, 0, 0]);
    }

    #[test]
    fn sound_ack_encodes_ok_and_ids() {
        let frame = sound_ack(true, SoundIndex::new(10), QueueId::new(3), ErrorCode::Ok, 42);
        let p = frame.payload();
        assert_eq!(p[0], 1);
        assert_eq!(u16::from_le_bytes([p[1], p[2]]), 10);
        assert_eq!(p[3], 3);
        assert_eq!(p[4], ErrorCode::Ok as u8);
        assert_eq!(u16::from_le_bytes([p[5], p[6]]), 42);
    }

    #[test]
    fn sound_finished_encodes_reason() {
        let frame = sound_finished(QueueId::new(2), SoundIndex::new(7), playback::FinishReason::Stopped);
        let p = frame.payload();
        assert_eq!(p[0], 2);
        assert_eq!(u16::from_le_bytes([p[1], p[2]]), 7);
        assert_eq!(p[3], 1);
    }
}
