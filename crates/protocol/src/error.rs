//! Protocol-level error codes carried in `SOUND_ACK`/`SOUND_STATUS` payloads.

/// Error code reported to the external controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[repr(u8)]
pub enum ErrorCode {
    /// No error.
    #[error("ok")]
    Ok = 0,
    /// Neither storage nor the asset registry has the requested sound.
    #[error("sound not found in storage or asset registry")]
    FileNotFound = 1,
    /// Storage I/O failed while resolving or reading a sound.
    #[error("storage I/O error")]
    StorageError = 2,
    /// Reserved; currently unused.
    #[error("module busy")]
    Busy = 3,
    /// `sound_index` not present in any map.
    #[error("invalid sound index")]
    InvalidIndex = 4,
    /// No free slot and `INTERRUPT` was not set.
    #[error("no free source slot")]
    MixerFull = 5,
    /// `STOP_SOUND` referenced a `queue_id` with no matching slot.
    #[error("unknown queue id")]
    InvalidQueueId = 6,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_values_match_wire_contract() {
        assert_eq!(ErrorCode::Ok as u8, 0);
        assert_eq!(ErrorCode::FileNotFound as u8, 1);
        assert_eq!(ErrorCode::StorageError as u8, 2);
        assert_eq!(ErrorCode::Busy as u8, 3);
        assert_eq!(ErrorCode::InvalidIndex as u8, 4);
        assert_eq!(ErrorCode::MixerFull as u8, 5);
        assert_eq!(ErrorCode::InvalidQueueId as u8, 6);
    }
}
