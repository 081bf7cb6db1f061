//! Command message bus abstraction (an automotive-style, fixed-length frame bus).

/// A fixed-length bus frame: 11-bit id, 0..=8 byte payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// 11-bit frame identifier.
    pub id: u16,
    /// Number of valid bytes in `data` (0..=8).
    pub dlc: u8,
    /// Payload bytes; only the first `dlc` are meaningful.
    pub data: [u8; 8],
    /// Extended-id flag (not meaningful to the mixer core; carried through).
    pub extended: bool,
    /// Remote-transmission-request flag (not meaningful to the mixer core).
    pub rtr: bool,
}

impl Frame {
    /// Build a frame with all reserved bytes zeroed, from id and payload.
    ///
    /// # Panics
    ///
    /// Panics if `payload.len() > 8`; callers pass fixed-size arrays so this
    /// is a construction-time programmer error, never a runtime condition.
    #[must_use]
    pub fn new(id: u16, payload: &[u8]) -> Self {
        assert!(payload.len() <= 8, "bus payload exceeds 8 bytes");
        let mut data = [0u8; 8];
        data[..payload.len()].copy_from_slice(payload);
        Self {
            id,
            dlc: payload.len() as u8,
            data,
            extended: false,
            rtr: false,
        }
    }

    /// The valid payload bytes as a slice.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.dlc as usize]
    }
}

/// Message bus abstraction consumed by the command adapter.
pub trait Bus {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Receive a frame, waiting up to `timeout_ms`. Returns `None` on timeout.
    fn bus_recv(
        &mut self,
        timeout_ms: u64,
    ) -> impl core::future::Future<Output = Result<Option<Frame>, Self::Error>>;

    /// Send a frame. Blocks (yields) until accepted by the transceiver.
    fn bus_send(&mut self, frame: &Frame) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::Frame;

    #[test]
    fn frame_new_zeroes_reserved_bytes() {
        let f = Frame::new(0x420, &[1, 2, 3]);
        assert_eq!(f.dlc, 3);
        assert_eq!(f.payload(), &[1, 2, 3]);
        assert_eq!(f.data, [1, 2, 3, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn frame_new_empty_payload() {
        let f = Frame::new(0x424, &[]);
        assert_eq!(f.dlc, 0);
        assert_eq!(f.payload(), &[] as &[u8]);
    }

    #[test]
    #[should_panic(expected = "exceeds 8 bytes")]
    fn frame_new_rejects_oversized_payload() {
        let _ = Frame::new(0x420, &[0u8; 9]);
    }
}
