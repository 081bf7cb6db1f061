//! Property-based tests for audio domain newtypes.
//! Verifies invariants hold for ALL valid inputs, not just fixed examples.

use platform::audio_types::{QueueId, SoundIndex, VolumePercent};

proptest::proptest! {
    /// VolumePercent::new never panics for any u8 input (clamps to 100).
    #[test]
    fn volume_percent_new_never_panics(pct in 0u8..=255u8) {
        let v = VolumePercent::new(pct);
        assert!(v.get() <= 100);
    }

    /// VolumePercent::try_new agrees with the clamping constructor on valid input.
    #[test]
    fn volume_percent_try_new_matches_new_in_range(pct in 0u8..=100u8) {
        let clamped = VolumePercent::new(pct);
        let strict = VolumePercent::try_new(pct).expect("0..=100 is always valid");
        assert_eq!(clamped.get(), strict.get());
    }

    /// VolumePercent::try_new rejects exactly the values new() would clamp.
    #[test]
    fn volume_percent_try_new_rejects_above_100(pct in 101u16..=255u16) {
        let pct = pct as u8;
        assert!(VolumePercent::try_new(pct).is_err());
    }

    /// QueueId::next never yields 0, for any starting id.
    #[test]
    fn queue_id_next_never_untagged(raw in 0u8..=255u8) {
        let next = QueueId::new(raw).next();
        assert_ne!(next.get(), 0);
    }

    /// SoundIndex::is_unset is true iff the raw value is 0xFFFF.
    #[test]
    fn sound_index_unset_iff_sentinel(raw in 0u16..=u16::MAX) {
        let idx = SoundIndex::new(raw);
        assert_eq!(idx.is_unset(), raw == 0xFFFF);
    }
}
