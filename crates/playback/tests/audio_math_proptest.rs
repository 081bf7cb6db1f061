//! Property-based tests for the mix-path arithmetic and the WAV header
//! parser. Fixed-example tests colocated with each module check specific
//! cases; these check the invariants hold for the whole input space.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use playback::convert::resample_linear;
use playback::volume::{saturate_i16, scale};
use playback::wav;

fn build_wav(channels: u16, bits: u16, sample_rate: u32, data: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(b"RIFF");
    v.extend_from_slice(&0u32.to_le_bytes());
    v.extend_from_slice(b"WAVE");
    v.extend_from_slice(b"fmt ");
    v.extend_from_slice(&16u32.to_le_bytes());
    v.extend_from_slice(&1u16.to_le_bytes());
    v.extend_from_slice(&channels.to_le_bytes());
    v.extend_from_slice(&sample_rate.to_le_bytes());
    let byte_rate = sample_rate * u32::from(channels) * u32::from(bits) / 8;
    v.extend_from_slice(&byte_rate.to_le_bytes());
    let block_align = channels * bits / 8;
    v.extend_from_slice(&block_align.to_le_bytes());
    v.extend_from_slice(&bits.to_le_bytes());
    v.extend_from_slice(b"data");
    v.extend_from_slice(&(u32::try_from(data.len()).unwrap()).to_le_bytes());
    v.extend_from_slice(data);
    v
}

proptest::proptest! {
    /// `resample_linear` never writes more frames than the output buffer
    /// can hold, for any in/out rate pair and any frame-aligned buffer sizes.
    #[test]
    fn resample_linear_output_never_exceeds_capacity(
        in_rate in 4_000u32..200_000u32,
        out_rate in 4_000u32..200_000u32,
        channels in 1usize..=2usize,
        in_frames in 0usize..64usize,
        out_frames in 0usize..64usize,
    ) {
        let input = vec![0i16; in_frames * channels];
        let mut out = vec![0i16; out_frames * channels];
        let n = resample_linear(&input, in_rate, out_rate, channels, &mut out);
        assert!(n <= out_frames);
    }

    /// `resample_linear` never invents samples past what the input holds.
    #[test]
    fn resample_linear_never_exceeds_input_frames(
        in_rate in 4_000u32..200_000u32,
        out_rate in 4_000u32..200_000u32,
        channels in 1usize..=2usize,
        in_frames in 0usize..64usize,
    ) {
        let input = vec![0i16; in_frames * channels];
        let mut out = vec![0i16; 256 * channels];
        let n = resample_linear(&input, in_rate, out_rate, channels, &mut out);
        assert!(n <= in_frames);
    }

    /// `saturate_i16` always returns a value representable as `i16`, for any
    /// wide-accumulator input.
    #[test]
    fn saturate_i16_stays_in_range(value in i32::MIN..=i32::MAX) {
        let s = saturate_i16(value);
        assert!(i32::from(s) >= i32::from(i16::MIN));
        assert!(i32::from(s) <= i32::from(i16::MAX));
    }

    /// `saturate_i16` is the identity for values already in `i16` range.
    #[test]
    fn saturate_i16_is_identity_in_range(value in i32::from(i16::MIN)..=i32::from(i16::MAX)) {
        assert_eq!(i32::from(saturate_i16(value)), value);
    }

    /// Raising the volume percentage never shrinks the magnitude of a
    /// scaled sample: `scale` is monotonic in its volume argument.
    #[test]
    fn scale_is_monotonic_in_volume(sample in -30_000i32..=30_000i32, v1 in 0u8..=100u8, v2 in 0u8..=100u8) {
        let (lo, hi) = if v1 <= v2 { (v1, v2) } else { (v2, v1) };
        let lo_scaled = scale(sample, lo).abs();
        let hi_scaled = scale(sample, hi).abs();
        assert!(lo_scaled <= hi_scaled);
    }

    /// A `WavInfo` round-trips through a header built from the same fields:
    /// parsing an encoded header recovers exactly what was encoded.
    #[test]
    fn wav_header_round_trips_through_parse(
        channels in proptest::prop_oneof![proptest::strategy::Just(1u16), proptest::strategy::Just(2u16)],
        bits in proptest::prop_oneof![proptest::strategy::Just(8u16), proptest::strategy::Just(16u16)],
        sample_rate in 8_000u32..192_000u32,
        data_len in 0usize..256usize,
    ) {
        let data = vec![0u8; data_len];
        let bytes = build_wav(channels, bits, sample_rate, &data);
        let info = wav::parse_slice(&bytes).expect("well-formed header always parses");
        assert_eq!(info.channels, channels);
        assert_eq!(info.bits_per_sample, bits);
        assert_eq!(info.sample_rate, sample_rate);
        assert_eq!(info.data_size as usize, data_len);
        assert_eq!(&bytes[info.data_offset as usize..], data.as_slice());
    }
}
