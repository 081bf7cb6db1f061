//! Decoder task (C3): reads WAV data, converts/resamples it, and streams
//! 16-bit interleaved PCM into a slot's ring buffer.
//!
//! One decoder runs per active slot and owns that slot's ring + flags for
//! its whole lifetime. It never touches the slot table — `stopping`,
//! `eof_reached`, and the published channel count are the only cross-task
//! state it shares with the mixer.

use platform::File;

use crate::convert::{convert_8_to_16, resample_linear};
use crate::flags::SlotFlags;
use crate::ring_buffer::RingBuffer;
use crate::slot::RING_SAMPLES;
use crate::wav::{self, WavError, WavInfo};

/// Where a decoder reads its WAV bytes from.
pub enum DecodeSource<F: File> {
    /// A storage-backed file, opened by the command adapter before spawning.
    Stream(F),
    /// A `'static` in-memory asset (from the asset registry).
    Memory(&'static [u8]),
}

/// Why a decoder task stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderExit {
    /// Input exhausted with looping off (or disabled after an empty loop).
    Eof,
    /// Observed `flags.stopping` and exited early.
    Stopped,
    /// A read or header-parse error aborted the decode.
    Error,
}

/// Cursor over the PCM payload of a [`DecodeSource`], hiding whether it's a
/// stream or a slice behind one `read`/`seek_set` surface.
enum Cursor<F: File> {
    Stream(F),
    Memory { data: &'static [u8], pos: usize },
}

impl<F: File> Cursor<F> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        match self {
            Self::Stream(f) => f.read(buf).await.map_err(|_| ()),
            Self::Memory { data, pos } => {
                let remaining = data.len().saturating_sub(*pos);
                let n = buf.len().min(remaining);
                #[allow(clippy::indexing_slicing)] // n bounds both slices
                buf[..n].copy_from_slice(&data[*pos..*pos + n]);
                *pos += n;
                Ok(n)
            }
        }
    }

    async fn seek_set(&mut self, abs_offset: u64) -> Result<(), ()> {
        match self {
            Self::Stream(f) => f.seek_set(abs_offset).await.map(|_| ()).map_err(|_| ()),
            Self::Memory { pos, .. } => {
                #[allow(clippy::cast_possible_truncation)] // offsets in this crate fit usize
                {
                    *pos = abs_offset as usize;
                }
                Ok(())
            }
        }
    }
}

/// Resolve the WAV header, preferring a caller-supplied one to avoid a
/// second parse when the command adapter already parsed the asset.
async fn resolve_header<F: File>(
    cursor: &mut Cursor<F>,
    pre_parsed: Option<WavInfo>,
) -> Result<WavInfo, WavError> {
    if let Some(info) = pre_parsed {
        cursor.seek_set(u64::from(info.data_offset)).await.map_err(|()| WavError::Truncated)?;
        return Ok(info);
    }
    match cursor {
        Cursor::Stream(f) => wav::parse_stream(f).await,
        Cursor::Memory { data, pos } => {
            let info = wav::parse_slice(data)?;
            *pos = info.data_offset as usize;
            Ok(info)
        }
    }
}

/// Push `samples` into `ring`, blocking (yielding between retries) until the
/// whole slice has been accepted or `flags.stopping` is observed.
async fn write_all_blocking(ring: &RingBuffer<RING_SAMPLES>, flags: &SlotFlags, samples: &[i16]) -> bool {
    let mut offset = 0usize;
    while offset < samples.len() {
        if flags.is_stopping() {
            return false;
        }
        #[allow(clippy::indexing_slicing)] // offset < samples.len() by loop guard
        let written = ring.write_slice(&samples[offset..]);
        offset += written;
        if written == 0 {
            embassy_futures::yield_now().await;
        }
    }
    true
}

/// Run one decoder to completion, streaming converted PCM into `ring`.
///
/// `loop_enabled` is read once at entry: looping is fixed for a playback's
/// whole lifetime, only stopping it is dynamic.
pub async fn run<F: File>(
    source: DecodeSource<F>,
    pre_parsed_header: Option<WavInfo>,
    loop_enabled: bool,
    ring: &RingBuffer<RING_SAMPLES>,
    flags: &SlotFlags,
) -> DecoderExit {
    let mut cursor = match source {
        DecodeSource::Stream(f) => Cursor::Stream(f),
        DecodeSource::Memory(data) => Cursor::Memory { data, pos: 0 },
    };

    let header = match resolve_header(&mut cursor, pre_parsed_header).await {
        Ok(h) => h,
        Err(_) => {
            flags.eof_reached.store(true, core::sync::atomic::Ordering::Release);
            return DecoderExit::Error;
        }
    };
    #[allow(clippy::cast_possible_truncation)] // channels is validated to 1 or 2 by wav::parse_*
    flags.publish_channels(header.channels as u8);

    let channels = header.channels as usize;
    let bytes_per_sample = (header.bits_per_sample / 8) as usize;
    let chunk_bytes = platform::config::CHUNK_IN_FRAMES * channels * bytes_per_sample;

    let mut raw = [0u8; platform::config::CHUNK_IN_FRAMES * 2 * 2]; // worst case: stereo, 16-bit
    let mut pcm16 = [0i16; platform::config::CHUNK_IN_FRAMES * 2];
    let mut resampled =
        [0i16; platform::config::CHUNK_IN_FRAMES * 2 * platform::config::RESAMPLE_EXPANSION_FACTOR];

    let mut loop_enabled = loop_enabled;
    let mut bytes_remaining = header.data_size as usize;
    let data_offset = u64::from(header.data_offset);

    loop {
        if flags.is_stopping() {
            return DecoderExit::Stopped;
        }

        #[allow(clippy::indexing_slicing)] // want <= raw.len() by construction
        let want = chunk_bytes.min(bytes_remaining).min(raw.len());
        let n = if want == 0 { 0 } else { cursor.read(&mut raw[..want]).await.unwrap_or(0) };

        if n == 0 {
            if loop_enabled {
                if cursor.seek_set(data_offset).await.is_err() {
                    flags.eof_reached.store(true, core::sync::atomic::Ordering::Release);
                    return DecoderExit::Error;
                }
                bytes_remaining = header.data_size as usize;
                let retry_want = chunk_bytes.min(bytes_remaining).min(raw.len());
                #[allow(clippy::indexing_slicing)]
                let retry_n =
                    if retry_want == 0 { 0 } else { cursor.read(&mut raw[..retry_want]).await.unwrap_or(0) };
                if retry_n == 0 {
                    // A fresh seek immediately yielding nothing means the
                    // asset is empty; disable looping so we don't spin.
                    loop_enabled = false;
                    flags.eof_reached.store(true, core::sync::atomic::Ordering::Release);
                    return DecoderExit::Eof;
                }
                bytes_remaining = bytes_remaining.saturating_sub(retry_n);
                #[allow(clippy::indexing_slicing)]
                let ok = decode_and_push(
                    &raw[..retry_n],
                    header,
                    channels,
                    bytes_per_sample,
                    &mut pcm16,
                    &mut resampled,
                    ring,
                    flags,
                )
                .await;
                if !ok {
                    return DecoderExit::Stopped;
                }
                continue;
            }
            flags.eof_reached.store(true, core::sync::atomic::Ordering::Release);
            return DecoderExit::Eof;
        }

        bytes_remaining = bytes_remaining.saturating_sub(n);
        #[allow(clippy::indexing_slicing)]
        let ok = decode_and_push(
            &raw[..n],
            header,
            channels,
            bytes_per_sample,
            &mut pcm16,
            &mut resampled,
            ring,
            flags,
        )
        .await;
        if !ok {
            return DecoderExit::Stopped;
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn decode_and_push(
    raw: &[u8],
    header: WavInfo,
    channels: usize,
    bytes_per_sample: usize,
    pcm16: &mut [i16],
    resampled: &mut [i16],
    ring: &RingBuffer<RING_SAMPLES>,
    flags: &SlotFlags,
) -> bool {
    let frames_in = raw.len() / (channels * bytes_per_sample);
    let pcm_len = frames_in * channels;

    let written_len = if bytes_per_sample == 1 {
        #[allow(clippy::indexing_slicing)] // pcm_len <= pcm16.len() by construction
        convert_8_to_16(raw, &mut pcm16[..pcm_len])
    } else {
        #[allow(clippy::indexing_slicing)]
        for (i, chunk) in raw.chunks_exact(2).enumerate().take(pcm_len) {
            pcm16[i] = i16::from_le_bytes([chunk[0], chunk[1]]);
        }
        pcm_len
    };
    #[allow(clippy::indexing_slicing)]
    let pcm = &pcm16[..written_len];

    if header.sample_rate == platform::config::SAMPLE_RATE_HZ {
        write_all_blocking(ring, flags, pcm).await
    } else {
        let out_frames = resampled.len() / channels;
        #[allow(clippy::indexing_slicing)]
        let written = resample_linear(
            pcm,
            header.sample_rate,
            platform::config::SAMPLE_RATE_HZ,
            channels,
            &mut resampled[..out_frames * channels],
        );
        #[allow(clippy::indexing_slicing)]
        let ok = write_all_blocking(ring, flags, &resampled[..written * channels]).await;
        ok
    }
}
