//! RIFF/WAVE header parsing (C1).
//!
//! Reads little-endian RIFF/WAVE with chunk walking. Chunks between `fmt `
//! and `data` are skipped; `fmt ` and `data` may appear in either order.

use platform::File;

/// Parsed WAV format descriptor and data-region locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    /// Sample rate in Hz, as declared in the `fmt ` chunk.
    pub sample_rate: u32,
    /// Channel count: 1 (mono) or 2 (stereo).
    pub channels: u16,
    /// Bits per sample: 8 or 16.
    pub bits_per_sample: u16,
    /// Absolute byte offset of the first data byte.
    pub data_offset: u32,
    /// Declared length of the `data` chunk, in bytes.
    pub data_size: u32,
}

/// Errors returned while parsing a WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavError {
    /// The first four bytes were not `RIFF`.
    NotRiff,
    /// The RIFF form type was not `WAVE`.
    NotWave,
    /// No `fmt ` chunk was found before the scan bound.
    NoFmt,
    /// No `data` chunk was found before the scan bound.
    NoData,
    /// `fmt ` declared a format other than PCM, or channels/bits outside
    /// the supported set.
    UnsupportedFormat,
    /// The byte stream or slice ended before a required field was read.
    Truncated,
}

impl core::fmt::Display for WavError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::NotRiff => "missing RIFF magic",
            Self::NotWave => "missing WAVE form type",
            Self::NoFmt => "no fmt chunk found",
            Self::NoData => "no data chunk found",
            Self::UnsupportedFormat => "unsupported format code, channels, or bit depth",
            Self::Truncated => "input ended before header was fully read",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WavError {}

/// Safety bound for [`parse_slice`]: reject malformed assets rather than
/// scanning an unbounded byte slice looking for chunk headers.
const SLICE_SCAN_BOUND: usize = 1024;

struct FmtFields {
    channels: u16,
    bits_per_sample: u16,
    sample_rate: u32,
}

fn validate_fmt(format_code: u16, channels: u16, bits_per_sample: u16) -> Result<(), WavError> {
    if format_code != 1 {
        return Err(WavError::UnsupportedFormat);
    }
    if !matches!(channels, 1 | 2) {
        return Err(WavError::UnsupportedFormat);
    }
    if !matches!(bits_per_sample, 8 | 16) {
        return Err(WavError::UnsupportedFormat);
    }
    Ok(())
}

// SAFETY: body.len() >= 16 is checked immediately above every index below.
#[allow(clippy::indexing_slicing)]
fn parse_fmt_chunk(body: &[u8]) -> Result<FmtFields, WavError> {
    if body.len() < 16 {
        return Err(WavError::Truncated);
    }
    let format_code = u16::from_le_bytes([body[0], body[1]]);
    let channels = u16::from_le_bytes([body[2], body[3]]);
    let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
    let bits_per_sample = u16::from_le_bytes([body[14], body[15]]);
    validate_fmt(format_code, channels, bits_per_sample)?;
    Ok(FmtFields { channels, bits_per_sample, sample_rate })
}

/// Parse a WAV header from an in-memory byte slice.
///
/// Scans at most [`SLICE_SCAN_BOUND`] bytes looking for `fmt ` and `data`;
/// malformed assets that don't surface both chunks within that bound are
/// rejected rather than scanned indefinitely.
///
/// # Errors
///
/// See [`WavError`].
// SAFETY: every index below is preceded by an explicit length/bound check
// (the initial len() < 12 guard, and the `pos + 8 <= bound` loop condition).
#[allow(clippy::indexing_slicing, clippy::cast_possible_truncation)]
pub fn parse_slice(bytes: &[u8]) -> Result<WavInfo, WavError> {
    if bytes.len() < 12 {
        return Err(WavError::Truncated);
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(WavError::NotRiff);
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(WavError::NotWave);
    }

    let bound = bytes.len().min(SLICE_SCAN_BOUND);
    let mut pos = 12usize;
    let mut fmt: Option<FmtFields> = None;
    let mut data_offset = None;
    let mut data_size = None;

    while pos.saturating_add(8) <= bound {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]]);
        let body_start = pos + 8;

        if id == b"fmt " {
            let body_end = body_start.saturating_add(size as usize).min(bytes.len());
            fmt = Some(parse_fmt_chunk(&bytes[body_start..body_end])?);
        } else if id == b"data" {
            data_offset = Some(body_start as u32);
            data_size = Some(size);
            if fmt.is_some() {
                break;
            }
        }

        // Chunks are word-aligned; odd-sized chunks carry one pad byte.
        let advance = (size as usize).saturating_add(size as usize % 2);
        pos = body_start.saturating_add(advance);
    }

    let fmt = fmt.ok_or(WavError::NoFmt)?;
    let data_offset = data_offset.ok_or(WavError::NoData)?;
    let data_size = data_size.ok_or(WavError::NoData)?;

    Ok(WavInfo {
        sample_rate: fmt.sample_rate,
        channels: fmt.channels,
        bits_per_sample: fmt.bits_per_sample,
        data_offset,
        data_size,
    })
}

/// Parse a WAV header from a seekable byte stream.
///
/// Consumes the 12-byte RIFF header, then walks chunks until both `fmt ` and
/// `data` are seen, skipping unknown chunks by seeking past their body.
/// Leaves the reader positioned at the first data byte.
///
/// # Errors
///
/// See [`WavError`]. I/O errors from `reader` are reported as [`WavError::Truncated`].
// SAFETY: chunk_header/body reads are always checked (`n < 8`/`n < body_len`)
// before the bytes they filled are indexed.
#[allow(clippy::indexing_slicing, clippy::cast_possible_truncation)]
pub async fn parse_stream<R: File>(reader: &mut R) -> Result<WavInfo, WavError> {
    let mut header = [0u8; 12];
    read_exact(reader, &mut header).await?;
    if &header[0..4] != b"RIFF" {
        return Err(WavError::NotRiff);
    }
    if &header[8..12] != b"WAVE" {
        return Err(WavError::NotWave);
    }

    let mut pos: u64 = 12;
    let mut fmt: Option<FmtFields> = None;
    let mut data_offset = None;
    let mut data_size = None;

    loop {
        let mut chunk_header = [0u8; 8];
        reader.seek_set(pos).await.map_err(|_| WavError::Truncated)?;
        let n = reader.read(&mut chunk_header).await.map_err(|_| WavError::Truncated)?;
        if n < 8 {
            break;
        }
        let id = &chunk_header[0..4];
        let size = u32::from_le_bytes([chunk_header[4], chunk_header[5], chunk_header[6], chunk_header[7]]);
        let body_start = pos.saturating_add(8);

        if id == b"fmt " {
            let mut body = [0u8; 16];
            let body_len = (size as usize).min(16);
            reader.seek_set(body_start).await.map_err(|_| WavError::Truncated)?;
            let n = reader.read(&mut body[..body_len]).await.map_err(|_| WavError::Truncated)?;
            if n < body_len {
                return Err(WavError::Truncated);
            }
            fmt = Some(parse_fmt_chunk(&body)?);
        } else if id == b"data" {
            data_offset = Some(body_start);
            data_size = Some(size);
            if fmt.is_some() {
                break;
            }
        }

        let advance = u64::from(size).saturating_add(u64::from(size) % 2);
        pos = body_start.saturating_add(advance);
    }

    let fmt = fmt.ok_or(WavError::NoFmt)?;
    let data_offset = data_offset.ok_or(WavError::NoData)?;
    let data_size = data_size.ok_or(WavError::NoData)?;

    reader.seek_set(data_offset).await.map_err(|_| WavError::Truncated)?;

    Ok(WavInfo {
        sample_rate: fmt.sample_rate,
        channels: fmt.channels,
        bits_per_sample: fmt.bits_per_sample,
        data_offset: data_offset as u32,
        data_size,
    })
}

async fn read_exact<R: File>(reader: &mut R, buf: &mut [u8]) -> Result<(), WavError> {
    let n = reader.read(buf).await.map_err(|_| WavError::Truncated)?;
    if n < buf.len() {
        return Err(WavError::Truncated);
    }
    Ok(())
}
