// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! AIFF and AIFF-C reader.
//!
//! An AIFF file is a `FORM` container holding big-endian chunks. Two chunks are
//! required: `COMM` describes the sample data and `SSND` holds it. AIFF-C adds a
//! compression type to `COMM`; only the uncompressed `NONE` type is accepted.
//! Every other chunk is skipped.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, info};

use super::error::AudioFileError;
use super::format::{AudioFormat, NumBits, NumChannels, ReaderOptions, SamplingRateLimits};
use super::pcm::{Endian, PcmEncoding, PcmStream};
use super::traits::AudioFileReader;

pub(crate) const FORM_ID: &[u8; 4] = b"FORM";
pub(crate) const AIFF_TYPE: &[u8; 4] = b"AIFF";
pub(crate) const AIFC_TYPE: &[u8; 4] = b"AIFC";
pub(crate) const COMMON_ID: &[u8; 4] = b"COMM";
pub(crate) const SOUND_DATA_ID: &[u8; 4] = b"SSND";
pub(crate) const FORMAT_VERSION_ID: &[u8; 4] = b"FVER";
pub(crate) const NO_COMPRESSION: &[u8; 4] = b"NONE";

/// The AIFF-C format version timestamp written in `FVER` chunks.
pub(crate) const AIFC_VERSION_1: u32 = 0xA280_5140;

const COMM_SIZE: u32 = 18;
const AIFC_COMM_SIZE: u32 = 22;
const SSND_HEADER_SIZE: u32 = 8;

const EXTENDED_BIAS: i32 = 16383;

/// Which flavor of the container a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiffVariant {
    Aiff,
    Aifc,
}

/// Decodes an 80-bit big-endian IEEE 754 extended precision float.
/// The layout is a sign bit, a 15-bit biased exponent and a 64-bit mantissa
/// with an explicit integer bit.
pub fn decode_extended(bytes: [u8; 10]) -> f64 {
    let sign_exponent = u16::from_be_bytes([bytes[0], bytes[1]]);
    let mut mantissa_bytes = [0u8; 8];
    mantissa_bytes.copy_from_slice(&bytes[2..]);
    let mantissa = u64::from_be_bytes(mantissa_bytes);

    let negative = sign_exponent & 0x8000 != 0;
    let exponent = i32::from(sign_exponent & 0x7fff);

    let magnitude = if exponent == 0 && mantissa == 0 {
        0.0
    } else if exponent == 0x7fff {
        if mantissa << 1 == 0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        // Scale the mantissa into [1, 2) first so the power of two stays in range.
        (mantissa as f64 / 2f64.powi(63)) * 2f64.powi(exponent - EXTENDED_BIAS)
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Encodes a value as an 80-bit big-endian IEEE 754 extended precision float.
/// Every finite `f64` is represented exactly.
pub fn encode_extended(value: f64) -> [u8; 10] {
    let sign: u16 = if value.is_sign_negative() { 0x8000 } else { 0 };
    let magnitude = value.abs();

    let (exponent, mantissa): (u16, u64) = if magnitude == 0.0 {
        (0, 0)
    } else if magnitude.is_nan() {
        (0x7fff, 0xC000_0000_0000_0000)
    } else if magnitude.is_infinite() {
        (0x7fff, 0x8000_0000_0000_0000)
    } else {
        let bits = magnitude.to_bits();
        let biased = ((bits >> 52) & 0x7ff) as i32;
        let fraction = bits & ((1u64 << 52) - 1);
        if biased == 0 {
            // Subnormal doubles have no implicit integer bit; normalize them.
            let shift = fraction.leading_zeros() as i32;
            (
                (EXTENDED_BIAS + 63 - 1074 - shift) as u16,
                fraction << shift,
            )
        } else {
            (
                (biased - 1023 + EXTENDED_BIAS) as u16,
                (1u64 << 63) | (fraction << 11),
            )
        }
    };

    let mut bytes = [0u8; 10];
    bytes[..2].copy_from_slice(&(sign | exponent).to_be_bytes());
    bytes[2..].copy_from_slice(&mantissa.to_be_bytes());
    bytes
}

/// The fields of the `COMM` chunk that matter for decoding.
#[derive(Debug, Clone, Copy)]
struct CommonChunk {
    channels: NumChannels,
    frames: u32,
    bits: NumBits,
    sampling_rate: u32,
}

/// Location of the sample data described by the `SSND` chunk.
#[derive(Debug, Clone, Copy)]
struct SoundData {
    start: u64,
    len: u64,
}

/// A reader that decodes the sample data of an AIFF or AIFF-C file.
pub struct AiffReader<R> {
    pcm: PcmStream<R>,
    format: AudioFormat,
    variant: AiffVariant,
    data_start: u64,
}

impl AiffReader<BufReader<File>> {
    /// Opens an AIFF or AIFF-C file from a path.
    pub fn open<P: AsRef<Path>>(path: P, options: &ReaderOptions) -> Result<Self, AudioFileError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AudioFileError::IoError(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;
        AiffReader::new(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> AiffReader<R> {
    /// Parses the file preamble and positions the reader at the start of the sample data.
    /// The reader must be positioned at the start of the `FORM` header.
    pub fn new(mut reader: R, options: &ReaderOptions) -> Result<Self, AudioFileError> {
        let form_start = reader.stream_position()?;
        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(form_start))?;

        let header: [u8; 12] =
            read_array(&mut reader).map_err(|_| AudioFileError::UnrecognizedFileFormat)?;
        if &header[..4] != FORM_ID {
            return Err(AudioFileError::UnrecognizedFileFormat);
        }
        let form_len = u64::from(u32::from_be_bytes([header[4], header[5], header[6], header[7]]));
        let variant = match &header[8..12] {
            t if t == AIFF_TYPE => AiffVariant::Aiff,
            t if t == AIFC_TYPE => AiffVariant::Aifc,
            _ => return Err(AudioFileError::UnrecognizedFileFormat),
        };

        // The FORM length is not trusted past the end of the stream.
        let form_end = (form_start + 8 + form_len).min(stream_len);

        let mut common: Option<CommonChunk> = None;
        let mut sound: Option<SoundData> = None;

        loop {
            let chunk_start = reader.stream_position()?;
            if chunk_start + 8 > form_end {
                break;
            }
            let chunk_header: [u8; 8] =
                read_array(&mut reader).map_err(AudioFileError::from_header_io)?;
            let id = [chunk_header[0], chunk_header[1], chunk_header[2], chunk_header[3]];
            let len = u32::from_be_bytes([
                chunk_header[4],
                chunk_header[5],
                chunk_header[6],
                chunk_header[7],
            ]);
            let body_start = chunk_start + 8;

            match &id {
                id if id == COMMON_ID => {
                    if common.is_some() {
                        return Err(AudioFileError::UnsupportedVariant(
                            "more than one COMM chunk".to_string(),
                        ));
                    }
                    common = Some(read_common_chunk(
                        &mut reader,
                        len,
                        variant,
                        &options.sampling_rate_limits,
                    )?);
                }
                id if id == SOUND_DATA_ID => {
                    if sound.is_some() {
                        return Err(AudioFileError::UnsupportedVariant(
                            "more than one SSND chunk".to_string(),
                        ));
                    }
                    sound = Some(read_sound_data_header(&mut reader, len, stream_len)?);
                }
                _ => {
                    debug!(
                        chunk = %String::from_utf8_lossy(&id),
                        len,
                        "Skipping AIFF chunk"
                    );
                }
            }

            // Odd-length chunks are followed by a pad byte.
            let len = u64::from(len);
            reader.seek(SeekFrom::Start(body_start + len + (len & 1)))?;
        }

        let common = common.ok_or_else(|| {
            AudioFileError::UnsupportedVariant("missing COMM chunk".to_string())
        })?;
        let sound = sound.ok_or_else(|| {
            AudioFileError::UnsupportedVariant("missing SSND chunk".to_string())
        })?;

        let format = AudioFormat {
            bits: common.bits,
            channels: common.channels,
            sampling_rate: common.sampling_rate,
            frames: u64::from(common.frames),
        };

        info!(
            variant = ?variant,
            channels = format.channels.count(),
            bits = format.bits.bits(),
            sampling_rate = format.sampling_rate,
            frames = format.frames,
            "Opened AIFF file"
        );

        reader.seek(SeekFrom::Start(sound.start))?;
        let encoding = PcmEncoding {
            bits: format.bits,
            endian: Endian::Big,
            unsigned_8: false,
        };
        let pcm = PcmStream::new(
            reader,
            encoding,
            format.channels.count(),
            format.frames,
            sound.len,
            options.allow_truncated,
        );

        Ok(Self {
            pcm,
            format,
            variant,
            data_start: sound.start,
        })
    }

    /// Returns whether the file is plain AIFF or AIFF-C.
    pub fn variant(&self) -> AiffVariant {
        self.variant
    }

    /// Returns the stream position of the first sample byte.
    pub fn data_start(&self) -> u64 {
        self.data_start
    }
}

impl<R: Read + Seek + Send> AudioFileReader for AiffReader<R> {
    fn format(&self) -> &AudioFormat {
        &self.format
    }

    fn frames_remaining(&self) -> u64 {
        self.pcm.frames_remaining()
    }

    fn read_points(&mut self, data: &mut [f32]) -> Result<usize, AudioFileError> {
        self.pcm.read_points(data)
    }

    fn is_truncated(&self) -> bool {
        self.pcm.is_truncated()
    }

    fn frames_available(&self) -> u64 {
        self.pcm.frames_available()
    }
}

fn read_common_chunk<R: Read>(
    reader: &mut R,
    len: u32,
    variant: AiffVariant,
    limits: &SamplingRateLimits,
) -> Result<CommonChunk, AudioFileError> {
    let required = match variant {
        AiffVariant::Aiff => COMM_SIZE,
        AiffVariant::Aifc => AIFC_COMM_SIZE,
    };
    if len < required {
        return Err(AudioFileError::UnsupportedVariant(format!(
            "COMM chunk is {} bytes, expected at least {}",
            len, required
        )));
    }

    let fields: [u8; 18] = read_array(reader).map_err(AudioFileError::from_header_io)?;

    let channel_count = u16::from_be_bytes([fields[0], fields[1]]);
    let channels = NumChannels::from_count(channel_count)
        .ok_or(AudioFileError::UnsupportedNumberOfChannels(channel_count))?;

    let frames = u32::from_be_bytes([fields[2], fields[3], fields[4], fields[5]]);

    let sample_size = u16::from_be_bytes([fields[6], fields[7]]);
    let bits = NumBits::from_aiff_sample_size(sample_size)
        .ok_or(AudioFileError::UnsupportedNumberOfBits(sample_size))?;

    let mut rate = [0u8; 10];
    rate.copy_from_slice(&fields[8..18]);
    let sampling_rate = limits.clamp(decode_extended(rate));

    if variant == AiffVariant::Aifc {
        let compression: [u8; 4] = read_array(reader).map_err(AudioFileError::from_header_io)?;
        if &compression != NO_COMPRESSION {
            return Err(AudioFileError::NotUncompressedPcm);
        }
        // The compression name that follows is a padded Pascal string. It is only
        // logged; the caller seeks past whatever is left of the chunk.
        if len > AIFC_COMM_SIZE {
            let [name_len]: [u8; 1] =
                read_array(reader).map_err(AudioFileError::from_header_io)?;
            let name_len = usize::from(name_len).min((len - AIFC_COMM_SIZE - 1) as usize);
            let mut name = vec![0u8; name_len];
            reader
                .read_exact(&mut name)
                .map_err(AudioFileError::from_header_io)?;
            debug!(
                compression_name = %String::from_utf8_lossy(&name),
                "AIFF-C compression"
            );
        }
    }

    Ok(CommonChunk {
        channels,
        frames,
        bits,
        sampling_rate,
    })
}

fn read_sound_data_header<R: Read + Seek>(
    reader: &mut R,
    len: u32,
    stream_len: u64,
) -> Result<SoundData, AudioFileError> {
    if len < SSND_HEADER_SIZE {
        return Err(AudioFileError::UnsupportedVariant(format!(
            "SSND chunk is only {} bytes",
            len
        )));
    }

    let fields: [u8; 8] = read_array(reader).map_err(AudioFileError::from_header_io)?;
    let offset = u32::from_be_bytes([fields[0], fields[1], fields[2], fields[3]]);
    let block_size = u32::from_be_bytes([fields[4], fields[5], fields[6], fields[7]]);
    if offset != 0 || block_size != 0 {
        return Err(AudioFileError::UnsupportedVariant(format!(
            "block-aligned sound data (offset {}, block size {})",
            offset, block_size
        )));
    }

    let start = reader.stream_position()?;
    let data_len = u64::from(len - SSND_HEADER_SIZE);
    if data_len > stream_len.saturating_sub(start) {
        return Err(AudioFileError::Truncated);
    }

    Ok(SoundData {
        start,
        len: data_len,
    })
}

fn read_array<const N: usize, R: Read>(reader: &mut R) -> std::io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
