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
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, info};

use super::error::AudioFileError;
use super::format::{AudioFormat, NumBits, NumChannels, ReaderOptions};
use super::pcm::{Endian, PcmEncoding, PcmStream};
use super::traits::AudioFileReader;

pub(crate) const RIFF_ID: &[u8; 4] = b"RIFF";
pub(crate) const WAVE_ID: &[u8; 4] = b"WAVE";
const FMT_ID: &[u8; 4] = b"fmt ";
const DATA_ID: &[u8; 4] = b"data";

const WAVE_FORMAT_PCM: u16 = 1;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;
const FMT_SIZE: u32 = 16;
const EXTENSIBLE_FMT_SIZE: u32 = 40;

/// Bytes 2..16 shared by every `KSDATAFORMAT_SUBTYPE_*` GUID.
const SUBFORMAT_GUID_TAIL: [u8; 14] = [
    0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

/// The PCM format chunk.
#[derive(Debug, Clone, Copy)]
struct FormatChunk {
    channels: NumChannels,
    sample_rate: u32,
    bits: NumBits,
}

/// A reader that decodes the sample data of a RIFF/WAVE PCM file.
/// 8-bit samples are stored unsigned, 16 and 24-bit samples signed little-endian.
pub struct WavReader<R> {
    pcm: PcmStream<R>,
    format: AudioFormat,
}

impl WavReader<BufReader<File>> {
    /// Opens a WAV file from a path.
    pub fn open<P: AsRef<Path>>(path: P, options: &ReaderOptions) -> Result<Self, AudioFileError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AudioFileError::IoError(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;
        WavReader::new(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> WavReader<R> {
    /// Parses the RIFF header up to the start of the `data` chunk.
    pub fn new(mut reader: R, options: &ReaderOptions) -> Result<Self, AudioFileError> {
        let mut header = [0u8; 12];
        reader
            .read_exact(&mut header)
            .map_err(|_| AudioFileError::UnrecognizedFileFormat)?;
        if &header[..4] != RIFF_ID || &header[8..12] != WAVE_ID {
            return Err(AudioFileError::UnrecognizedFileFormat);
        }

        let mut fmt: Option<FormatChunk> = None;
        let data_len = loop {
            let mut chunk_header = [0u8; 8];
            if let Err(e) = reader.read_exact(&mut chunk_header) {
                // Running out of chunks before the format is known means this isn't a usable WAV.
                return Err(match fmt {
                    None => AudioFileError::UnrecognizedFileFormat,
                    Some(_) => AudioFileError::from_header_io(e),
                });
            }
            let id = &chunk_header[..4];
            let len = u32::from_le_bytes([
                chunk_header[4],
                chunk_header[5],
                chunk_header[6],
                chunk_header[7],
            ]);

            if id == FMT_ID {
                fmt = Some(read_format_chunk(&mut reader, len)?);
            } else if id == DATA_ID {
                if fmt.is_none() {
                    return Err(AudioFileError::UnrecognizedFileFormat);
                }
                break len;
            } else {
                debug!(
                    chunk = %String::from_utf8_lossy(id),
                    len,
                    "Skipping WAV chunk"
                );
                let len = i64::from(len);
                reader.seek(SeekFrom::Current(len + (len & 1)))?;
            }
        };

        let fmt = fmt.ok_or(AudioFileError::UnrecognizedFileFormat)?;
        let frame_bytes = fmt.bits.bytes() * usize::from(fmt.channels.count());
        let format = AudioFormat {
            bits: fmt.bits,
            channels: fmt.channels,
            sampling_rate: options
                .sampling_rate_limits
                .clamp(f64::from(fmt.sample_rate)),
            frames: u64::from(data_len) / frame_bytes as u64,
        };

        info!(
            channels = format.channels.count(),
            bits = format.bits.bits(),
            sampling_rate = format.sampling_rate,
            frames = format.frames,
            "Opened WAV file"
        );

        // Streaming writers leave the data length at its maximum.
        let data_start = reader.stream_position()?;
        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(data_start))?;
        let data_bytes = u64::from(data_len).min(stream_len.saturating_sub(data_start));

        let encoding = PcmEncoding {
            bits: format.bits,
            endian: Endian::Little,
            unsigned_8: true,
        };
        let pcm = PcmStream::new(
            reader,
            encoding,
            format.channels.count(),
            format.frames,
            data_bytes,
            options.allow_truncated,
        );

        Ok(Self { pcm, format })
    }
}

impl<R: Read + Seek + Send> AudioFileReader for WavReader<R> {
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

fn read_format_chunk<R: Read + Seek>(
    reader: &mut R,
    len: u32,
) -> Result<FormatChunk, AudioFileError> {
    if len < FMT_SIZE {
        return Err(AudioFileError::UnrecognizedFileFormat);
    }

    let mut fields = [0u8; 16];
    reader
        .read_exact(&mut fields)
        .map_err(AudioFileError::from_header_io)?;
    let mut consumed = FMT_SIZE;

    let mut format_code = u16::from_le_bytes([fields[0], fields[1]]);
    if format_code == WAVE_FORMAT_EXTENSIBLE && len >= EXTENSIBLE_FMT_SIZE {
        let mut extension = [0u8; 24];
        reader
            .read_exact(&mut extension)
            .map_err(AudioFileError::from_header_io)?;
        consumed = EXTENSIBLE_FMT_SIZE;

        // The sub-format GUID starts with the real format code.
        let guid = &extension[8..24];
        if guid[2..] == SUBFORMAT_GUID_TAIL {
            format_code = u16::from_le_bytes([guid[0], guid[1]]);
        }
    }

    let rest = i64::from(len - consumed) + (i64::from(len) & 1);
    if rest > 0 {
        reader.seek(SeekFrom::Current(rest))?;
    }

    if format_code != WAVE_FORMAT_PCM {
        return Err(AudioFileError::NotAPcmFile(format_code));
    }

    let channel_count = u16::from_le_bytes([fields[2], fields[3]]);
    let channels = NumChannels::from_count(channel_count)
        .ok_or(AudioFileError::UnsupportedNumberOfChannels(channel_count))?;

    let sample_rate = u32::from_le_bytes([fields[4], fields[5], fields[6], fields[7]]);
    // Bytes 8..14 hold the byte rate and block alignment, which follow from the rest.
    let bits_per_sample = u16::from_le_bytes([fields[14], fields[15]]);
    let bits = NumBits::try_from(bits_per_sample)
        .map_err(|_| AudioFileError::UnsupportedNumberOfBits(bits_per_sample))?;

    Ok(FormatChunk {
        channels,
        sample_rate,
        bits,
    })
}
