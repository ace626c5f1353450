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
use std::io::{self, Read};

use tracing::debug;

use super::error::AudioFileError;
use super::format::NumBits;
use super::sampconv;

/// Byte order of the samples in a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Big,
    Little,
}

/// How integer samples are laid out in a file's data chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PcmEncoding {
    pub bits: NumBits,
    pub endian: Endian,
    /// 8-bit samples carry a +128 bias.
    pub unsigned_8: bool,
}

impl PcmEncoding {
    fn decode(&self, bytes: &[u8]) -> f32 {
        match (self.bits, self.endian) {
            (NumBits::Eight, _) if self.unsigned_8 => sampconv::unsigned_8_to_float(bytes[0]),
            (NumBits::Eight, _) => sampconv::signed_8_to_float(bytes[0] as i8),
            (NumBits::Sixteen, Endian::Big) => {
                sampconv::signed_16_to_float(i16::from_be_bytes([bytes[0], bytes[1]]))
            }
            (NumBits::Sixteen, Endian::Little) => {
                sampconv::signed_16_to_float(i16::from_le_bytes([bytes[0], bytes[1]]))
            }
            (NumBits::TwentyFour, Endian::Big) => {
                sampconv::signed_24_to_float(sampconv::be_24_to_i32([bytes[0], bytes[1], bytes[2]]))
            }
            (NumBits::TwentyFour, Endian::Little) => {
                sampconv::signed_24_to_float(sampconv::le_24_to_i32([bytes[0], bytes[1], bytes[2]]))
            }
        }
    }
}

/// Reads interleaved frames from a data chunk that starts at the reader's
/// current position, converting them to normalized floats.
pub(crate) struct PcmStream<R> {
    reader: R,
    encoding: PcmEncoding,
    channels: usize,
    frames_remaining: u64,
    // Bytes left in the data chunk; reads never run past it into the next chunk.
    bytes_remaining: u64,
    allow_truncated: bool,
    truncated: bool,
    // Raw bytes for the frames being decoded, reused between reads.
    buffer: Vec<u8>,
}

impl<R: Read> PcmStream<R> {
    pub fn new(
        reader: R,
        encoding: PcmEncoding,
        channels: u16,
        frames: u64,
        data_bytes: u64,
        allow_truncated: bool,
    ) -> Self {
        Self {
            reader,
            encoding,
            channels: usize::from(channels),
            frames_remaining: frames,
            bytes_remaining: data_bytes,
            allow_truncated,
            truncated: false,
            buffer: Vec::new(),
        }
    }

    pub fn frames_remaining(&self) -> u64 {
        self.frames_remaining
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Frames that can still be read in full from the data chunk.
    pub fn frames_available(&self) -> u64 {
        let frame_bytes = (self.encoding.bits.bytes() * self.channels) as u64;
        self.frames_remaining.min(self.bytes_remaining / frame_bytes)
    }

    pub fn read_points(&mut self, data: &mut [f32]) -> Result<usize, AudioFileError> {
        let requested = (data.len() / self.channels) as u64;
        let frames = requested.min(self.frames_remaining) as usize;
        if frames == 0 {
            return Ok(0);
        }

        let points = frames * self.channels;
        let point_bytes = self.encoding.bits.bytes();
        let frame_bytes = point_bytes * self.channels;
        let wanted = frames * frame_bytes;
        let available = usize::try_from(self.bytes_remaining)
            .unwrap_or(usize::MAX)
            .min(wanted);

        self.buffer.resize(wanted, 0);
        let got = read_fully(&mut self.reader, &mut self.buffer[..available])?;
        self.bytes_remaining -= got as u64;

        // A partial trailing frame is dropped along with the missing ones.
        let whole_frames = got / frame_bytes;
        let decoded = whole_frames * self.channels;
        for (point, bytes) in data[..decoded]
            .iter_mut()
            .zip(self.buffer[..decoded * point_bytes].chunks_exact(point_bytes))
        {
            *point = self.encoding.decode(bytes);
        }

        if whole_frames < frames {
            data[decoded..points].fill(0.0);
            self.frames_remaining = 0;
            debug!(
                expected_frames = frames,
                read_frames = whole_frames,
                "Audio data ended early"
            );
            if !self.allow_truncated {
                return Err(AudioFileError::Truncated);
            }
            self.truncated = true;
            return Ok(points);
        }

        self.frames_remaining -= frames as u64;
        Ok(points)
    }
}

/// Reads until `buf` is full or the reader is exhausted.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
