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
use std::io;

/// Error types for audio file decoding and encoding.
/// The messages are suitable for showing directly to a user.
#[derive(Debug, thiserror::Error)]
pub enum AudioFileError {
    #[error("The file is not in a recognized audio file format")]
    UnrecognizedFileFormat,

    #[error("The file uses an unsupported variant of its format: {0}")]
    UnsupportedVariant(String),

    #[error("Only mono and stereo files are supported (file has {0} channels)")]
    UnsupportedNumberOfChannels(u16),

    #[error("Only 8, 16 and 24-bit files are supported (file has {0} bits)")]
    UnsupportedNumberOfBits(u16),

    #[error("The file contains compressed audio data; only uncompressed PCM is supported")]
    NotUncompressedPcm,

    #[error("The file is not a PCM file (format code {0})")]
    NotAPcmFile(u16),

    #[error("The file appears to be truncated")]
    Truncated,

    #[error("Invalid audio data: {0}")]
    InvalidData(String),

    #[error("WAV encoding error: {0}")]
    WavError(#[from] hound::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl AudioFileError {
    /// Maps an I/O error raised while parsing a header. Running out of bytes
    /// means the file ended early; anything else is passed through.
    pub(crate) fn from_header_io(e: io::Error) -> AudioFileError {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            AudioFileError::Truncated
        } else {
            AudioFileError::IoError(e)
        }
    }
}
