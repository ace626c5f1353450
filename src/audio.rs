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
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub mod aiff;
pub mod error;
pub mod format;
pub mod import;
mod pcm;
pub mod sampconv;
pub mod traits;
pub mod wav;
pub mod writer;


pub use aiff::{AiffReader, AiffVariant};
pub use error::AudioFileError;
pub use format::{AudioFormat, NumBits, NumChannels, ReaderOptions, SamplingRateLimits};
pub use import::{import_audio_file, import_sample, import_wav_sample, ImportedSample};
pub use traits::AudioFileReader;
pub use wav::WavReader;
pub use writer::{write_aiff, write_aiff_file, write_wav_file, TargetFormat};

/// The audio container formats that can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Aiff,
    Wav,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Aiff => write!(f, "AIFF"),
            FileType::Wav => write!(f, "WAV"),
        }
    }
}

/// Identifies a file type from the first bytes of a file.
pub fn sniff_file_type(header: &[u8]) -> Option<FileType> {
    if header.len() < 12 {
        return None;
    }
    let (id, form_type) = (&header[..4], &header[8..12]);
    if id == aiff::FORM_ID && (form_type == aiff::AIFF_TYPE || form_type == aiff::AIFC_TYPE) {
        Some(FileType::Aiff)
    } else if id == wav::RIFF_ID && form_type == wav::WAVE_ID {
        Some(FileType::Wav)
    } else {
        None
    }
}

/// Identifies a file type from a path's extension.
pub fn file_type_from_extension(path: &Path) -> Option<FileType> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "aif" | "aiff" | "aifc" => Some(FileType::Aiff),
        "wav" | "wave" => Some(FileType::Wav),
        _ => None,
    }
}

/// Determines the type of a file on disk, preferring its contents over its extension.
pub fn detect_file_type(path: &Path) -> Result<Option<FileType>, AudioFileError> {
    let mut header = Vec::with_capacity(12);
    File::open(path)?.take(12).read_to_end(&mut header)?;
    Ok(sniff_file_type(&header).or_else(|| file_type_from_extension(path)))
}

/// Opens a reader for an audio file, automatically detecting the file type.
pub fn open_audio_file<P: AsRef<Path>>(
    path: P,
    options: &ReaderOptions,
) -> Result<Box<dyn AudioFileReader>, AudioFileError> {
    let path = path.as_ref();
    match detect_file_type(path)? {
        Some(FileType::Aiff) => Ok(Box::new(AiffReader::open(path, options)?)),
        Some(FileType::Wav) => Ok(Box::new(WavReader::open(path, options)?)),
        None => Err(AudioFileError::UnrecognizedFileFormat),
    }
}
