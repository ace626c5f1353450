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

//! Whole-file sample import.
//!
//! Imported samples are decoded entirely into memory. Truncated files are
//! accepted: the sample keeps the whole frames the file holds and a warning is
//! logged.

use std::path::Path;

use tracing::{info, warn};

use super::error::AudioFileError;
use super::format::{AudioFormat, ReaderOptions};
use super::traits::AudioFileReader;
use super::wav::WavReader;
use crate::util::filename_display;

/// Number of frames decoded per read while importing.
const IMPORT_CHUNK_FRAMES: usize = 4096;

/// A sample decoded entirely into memory.
#[derive(Debug, Clone)]
pub struct ImportedSample {
    /// The format of the file the sample came from.
    pub format: AudioFormat,
    /// Interleaved points followed by one zeroed headroom frame. Holds
    /// `format.frames` frames unless the file is truncated.
    pub data: Vec<f32>,
    /// Whether the file ended before its declared length.
    pub truncated: bool,
}

impl ImportedSample {
    /// Returns the number of frames decoded, not counting the headroom frame.
    pub fn frames(&self) -> usize {
        (self.data.len() / self.format.points_per_frame()).saturating_sub(1)
    }

    /// Returns the interleaved points of the decoded frames, without the trailing headroom frame.
    pub fn points(&self) -> &[f32] {
        &self.data[..self.frames() * self.format.points_per_frame()]
    }

    /// Returns the points of a single frame, or `None` past the headroom frame.
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        let width = self.format.points_per_frame();
        let start = index.checked_mul(width)?;
        self.data.get(start..start.checked_add(width)?)
    }
}

/// Imports a WAV file. Truncation is tolerated regardless of `options.allow_truncated`.
pub fn import_wav_sample<P: AsRef<Path>>(
    path: P,
    options: &ReaderOptions,
) -> Result<ImportedSample, AudioFileError> {
    let path = path.as_ref();
    let options = ReaderOptions {
        allow_truncated: true,
        ..*options
    };
    let reader = WavReader::open(path, &options)?;
    let sample = import_sample(reader)?;
    info!(
        file = filename_display(path),
        format = %sample.format,
        "Imported WAV sample"
    );
    Ok(sample)
}

/// Imports any supported audio file. Truncation is tolerated regardless of
/// `options.allow_truncated`.
pub fn import_audio_file<P: AsRef<Path>>(
    path: P,
    options: &ReaderOptions,
) -> Result<ImportedSample, AudioFileError> {
    let path = path.as_ref();
    let options = ReaderOptions {
        allow_truncated: true,
        ..*options
    };
    let reader = super::open_audio_file(path, &options)?;
    let sample = import_sample(reader)?;
    info!(
        file = filename_display(path),
        format = %sample.format,
        "Imported sample"
    );
    Ok(sample)
}

/// Decodes every frame of a reader into a buffer with one frame of trailing headroom.
/// The buffer is sized by the frames the file's data can supply, so a header that
/// declares more frames than the file holds yields a shorter, flagged sample. A
/// `Truncated` error is absorbed the same way.
pub fn import_sample<R: AudioFileReader>(mut reader: R) -> Result<ImportedSample, AudioFileError> {
    let format = *reader.format();
    let width = format.points_per_frame();
    let frames = reader.frames_available().min(format.frames);
    let total_points = usize::try_from(frames)
        .ok()
        .and_then(|frames| frames.checked_mul(width))
        .ok_or_else(|| {
            AudioFileError::InvalidData(format!("{} frames do not fit in memory", frames))
        })?;

    let mut data = vec![0.0f32; total_points + width];
    let mut position = 0;
    let mut truncated = frames < format.frames;

    while position < total_points {
        let end = (position + IMPORT_CHUNK_FRAMES * width).min(total_points);
        match reader.read_points(&mut data[position..end]) {
            Ok(0) => {
                truncated = true;
                break;
            }
            Ok(n) => position += n,
            Err(AudioFileError::Truncated) => {
                truncated = true;
                break;
            }
            Err(e) => return Err(e),
        }
    }
    truncated |= reader.is_truncated();

    if truncated {
        warn!(
            declared_frames = format.frames,
            available_frames = frames,
            "The file is truncated; only the frames it holds were imported"
        );
    }

    Ok(ImportedSample {
        format,
        data,
        truncated,
    })
}
