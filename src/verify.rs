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
use std::path::{Path, PathBuf};

use tracing::error;

use crate::audio::{self, AudioFileError, AudioFileReader, ReaderOptions};
use crate::util::filename_display;

/// Frames decoded per read while checking.
const CHECK_CHUNK_FRAMES: usize = 4096;

/// The outcome of checking one file: its frame count, or why it can't be decoded.
#[derive(Debug)]
pub struct FileCheck {
    pub path: PathBuf,
    pub result: Result<u64, AudioFileError>,
}

/// Result of checking a set of files.
#[derive(Debug, Default)]
pub struct VerificationReport {
    pub checks: Vec<FileCheck>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.checks.iter().all(|check| check.result.is_ok())
    }

    pub fn failures(&self) -> usize {
        self.checks.iter().filter(|check| check.result.is_err()).count()
    }
}

/// Strictly decodes every frame of a file and returns the frame count.
/// Truncation is an error here whatever `options.allow_truncated` says.
pub fn check_file(path: &Path, options: &ReaderOptions) -> Result<u64, AudioFileError> {
    let options = ReaderOptions {
        allow_truncated: false,
        ..*options
    };
    let mut reader = audio::open_audio_file(path, &options)?;
    let frames = reader.total_frames();
    let mut buffer = vec![0.0f32; CHECK_CHUNK_FRAMES * reader.format().points_per_frame()];
    while reader.frames_remaining() > 0 {
        if reader.read_points(&mut buffer)? == 0 {
            return Err(AudioFileError::Truncated);
        }
    }
    Ok(frames)
}

/// Checks each file in turn, logging every failure.
pub fn check_files<P: AsRef<Path>>(paths: &[P], options: &ReaderOptions) -> VerificationReport {
    let checks = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let result = check_file(path, options);
            if let Err(e) = &result {
                error!(file = filename_display(path), err = %e, "Check failed");
            }
            FileCheck {
                path: path.to_path_buf(),
                result,
            }
        })
        .collect();
    VerificationReport { checks }
}
