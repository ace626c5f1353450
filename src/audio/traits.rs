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
use super::error::AudioFileError;
use super::format::AudioFormat;

/// A decoder that streams normalized float samples out of an audio file.
/// Samples are interleaved: one point per channel for each frame.
pub trait AudioFileReader: Send {
    /// Get the format of the file being read.
    fn format(&self) -> &AudioFormat;

    /// Get the number of frames that have not been read yet.
    fn frames_remaining(&self) -> u64;

    /// Read interleaved points into `data`.
    /// Reads up to `data.len() / points_per_frame` frames, bounded by the frames remaining.
    /// Returns the number of points written (0 = EOF).
    ///
    /// If the file ends before the declared frame count, the rest of the request is
    /// zero-filled. Depending on the reader's options either `Err(Truncated)` is
    /// returned, or `is_truncated()` starts reporting true and the full count is returned.
    fn read_points(&mut self, data: &mut [f32]) -> Result<usize, AudioFileError>;

    /// Whether a short read has been zero-filled.
    fn is_truncated(&self) -> bool;

    /// Get the number of frames the file's data can still supply in full.
    /// Less than `frames_remaining()` when the file is truncated.
    fn frames_available(&self) -> u64 {
        self.frames_remaining()
    }

    /// Get the total number of frames declared by the file.
    fn total_frames(&self) -> u64 {
        self.format().frames
    }
}

/// Blanket implementation for Box<dyn AudioFileReader>
/// This allows the boxed readers returned by the factory to be passed to generic functions.
impl AudioFileReader for Box<dyn AudioFileReader> {
    fn format(&self) -> &AudioFormat {
        (**self).format()
    }

    fn frames_remaining(&self) -> u64 {
        (**self).frames_remaining()
    }

    fn read_points(&mut self, data: &mut [f32]) -> Result<usize, AudioFileError> {
        (**self).read_points(data)
    }

    fn is_truncated(&self) -> bool {
        (**self).is_truncated()
    }

    fn frames_available(&self) -> u64 {
        (**self).frames_available()
    }

    fn total_frames(&self) -> u64 {
        (**self).total_frames()
    }
}
