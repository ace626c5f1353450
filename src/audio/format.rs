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

use std::{fmt, time::Duration};

use serde::Deserialize;

/// The lowest sampling rate a decoded file is allowed to report.
pub const MIN_SAMPLING_RATE: u32 = 100;

/// The highest sampling rate a decoded file is allowed to report.
pub const MAX_SAMPLING_RATE: u32 = 1_000_000;

/// Bit depth of the integer samples stored in an audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u16")]
pub enum NumBits {
    Eight,
    Sixteen,
    TwentyFour,
}

impl NumBits {
    /// Buckets a raw AIFF sample size (1-32) into the container tier that holds it.
    /// Sample sizes that need a 32-bit container are not supported.
    pub fn from_aiff_sample_size(raw: u16) -> Option<NumBits> {
        match raw {
            1..=8 => Some(NumBits::Eight),
            9..=16 => Some(NumBits::Sixteen),
            17..=24 => Some(NumBits::TwentyFour),
            _ => None,
        }
    }

    /// The number of significant bits.
    pub fn bits(self) -> u16 {
        match self {
            NumBits::Eight => 8,
            NumBits::Sixteen => 16,
            NumBits::TwentyFour => 24,
        }
    }

    /// The number of bytes used to store one sample point.
    pub fn bytes(self) -> usize {
        usize::from(self.bits() / 8)
    }
}

impl TryFrom<u16> for NumBits {
    type Error = String;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(NumBits::Eight),
            16 => Ok(NumBits::Sixteen),
            24 => Ok(NumBits::TwentyFour),
            _ => Err(format!("unsupported bit depth {} (expected 8, 16 or 24)", bits)),
        }
    }
}

impl fmt::Display for NumBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Channel layout of an audio file. Only mono and stereo files are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumChannels {
    Mono,
    Stereo,
}

impl NumChannels {
    /// Maps a channel count read from a file header.
    pub fn from_count(count: u16) -> Option<NumChannels> {
        match count {
            1 => Some(NumChannels::Mono),
            2 => Some(NumChannels::Stereo),
            _ => None,
        }
    }

    /// The number of channels.
    pub fn count(self) -> u16 {
        match self {
            NumChannels::Mono => 1,
            NumChannels::Stereo => 2,
        }
    }
}

impl fmt::Display for NumChannels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumChannels::Mono => write!(f, "mono"),
            NumChannels::Stereo => write!(f, "stereo"),
        }
    }
}

/// Describes the sample data held by an audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// The bit depth of the stored samples.
    pub bits: NumBits,
    /// The channel layout.
    pub channels: NumChannels,
    /// The sampling rate in Hz, already clamped to the configured limits.
    pub sampling_rate: u32,
    /// The number of frames (one point per channel) in the file.
    pub frames: u64,
}

impl AudioFormat {
    /// The number of sample points in one frame.
    pub fn points_per_frame(&self) -> usize {
        usize::from(self.channels.count())
    }

    /// The number of bytes one frame occupies on disk.
    pub fn bytes_per_frame(&self) -> usize {
        self.bits.bytes() * self.points_per_frame()
    }

    /// The total number of sample points (frames times channels).
    pub fn total_points(&self) -> u64 {
        self.frames * u64::from(self.channels.count())
    }

    /// The playing time of the file.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames as f64 / f64::from(self.sampling_rate))
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {} Hz, {} frames",
            self.bits, self.channels, self.sampling_rate, self.frames
        )
    }
}

/// The inclusive range decoded sampling rates are clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingRateLimits {
    pub min: u32,
    pub max: u32,
}

impl SamplingRateLimits {
    /// Rounds a decoded rate to the nearest integer and clamps it into the limits.
    pub fn clamp(&self, rate: f64) -> u32 {
        if rate.is_nan() || rate <= f64::from(self.min) {
            return self.min;
        }
        if rate >= f64::from(self.max) {
            return self.max;
        }
        rate.round() as u32
    }
}

impl Default for SamplingRateLimits {
    fn default() -> Self {
        SamplingRateLimits {
            min: MIN_SAMPLING_RATE,
            max: MAX_SAMPLING_RATE,
        }
    }
}

/// Options shared by all of the file readers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Zero-fill short reads and flag the reader instead of failing with `Truncated`.
    pub allow_truncated: bool,
    /// The range decoded sampling rates are clamped into.
    pub sampling_rate_limits: SamplingRateLimits,
}
