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
use std::io::{BufWriter, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use super::aiff::{
    encode_extended, AiffVariant, AIFC_TYPE, AIFC_VERSION_1, AIFF_TYPE, COMMON_ID, FORMAT_VERSION_ID,
    FORM_ID, NO_COMPRESSION, SOUND_DATA_ID,
};
use super::error::AudioFileError;
use super::format::{NumBits, NumChannels};
use super::sampconv;
use crate::util::filename_display;

/// Name written after the `NONE` compression type in AIFF-C files.
const NO_COMPRESSION_NAME: &[u8] = b"not compressed";

/// The format samples are encoded to when writing a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFormat {
    /// Bit depth of the written samples.
    pub bits: NumBits,
    /// Channel layout of the interleaved input.
    pub channels: NumChannels,
    /// Sampling rate in Hz.
    pub sampling_rate: u32,
}

impl TargetFormat {
    /// Creates a new TargetFormat
    pub fn new(bits: NumBits, channels: NumChannels, sampling_rate: u32) -> Self {
        TargetFormat {
            bits,
            channels,
            sampling_rate,
        }
    }

    /// Checks that the interleaved data holds whole frames and returns the frame count.
    fn frames_in(&self, data: &[f32]) -> Result<u32, AudioFileError> {
        let width = usize::from(self.channels.count());
        if data.len() % width != 0 {
            return Err(AudioFileError::InvalidData(format!(
                "{} points do not divide into {} frames",
                data.len(),
                self.channels
            )));
        }
        u32::try_from(data.len() / width).map_err(|_| {
            AudioFileError::InvalidData("too many frames for an AIFF file".to_string())
        })
    }
}

/// Writes interleaved float samples as an AIFF or AIFF-C file.
/// Samples are rounded and clamped to the target depth.
pub fn write_aiff<W: Write>(
    writer: &mut W,
    variant: AiffVariant,
    target: &TargetFormat,
    data: &[f32],
) -> Result<(), AudioFileError> {
    let frames = target.frames_in(data)?;
    let sample_bytes = data.len() as u64 * target.bits.bytes() as u64;

    // Pascal string: length byte plus text, padded to an even total.
    let name_len = 1 + NO_COMPRESSION_NAME.len() as u64;
    let name_padded = name_len + (name_len & 1);
    let comm_len: u64 = match variant {
        AiffVariant::Aiff => 18,
        AiffVariant::Aifc => 22 + name_padded,
    };
    let fver_total: u64 = match variant {
        AiffVariant::Aiff => 0,
        AiffVariant::Aifc => 8 + 4,
    };
    let ssnd_len = 8 + sample_bytes;
    let form_len = 4 + fver_total + 8 + comm_len + 8 + ssnd_len + (ssnd_len & 1);
    let form_len = u32::try_from(form_len).map_err(|_| {
        AudioFileError::InvalidData("sample data is too large for an AIFF file".to_string())
    })?;

    writer.write_all(FORM_ID)?;
    writer.write_all(&form_len.to_be_bytes())?;
    writer.write_all(match variant {
        AiffVariant::Aiff => AIFF_TYPE,
        AiffVariant::Aifc => AIFC_TYPE,
    })?;

    if variant == AiffVariant::Aifc {
        writer.write_all(FORMAT_VERSION_ID)?;
        writer.write_all(&4u32.to_be_bytes())?;
        writer.write_all(&AIFC_VERSION_1.to_be_bytes())?;
    }

    writer.write_all(COMMON_ID)?;
    writer.write_all(&(comm_len as u32).to_be_bytes())?;
    writer.write_all(&target.channels.count().to_be_bytes())?;
    writer.write_all(&frames.to_be_bytes())?;
    writer.write_all(&target.bits.bits().to_be_bytes())?;
    writer.write_all(&encode_extended(f64::from(target.sampling_rate)))?;
    if variant == AiffVariant::Aifc {
        writer.write_all(NO_COMPRESSION)?;
        writer.write_all(&[NO_COMPRESSION_NAME.len() as u8])?;
        writer.write_all(NO_COMPRESSION_NAME)?;
        if name_len & 1 != 0 {
            writer.write_all(&[0])?;
        }
    }

    writer.write_all(SOUND_DATA_ID)?;
    writer.write_all(&(ssnd_len as u32).to_be_bytes())?;
    writer.write_all(&0u32.to_be_bytes())?; // offset
    writer.write_all(&0u32.to_be_bytes())?; // block size
    for &value in data {
        match target.bits {
            NumBits::Eight => writer.write_all(&[sampconv::float_to_signed_8(value) as u8])?,
            NumBits::Sixteen => {
                writer.write_all(&sampconv::float_to_signed_16(value).to_be_bytes())?
            }
            NumBits::TwentyFour => writer.write_all(&sampconv::i32_to_be_24(
                sampconv::float_to_signed_24(value),
            ))?,
        }
    }
    if ssnd_len & 1 != 0 {
        writer.write_all(&[0])?;
    }

    Ok(())
}

/// Writes interleaved float samples to an AIFF or AIFF-C file on disk.
pub fn write_aiff_file<P: AsRef<Path>>(
    path: P,
    variant: AiffVariant,
    target: &TargetFormat,
    data: &[f32],
) -> Result<(), AudioFileError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_aiff(&mut writer, variant, target, data)?;
    writer.flush()?;

    info!(
        file = filename_display(path),
        variant = ?variant,
        bits = target.bits.bits(),
        channels = target.channels.count(),
        sampling_rate = target.sampling_rate,
        "Wrote AIFF file"
    );
    Ok(())
}

/// Writes interleaved float samples to a PCM WAV file on disk.
pub fn write_wav_file<P: AsRef<Path>>(
    path: P,
    target: &TargetFormat,
    data: &[f32],
) -> Result<(), AudioFileError> {
    let path = path.as_ref();
    target.frames_in(data)?;

    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: target.channels.count(),
            sample_rate: target.sampling_rate,
            bits_per_sample: target.bits.bits(),
            sample_format: SampleFormat::Int,
        },
    )?;

    // hound stores 8-bit samples with the unsigned bias itself.
    for &value in data {
        match target.bits {
            NumBits::Eight => writer.write_sample(sampconv::float_to_signed_8(value))?,
            NumBits::Sixteen => writer.write_sample(sampconv::float_to_signed_16(value))?,
            NumBits::TwentyFour => writer.write_sample(sampconv::float_to_signed_24(value))?,
        }
    }
    writer.finalize()?;

    info!(
        file = filename_display(path),
        bits = target.bits.bits(),
        channels = target.channels.count(),
        sampling_rate = target.sampling_rate,
        "Wrote WAV file"
    );
    Ok(())
}
