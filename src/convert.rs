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

use tracing::info;

use crate::audio::{
    self, sampconv, AiffVariant, AudioFileError, FileType, NumBits, ReaderOptions, TargetFormat,
};
use crate::util::filename_display;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Unknown output file type for {0}")]
    UnknownOutputType(PathBuf),

    #[error(transparent)]
    Audio(#[from] AudioFileError),
}

/// Applies the export gain, then quantizes and clamps to the output bit depth.
pub fn scale_and_quantize(data: &mut [f32], volume_scaling: f32, bits: NumBits) {
    if volume_scaling != 1.0 {
        data.iter_mut().for_each(|point| *point *= volume_scaling);
    }
    sampconv::quantize_and_clamp_vector(data, bits);
}

/// Imports the input file, scales and quantizes it, and writes it in the type named
/// by the output file's extension. Returns whether the input was truncated.
pub fn convert(
    input: &Path,
    output: &Path,
    bits: NumBits,
    volume_scaling: f32,
    options: &ReaderOptions,
) -> Result<bool, ConvertError> {
    let output_type = audio::file_type_from_extension(output)
        .ok_or_else(|| ConvertError::UnknownOutputType(output.to_path_buf()))?;

    let sample = audio::import_audio_file(input, options)?;
    let target = TargetFormat::new(bits, sample.format.channels, sample.format.sampling_rate);

    let mut data = sample.points().to_vec();
    scale_and_quantize(&mut data, volume_scaling, bits);

    let is_aifc = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("aifc"));
    match output_type {
        FileType::Wav => audio::write_wav_file(output, &target, &data)?,
        FileType::Aiff if is_aifc => {
            audio::write_aiff_file(output, AiffVariant::Aifc, &target, &data)?
        }
        FileType::Aiff => audio::write_aiff_file(output, AiffVariant::Aiff, &target, &data)?,
    }

    info!(
        input = filename_display(input),
        output = filename_display(output),
        truncated = sample.truncated,
        "Converted"
    );
    Ok(sample.truncated)
}
