// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
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
use std::{error::Error, path::Path};

use hound::{SampleFormat, WavSpec, WavWriter};

/// Audio test utilities for generating test signals and validating results
pub mod audio_test_utils {
    use std::f32::consts::PI;

    /// Generate a multi-frequency signal (sum of sine waves)
    pub fn generate_multi_frequency_signal(
        frequencies: &[f32],
        amplitudes: &[f32],
        sample_rate: u32,
        duration_seconds: f32,
    ) -> Vec<f32> {
        assert_eq!(
            frequencies.len(),
            amplitudes.len(),
            "Frequencies and amplitudes must have same length"
        );

        let sample_count = (sample_rate as f32 * duration_seconds) as usize;
        let mut samples = vec![0.0; sample_count];

        for (i, sample) in samples.iter_mut().enumerate() {
            let t = i as f32 / sample_rate as f32;
            for (freq, amp) in frequencies.iter().zip(amplitudes.iter()) {
                *sample += amp * (2.0 * PI * freq * t).sin();
            }
        }

        samples
    }

    /// Interleave per-channel signals into frames.
    pub fn interleave(channels: &[Vec<f32>]) -> Vec<f32> {
        let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        let mut out = Vec::with_capacity(frames * channels.len());
        for frame in 0..frames {
            for channel in channels {
                out.push(channel[frame]);
            }
        }
        out
    }

    /// Largest absolute difference between two signals
    pub fn max_abs_difference(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "Signals must have same length");
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f32::max)
    }
}

/// Builds AIFF and AIFF-C byte streams field by field, including malformed ones.
pub struct AiffBuilder {
    form_type: [u8; 4],
    channels: u16,
    frames: u32,
    sample_size: u16,
    rate: [u8; 10],
    compression: Option<[u8; 4]>,
    comm_len: Option<u32>,
    sound: Option<Vec<u8>>,
    ssnd_len: Option<u32>,
    offset: u32,
    block_size: u32,
    chunks_before: Vec<([u8; 4], Vec<u8>)>,
    chunks_after: Vec<([u8; 4], Vec<u8>)>,
    duplicate_comm: bool,
}

/// 44100 Hz as an 80-bit extended float.
pub const RATE_44100: [u8; 10] = [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0];

impl AiffBuilder {
    /// A mono 16-bit 44.1 kHz AIFF with no sound data yet.
    pub fn new() -> Self {
        AiffBuilder {
            form_type: *b"AIFF",
            channels: 1,
            frames: 0,
            sample_size: 16,
            rate: RATE_44100,
            compression: None,
            comm_len: None,
            sound: Some(Vec::new()),
            ssnd_len: None,
            offset: 0,
            block_size: 0,
            chunks_before: Vec::new(),
            chunks_after: Vec::new(),
            duplicate_comm: false,
        }
    }

    pub fn form_type(mut self, form_type: &[u8; 4]) -> Self {
        self.form_type = *form_type;
        self
    }

    /// Switches to AIFF-C with the given compression type.
    pub fn aifc(mut self, compression: &[u8; 4]) -> Self {
        self.form_type = *b"AIFC";
        self.compression = Some(*compression);
        self
    }

    pub fn channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    pub fn sample_size(mut self, sample_size: u16) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn rate(mut self, rate: [u8; 10]) -> Self {
        self.rate = rate;
        self
    }

    pub fn comm_len(mut self, len: u32) -> Self {
        self.comm_len = Some(len);
        self
    }

    /// Raw sound bytes written after the SSND offset and block size.
    pub fn sound(mut self, bytes: Vec<u8>) -> Self {
        self.sound = Some(bytes);
        self
    }

    pub fn without_sound(mut self) -> Self {
        self.sound = None;
        self
    }

    /// Overrides the SSND chunk length field.
    pub fn ssnd_len(mut self, len: u32) -> Self {
        self.ssnd_len = Some(len);
        self
    }

    pub fn offset(mut self, offset: u32, block_size: u32) -> Self {
        self.offset = offset;
        self.block_size = block_size;
        self
    }

    pub fn chunk_before(mut self, id: &[u8; 4], body: Vec<u8>) -> Self {
        self.chunks_before.push((*id, body));
        self
    }

    pub fn chunk_after(mut self, id: &[u8; 4], body: Vec<u8>) -> Self {
        self.chunks_after.push((*id, body));
        self
    }

    pub fn duplicate_comm(mut self) -> Self {
        self.duplicate_comm = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.form_type);

        for (id, chunk) in &self.chunks_before {
            push_chunk(&mut body, id, chunk, None);
        }

        let mut comm = Vec::new();
        comm.extend_from_slice(&self.channels.to_be_bytes());
        comm.extend_from_slice(&self.frames.to_be_bytes());
        comm.extend_from_slice(&self.sample_size.to_be_bytes());
        comm.extend_from_slice(&self.rate);
        if let Some(compression) = self.compression {
            comm.extend_from_slice(&compression);
            comm.extend_from_slice(&[4, b'n', b'o', b'n', b'e', 0]);
        }
        push_chunk(&mut body, b"COMM", &comm, self.comm_len);
        if self.duplicate_comm {
            push_chunk(&mut body, b"COMM", &comm, self.comm_len);
        }

        if let Some(sound) = &self.sound {
            let mut ssnd = Vec::new();
            ssnd.extend_from_slice(&self.offset.to_be_bytes());
            ssnd.extend_from_slice(&self.block_size.to_be_bytes());
            ssnd.extend_from_slice(sound);
            push_chunk(&mut body, b"SSND", &ssnd, self.ssnd_len);
        }

        for (id, chunk) in &self.chunks_after {
            push_chunk(&mut body, id, chunk, None);
        }

        let mut out = Vec::with_capacity(body.len() + 8);
        out.extend_from_slice(b"FORM");
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
        out
    }
}

impl Default for AiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn push_chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8], len: Option<u32>) {
    out.extend_from_slice(id);
    out.extend_from_slice(&len.unwrap_or(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body);
    if body.len() % 2 == 1 {
        out.push(0);
    }
}

/// Builds a little-endian RIFF/WAVE byte stream from a raw format chunk body.
pub fn wav_bytes(fmt: &[u8], extra_chunks: &[([u8; 4], Vec<u8>)], data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"WAVE");
    let mut push = |id: &[u8], chunk: &[u8]| {
        body.extend_from_slice(id);
        body.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
        body.extend_from_slice(chunk);
        if chunk.len() % 2 == 1 {
            body.push(0);
        }
    };
    push(b"fmt ", fmt);
    for (id, chunk) in extra_chunks {
        push(id, chunk);
    }
    push(b"data", data);

    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

/// A 16-byte PCM format chunk body.
pub fn wav_fmt(format_code: u16, channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    let block_align = channels * bits.div_ceil(8);
    let mut fmt = Vec::with_capacity(16);
    fmt.extend_from_slice(&format_code.to_le_bytes());
    fmt.extend_from_slice(&channels.to_le_bytes());
    fmt.extend_from_slice(&sample_rate.to_le_bytes());
    fmt.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
    fmt.extend_from_slice(&block_align.to_le_bytes());
    fmt.extend_from_slice(&bits.to_le_bytes());
    fmt
}

/// Writes interleaved integer samples to a WAV file with hound.
pub fn write_wav(
    path: &Path,
    samples: &[i32],
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels,
            sample_rate,
            bits_per_sample,
            sample_format: SampleFormat::Int,
        },
    )?;

    for &sample in samples {
        match bits_per_sample {
            8 => writer.write_sample(sample as i8)?,
            16 => writer.write_sample(sample as i16)?,
            _ => writer.write_sample(sample)?,
        }
    }
    writer.finalize()?;

    Ok(())
}
