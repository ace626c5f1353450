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

//! Conversions between normalized float samples and fixed-point integer samples.
//!
//! Integer samples map to floats by dividing by a power-of-two scale factor, so
//! every integer sample is exactly representable as an `f32`. Converting back
//! rounds to the nearest integer and clamps to the range of the target depth.

use super::format::NumBits;

/// Scale factor for 8-bit samples.
pub const SCALE_8: f32 = 128.0;
/// Scale factor for 16-bit samples.
pub const SCALE_16: f32 = 32768.0;
/// Scale factor for 24-bit samples.
pub const SCALE_24: f32 = 8388608.0;

const MIN_24: f32 = -8388608.0;
const MAX_24: f32 = 8388607.0;

pub fn signed_8_to_float(value: i8) -> f32 {
    f32::from(value) / SCALE_8
}

pub fn signed_16_to_float(value: i16) -> f32 {
    f32::from(value) / SCALE_16
}

/// Converts a sign-extended 24-bit sample held in an `i32`.
pub fn signed_24_to_float(value: i32) -> f32 {
    value as f32 / SCALE_24
}

/// Converts an 8-bit sample stored with a +128 bias (as in WAV files).
pub fn unsigned_8_to_float(value: u8) -> f32 {
    signed_8_to_float(value.wrapping_sub(128) as i8)
}

pub fn float_to_signed_8(value: f32) -> i8 {
    // NaN survives clamp and then casts to zero.
    (value * SCALE_8).round().clamp(-128.0, 127.0) as i8
}

pub fn float_to_signed_16(value: f32) -> i16 {
    (value * SCALE_16).round().clamp(-32768.0, 32767.0) as i16
}

/// Returns the 24-bit sample sign-extended into an `i32`.
pub fn float_to_signed_24(value: f32) -> i32 {
    (value * SCALE_24).round().clamp(MIN_24, MAX_24) as i32
}

/// Sign-extends three big-endian bytes.
pub fn be_24_to_i32(bytes: [u8; 3]) -> i32 {
    i32::from_be_bytes([bytes[0], bytes[1], bytes[2], 0]) >> 8
}

/// Sign-extends three little-endian bytes.
pub fn le_24_to_i32(bytes: [u8; 3]) -> i32 {
    i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8
}

/// The low three bytes of a 24-bit sample, big-endian.
pub fn i32_to_be_24(value: i32) -> [u8; 3] {
    let b = value.to_be_bytes();
    [b[1], b[2], b[3]]
}

/// Rounds a float sample to the nearest value representable at the given depth.
pub fn quantize(value: f32, bits: NumBits) -> f32 {
    match bits {
        NumBits::Eight => signed_8_to_float(float_to_signed_8(value)),
        NumBits::Sixteen => signed_16_to_float(float_to_signed_16(value)),
        NumBits::TwentyFour => signed_24_to_float(float_to_signed_24(value)),
    }
}

/// Quantizes every sample in place. Quantizing an already-quantized value must
/// leave its bits unchanged; this is checked in debug builds.
pub fn quantize_and_clamp_vector(data: &mut [f32], bits: NumBits) {
    for value in data.iter_mut() {
        let quantized = quantize(*value, bits);
        debug_assert_eq!(
            quantize(quantized, bits).to_bits(),
            quantized.to_bits(),
            "quantization is not stable for {}",
            quantized
        );
        *value = quantized;
    }
}
