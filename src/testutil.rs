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

//! Test utilities for producing small audio fixtures.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Writes a 16-bit PCM WAV file with the given interleaved samples.
pub fn write_wav_i16(path: &Path, samples: &[i16], channels: u16, sample_rate: u32) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("failed to create wav file");
    for sample in samples {
        writer.write_sample(*sample).expect("failed to write sample");
    }
    writer.finalize().expect("failed to finalize wav file");
}

/// Writes a 32-bit float WAV file with the given interleaved samples.
pub fn write_wav_f32(path: &Path, samples: &[f32], channels: u16, sample_rate: u32) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).expect("failed to create wav file");
    for sample in samples {
        writer.write_sample(*sample).expect("failed to write sample");
    }
    writer.finalize().expect("failed to finalize wav file");
}
