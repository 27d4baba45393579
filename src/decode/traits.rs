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
use std::path::Path;

use super::error::DecodeError;

/// A fully decoded audio file.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Normalized samples in [-1.0, 1.0], interleaved when multi-channel.
    pub samples: Vec<f32>,
    /// Number of channels in the material.
    pub channel_count: u16,
    /// Bits per sample of the source material.
    pub bits_per_sample: u16,
    /// Sample rate of the material.
    pub sample_rate: u32,
}

/// Decodes audio files into normalized floating point samples.
///
/// The wavetable treats decoding as a black box: implementations may support
/// whatever containers and codecs they like, as long as unreadable or
/// unsupported input fails with a [`DecodeError`].
pub trait FileDecoder: Send + Sync {
    /// Decodes the entire file at the given path.
    fn decode(&self, path: &Path) -> Result<DecodedAudio, DecodeError>;
}
