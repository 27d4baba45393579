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

use std::{error::Error, fmt};

/// Sample format of the source material backing a wave layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// 16-bit signed integer samples.
    Int16,
    /// 24-bit signed integer samples.
    Int24,
    /// 32-bit signed integer samples.
    Int32,
    /// 32-bit floating point samples.
    Float32,
}

impl SampleFormat {
    /// Maps a source bit depth to a sample format. Unknown bit depths are
    /// treated as 32-bit float.
    pub fn from_bits_per_sample(bits_per_sample: u16) -> SampleFormat {
        match bits_per_sample {
            16 => SampleFormat::Int16,
            24 => SampleFormat::Int24,
            32 => SampleFormat::Int32,
            _ => SampleFormat::Float32,
        }
    }

    /// Computes the storage size a layer needs for source material of the
    /// given size, expressed in 16-bit units.
    ///
    /// 24-bit material packs three bytes per sample into the 16-bit unit
    /// count; 32-bit material doubles it. Both carry a fixed 4-unit pad for
    /// alignment and decoder slack.
    pub fn storage_size(&self, source_size: usize) -> usize {
        match self {
            SampleFormat::Int16 => source_size,
            SampleFormat::Int24 => (source_size * 3).div_ceil(2) + 4,
            SampleFormat::Int32 | SampleFormat::Float32 => source_size * 2 + 4,
        }
    }

    /// Convert to string representation
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::Int16 => "int16",
            SampleFormat::Int24 => "int24",
            SampleFormat::Int32 => "int32",
            SampleFormat::Float32 => "float32",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Contract flags a wave enforces when new layers are appended to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaveFlags {
    /// The wave holds stereo material.
    pub stereo: bool,
    /// The wave's material is not 16-bit integer.
    pub not_16_bit: bool,
}

impl WaveFlags {
    /// Derives the flags describing a piece of source material.
    pub fn from_material(stereo: bool, format: SampleFormat) -> WaveFlags {
        WaveFlags {
            stereo,
            not_16_bit: format != SampleFormat::Int16,
        }
    }
}

/// Parses a note name such as "C-4" or "F#3" into the host's note numbering,
/// where each octave spans 16 values and C-0 is 1.
pub fn parse_note(name: &str) -> Result<u8, Box<dyn Error>> {
    const NAMES: [&str; 12] = [
        "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
    ];

    for (position, prefix) in NAMES.iter().enumerate() {
        if let Some(octave) = name.strip_prefix(prefix) {
            let octave: u8 = octave
                .parse()
                .map_err(|_| format!("Unsupported note name: {}", name))?;
            if octave > 9 {
                return Err(format!("Unsupported note name: {}", name).into());
            }
            return Ok(octave * 16 + position as u8 + 1);
        }
    }

    Err(format!("Unsupported note name: {}", name).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_bits_per_sample() {
        assert_eq!(SampleFormat::from_bits_per_sample(16), SampleFormat::Int16);
        assert_eq!(SampleFormat::from_bits_per_sample(24), SampleFormat::Int24);
        assert_eq!(SampleFormat::from_bits_per_sample(32), SampleFormat::Int32);
        assert_eq!(SampleFormat::from_bits_per_sample(8), SampleFormat::Float32);
        assert_eq!(
            SampleFormat::from_bits_per_sample(64),
            SampleFormat::Float32
        );
    }

    #[test]
    fn test_storage_size() {
        // 16-bit material is stored as-is.
        assert_eq!(SampleFormat::Int16.storage_size(0), 0);
        assert_eq!(SampleFormat::Int16.storage_size(1000), 1000);

        // 24-bit packs 3/2 units per sample, rounded up, plus the pad.
        assert_eq!(SampleFormat::Int24.storage_size(10), 19);
        assert_eq!(SampleFormat::Int24.storage_size(11), 21);

        // 32-bit doubles, plus the pad.
        assert_eq!(SampleFormat::Int32.storage_size(10), 24);
        assert_eq!(SampleFormat::Float32.storage_size(10), 24);
    }

    #[test]
    fn test_storage_size_monotonic_and_ordered() {
        let formats = [
            SampleFormat::Int16,
            SampleFormat::Int24,
            SampleFormat::Int32,
            SampleFormat::Float32,
        ];
        for format in formats {
            for size in 0..512 {
                assert!(format.storage_size(size + 1) >= format.storage_size(size));
            }
        }

        // Wider formats always need more room than 16-bit for non-empty input.
        for size in 1..512 {
            assert!(SampleFormat::Int24.storage_size(size) > SampleFormat::Int16.storage_size(size));
            assert!(SampleFormat::Int32.storage_size(size) > SampleFormat::Int16.storage_size(size));
            assert!(
                SampleFormat::Float32.storage_size(size) > SampleFormat::Int16.storage_size(size)
            );
        }
    }

    #[test]
    fn test_flags_from_material() {
        let flags = WaveFlags::from_material(true, SampleFormat::Int16);
        assert!(flags.stereo);
        assert!(!flags.not_16_bit);

        let flags = WaveFlags::from_material(false, SampleFormat::Float32);
        assert!(!flags.stereo);
        assert!(flags.not_16_bit);

        assert_eq!(WaveFlags::default(), WaveFlags::from_material(false, SampleFormat::Int16));
    }

    #[test]
    fn test_parse_note() {
        assert_eq!(parse_note("C-0").unwrap(), 1);
        assert_eq!(parse_note("C#0").unwrap(), 2);
        assert_eq!(parse_note("B-0").unwrap(), 12);
        assert_eq!(parse_note("C-4").unwrap(), 65);
        assert_eq!(parse_note("A-4").unwrap(), 74);

        assert!(parse_note("H-4").is_err());
        assert!(parse_note("C4").is_err());
        assert!(parse_note("C-x").is_err());
        assert!(parse_note("").is_err());
    }
}
