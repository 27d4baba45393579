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

use super::format::SampleFormat;

/// Sample rate assigned to a layer until ingest sets the real one.
const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// One sample recording inside a wave, with its own format, root note, and
/// loop points.
///
/// Channel data is stored planar (one buffer per channel) so each channel can
/// be written independently while de-interleaving decoded files. The buffers
/// are sized once at construction or [`init`](WaveLayer::init) and never
/// silently resized.
pub struct WaveLayer {
    /// The file this layer's material came from.
    path: PathBuf,
    /// Sample format of the source material.
    format: SampleFormat,
    /// Root note of the recording, in the host's note numbering.
    root_note: u8,
    /// Whether the layer holds stereo material.
    stereo: bool,
    /// Allocated capacity of each channel buffer, in samples.
    capacity: usize,
    /// Sample rate of the material.
    sample_rate: u32,
    /// Loop start offset, in samples.
    loop_start: usize,
    /// Loop end offset, in samples.
    loop_end: usize,
    /// Index of this layer within its owning wave. Unassigned until the wave
    /// takes ownership.
    layer_index: Option<usize>,
    /// Planar sample storage, one buffer per channel.
    channels: Vec<Vec<f32>>,
}

impl WaveLayer {
    /// Creates a new layer with zeroed channel buffers of the given capacity.
    pub fn new(
        path: &Path,
        format: SampleFormat,
        root_note: u8,
        stereo: bool,
        capacity: usize,
    ) -> Self {
        let channel_count = if stereo { 2 } else { 1 };
        Self {
            path: path.to_path_buf(),
            format,
            root_note,
            stereo,
            capacity,
            sample_rate: DEFAULT_SAMPLE_RATE,
            loop_start: 0,
            loop_end: 0,
            layer_index: None,
            channels: vec![vec![0.0; capacity]; channel_count],
        }
    }

    /// Re-initializes this layer in place, as if freshly constructed.
    /// Prior sample data is discarded and the buffers are reallocated for the
    /// new capacity. The layer keeps its index within the owning wave.
    pub fn init(
        &mut self,
        path: &Path,
        format: SampleFormat,
        root_note: u8,
        stereo: bool,
        capacity: usize,
    ) {
        let channel_count = if stereo { 2 } else { 1 };
        self.path = path.to_path_buf();
        self.format = format;
        self.root_note = root_note;
        self.stereo = stereo;
        self.capacity = capacity;
        self.sample_rate = DEFAULT_SAMPLE_RATE;
        self.loop_start = 0;
        self.loop_end = 0;
        self.channels = vec![vec![0.0; capacity]; channel_count];
    }

    /// Copies `sample_count` samples of one channel out of an interleaved f32
    /// source into this layer's buffer for that channel, starting at
    /// `dest_offset`.
    ///
    /// `source_channel_count` is the interleave stride of the source; 0 or 1
    /// means the source is not interleaved and is copied directly. `channel`
    /// selects both the source channel and the destination buffer.
    ///
    /// Panics if the write would exceed the allocated capacity or the source
    /// slice is too short. Either indicates a size computation mismatch
    /// upstream and must not be silently truncated.
    pub fn set_channel_samples(
        &mut self,
        source: &[f32],
        source_channel_count: u16,
        channel: usize,
        dest_offset: usize,
        sample_count: usize,
    ) {
        assert!(
            dest_offset + sample_count <= self.capacity,
            "channel write of {} samples at offset {} exceeds layer capacity {}",
            sample_count,
            dest_offset,
            self.capacity
        );
        assert!(
            channel < self.channels.len(),
            "channel {} out of range for {} channel layer",
            channel,
            self.channels.len()
        );

        let stride = source_channel_count.max(1) as usize;
        let lane = if stride == 1 { 0 } else { channel };
        assert!(
            sample_count == 0 || (sample_count - 1) * stride + lane < source.len(),
            "source of {} samples too short for {} samples at stride {}",
            source.len(),
            sample_count,
            stride
        );

        let buffer = &mut self.channels[channel];
        for i in 0..sample_count {
            buffer[dest_offset + i] = source[i * stride + lane];
        }
    }

    /// Sets the sample rate of the material.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    /// Sets the loop bounds, in samples.
    ///
    /// Panics if the bounds are inverted or exceed the allocated capacity.
    pub fn set_loop(&mut self, loop_start: usize, loop_end: usize) {
        assert!(
            loop_start <= loop_end && loop_end <= self.capacity,
            "loop bounds {}..{} invalid for capacity {}",
            loop_start,
            loop_end,
            self.capacity
        );
        self.loop_start = loop_start;
        self.loop_end = loop_end;
    }

    /// Assigns this layer's index within its owning wave.
    pub(crate) fn assign_index(&mut self, index: usize) {
        self.layer_index = Some(index);
    }

    /// Gets the file this layer's material came from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the sample format of the source material.
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Gets the root note of the recording.
    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    /// Returns true if the layer holds stereo material.
    pub fn is_stereo(&self) -> bool {
        self.stereo
    }

    /// Gets the allocated capacity of each channel buffer, in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Gets the sample rate of the material.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Gets the loop start offset, in samples.
    pub fn loop_start(&self) -> usize {
        self.loop_start
    }

    /// Gets the loop end offset, in samples.
    pub fn loop_end(&self) -> usize {
        self.loop_end
    }

    /// Gets this layer's index within its owning wave, if assigned.
    pub fn layer_index(&self) -> Option<usize> {
        self.layer_index
    }

    /// Gets the number of channels.
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Gets the sample data for one channel.
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.channels[channel]
    }

    /// Returns the memory size of the sample buffers in bytes.
    pub fn memory_size(&self) -> usize {
        self.channels
            .iter()
            .map(|c| c.len() * std::mem::size_of::<f32>())
            .sum()
    }
}
