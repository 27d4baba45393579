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

use super::format::{SampleFormat, WaveFlags};
use super::layer::WaveLayer;

/// A named instrument slot holding one or more sample layers.
///
/// The wave's flags describe the format contract its layers currently
/// satisfy; the contract is consulted when new material is appended and
/// rewritten when material replaces the primary layer. Compatibility is
/// enforced at append time, not continuously.
pub struct Wave {
    /// The slot index this wave is bound to.
    index: usize,
    /// Display name.
    name: String,
    /// The file the wave's material came from.
    path: PathBuf,
    /// Playback volume. Copied from the table default at allocation time and
    /// independently adjustable afterwards.
    volume: f32,
    /// The format contract new layers must satisfy to be appended.
    flags: WaveFlags,
    /// The layers, in append order.
    layers: Vec<WaveLayer>,
}

impl Wave {
    /// Creates an empty wave bound to the given slot index.
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            name: String::new(),
            path: PathBuf::new(),
            volume: 1.0,
            flags: WaveFlags::default(),
            layers: Vec::new(),
        }
    }

    /// Drops all layers and resets name, path, and flags to empty defaults.
    /// The owning table is responsible for nulling the slot reference.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.name.clear();
        self.path = PathBuf::new();
        self.flags = WaveFlags::default();
    }

    /// Returns true if material with the given channel arrangement and format
    /// may be appended as a new layer.
    ///
    /// The material must match the wave's stereo contract, and 16-bit
    /// material cannot be appended once the contract has moved to
    /// non-16-bit. A wave with no layers accepts anything.
    pub fn accepts_layer(&self, stereo: bool, format: SampleFormat) -> bool {
        self.layers.is_empty()
            || (self.flags.stereo == stereo
                && !(self.flags.not_16_bit && format == SampleFormat::Int16))
    }

    /// Appends a layer and assigns it the next sequential layer index.
    pub(crate) fn append_layer(&mut self, mut layer: WaveLayer) -> &mut WaveLayer {
        let index = self.layers.len();
        layer.assign_index(index);
        self.layers.push(layer);
        &mut self.layers[index]
    }

    /// Ensures the wave has a primary layer with the given material
    /// parameters: re-initializes the first layer in place if one exists,
    /// otherwise constructs it. Layers beyond the first are left untouched.
    pub(crate) fn ensure_layer(
        &mut self,
        path: &Path,
        format: SampleFormat,
        root_note: u8,
        stereo: bool,
        capacity: usize,
    ) -> &mut WaveLayer {
        if self.layers.is_empty() {
            self.append_layer(WaveLayer::new(path, format, root_note, stereo, capacity))
        } else {
            let layer = &mut self.layers[0];
            layer.init(path, format, root_note, stereo, capacity);
            layer
        }
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub(crate) fn set_path(&mut self, path: &Path) {
        self.path = path.to_path_buf();
    }

    pub(crate) fn set_flags(&mut self, flags: WaveFlags) {
        self.flags = flags;
    }

    pub(crate) fn last_layer_mut(&mut self) -> Option<&mut WaveLayer> {
        self.layers.last_mut()
    }

    /// Gets the slot index this wave is bound to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the file the wave's material came from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the playback volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Sets the playback volume. Later changes to the table default do not
    /// affect this wave.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    /// Gets the format contract flags.
    pub fn flags(&self) -> WaveFlags {
        self.flags
    }

    /// Gets the layers, in append order.
    pub fn layers(&self) -> &[WaveLayer] {
        &self.layers
    }

    /// Returns the memory size of all layer sample buffers in bytes.
    pub fn memory_size(&self) -> usize {
        self.layers.iter().map(|l| l.memory_size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_layer(stereo: bool, capacity: usize) -> WaveLayer {
        WaveLayer::new(
            Path::new("sample.wav"),
            SampleFormat::Int16,
            65,
            stereo,
            capacity,
        )
    }

    #[test]
    fn test_append_assigns_sequential_indices() {
        let mut wave = Wave::new(0);
        wave.append_layer(test_layer(false, 16));
        wave.append_layer(test_layer(false, 32));

        assert_eq!(wave.layers().len(), 2);
        assert_eq!(wave.layers()[0].layer_index(), Some(0));
        assert_eq!(wave.layers()[1].layer_index(), Some(1));
    }

    #[test]
    fn test_accepts_layer_contract() {
        let mut wave = Wave::new(0);

        // An empty wave accepts any material.
        assert!(wave.accepts_layer(true, SampleFormat::Float32));
        assert!(wave.accepts_layer(false, SampleFormat::Int16));

        wave.set_flags(WaveFlags::from_material(true, SampleFormat::Int16));
        wave.append_layer(test_layer(true, 16));

        // The stereo contract must match.
        assert!(wave.accepts_layer(true, SampleFormat::Int16));
        assert!(!wave.accepts_layer(false, SampleFormat::Int16));

        // Once the contract is non-16-bit, 16-bit material is rejected.
        wave.set_flags(WaveFlags::from_material(true, SampleFormat::Float32));
        assert!(!wave.accepts_layer(true, SampleFormat::Int16));
        assert!(wave.accepts_layer(true, SampleFormat::Float32));
        assert!(wave.accepts_layer(true, SampleFormat::Int24));
    }

    #[test]
    fn test_ensure_layer_reuses_first() {
        let mut wave = Wave::new(0);
        wave.append_layer(test_layer(false, 16));
        wave.append_layer(test_layer(false, 32));

        wave.ensure_layer(Path::new("new.wav"), SampleFormat::Float32, 40, true, 64);

        assert_eq!(wave.layers().len(), 2);
        let first = &wave.layers()[0];
        assert_eq!(first.path(), Path::new("new.wav"));
        assert_eq!(first.format(), SampleFormat::Float32);
        assert_eq!(first.capacity(), 64);
        assert_eq!(first.layer_index(), Some(0));
        // The second layer is untouched by replace semantics.
        assert_eq!(wave.layers()[1].capacity(), 32);
    }

    #[test]
    fn test_ensure_layer_constructs_when_empty() {
        let mut wave = Wave::new(0);
        wave.ensure_layer(Path::new("new.wav"), SampleFormat::Int16, 65, false, 16);

        assert_eq!(wave.layers().len(), 1);
        assert_eq!(wave.layers()[0].layer_index(), Some(0));
    }

    #[test]
    fn test_clear_resets_to_defaults() {
        let mut wave = Wave::new(7);
        wave.set_name("strings");
        wave.set_path(Path::new("strings.wav"));
        wave.set_volume(0.5);
        wave.set_flags(WaveFlags::from_material(true, SampleFormat::Float32));
        wave.append_layer(test_layer(true, 16));

        wave.clear();

        assert!(wave.layers().is_empty());
        assert_eq!(wave.name(), "");
        assert_eq!(wave.path(), Path::new(""));
        assert_eq!(wave.flags(), WaveFlags::default());
        // Index and volume are not part of the cleared state.
        assert_eq!(wave.index(), 7);
        assert_eq!(wave.volume(), 0.5);
    }
}
