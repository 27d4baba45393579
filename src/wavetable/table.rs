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

//! The fixed-capacity wavetable, its exclusive lock, and change
//! notifications.
//!
//! All structural mutation and all render-path reads go through one
//! [`parking_lot::Mutex`]. [`Wavetable::lock`] hands out a guard whose
//! methods assume the lock is held; the convenience methods on
//! [`Wavetable`] take the lock themselves and delegate, so callers never
//! acquire it twice. File ingest holds the lock for its entire duration,
//! including the decode: a large file load can transiently stall the render
//! path, but the render path can never observe a torn wave.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::WavetableConfig;
use crate::decode::{AudioFileDecoder, DecodeError, FileDecoder};

use super::format::{SampleFormat, WaveFlags};
use super::layer::WaveLayer;
use super::wave::Wave;

/// The number of wave slots in a wavetable.
pub const NUM_WAVES: usize = 200;

/// Root note assigned to layers created by file ingest when no other note is
/// configured: C-4 in the host's note numbering.
pub const DEFAULT_ROOT_NOTE: u8 = 65;

/// Notification emitted when wavetable contents change.
///
/// Consumers that need incremental per-slot updates listen for
/// [`WavetableEvent::WaveChanged`]; consumers that refresh whole wave lists
/// listen for [`WavetableEvent::WavesChanged`]. Events are sent strictly
/// after the mutation they describe is fully visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavetableEvent {
    /// The wave at the given slot index changed.
    WaveChanged(usize),
    /// The set of waves changed in some way that is not slot specific.
    WavesChanged,
}

/// Parameters for allocating a wave slot.
#[derive(Debug, Clone)]
pub struct WaveAllocation {
    /// The slot index to allocate into.
    pub index: usize,
    /// The file the material came from.
    pub path: PathBuf,
    /// Display name for the wave.
    pub name: String,
    /// Size of the source material, in 16-bit units.
    pub source_size: usize,
    /// Sample format of the source material.
    pub format: SampleFormat,
    /// Whether the material is stereo.
    pub stereo: bool,
    /// Root note for the new layer.
    pub root_note: u8,
    /// Append the material as a new layer instead of replacing the wave's
    /// primary layer.
    pub append: bool,
    /// Emit the indexed change event for the slot.
    pub notify: bool,
}

/// State guarded by the table's exclusive lock.
struct TableState {
    /// The wave slots. Most stay empty for the life of a project.
    slots: Vec<Option<Wave>>,
    /// Default volume applied to newly allocated waves.
    volume: f32,
}

/// A fixed-capacity table of sampled instruments.
pub struct Wavetable {
    /// Everything the render path reads, behind the audio-data lock.
    state: Mutex<TableState>,
    /// Change notification subscribers. Disconnected receivers are pruned on
    /// send.
    subscribers: Mutex<Vec<Sender<WavetableEvent>>>,
    /// Decoder used for file ingest.
    decoder: Box<dyn FileDecoder>,
    /// Root note assigned to layers created by file ingest.
    ingest_root_note: u8,
}

impl Wavetable {
    /// Creates a wavetable with the given default wave volume.
    pub fn new(volume: f32) -> Self {
        Self::with_decoder(volume, Box::new(AudioFileDecoder::new()))
    }

    /// Creates a wavetable from host configuration.
    pub fn from_config(config: &WavetableConfig) -> Result<Self, Box<dyn Error>> {
        let mut table = Self::new(config.volume());
        table.ingest_root_note = config.root_note()?;
        Ok(table)
    }

    /// Creates a wavetable that ingests files through the given decoder.
    pub fn with_decoder(volume: f32, decoder: Box<dyn FileDecoder>) -> Self {
        let mut slots = Vec::with_capacity(NUM_WAVES);
        slots.resize_with(NUM_WAVES, || None);
        Self {
            state: Mutex::new(TableState { slots, volume }),
            subscribers: Mutex::new(Vec::new()),
            decoder,
            ingest_root_note: DEFAULT_ROOT_NOTE,
        }
    }

    /// Acquires the table's exclusive lock. All other operations on the
    /// guard run without re-acquiring it; use this to batch several
    /// operations into one critical section, or from the render path to read
    /// several slots consistently.
    pub fn lock(&self) -> WavetableLock<'_> {
        WavetableLock {
            table: self,
            state: self.state.lock(),
        }
    }

    /// Registers a change notification subscriber.
    pub fn subscribe(&self) -> Receiver<WavetableEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Allocates a wave slot. Takes the table lock for the duration.
    /// See [`WavetableLock::allocate_wave`].
    pub fn allocate_wave(&self, allocation: &WaveAllocation) -> bool {
        self.lock().allocate_wave(allocation)
    }

    /// Loads a wave slot from an audio file, or clears the slot when `path`
    /// is absent or empty. The table lock is held for the entire operation,
    /// including the decode.
    ///
    /// The file is decoded to normalized f32 samples, allocated into the
    /// slot with the given `append` mode, and de-interleaved into the new
    /// layer's channel buffers. Only the collection-level change event fires
    /// for file loads. Decode failures propagate without mutating the slot.
    pub fn load_wave(
        &self,
        index: usize,
        path: Option<&Path>,
        name: &str,
        append: bool,
    ) -> Result<(), DecodeError> {
        let mut lock = self.lock();

        if index >= NUM_WAVES {
            return Ok(());
        }

        let path = match path.filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => path,
            None => {
                debug!(index, "Clearing wave slot");
                lock.clear_wave(index);
                return Ok(());
            }
        };

        info!(index, path = ?path, append, "Loading wave from file");
        let decoded = self.decoder.decode(path)?;

        let format = SampleFormat::from_bits_per_sample(decoded.bits_per_sample);
        let stereo = decoded.channel_count == 2;
        let produced = lock.allocate_wave(&WaveAllocation {
            index,
            path: path.to_path_buf(),
            name: name.to_string(),
            source_size: decoded.samples.len(),
            format,
            stereo,
            root_note: self.ingest_root_note,
            append,
            notify: false,
        });
        if !produced {
            debug!(index, "No layer produced; wave left unchanged");
            return Ok(());
        }

        let frames = if stereo {
            decoded.samples.len() / 2
        } else {
            decoded.samples.len()
        };
        if let Some(layer) = lock.state.slots[index]
            .as_mut()
            .and_then(|wave| wave.last_layer_mut())
        {
            layer.set_sample_rate(decoded.sample_rate);
            layer.set_loop(0, frames);
            if stereo {
                layer.set_channel_samples(&decoded.samples, 2, 0, 0, frames);
                layer.set_channel_samples(&decoded.samples, 2, 1, 0, frames);
            } else {
                layer.set_channel_samples(&decoded.samples, 0, 0, 0, frames);
            }
        }

        info!(
            index,
            format = %format,
            stereo,
            frames,
            sample_rate = decoded.sample_rate,
            "Wave loaded"
        );
        Ok(())
    }

    /// Reads the wave at the given slot index under the table lock. Returns
    /// None for empty slots and out-of-range indices.
    pub fn with_wave<R>(&self, index: usize, f: impl FnOnce(&Wave) -> R) -> Option<R> {
        let lock = self.lock();
        lock.wave(index).map(f)
    }

    /// Gets the default volume applied to newly allocated waves.
    pub fn volume(&self) -> f32 {
        self.lock().volume()
    }

    /// Sets the default volume applied to newly allocated waves. Waves that
    /// were already allocated keep their own volume.
    pub fn set_volume(&self, volume: f32) {
        self.lock().set_volume(volume);
    }

    /// Returns the total memory used by wave sample buffers, in bytes.
    pub fn total_memory_usage(&self) -> usize {
        let lock = self.lock();
        lock.waves().map(|w| w.memory_size()).sum()
    }

    /// Sends an event to all subscribers, pruning disconnected ones.
    fn emit(&self, event: WavetableEvent) {
        self.subscribers.lock().retain(|tx| tx.send(event).is_ok());
    }
}

impl fmt::Debug for Wavetable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lock = self.lock();
        f.debug_struct("Wavetable")
            .field("waves", &lock.waves().count())
            .field("volume", &lock.volume())
            .field(
                "memory_kb",
                &(lock.waves().map(|w| w.memory_size()).sum::<usize>() / 1024),
            )
            .finish()
    }
}

/// Guard over the table's exclusive lock. Operations on the guard assume
/// the lock is held and never re-acquire it.
pub struct WavetableLock<'a> {
    table: &'a Wavetable,
    state: MutexGuard<'a, TableState>,
}

impl WavetableLock<'_> {
    /// Allocates a wave slot with known size and format metadata.
    ///
    /// Creates the wave if the slot was empty, refreshes its name, path,
    /// and volume (from the table default), then either appends a new layer
    /// or replaces the primary one:
    ///
    /// - Append mode adds a layer only if the material satisfies the wave's
    ///   current format contract (a wave with no layers accepts anything).
    ///   Incompatible material is silently skipped.
    /// - Replace mode rewrites the contract from the new material and
    ///   re-initializes the first layer in place, constructing it if needed.
    ///   Layers beyond the first are left untouched.
    ///
    /// Out-of-range indices are ignored. Returns whether a layer was
    /// created or re-initialized.
    pub fn allocate_wave(&mut self, allocation: &WaveAllocation) -> bool {
        if allocation.index >= NUM_WAVES {
            return false;
        }

        let volume = self.state.volume;
        let wave = self.state.slots[allocation.index]
            .get_or_insert_with(|| Wave::new(allocation.index));
        wave.set_name(&allocation.name);
        wave.set_path(&allocation.path);
        wave.set_volume(volume);

        let capacity = allocation.format.storage_size(allocation.source_size);
        let produced = if allocation.append {
            if wave.accepts_layer(allocation.stereo, allocation.format) {
                wave.append_layer(WaveLayer::new(
                    &allocation.path,
                    allocation.format,
                    allocation.root_note,
                    allocation.stereo,
                    capacity,
                ));
                debug!(
                    index = allocation.index,
                    layers = wave.layers().len(),
                    format = %allocation.format,
                    "Layer appended"
                );
                true
            } else {
                debug!(
                    index = allocation.index,
                    format = %allocation.format,
                    stereo = allocation.stereo,
                    "Incompatible layer append ignored"
                );
                false
            }
        } else {
            wave.set_flags(WaveFlags::from_material(
                allocation.stereo,
                allocation.format,
            ));
            wave.ensure_layer(
                &allocation.path,
                allocation.format,
                allocation.root_note,
                allocation.stereo,
                capacity,
            );
            true
        };

        if allocation.notify {
            self.table
                .emit(WavetableEvent::WaveChanged(allocation.index));
        }
        self.table.emit(WavetableEvent::WavesChanged);

        produced
    }

    /// Clears a wave slot: drops the wave if the slot held one and emits the
    /// indexed change event. Out-of-range indices are ignored.
    pub fn clear_wave(&mut self, index: usize) {
        if index >= NUM_WAVES {
            return;
        }

        if let Some(mut wave) = self.state.slots[index].take() {
            wave.clear();
        }
        self.table.emit(WavetableEvent::WaveChanged(index));
    }

    /// Gets the wave at the given slot index. Returns None for empty slots
    /// and out-of-range indices.
    pub fn wave(&self, index: usize) -> Option<&Wave> {
        self.state.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// Gets the wave at the given slot index for mutation.
    pub fn wave_mut(&mut self, index: usize) -> Option<&mut Wave> {
        self.state
            .slots
            .get_mut(index)
            .and_then(|slot| slot.as_mut())
    }

    /// Iterates over the occupied wave slots in index order.
    pub fn waves(&self) -> impl Iterator<Item = &Wave> {
        self.state.slots.iter().filter_map(|slot| slot.as_ref())
    }

    /// Gets the default volume applied to newly allocated waves.
    pub fn volume(&self) -> f32 {
        self.state.volume
    }

    /// Sets the default volume applied to newly allocated waves.
    pub fn set_volume(&mut self, volume: f32) {
        self.state.volume = volume;
    }
}
