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
use std::error::Error;

use serde::{Deserialize, Serialize};

use crate::wavetable::parse_note;

/// Default volume applied to newly allocated waves.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Default root note name for layers created by file ingest.
pub const DEFAULT_ROOT_NOTE_NAME: &str = "C-4";

/// A YAML representation of the wavetable configuration.
#[derive(Deserialize, Clone, Serialize, Debug)]
pub struct WavetableConfig {
    /// The volume applied to newly allocated waves.
    #[serde(default = "default_volume")]
    volume: f32,

    /// The root note assigned to layers created by file ingest.
    #[serde(default = "default_root_note")]
    root_note: String,
}

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_root_note() -> String {
    DEFAULT_ROOT_NOTE_NAME.to_string()
}

impl Default for WavetableConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            root_note: default_root_note(),
        }
    }
}

impl WavetableConfig {
    /// Parses a wavetable configuration from a YAML document.
    pub fn from_yaml(contents: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_yml::from_str(contents)?)
    }

    /// Gets the volume applied to newly allocated waves.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Gets the root note for file ingest, in the host's note numbering.
    pub fn root_note(&self) -> Result<u8, Box<dyn Error>> {
        parse_note(&self.root_note)
    }
}
