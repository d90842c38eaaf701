//! Session data types

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, Result};
use crate::types::{Value, VarId};

/// Default growth increment of a sequence, in keyframes
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// State of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No active sequence
    #[default]
    Stopped,
    /// Advancing through the active sequence on every tick
    Playing,
    /// Active sequence retained, ticks do nothing
    Paused,
}

impl PlaybackState {
    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackState::Paused)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }
}

/// A single recorded (time offset, variable, value) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Milliseconds since the previous keyframe (0 = same instant)
    pub delta_time: u32,
    /// Variable this keyframe targets
    pub variable: VarId,
    /// Raw value bytes
    pub value: Value,
}

impl Keyframe {
    /// Create a keyframe with a zero delta time
    pub fn new(variable: VarId, value: Value) -> Self {
        Self {
            delta_time: 0,
            variable,
            value,
        }
    }

    /// Set the delta time
    pub fn with_delta(mut self, delta_time: u32) -> Self {
        self.delta_time = delta_time;
        self
    }
}

/// Ordered list of keyframes from one recording
///
/// Keyframes for different variables are interleaved in capture order.
/// Backing storage grows in whole chunks whenever an append would fill it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    keyframes: Vec<Keyframe>,
    capacity: usize,
    chunk_size: usize,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence {
    /// Create an empty sequence with the default chunk size
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create an empty sequence growing by `chunk_size` keyframes at a time
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            keyframes: Vec::with_capacity(chunk_size),
            capacity: chunk_size,
            chunk_size,
        }
    }

    /// Build a sequence around already decoded keyframes
    pub fn from_keyframes(keyframes: Vec<Keyframe>, chunk_size: usize) -> Self {
        let mut seq = Self::with_chunk_size(chunk_size);
        seq.append(&keyframes);
        seq
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Check if the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Allocated capacity, always a whole number of chunks
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Growth increment
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// All keyframes in order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Keyframe at `index`
    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Most recent keyframe
    pub fn last(&self) -> Option<&Keyframe> {
        self.keyframes.last()
    }

    /// Total playback length in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.keyframes.iter().map(|k| k.delta_time as u64).sum()
    }

    /// Nearest prior keyframe for `variable`, scanning backward from the end
    pub fn latest_for(&self, variable: VarId) -> Option<&Keyframe> {
        self.keyframes.iter().rev().find(|k| k.variable == variable)
    }

    /// Append keyframes verbatim
    ///
    /// Delta times are stored as given; the recorder is responsible for
    /// assigning them.
    pub fn append(&mut self, keyframes: &[Keyframe]) {
        if keyframes.is_empty() {
            return;
        }

        let needed = self.keyframes.len() + keyframes.len();
        if needed >= self.capacity {
            while needed >= self.capacity {
                self.capacity += self.chunk_size;
            }
            self.keyframes
                .reserve_exact(self.capacity - self.keyframes.len());
            tracing::trace!("Sequence grown to {} keyframes", self.capacity);
        }

        self.keyframes.extend_from_slice(keyframes);
    }

    /// Edit a keyframe in place
    ///
    /// `delta_time` replaces the delta time when present. `value` replaces
    /// the value bytes when present and its variable id is not the null
    /// sentinel; the id only acts as a presence flag and the keyframe keeps
    /// its recorded variable. Returns `false` if `index` is out of range.
    pub fn update(
        &mut self,
        index: usize,
        delta_time: Option<u32>,
        value: Option<(VarId, Value)>,
    ) -> bool {
        let Some(keyframe) = self.keyframes.get_mut(index) else {
            tracing::debug!("Ignoring update of keyframe {}: out of range", index);
            return false;
        };

        if let Some(delta) = delta_time {
            keyframe.delta_time = delta;
        }
        if let Some((variable, new_value)) = value {
            if !variable.is_null() {
                keyframe.value = new_value;
            }
        }
        true
    }

    /// Export keyframes as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.keyframes)
            .map_err(|e| ReelError::Serialization(e.to_string()))
    }
}
