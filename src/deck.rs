//! Deck: one recording/playback context
//!
//! Bundles the variable registry, a recorder and a player that share one
//! clock. This is the surface a render loop talks to: bind variables once,
//! then call [`Deck::tick`] every frame and [`Deck::capture`] whenever a
//! keyframe should be taken.

use std::path::Path;
use std::sync::Arc;

use crate::clock::{Clock, MonotonicClock};
use crate::config::DeckConfig;
use crate::error::Result;
use crate::memory::VariableMemory;
use crate::registry::VariableRegistry;
use crate::session::{format_sequence, PlaybackState, Player, Recorder, Sequence};
use crate::types::{VarId, VariableKind};

/// Registry, recorder and player sharing one clock
#[derive(Debug)]
pub struct Deck<C: Clock + Clone = MonotonicClock> {
    registry: VariableRegistry,
    recorder: Recorder<C>,
    player: Player<C>,
    chunk_size: usize,
}

impl Default for Deck<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck<MonotonicClock> {
    /// Create a deck with default sizing driven by real time
    pub fn new() -> Self {
        Self::from_config(&DeckConfig::default(), MonotonicClock::new())
    }
}

impl<C: Clock + Clone> Deck<C> {
    /// Create a deck sized by `config`; configured variables are not bound
    pub fn from_config(config: &DeckConfig, clock: C) -> Self {
        Self {
            registry: VariableRegistry::with_capacity(config.max_vars),
            recorder: Recorder::with_clock(clock.clone()),
            player: Player::with_clock(clock),
            chunk_size: config.chunk_size,
        }
    }

    /// Create a deck around an existing registry
    pub fn with_registry(registry: VariableRegistry, chunk_size: usize, clock: C) -> Self {
        Self {
            registry,
            recorder: Recorder::with_clock(clock.clone()),
            player: Player::with_clock(clock),
            chunk_size,
        }
    }

    /// The variable registry
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// The player
    pub fn player(&self) -> &Player<C> {
        &self.player
    }

    /// Bind a variable; see [`VariableRegistry::bind`]
    pub fn bind(&mut self, id: VarId, kind: VariableKind, address: u64, size: usize) -> bool {
        self.registry.bind(id, kind, address, size)
    }

    /// Bind a named variable; see [`VariableRegistry::bind_named`]
    pub fn bind_named(
        &mut self,
        id: VarId,
        name: impl Into<String>,
        kind: VariableKind,
        address: u64,
        size: usize,
    ) -> bool {
        self.registry.bind_named(id, name, kind, address, size)
    }

    /// Create an empty sequence with this deck's chunk size
    pub fn create_sequence(&self) -> Sequence {
        Sequence::with_chunk_size(self.chunk_size)
    }

    /// Begin a fresh recording
    ///
    /// Forgets the previous capture time, so the returned sequence starts
    /// with every bound variable at delta 0.
    pub fn start_recording<M>(&mut self, memory: &M) -> Sequence
    where
        M: VariableMemory + ?Sized,
    {
        self.recorder.reset();
        let mut sequence = self.create_sequence();
        let captured = self.recorder.capture(&self.registry, memory, &mut sequence);
        tracing::info!("Started recording with {} keyframes", captured);
        sequence
    }

    /// Capture changed variables into `sequence`
    pub fn capture<M>(&mut self, memory: &M, sequence: &mut Sequence) -> usize
    where
        M: VariableMemory + ?Sized,
    {
        self.recorder.capture(&self.registry, memory, sequence)
    }

    /// Start playing `sequence`, superseding any active one
    pub fn play(&mut self, sequence: Arc<Sequence>) {
        self.player.play(sequence);
    }

    /// Stop playback, rewind and drop any pending interpolation
    pub fn stop(&mut self) {
        self.player.stop();
        self.registry.clear_rates();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.player.pause();
    }

    /// Resume paused playback
    pub fn resume(&mut self) {
        self.player.resume();
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    /// Per-frame update; returns true if the frame needs a redraw
    pub fn tick<M>(&mut self, memory: &mut M) -> bool
    where
        M: VariableMemory + ?Sized,
    {
        self.player.tick(&mut self.registry, memory)
    }

    /// Load a sequence file
    pub fn load_sequence(&self, path: impl AsRef<Path>) -> Result<Sequence> {
        Sequence::load_with_chunk_size(path, self.chunk_size)
    }

    /// Store a sequence file
    pub fn store_sequence(&self, sequence: &Sequence, path: impl AsRef<Path>) -> Result<()> {
        sequence.store(path)
    }

    /// Debug printout of a sequence using this deck's bindings
    pub fn dump(&self, sequence: &Sequence) -> String {
        format_sequence(sequence, &self.registry)
    }
}
