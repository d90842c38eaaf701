//! Player for replaying sequences into bound variables
//!
//! Playback walks the sequence period by period. A period starts at a
//! keyframe with a non-zero delta time and runs until the next one. While
//! a period is pending, every tick moves each interpolating variable by
//! `rate * elapsed_ms`. When the period's countdown runs out the player
//! writes the exact keyframe values, finds the next period and computes
//! fresh per-millisecond rates toward its targets.

use std::sync::Arc;

use crate::clock::{Clock, MonotonicClock};
use crate::memory::VariableMemory;
use crate::registry::VariableRegistry;
use crate::types::Value;

use super::types::{PlaybackState, Sequence};

/// Time-driven sequence player
#[derive(Debug)]
pub struct Player<C: Clock = MonotonicClock> {
    /// Time source
    clock: C,
    /// Current playback state
    state: PlaybackState,
    /// The sequence being played
    sequence: Option<Arc<Sequence>>,
    /// Index of the keyframe that opens the pending period
    cursor: usize,
    /// Milliseconds left in the pending period
    countdown_ms: u64,
    /// Time of the previous tick (None before the first one)
    last_tick_ms: Option<u64>,
}

impl Default for Player<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Player<MonotonicClock> {
    /// Create a player driven by real time
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl<C: Clock> Player<C> {
    /// Create a player with a specific clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: PlaybackState::Stopped,
            sequence: None,
            cursor: 0,
            countdown_ms: 0,
            last_tick_ms: None,
        }
    }

    /// The player's clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Get current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// The active sequence
    pub fn sequence(&self) -> Option<&Arc<Sequence>> {
        self.sequence.as_ref()
    }

    /// Index of the keyframe that opens the pending period
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Milliseconds left in the pending period
    pub fn countdown_ms(&self) -> u64 {
        self.countdown_ms
    }

    /// Start playing a sequence, superseding any active one
    ///
    /// The cursor is kept, so a sequence that was stopped by reaching its
    /// end or by [`Player::stop`] starts from the beginning while a paused
    /// one resumes. Empty sequences are refused.
    pub fn play(&mut self, sequence: Arc<Sequence>) {
        if sequence.is_empty() {
            tracing::warn!("Refusing to play an empty sequence");
            return;
        }
        if self.cursor >= sequence.len() {
            self.cursor = 0;
            self.countdown_ms = 0;
        }
        tracing::info!("Playing sequence of {} keyframes", sequence.len());
        self.sequence = Some(sequence);
        self.state = PlaybackState::Playing;
    }

    /// Stop playback and rewind to the start
    ///
    /// Interpolation rates live in the registry and are left untouched;
    /// callers driving a `Player` directly should follow a mid-period stop
    /// with [`VariableRegistry::clear_rates`]. [`crate::Deck::stop`] does so.
    pub fn stop(&mut self) {
        self.sequence = None;
        self.state = PlaybackState::Stopped;
        self.cursor = 0;
        self.countdown_ms = 0;
    }

    /// Hold playback in place, keeping the active sequence
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Continue a paused playback
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
        }
    }

    /// Flip between playing and paused
    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Stopped => {}
        }
    }

    /// Advance playback by the time elapsed since the previous tick
    ///
    /// Call once per frame. Returns true if any bound variable was written
    /// (the caller should redraw). Reaching the last keyframe stops the
    /// player and always returns true.
    pub fn tick<M>(&mut self, registry: &mut VariableRegistry, memory: &mut M) -> bool
    where
        M: VariableMemory + ?Sized,
    {
        let now = self.clock.now_ms();
        let elapsed = self
            .last_tick_ms
            .map(|last| now.saturating_sub(last))
            .unwrap_or(0);
        self.last_tick_ms = Some(now);

        if !self.state.is_playing() {
            return false;
        }
        let Some(sequence) = self.sequence.clone() else {
            return false;
        };

        if elapsed < self.countdown_ms {
            self.countdown_ms -= elapsed;
            return interpolate(registry, memory, elapsed);
        }
        self.countdown_ms = 0;

        tracing::debug!("Processing keyframes at [{:04}]", self.cursor);
        let keyframes = sequence.keyframes();
        let start = self.cursor;
        let mut redraw = false;

        for (index, keyframe) in keyframes.iter().enumerate().skip(start) {
            if index > start && keyframe.delta_time > 0 {
                self.countdown_ms = keyframe.delta_time as u64;
                self.cursor = index;
                break;
            }

            if let Some(binding) = registry.get_mut(keyframe.variable) {
                let bytes = keyframe.value.leading(binding.size);
                if let Err(e) = memory.write_memory(binding.address, bytes) {
                    tracing::warn!("Failed to apply keyframe {}: {}", index, e);
                }
                binding.rate = 0.0;
                redraw = true;
            }

            if index + 1 >= keyframes.len() {
                tracing::info!("Reached end of sequence; stopping");
                self.stop();
                return true;
            }
        }

        if self.countdown_ms == 0 {
            // Nothing left to interpolate over; the next tick applies the period
            return redraw;
        }

        let period_start = self.cursor;
        for (index, target) in keyframes.iter().enumerate().skip(period_start) {
            if index > period_start && target.delta_time > 0 {
                break;
            }

            let Some(binding) = registry.get_mut(target.variable) else {
                continue;
            };
            let current = match memory.read_memory(binding.address, binding.size) {
                Ok(bytes) => Value::from_bytes(&bytes),
                Err(e) => {
                    tracing::warn!("Skipping interpolation of {}: {}", target.variable, e);
                    continue;
                }
            };
            if current == target.value {
                continue;
            }

            let diff = Value::difference(binding.kind, binding.size, &current, &target.value);
            binding.rate = diff / self.countdown_ms as f64;
        }

        redraw
    }
}

/// Move every interpolating variable forward by `elapsed_ms`
fn interpolate<M>(registry: &mut VariableRegistry, memory: &mut M, elapsed_ms: u64) -> bool
where
    M: VariableMemory + ?Sized,
{
    let mut redraw = false;
    for (id, binding) in registry.iter_bound_mut() {
        if !binding.is_interpolating() {
            continue;
        }

        let current = match memory.read_memory(binding.address, binding.size) {
            Ok(bytes) => Value::from_bytes(&bytes),
            Err(e) => {
                tracing::warn!("Skipping interpolation of {}: {}", id, e);
                continue;
            }
        };
        let next = current.add(binding.kind, binding.size, binding.rate * elapsed_ms as f64);
        if let Err(e) = memory.write_memory(binding.address, next.leading(binding.size)) {
            tracing::warn!("Failed to write {}: {}", id, e);
            continue;
        }
        redraw = true;
    }
    redraw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::{MemoryMap, MockVariableMemory};
    use crate::session::types::Keyframe;
    use crate::types::{VarId, VariableKind};

    const X: u64 = 0x100;

    fn setup(start: f64) -> (VariableRegistry, MemoryMap, Player<ManualClock>, ManualClock) {
        let mut registry = VariableRegistry::new();
        registry.bind(VarId(1), VariableKind::Float, X, 8);

        let mut memory = MemoryMap::new();
        memory.add_region(X, 8);
        memory.write_value(X, start).unwrap();

        let clock = ManualClock::new();
        let player = Player::with_clock(clock.clone());
        (registry, memory, player, clock)
    }

    fn ramp(from: f64, to: f64, ms: u32) -> Arc<Sequence> {
        let mut seq = Sequence::new();
        seq.append(&[
            Keyframe::new(VarId(1), Value::from(from)),
            Keyframe::new(VarId(1), Value::from(to)).with_delta(ms),
        ]);
        Arc::new(seq)
    }

    #[test]
    fn test_player_lifecycle() {
        let (_, _, mut player, _) = setup(0.0);
        assert_eq!(player.state(), PlaybackState::Stopped);

        player.play(ramp(0.0, 1.0, 100));
        assert!(player.is_playing());

        player.pause();
        assert_eq!(player.state(), PlaybackState::Paused);
        assert!(player.sequence().is_some());

        player.toggle_pause();
        assert!(player.is_playing());

        player.stop();
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(player.sequence().is_none());
        assert_eq!(player.cursor(), 0);
    }

    #[test]
    fn test_empty_sequence_is_refused() {
        let (_, _, mut player, _) = setup(0.0);
        player.play(Arc::new(Sequence::new()));
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_first_tick_applies_and_sets_rate() {
        let (mut registry, mut memory, mut player, _) = setup(55.0);
        player.play(ramp(0.0, 100.0, 1000));

        assert!(player.tick(&mut registry, &mut memory));
        assert_eq!(memory.read_value::<f64>(X).unwrap(), 0.0);
        assert_eq!(player.cursor(), 1);
        assert_eq!(player.countdown_ms(), 1000);
        assert!((registry.get(VarId(1)).unwrap().rate - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_interpolates_over_irregular_ticks() {
        let (mut registry, mut memory, mut player, clock) = setup(0.0);
        player.play(ramp(0.0, 100.0, 1000));
        player.tick(&mut registry, &mut memory);

        for step in [120, 35, 200, 145] {
            clock.advance(step);
            assert!(player.tick(&mut registry, &mut memory));
        }

        let value = memory.read_value::<f64>(X).unwrap();
        assert!((value - 50.0).abs() < 1e-9, "value was {}", value);
        assert_eq!(player.countdown_ms(), 500);
    }

    #[test]
    fn test_end_of_sequence_stops_and_redraws() {
        let (mut registry, mut memory, mut player, clock) = setup(0.0);
        player.play(ramp(0.0, 100.0, 1000));
        player.tick(&mut registry, &mut memory);

        clock.advance(400);
        player.tick(&mut registry, &mut memory);
        clock.advance(700);
        assert!(player.tick(&mut registry, &mut memory));

        assert_eq!(memory.read_value::<f64>(X).unwrap(), 100.0);
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(registry.get(VarId(1)).unwrap().rate, 0.0);
    }

    #[test]
    fn test_single_keyframe_sequence_ends_on_first_tick() {
        let (mut registry, mut memory, mut player, _) = setup(3.0);
        let mut seq = Sequence::new();
        seq.append(&[Keyframe::new(VarId(1), Value::from(7.0f64))]);
        player.play(Arc::new(seq));

        assert!(player.tick(&mut registry, &mut memory));
        assert_eq!(memory.read_value::<f64>(X).unwrap(), 7.0);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_paused_tick_does_nothing() {
        let (mut registry, mut memory, mut player, clock) = setup(0.0);
        player.play(ramp(0.0, 100.0, 1000));
        player.tick(&mut registry, &mut memory);

        player.pause();
        clock.advance(300);
        assert!(!player.tick(&mut registry, &mut memory));
        assert_eq!(memory.read_value::<f64>(X).unwrap(), 0.0);

        // The paused time is not replayed after resuming
        player.resume();
        clock.advance(100);
        player.tick(&mut registry, &mut memory);
        let value = memory.read_value::<f64>(X).unwrap();
        assert!((value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_already_at_target_gets_no_rate() {
        let (mut registry, mut memory, mut player, _) = setup(0.0);
        player.play(ramp(5.0, 5.0, 100));
        player.tick(&mut registry, &mut memory);
        assert_eq!(registry.get(VarId(1)).unwrap().rate, 0.0);
    }

    #[test]
    fn test_unbound_keyframes_are_skipped() {
        let (mut registry, mut memory, mut player, clock) = setup(0.0);
        let mut seq = Sequence::new();
        seq.append(&[
            Keyframe::new(VarId(9), Value::from(1.0f64)),
            Keyframe::new(VarId(1), Value::from(2.0f64)),
            Keyframe::new(VarId(9), Value::from(4.0f64)).with_delta(50),
            Keyframe::new(VarId(1), Value::from(4.0f64)),
        ]);
        player.play(Arc::new(seq));

        assert!(player.tick(&mut registry, &mut memory));
        assert_eq!(memory.read_value::<f64>(X).unwrap(), 2.0);

        clock.advance(50);
        assert!(player.tick(&mut registry, &mut memory));
        assert_eq!(memory.read_value::<f64>(X).unwrap(), 4.0);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_stopped_player_never_touches_memory() {
        let (mut registry, _, mut player, clock) = setup(0.0);
        let mut memory = MockVariableMemory::new();
        memory.expect_read_memory().never();
        memory.expect_write_memory().never();

        clock.advance(10);
        assert!(!player.tick(&mut registry, &mut memory));
        clock.advance(10);
        assert!(!player.tick(&mut registry, &mut memory));
    }
}
