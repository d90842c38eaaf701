//! Recorder for capturing keyframes from bound variables

use crate::clock::{Clock, MonotonicClock};
use crate::memory::VariableMemory;
use crate::registry::VariableRegistry;
use crate::types::Value;

use super::types::{Keyframe, Sequence};

/// Captures changed variable values into a [`Sequence`]
///
/// Every capture is stamped with the wall-clock time elapsed since the
/// previous capture made by this recorder.
#[derive(Debug)]
pub struct Recorder<C: Clock = MonotonicClock> {
    /// Time source
    clock: C,
    /// Time of the previous capture (None before the first one)
    last_capture_ms: Option<u64>,
}

impl Default for Recorder<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder<MonotonicClock> {
    /// Create a recorder driven by real time
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl<C: Clock> Recorder<C> {
    /// Create a recorder with a specific clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            last_capture_ms: None,
        }
    }

    /// The recorder's clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Forget the previous capture time so the next capture has delta 0
    pub fn reset(&mut self) {
        self.last_capture_ms = None;
    }

    /// Capture every bound variable whose value changed
    ///
    /// On an empty sequence all bound variables are captured. Otherwise a
    /// variable is captured when its current bytes differ from its most
    /// recent keyframe, or when it has no keyframe yet. The batch's first
    /// keyframe carries the elapsed time since the previous capture and the
    /// rest carry 0. The capture time advances even when nothing changed.
    ///
    /// Returns the number of keyframes appended.
    pub fn capture<M>(
        &mut self,
        registry: &VariableRegistry,
        memory: &M,
        sequence: &mut Sequence,
    ) -> usize
    where
        M: VariableMemory + ?Sized,
    {
        let now = self.clock.now_ms();
        let elapsed = self
            .last_capture_ms
            .map(|last| now.saturating_sub(last))
            .unwrap_or(0);
        self.last_capture_ms = Some(now);

        let mut batch = Vec::new();
        for (id, binding) in registry.iter_bound() {
            let bytes = match memory.read_memory(binding.address, binding.size) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Skipping {} during capture: {}", id, e);
                    continue;
                }
            };
            let candidate = Keyframe::new(id, Value::from_bytes(&bytes));

            let changed = sequence
                .latest_for(id)
                .map(|prev| prev.value != candidate.value)
                .unwrap_or(true);
            if changed {
                batch.push(candidate);
            }
        }

        if let Some(first) = batch.first_mut() {
            first.delta_time = u32::try_from(elapsed).unwrap_or(u32::MAX);
        }
        sequence.append(&batch);

        tracing::debug!(
            "Captured {} keyframes ({} ms since previous capture)",
            batch.len(),
            elapsed
        );
        batch.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::MemoryMap;
    use crate::types::{VarId, VariableKind};

    fn setup() -> (VariableRegistry, MemoryMap, Recorder<ManualClock>, ManualClock) {
        let mut registry = VariableRegistry::new();
        registry.bind(VarId(1), VariableKind::Float, 0x100, 8);
        registry.bind(VarId(2), VariableKind::Integer, 0x108, 4);

        let mut memory = MemoryMap::new();
        memory.add_region(0x100, 16);
        memory.write_value(0x100, 1.0f64).unwrap();
        memory.write_value(0x108, 10u32).unwrap();

        let clock = ManualClock::new();
        let recorder = Recorder::with_clock(clock.clone());
        (registry, memory, recorder, clock)
    }

    #[test]
    fn test_first_capture_takes_everything() {
        let (registry, memory, mut recorder, _) = setup();
        let mut seq = Sequence::new();

        assert_eq!(recorder.capture(&registry, &memory, &mut seq), 2);
        assert_eq!(seq.get(0).unwrap().variable, VarId(1));
        assert_eq!(seq.get(1).unwrap().variable, VarId(2));
        assert!(seq.keyframes().iter().all(|k| k.delta_time == 0));
    }

    #[test]
    fn test_unchanged_values_are_suppressed() {
        let (registry, memory, mut recorder, clock) = setup();
        let mut seq = Sequence::new();

        recorder.capture(&registry, &memory, &mut seq);
        clock.advance(100);
        assert_eq!(recorder.capture(&registry, &memory, &mut seq), 0);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_delta_covers_empty_captures() {
        let (registry, mut memory, mut recorder, clock) = setup();
        let mut seq = Sequence::new();

        recorder.capture(&registry, &memory, &mut seq);
        clock.advance(100);
        recorder.capture(&registry, &memory, &mut seq);
        clock.advance(40);
        memory.write_value(0x108, 11u32).unwrap();
        recorder.capture(&registry, &memory, &mut seq);

        // Delta is measured from the previous capture, even an empty one
        let last = seq.last().unwrap();
        assert_eq!(last.variable, VarId(2));
        assert_eq!(last.delta_time, 40);
    }

    #[test]
    fn test_batch_timing() {
        let (registry, mut memory, mut recorder, clock) = setup();
        let mut seq = Sequence::new();

        recorder.capture(&registry, &memory, &mut seq);
        clock.advance(250);
        memory.write_value(0x100, 2.0f64).unwrap();
        memory.write_value(0x108, 20u32).unwrap();

        assert_eq!(recorder.capture(&registry, &memory, &mut seq), 2);
        assert_eq!(seq.get(2).unwrap().delta_time, 250);
        assert_eq!(seq.get(3).unwrap().delta_time, 0);
    }

    #[test]
    fn test_newly_bound_variable_is_captured() {
        let (mut registry, mut memory, mut recorder, clock) = setup();
        let mut seq = Sequence::new();
        recorder.capture(&registry, &memory, &mut seq);

        registry.bind(VarId(5), VariableKind::Integer, 0x10C, 4);
        memory.write_value(0x10C, 3u32).unwrap();
        clock.advance(10);

        assert_eq!(recorder.capture(&registry, &memory, &mut seq), 1);
        assert_eq!(seq.last().unwrap().variable, VarId(5));
    }

    #[test]
    fn test_nearest_prior_value_wins() {
        let (registry, mut memory, mut recorder, clock) = setup();
        let mut seq = Sequence::new();

        recorder.capture(&registry, &memory, &mut seq);
        memory.write_value(0x100, 5.0f64).unwrap();
        clock.advance(10);
        recorder.capture(&registry, &memory, &mut seq);

        // Back to the very first value: differs from the latest keyframe
        memory.write_value(0x100, 1.0f64).unwrap();
        clock.advance(10);
        assert_eq!(recorder.capture(&registry, &memory, &mut seq), 1);
    }

    #[test]
    fn test_unreadable_binding_is_skipped() {
        let (mut registry, memory, mut recorder, _) = setup();
        registry.bind(VarId(9), VariableKind::Float, 0x9000, 8);
        let mut seq = Sequence::new();

        assert_eq!(recorder.capture(&registry, &memory, &mut seq), 2);
        assert!(seq.latest_for(VarId(9)).is_none());
    }
}
