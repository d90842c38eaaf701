//! Test data builders for creating test objects

use keyreel::{
    Deck, DeckConfig, Keyframe, ManualClock, MemoryMap, Sequence, Value, VarId, VariableKind,
};

/// Base address of the memory region every scene maps
pub const SCENE_BASE: u64 = 0x2000_0000;

/// Builder for a deck bound to a block of simulated memory
pub struct SceneBuilder {
    vars: Vec<(u32, &'static str, VariableKind, usize, [u8; 8])>,
}

/// A deck, its memory and the clock driving it
pub struct Scene {
    pub deck: Deck<ManualClock>,
    pub memory: MemoryMap,
    pub clock: ManualClock,
}

impl Scene {
    /// Address assigned to a variable id
    pub fn address(id: u32) -> u64 {
        SCENE_BASE + id as u64 * 8
    }

    pub fn read_f64(&self, id: u32) -> f64 {
        self.memory.read_value::<f64>(Self::address(id)).unwrap()
    }

    pub fn read_u32(&self, id: u32) -> u32 {
        self.memory.read_value::<u32>(Self::address(id)).unwrap()
    }

    pub fn set_f64(&mut self, id: u32, value: f64) {
        self.memory.write_value(Self::address(id), value).unwrap();
    }

    pub fn set_u32(&mut self, id: u32, value: u32) {
        self.memory.write_value(Self::address(id), value).unwrap();
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn float64(mut self, id: u32, name: &'static str, value: f64) -> Self {
        self.vars
            .push((id, name, VariableKind::Float, 8, value.to_le_bytes()));
        self
    }

    pub fn float32(mut self, id: u32, name: &'static str, value: f32) -> Self {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&value.to_le_bytes());
        self.vars.push((id, name, VariableKind::Float, 4, bytes));
        self
    }

    pub fn integer32(mut self, id: u32, name: &'static str, value: u32) -> Self {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&value.to_le_bytes());
        self.vars.push((id, name, VariableKind::Integer, 4, bytes));
        self
    }

    pub fn build(self) -> Scene {
        let clock = ManualClock::new();
        let mut deck = Deck::from_config(&DeckConfig::default(), clock.clone());
        let mut memory = MemoryMap::new();
        memory.add_region(SCENE_BASE, 64 * 8);

        for (id, name, kind, size, bytes) in self.vars {
            let address = Scene::address(id);
            memory.write_value(address, u64::from_le_bytes(bytes)).unwrap();
            assert!(deck.bind_named(VarId(id), name, kind, address, size));
        }

        Scene {
            deck,
            memory,
            clock,
        }
    }
}

/// Builder for hand-written sequences
pub struct SequenceBuilder {
    keyframes: Vec<Keyframe>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }

    /// Add a keyframe `delta` ms after the previous one
    pub fn at(mut self, delta: u32, var: u32, value: impl Into<Value>) -> Self {
        self.keyframes
            .push(Keyframe::new(VarId(var), value.into()).with_delta(delta));
        self
    }

    pub fn build(self) -> Sequence {
        let mut seq = Sequence::new();
        seq.append(&self.keyframes);
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_builder() {
        let scene = SceneBuilder::new()
            .float64(1, "x", 2.5)
            .integer32(4, "iters", 200)
            .build();

        assert_eq!(scene.read_f64(1), 2.5);
        assert_eq!(scene.read_u32(4), 200);
        assert!(scene.deck.registry().is_bound(VarId(4)));
    }
}
