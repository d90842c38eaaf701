//! Variable registry
//!
//! Fixed-capacity table mapping a [`VarId`] to a binding into
//! collaborator-owned memory. Slots are addressed directly by id, so
//! lookups are O(1); an empty slot means the variable is unbound.

use crate::types::{VarId, VariableKind, VALUE_SIZE};

/// Default number of registry slots
pub const DEFAULT_MAX_VARS: usize = 64;

/// Association between a variable id and the memory holding its live value
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBinding {
    /// Address of the value inside the collaborator's memory
    pub address: u64,
    /// Width of the value in bytes (1..=8)
    pub size: usize,
    /// Numeric kind used for interpolation math
    pub kind: VariableKind,
    /// Current interpolation rate in value units per millisecond (0.0 = idle)
    pub rate: f64,
    /// Display name for debug output
    pub name: Option<String>,
}

impl VariableBinding {
    /// Check if the player is currently interpolating this variable
    pub fn is_interpolating(&self) -> bool {
        self.rate != 0.0
    }
}

/// Table of variable bindings indexed by [`VarId`]
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    slots: Vec<Option<VariableBinding>>,
}

impl Default for VariableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableRegistry {
    /// Create a registry with [`DEFAULT_MAX_VARS`] slots
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_VARS)
    }

    /// Create a registry with a specific number of slots
    pub fn with_capacity(max_vars: usize) -> Self {
        Self {
            slots: vec![None; max_vars],
        }
    }

    /// Number of slots (valid ids are `1..capacity`)
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Bind a variable to memory
    ///
    /// Returns `false` (and leaves the registry untouched) if the id is the
    /// null sentinel or out of range, the address is 0, or `size` exceeds
    /// 8 bytes. A size of 0 clears the slot. Rebinding overwrites in place
    /// and resets the interpolation rate.
    pub fn bind(&mut self, id: VarId, kind: VariableKind, address: u64, size: usize) -> bool {
        self.bind_inner(id, None, kind, address, size)
    }

    /// Bind a variable with a display name
    pub fn bind_named(
        &mut self,
        id: VarId,
        name: impl Into<String>,
        kind: VariableKind,
        address: u64,
        size: usize,
    ) -> bool {
        self.bind_inner(id, Some(name.into()), kind, address, size)
    }

    fn bind_inner(
        &mut self,
        id: VarId,
        name: Option<String>,
        kind: VariableKind,
        address: u64,
        size: usize,
    ) -> bool {
        if id.is_null() || id.index() >= self.slots.len() {
            tracing::warn!("Rejected binding for {}: id out of range", id);
            return false;
        }
        if address == 0 {
            tracing::warn!("Rejected binding for {}: null address", id);
            return false;
        }
        if size > VALUE_SIZE {
            tracing::warn!("Rejected binding for {}: {} bytes is wider than 8", id, size);
            return false;
        }

        let slot = &mut self.slots[id.index()];
        if size == 0 {
            *slot = None;
        } else {
            *slot = Some(VariableBinding {
                address,
                size,
                kind,
                rate: 0.0,
                name,
            });
        }
        true
    }

    /// Look up a bound variable
    pub fn get(&self, id: VarId) -> Option<&VariableBinding> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up a bound variable mutably
    pub fn get_mut(&mut self, id: VarId) -> Option<&mut VariableBinding> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Check if a variable is bound
    pub fn is_bound(&self, id: VarId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate bound variables in ascending id order
    pub fn iter_bound(&self) -> impl Iterator<Item = (VarId, &VariableBinding)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|b| (VarId(i as u32), b)))
    }

    /// Iterate bound variables mutably in ascending id order
    pub fn iter_bound_mut(&mut self) -> impl Iterator<Item = (VarId, &mut VariableBinding)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|b| (VarId(i as u32), b)))
    }

    /// Set every interpolation rate back to zero
    pub fn clear_rates(&mut self) {
        for (_, binding) in self.iter_bound_mut() {
            binding.rate = 0.0;
        }
    }

    /// Display name for a variable (`(NULL)` for the sentinel, `varN` if unnamed)
    pub fn display_name(&self, id: VarId) -> String {
        if id.is_null() {
            return "(NULL)".to_string();
        }
        self.get(id)
            .and_then(|b| b.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
