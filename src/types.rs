//! Core data types for keyreel
//!
//! This module contains the value representation shared by the recorder,
//! the player and the sequence file format.
//!
//! # Main Types
//!
//! - [`VarId`] - Small dense variable identifier (0 is the "no variable" sentinel)
//! - [`VariableKind`] - Whether a bound variable is an integer or a float
//! - [`Value`] - Fixed 8-byte container for any supported scalar
//! - [`Scalar`] - Typed view of a [`Value`] used for interpolation math
//!
//! # Byte Layout
//!
//! A [`Value`] holds the bound variable's bytes in its leading `size`
//! bytes; the rest stay zero. Equality is always over all 8 bytes, which is
//! what change detection in the recorder relies on.
//!
//! Integer variables are always reinterpreted as a full 8-byte `i64`
//! regardless of their bound size, and integer differences go through
//! `f64`, so magnitudes above 2^53 lose precision. Each integer step is
//! truncated back to `i64`, so an interpolation rate below one unit per
//! tick never moves an integer variable.

use serde::{Deserialize, Serialize};

/// Width of every value payload in bytes
pub const VALUE_SIZE: usize = 8;

/// Identifier of a bound variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(pub u32);

impl VarId {
    /// The "no variable" sentinel
    pub const NULL: VarId = VarId(0);

    /// Check if this is the null sentinel
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Slot index in a registry table
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for VarId {
    fn from(id: u32) -> Self {
        VarId(id)
    }
}

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "var{}", self.0)
    }
}

/// Numeric kind of a bound variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// Signed integer, interpreted as 8 bytes wide
    #[default]
    Integer,
    /// IEEE float, 4 or 8 bytes wide
    Float,
}

impl std::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableKind::Integer => write!(f, "integer"),
            VariableKind::Float => write!(f, "float"),
        }
    }
}

/// Typed interpretation of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

impl Scalar {
    /// Decode a value according to the owning binding's kind and size
    ///
    /// Returns `None` for combinations that have no numeric meaning
    /// (floats that are neither 4 nor 8 bytes wide).
    pub fn decode(kind: VariableKind, size: usize, value: &Value) -> Option<Scalar> {
        let b = value.0;
        match (kind, size) {
            (VariableKind::Integer, _) => Some(Scalar::Int64(i64::from_le_bytes(b))),
            (VariableKind::Float, 4) => {
                Some(Scalar::Float32(f32::from_le_bytes([b[0], b[1], b[2], b[3]])))
            }
            (VariableKind::Float, 8) => Some(Scalar::Float64(f64::from_le_bytes(b))),
            _ => None,
        }
    }

    /// Encode back into a zero-padded value
    pub fn encode(&self) -> Value {
        match *self {
            Scalar::Int64(v) => Value(v.to_le_bytes()),
            Scalar::Float32(v) => Value::from_bytes(&v.to_le_bytes()),
            Scalar::Float64(v) => Value(v.to_le_bytes()),
        }
    }

    /// Widen to `f64`
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Int64(v) => v as f64,
            Scalar::Float32(v) => v as f64,
            Scalar::Float64(v) => v,
        }
    }

    /// Add `delta` in the scalar's own representation
    ///
    /// Integers are summed in `f64` and truncated back toward zero on every
    /// call, so a step smaller than 1 is lost.
    pub fn offset(&self, delta: f64) -> Scalar {
        match *self {
            Scalar::Int64(v) => Scalar::Int64((v as f64 + delta) as i64),
            Scalar::Float32(v) => Scalar::Float32(v + delta as f32),
            Scalar::Float64(v) => Scalar::Float64(v + delta),
        }
    }
}

/// Fixed 8-byte container for a recorded or bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(pub [u8; VALUE_SIZE]);

impl Value {
    /// The all-zero value
    pub const ZERO: Value = Value([0; VALUE_SIZE]);

    /// Copy up to 8 bytes into a zero-initialized value
    ///
    /// Sources longer than 8 bytes yield [`Value::ZERO`].
    pub fn from_bytes(bytes: &[u8]) -> Value {
        let mut out = [0u8; VALUE_SIZE];
        if bytes.len() <= VALUE_SIZE {
            out[..bytes.len()].copy_from_slice(bytes);
        }
        Value(out)
    }

    /// The raw 8 bytes
    pub fn as_bytes(&self) -> &[u8; VALUE_SIZE] {
        &self.0
    }

    /// The leading `size` bytes (clamped to 8)
    pub fn leading(&self, size: usize) -> &[u8] {
        &self.0[..size.min(VALUE_SIZE)]
    }

    /// Return `self + delta`, interpreted according to `kind` and `size`
    ///
    /// Unsupported kind/size combinations return `self` unchanged.
    pub fn add(&self, kind: VariableKind, size: usize, delta: f64) -> Value {
        match Scalar::decode(kind, size, self) {
            Some(scalar) => scalar.offset(delta).encode(),
            None => *self,
        }
    }

    /// Return `target - start` as `f64`, interpreted according to `kind` and `size`
    ///
    /// Unsupported kind/size combinations yield `0.0`.
    pub fn difference(kind: VariableKind, size: usize, start: &Value, target: &Value) -> f64 {
        match (
            Scalar::decode(kind, size, start),
            Scalar::decode(kind, size, target),
        ) {
            (Some(s), Some(t)) => t.as_f64() - s.as_f64(),
            _ => 0.0,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value(v.to_le_bytes())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::from_bytes(&v.to_le_bytes())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value(v.to_le_bytes())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::from_bytes(&v.to_le_bytes())
    }
}
