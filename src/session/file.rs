//! Binary sequence files
//!
//! Layout (all integers little-endian):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | signature `MBDF` |
//! | 4 + 16n | 4 | delta time (ms, `u32`) |
//! | 8 + 16n | 4 | variable id (`u32`) |
//! | 12 + 16n | 8 | value payload |
//!
//! The record area must be an exact multiple of 16 bytes. A failed load
//! never yields a partially populated sequence.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{ReelError, Result, ResultExt};
use crate::types::{Value, VarId, VALUE_SIZE};

use super::types::{Keyframe, Sequence, DEFAULT_CHUNK_SIZE};

/// File signature
pub const FILE_SIGNATURE: &[u8; 4] = b"MBDF";

/// Width of one keyframe record on disk
pub const RECORD_SIZE: usize = 4 + 4 + VALUE_SIZE;

impl Keyframe {
    /// Encode as a fixed-width record
    pub fn to_record(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[0..4].copy_from_slice(&self.delta_time.to_le_bytes());
        out[4..8].copy_from_slice(&self.variable.0.to_le_bytes());
        out[8..].copy_from_slice(self.value.as_bytes());
        out
    }

    /// Decode a fixed-width record
    pub fn from_record(record: &[u8; RECORD_SIZE]) -> Self {
        let delta_time = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        let variable = u32::from_le_bytes([record[4], record[5], record[6], record[7]]);
        Self {
            delta_time,
            variable: VarId(variable),
            value: Value::from_bytes(&record[8..]),
        }
    }
}

impl Sequence {
    /// Decode a sequence from a reader positioned at the signature
    pub fn read_from<R: Read>(mut reader: R, chunk_size: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        if bytes.len() < FILE_SIGNATURE.len() || &bytes[..4] != FILE_SIGNATURE {
            return Err(ReelError::BadSignature {
                found: bytes.iter().take(4).copied().collect(),
            });
        }

        let body = &bytes[4..];
        let trailing = body.len() % RECORD_SIZE;
        if trailing != 0 {
            return Err(ReelError::Truncated { trailing });
        }

        let keyframes: Vec<Keyframe> = body
            .chunks_exact(RECORD_SIZE)
            .map(|chunk| {
                let mut record = [0u8; RECORD_SIZE];
                record.copy_from_slice(chunk);
                Keyframe::from_record(&record)
            })
            .collect();

        Ok(Sequence::from_keyframes(keyframes, chunk_size))
    }

    /// Encode the sequence, signature first
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(FILE_SIGNATURE)?;
        for keyframe in self.keyframes() {
            writer.write_all(&keyframe.to_record())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load a sequence file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_chunk_size(path, DEFAULT_CHUNK_SIZE)
    }

    /// Load a sequence file, growing by `chunk_size` on later appends
    pub fn load_with_chunk_size(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Opening {}", path.display()))?;
        let seq = Self::read_from(BufReader::new(file), chunk_size)
            .with_context(|| format!("Reading {}", path.display()))?;
        tracing::info!("Loaded {} keyframes from {}", seq.len(), path.display());
        Ok(seq)
    }

    /// Write the sequence to a file, replacing any existing one
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("Creating {}", path.display()))?;
        self.write_to(BufWriter::new(file))
            .with_context(|| format!("Writing {}", path.display()))?;
        tracing::info!("Stored {} keyframes to {}", self.len(), path.display());
        Ok(())
    }
}
