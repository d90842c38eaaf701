//! Configuration module for keyreel
//!
//! A [`DeckConfig`] sizes the variable registry and the sequence growth
//! increment, names the default sequence file, and describes the variables
//! that tools such as the `keyreel` CLI should bind.
//!
//! # Config Location
//!
//! The default config file lives in the platform config directory:
//! - **Linux**: `~/.config/dev.keyreel/keyreel.toml`
//! - **macOS**: `~/Library/Application Support/dev.keyreel/keyreel.toml`
//! - **Windows**: `%APPDATA%\dev.keyreel\keyreel.toml`
//!
//! # Example
//!
//! ```toml
//! max_vars = 64
//! chunk_size = 256
//! sequence_path = "demo_file.bin"
//!
//! [[variables]]
//! id = 3
//! name = "zoom"
//! kind = "float"
//! size = 8
//! ```

use crate::error::{ReelError, Result};
use crate::registry::{VariableRegistry, DEFAULT_MAX_VARS};
use crate::session::DEFAULT_CHUNK_SIZE;
use crate::types::{VarId, VariableKind, VALUE_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.keyreel";

/// Config filename
pub const CONFIG_FILE: &str = "keyreel.toml";

/// Default sequence filename
pub const DEFAULT_SEQUENCE_FILE: &str = "demo_file.bin";

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// A variable to bind, as described in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Variable id (1..max_vars)
    pub id: u32,
    /// Display name
    pub name: String,
    /// Integer or float
    #[serde(default)]
    pub kind: VariableKind,
    /// Width in bytes (1..=8)
    pub size: usize,
    /// Fixed address; tools lay variables out themselves when absent
    #[serde(default)]
    pub address: Option<u64>,
}

impl VariableSpec {
    /// Create a spec without a fixed address
    pub fn new(id: u32, name: impl Into<String>, kind: VariableKind, size: usize) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            size,
            address: None,
        }
    }

    /// Set a fixed address
    pub fn with_address(mut self, address: u64) -> Self {
        self.address = Some(address);
        self
    }
}

/// Deck configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Number of registry slots
    pub max_vars: usize,
    /// Sequence growth increment in keyframes
    pub chunk_size: usize,
    /// Default sequence file
    pub sequence_path: PathBuf,
    /// Variables to bind
    pub variables: Vec<VariableSpec>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            max_vars: DEFAULT_MAX_VARS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            sequence_path: PathBuf::from(DEFAULT_SEQUENCE_FILE),
            variables: Vec::new(),
        }
    }
}

impl DeckConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: DeckConfig = toml::from_str(content)
            .map_err(|e| ReelError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReelError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load config from a file, falling back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Using default config: {}", e);
                }
                Self::default()
            }
        }
    }

    /// Save config to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ReelError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ReelError::Serialization(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| ReelError::Config(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Check limits and id uniqueness
    pub fn validate(&self) -> Result<()> {
        if self.max_vars == 0 {
            return Err(ReelError::Config("max_vars must be non-zero".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(ReelError::Config("chunk_size must be non-zero".to_string()));
        }

        let mut seen = HashSet::new();
        for var in &self.variables {
            if var.id == 0 || var.id as usize >= self.max_vars {
                return Err(ReelError::Config(format!(
                    "Variable '{}' has id {} outside 1..{}",
                    var.name, var.id, self.max_vars
                )));
            }
            if var.size == 0 || var.size > VALUE_SIZE {
                return Err(ReelError::Config(format!(
                    "Variable '{}' has size {} (must be 1..=8)",
                    var.name, var.size
                )));
            }
            if !seen.insert(var.id) {
                return Err(ReelError::Config(format!("Duplicate variable id {}", var.id)));
            }
        }
        Ok(())
    }

    /// Find a variable by id
    pub fn find_variable(&self, id: u32) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Build a registry with every configured variable bound
    ///
    /// Variables without a fixed address are placed back to back, 8 bytes
    /// apart, starting at `base_address`. Returns the registry and the
    /// address assigned to each variable.
    pub fn build_registry(&self, base_address: u64) -> (VariableRegistry, Vec<(VarId, u64)>) {
        let mut registry = VariableRegistry::with_capacity(self.max_vars);
        let mut layout = Vec::with_capacity(self.variables.len());
        let mut next = base_address;

        for var in &self.variables {
            let address = var.address.unwrap_or_else(|| {
                let a = next;
                next += VALUE_SIZE as u64;
                a
            });
            let id = VarId(var.id);
            if registry.bind_named(id, var.name.clone(), var.kind, address, var.size) {
                layout.push((id, address));
            }
        }
        (registry, layout)
    }
}
