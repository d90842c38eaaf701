//! # keyreel: keyframe recorder/player for bound variables
//!
//! Records changes to a small set of externally owned numeric variables
//! (a camera position, a zoom factor, an iteration count, ...) as sparse
//! keyframes, stores them in a compact binary file, and replays them later
//! with linear interpolation between keyframes.
//!
//! ## Architecture
//!
//! - **Registry**: maps small integer ids to addresses in the caller's memory
//! - **Codec**: fixed 8-byte values with integer/float aware add and difference
//! - **Session**: keyframe sequences, the `MBDF` file format, recorder and player
//! - **Deck**: one context bundling registry, recorder and player
//!
//! The caller keeps ownership of the variables and passes its memory (any
//! [`VariableMemory`]) into every capture and tick.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use keyreel::{Deck, DeckConfig, ManualClock, MemoryMap, VarId, VariableKind};
//!
//! let clock = ManualClock::new();
//! let mut deck = Deck::from_config(&DeckConfig::default(), clock.clone());
//!
//! let mut memory = MemoryMap::new();
//! memory.add_region(0x1000, 8);
//! memory.write_value(0x1000, 10.0f64).unwrap();
//! deck.bind_named(VarId(3), "zoom", VariableKind::Float, 0x1000, 8);
//!
//! let mut seq = deck.create_sequence();
//! deck.capture(&memory, &mut seq);
//! clock.advance(500);
//! memory.write_value(0x1000, 20.0f64).unwrap();
//! deck.capture(&memory, &mut seq);
//!
//! deck.play(Arc::new(seq));
//! deck.tick(&mut memory);
//! clock.advance(500);
//! deck.tick(&mut memory);
//!
//! assert_eq!(memory.read_value::<f64>(0x1000).unwrap(), 20.0);
//! assert!(!deck.is_playing());
//! ```

pub mod clock;
pub mod config;
pub mod deck;
pub mod error;
pub mod memory;
pub mod registry;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{DeckConfig, VariableSpec};
pub use deck::Deck;
pub use error::{ReelError, Result};
pub use memory::{MemoryMap, VariableMemory};
pub use registry::{VariableBinding, VariableRegistry};
pub use session::{Keyframe, PlaybackState, Player, Recorder, Sequence};
pub use types::{Value, VarId, VariableKind};
