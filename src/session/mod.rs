//! Sequence recording and playback module
//!
//! This module provides the keyframe sequence, its binary file format, and
//! the recorder and player that move values between bound variables and a
//! sequence.
//!
//! # Features
//!
//! - Record only the variables that changed since their last keyframe
//! - Save and load sequences as compact `MBDF` files
//! - Replay sequences with linear interpolation between keyframes
//! - Pause, resume and stop playback
//! - Print sequences for debugging

pub mod dump;
pub mod file;
pub mod player;
pub mod recorder;
pub mod types;

pub use dump::{format_keyframe, format_sequence};
pub use file::{FILE_SIGNATURE, RECORD_SIZE};
pub use player::Player;
pub use recorder::Recorder;
pub use types::{Keyframe, PlaybackState, Sequence, DEFAULT_CHUNK_SIZE};
