//! Human-readable sequence printouts

use std::fmt::Write;

use crate::registry::VariableRegistry;

use super::types::{Keyframe, Sequence};

/// Format one keyframe, rendering its value by the bound size and kind
pub fn format_keyframe(keyframe: &Keyframe, registry: &VariableRegistry) -> String {
    let delta = keyframe.delta_time;
    let total_secs = delta as f64 / 1000.0;
    let minutes = (total_secs / 60.0).floor();
    let seconds = total_secs - minutes * 60.0;

    let mut out = format!(
        "Δt = {:6} ms ({:02}:{:06.4}): {:>10}: ",
        delta,
        minutes as u64,
        seconds,
        registry.display_name(keyframe.variable)
    );

    let b = keyframe.value.as_bytes();
    let size = registry.get(keyframe.variable).map(|v| v.size).unwrap_or(0);
    match size {
        0 => out.push_str("Unbound!"),
        1 => {
            let v = b[0];
            let c = if v.is_ascii_graphic() || v == b' ' {
                v as char
            } else {
                '.'
            };
            let _ = write!(out, "[8b] 0x{:02X} ({})", v, c);
        }
        2 => {
            let _ = write!(out, "[16b] 0x{:04X}", u16::from_le_bytes([b[0], b[1]]));
        }
        4 => {
            let raw = [b[0], b[1], b[2], b[3]];
            let _ = write!(
                out,
                "[32b] {} ({}), {:.6}",
                i32::from_le_bytes(raw),
                u32::from_le_bytes(raw),
                f32::from_le_bytes(raw)
            );
        }
        8 => {
            let _ = write!(
                out,
                "[64b] {} ({}), {:.6}",
                i64::from_le_bytes(*b),
                u64::from_le_bytes(*b),
                f64::from_le_bytes(*b)
            );
        }
        n => {
            let _ = write!(out, "[{}b] 0x", n * 8);
            for byte in &b[..n] {
                let _ = write!(out, "{:02X} ", byte);
            }
        }
    }
    out
}

/// Format a whole sequence, one indexed line per keyframe
pub fn format_sequence(sequence: &Sequence, registry: &VariableRegistry) -> String {
    let mut out = String::from("  Sequence Printout:\n---------------------------------\n");
    for (index, keyframe) in sequence.keyframes().iter().enumerate() {
        let _ = writeln!(out, "  [{:04}] {}", index, format_keyframe(keyframe, registry));
    }
    out
}
