//! keyreel - sequence file inspection and headless playback
//!
//! `dump` prints a sequence file one keyframe per line; `play` replays it
//! against simulated memory laid out from the configured variables and
//! logs the variables on every frame that changed them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use keyreel::{
    config::default_config_path, session::format_sequence, types::Scalar, Clock, DeckConfig,
    ManualClock, MemoryMap, Player, Sequence, Value, VariableMemory, VariableRegistry, VarId,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Base address of the simulated variable memory
const SIM_BASE_ADDRESS: u64 = 0x1000;

/// Upper bound on simulated frames, in case a sequence never ends
const MAX_SIM_FRAMES: u64 = 10_000_000;

#[derive(Parser, Debug)]
#[command(name = "keyreel", version, about = "Keyframe sequence tools")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every keyframe of a sequence file
    Dump {
        /// Sequence file (defaults to the configured sequence_path)
        file: Option<PathBuf>,

        /// Print JSON instead of the text table
        #[arg(long)]
        json: bool,
    },
    /// Replay a sequence file against simulated memory
    Play {
        /// Sequence file (defaults to the configured sequence_path)
        file: Option<PathBuf>,

        /// Simulated frame length in milliseconds
        #[arg(long, default_value_t = 16)]
        step_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,keyreel=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_ref() {
        Some(path) => DeckConfig::load(path)
            .with_context(|| format!("Loading config {}", path.display()))?,
        None => default_config_path()
            .map(|path| DeckConfig::load_or_default(path))
            .unwrap_or_default(),
    };

    match cli.command {
        Command::Dump { file, json } => {
            let path = file.unwrap_or_else(|| config.sequence_path.clone());
            let seq = Sequence::load_with_chunk_size(&path, config.chunk_size)?;
            if json {
                println!("{}", seq.to_json()?);
            } else {
                let (registry, _) = config.build_registry(SIM_BASE_ADDRESS);
                print!("{}", format_sequence(&seq, &registry));
                println!(
                    "  {} keyframes, {:.3} s total",
                    seq.len(),
                    seq.duration_ms() as f64 / 1000.0
                );
            }
        }
        Command::Play { file, step_ms } => {
            let path = file.unwrap_or_else(|| config.sequence_path.clone());
            let seq = Sequence::load_with_chunk_size(&path, config.chunk_size)?;
            simulate(&config, seq, step_ms.max(1))?;
        }
    }

    Ok(())
}

/// Tick a player with a manual clock until the sequence ends
fn simulate(config: &DeckConfig, seq: Sequence, step_ms: u64) -> anyhow::Result<()> {
    let (mut registry, layout) = config.build_registry(SIM_BASE_ADDRESS);
    if layout.is_empty() {
        tracing::warn!("No variables configured; keyframes will not be visible");
    }

    let mut memory = MemoryMap::new();
    for (_, address) in &layout {
        memory.add_region(*address, keyreel::types::VALUE_SIZE);
    }

    let clock = ManualClock::new();
    let mut player = Player::with_clock(clock.clone());
    player.play(Arc::new(seq));

    let mut frame = 0u64;
    while player.is_playing() && frame < MAX_SIM_FRAMES {
        if player.tick(&mut registry, &mut memory) {
            let values: Vec<String> = layout
                .iter()
                .map(|(id, _)| {
                    format!(
                        "{}={}",
                        registry.display_name(*id),
                        render(&registry, &memory, *id)
                    )
                })
                .collect();
            tracing::info!("t={:>8} ms  {}", clock.now_ms(), values.join("  "));
        }
        clock.advance(step_ms);
        frame += 1;
    }

    tracing::info!("Playback finished after {} simulated ms", clock.now_ms());
    Ok(())
}

/// Current value of a bound variable as text
fn render(registry: &VariableRegistry, memory: &MemoryMap, id: VarId) -> String {
    let Some(binding) = registry.get(id) else {
        return "unbound".to_string();
    };
    memory
        .read_memory(binding.address, binding.size)
        .ok()
        .map(|bytes| Value::from_bytes(&bytes))
        .and_then(|value| Scalar::decode(binding.kind, binding.size, &value))
        .map(|scalar| match scalar {
            Scalar::Int64(v) => v.to_string(),
            Scalar::Float32(v) => format!("{:.4}", v),
            Scalar::Float64(v) => format!("{:.4}", v),
        })
        .unwrap_or_else(|| "?".to_string())
}
