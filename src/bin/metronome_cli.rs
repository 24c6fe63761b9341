use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metronome_engine::config::AppConfig;
use metronome_engine::managers::BroadcastChannelManager;
use metronome_engine::preset::{Preset, PresetLibrary};
use metronome_engine::tempo::TempoTerm;
use metronome_engine::BeatScheduler;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser, Debug)]
#[command(
    name = "metronome_cli",
    about = "Drift-corrected metronome engine front end"
)]
struct Cli {
    /// Override the JSON config file (defaults to metronome.json)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the metronome, printing each beat as it fires
    Play {
        #[arg(long, default_value_t = 120)]
        bpm: u32,
        #[arg(long, default_value_t = 4)]
        beats: u32,
        /// How many measures to play before stopping
        #[arg(long, default_value_t = 4)]
        measures: u32,
    },
    /// Print the tempo marking for a BPM value
    Term {
        #[arg(long)]
        bpm: u32,
    },
    /// Manage the saved preset library
    #[command(subcommand)]
    Preset(PresetCommands),
}

#[derive(Subcommand, Debug)]
enum PresetCommands {
    /// List saved presets in order
    List,
    /// Append a preset to the library
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        bpm: u32,
        #[arg(long)]
        beats: u32,
    },
    /// Delete the preset at the given index
    Delete { index: usize },
    /// Play the preset at the given index
    Play {
        index: usize,
        #[arg(long, default_value_t = 4)]
        measures: u32,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    match cli.command {
        Commands::Play {
            bpm,
            beats,
            measures,
        } => run_play(&config, bpm, beats, measures),
        Commands::Term { bpm } => {
            println!("{}", TempoTerm::from_bpm(bpm));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Preset(command) => run_preset(&config, command),
    }
}

fn run_play(config: &AppConfig, bpm: u32, beats: u32, measures: u32) -> Result<ExitCode> {
    let scheduler = BeatScheduler::with_config(&config.scheduler);
    scheduler.set_tempo(bpm);
    scheduler.set_time_signature(beats);
    play(&scheduler, measures)
}

fn run_preset(config: &AppConfig, command: PresetCommands) -> Result<ExitCode> {
    let mut library = PresetLibrary::load(&config.presets.path);

    match command {
        PresetCommands::List => {
            if library.is_empty() {
                println!("No presets saved.");
            }
            for (index, preset) in library.presets().iter().enumerate() {
                println!(
                    "{:3}  {}  {} bpm ({}), {} beats",
                    index,
                    preset.name,
                    preset.bpm,
                    TempoTerm::from_bpm(preset.bpm),
                    preset.beats
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        PresetCommands::Save { name, bpm, beats } => {
            library.add(Preset { name, bpm, beats });
            library.save().context("failed to write preset library")?;
            println!("Saved preset {}.", library.len() - 1);
            Ok(ExitCode::SUCCESS)
        }
        PresetCommands::Delete { index } => {
            let removed = library.remove(index)?;
            library.save().context("failed to write preset library")?;
            println!("Deleted preset \"{}\".", removed.name);
            Ok(ExitCode::SUCCESS)
        }
        PresetCommands::Play { index, measures } => {
            let scheduler = BeatScheduler::with_config(&config.scheduler);
            let preset = library.apply(index, &scheduler)?;
            println!("Playing preset \"{}\".", preset.name);
            play(&scheduler, measures)
        }
    }
}

/// Run the scheduler for `measures` full measures, printing beats as they
/// arrive on the broadcast channel.
fn play(scheduler: &BeatScheduler, measures: u32) -> Result<ExitCode> {
    let manager = BroadcastChannelManager::new();
    scheduler.set_listener(manager.channel_listener());
    let mut beat_rx = manager
        .subscribe_beats()
        .context("beat channel not initialized")?;

    let beats_per_measure = scheduler.beats_per_measure();
    let total_beats = measures.saturating_mul(beats_per_measure).max(1);
    println!(
        "{} bpm ({}), {} beats per measure, {} measures",
        scheduler.bpm(),
        TempoTerm::from_bpm(scheduler.bpm()),
        beats_per_measure,
        measures
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create Tokio runtime for beat output")?;

    scheduler.start();
    rt.block_on(async {
        let mut received = 0u32;
        while received < total_beats {
            match beat_rx.recv().await {
                Ok(event) => {
                    let marker = if event.is_accent { " *" } else { "" };
                    println!("  {}/{}{}", event.beat_number, beats_per_measure, marker);
                    received += 1;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[CLI] Lagged behind beat stream, skipped {}", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
    scheduler.stop();

    Ok(ExitCode::SUCCESS)
}
