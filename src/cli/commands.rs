//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use tracing::info;

use crate::bridging::{BridgingAnchorProcessor, BridgingConfig};
use crate::config::AudioParameters;
use crate::dsp::{Compressor, ProcessingChain, ProcessingStep, Reverb};
use crate::engine::signal::sine_at;
use crate::engine::AudioTimeBuyer;
use crate::error::{Result, SolidarityError};
use crate::phrase::{PhraseParams, ZipPhrase};
use crate::system::{MasterSystem, SignalAnalysis};

const RULE_WIDTH: usize = 70;

fn banner(title: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", title);
    println!("{}", "=".repeat(RULE_WIDTH));
}

fn section(title: &str) {
    println!("\n{}", "-".repeat(RULE_WIDTH));
    println!("{}", title);
    println!("{}", "-".repeat(RULE_WIDTH));
}

fn print_analysis(analysis: &SignalAnalysis) {
    println!("  RMS: {:.4}", analysis.rms);
    println!("  Peak: {:.4}", analysis.peak);
    println!("  Dynamic Range: {:.2} dB", analysis.dynamic_range_db);
    println!(
        "  Fundamental Frequency: {:.2} Hz",
        analysis.harmonics.fundamental_frequency
    );
    let p = analysis.spatial_position;
    println!("  Spatial Position: ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
}

/// Compression, reverb, a right-front pan, then harmonize
pub fn demo_chain() -> ProcessingChain {
    ProcessingChain::new()
        .with(ProcessingStep::Compression(Compressor::new(0.5, 4.0)))
        .with(ProcessingStep::Reverb(Reverb::new(0.7)))
        .with(ProcessingStep::spatial(0.5, 0.0, 0.5))
        .with(ProcessingStep::phrase(ZipPhrase::Harmonize))
}

/// Fundamental plus two overtones at half and quarter level
pub fn three_partial_tone(sample_rate: u32, frequency: f64, duration_secs: f64) -> Vec<f64> {
    let times = AudioTimeBuyer::new(sample_rate).allocate_time_slice(duration_secs);
    let partials = [(1.0, 1.0), (2.0, 0.5), (3.0, 0.25)];
    let mut signal = vec![0.0; times.len()];
    for (multiple, level) in partials {
        for (s, p) in signal.iter_mut().zip(sine_at(frequency * multiple, &times)) {
            *s += level * p;
        }
    }
    signal
}

fn load_params(config: Option<&Path>) -> Result<AudioParameters> {
    match config {
        Some(path) => AudioParameters::load(path),
        None => Ok(AudioParameters::default()),
    }
}

/// Analyze a test tone, run three ZIP phrases and the demo chain.
pub fn demo(frequency: f64, duration: f64) -> Result<()> {
    banner("SOLIDARITY AUDIO SYSTEM - DEMONSTRATION");

    let mut system = MasterSystem::new(AudioParameters::default())?;
    println!("\nGenerating test signal ({} Hz, {} s)...", frequency, duration);
    let signal = system.generate_test_signal(frequency, duration);

    println!("\nOriginal Signal Analysis:");
    print_analysis(&system.analyze_signal(&signal)?);

    section("ZIP Phrase Processing:");
    let params = PhraseParams::default();
    for phrase in [ZipPhrase::Compression, ZipPhrase::Reverb, ZipPhrase::Spatial] {
        let processed = system.phrases_mut().process(&signal, phrase, &params)?;
        let analysis = system.analyze_signal(&processed)?;
        println!("\n{}:", phrase.as_str().to_uppercase());
        println!("  RMS: {:.4}", analysis.rms);
        println!("  Peak: {:.4}", analysis.peak);
    }

    section("Complete Processing Chain:");
    let output = system.process_audio(&signal, &demo_chain())?;
    println!("\nFinal Output Analysis:");
    print_analysis(&system.analyze_signal(&output)?);

    section("System Status:");
    let status = system.status();
    println!("  Session: {}", status.session_id);
    println!("  Engine Status: {}", status.engine_status);
    println!("  Sample Rate: {} Hz", status.sample_rate);
    println!("  ZIP Phrases Used: {}", status.zip_phrase_history.len());
    println!("  Active Processors: {}", status.active_processors.join(", "));

    println!();
    banner("DEMONSTRATION COMPLETE");
    Ok(())
}

/// Run the bridging/anchor pipeline and print per-stage statistics.
pub fn bridging(node_id: u32, apply_quantum: bool, config: Option<&Path>, duration: f64) -> Result<()> {
    banner("BRIDGING ANCHOR PROCESSOR - DEMONSTRATION");

    let processor = match config {
        Some(path) => BridgingAnchorProcessor::from_config_path(path),
        None => BridgingAnchorProcessor::with_config(BridgingConfig::default()),
    };
    let signal = three_partial_tone(processor.config().sample_rate, 440.0, duration);
    println!("\nTest signal created: {} samples", signal.len());

    let results = processor.full_process(&signal, apply_quantum, node_id)?;
    println!("\nProcessing complete (node {}):", node_id);
    println!("  Anchor points detected: {}", results.anchor_points.len());
    println!(
        "  Quantum tunneling: {}",
        if apply_quantum { "applied" } else { "skipped" }
    );

    println!("\nSignal Statistics:");
    for stats in results.statistics() {
        println!("  {:15}: RMS={:.4}, Peak={:.4}", stats.stage, stats.rms, stats.peak);
    }
    Ok(())
}

/// Run a chain file over a generated tone.
pub fn process(chain_path: &Path, config: Option<&Path>, frequency: f64, duration: f64) -> Result<()> {
    let params = load_params(config)?;
    let chain = ProcessingChain::load(chain_path)?;
    info!(path = %chain_path.display(), steps = chain.len(), "chain loaded");

    let mut system = MasterSystem::new(params)?;
    let signal = system.generate_test_signal(frequency, duration);
    let output = system.process_audio(&signal, &chain)?;

    println!("Chain: {}", chain.step_types().join(" -> "));
    println!("Output: {} samples", output.len());
    print_analysis(&system.analyze_signal(&output)?);
    Ok(())
}

/// Write the default configuration to `path`.
pub fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(SolidarityError::ConfigError {
            details: format!("{} already exists (use --force to overwrite)", path.display()),
        });
    }
    AudioParameters::default().save(path)?;
    println!("Configuration written: {}", path.display());
    Ok(())
}

/// Load, validate and print a configuration.
pub fn config_show(path: &Path) -> Result<()> {
    let params = AudioParameters::load(path)?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}
