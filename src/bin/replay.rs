use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tiltspot::recording::load_recording;
use tiltspot::spots::SpotAlphas;
use tiltspot::{FusionConfig, FusionEvent, LatestSink, SensorAvailability, SensorHelper};

#[derive(Parser, Debug)]
#[command(about = "Replay a recorded sensor log through the fusion core")]
struct Args {
    /// Path to a recorded log (.json or .json.gz)
    #[arg(long)]
    log: PathBuf,

    /// JSON config file (missing fields keep defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not track physical rotation
    #[arg(long, default_value_t = false)]
    no_orientation: bool,

    /// Report the raw azimuth without low-pass filtering
    #[arg(long, default_value_t = false)]
    no_smoothing: bool,

    /// Write JSON lines here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FusionConfig::load(path)?,
        None => FusionConfig::default(),
    };
    config.enable_orientation &= !args.no_orientation;
    config.enable_smooth_azimuth &= !args.no_smoothing;

    let recording = load_recording(&args.log)?;
    log::info!("Loaded {} readings from {}", recording.readings.len(), args.log.display());

    let mut out: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut helper = SensorHelper::new(config, LatestSink::new())?;
    helper.start(SensorAvailability::all())?;

    let mut estimates = 0usize;
    let mut rejected = 0usize;
    let mut held = 0usize;
    let mut rotation_changes = 0usize;

    for reading in &recording.readings {
        for event in helper.handle(reading) {
            match event {
                FusionEvent::Rejected(_) => rejected += 1,
                FusionEvent::AzimuthHeld { .. } => held += 1,
                FusionEvent::RotationChanged { .. } => rotation_changes += 1,
                FusionEvent::Orientation(_) => {}
            }
        }
        if let Some(estimate) = helper.sink_mut().take() {
            estimates += 1;
            let spots = SpotAlphas::from_estimate(&estimate);
            let line = json!({
                "timestamp": estimate.timestamp,
                "azimuth": estimate.azimuth_deg,
                "pitch": estimate.pitch_deg,
                "roll": estimate.roll_deg,
                "spots": spots.as_array(),
            });
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;
    helper.stop()?;

    let config = helper.config();
    log::info!(
        "Replay done: {} estimates, {} rejected cycles, {} held azimuths, {} rotation changes",
        estimates,
        rejected,
        held,
        rotation_changes
    );
    log::info!(
        "  Orientation tracking: {}, azimuth smoothing: {} ({} ms / {}°)",
        config.enable_orientation,
        config.enable_smooth_azimuth,
        config.azimuth_update_rate_ms,
        config.azimuth_min_update_deg
    );
    Ok(())
}
