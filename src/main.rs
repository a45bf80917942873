use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crossbeam::channel::bounded;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration, Instant};

use tiltspot::recording::{save_recording, Recording};
use tiltspot::sensors::{self, SyntheticMotion};
use tiltspot::spots::{labels, SpotAlphas};
use tiltspot::{ChannelSink, FusionConfig, OrientationEstimate, SensorAvailability, SensorHelper};

#[derive(Parser, Debug)]
#[command(name = "tiltspot")]
#[command(
    about = "Tilt visualiser driven by synthetic accelerometer/magnetometer streams",
    long_about = None
)]
struct Args {
    /// Duration in seconds (0 = continuous)
    #[arg(value_name = "SECONDS", default_value = "30")]
    duration: u64,

    /// JSON config file (missing fields keep defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not track physical rotation
    #[arg(long)]
    no_orientation: bool,

    /// Report the raw azimuth without low-pass filtering
    #[arg(long)]
    no_smoothing: bool,

    /// Rotate the simulated screen a quarter turn every N seconds
    #[arg(long, default_value = "0")]
    screen_turn_secs: f64,

    /// Heading sweep rate of the simulated device, degrees per second
    #[arg(long, default_value = "6.0")]
    yaw_rate: f64,

    /// Save the generated sensor readings for `replay`
    #[arg(long)]
    record: Option<PathBuf>,

    /// Seconds between printed status lines
    #[arg(long, default_value = "1.0")]
    status_interval: f64,
}

fn load_config(args: &Args) -> Result<FusionConfig> {
    let mut config = match &args.config {
        Some(path) => FusionConfig::load(path)?,
        None => FusionConfig::default(),
    };
    if args.no_orientation {
        config.enable_orientation = false;
    }
    if args.no_smoothing {
        config.enable_smooth_azimuth = false;
    }
    config.validate()?;
    Ok(config)
}

/// `limit_secs == 0` runs until interrupted.
fn duration_reached(elapsed: Duration, limit_secs: u64) -> bool {
    limit_secs > 0 && elapsed >= Duration::from_secs(limit_secs)
}

fn print_status(estimate: &OrientationEstimate) {
    let [azimuth, pitch, roll] = labels(estimate);
    let spots = SpotAlphas::from_estimate(estimate);
    println!(
        "[{}] azimuth {:>7}  pitch {:>7}  roll {:>7}  | spots T{:.2} B{:.2} L{:.2} R{:.2}",
        ts_now(),
        azimuth,
        pitch,
        roll,
        spots.top,
        spots.bottom,
        spots.left,
        spots.right
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = load_config(&args)?;

    log::info!("TiltSpot starting");
    log::info!("  Duration: {} seconds (0=continuous)", args.duration);
    log::info!("  Orientation tracking: {}", config.enable_orientation);
    log::info!("  Azimuth smoothing: {}", config.enable_smooth_azimuth);

    let (estimate_tx, estimate_rx) = bounded::<OrientationEstimate>(64);
    let mut helper = SensorHelper::new(config, ChannelSink::new(estimate_tx))?;
    helper.start(SensorAvailability::all())?;

    let motion = SyntheticMotion {
        yaw_rate_dps: args.yaw_rate,
        screen_turn_secs: args.screen_turn_secs,
        ..SyntheticMotion::default()
    };

    let (reading_tx, mut reading_rx) = mpsc::channel(256);
    let subscriptions = helper.subscriptions();
    let _accel_handle = tokio::spawn(sensors::accel_loop(reading_tx.clone(), motion));
    let _mag_handle = tokio::spawn(sensors::mag_loop(reading_tx.clone(), motion));
    if subscriptions.orientation {
        tokio::spawn(sensors::orientation_loop(reading_tx.clone(), motion));
    }
    // Drop original sender so tasks only hold references
    drop(reading_tx);

    let mut recording = Recording::default();
    let mut latest: Option<OrientationEstimate> = None;
    let mut estimate_count = 0u64;
    let start = Instant::now();
    let status_interval = Duration::from_secs_f64(args.status_interval.max(0.0));
    let mut last_status = Instant::now();

    loop {
        if duration_reached(start.elapsed(), args.duration) {
            log::info!("Duration reached, stopping...");
            break;
        }

        while let Ok(reading) = reading_rx.try_recv() {
            helper.handle(&reading);
            if args.record.is_some() {
                recording.readings.push(reading);
            }
        }

        while let Ok(estimate) = estimate_rx.try_recv() {
            estimate_count += 1;
            latest = Some(estimate);
        }

        let now = Instant::now();
        if now.duration_since(last_status) >= status_interval {
            if let Some(estimate) = latest.as_ref() {
                print_status(estimate);
            }
            last_status = now;
        }

        sleep(Duration::from_millis(10)).await;
    }

    helper.stop()?;

    if let Some(path) = &args.record {
        save_recording(path, &recording)?;
        log::info!("Saved {} readings to {}", recording.readings.len(), path.display());
    }

    println!("\n=== Final Stats ===");
    println!("Estimates: {}", estimate_count);
    println!("Dropped:   {}", helper.sink().dropped());
    if let Some(estimate) = latest {
        print_status(&estimate);
    }

    Ok(())
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
