use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::time::Duration;

use gps_odometer::live_status::LiveStatus;
use gps_odometer::sensors::{gps_loop, MockGpsSource};
use gps_odometer::track::{TrackHome, TrackLog};
use gps_odometer::{FlightState, GpsData, HomeReference, Odometer, OdometerConfig, StepOutcome};

#[derive(Parser, Debug)]
#[command(name = "odometer_sim")]
#[command(about = "Drive the GPS odometer from a simulated 1 Hz receiver", long_about = None)]
struct Args {
    /// Duration in seconds (0 = continuous)
    #[arg(value_name = "SECONDS", default_value = "0")]
    duration: u64,

    /// Odometer config (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Home latitude in degrees (defaults to the first fix)
    #[arg(long, requires = "home_lon", allow_hyphen_values = true)]
    home_lat: Option<f64>,

    /// Home longitude in degrees
    #[arg(long, requires = "home_lat", allow_hyphen_values = true)]
    home_lon: Option<f64>,

    /// Simulated ground speed (m/s)
    #[arg(long, default_value = "8.0")]
    speed: f64,

    /// Simulated heading (degrees)
    #[arg(long, default_value = "45.0")]
    heading: f64,

    /// Output directory for status and recorded track
    #[arg(long, default_value = "odometer_sessions")]
    output_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => OdometerConfig::load(path)?,
        None => OdometerConfig::default(),
    };
    let period = Duration::from_secs_f64(config.sample_period_s);

    println!("[{}] GPS Odometer Simulation Starting", ts_now());
    println!("  Duration: {} seconds (0=continuous)", args.duration);
    println!("  Sample period: {:.2} s", config.sample_period_s);
    println!("  Speed: {:.1} m/s, heading {:.0} deg", args.speed, args.heading);
    println!("  Output Dir: {}", args.output_dir);

    std::fs::create_dir_all(&args.output_dir)?;

    let mut home = match (args.home_lat, args.home_lon) {
        (Some(lat), Some(lon)) => HomeReference::from_degrees(lat, lon),
        _ => HomeReference::default(),
    };

    let source = MockGpsSource::new(47.2692, 11.4041, args.heading, args.speed, config.sample_period_s);
    let (gps_tx, mut gps_rx) = mpsc::channel(100);
    let _gps_handle = tokio::spawn(gps_loop(gps_tx, source, period));

    let mut odometer = Odometer::new(config);
    let mut gps = GpsData::default();
    let mut flight = FlightState::default();
    let mut status = LiveStatus::new();
    let mut recorded = Vec::new();

    let start = Utc::now();
    let status_path = format!("{}/live_status.json", args.output_dir);

    while let Some(fix) = gps_rx.recv().await {
        if args.duration > 0 {
            let elapsed = Utc::now().signed_duration_since(start);
            if elapsed.num_seconds() as u64 >= args.duration {
                println!("[{}] Duration reached, stopping...", ts_now());
                break;
            }
        }

        if !home.valid {
            home = HomeReference::from_degrees(fix.latitude, fix.longitude);
            log::info!("home set to first fix {:.6}, {:.6}", fix.latitude, fix.longitude);
        }

        gps.publish(fix.position(), fix.ground_speed);
        let outcome = odometer.step(&mut gps, &home, &mut flight);
        if let StepOutcome::Rejected { reason, .. } = outcome {
            log::info!("[{}] step rejected: {:?}", ts_now(), reason);
        }
        recorded.push(fix);

        status.gps_fixes += 1;
        status.uptime_seconds = Utc::now().signed_duration_since(start).num_seconds().max(0) as u64;
        status.update(&odometer, &gps, &home, &flight);
        if let Err(e) = status.save(&status_path) {
            log::warn!("failed to write {}: {}", status_path, e);
        }

        if status.gps_fixes % 10 == 0 {
            println!(
                "[{}] {} fixes | odometer {:.3} km | home {:.3} km @ {} deg",
                ts_now(),
                status.gps_fixes,
                flight.odometer_km(),
                flight.home_distance,
                flight.home_bearing
            );
        }
    }

    let track = TrackLog {
        home: Some(TrackHome {
            lat: home.position().latitude_deg(),
            lon: home.position().longitude_deg(),
        }),
        fixes: recorded,
    };
    let filename = format!("{}/track_{}.json", args.output_dir, ts_now_clean());
    std::fs::write(&filename, serde_json::to_string_pretty(&track)?)?;
    println!("[{}] Recorded {} fixes to {}", ts_now(), track.fixes.len(), filename);

    println!("\n=== Final Stats ===");
    println!("GPS fixes: {}", status.gps_fixes);
    println!("Accepted steps: {}", odometer.accepted_steps());
    println!("Rejected steps: {}", odometer.rejected_steps());
    println!("Odometer: {:.3} km", flight.odometer_km());

    Ok(())
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}

fn ts_now_clean() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}
