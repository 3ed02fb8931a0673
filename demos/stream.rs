//! Stream Avian frames and report the frame rate.
//!
//! Usage: cargo run --example stream
//! Press Ctrl+C to stop.

use radar_sdk::{RadarError, StreamConfig};
use std::time::{Duration, Instant};

fn main() {
    env_logger::init();

    let device = match radar_sdk::AvianDevice::open_first() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to open device: {}", e);
            std::process::exit(1);
        }
    };

    if let Ok(config) = device.config() {
        println!("Frame shape: {:?}", config.frame_shape());
        println!("Frame time:  {:.3} s", config.frame_repetition_time_s);
    }

    let stream = match device.into_stream(StreamConfig::default()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to start acquisition: {}", e);
            std::process::exit(1);
        }
    };

    println!("Streaming frames (Ctrl+C to stop)...");

    let start = Instant::now();
    let mut count: u64 = 0;
    let mut last_report = Instant::now();

    loop {
        match stream.recv_timeout(Duration::from_secs(2)) {
            Ok(frame) => {
                count += 1;
                if count % 10 == 1 {
                    let peak = frame.iter().fold(0.0f32, |m, v| m.max(v.abs()));
                    println!("frame {:<6} shape={:?} peak={:.4}", count, frame.dim(), peak);
                }

                let now = Instant::now();
                if now.duration_since(last_report) >= Duration::from_secs(3) {
                    let elapsed = start.elapsed().as_secs_f64();
                    println!("--- {} frames in {:.1}s ({:.1} Hz) ---", count, elapsed, count as f64 / elapsed);
                    last_report = now;
                }
            }
            Err(RadarError::NoFrame(_)) => {
                eprintln!("Timeout waiting for frames");
                break;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    println!("\nTotal: {} frames in {:.1}s ({:.1} Hz)", count, elapsed, count as f64 / elapsed);
}
