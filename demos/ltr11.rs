//! Read LTR11 Doppler frames into a reused buffer and print the detector state.

use radar_sdk::{FrameBuffer, Ltr11Device};
use std::time::Duration;

fn main() {
    env_logger::init();

    let mut device = match Ltr11Device::open_first() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to open device: {}", e);
            std::process::exit(1);
        }
    };

    let config = match device.config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read config: {}", e);
            std::process::exit(1);
        }
    };
    if let Ok(hz) = device.sampling_frequency(config.prt) {
        println!("Sampling frequency: {} Hz", hz);
    }

    let mut buffer = match FrameBuffer::with_len(config.num_of_samples as usize) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = device.start_acquisition() {
        eprintln!("Failed to start acquisition: {}", e);
        std::process::exit(1);
    }

    for i in 0..50 {
        match device.next_frame_into(&mut buffer, Some(Duration::from_secs(1))) {
            Ok(meta) => println!(
                "frame {:<3} power={:.4} motion={} approaching={}",
                i, meta.avg_power, meta.motion, meta.direction
            ),
            Err(e) if e.is_retryable() => eprintln!("Retrying: {}", e),
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }
}
