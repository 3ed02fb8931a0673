//! List all connected radar boards.

fn main() {
    env_logger::init();

    match radar_sdk::sdk_version_full() {
        Ok(version) => println!("Radar SDK {}", version),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    match radar_sdk::list(None) {
        Ok(devices) => {
            println!("Found {} Avian device(s):", devices.len());
            for (i, dev) in devices.iter().enumerate() {
                println!("  [{}] UUID={}  Sensor={:?}  Board={}", i, dev.uuid, dev.sensor, dev.board_type);
            }
        }
        Err(e) => eprintln!("Avian enumeration failed: {}", e),
    }

    match radar_sdk::list_ltr11() {
        Ok(devices) => {
            println!("Found {} LTR11 device(s):", devices.len());
            for (i, dev) in devices.iter().enumerate() {
                println!("  [{}] UUID={}", i, dev.uuid);
            }
        }
        Err(e) => eprintln!("LTR11 enumeration failed: {}", e),
    }
}
