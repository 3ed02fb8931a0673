//! Print detailed info about the first connected Avian board.

use radar_sdk::Record;

fn main() {
    env_logger::init();

    let device = match radar_sdk::AvianDevice::open_first() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match device.board_uuid() {
        Ok(uuid) => println!("UUID:        {}", uuid),
        Err(e) => println!("UUID:        <{}>", e),
    }
    if let Ok(fw) = device.firmware_info() {
        println!("Firmware:    {} {}", fw.description.to_text(), fw.version());
    }
    if let Ok(sensor) = device.sensor_info() {
        println!(
            "Sensor:      {} ({} TX, {} RX)",
            sensor.description.to_text(),
            sensor.num_tx_antennas,
            sensor.num_rx_antennas
        );
    }
    if let Ok(shield) = device.shield_info() {
        println!("Shield:      {:?}", shield.kind());
    }
    if let Ok(t) = device.temperature() {
        println!("Temperature: {:.1} C", t);
    }
    if let Ok(config) = device.config() {
        println!("Config:");
        for (key, value) in config.to_mapping(true).iter() {
            println!("  {:<26} {:?}", key, value);
        }
    }
}
