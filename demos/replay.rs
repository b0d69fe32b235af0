//! Replays a dump of segmented frames, one JSON `Frame` per line:
//!
//! `{"dims":[800,600],"timestamp":0.04,"blobs":[{"x":10,"y":20,"w":90,"h":60,"a":4800}]}`
//!
//! Usage: `cargo run --example replay -- frames.jsonl [config.json]`

use qmeter::{Config, Frame, VehicleDetector};
use std::io::BufRead;

fn main() -> Result<(), qmeter::Error> {
    let mut args = std::env::args().skip(1);
    let Some(frames_path) = args.next() else {
        eprintln!("expected frames file name");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(path) => Config::from_reader(std::fs::File::open(path)?)?,
        None => Config::default(),
    };

    let mut detector = VehicleDetector::new(config)?;
    let reader = std::io::BufReader::new(std::fs::File::open(frames_path)?);

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let frame: Frame = serde_json::from_str(&line)?;

        match detector.process_blobs(&frame) {
            Ok(res) => {
                let speeds: Vec<String> = res.speeds.iter().map(|s| format!("{:.1}", s)).collect();
                println!(
                    "#{} t={:.2}s boxes={} count={} speeds=[{}]",
                    idx,
                    frame.timestamp,
                    res.boxes.len(),
                    res.count,
                    speeds.join(", ")
                );
            }
            Err(err) => println!("#{} skipped: {}", idx, err),
        }
    }

    let stats = detector.stats().snapshot();
    println!(
        "total: {} vehicles, average speed {} km/h",
        stats.count, stats.average_speed
    );

    Ok(())
}
