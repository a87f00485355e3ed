//! Example: Generate event logs for every preset scenario.
//!
//! Run with: cargo run --example generate_events

use syncprof_testdata::{generate_events, presets};

fn main() {
    println!("Syncprof Testdata Generator");
    println!("===========================\n");

    if let Err(e) = std::fs::create_dir_all("datasets") {
        eprintln!("Could not create datasets/: {}", e);
        return;
    }

    for name in presets::PRESET_NAMES {
        let Some(config) = presets::by_name(name) else {
            continue;
        };
        let log = generate_events(&config.with_seed(42));

        let csv_path = format!("datasets/{}.csv", name);
        match log.to_csv(&csv_path) {
            Ok(()) => println!(
                "  Created {} ({} events, {} sources, {:.1}s)",
                csv_path,
                log.len(),
                log.source_names().len(),
                log.duration_secs()
            ),
            Err(e) => eprintln!("  Warning: Could not save {}: {}", csv_path, e),
        }
    }

    println!("\nAll event logs generated successfully!");
}
