//! Cards of Wizardry - headless combat core
//!
//! Runs one arena run from a JSON config with an autopilot wizard and
//! prints a summary.

use std::process::ExitCode;

use cards_of_wizardry::cli;
use cards_of_wizardry::headless::{run_headless, HeadlessRunConfig};

fn main() -> ExitCode {
    let args = cli::parse_args();

    let mut config = match HeadlessRunConfig::load_from_file(&args.headless) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(output) = args.output {
        config.output_path = Some(output.display().to_string());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }

    println!("Starting headless run...");
    println!("  Start wave: {}", config.start_wave + 1);
    println!("  Hand: {} cards ({:?} draw)", config.hand_size, config.draw_mode);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    match run_headless(&config, !args.quiet) {
        Ok(result) => {
            println!(
                "Run complete: {} after {:.1}s",
                if result.survived { "survived" } else { "defeated" },
                result.elapsed
            );
            println!("  Waves cleared: {}", result.waves_cleared);
            println!("  Enemies killed: {}", result.enemies_killed);
            println!("  Spells cast: {}", result.spells_cast);
            println!(
                "  Damage dealt/taken: {:.0}/{:.0}",
                result.damage_dealt, result.damage_taken
            );
            if let Some(seed) = result.random_seed {
                println!("  Seed: {}", seed);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Headless run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
