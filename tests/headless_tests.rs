//! Integration tests for headless run execution
//!
//! These tests verify that:
//! - Headless runs stop on their time limit or on player death
//! - Run results are accessible programmatically
//! - Seeded RNG produces deterministic results
//! - The combat log is written when an output path is given

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use cards_of_wizardry::arena::spells::CardDrawMode;
use cards_of_wizardry::error::ConfigError;
use cards_of_wizardry::headless::{run_headless, HeadlessRunConfig};

/// Helper to create a short run config against the shipped game data
fn create_config(seed: Option<u64>, max_duration_secs: f32) -> HeadlessRunConfig {
    HeadlessRunConfig {
        max_duration_secs,
        random_seed: seed,
        tick_rate: 30,
        assets_root: PathBuf::from(env!("CARGO_MANIFEST_DIR")),
        ..HeadlessRunConfig::default()
    }
}

#[test]
fn test_run_stops_at_time_limit_or_death() {
    let config = create_config(Some(12345), 20.0);
    let result = run_headless(&config, false).unwrap();

    let step = 1.0 / config.tick_rate as f32;
    assert!(result.elapsed <= 20.0 + 2.0 * step);
    if result.survived {
        assert!(result.elapsed >= 20.0 - step);
        assert!(result.final_health > 0.0);
    } else {
        assert_eq!(result.final_health, 0.0);
    }
    assert_eq!(result.random_seed, Some(12345));
}

#[test]
fn test_autopilot_fights_back() {
    let result = run_headless(&create_config(Some(7), 30.0), false).unwrap();
    assert!(result.spells_cast > 0);
    assert!(result.masteries_reached > 0, "first casts should announce Basic mastery");
}

#[test]
fn test_same_seed_same_result() {
    let config = create_config(Some(42), 15.0);
    let first = run_headless(&config, false).unwrap();
    let second = run_headless(&config, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_deck_mode_runs() {
    let mut config = create_config(Some(8), 10.0);
    config.draw_mode = CardDrawMode::Deck;
    config.hand_size = 6;
    let result = run_headless(&config, false).unwrap();
    assert!(result.elapsed > 0.0);
}

#[test]
fn test_unknown_spell_unlock_rejected() {
    let mut config = create_config(None, 5.0);
    config.unlocked_spells = vec!["Not A Spell".to_string()];
    let err = run_headless(&config, false).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownName { .. }));
}

#[test]
fn test_missing_assets_reported() {
    let mut config = create_config(None, 5.0);
    config.assets_root = PathBuf::from("/definitely/not/here");
    let err = run_headless(&config, false).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}

#[test]
fn test_combat_log_written() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("run.json");
    let mut config = create_config(Some(3), 10.0);
    config.output_path = Some(log_path.display().to_string());

    let result = run_headless(&config, false).unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&log_path).unwrap()).unwrap();
    assert_eq!(saved["metadata"]["random_seed"], 3);
    assert_eq!(saved["metadata"]["survived"], result.survived);
    assert!(saved["entries"].as_array().unwrap().len() > 1);
}

#[test]
fn test_spell_progress_saved_to_prefs() {
    let dir = tempfile::tempdir().unwrap();
    let prefs_path = dir.path().join("prefs.ron");
    let mut config = create_config(Some(5), 20.0);
    config.prefs_path = Some(prefs_path.clone());

    let result = run_headless(&config, false).unwrap();
    assert!(result.spells_cast > 0);

    let prefs = cards_of_wizardry::settings::Preferences::load(&prefs_path);
    assert!(prefs.has_key("Usage_Magic Missile"));
}

#[test]
fn test_config_parses_from_json() {
    let config = HeadlessRunConfig::from_json_str(
        r#"{
            "start_wave": 2,
            "max_waves": 1,
            "random_seed": 99,
            "hand_size": 5,
            "draw_mode": "Deck",
            "unlocked_spells": ["Arcane Shield"],
            "player": { "max_health": 150.0, "strength": 4.0 }
        }"#,
        "inline",
    )
    .unwrap();
    assert_eq!(config.start_wave, 2);
    assert_eq!(config.max_waves, Some(1));
    assert_eq!(config.hand_size, 5);
    assert_eq!(config.player.max_health, 150.0);
    assert_eq!(config.player.mana_regen, 5.0);
    assert_eq!(config.unlocked_spells, vec!["Arcane Shield".to_string()]);
}
