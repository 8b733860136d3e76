//! Headless run execution
//!
//! Steps the arena with a fixed timestep and no graphical output, suitable
//! for automated testing and balance runs.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::path::Path;
use std::time::Duration;

use crate::arena::components::{Combatant, Dead, GameRng, Player, RunStats, Velocity};
use crate::arena::spells::{SpellBook, SpellDefinitions, SpellHand};
use crate::arena::status::StatusEffects;
use crate::arena::systems::ArenaSystemPhase;
use crate::arena::waves::WaveRunner;
use crate::arena::{ArenaPlugin, GameData};
use crate::combat::log::{CombatLog, CombatLogEventType, RunMetadata};
use crate::error::ConfigError;
use crate::settings::Preferences;

use super::autopilot::{run_autopilot, AutopilotState};
use super::config::HeadlessRunConfig;

/// Name the player's combatant goes by in the log
pub const PLAYER_NAME: &str = "Wizard";

/// Result of a finished headless run
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub waves_cleared: u32,
    /// Player still alive when the run stopped
    pub survived: bool,
    /// Simulated seconds
    pub elapsed: f32,
    pub enemies_killed: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub final_health: f32,
    pub spells_cast: u32,
    pub cards_discarded: u32,
    pub masteries_reached: u32,
    pub random_seed: Option<u64>,
}

/// Resource to track headless run state
#[derive(Resource)]
pub struct HeadlessRunState {
    pub max_duration: f32,
    pub max_waves: Option<u32>,
    pub elapsed_time: f32,
    pub output_path: Option<String>,
    pub complete: bool,
    pub result: Option<RunResult>,
}

/// Plugin for headless runs: the arena plus the autopilot and run-end checks.
///
/// Expects the run resources (definitions, hand, book, wave runner, RNG,
/// preferences, `HeadlessRunState`) to be inserted by the caller.
pub struct HeadlessPlugin;

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ArenaPlugin)
            .init_resource::<AutopilotState>()
            .add_systems(
                Update,
                run_autopilot
                    .after(ArenaSystemPhase::StatusAndResources)
                    .before(ArenaSystemPhase::ActionsAndMovement),
            )
            .add_systems(
                Update,
                (headless_track_time, headless_check_run_end)
                    .chain()
                    .after(ArenaSystemPhase::Resolution),
            );
    }
}

/// Build a ready-to-step app for `config` without running it.
pub fn build_headless_app(config: &HeadlessRunConfig, logging: bool) -> Result<App, ConfigError> {
    config.validate()?;
    let data = GameData::load(&config.assets_root)?;

    let mut rng = match config.random_seed {
        Some(seed) => {
            info!("Using deterministic RNG with seed: {}", seed);
            GameRng::from_seed(seed)
        }
        None => {
            info!("Using non-deterministic RNG (no seed provided)");
            GameRng::from_entropy()
        }
    };

    let prefs = match &config.prefs_path {
        Some(path) => Preferences::load(path),
        None => Preferences::in_memory(),
    };
    let mut book = SpellBook::from_preferences(&data.spells, &prefs);
    for name in &config.unlocked_spells {
        book.unlock_by_name(&data.spells, name)?;
    }
    if book.unlocked_count() == 0 {
        return Err(ConfigError::Invalid("no spells are unlocked".to_string()));
    }
    let hand = SpellHand::new(config.hand_size, config.draw_mode, &book, &data.spells, &mut rng);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(TransformPlugin)
        .add_plugins(HierarchyPlugin);
    if logging {
        app.add_plugins(bevy::log::LogPlugin::default());
    }
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        config.timestep(),
    )))
    .insert_resource(data.spells)
    .insert_resource(data.enemies)
    .insert_resource(data.waves)
    .insert_resource(rng)
    .insert_resource(book)
    .insert_resource(hand)
    .insert_resource(prefs)
    .insert_resource(WaveRunner::new(config.start_wave))
    .insert_resource(HeadlessRunState {
        max_duration: config.max_duration_secs,
        max_waves: config.max_waves,
        elapsed_time: 0.0,
        output_path: config.output_path.clone(),
        complete: false,
        result: None,
    })
    .add_plugins(HeadlessPlugin);

    let player = &config.player;
    app.world_mut().spawn((
        Transform::default(),
        Combatant::new(PLAYER_NAME, player.max_health, player.max_mana)
            .with_regen(player.mana_regen)
            .with_stats(player.strength, player.wisdom),
        StatusEffects::default(),
        Velocity::default(),
        Player,
    ));
    app.world_mut()
        .resource_mut::<CombatLog>()
        .log(CombatLogEventType::RunEvent, "Run started (headless mode)".to_string());

    app.finish();
    app.cleanup();
    Ok(app)
}

/// Run a headless game to completion and return its result.
pub fn run_headless(config: &HeadlessRunConfig, logging: bool) -> Result<RunResult, ConfigError> {
    let mut app = build_headless_app(config, logging)?;

    // One extra second of ticks covers the zero-length first frame
    let max_ticks = ((config.max_duration_secs + 1.0) * config.tick_rate as f32).ceil() as u64;
    for _ in 0..max_ticks {
        app.update();
        if app.world().resource::<HeadlessRunState>().complete {
            break;
        }
    }

    let result = app
        .world_mut()
        .resource_mut::<HeadlessRunState>()
        .result
        .take();
    result.ok_or_else(|| {
        ConfigError::Invalid(format!("run did not finish within {} ticks", max_ticks))
    })
}

fn headless_track_time(time: Res<Time>, mut state: ResMut<HeadlessRunState>) {
    if !state.complete {
        state.elapsed_time += time.delta_secs();
    }
}

/// End the run when the player dies, time runs out or enough waves are cleared.
#[allow(clippy::too_many_arguments)]
fn headless_check_run_end(
    mut state: ResMut<HeadlessRunState>,
    players: Query<(&Combatant, Has<Dead>), With<Player>>,
    stats: Res<RunStats>,
    rng: Res<GameRng>,
    book: Res<SpellBook>,
    definitions: Res<SpellDefinitions>,
    mut prefs: ResMut<Preferences>,
    mut combat_log: ResMut<CombatLog>,
) {
    if state.complete {
        return;
    }
    let Ok((player, is_dead)) = players.get_single() else {
        return;
    };

    let reason = if is_dead || !player.is_alive() {
        "the wizard has fallen"
    } else if state.elapsed_time >= state.max_duration {
        "time limit reached"
    } else if state.max_waves.is_some_and(|max| stats.waves_cleared >= max) {
        "wave target reached"
    } else {
        return;
    };

    info!("Run over after {:.1}s: {}", state.elapsed_time, reason);
    combat_log.log(CombatLogEventType::RunEvent, format!("Run over: {}", reason));

    let result = RunResult {
        waves_cleared: stats.waves_cleared,
        survived: player.is_alive(),
        elapsed: state.elapsed_time,
        enemies_killed: stats.enemies_killed,
        damage_dealt: player.damage_dealt,
        damage_taken: player.damage_taken,
        final_health: player.current_health,
        spells_cast: stats.spells_cast,
        cards_discarded: stats.cards_discarded,
        masteries_reached: stats.masteries_reached,
        random_seed: rng.seed,
    };

    book.write_preferences(&definitions, &mut prefs);
    if let Err(e) = prefs.save() {
        warn!("Failed to save preferences: {}", e);
    }

    if let Some(path) = &state.output_path {
        save_run_log(&combat_log, &result, Path::new(path));
    }

    state.result = Some(result);
    state.complete = true;
}

fn save_run_log(combat_log: &CombatLog, result: &RunResult, path: &Path) {
    let metadata = RunMetadata {
        waves_cleared: result.waves_cleared,
        survived: result.survived,
        elapsed: result.elapsed,
        enemies_killed: result.enemies_killed,
        random_seed: result.random_seed,
    };
    match combat_log.save_to_file(&metadata, path) {
        Ok(filename) => info!("Combat log saved to: {}", filename),
        Err(e) => warn!("Failed to save combat log: {}", e),
    }
}
