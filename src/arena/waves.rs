//! Wave Spawning
//!
//! Waves are authored in `assets/config/waves.ron`. For each wave a spawn
//! schedule is built up front: every enemy gets a random time inside the
//! spawn window (scripted entries get a fixed one), and the list is sorted
//! by time. The runner replays it and decides when the wave is over:
//!
//! - elapsed time reaches the wave duration, or
//! - the spawn window has passed and no enemies are left.
//!
//! After the last authored wave the survival wave repeats forever, each
//! repeat scaling enemy health and damage up linearly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::combat::events::SpawnEnemyEvent;
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::error::ConfigError;

use super::components::{Combatant, Enemy, EnemyKind, GameRng, RunStats};
use super::constants::SPAWN_RADIUS;

/// Default location of the wave definitions file
pub const WAVES_CONFIG_PATH: &str = "assets/config/waves.ron";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaveEnemy {
    pub kind: EnemyKind,
    pub count: u32,
}

/// An enemy that always appears at a fixed time into the wave.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScriptedSpawn {
    pub kind: EnemyKind,
    pub at: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaveDefinition {
    pub enemies: Vec<WaveEnemy>,
    #[serde(default)]
    pub scripted: Vec<ScriptedSpawn>,
    /// Random spawn times fall in `[0, spawn_duration)`
    pub spawn_duration: f32,
    /// Hard time limit for the wave
    pub wave_duration: f32,
}

impl WaveDefinition {
    pub fn enemy_count(&self) -> usize {
        self.enemies.iter().map(|e| e.count as usize).sum::<usize>() + self.scripted.len()
    }
}

/// Root structure for the waves.ron file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WavesConfig {
    pub waves: Vec<WaveDefinition>,
    /// Repeats after the authored waves run out
    pub survival: WaveDefinition,
    /// Added to the difficulty multiplier per survival repeat
    pub difficulty_step: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct WaveDefinitions {
    config: WavesConfig,
}

impl WaveDefinitions {
    pub fn new(config: WavesConfig) -> Result<Self, ConfigError> {
        let all_waves = config.waves.iter().chain(std::iter::once(&config.survival));
        for (index, wave) in all_waves.enumerate() {
            if wave.spawn_duration <= 0.0 || wave.wave_duration <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "wave {} must have positive spawn and wave durations",
                    index + 1
                )));
            }
            if wave.spawn_duration > wave.wave_duration {
                return Err(ConfigError::Invalid(format!(
                    "wave {} spawn window is longer than the wave",
                    index + 1
                )));
            }
        }
        if config.difficulty_step < 0.0 {
            return Err(ConfigError::Invalid("difficulty_step must not be negative".to_string()));
        }
        Ok(Self { config })
    }

    pub fn from_ron_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: WavesConfig = ron::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            details: e.to_string(),
        })?;
        Self::new(config)
    }

    /// Number of authored waves (not counting survival)
    pub fn authored_len(&self) -> usize {
        self.config.waves.len()
    }

    /// The wave at a 0-based index; past the authored list this is survival.
    pub fn wave(&self, index: usize) -> &WaveDefinition {
        self.config.waves.get(index).unwrap_or(&self.config.survival)
    }

    /// Health/damage multiplier for the wave at `index`.
    pub fn difficulty(&self, index: usize) -> f32 {
        let authored = self.authored_len();
        if index < authored {
            1.0
        } else {
            survival_multiplier((index - authored + 1) as u32, self.config.difficulty_step)
        }
    }
}

/// Load wave definitions from a RON file
pub fn load_wave_definitions(path: &Path) -> Result<WaveDefinitions, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    let definitions = WaveDefinitions::from_ron_str(&contents, &path.display().to_string())?;
    info!(
        "Loaded {} waves (+ survival) from {}",
        definitions.authored_len(),
        path.display()
    );
    Ok(definitions)
}

/// `1 + repeat * step`
pub fn survival_multiplier(repeat: u32, step: f32) -> f32 {
    1.0 + repeat as f32 * step
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledSpawn {
    pub kind: EnemyKind,
    /// Seconds after wave start
    pub time: f32,
}

/// Spawn schedule for one wave, sorted by time.
///
/// Scripted times are clamped into the spawn window.
pub fn build_spawn_schedule(wave: &WaveDefinition, rng: &mut GameRng) -> Vec<ScheduledSpawn> {
    let mut schedule = Vec::with_capacity(wave.enemy_count());
    for entry in &wave.enemies {
        for _ in 0..entry.count {
            schedule.push(ScheduledSpawn {
                kind: entry.kind,
                time: rng.random_range(0.0, wave.spawn_duration),
            });
        }
    }
    for scripted in &wave.scripted {
        schedule.push(ScheduledSpawn {
            kind: scripted.kind,
            time: scripted.at.clamp(0.0, wave.spawn_duration),
        });
    }
    schedule.sort_by(|a, b| a.time.total_cmp(&b.time));
    schedule
}

/// Delay before each spawn, measured from the previous one.
pub fn spawn_delays(schedule: &[ScheduledSpawn]) -> Vec<f32> {
    let mut previous = 0.0;
    schedule
        .iter()
        .map(|spawn| {
            let delay = spawn.time - previous;
            previous = spawn.time;
            delay
        })
        .collect()
}

/// Random point on the spawn circle
pub fn spawn_position(rng: &mut GameRng) -> Vec2 {
    rng.random_direction() * SPAWN_RADIUS
}

/// What one runner tick produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WaveTick {
    /// Index of a wave that started this tick
    pub started: Option<usize>,
    pub spawns: Vec<(EnemyKind, Vec2)>,
    /// Index of a wave that completed this tick
    pub completed: Option<usize>,
    /// Difficulty for this tick's spawns
    pub difficulty: f32,
}

/// Replays spawn schedules and advances through waves.
#[derive(Resource, Debug, Clone)]
pub struct WaveRunner {
    /// 0-based wave index; at or past the authored count means survival
    pub wave_index: usize,
    /// Seconds since the current wave started
    pub elapsed: f32,
    schedule: Vec<ScheduledSpawn>,
    cursor: usize,
    started: bool,
    pub waves_cleared: u32,
}

impl WaveRunner {
    pub fn new(start_wave: usize) -> Self {
        Self {
            wave_index: start_wave,
            elapsed: 0.0,
            schedule: Vec::new(),
            cursor: 0,
            started: false,
            waves_cleared: 0,
        }
    }

    /// 1-based number for display
    pub fn wave_number(&self) -> usize {
        self.wave_index + 1
    }

    pub fn is_survival(&self, definitions: &WaveDefinitions) -> bool {
        self.wave_index >= definitions.authored_len()
    }

    /// Spawns not yet emitted for the current wave
    pub fn pending_spawns(&self) -> usize {
        self.schedule.len() - self.cursor
    }

    /// Advance by `dt`. `alive` is the number of enemies currently alive.
    pub fn tick(
        &mut self,
        dt: f32,
        alive: usize,
        definitions: &WaveDefinitions,
        rng: &mut GameRng,
    ) -> WaveTick {
        let wave = definitions.wave(self.wave_index);
        let mut tick = WaveTick {
            difficulty: definitions.difficulty(self.wave_index),
            ..Default::default()
        };

        if !self.started {
            self.started = true;
            self.elapsed = 0.0;
            self.cursor = 0;
            self.schedule = build_spawn_schedule(wave, rng);
            tick.started = Some(self.wave_index);
        }

        self.elapsed += dt;
        while self.cursor < self.schedule.len() && self.schedule[self.cursor].time <= self.elapsed {
            tick.spawns.push((self.schedule[self.cursor].kind, spawn_position(rng)));
            self.cursor += 1;
        }

        let remaining = alive + tick.spawns.len() + self.pending_spawns();
        let timed_out = self.elapsed >= wave.wave_duration;
        let cleared = remaining == 0 && self.elapsed >= wave.spawn_duration;
        if timed_out || cleared {
            tick.completed = Some(self.wave_index);
            self.waves_cleared += 1;
            self.wave_index += 1;
            self.started = false;
        }
        tick
    }
}

/// Drive the wave runner and request spawns.
pub fn run_waves(
    time: Res<Time>,
    mut runner: ResMut<WaveRunner>,
    definitions: Res<WaveDefinitions>,
    mut rng: ResMut<GameRng>,
    mut stats: ResMut<RunStats>,
    mut combat_log: ResMut<CombatLog>,
    enemies: Query<&Combatant, With<Enemy>>,
    mut spawn_events: EventWriter<SpawnEnemyEvent>,
) {
    let alive = enemies.iter().filter(|c| c.is_alive()).count();
    let tick = runner.tick(time.delta_secs(), alive, &definitions, &mut rng);

    if let Some(index) = tick.started {
        let wave = definitions.wave(index);
        info!("Wave {} begins ({} enemies)", runner.wave_number(), wave.enemy_count());
        combat_log.log(
            CombatLogEventType::Wave,
            format!(
                "Wave {} begins: {} enemies, difficulty x{:.2}",
                index + 1,
                wave.enemy_count(),
                tick.difficulty
            ),
        );
    }

    for (kind, position) in &tick.spawns {
        spawn_events.send(SpawnEnemyEvent {
            kind: *kind,
            position: *position,
            difficulty: tick.difficulty,
        });
    }

    if let Some(index) = tick.completed {
        stats.waves_cleared += 1;
        combat_log.log(
            CombatLogEventType::Wave,
            format!("Wave {} complete after {:.1}s", index + 1, runner.elapsed),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> WaveDefinitions {
        WaveDefinitions::from_ron_str(
            r#"(
                waves: [
                    (enemies: [(kind: Bee, count: 3), (kind: Slime, count: 2)],
                     scripted: [(kind: Boar, at: 99.0)],
                     spawn_duration: 20.0, wave_duration: 60.0),
                ],
                survival: (enemies: [(kind: Bee, count: 1)], spawn_duration: 5.0, wave_duration: 30.0),
                difficulty_step: 0.5,
            )"#,
            "inline",
        )
        .unwrap()
    }

    #[test]
    fn test_schedule_sorted_and_in_window() {
        let defs = definitions();
        let mut rng = GameRng::from_seed(12);
        let schedule = build_spawn_schedule(defs.wave(0), &mut rng);
        assert_eq!(schedule.len(), 6);
        assert!(schedule.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(schedule.iter().all(|s| s.time >= 0.0 && s.time <= 20.0));
        // Scripted entry clamped to the end of the window
        assert_eq!(schedule.last().map(|s| (s.kind, s.time)), Some((EnemyKind::Boar, 20.0)));
    }

    #[test]
    fn test_delays_sum_to_last_time() {
        let defs = definitions();
        let mut rng = GameRng::from_seed(3);
        let schedule = build_spawn_schedule(defs.wave(0), &mut rng);
        let delays = spawn_delays(&schedule);
        assert!(delays.iter().all(|d| *d >= 0.0));
        let total: f32 = delays.iter().sum();
        assert!((total - schedule.last().unwrap().time).abs() < 1e-4);
    }

    #[test]
    fn test_survival_difficulty_scales_linearly() {
        let defs = definitions();
        assert_eq!(defs.difficulty(0), 1.0);
        assert_eq!(defs.difficulty(1), 1.5);
        assert_eq!(defs.difficulty(2), 2.0);
        assert_eq!(defs.wave(7).wave_duration, 30.0);
    }

    #[test]
    fn test_wave_times_out() {
        let defs = definitions();
        let mut rng = GameRng::from_seed(1);
        let mut runner = WaveRunner::new(0);
        let mut completed_at = None;
        for step in 1..=70 {
            let tick = runner.tick(1.0, 10, &defs, &mut rng);
            if tick.completed.is_some() {
                completed_at = Some(step);
                break;
            }
        }
        assert_eq!(completed_at, Some(60));
        assert_eq!(runner.wave_index, 1);
        assert!(runner.is_survival(&defs));
    }
}
