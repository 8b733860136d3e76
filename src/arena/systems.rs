//! Arena Systems API
//!
//! Stable entry point for the per-frame simulation. The headless runner (and
//! any future front end) adds the arena systems through here instead of
//! reaching into individual modules.
//!
//! ## System Phases
//!
//! Arena systems run in three ordered phases each frame:
//!
//! 1. **StatusAndResources** - status timers, burn ticks, mana regeneration, card cooldowns
//! 2. **ActionsAndMovement** - spell casts, enemy AI, motion, projectiles
//! 3. **Resolution** - healing and damage, deaths, waves and spawning
//!
//! ## Usage
//!
//! ```ignore
//! use cards_of_wizardry::arena::systems;
//!
//! systems::configure_arena_system_ordering(&mut app);
//! systems::add_core_arena_systems(&mut app, || true);
//! ```

use bevy::prelude::*;

// === Phase 1: Status and Resources ===
pub use super::resolution::regenerate_mana;
pub use super::spells::casting::tick_spell_cards;
pub use super::status::{apply_status_events, tick_status_effects};

// === Phase 2: Actions and Movement ===
pub use super::enemies::run_enemy_ai;
pub use super::projectiles::{move_projectiles, process_projectile_hits, tick_meteor_strikes};
pub use super::resolution::integrate_motion;
pub use super::spells::casting::resolve_spell_casts;

// === Phase 3: Resolution ===
pub use super::enemies::spawn_enemies;
pub use super::resolution::{apply_damage_events, apply_healing_events, check_deaths};
pub use super::waves::run_waves;

// === Components and Resources ===
pub use super::components::{Combatant, Dead, Enemy, GameRng, Player, RunStats, Velocity};
pub use super::status::StatusEffects;

/// System set labels for arena system ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArenaSystemPhase {
    /// Phase 1: status ticks, mana regeneration, card cooldowns
    StatusAndResources,
    /// Phase 2: casting, enemy decisions, movement, projectiles
    ActionsAndMovement,
    /// Phase 3: damage and healing, deaths, waves
    Resolution,
}

/// Configures the ordering between arena system phases.
///
/// Call this once during app setup before adding arena systems.
pub fn configure_arena_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            ArenaSystemPhase::StatusAndResources,
            ArenaSystemPhase::ActionsAndMovement,
            ArenaSystemPhase::Resolution,
        )
            .chain(),
    );
}

/// Adds the core arena simulation systems to the app.
///
/// Player input (or the headless autopilot) should send `CastSpellEvent`s
/// before `ArenaSystemPhase::ActionsAndMovement`.
pub fn add_core_arena_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Phase 1: Status and Resources
    app.add_systems(
        Update,
        (
            apply_status_events,
            tick_status_effects,
            regenerate_mana,
            tick_spell_cards,
        )
            .chain()
            .in_set(ArenaSystemPhase::StatusAndResources)
            .run_if(run_condition.clone()),
    );

    // Flush deferred commands between phases
    app.add_systems(
        Update,
        apply_deferred
            .after(ArenaSystemPhase::StatusAndResources)
            .before(ArenaSystemPhase::ActionsAndMovement)
            .run_if(run_condition.clone()),
    );

    // Phase 2: Actions and Movement
    app.add_systems(
        Update,
        (
            resolve_spell_casts,
            run_enemy_ai,
            apply_deferred, // Flush new projectiles and stage-two spawns
            integrate_motion,
            move_projectiles,
            process_projectile_hits,
            tick_meteor_strikes,
        )
            .chain()
            .in_set(ArenaSystemPhase::ActionsAndMovement)
            .run_if(run_condition.clone()),
    );

    app.add_systems(
        Update,
        apply_deferred
            .after(ArenaSystemPhase::ActionsAndMovement)
            .before(ArenaSystemPhase::Resolution)
            .run_if(run_condition.clone()),
    );

    // Phase 3: Resolution
    app.add_systems(
        Update,
        (
            apply_healing_events,
            apply_damage_events,
            check_deaths,
            apply_deferred, // Despawned enemies must not count as alive
            run_waves,
            spawn_enemies,
        )
            .chain()
            .in_set(ArenaSystemPhase::Resolution)
            .run_if(run_condition),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct PhaseTrace(Vec<ArenaSystemPhase>);

    fn record(phase: ArenaSystemPhase) -> impl FnMut(ResMut<PhaseTrace>) {
        move |mut trace: ResMut<PhaseTrace>| trace.0.push(phase.clone())
    }

    #[test]
    fn test_phases_run_in_order() {
        let mut app = App::new();
        app.init_resource::<PhaseTrace>();
        configure_arena_system_ordering(&mut app);
        // Registered back to front so only the set ordering can sort them
        app.add_systems(
            Update,
            record(ArenaSystemPhase::Resolution).in_set(ArenaSystemPhase::Resolution),
        )
        .add_systems(
            Update,
            record(ArenaSystemPhase::ActionsAndMovement)
                .in_set(ArenaSystemPhase::ActionsAndMovement),
        )
        .add_systems(
            Update,
            record(ArenaSystemPhase::StatusAndResources)
                .in_set(ArenaSystemPhase::StatusAndResources),
        );

        app.update();

        assert_eq!(
            app.world().resource::<PhaseTrace>().0,
            vec![
                ArenaSystemPhase::StatusAndResources,
                ArenaSystemPhase::ActionsAndMovement,
                ArenaSystemPhase::Resolution,
            ]
        );
    }
}
