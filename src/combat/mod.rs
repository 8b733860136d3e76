//! Combat plumbing
//!
//! Event types shared by every arena system and the combat log resource.

use bevy::prelude::*;

pub mod events;
pub mod log;

use events::*;

/// Registers combat events and the combat log.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageEvent>()
            .add_event::<HealingEvent>()
            .add_event::<ApplyStatusEvent>()
            .add_event::<CastSpellEvent>()
            .add_event::<MasteryReachedEvent>()
            .add_event::<SpawnEnemyEvent>()
            .add_event::<CombatantDeathEvent>()
            .init_resource::<log::CombatLog>()
            .add_systems(First, advance_log_clock.after(bevy::time::TimeSystem));
    }
}

/// Keep the combat log's timestamp in step with simulation time
fn advance_log_clock(time: Res<Time>, mut combat_log: ResMut<log::CombatLog>) {
    combat_log.match_time += time.delta_secs();
}
