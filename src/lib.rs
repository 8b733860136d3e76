//! Cards of Wizardry - combat core
//!
//! Headless simulation of the arena: combatants and status effects, enemy
//! state machines, the spell card hand with mastery tiers, and waves.
//!
//! This library exposes the core modules for testing and reuse.

pub mod arena;
pub mod cli;
pub mod combat;
pub mod error;
pub mod headless;
pub mod settings;

// Re-export commonly used types
pub use arena::components::{Combatant, EnemyKind, GameRng};
pub use combat::log::{CombatLog, CombatLogEventType};
pub use error::ConfigError;
pub use headless::{run_headless, HeadlessRunConfig, RunResult};
