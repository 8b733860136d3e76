//! Teleport sequence
//!
//! Runs independently of the owner's main state machine: every few seconds
//! (random interval) the enemy plays Outline → Dissolve → Reappear and ends
//! up somewhere on a ring around the player. While a sequence is running
//! the owner suppresses its own actions.

use bevy::prelude::*;

use crate::arena::components::GameRng;

use super::{AiCommand, AiCommands, AiInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeleportPhase {
    Outline,
    Dissolve,
    Reappear,
}

impl TeleportPhase {
    fn duration(&self) -> f32 {
        match self {
            TeleportPhase::Outline => 0.4,
            TeleportPhase::Dissolve => 0.3,
            TeleportPhase::Reappear => 0.3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Teleporter {
    /// Active phase and its remaining time
    active: Option<(TeleportPhase, f32)>,
    interval_min: f32,
    interval_max: f32,
    timer: f32,
    ring_min: f32,
    ring_max: f32,
}

impl Teleporter {
    pub fn new(
        interval_min: f32,
        interval_max: f32,
        ring_min: f32,
        ring_max: f32,
        rng: &mut GameRng,
    ) -> Self {
        Self {
            active: None,
            interval_min,
            interval_max,
            timer: rng.random_range(interval_min, interval_max),
            ring_min,
            ring_max,
        }
    }

    /// The lock: true while a sequence is playing
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn phase(&self) -> Option<TeleportPhase> {
        self.active.map(|(phase, _)| phase)
    }

    /// Advance the scheduler or the running sequence. `suppressed` holds
    /// off starting a new sequence (it never interrupts one in progress).
    pub fn tick(
        &mut self,
        input: &AiInput,
        rng: &mut GameRng,
        suppressed: bool,
        out: &mut AiCommands,
    ) {
        let Some((phase, remaining)) = self.active else {
            self.timer -= input.dt;
            if self.timer <= 0.0 && !suppressed {
                self.active = Some((TeleportPhase::Outline, TeleportPhase::Outline.duration()));
                out.push(AiCommand::TeleportPhase(TeleportPhase::Outline));
            }
            return;
        };

        let remaining = remaining - input.dt;
        if remaining > 0.0 {
            self.active = Some((phase, remaining));
            return;
        }

        self.active = match phase {
            TeleportPhase::Outline => {
                out.push(AiCommand::TeleportPhase(TeleportPhase::Dissolve));
                Some((TeleportPhase::Dissolve, TeleportPhase::Dissolve.duration()))
            }
            TeleportPhase::Dissolve => {
                let offset =
                    rng.random_direction() * rng.random_range(self.ring_min, self.ring_max);
                out.push(AiCommand::Teleport(input.player_position + offset));
                out.push(AiCommand::TeleportPhase(TeleportPhase::Reappear));
                Some((TeleportPhase::Reappear, TeleportPhase::Reappear.duration()))
            }
            TeleportPhase::Reappear => {
                self.timer = rng.random_range(self.interval_min, self.interval_max);
                None
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::input;
    use super::*;

    #[test]
    fn test_sequence_runs_in_order_and_lands_on_ring() {
        let mut rng = GameRng::from_seed(8);
        let mut teleporter = Teleporter::new(1.0, 1.0, 5.0, 6.0, &mut rng);
        let player = Vec2::new(3.0, -2.0);
        let step = input(Vec2::ZERO, player, 0.05);

        let mut phases = Vec::new();
        let mut landing = None;
        for _ in 0..60 {
            let mut out = AiCommands::new();
            teleporter.tick(&step, &mut rng, false, &mut out);
            for command in out {
                match command {
                    AiCommand::TeleportPhase(phase) => phases.push(phase),
                    AiCommand::Teleport(to) => landing = Some(to),
                    _ => {}
                }
            }
            if teleporter.is_running() {
                assert_eq!(teleporter.phase(), phases.last().copied());
            }
            if phases.len() == 3 && !teleporter.is_running() {
                break;
            }
        }

        assert_eq!(
            phases,
            vec![TeleportPhase::Outline, TeleportPhase::Dissolve, TeleportPhase::Reappear]
        );
        let distance = landing.unwrap().distance(player);
        assert!((4.999..=6.001).contains(&distance));
        assert!(!teleporter.is_running());
    }

    #[test]
    fn test_suppressed_never_starts() {
        let mut rng = GameRng::from_seed(8);
        let mut teleporter = Teleporter::new(0.5, 0.5, 5.0, 6.0, &mut rng);
        let step = input(Vec2::ZERO, Vec2::X, 0.1);
        for _ in 0..30 {
            let mut out = AiCommands::new();
            teleporter.tick(&step, &mut rng, true, &mut out);
            assert!(out.is_empty());
        }
        assert!(!teleporter.is_running());
        assert_eq!(teleporter.phase(), None);
    }
}
