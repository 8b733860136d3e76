//! Projectile Systems
//!
//! Straight-line projectiles fired by the player's spells and by enemies,
//! plus delayed meteor strikes. Hits are turned into `DamageEvent`s and
//! `ApplyStatusEvent`s; nothing here touches a combatant directly.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::events::{ApplyStatusEvent, DamageCause, DamageEvent};

use super::components::{Combatant, Dead, Player};
use super::constants::{PROJECTILE_HIT_RADIUS, PROJECTILE_LIFETIME};
use super::status::StatusPayload;

/// Which side fired a projectile. Projectiles only hit the other side.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Faction {
    Player,
    Enemy,
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub owner: Option<Entity>,
    pub faction: Faction,
    pub velocity: Vec2,
    pub damage: f32,
    pub is_fire: bool,
    pub on_hit: Option<StatusPayload>,
    pub cause: DamageCause,
    /// Seconds before the projectile fizzles
    pub lifetime: f32,
}

/// A delayed area hit aimed at the player (boss meteor shower).
#[derive(Component, Debug, Clone)]
pub struct MeteorStrike {
    pub owner: Option<Entity>,
    pub position: Vec2,
    /// Seconds until impact
    pub delay: f32,
    pub damage: f32,
    pub radius: f32,
    pub cause: DamageCause,
}

/// Parameters for a fan of projectiles.
#[derive(Debug, Clone)]
pub struct Volley {
    pub owner: Option<Entity>,
    pub faction: Faction,
    pub origin: Vec2,
    pub direction: Vec2,
    pub count: u32,
    pub spread_deg: f32,
    pub speed: f32,
    pub damage: f32,
    pub is_fire: bool,
    pub on_hit: Option<StatusPayload>,
    pub cause: DamageCause,
}

/// Directions for `count` projectiles spread evenly over `spread_deg`,
/// centred on `direction`. A spread of 360 or more gives a full ring.
pub fn fan_directions(direction: Vec2, count: u32, spread_deg: f32) -> SmallVec<[Vec2; 8]> {
    let base = direction.normalize_or(Vec2::X);
    if count <= 1 {
        return SmallVec::from_elem(base, count as usize);
    }
    let (start, step) = if spread_deg >= 360.0 {
        (0.0, 360.0 / count as f32)
    } else {
        (-spread_deg / 2.0, spread_deg / (count - 1) as f32)
    };
    (0..count)
        .map(|i| Vec2::from_angle((start + step * i as f32).to_radians()).rotate(base))
        .collect()
}

/// Spawn every projectile of a volley. Returns how many were spawned.
pub fn spawn_volley(commands: &mut Commands, volley: &Volley) -> usize {
    let directions = fan_directions(volley.direction, volley.count, volley.spread_deg);
    for direction in &directions {
        commands.spawn((
            Transform::from_translation(volley.origin.extend(0.0)),
            Projectile {
                owner: volley.owner,
                faction: volley.faction,
                velocity: *direction * volley.speed,
                damage: volley.damage,
                is_fire: volley.is_fire,
                on_hit: volley.on_hit,
                cause: volley.cause.clone(),
                lifetime: PROJECTILE_LIFETIME,
            },
        ));
    }
    directions.len()
}

/// Move projectiles along their velocity and despawn expired ones.
pub fn move_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
) {
    let dt = time.delta_secs();

    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        transform.translation += (projectile.velocity * dt).extend(0.0);
        projectile.lifetime -= dt;
        if projectile.lifetime <= 0.0 {
            commands.entity(entity).despawn_recursive();
        }
    }
}

/// Check projectiles against combatants of the opposing faction.
/// First combatant in range takes the hit; the projectile is consumed.
pub fn process_projectile_hits(
    mut commands: Commands,
    projectiles: Query<(Entity, &Projectile, &Transform)>,
    targets: Query<
        (Entity, &Transform, Has<Player>),
        (With<Combatant>, Without<Dead>, Without<Projectile>),
    >,
    mut damage_events: EventWriter<DamageEvent>,
    mut status_events: EventWriter<ApplyStatusEvent>,
) {
    for (projectile_entity, projectile, projectile_transform) in projectiles.iter() {
        if projectile.lifetime <= 0.0 {
            continue;
        }
        let position = projectile_transform.translation.truncate();

        let hit = targets.iter().find(|(_, transform, is_player)| {
            let target_faction = if *is_player { Faction::Player } else { Faction::Enemy };
            target_faction != projectile.faction
                && transform.translation.truncate().distance(position) <= PROJECTILE_HIT_RADIUS
        });
        let Some((target, _, _)) = hit else {
            continue;
        };

        damage_events.send(DamageEvent {
            source: projectile.owner,
            target,
            amount: projectile.damage,
            is_fire: projectile.is_fire,
            cause: projectile.cause.clone(),
        });
        if let Some(payload) = projectile.on_hit {
            status_events.send(ApplyStatusEvent {
                target,
                kind: payload.kind,
                magnitude: payload.magnitude,
                duration: payload.duration,
                source: projectile.cause.label().to_string(),
            });
        }
        commands.entity(projectile_entity).despawn_recursive();
    }
}

/// Count down meteor strikes and damage the player if they are inside the
/// impact radius when one lands.
pub fn tick_meteor_strikes(
    mut commands: Commands,
    time: Res<Time>,
    mut strikes: Query<(Entity, &mut MeteorStrike)>,
    players: Query<(Entity, &Transform), (With<Player>, Without<Dead>)>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let dt = time.delta_secs();

    for (entity, mut strike) in strikes.iter_mut() {
        strike.delay -= dt;
        if strike.delay > 0.0 {
            continue;
        }
        for (player, transform) in players.iter() {
            if transform.translation.truncate().distance(strike.position) <= strike.radius {
                damage_events.send(DamageEvent {
                    source: strike.owner,
                    target: player,
                    amount: strike.damage,
                    is_fire: true,
                    cause: strike.cause.clone(),
                });
            }
        }
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_projectile_goes_straight() {
        let dirs = fan_directions(Vec2::new(0.0, 2.0), 1, 45.0);
        assert_eq!(dirs.len(), 1);
        assert!((dirs[0] - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_fan_is_symmetric() {
        let dirs = fan_directions(Vec2::X, 3, 90.0);
        assert_eq!(dirs.len(), 3);
        assert!((dirs[1] - Vec2::X).length() < 1e-5);
        assert!((dirs[0].dot(Vec2::X) - 45f32.to_radians().cos()).abs() < 1e-4);
        assert!((dirs[2].y + dirs[0].y).abs() < 1e-5);
    }

    #[test]
    fn test_full_ring_has_no_duplicates() {
        let dirs = fan_directions(Vec2::X, 4, 360.0);
        assert_eq!(dirs.len(), 4);
        assert!((dirs[2] + Vec2::X).length() < 1e-5);
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(fan_directions(Vec2::X, 0, 30.0).is_empty());
    }
}
