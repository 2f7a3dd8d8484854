//! Proximity contact detection
//!
//! Stands in for a physics engine's trigger volumes: every entity is a circle on the ground
//! plane, and overlapping pairs become collision notifications for the entity that reacts.
//! The arena walls are trigger volumes too: a pursuer pressed against one while steering
//! for a point outside the arena touches it and leaves.

use glam::Vec2;

use super::controller::MatchController;
use super::pursuit::Pursuer;
use super::state::{CollisionEvent, CollisionTag, EntityId};
use crate::consts::{ARENA_MAX_X, ARENA_MAX_Z, ARENA_MIN_X, ARENA_MIN_Z};
use crate::in_arena;

pub const PLAYER_RADIUS: f32 = 0.5;
pub const ENEMY_RADIUS: f32 = 0.5;
pub const POWERUP_RADIUS: f32 = 0.75;
/// Depth of the boundary trigger inside each arena edge
pub const BOUNDARY_MARGIN: f32 = 0.1;

/// Sender ID used for arena boundary notifications
pub const ARENA_ID: EntityId = EntityId(0);

/// One notification for one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub target: EntityId,
    pub event: CollisionEvent,
}

/// Within `BOUNDARY_MARGIN` of an arena edge, or past it
fn near_edge(pos: Vec2) -> bool {
    pos.x < ARENA_MIN_X + BOUNDARY_MARGIN
        || pos.x > ARENA_MAX_X - BOUNDARY_MARGIN
        || pos.y < ARENA_MIN_Z + BOUNDARY_MARGIN
        || pos.y > ARENA_MAX_Z - BOUNDARY_MARGIN
}

/// Pursuer touching the boundary trigger: outside the arena, or at an edge and steering out
pub fn touches_boundary(enemy: &Pursuer) -> bool {
    if !in_arena(enemy.pos) {
        return true;
    }
    near_edge(enemy.pos) && enemy.destination.is_some_and(|dest| !in_arena(dest))
}

#[inline]
fn overlaps(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Collect this frame's contacts, in entity ID order per kind
pub fn detect(controller: &MatchController) -> Vec<Contact> {
    let mut contacts = Vec::new();

    if let Some(player) = controller.player() {
        let mut hostiles: Vec<_> = controller
            .enemies()
            .iter()
            .filter(|e| overlaps(player.pos, PLAYER_RADIUS, e.pos, ENEMY_RADIUS))
            .map(|e| e.id)
            .collect();
        hostiles.sort();
        contacts.extend(hostiles.into_iter().map(|other| Contact {
            target: player.id,
            event: CollisionEvent::new(CollisionTag::Hostile, other),
        }));

        let mut pickups: Vec<_> = controller
            .powerups()
            .iter()
            .filter(|p| overlaps(player.pos, PLAYER_RADIUS, p.pos, POWERUP_RADIUS))
            .map(|p| (p.id, p.kind))
            .collect();
        pickups.sort_by_key(|(id, _)| *id);
        contacts.extend(pickups.into_iter().map(|(other, kind)| Contact {
            target: player.id,
            event: CollisionEvent::new(kind.collision_tag(), other),
        }));
    }

    for enemy in controller.enemies() {
        if touches_boundary(enemy) {
            contacts.push(Contact {
                target: enemy.id,
                event: CollisionEvent::new(CollisionTag::ArenaBoundary, ARENA_ID),
            });
        }
    }

    contacts
}

/// Detect and hand every contact to its target's inbox
pub fn dispatch(controller: &mut MatchController) -> usize {
    let contacts = detect(controller);
    for contact in &contacts {
        controller.deliver_collision(contact.target, contact.event);
    }
    contacts.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Difficulty;
    use crate::settings::ControlMode;
    use crate::sim::avatar::PlayerInput;
    use crate::sim::pursuit::PlayerView;
    use crate::tuning::Tuning;

    #[test]
    fn test_overlap_radius() {
        let a = Vec2::new(-20.0, 0.0);
        assert!(overlaps(a, 0.5, Vec2::new(-19.1, 0.0), 0.5));
        assert!(!overlaps(a, 0.5, Vec2::new(-18.9, 0.0), 0.5));
    }

    #[test]
    fn test_idle_controller_has_no_contacts() {
        let c = MatchController::new(Tuning::default(), 1).expect("valid tuning");
        assert!(detect(&c).is_empty());
    }

    #[test]
    fn test_enemy_reaching_player_catches_it() {
        let tuning = Tuning {
            flank_offset: 0.0,
            ..Tuning::default()
        };
        let mut c = MatchController::new(tuning, 5).expect("valid tuning");
        c.start_game(Difficulty::Insane);
        let input = PlayerInput::default();
        let mut caught = false;
        // Pursuers aim straight at a standing player
        for _ in 0..(60 * 20) {
            dispatch(&mut c);
            c.physics_step();
            c.frame(1.0 / 60.0, ControlMode::Direct, &input);
            if c.player().is_none() {
                caught = true;
                break;
            }
        }
        assert!(caught);
        assert!(!c.is_active());
    }

    #[test]
    fn test_boundary_needs_edge_and_outward_destination() {
        let tuning = Tuning::default();
        let view = |pos| PlayerView {
            pos,
            slow_time: false,
        };

        // Pinned to the +Z edge, aiming 2 units past it
        let mut edge = Pursuer::with_traits(EntityId(1), Vec2::new(-20.0, 11.0), 8.0, 40.0, &tuning);
        assert!(!touches_boundary(&edge));
        edge.physics_step(Some(&view(Vec2::new(-20.0, 10.0))));
        assert_eq!(edge.destination, Some(Vec2::new(-20.0, 12.0)));
        assert!(touches_boundary(&edge));

        // Same edge, heading back inside
        edge.physics_step(Some(&view(Vec2::new(-20.0, 0.0))));
        assert!(!touches_boundary(&edge));

        // Aiming out from the middle of the arena is fine
        let mut inner = Pursuer::with_traits(EntityId(2), Vec2::new(-25.0, 0.0), 8.0, 40.0, &tuning);
        inner.physics_step(Some(&view(Vec2::new(-25.0, 10.0))));
        assert!(!touches_boundary(&inner));

        let mut outside = inner.clone();
        outside.pos = Vec2::new(-2.0, 0.0);
        assert!(touches_boundary(&outside));
    }

    #[test]
    fn test_pursuers_leave_through_the_boundary() {
        // Every flank aims far outside the arena
        let tuning = Tuning {
            flank_offset: 30.0,
            ..Tuning::default()
        };
        let mut c = MatchController::new(tuning, 17).expect("valid tuning");
        c.start_game(Difficulty::Insane);
        let input = PlayerInput::default();
        let mut departed = 0;
        for _ in 0..(60 * 30) {
            let leaving: Vec<_> = detect(&c)
                .into_iter()
                .filter(|contact| contact.event.tag == CollisionTag::ArenaBoundary)
                .collect();
            for contact in &leaving {
                assert_eq!(contact.event.other, ARENA_ID);
                c.deliver_collision(contact.target, contact.event);
            }
            c.physics_step();
            c.frame(1.0 / 60.0, ControlMode::Direct, &input);

            assert!(c.is_active());
            for contact in &leaving {
                assert!(c.enemies().iter().all(|e| e.id != contact.target));
            }
            departed += leaving.len();
        }
        assert!(departed > 0);
        assert!((c.enemies().len() as u32) < c.enemy_count());
    }
}
