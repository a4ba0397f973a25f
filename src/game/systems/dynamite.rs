//! Thrown dynamite flight and fuses

use crate::game::constants::physics::GRAVITY;
use crate::game::constants::world::TIMER_EPSILON;
use crate::game::state::{EntityId, GameState, ThrownDynamite, WormId};
use crate::game::terrain::TerrainGrid;
use crate::util::vec2::Vec2;

/// A fuse that ran out this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detonation {
    pub owner: WormId,
    pub dynamite: EntityId,
    pub position: Vec2,
}

/// Add a thrown stick to its owner's list
pub fn launch(state: &mut GameState, owner: WormId, origin: Vec2, velocity: Vec2) -> Option<EntityId> {
    let id = state.next_entity_id();
    let worm = state.get_worm_mut(owner)?;
    worm.thrown.push(ThrownDynamite::new(id, origin, velocity));
    Some(id)
}

/// Advance one stick. Returns true on the tick its fuse runs out.
///
/// A stick that would move into solid terrain stops dead and stays put.
pub fn integrate(dynamite: &mut ThrownDynamite, terrain: &TerrainGrid, dt: f32) -> bool {
    if dynamite.exploded {
        return false;
    }
    dynamite.elapsed += dt;

    if dynamite.elapsed + TIMER_EPSILON < dynamite.fuse {
        let next = dynamite.position + dynamite.velocity * dt;
        if terrain.is_solid_at(next) {
            dynamite.velocity = Vec2::ZERO;
        } else {
            dynamite.position = next;
            dynamite.velocity.y += GRAVITY * dt;
        }
        return false;
    }

    dynamite.exploded = true;
    true
}

/// Tick every worm's thrown dynamite, including sticks of dead worms
pub fn update(state: &mut GameState, dt: f32) -> Vec<Detonation> {
    let terrain = &state.terrain;
    let mut detonations = Vec::new();

    for worm in state.worms.iter_mut() {
        for stick in worm.thrown.iter_mut() {
            if integrate(stick, terrain, dt) {
                detonations.push(Detonation {
                    owner: worm.id,
                    dynamite: stick.id,
                    position: stick.position,
                });
            }
        }
        worm.thrown.retain(|d| !d.exploded);
    }

    detonations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CharacterConfig, ToolsMode};
    use crate::game::constants::dynamite::FUSE_TIME;
    use crate::game::constants::world::DT;
    use crate::game::state::{Lifecycle, Rgb};
    use crate::game::terrain::{CellCoord, Material};

    fn state_with_worm() -> GameState {
        let mut state = GameState::new(TerrainGrid::new(60, 60), ToolsMode::Standard, 7);
        state.add_worm(&CharacterConfig::new("A", Rgb(1, 1, 1), true, 0), Vec2::new(100.0, 200.0));
        state
    }

    #[test]
    fn test_fuse_runs_out_after_two_seconds() {
        let mut state = state_with_worm();
        launch(&mut state, 0, Vec2::new(200.0, 200.0), Vec2::ZERO);

        let dt = 0.25;
        let ticks = (FUSE_TIME / dt) as usize;
        for _ in 0..ticks - 1 {
            assert!(update(&mut state, dt).is_empty());
        }
        let detonations = update(&mut state, dt);

        assert_eq!(detonations.len(), 1);
        assert_eq!(detonations[0].owner, 0);
        assert!(state.worms[0].thrown.is_empty());
    }

    #[test]
    fn test_flight_under_gravity() {
        let terrain = TerrainGrid::new(60, 60);
        let mut stick = ThrownDynamite::new(0, Vec2::new(100.0, 200.0), Vec2::new(100.0, -50.0));

        integrate(&mut stick, &terrain, 0.5);

        assert!(stick.position.approx_eq(Vec2::new(150.0, 175.0), 1e-3));
        assert!((stick.velocity.y - (-50.0 + GRAVITY * 0.5)).abs() < 1e-3);
    }

    #[test]
    fn test_stops_dead_against_terrain() {
        let mut terrain = TerrainGrid::new(60, 60);
        let start = TerrainGrid::cell_center(CellCoord::new(10, 10));
        terrain.set_cell(12, 10, Material::Rock);
        let mut stick = ThrownDynamite::new(0, start, Vec2::new(160.0, 0.0));

        integrate(&mut stick, &terrain, 0.1);

        assert_eq!(stick.position, start);
        assert_eq!(stick.velocity, Vec2::ZERO);
        assert!(!stick.exploded);
    }

    #[test]
    fn test_stopped_stick_detonates_where_it_rests() {
        let mut state = state_with_worm();
        let start = TerrainGrid::cell_center(CellCoord::new(10, 10));
        for row in 9..=11 {
            for col in 12..=13 {
                state.terrain.set_cell(col, row, Material::Rock);
            }
        }
        for col in 8..=13 {
            state.terrain.set_cell(col, 11, Material::Rock);
        }
        launch(&mut state, 0, start, Vec2::new(160.0, 0.0));

        let dt = 0.125;
        assert!(update(&mut state, dt).is_empty());
        assert_eq!(state.worms[0].thrown[0].velocity, Vec2::ZERO);
        assert_eq!(state.worms[0].thrown[0].position, start);

        let ticks = (FUSE_TIME / dt) as usize;
        let mut detonations = Vec::new();
        for tick in 1..ticks {
            let fired = update(&mut state, dt);
            if tick < ticks - 1 {
                assert!(fired.is_empty(), "early detonation at tick {}", tick);
            }
            detonations.extend(fired);
        }

        assert_eq!(detonations.len(), 1);
        assert_eq!(detonations[0].position, start);
        assert!(state.worms[0].thrown.is_empty());
    }

    #[test]
    fn test_no_detonation_just_short_of_fuse() {
        let terrain = TerrainGrid::new(60, 60);
        let mut stick = ThrownDynamite::new(0, Vec2::new(100.0, 200.0), Vec2::ZERO);
        stick.elapsed = FUSE_TIME - 2e-4;

        assert!(!integrate(&mut stick, &terrain, 1e-4));
        assert!(!stick.exploded);
        assert!(integrate(&mut stick, &terrain, 1e-4));
    }

    #[test]
    fn test_fuse_at_sixty_hertz() {
        let terrain = TerrainGrid::new(60, 200);
        let mut stick = ThrownDynamite::new(0, Vec2::new(100.0, 200.0), Vec2::ZERO);
        let ticks = (FUSE_TIME * 60.0).round() as usize;

        let fired: Vec<usize> = (1..=ticks + 5).filter(|_| integrate(&mut stick, &terrain, DT)).collect();

        assert_eq!(fired, vec![ticks]);
    }

    #[test]
    fn test_dead_owner_still_detonates() {
        let mut state = state_with_worm();
        launch(&mut state, 0, Vec2::new(200.0, 200.0), Vec2::ZERO);
        state.worms[0].lifecycle = Lifecycle::Respawning { remaining: 3.0 };

        assert_eq!(update(&mut state, FUSE_TIME).len(), 1);
    }

    #[test]
    fn test_launch_unknown_owner() {
        let mut state = state_with_worm();
        assert!(launch(&mut state, 5, Vec2::ZERO, Vec2::ZERO).is_none());
    }
}
