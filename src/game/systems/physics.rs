#[cfg(feature = "parallel_physics")]
use rayon::prelude::*;

use std::f32::consts::TAU;

use crate::game::constants::fall::{DAMAGE_MULTIPLIER, DAMAGE_START_HEIGHT, VELOCITY_THRESHOLD};
use crate::game::constants::physics::*;
use crate::game::constants::worm::{COLLISION_SAMPLES, MIN_COLLISION_RADIUS, RADIUS, SEGMENT_COUNT, SEGMENT_UPDATE_INTERVAL, SPEED};
use crate::game::constants::world::UI_HEIGHT;
use crate::game::aim::Facing;
use crate::game::input::WormIntent;
use crate::game::state::{GameState, MotionState, Worm};
use crate::game::terrain::TerrainGrid;
use crate::util::vec2::Vec2;

/// What happened to one worm during its physics step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsOutcome {
    /// Fall damage to apply (no killer)
    pub fall_damage: Option<i32>,
    /// Worm fell out of the bottom and re-entered at the top
    pub wrapped: bool,
    pub landed: bool,
}

/// Step every worm. Terrain is read-only here, so worms integrate in parallel.
/// Outcomes are indexed like `state.worms`.
pub fn update(state: &mut GameState, dt: f32) -> Vec<PhysicsOutcome> {
    let terrain = &state.terrain;

    #[cfg(feature = "parallel_physics")]
    let outcomes = state
        .worms
        .par_iter_mut()
        .map(|worm| step(worm, terrain, dt))
        .collect();

    #[cfg(not(feature = "parallel_physics"))]
    let outcomes = state
        .worms
        .iter_mut()
        .map(|worm| step(worm, terrain, dt))
        .collect();

    outcomes
}

/// Horizontal input, facing, friction and jumping
pub fn apply_movement_input(worm: &mut Worm, intent: &WormIntent) {
    if worm.lifecycle.is_respawning() {
        return;
    }

    if intent.move_axis.abs() > MOVE_DEADZONE {
        let axis = intent.move_axis.clamp(-1.0, 1.0);
        worm.velocity.x = axis * SPEED;

        let facing = if axis > 0.0 { Facing::Right } else { Facing::Left };
        if facing != worm.facing {
            worm.facing = facing;
            worm.aim.on_facing_changed(facing);
        }
    } else if worm.is_grounded() {
        worm.velocity.x *= GROUND_FRICTION;
    } else {
        worm.velocity.x *= AIR_RESISTANCE;
    }

    if intent.jump && worm.is_grounded() && worm.can_jump {
        worm.velocity.y = JUMP_VELOCITY;
        worm.motion = MotionState::Airborne;
        worm.can_jump = false;
        worm.fall_start_y = Some(worm.position.y);
    }
}

/// One physics tick for one worm
pub fn step(worm: &mut Worm, terrain: &TerrainGrid, dt: f32) -> PhysicsOutcome {
    let mut outcome = PhysicsOutcome::default();

    if !worm.lifecycle.is_respawning() {
        if !worm.is_grounded() {
            worm.velocity.y = (worm.velocity.y + GRAVITY * dt).min(TERMINAL_VELOCITY);
            if worm.fall_start_y.is_none() {
                worm.fall_start_y = Some(worm.position.y);
            }
        }

        resolve_movement(worm, terrain, dt, &mut outcome);

        if worm.is_grounded() && !has_ground_below(worm.position, terrain) && !on_walkable_slope(worm.position, terrain) {
            worm.motion = MotionState::Airborne;
        }
    }

    let max_x = (terrain.pixel_width() - RADIUS).max(RADIUS);
    worm.position.x = worm.position.x.clamp(RADIUS, max_x);

    if worm.position.y > terrain.bottom_y() + RADIUS {
        wrap_to_top(worm);
        outcome.wrapped = true;
    } else if worm.position.y < CEILING_ESCAPE_Y {
        worm.position.y = UI_HEIGHT + WRAP_ENTRY_OFFSET;
        worm.velocity.y = worm.velocity.y.max(0.0);
        worm.fall_start_y = Some(worm.position.y);
    }

    update_segments(worm, dt);
    outcome
}

fn resolve_movement(worm: &mut Worm, terrain: &TerrainGrid, dt: f32, outcome: &mut PhysicsOutcome) {
    let pos = worm.position;
    let old_vy = worm.velocity.y;
    let was_falling = !worm.is_grounded() && old_vy > 0.0;

    let mut dx = worm.velocity.x * dt;
    let mut dy = worm.velocity.y * dt;
    if dx.abs() > MAX_POSITION_CHANGE {
        dx = MAX_POSITION_CHANGE.copysign(dx);
        worm.velocity.x = 0.0;
    }
    if dy.abs() > MAX_POSITION_CHANGE {
        dy = MAX_POSITION_CHANGE.copysign(dy);
    }

    // Horizontal, with step climbing
    let new_x = pos.x + dx;
    if !body_collides(worm, terrain, Vec2::new(new_x, worm.position.y)) {
        worm.position.x = new_x;
    } else {
        let mut climbed = false;
        if worm.velocity.x != 0.0 {
            let mut height = CLIMB_STEP;
            while height <= RADIUS {
                let test_y = worm.position.y - height;
                if climbable(height, dx.abs()) && !body_collides(worm, terrain, Vec2::new(new_x, test_y)) {
                    worm.position = Vec2::new(new_x, test_y);
                    climbed = true;
                    break;
                }
                height += CLIMB_STEP;
            }
        }
        if !climbed {
            worm.velocity.x = 0.0;
        }
    }

    // Vertical
    let new_y = worm.position.y + dy;
    if !body_collides(worm, terrain, Vec2::new(worm.position.x, new_y)) {
        worm.position.y = new_y;
        return;
    }

    if worm.velocity.y > 0.0 {
        let was_grounded = worm.is_grounded();
        worm.motion = MotionState::Grounded;
        worm.can_jump = true;
        outcome.landed = !was_grounded;

        if was_falling && !was_grounded && old_vy > VELOCITY_THRESHOLD {
            let start = worm.fall_start_y.unwrap_or(worm.position.y);
            outcome.fall_damage = fall_damage(worm.position.y - start);
        }
        worm.fall_start_y = None;
        worm.velocity.y = 0.0;

        if worm.position.y > UI_HEIGHT {
            while body_collides(worm, terrain, worm.position) && worm.position.y > RADIUS {
                worm.position.y -= 1.0;
            }
        }
    } else if worm.velocity.y < 0.0 {
        worm.velocity.y = 0.0;
    }
}

/// Whether rising `height` over a horizontal move of `run` is within the slope limit
pub fn climbable(height: f32, run: f32) -> bool {
    height.atan2(run).to_degrees() <= MAX_SLOPE_ANGLE_DEG
}

/// Damage for a fall of `distance` pixels, if any
pub fn fall_damage(distance: f32) -> Option<i32> {
    if distance < DAMAGE_START_HEIGHT {
        return None;
    }
    Some((((distance - DAMAGE_START_HEIGHT) * DAMAGE_MULTIPLIER) as i32).max(1))
}

fn wrap_to_top(worm: &mut Worm) {
    let x = worm.position.x;
    worm.position = Vec2::new(x, UI_HEIGHT + WRAP_ENTRY_OFFSET);
    worm.velocity = Vec2::new(0.0, WRAP_ENTRY_VELOCITY);
    worm.motion = MotionState::Airborne;
    worm.can_jump = false;
    worm.fall_start_y = Some(worm.position.y);
    worm.segments = [worm.position; SEGMENT_COUNT];
    tracing::debug!(worm = worm.id, x, "Worm wrapped to top");
}

fn update_segments(worm: &mut Worm, dt: f32) {
    worm.segment_timer += dt;
    if worm.segment_timer > SEGMENT_UPDATE_INTERVAL {
        worm.segment_timer = 0.0;
        for i in (1..SEGMENT_COUNT).rev() {
            worm.segments[i] = worm.segments[i - 1];
        }
    }
    worm.segments[0] = worm.position;
}

/// 8-point circle test against solid terrain
pub fn circle_hits_terrain(terrain: &TerrainGrid, center: Vec2, radius: f32) -> bool {
    (0..COLLISION_SAMPLES).any(|i| {
        let angle = i as f32 * TAU / COLLISION_SAMPLES as f32;
        terrain.is_solid_at(center + Vec2::from_angle(angle) * radius)
    })
}

/// Whole-body test with the head moved to `head` and the trail where it is
pub fn body_collides(worm: &Worm, terrain: &TerrainGrid, head: Vec2) -> bool {
    let active = worm.active_segment_count();
    (0..active).any(|i| {
        let radius = Worm::segment_radius(i);
        if i > 0 && radius <= MIN_COLLISION_RADIUS {
            return false;
        }
        let center = if i == 0 { head } else { worm.segments[i] };
        circle_hits_terrain(terrain, center, radius)
    })
}

/// Probe a few points just under the worm
fn has_ground_below(pos: Vec2, terrain: &TerrainGrid) -> bool {
    let probe = pos.y + RADIUS + GROUND_PROBE_MARGIN;
    let wide = [-RADIUS / 2.0, -RADIUS / 4.0, 0.0, RADIUS / 4.0, RADIUS / 2.0];
    if wide.iter().any(|dx| terrain.is_solid(pos.x + dx, probe)) {
        return true;
    }
    let touch = pos.y + RADIUS + 1.0;
    [-RADIUS / 2.0, 0.0, RADIUS / 2.0]
        .iter()
        .any(|dx| terrain.is_solid(pos.x + dx, touch))
}

/// Ground contacts on the lower arc; the leftmost-to-rightmost slope must be walkable
fn on_walkable_slope(pos: Vec2, terrain: &TerrainGrid) -> bool {
    let reach = RADIUS + GROUND_PROBE_MARGIN;
    let mut contacts: Vec<Vec2> = Vec::new();

    let mut deg = SLOPE_ARC_START_DEG;
    while deg <= SLOPE_ARC_END_DEG {
        let p = pos + Vec2::from_angle(deg.to_radians()) * reach;
        if terrain.is_solid_at(p) {
            contacts.push(p);
        }
        deg += SLOPE_ARC_STEP_DEG;
    }

    if contacts.len() >= 2 {
        let left = contacts.iter().fold(contacts[0], |a, b| if b.x < a.x { *b } else { a });
        let right = contacts.iter().fold(contacts[0], |a, b| if b.x > a.x { *b } else { a });
        let d = right - left;
        if d.x != 0.0 {
            return d.y.atan2(d.x).to_degrees().abs() <= MAX_SLOPE_ANGLE_DEG;
        }
    }
    !contacts.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CharacterConfig, ToolsMode};
    use crate::game::constants::world::{DT, TILE_SIZE};
    use crate::game::state::{Lifecycle, Rgb};
    use crate::game::terrain::Material;

    fn worm_at(x: f32, y: f32) -> Worm {
        let c = CharacterConfig::new("Test", Rgb(10, 20, 30), true, 0);
        Worm::new(0, &c, Vec2::new(x, y))
    }

    /// 40 x 40 grid with a dirt floor from row `floor_row` down
    fn floor_terrain(floor_row: i32) -> TerrainGrid {
        let mut t = TerrainGrid::new(40, 40);
        for row in floor_row..40 {
            for col in 0..40 {
                t.set_cell(col, row, Material::Dirt);
            }
        }
        t
    }

    fn floor_y(floor_row: i32) -> f32 {
        UI_HEIGHT + floor_row as f32 * TILE_SIZE
    }

    fn settle(worm: &mut Worm, terrain: &TerrainGrid, ticks: usize) -> Vec<PhysicsOutcome> {
        (0..ticks).map(|_| step(worm, terrain, DT)).collect()
    }

    #[test]
    fn test_gravity_clamped_to_terminal_velocity() {
        let terrain = TerrainGrid::new(40, 200);
        let mut w = worm_at(100.0, 200.0);
        w.velocity.y = TERMINAL_VELOCITY - 1.0;

        step(&mut w, &terrain, DT);

        assert_eq!(w.velocity.y, TERMINAL_VELOCITY);
    }

    #[test]
    fn test_worm_lands_and_grounds() {
        let terrain = floor_terrain(30);
        let mut w = worm_at(100.0, floor_y(30) - 40.0);

        let outcomes = settle(&mut w, &terrain, 120);

        assert!(w.is_grounded());
        assert!(w.can_jump);
        assert_eq!(w.velocity.y, 0.0);
        assert!(w.position.y + RADIUS <= floor_y(30));
        assert!(outcomes.iter().any(|o| o.landed));
        // Short drop: no damage
        assert!(outcomes.iter().all(|o| o.fall_damage.is_none()));
    }

    #[test]
    fn test_long_fall_deals_damage() {
        let terrain = floor_terrain(38);
        let mut w = worm_at(100.0, UI_HEIGHT + 20.0);

        let outcomes = settle(&mut w, &terrain, 180);

        let damage: Vec<i32> = outcomes.iter().filter_map(|o| o.fall_damage).collect();
        assert_eq!(damage.len(), 1);
        assert!(damage[0] > 100);
    }

    #[test]
    fn test_fall_damage_formula() {
        assert_eq!(fall_damage(49.0), None);
        assert_eq!(fall_damage(50.0), Some(1));
        assert_eq!(fall_damage(150.0), Some(50));
    }

    #[test]
    fn test_walk_blocked_by_wall() {
        let mut terrain = floor_terrain(30);
        for row in 0..30 {
            terrain.set_cell(20, row, Material::Metal);
        }
        let mut w = worm_at(120.0, floor_y(30) - 20.0);
        settle(&mut w, &terrain, 60);

        let walk = WormIntent {
            move_axis: 1.0,
            ..WormIntent::idle()
        };
        for _ in 0..240 {
            apply_movement_input(&mut w, &walk);
            step(&mut w, &terrain, DT);
        }

        assert!(w.position.x + RADIUS <= 20.0 * TILE_SIZE + 1.0);
        assert_eq!(w.facing, Facing::Right);
    }

    #[test]
    fn test_walking_worm_cannot_climb_sheer_step() {
        let mut terrain = floor_terrain(30);
        for col in 20..40 {
            terrain.set_cell(col, 29, Material::Dirt);
        }
        let mut w = worm_at(120.0, floor_y(30) - 20.0);
        settle(&mut w, &terrain, 60);
        let rest_y = w.position.y;

        let walk = WormIntent {
            move_axis: 1.0,
            ..WormIntent::idle()
        };
        for _ in 0..120 {
            apply_movement_input(&mut w, &walk);
            step(&mut w, &terrain, DT);
        }

        // 8 px rise over a 1.7 px stride is far past 45 degrees
        assert!(w.position.x < 20.0 * TILE_SIZE);
        assert_eq!(w.position.y, rest_y);
        assert_eq!(w.velocity.x, 0.0);
    }

    #[test]
    fn test_fast_worm_climbs_step() {
        let mut terrain = floor_terrain(30);
        for col in 20..40 {
            terrain.set_cell(col, 29, Material::Dirt);
        }
        let mut w = worm_at(140.0, floor_y(30) - 20.0);
        settle(&mut w, &terrain, 60);
        assert!(w.is_grounded());
        let rest = w.position;

        // 15 px per tick against the step
        w.velocity.x = 900.0;
        step(&mut w, &terrain, DT);

        assert!((w.position.x - (rest.x + 15.0)).abs() < 1e-3);
        assert!(w.position.y < rest.y);
        assert!(w.velocity.x > 0.0);
    }

    #[test]
    fn test_slope_limit() {
        assert!(climbable(4.0, 5.0));
        assert!(climbable(8.0, 15.0));
        assert!(!climbable(8.0, 100.0 * DT));
        assert!(!climbable(4.0, 0.0));
    }

    #[test]
    fn test_friction_slows_on_ground() {
        let terrain = floor_terrain(30);
        let mut w = worm_at(100.0, floor_y(30) - 20.0);
        settle(&mut w, &terrain, 60);
        assert!(w.is_grounded());

        w.velocity.x = 100.0;
        apply_movement_input(&mut w, &WormIntent::idle());
        assert!((w.velocity.x - 100.0 * GROUND_FRICTION).abs() < 1e-3);
    }

    #[test]
    fn test_jump_requires_ground() {
        let mut w = worm_at(100.0, 200.0);
        let jump = WormIntent {
            jump: true,
            ..WormIntent::idle()
        };

        apply_movement_input(&mut w, &jump);
        assert_eq!(w.velocity.y, 0.0);

        let floor = floor_terrain(30);
        let mut w = worm_at(100.0, floor_y(30) - 20.0);
        settle(&mut w, &floor, 60);
        apply_movement_input(&mut w, &jump);
        assert_eq!(w.velocity.y, JUMP_VELOCITY);
        assert!(!w.is_grounded());
    }

    #[test]
    fn test_wrap_happens_once_per_crossing() {
        let terrain = TerrainGrid::new(40, 20);
        let mut w = worm_at(100.0, terrain.bottom_y() + RADIUS - 1.0);
        w.velocity = Vec2::new(30.0, TERMINAL_VELOCITY);

        let outcomes = settle(&mut w, &terrain, 3);

        assert_eq!(outcomes.iter().filter(|o| o.wrapped).count(), 1);
        assert!(w.position.y < UI_HEIGHT + WRAP_ENTRY_OFFSET + 20.0);
        assert!(outcomes[0].wrapped);
    }

    #[test]
    fn test_wrap_resets_motion() {
        let terrain = TerrainGrid::new(40, 20);
        let mut w = worm_at(100.0, terrain.bottom_y() + RADIUS - 1.0);
        w.velocity = Vec2::new(80.0, TERMINAL_VELOCITY);

        let outcome = step(&mut w, &terrain, DT);

        assert!(outcome.wrapped);
        assert_eq!(w.position.y, UI_HEIGHT + WRAP_ENTRY_OFFSET);
        assert_eq!(w.velocity.x, 0.0);
        assert!(w.velocity.y > 0.0 && w.velocity.y <= WRAP_ENTRY_VELOCITY);
        assert_eq!(w.motion, MotionState::Airborne);
    }

    #[test]
    fn test_x_clamped_to_world() {
        // Below the grid nothing is solid, so only the clamp stops the worm
        let terrain = TerrainGrid::new(40, 40);
        let mut w = worm_at(2.0, terrain.bottom_y() + 4.0);
        step(&mut w, &terrain, DT);
        assert_eq!(w.position.x, RADIUS);
    }

    #[test]
    fn test_respawning_worm_does_not_move() {
        let terrain = TerrainGrid::new(40, 40);
        let mut w = worm_at(100.0, 200.0);
        w.velocity = Vec2::new(50.0, 50.0);
        w.lifecycle = Lifecycle::Respawning { remaining: 1.0 };

        step(&mut w, &terrain, DT);

        assert_eq!(w.position, Vec2::new(100.0, 200.0));
    }

    #[test]
    fn test_trail_shifts_every_interval() {
        let terrain = TerrainGrid::new(40, 200);
        let mut w = worm_at(100.0, 200.0);
        let start = w.position;

        for _ in 0..10 {
            step(&mut w, &terrain, 0.025);
        }

        assert_eq!(w.segments[0], w.position);
        assert_ne!(w.segments[1], start);
        assert!(w.segments[1].y <= w.position.y);
    }

    #[test]
    fn test_update_runs_every_worm() {
        let mut state = GameState::new(floor_terrain(30), ToolsMode::Standard, 9);
        let c = CharacterConfig::new("A", Rgb(1, 2, 3), true, 0);
        state.add_worm(&c, Vec2::new(100.0, 200.0));
        state.add_worm(&c, Vec2::new(200.0, 200.0));

        let outcomes = update(&mut state, DT);

        assert_eq!(outcomes.len(), 2);
        assert!(state.worms.iter().all(|w| w.velocity.y > 0.0));
    }
}
