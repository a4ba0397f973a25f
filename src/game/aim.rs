//! Aim control
//!
//! The aim has a target angle driven by input and a drawn angle that follows
//! the target at a fixed rate. Both always stay in the half-plane the worm is
//! facing. Angles are screen angles: 0 is right, +PI/2 is down.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::game::constants::aim::*;
use crate::util::vec2::{angle_delta, wrap_angle, Vec2};

/// Horizontal facing of a worm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// +1 for right, -1 for left
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Aim angle that points straight ahead
    pub fn forward_angle(self) -> f32 {
        match self {
            Facing::Left => PI,
            Facing::Right => 0.0,
        }
    }
}

/// Clamp an angle into the half-plane of `facing` (inclusive of straight up/down)
pub fn constrain_to_facing(angle: f32, facing: Facing) -> f32 {
    let a = wrap_angle(angle);
    match facing {
        Facing::Right => a.clamp(-FRAC_PI_2, FRAC_PI_2),
        Facing::Left => {
            if a > -FRAC_PI_2 && a < FRAC_PI_2 {
                if a >= 0.0 {
                    FRAC_PI_2
                } else {
                    -FRAC_PI_2
                }
            } else {
                a
            }
        }
    }
}

/// Mirror an aim across the vertical axis for a worm that now faces `facing`
pub fn mirror_on_facing_flip(angle: f32, facing: Facing) -> f32 {
    let mirrored = angle.sin().atan2(-angle.cos());
    constrain_to_facing(mirrored, facing)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimState {
    /// Where input wants the aim to be
    pub target: f32,
    /// Drawn aim, follows `target`
    pub current: f32,
    /// Set by the first manual aim input; until then the aim tracks straight ahead
    pub locked: bool,
    /// How long the aim input has been held
    hold_time: f32,
}

impl AimState {
    pub fn new(facing: Facing) -> Self {
        let angle = facing.forward_angle();
        Self {
            target: angle,
            current: angle,
            locked: false,
            hold_time: 0.0,
        }
    }

    /// Unit vector of the drawn aim
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.current)
    }

    /// Advance the aim by one tick. `axis` is -1..1 with positive meaning
    /// "aim down" while facing right; it is mirrored when facing left so the
    /// same key rotates the barrel the same visual way.
    pub fn update(&mut self, axis: f32, facing: Facing, dt: f32) {
        if axis.abs() > INPUT_DEADZONE {
            self.hold_time = (self.hold_time + dt).min(FULL_STRENGTH_HOLD);
            let strength = self.hold_time / FULL_STRENGTH_HOLD;
            let input = axis.clamp(-1.0, 1.0) * strength * facing.sign();

            self.target = constrain_to_facing(self.target + input * ROTATION_SPEED * dt, facing);
            self.locked = true;
        } else {
            self.hold_time = 0.0;
            self.target = if self.locked {
                // Keep the elevation, make sure it points the way we face
                let (sin, cos) = self.current.sin_cos();
                constrain_to_facing(sin.atan2(cos.abs() * facing.sign()), facing)
            } else {
                facing.forward_angle()
            };
        }

        let diff = angle_delta(self.current, self.target);
        let max_step = INTERPOLATION_SPEED * dt;
        let step = diff.clamp(-max_step, max_step);
        self.current = constrain_to_facing(self.current + step, facing);
    }

    /// Mirror target and drawn aim at once when the worm turns around
    pub fn on_facing_changed(&mut self, facing: Facing) {
        self.target = mirror_on_facing_flip(self.target, facing);
        self.current = mirror_on_facing_flip(self.current, facing);
    }
}

impl Default for AimState {
    fn default() -> Self {
        Self::new(Facing::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn in_half_plane(angle: f32, facing: Facing) -> bool {
        let cos = angle.cos();
        match facing {
            Facing::Right => cos >= -EPSILON,
            Facing::Left => cos <= EPSILON,
        }
    }

    #[test]
    fn test_constrain_right_clamps() {
        assert!((constrain_to_facing(2.0, Facing::Right) - FRAC_PI_2).abs() < EPSILON);
        assert!((constrain_to_facing(-2.0, Facing::Right) + FRAC_PI_2).abs() < EPSILON);
        assert!((constrain_to_facing(0.3, Facing::Right) - 0.3).abs() < EPSILON);
    }

    #[test]
    fn test_constrain_left_snaps_to_vertical() {
        assert!((constrain_to_facing(0.3, Facing::Left) - FRAC_PI_2).abs() < EPSILON);
        assert!((constrain_to_facing(-0.3, Facing::Left) + FRAC_PI_2).abs() < EPSILON);
        assert!((constrain_to_facing(2.5, Facing::Left) - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_mirror_preserves_elevation() {
        // 30 degrees down-right becomes 30 degrees down-left
        let down_right = 30f32.to_radians();
        let mirrored = mirror_on_facing_flip(down_right, Facing::Left);
        assert!((mirrored - (PI - down_right)).abs() < EPSILON);
        assert!((mirrored.sin() - down_right.sin()).abs() < EPSILON);

        let back = mirror_on_facing_flip(mirrored, Facing::Right);
        assert!((back - down_right).abs() < EPSILON);
    }

    #[test]
    fn test_unlocked_aim_tracks_forward() {
        let mut aim = AimState::new(Facing::Right);
        aim.update(0.0, Facing::Right, 0.1);
        assert!(!aim.locked);
        assert!(aim.current.abs() < EPSILON);
    }

    #[test]
    fn test_input_locks_and_rotates_target() {
        let mut aim = AimState::new(Facing::Right);
        for _ in 0..30 {
            aim.update(1.0, Facing::Right, 1.0 / 60.0);
        }
        assert!(aim.locked);
        assert!(aim.target > 0.0);
        // Drawn aim lags but moves the same way
        assert!(aim.current > 0.0 && aim.current <= aim.target + EPSILON);
    }

    #[test]
    fn test_aim_never_leaves_facing_half_plane() {
        let mut aim = AimState::new(Facing::Right);
        let mut facing = Facing::Right;
        let inputs = [1.0, 1.0, -1.0, 0.0, 1.0, -1.0, -1.0, 0.0];

        for step in 0..600 {
            if step % 97 == 0 {
                facing = if facing == Facing::Right { Facing::Left } else { Facing::Right };
                aim.on_facing_changed(facing);
            }
            aim.update(inputs[step % inputs.len()], facing, 1.0 / 30.0);
            assert!(in_half_plane(aim.current, facing), "step {} angle {}", step, aim.current);
            assert!(in_half_plane(aim.target, facing));
        }
    }

    #[test]
    fn test_facing_flip_applies_immediately() {
        let mut aim = AimState::new(Facing::Right);
        aim.on_facing_changed(Facing::Left);
        assert!((aim.current.abs() - PI).abs() < EPSILON);
        assert!((aim.target.abs() - PI).abs() < EPSILON);
    }
}
