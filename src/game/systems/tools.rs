//! Tool selection and firing
//!
//! Input is turned into [`ToolAction`]s first; the game loop applies the digs
//! and launches after every worm has been processed.

use crate::config::ToolsMode;
use crate::game::constants::dynamite::{BASE_THROW_SPEED, MAX_POWER, POWER_CHARGE_RATE, UPWARD_BIAS};
use crate::game::constants::tools::*;
use crate::game::constants::worm::RADIUS;
use crate::game::input::{ToolCycle, TriggerState, WormIntent};
use crate::game::state::{Tool, Worm, WormId};
use crate::game::terrain::{DigTool, ItemKind, TerrainGrid};
use crate::util::vec2::{angle_delta, Vec2};

/// A dig tool fired this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolUse {
    /// `origin` is the bottom of the user's head
    Drill { user: WormId, origin: Vec2 },
    Torch { user: WormId, origin: Vec2, direction: f32 },
    Laser { user: WormId, from: Vec2, to: Vec2 },
}

/// Everything a worm's trigger can produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolAction {
    Dig(ToolUse),
    Throw { owner: WormId, origin: Vec2, velocity: Vec2, power: f32 },
}

impl ToolUse {
    pub fn user(&self) -> WormId {
        match *self {
            ToolUse::Drill { user, .. } | ToolUse::Torch { user, .. } | ToolUse::Laser { user, .. } => user,
        }
    }

    pub fn tool(&self) -> Tool {
        match self {
            ToolUse::Drill { .. } => Tool::Drill,
            ToolUse::Torch { .. } => Tool::Torch,
            ToolUse::Laser { .. } => Tool::Laser,
        }
    }

    pub fn damage(&self) -> i32 {
        match self {
            ToolUse::Drill { .. } => DRILL_DAMAGE,
            ToolUse::Torch { .. } => TORCH_DAMAGE,
            ToolUse::Laser { .. } => LASER_DAMAGE,
        }
    }

    /// Whether a worm reference point lies inside this tool's damage footprint
    pub fn covers(&self, point: Vec2) -> bool {
        match *self {
            ToolUse::Drill { origin, .. } => {
                let half = DRILL_WIDTH / 2.0;
                (origin.x - half..=origin.x + half).contains(&point.x)
                    && (origin.y..=origin.y + DRILL_DEPTH).contains(&point.y)
            }
            ToolUse::Torch { origin, direction, .. } => {
                let offset = point - origin;
                let distance = offset.length();
                if distance <= f32::EPSILON || distance > TORCH_RANGE {
                    return false;
                }
                let half_cone = (TORCH_CONE_ANGLE_DEG * 0.5).to_radians();
                angle_delta(direction, offset.angle()).abs() <= half_cone
            }
            ToolUse::Laser { from, to, .. } => point.distance_to_segment(from, to) <= LASER_WIDTH / 2.0 + RADIUS,
        }
    }
}

/// Items uncovered and the number of cells removed by one dig
#[derive(Debug, Clone, Default)]
pub struct DigResult {
    pub cleared: usize,
    pub items: Vec<ItemKind>,
}

/// Throw velocity for an aim direction and charged power
pub fn throw_velocity(direction: Vec2, power: f32) -> Vec2 {
    let speed = BASE_THROW_SPEED * (0.5 + power / MAX_POWER * 1.5);
    direction * speed - Vec2::new(0.0, UPWARD_BIAS)
}

/// Handle one tick of tool input for one worm
pub fn process_intent(worm: &mut Worm, intent: &WormIntent, mode: ToolsMode, dt: f32) -> Option<ToolAction> {
    worm.battery.update(dt);

    if worm.lifecycle.is_respawning() {
        worm.charge.cancel();
        return None;
    }

    match intent.tool_cycle {
        ToolCycle::Next => {
            worm.tool = worm.tool.next();
            worm.charge.cancel();
        }
        ToolCycle::Previous => {
            worm.tool = worm.tool.previous();
            worm.charge.cancel();
        }
        ToolCycle::None => {}
    }

    worm.aim.update(intent.aim_axis, worm.facing, dt);

    if worm.lifecycle.is_protected() {
        worm.charge.cancel();
        return None;
    }

    match worm.tool {
        Tool::Dynamite => handle_throw_trigger(worm, intent, mode, dt),
        _ if intent.trigger == TriggerState::Pressed => fire(worm, mode),
        _ => None,
    }
}

fn handle_throw_trigger(worm: &mut Worm, intent: &WormIntent, mode: ToolsMode, dt: f32) -> Option<ToolAction> {
    match intent.trigger {
        TriggerState::Pressed => {
            if mode == ToolsMode::Unlimited || worm.dynamite > 0 {
                worm.charge.charging = true;
                worm.charge.power = 0.0;
            }
            None
        }
        TriggerState::Held => {
            if worm.charge.charging {
                worm.charge.power = (worm.charge.power + POWER_CHARGE_RATE * dt).min(MAX_POWER);
            }
            None
        }
        TriggerState::Released => {
            if !worm.charge.charging {
                return None;
            }
            let power = worm.charge.power;
            worm.charge.cancel();
            throw(worm, power, intent.throw_target, mode)
        }
        TriggerState::Idle => {
            worm.charge.cancel();
            None
        }
    }
}

fn throw(worm: &mut Worm, power: f32, target: Option<Vec2>, mode: ToolsMode) -> Option<ToolAction> {
    if mode == ToolsMode::Standard && worm.dynamite == 0 {
        return None;
    }
    let target = target.unwrap_or_else(|| worm.position + worm.aim.direction() * DEFAULT_TARGET_DISTANCE);
    let offset = target - worm.position;
    if offset.length() > MAX_THROW_DISTANCE {
        tracing::debug!(worm = worm.id, distance = offset.length(), "Throw target out of range");
        return None;
    }
    let direction = if offset.length_sq() > 0.0 {
        offset.normalize()
    } else {
        worm.aim.direction()
    };
    if mode == ToolsMode::Standard {
        worm.dynamite -= 1;
    }
    Some(ToolAction::Throw {
        owner: worm.id,
        origin: worm.position,
        velocity: throw_velocity(direction, power),
        power,
    })
}

fn fire(worm: &mut Worm, mode: ToolsMode) -> Option<ToolAction> {
    let tool_use = match worm.tool {
        Tool::Drill => ToolUse::Drill {
            user: worm.id,
            origin: worm.position + Vec2::new(0.0, RADIUS),
        },
        Tool::Torch => {
            if mode == ToolsMode::Standard {
                if worm.gas < TORCH_GAS_COST {
                    return None;
                }
                worm.gas -= TORCH_GAS_COST;
            }
            ToolUse::Torch {
                user: worm.id,
                origin: worm.position,
                direction: worm.aim.current,
            }
        }
        Tool::Laser => {
            if !worm.battery.try_fire(mode) {
                return None;
            }
            ToolUse::Laser {
                user: worm.id,
                from: worm.position,
                to: worm.position + worm.aim.direction() * LASER_RANGE,
            }
        }
        Tool::Dynamite => return None,
    };
    Some(ToolAction::Dig(tool_use))
}

/// Carve a tool's footprint and sweep up the items it uncovers
pub fn apply_dig(terrain: &mut TerrainGrid, tool_use: &ToolUse) -> DigResult {
    match *tool_use {
        ToolUse::Drill { origin, .. } => {
            let cleared = terrain.dig(origin.x, origin.y, DRILL_WIDTH / 2.0, DigTool::Drill, 0.0);
            let items = terrain.check_for_items(origin.x, origin.y + DRILL_DEPTH / 2.0, DRILL_WIDTH / 2.0);
            DigResult {
                cleared,
                items: items.into_iter().map(|(_, k)| k).collect(),
            }
        }
        ToolUse::Torch { origin, direction, .. } => {
            let cleared = terrain.dig(origin.x, origin.y, TORCH_RANGE, DigTool::Torch, direction);
            let center = origin + Vec2::from_angle(direction) * (TORCH_RANGE / 2.0);
            let items = terrain.check_for_items(center.x, center.y, TORCH_RADIUS);
            DigResult {
                cleared,
                items: items.into_iter().map(|(_, k)| k).collect(),
            }
        }
        ToolUse::Laser { from, to, .. } => DigResult {
            cleared: terrain.dig_line(from, to, LASER_WIDTH / 2.0, DigTool::Laser),
            items: Vec::new(),
        },
    }
}
