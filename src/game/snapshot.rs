//! Render view of the world
//!
//! Everything a frontend needs to draw one frame except the terrain cells,
//! which it reads from the grid directly (see `TerrainGrid::take_dirty`).

use serde::{Deserialize, Serialize};

use crate::game::aim::Facing;
use crate::game::state::{EntityId, Explosion, GameState, Lifecycle, MatchPhase, Rgb, ThrownDynamite, Tombstone, Tool, Worm, WormId};
use crate::game::terrain::{CellCoord, ItemKind};
use crate::util::vec2::Vec2;

/// Full world state for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub level: u32,
    pub match_phase: MatchPhase,
    pub match_time: f32,
    pub goal: Vec2,
    pub worms: Vec<WormSnapshot>,
    pub dynamite: Vec<DynamiteSnapshot>,
    pub tombstones: Vec<TombstoneSnapshot>,
    pub explosions: Vec<ExplosionSnapshot>,
    pub items: Vec<(CellCoord, ItemKind)>,
}

impl WorldSnapshot {
    pub fn from_game_state(state: &GameState) -> Self {
        Self {
            tick: state.tick,
            level: state.level,
            match_phase: state.match_state.phase,
            match_time: state.match_state.match_time,
            goal: state.goal,
            worms: state.worms.iter().map(WormSnapshot::from_worm).collect(),
            dynamite: state
                .worms
                .iter()
                .flat_map(|w| w.thrown.iter().map(move |d| DynamiteSnapshot::from_dynamite(w.id, d)))
                .collect(),
            tombstones: state
                .tombstones
                .iter()
                .filter(|t| !t.looted)
                .map(TombstoneSnapshot::from_tombstone)
                .collect(),
            explosions: state
                .explosions
                .iter()
                .map(ExplosionSnapshot::from_explosion)
                .collect(),
            items: state.terrain.items().collect(),
        }
    }
}

/// Drawable worm state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WormSnapshot {
    pub id: WormId,
    pub name: String,
    pub position: Vec2,
    /// Active body segments, head first
    pub segments: Vec<Vec2>,
    pub health: i32,
    pub color: Rgb,
    pub lifecycle: Lifecycle,
    pub facing: Facing,
    pub aim: f32,
    pub aim_target: Vec2,
    pub tool: Tool,
    pub gas: u32,
    pub dynamite: u32,
    pub battery: f32,
    /// Throw power while the trigger is held
    pub throw_power: Option<f32>,
}

impl WormSnapshot {
    pub fn from_worm(worm: &Worm) -> Self {
        Self {
            id: worm.id,
            name: worm.name.clone(),
            position: worm.position,
            segments: worm.segments[..worm.active_segment_count()].to_vec(),
            health: worm.health,
            color: worm.render_color(),
            lifecycle: worm.lifecycle,
            facing: worm.facing,
            aim: worm.aim.current,
            aim_target: worm.tool_target(),
            tool: worm.tool,
            gas: worm.gas,
            dynamite: worm.dynamite,
            battery: worm.battery.charge,
            throw_power: worm.charge.charging.then_some(worm.charge.power),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamiteSnapshot {
    pub id: EntityId,
    pub owner: WormId,
    pub position: Vec2,
    pub fuse_remaining: f32,
}

impl DynamiteSnapshot {
    pub fn from_dynamite(owner: WormId, dynamite: &ThrownDynamite) -> Self {
        Self {
            id: dynamite.id,
            owner,
            position: dynamite.position,
            fuse_remaining: dynamite.fuse_remaining(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TombstoneSnapshot {
    pub id: EntityId,
    pub position: Vec2,
    pub deceased: String,
}

impl TombstoneSnapshot {
    pub fn from_tombstone(tombstone: &Tombstone) -> Self {
        Self {
            id: tombstone.id,
            position: tombstone.position,
            deceased: tombstone.deceased.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionSnapshot {
    pub id: EntityId,
    pub center: Vec2,
    pub radius: f32,
    /// 0..1
    pub progress: f32,
}

impl ExplosionSnapshot {
    pub fn from_explosion(explosion: &Explosion) -> Self {
        Self {
            id: explosion.id,
            center: explosion.center,
            radius: explosion.radius,
            progress: explosion.progress(),
        }
    }
}
