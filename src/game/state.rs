//! Game state definitions and structures
//!
//! Contains all entities (worms, thrown dynamite, tombstones, explosions) and
//! the terrain they live in.

// Allow dead_code for utility methods that are part of the public API
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{CharacterConfig, ToolsMode};
use crate::game::aim::{AimState, Facing};
use crate::game::constants::{battery, dynamite, explosion, resources, spawn, worm, world};
use crate::game::terrain::TerrainGrid;
use crate::util::vec2::Vec2;

/// Index of a worm in the roster; stable for the whole game
pub type WormId = usize;

/// Entity identifier for non-worm entities
pub type EntityId = u64;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn scale(self, factor: f32) -> Rgb {
        let f = factor.clamp(0.0, 1.0);
        Rgb(
            (self.0 as f32 * f).round() as u8,
            (self.1 as f32 * f).round() as u8,
            (self.2 as f32 * f).round() as u8,
        )
    }

    /// Blend towards `other`; `t = 0` is self, `t = 1` is other
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(lerp(self.0, other.0), lerp(self.1, other.1), lerp(self.2, other.2))
    }
}

/// Selectable tools, in cycling order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Drill,
    Dynamite,
    Torch,
    Laser,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Drill, Tool::Dynamite, Tool::Torch, Tool::Laser];

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tool {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Tool {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    #[default]
    Airborne,
    Grounded,
}

/// Death/respawn cycle. Exactly one state at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    Alive,
    /// Dead and waiting; the worm has already been moved to its respawn point
    Respawning { remaining: f32 },
    /// Back in play but immune to damage
    Protected { remaining: f32 },
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::Alive
    }
}

impl Lifecycle {
    pub fn is_respawning(&self) -> bool {
        matches!(self, Lifecycle::Respawning { .. })
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Lifecycle::Protected { .. })
    }

    /// In play (Alive or Protected)
    pub fn is_active(&self) -> bool {
        !self.is_respawning()
    }

    /// Only plain Alive worms take damage
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Lifecycle::Alive)
    }
}

/// Result of applying damage to a worm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Worm is respawning or protected
    Ignored,
    Survived { remaining: i32 },
    /// Health hit zero; the caller runs death handling
    Fatal { killer: Option<WormId> },
}

/// Laser battery with rapid-fire overheating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    pub charge: f32,
    /// Remaining overheat cooldown; no recharge while > 0
    pub cooldown: f32,
    /// Consecutive shots each within the rapid-fire window of the previous
    pub rapid_shots: u32,
    /// Time since the last shot
    pub since_last_shot: f32,
}

impl Default for Battery {
    fn default() -> Self {
        Self {
            charge: battery::MAX_CHARGE,
            cooldown: 0.0,
            rapid_shots: 0,
            since_last_shot: f32::INFINITY,
        }
    }
}

impl Battery {
    pub fn update(&mut self, dt: f32) {
        self.since_last_shot += dt;
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
            if self.cooldown <= world::TIMER_EPSILON {
                self.cooldown = 0.0;
                self.rapid_shots = 0;
            }
        } else if self.charge < battery::MAX_CHARGE {
            self.charge = (self.charge + battery::RECHARGE_RATE * dt).min(battery::MAX_CHARGE);
        }
    }

    /// Spend one shot. Unlimited mode never drains or refuses.
    pub fn try_fire(&mut self, mode: ToolsMode) -> bool {
        if mode == ToolsMode::Unlimited {
            return true;
        }
        if self.charge + battery::CHARGE_TOLERANCE < battery::SHOT_COST {
            return false;
        }
        self.charge = (self.charge - battery::SHOT_COST).max(0.0);

        if self.since_last_shot < battery::RAPID_FIRE_WINDOW {
            self.rapid_shots += 1;
        } else {
            self.rapid_shots = 1;
        }
        self.since_last_shot = 0.0;

        if self.rapid_shots >= battery::RAPID_FIRE_LIMIT {
            self.cooldown = battery::COOLDOWN;
            tracing::debug!(charge = self.charge, "Laser overheated");
        }
        true
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown > 0.0
    }
}

/// Dynamite throw charge (held trigger)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrowCharge {
    pub charging: bool,
    /// 0..=MAX_POWER
    pub power: f32,
}

impl ThrowCharge {
    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

/// Dynamite in flight or resting, owned by its thrower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrownDynamite {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds since the throw
    pub elapsed: f32,
    pub fuse: f32,
    pub exploded: bool,
}

impl ThrownDynamite {
    pub fn new(id: EntityId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
            elapsed: 0.0,
            fuse: dynamite::FUSE_TIME,
            exploded: false,
        }
    }

    pub fn fuse_remaining(&self) -> f32 {
        (self.fuse - self.elapsed).max(0.0)
    }
}

/// Loot left where a worm died
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tombstone {
    pub id: EntityId,
    pub position: Vec2,
    pub gas: u32,
    pub dynamite: u32,
    pub deceased: String,
    pub looted: bool,
}

/// Blast damage area plus its visual lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    pub center: Vec2,
    pub radius: f32,
    pub base_damage: i32,
    pub source: Option<WormId>,
    pub age: f32,
    pub duration: f32,
    /// Damage has been dealt; from here on it is animation only
    pub applied: bool,
}

impl Explosion {
    pub fn new(id: EntityId, center: Vec2, radius: f32, base_damage: i32, source: Option<WormId>) -> Self {
        Self {
            id,
            center,
            radius,
            base_damage,
            source,
            age: 0.0,
            duration: explosion::DURATION,
            applied: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.age + world::TIMER_EPSILON >= self.duration
    }

    /// 0..1 animation progress
    pub fn progress(&self) -> f32 {
        (self.age / self.duration).clamp(0.0, 1.0)
    }
}

/// Worm state
///
/// Hot fields (touched by physics every tick) come first, then combat and
/// scoring, then identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worm {
    // === HOT FIELDS ===
    pub position: Vec2,
    pub velocity: Vec2,
    pub motion: MotionState,
    pub can_jump: bool,
    /// Head plus trailing segments; `segments[0]` follows the position
    pub segments: [Vec2; worm::SEGMENT_COUNT],
    pub segment_timer: f32,
    /// y where the current fall started
    pub fall_start_y: Option<f32>,
    pub facing: Facing,
    pub aim: AimState,

    // === WARM FIELDS ===
    pub health: i32,
    pub lifecycle: Lifecycle,
    /// Seconds spent in the current lifecycle state
    pub lifecycle_clock: f32,
    pub tool: Tool,
    pub gas: u32,
    pub dynamite: u32,
    pub battery: Battery,
    pub charge: ThrowCharge,
    pub thrown: Vec<ThrownDynamite>,
    pub kills: u32,
    pub deaths: u32,
    pub fall_deaths: u32,
    pub self_deaths: u32,

    // === COLD FIELDS ===
    pub id: WormId,
    pub name: String,
    pub color: Rgb,
    pub is_human: bool,
    pub player_slot: u8,
}

impl Worm {
    pub fn new(id: WormId, character: &CharacterConfig, position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            motion: MotionState::Airborne,
            can_jump: false,
            segments: [position; worm::SEGMENT_COUNT],
            segment_timer: 0.0,
            fall_start_y: None,
            facing: Facing::Right,
            aim: AimState::new(Facing::Right),
            health: worm::MAX_HEALTH,
            lifecycle: Lifecycle::Alive,
            lifecycle_clock: 0.0,
            tool: Tool::default(),
            gas: resources::STARTING_GAS,
            dynamite: dynamite::STARTING_COUNT,
            battery: Battery::default(),
            charge: ThrowCharge::default(),
            thrown: Vec::new(),
            kills: 0,
            deaths: 0,
            fall_deaths: 0,
            self_deaths: 0,
            id,
            name: character.name.clone(),
            color: character.color,
            is_human: character.is_human,
            player_slot: character.player_slot,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.motion == MotionState::Grounded
    }

    /// Segments drawn and collided, by health tier
    pub fn active_segment_count(&self) -> usize {
        if self.lifecycle.is_respawning() {
            return worm::SEGMENT_COUNT;
        }
        let ratio = self.health as f32 / worm::MAX_HEALTH as f32;
        if ratio > 0.8 {
            5
        } else if ratio > 0.6 {
            4
        } else if ratio > 0.4 {
            3
        } else if ratio > 0.2 {
            2
        } else if ratio > 0.0 {
            1
        } else {
            0
        }
    }

    /// Radius of body segment `index`
    pub fn segment_radius(index: usize) -> f32 {
        worm::RADIUS - worm::SEGMENT_RADIUS_STEP * index as f32
    }

    /// Apply damage. The caller handles a `Fatal` outcome.
    pub fn take_damage(&mut self, amount: i32, source: Option<WormId>) -> DamageOutcome {
        if !self.lifecycle.is_vulnerable() || amount <= 0 {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount).clamp(0, worm::MAX_HEALTH);
        if self.health == 0 {
            DamageOutcome::Fatal { killer: source }
        } else {
            DamageOutcome::Survived { remaining: self.health }
        }
    }

    /// Move the worm somewhere new with no momentum
    pub fn relocate(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.motion = MotionState::Airborne;
        self.can_jump = false;
        self.fall_start_y = None;
        self.segments = [position; worm::SEGMENT_COUNT];
        self.segment_timer = 0.0;
        self.charge.cancel();
    }

    pub(crate) fn enter_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
        self.lifecycle_clock = 0.0;
    }

    /// Full health and starting resources, entering protection
    pub(crate) fn restore_for_respawn(&mut self) {
        self.health = worm::MAX_HEALTH;
        self.gas = resources::STARTING_GAS;
        self.dynamite = dynamite::STARTING_COUNT;
        self.battery = Battery::default();
        self.enter_lifecycle(Lifecycle::Protected {
            remaining: spawn::PROTECTION_TIME,
        });
    }

    pub fn add_gas(&mut self, amount: u32) {
        self.gas = (self.gas + amount).min(resources::MAX_GAS);
    }

    /// Colour for drawing, including the respawn and protection pulses
    pub fn render_color(&self) -> Rgb {
        match self.lifecycle {
            Lifecycle::Alive => self.color,
            Lifecycle::Respawning { .. } => {
                let pulse = ((self.lifecycle_clock * 4.0).sin() + 1.0) / 2.0;
                self.color.scale(pulse)
            }
            Lifecycle::Protected { remaining } => {
                let pulse = ((remaining * 6.0 * std::f32::consts::PI).sin() + 1.0) / 2.0;
                self.color.mix(Rgb::WHITE, pulse)
            }
        }
    }

    /// Aim target point for the selected tool
    pub fn tool_target(&self) -> Vec2 {
        use crate::game::constants::tools::{DEFAULT_TARGET_DISTANCE, LASER_RANGE};
        let reach = match self.tool {
            Tool::Laser => LASER_RANGE,
            _ => DEFAULT_TARGET_DISTANCE,
        };
        self.position + self.aim.direction() * reach
    }
}

/// Match phase
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchPhase {
    #[default]
    Playing,
    Ended,
}

/// Match state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: MatchPhase,
    pub match_time: f32,
    pub time_limit: Option<f32>,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u64,
    pub level: u32,
    pub match_state: MatchState,
    pub tools_mode: ToolsMode,
    pub terrain: TerrainGrid,
    pub worms: Vec<Worm>,
    pub tombstones: Vec<Tombstone>,
    pub explosions: Vec<Explosion>,
    pub goal: Vec2,
    pub rng: StdRng,
    next_entity_id: EntityId,
}

impl GameState {
    pub fn new(terrain: TerrainGrid, tools_mode: ToolsMode, seed: u64) -> Self {
        let goal = Self::goal_for(&terrain);
        Self {
            tick: 0,
            level: 1,
            match_state: MatchState::default(),
            tools_mode,
            terrain,
            worms: Vec::new(),
            tombstones: Vec::new(),
            explosions: Vec::new(),
            goal,
            rng: StdRng::seed_from_u64(seed),
            next_entity_id: 0,
        }
    }

    /// Goal point near the bottom-right corner of a terrain
    pub fn goal_for(terrain: &TerrainGrid) -> Vec2 {
        use crate::game::constants::goal::EDGE_INSET;
        Vec2::new(terrain.pixel_width() - EDGE_INSET, terrain.bottom_y() - EDGE_INSET)
    }

    /// Generate a new unique entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    pub fn get_worm(&self, id: WormId) -> Option<&Worm> {
        self.worms.get(id)
    }

    pub fn get_worm_mut(&mut self, id: WormId) -> Option<&mut Worm> {
        self.worms.get_mut(id)
    }

    /// Add a worm; its id is its roster index
    pub fn add_worm(&mut self, character: &CharacterConfig, position: Vec2) -> WormId {
        let id = self.worms.len();
        self.worms.push(Worm::new(id, character, position));
        id
    }

    /// Worms currently in play (not respawning)
    pub fn active_worms(&self) -> impl Iterator<Item = &Worm> {
        self.worms.iter().filter(|w| w.lifecycle.is_active())
    }

    pub fn add_tombstone(&mut self, position: Vec2, gas: u32, dynamite: u32, deceased: String) -> EntityId {
        let id = self.next_entity_id();
        self.tombstones.push(Tombstone {
            id,
            position,
            gas,
            dynamite,
            deceased,
            looted: false,
        });
        id
    }

    pub fn add_explosion(&mut self, center: Vec2, radius: f32, base_damage: i32, source: Option<WormId>) -> EntityId {
        let id = self.next_entity_id();
        self.explosions
            .push(Explosion::new(id, center, radius, base_damage, source));
        id
    }

    /// Total gas and dynamite held by worms and lying in unlooted tombstones
    pub fn resource_totals(&self) -> (u32, u32) {
        let worms = self
            .worms
            .iter()
            .fold((0, 0), |(g, d), w| (g + w.gas, d + w.dynamite));
        self.tombstones
            .iter()
            .filter(|t| !t.looted)
            .fold(worms, |(g, d), t| (g + t.gas, d + t.dynamite))
    }
}
