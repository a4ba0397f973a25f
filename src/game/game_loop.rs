//! Game loop
//!
//! [`Game`] owns the world and advances it one tick at a time. The order
//! within a tick is fixed:
//!
//! 1. lifecycle timers
//! 2. movement and tool input, worm by worm in roster order
//! 3. physics
//! 4. launches, tool digs, fuses and blast craters (all terrain writes)
//! 5. damage: falls, then tool hits, then blasts; deaths resolve immediately
//! 6. pickups and tombstone looting
//! 7. explosion ageing, goal check, match clock

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, GameConfig};
use crate::game::constants::spawn::{BAND_BOTTOM_FRACTION, BAND_TOP_OFFSET, START_SPACING, START_X};
use crate::game::constants::goal::REACH_RADIUS;
use crate::game::constants::worm::RADIUS;
use crate::game::constants::world::{MAP_HEIGHT, MAP_WIDTH, TILE_SIZE, UI_HEIGHT};
use crate::game::input::InputFrame;
use crate::game::match_result::{self, GameStats, MatchEndReason, MatchResult};
use crate::game::snapshot::WorldSnapshot;
use crate::game::state::{EntityId, GameState, MatchPhase, Tool, Worm, WormId};
use crate::game::systems::combat::{self, CombatEvent, DamageCause, PendingDamage};
use crate::game::systems::lifecycle::{self, LifecycleEvent};
use crate::game::systems::loot::{self, LootEvent};
use crate::game::systems::tools::{self, ToolAction};
use crate::game::systems::{dynamite, explosion, physics};
use crate::game::terrain::{ItemKind, TerrainGrid};
use crate::util::vec2::Vec2;

/// Everything observable that happened during a tick, in the order it
/// happened. Audio and effects hang off these.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ToolUsed { worm: WormId, tool: Tool },
    DynamiteThrown { worm: WormId, dynamite: EntityId, power: f32 },
    Detonated { owner: WormId, position: Vec2, explosion: EntityId },
    Damaged {
        victim: WormId,
        amount: i32,
        source: Option<WormId>,
        cause: DamageCause,
        remaining: i32,
    },
    Died {
        victim: WormId,
        killer: Option<WormId>,
        cause: DamageCause,
        tombstone: EntityId,
        respawn_at: Vec2,
    },
    Respawned { worm: WormId },
    ProtectionEnded { worm: WormId },
    ItemCollected { worm: WormId, item: ItemKind },
    TombstoneLooted { worm: WormId, tombstone: EntityId, gas: u32, dynamite: u32 },
    Wrapped { worm: WormId },
    LevelCompleted { level: u32, reached_by: WormId },
    MatchEnded { reason: MatchEndReason },
}

impl From<CombatEvent> for GameEvent {
    fn from(event: CombatEvent) -> Self {
        match event {
            CombatEvent::Damaged {
                victim,
                amount,
                source,
                cause,
                remaining,
            } => GameEvent::Damaged {
                victim,
                amount,
                source,
                cause,
                remaining,
            },
            CombatEvent::Died {
                victim,
                killer,
                cause,
                tombstone,
                respawn_at,
            } => GameEvent::Died {
                victim,
                killer,
                cause,
                tombstone,
                respawn_at,
            },
        }
    }
}

impl From<LifecycleEvent> for GameEvent {
    fn from(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::Respawned { worm } => GameEvent::Respawned { worm },
            LifecycleEvent::ProtectionEnded { worm } => GameEvent::ProtectionEnded { worm },
        }
    }
}

impl From<LootEvent> for GameEvent {
    fn from(event: LootEvent) -> Self {
        match event {
            LootEvent::ItemCollected { worm, item } => GameEvent::ItemCollected { worm, item },
            LootEvent::TombstoneLooted {
                worm,
                tombstone,
                gas,
                dynamite,
            } => GameEvent::TombstoneLooted {
                worm,
                tombstone,
                gas,
                dynamite,
            },
        }
    }
}

/// A running game
pub struct Game {
    state: GameState,
    config: GameConfig,
}

impl Game {
    /// Validate the config, generate the first level and place the roster
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let terrain = TerrainGrid::generate(MAP_WIDTH, MAP_HEIGHT, &mut rng);
        tracing::info!(seed, characters = config.characters.len(), "Starting game");
        Ok(Self::build(config, terrain, rng.gen()))
    }

    /// Start on a prepared terrain instead of a generated one
    pub fn with_terrain(config: GameConfig, terrain: TerrainGrid) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self::build(config, terrain, seed))
    }

    fn build(config: GameConfig, terrain: TerrainGrid, seed: u64) -> Self {
        let mut state = GameState::new(terrain, config.tools_mode, seed);
        state.match_state.time_limit = config.battle_time_limit;

        let spawns = spawn_points(&state.terrain, config.characters.len());
        for (character, spawn) in config.characters.iter().zip(spawns) {
            state.add_worm(character, spawn);
        }

        Self { state, config }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.state.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut TerrainGrid {
        &mut self.state.terrain
    }

    pub fn worms(&self) -> &[Worm] {
        &self.state.worms
    }

    pub fn is_over(&self) -> bool {
        self.state.match_state.phase == MatchPhase::Ended
    }

    /// Advance the world by `dt` seconds
    pub fn tick(&mut self, dt: f32, input: &InputFrame) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.is_over() {
            return events;
        }
        self.state.tick += 1;

        events.extend(lifecycle::update(&mut self.state, dt).into_iter().map(GameEvent::from));

        // Input
        let mode = self.state.tools_mode;
        let mut actions = Vec::new();
        for worm in self.state.worms.iter_mut() {
            let intent = input.intent(worm.player_slot);
            physics::apply_movement_input(worm, &intent);
            actions.extend(tools::process_intent(worm, &intent, mode, dt));
        }

        let outcomes = physics::update(&mut self.state, dt);
        for (worm, outcome) in outcomes.iter().enumerate() {
            if outcome.wrapped {
                events.push(GameEvent::Wrapped { worm });
            }
        }

        // Terrain writes
        let mut uses = Vec::new();
        for action in actions {
            match action {
                ToolAction::Dig(tool_use) => {
                    events.push(GameEvent::ToolUsed {
                        worm: tool_use.user(),
                        tool: tool_use.tool(),
                    });
                    uses.push(tool_use);
                }
                ToolAction::Throw {
                    owner,
                    origin,
                    velocity,
                    power,
                } => {
                    if let Some(id) = dynamite::launch(&mut self.state, owner, origin, velocity) {
                        events.push(GameEvent::DynamiteThrown {
                            worm: owner,
                            dynamite: id,
                            power,
                        });
                    }
                }
            }
        }

        for tool_use in &uses {
            let dug = tools::apply_dig(&mut self.state.terrain, tool_use);
            if let Some(worm) = self.state.get_worm_mut(tool_use.user()) {
                for item in dug.items {
                    loot::credit_item(worm, item);
                    events.push(GameEvent::ItemCollected { worm: worm.id, item });
                }
            }
        }

        for detonation in dynamite::update(&mut self.state, dt) {
            let (id, _) = explosion::detonate(&mut self.state, &detonation);
            events.push(GameEvent::Detonated {
                owner: detonation.owner,
                position: detonation.position,
                explosion: id,
            });
        }

        // Damage
        let mut pending: Vec<PendingDamage> = outcomes
            .iter()
            .enumerate()
            .filter_map(|(victim, outcome)| {
                outcome.fall_damage.map(|amount| PendingDamage {
                    victim,
                    amount,
                    source: None,
                    cause: DamageCause::Fall,
                })
            })
            .collect();
        pending.extend(combat::tool_hits(&self.state, &uses));
        pending.extend(explosion::collect_hits(&mut self.state).into_iter().map(|hit| PendingDamage {
            victim: hit.victim,
            amount: hit.amount,
            source: hit.source,
            cause: DamageCause::Blast,
        }));
        events.extend(combat::apply_damage(&mut self.state, pending).into_iter().map(GameEvent::from));

        // Loot
        events.extend(loot::collect_items(&mut self.state).into_iter().map(GameEvent::from));
        events.extend(loot::loot_tombstones(&mut self.state).into_iter().map(GameEvent::from));

        explosion::update(&mut self.state, dt);
        loot::remove_looted(&mut self.state);

        if let Some(worm) = self.goal_reached_by() {
            let level = self.state.level;
            tracing::info!(worm, level, "Goal reached");
            events.push(GameEvent::LevelCompleted { level, reached_by: worm });
            self.next_level();
        }

        self.state.match_state.match_time += dt;
        if let Some(reason) = match_result::check_match_end(&self.state) {
            self.state.match_state.phase = MatchPhase::Ended;
            tracing::info!(?reason, match_time = self.state.match_state.match_time, "Match ended");
            events.push(GameEvent::MatchEnded { reason });
        }

        events
    }

    /// First worm in play close enough to the goal
    fn goal_reached_by(&self) -> Option<WormId> {
        self.state
            .active_worms()
            .find(|w| w.position.distance_to(self.state.goal) <= REACH_RADIUS)
            .map(|w| w.id)
    }

    /// Generate a fresh level and move every worm to its start point.
    /// Health, resources and scores carry over; worms still respawning come
    /// back now. Returns the new level number.
    pub fn next_level(&mut self) -> u32 {
        let state = &mut self.state;
        state.level += 1;

        let (width, height) = (state.terrain.width(), state.terrain.height());
        state.terrain = TerrainGrid::generate(width, height, &mut state.rng);
        state.goal = GameState::goal_for(&state.terrain);

        let spawns = spawn_points(&state.terrain, state.worms.len());
        for (worm, spawn) in state.worms.iter_mut().zip(spawns) {
            if worm.lifecycle.is_respawning() {
                worm.restore_for_respawn();
            }
            worm.relocate(spawn);
            worm.thrown.clear();
        }
        state.tombstones.clear();
        state.explosions.clear();

        tracing::info!(level = state.level, "Level started");
        state.level
    }

    pub fn game_stats(&self) -> GameStats {
        match_result::collect_stats(&self.state)
    }

    pub fn result(&self) -> MatchResult {
        match_result::determine_result(&self.state)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::from_game_state(&self.state)
    }
}

/// Level start points, spaced along the top of the terrain and lifted out of
/// solid ground
pub fn spawn_points(terrain: &TerrainGrid, count: usize) -> Vec<Vec2> {
    let max_x = (terrain.pixel_width() - RADIUS).max(RADIUS);
    let start_y = UI_HEIGHT + terrain.pixel_height() * BAND_BOTTOM_FRACTION;
    let top = UI_HEIGHT + BAND_TOP_OFFSET;

    (0..count)
        .map(|i| {
            let x = (START_X + i as f32 * START_SPACING).clamp(RADIUS, max_x);
            let mut p = Vec2::new(x, start_y);
            while p.y > top && (terrain.is_solid_at(p) || physics::circle_hits_terrain(terrain, p, RADIUS)) {
                p.y -= TILE_SIZE;
            }
            p
        })
        .collect()
}
