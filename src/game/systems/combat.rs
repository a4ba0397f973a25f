//! Damage, death and respawn placement
//!
//! Damage from every source is gathered into [`PendingDamage`] first and then
//! applied in order. A worm killed part way through the list is already
//! respawning, so the rest of its damage for the tick is ignored.

use rand::Rng;
use smallvec::SmallVec;

use crate::game::constants::spawn::*;
use crate::game::constants::tombstone::RESOURCE_PERCENT;
use crate::game::constants::worm::RADIUS;
use crate::game::constants::world::UI_HEIGHT;
use crate::game::state::{DamageOutcome, EntityId, GameState, Lifecycle, Tool, WormId};
use crate::game::systems::physics::circle_hits_terrain;
use crate::game::systems::tools::ToolUse;
use crate::util::vec2::Vec2;

/// Where damage came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DamageCause {
    Fall,
    Tool(Tool),
    Blast,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingDamage {
    pub victim: WormId,
    pub amount: i32,
    /// Credited with the kill; `None` for falls
    pub source: Option<WormId>,
    pub cause: DamageCause,
}

/// Combat events
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
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
}

/// Share of a resource left in the tombstone, rounded up
pub fn tombstone_share(amount: u32) -> u32 {
    amount.min((amount * RESOURCE_PERCENT + 99) / 100)
}

/// Damage from this tick's tool uses, attacker by attacker. Users never hit
/// themselves.
pub fn tool_hits(state: &GameState, uses: &[ToolUse]) -> Vec<PendingDamage> {
    let mut pending = Vec::new();
    for tool_use in uses {
        let user = tool_use.user();
        let victims: SmallVec<[WormId; 4]> = state
            .worms
            .iter()
            .filter(|w| w.id != user && w.lifecycle.is_vulnerable())
            .filter(|w| tool_use.covers(w.position))
            .map(|w| w.id)
            .collect();

        pending.extend(victims.into_iter().map(|victim| PendingDamage {
            victim,
            amount: tool_use.damage(),
            source: Some(user),
            cause: DamageCause::Tool(tool_use.tool()),
        }));
    }
    pending
}

/// Apply damage in order, running death handling as soon as a worm dies
pub fn apply_damage<I>(state: &mut GameState, pending: I) -> Vec<CombatEvent>
where
    I: IntoIterator<Item = PendingDamage>,
{
    let mut events = Vec::new();

    for hit in pending {
        let Some(worm) = state.get_worm_mut(hit.victim) else {
            continue;
        };

        match worm.take_damage(hit.amount, hit.source) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Survived { remaining } => {
                events.push(CombatEvent::Damaged {
                    victim: hit.victim,
                    amount: hit.amount,
                    source: hit.source,
                    cause: hit.cause,
                    remaining,
                });
            }
            DamageOutcome::Fatal { killer } => {
                events.push(CombatEvent::Damaged {
                    victim: hit.victim,
                    amount: hit.amount,
                    source: hit.source,
                    cause: hit.cause,
                    remaining: 0,
                });
                events.extend(handle_death(state, hit.victim, killer, hit.cause));
            }
        }
    }

    events
}

/// Score the death, drop a tombstone, move the worm to a safe spawn and start
/// its respawn timer
pub fn handle_death(
    state: &mut GameState,
    victim: WormId,
    killer: Option<WormId>,
    cause: DamageCause,
) -> Option<CombatEvent> {
    let worm = state.get_worm_mut(victim)?;
    let position = worm.position;

    worm.deaths += 1;
    match killer {
        None => worm.fall_deaths += 1,
        Some(k) if k == victim => worm.self_deaths += 1,
        Some(_) => {}
    }

    let gas = tombstone_share(worm.gas);
    let dynamite = tombstone_share(worm.dynamite);
    worm.gas -= gas;
    worm.dynamite -= dynamite;
    let deceased = worm.name.clone();

    if let Some(k) = killer.filter(|k| *k != victim) {
        if let Some(other) = state.get_worm_mut(k) {
            other.kills += 1;
        }
    }

    let tombstone = state.add_tombstone(position, gas, dynamite, deceased);
    let respawn_at = find_safe_spawn(state, victim);

    let worm = state.get_worm_mut(victim)?;
    worm.relocate(respawn_at);
    worm.enter_lifecycle(Lifecycle::Respawning { remaining: RESPAWN_TIME });

    tracing::info!(
        worm = victim,
        killer = ?killer,
        cause = ?cause,
        gas,
        dynamite,
        "Worm died"
    );

    Some(CombatEvent::Died {
        victim,
        killer,
        cause,
        tombstone,
        respawn_at,
    })
}

/// Random open point in the spawn band away from other worms in play
pub fn find_safe_spawn(state: &mut GameState, exclude: WormId) -> Vec2 {
    let others: SmallVec<[Vec2; 8]> = state
        .active_worms()
        .filter(|w| w.id != exclude)
        .map(|w| w.position)
        .collect();

    let terrain = &state.terrain;
    let (min_x, max_x) = (RADIUS * 2.0, terrain.pixel_width() - RADIUS * 2.0);
    let (min_y, max_y) = (
        UI_HEIGHT + BAND_TOP_OFFSET,
        UI_HEIGHT + terrain.pixel_height() * BAND_BOTTOM_FRACTION,
    );

    if min_x < max_x && min_y < max_y {
        for _ in 0..MAX_ATTEMPTS {
            let pos = Vec2::new(state.rng.gen_range(min_x..max_x), state.rng.gen_range(min_y..max_y));

            let crowded = others
                .iter()
                .any(|other| pos.distance_to(*other) < MIN_DISTANCE_FROM_OTHERS);
            if crowded || terrain.is_solid_at(pos) || circle_hits_terrain(terrain, pos, RADIUS) {
                continue;
            }
            return pos;
        }
    }

    tracing::warn!(worm = exclude, "No safe spawn found, using fallback");
    Vec2::new(FALLBACK_X, UI_HEIGHT + FALLBACK_OFFSET_Y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CharacterConfig, ToolsMode};
    use crate::game::constants::worm::MAX_HEALTH;
    use crate::game::constants::{dynamite, resources};
    use crate::game::state::Rgb;
    use crate::game::terrain::{Material, TerrainGrid};

    fn arena(positions: &[Vec2]) -> GameState {
        let mut state = GameState::new(TerrainGrid::new(240, 118), ToolsMode::Standard, 11);
        for (i, p) in positions.iter().enumerate() {
            let c = CharacterConfig::new(format!("W{}", i), Rgb(9, 9, 9), true, i as u8);
            state.add_worm(&c, *p);
        }
        state
    }

    fn hit(victim: WormId, amount: i32, source: Option<WormId>) -> PendingDamage {
        PendingDamage {
            victim,
            amount,
            source,
            cause: DamageCause::Blast,
        }
    }

    #[test]
    fn test_tombstone_share_rounds_up() {
        assert_eq!(tombstone_share(0), 0);
        assert_eq!(tombstone_share(1), 1);
        assert_eq!(tombstone_share(5), 1);
        assert_eq!(tombstone_share(10), 2);
        assert_eq!(tombstone_share(11), 3);
        assert_eq!(tombstone_share(100), 20);
    }

    #[test]
    fn test_tool_hits_skip_the_user() {
        let state = arena(&[Vec2::new(500.0, 600.0), Vec2::new(550.0, 600.0)]);
        let uses = [ToolUse::Torch {
            user: 0,
            origin: Vec2::new(500.0, 600.0),
            direction: 0.0,
        }];

        let pending = tool_hits(&state, &uses);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].victim, 1);
        assert_eq!(pending[0].source, Some(0));
        assert_eq!(pending[0].cause, DamageCause::Tool(Tool::Torch));
    }

    #[test]
    fn test_survivable_damage() {
        let mut state = arena(&[Vec2::new(500.0, 600.0)]);
        let events = apply_damage(&mut state, [hit(0, 30, Some(0))]);

        assert_eq!(state.worms[0].health, MAX_HEALTH - 30);
        assert!(matches!(events[0], CombatEvent::Damaged { remaining: 70, .. }));
    }

    #[test]
    fn test_kill_scores_and_respawns() {
        let mut state = arena(&[Vec2::new(500.0, 600.0), Vec2::new(1500.0, 600.0)]);
        let before = state.resource_totals();

        let events = apply_damage(&mut state, [hit(0, 150, Some(1))]);

        let victim = &state.worms[0];
        assert!(victim.lifecycle.is_respawning());
        assert_eq!(victim.deaths, 1);
        assert_eq!(victim.fall_deaths, 0);
        assert_eq!(victim.gas, resources::STARTING_GAS - 20);
        assert_eq!(victim.dynamite, dynamite::STARTING_COUNT - 2);
        assert_ne!(victim.position, Vec2::new(500.0, 600.0));
        assert_eq!(state.worms[1].kills, 1);

        assert_eq!(state.tombstones.len(), 1);
        assert_eq!(state.tombstones[0].position, Vec2::new(500.0, 600.0));
        assert_eq!(state.tombstones[0].gas, 20);
        assert_eq!(state.resource_totals(), before);

        assert!(events.iter().any(|e| matches!(e, CombatEvent::Died { victim: 0, killer: Some(1), .. })));
    }

    #[test]
    fn test_self_and_fall_deaths() {
        let mut state = arena(&[Vec2::new(500.0, 600.0), Vec2::new(1500.0, 600.0)]);

        apply_damage(&mut state, [hit(0, 200, Some(0))]);
        apply_damage(&mut state, [hit(1, 200, None)]);

        assert_eq!(state.worms[0].self_deaths, 1);
        assert_eq!(state.worms[0].kills, 0);
        assert_eq!(state.worms[1].fall_deaths, 1);
    }

    #[test]
    fn test_dead_worm_ignores_rest_of_tick() {
        let mut state = arena(&[Vec2::new(500.0, 600.0)]);

        let events = apply_damage(&mut state, [hit(0, 200, None), hit(0, 50, None)]);

        assert_eq!(state.worms[0].deaths, 1);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_protected_takes_nothing() {
        let mut state = arena(&[Vec2::new(500.0, 600.0)]);
        state.worms[0].lifecycle = Lifecycle::Protected { remaining: 2.0 };

        let events = apply_damage(&mut state, [hit(0, 200, Some(0))]);

        assert!(events.is_empty());
        assert_eq!(state.worms[0].health, MAX_HEALTH);
    }

    #[test]
    fn test_safe_spawn_keeps_distance() {
        let mut state = arena(&[Vec2::new(500.0, 300.0), Vec2::new(900.0, 300.0)]);
        for _ in 0..20 {
            let p = find_safe_spawn(&mut state, 0);
            assert!(p.distance_to(state.worms[1].position) >= MIN_DISTANCE_FROM_OTHERS);
            assert!(p.y >= UI_HEIGHT + BAND_TOP_OFFSET);
            assert!(!circle_hits_terrain(&state.terrain, p, RADIUS));
        }
    }

    #[test]
    fn test_safe_spawn_fallback_when_buried() {
        let mut state = arena(&[Vec2::new(500.0, 300.0)]);
        state.terrain = TerrainGrid::filled(240, 118, Material::Dirt);

        let p = find_safe_spawn(&mut state, 0);

        assert_eq!(p, Vec2::new(FALLBACK_X, UI_HEIGHT + FALLBACK_OFFSET_Y));
    }
}
