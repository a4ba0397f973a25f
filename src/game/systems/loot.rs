//! Item pickups and tombstone looting

use crate::game::constants::resources::{EXPLOSIVE_PICKUP_AMOUNT, GAS_CANISTER_AMOUNT, PICKUP_RADIUS};
use crate::game::constants::tombstone::INTERACTION_RADIUS;
use crate::game::state::{EntityId, GameState, Tombstone, Worm, WormId};
use crate::game::terrain::ItemKind;

#[derive(Debug, Clone, PartialEq)]
pub enum LootEvent {
    ItemCollected { worm: WormId, item: ItemKind },
    TombstoneLooted {
        worm: WormId,
        tombstone: EntityId,
        gas: u32,
        dynamite: u32,
    },
}

/// Give a collected item's contents to a worm
pub fn credit_item(worm: &mut Worm, item: ItemKind) {
    match item {
        ItemKind::GasCanister => worm.add_gas(GAS_CANISTER_AMOUNT),
        ItemKind::ExplosiveCharge => worm.dynamite += EXPLOSIVE_PICKUP_AMOUNT,
    }
}

impl Tombstone {
    pub fn in_reach(&self, worm: &Worm) -> bool {
        !self.looted && worm.lifecycle.is_active() && self.position.distance_to(worm.position) <= INTERACTION_RADIUS
    }

    /// Move the contents to `worm`, gas clamped to the cap. Only the first
    /// call does anything.
    pub fn loot(&mut self, worm: &mut Worm) -> Option<(u32, u32)> {
        if self.looted {
            return None;
        }
        self.looted = true;
        worm.add_gas(self.gas);
        worm.dynamite += self.dynamite;
        Some((self.gas, self.dynamite))
    }
}

/// Worms in play pick up items lying within reach
pub fn collect_items(state: &mut GameState) -> Vec<LootEvent> {
    let mut events = Vec::new();
    for worm in state.worms.iter_mut().filter(|w| w.lifecycle.is_active()) {
        let found = state
            .terrain
            .check_for_items(worm.position.x, worm.position.y, PICKUP_RADIUS);
        for (_, item) in found {
            credit_item(worm, item);
            events.push(LootEvent::ItemCollected { worm: worm.id, item });
        }
    }
    events
}

/// First worm in roster order within reach of a tombstone takes everything
pub fn loot_tombstones(state: &mut GameState) -> Vec<LootEvent> {
    let mut events = Vec::new();
    for tombstone in state.tombstones.iter_mut() {
        let Some(worm) = state.worms.iter_mut().find(|w| tombstone.in_reach(w)) else {
            continue;
        };
        if let Some((gas, dynamite)) = tombstone.loot(worm) {
            tracing::debug!(worm = worm.id, tombstone = tombstone.id, gas, dynamite, "Tombstone looted");
            events.push(LootEvent::TombstoneLooted {
                worm: worm.id,
                tombstone: tombstone.id,
                gas,
                dynamite,
            });
        }
    }
    events
}

/// Drop tombstones that have been emptied
pub fn remove_looted(state: &mut GameState) {
    state.tombstones.retain(|t| !t.looted);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CharacterConfig, ToolsMode};
    use crate::game::constants::resources::{MAX_GAS, STARTING_GAS};
    use crate::game::state::{Lifecycle, Rgb};
    use crate::game::terrain::TerrainGrid;
    use crate::util::vec2::Vec2;

    fn state() -> GameState {
        let mut state = GameState::new(TerrainGrid::new(100, 100), ToolsMode::Standard, 2);
        for i in 0..2 {
            let c = CharacterConfig::new(format!("W{}", i), Rgb(1, 1, 1), true, i);
            state.add_worm(&c, Vec2::new(200.0 + 300.0 * i as f32, 400.0));
        }
        state
    }

    #[test]
    fn test_gas_pickup_is_capped() {
        let mut s = state();
        let w = &mut s.worms[0];
        w.gas = MAX_GAS - 10;
        credit_item(w, ItemKind::GasCanister);
        assert_eq!(w.gas, MAX_GAS);
    }

    #[test]
    fn test_collect_item_under_worm() {
        let mut s = state();
        let cell = TerrainGrid::world_to_cell(200.0, 400.0);
        s.terrain.place_item(cell, ItemKind::GasCanister);

        let events = collect_items(&mut s);

        assert_eq!(
            events,
            vec![LootEvent::ItemCollected {
                worm: 0,
                item: ItemKind::GasCanister
            }]
        );
        assert_eq!(s.worms[0].gas, STARTING_GAS + GAS_CANISTER_AMOUNT);
        assert_eq!(s.terrain.item_count(), 0);
    }

    #[test]
    fn test_respawning_worm_collects_nothing() {
        let mut s = state();
        s.worms[0].lifecycle = Lifecycle::Respawning { remaining: 1.0 };
        s.terrain.place_item(TerrainGrid::world_to_cell(200.0, 400.0), ItemKind::ExplosiveCharge);

        assert!(collect_items(&mut s).is_empty());
        assert_eq!(s.terrain.item_count(), 1);
    }

    #[test]
    fn test_tombstone_looted_once() {
        let mut s = state();
        s.add_tombstone(Vec2::new(510.0, 400.0), 20, 2, "W9".into());
        let before = s.resource_totals();

        let events = loot_tombstones(&mut s);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LootEvent::TombstoneLooted { worm: 1, gas: 20, dynamite: 2, .. }));
        assert_eq!(s.resource_totals(), before);

        assert!(loot_tombstones(&mut s).is_empty());
        assert_eq!(s.worms[1].gas, STARTING_GAS + 20);

        remove_looted(&mut s);
        assert!(s.tombstones.is_empty());
    }

    #[test]
    fn test_second_loot_fails() {
        let mut s = state();
        s.add_tombstone(Vec2::new(200.0, 400.0), 4, 1, "W9".into());
        let mut tombstone = s.tombstones[0].clone();
        let worm = &mut s.worms[0];

        assert_eq!(tombstone.loot(worm), Some((4, 1)));
        assert_eq!(tombstone.loot(worm), None);
        assert_eq!(worm.gas, STARTING_GAS + 4);
    }

    #[test]
    fn test_looted_gas_is_capped() {
        let mut s = state();
        s.worms[1].gas = MAX_GAS - 5;
        s.add_tombstone(Vec2::new(500.0, 400.0), 20, 0, "W9".into());

        loot_tombstones(&mut s);

        assert_eq!(s.worms[1].gas, MAX_GAS);
    }

    #[test]
    fn test_protected_worm_can_loot() {
        let mut s = state();
        s.worms[0].lifecycle = Lifecycle::Protected { remaining: 2.0 };
        s.add_tombstone(Vec2::new(200.0, 415.0), 5, 1, "W9".into());

        assert_eq!(loot_tombstones(&mut s).len(), 1);
    }

    #[test]
    fn test_out_of_reach_tombstone_stays() {
        let mut s = state();
        s.add_tombstone(Vec2::new(350.0, 400.0), 5, 1, "W9".into());

        assert!(loot_tombstones(&mut s).is_empty());
        assert!(!s.tombstones[0].looted);
    }
}
