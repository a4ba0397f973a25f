//! Respawn and spawn-protection timers

use crate::game::constants::world::TIMER_EPSILON;
use crate::game::state::{GameState, Lifecycle, WormId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Back in play with full health and resources, protected
    Respawned { worm: WormId },
    /// Protection wore off
    ProtectionEnded { worm: WormId },
}

/// Count down lifecycle timers. A state entered this tick is not advanced
/// until the next one.
pub fn update(state: &mut GameState, dt: f32) -> Vec<LifecycleEvent> {
    let mut events = Vec::new();

    for worm in state.worms.iter_mut() {
        worm.lifecycle_clock += dt;
        match worm.lifecycle {
            Lifecycle::Alive => {}
            Lifecycle::Respawning { remaining } => {
                let remaining = remaining - dt;
                if remaining <= TIMER_EPSILON {
                    worm.restore_for_respawn();
                    tracing::info!(worm = worm.id, "Worm respawned");
                    events.push(LifecycleEvent::Respawned { worm: worm.id });
                } else {
                    worm.lifecycle = Lifecycle::Respawning { remaining };
                }
            }
            Lifecycle::Protected { remaining } => {
                let remaining = remaining - dt;
                if remaining <= TIMER_EPSILON {
                    worm.enter_lifecycle(Lifecycle::Alive);
                    events.push(LifecycleEvent::ProtectionEnded { worm: worm.id });
                } else {
                    worm.lifecycle = Lifecycle::Protected { remaining };
                }
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CharacterConfig, ToolsMode};
    use crate::game::constants::spawn::{PROTECTION_TIME, RESPAWN_TIME};
    use crate::game::constants::worm::MAX_HEALTH;
    use crate::game::constants::resources::STARTING_GAS;
    use crate::game::state::Rgb;
    use crate::game::terrain::TerrainGrid;
    use crate::util::vec2::Vec2;

    fn respawning_state() -> GameState {
        let mut state = GameState::new(TerrainGrid::new(20, 20), ToolsMode::Standard, 5);
        state.add_worm(&CharacterConfig::new("A", Rgb(1, 1, 1), true, 0), Vec2::new(50.0, 200.0));
        let worm = &mut state.worms[0];
        worm.health = 0;
        worm.gas = 3;
        worm.enter_lifecycle(Lifecycle::Respawning { remaining: RESPAWN_TIME });
        state
    }

    #[test]
    fn test_respawn_then_protection_then_alive() {
        let mut state = respawning_state();
        let dt = 0.125;

        let ticks = (RESPAWN_TIME / dt) as usize;
        for _ in 0..ticks - 1 {
            assert!(update(&mut state, dt).is_empty());
        }
        assert_eq!(update(&mut state, dt), vec![LifecycleEvent::Respawned { worm: 0 }]);

        let worm = &state.worms[0];
        assert!(worm.lifecycle.is_protected());
        assert_eq!(worm.health, MAX_HEALTH);
        assert_eq!(worm.gas, STARTING_GAS);

        let ticks = (PROTECTION_TIME / dt) as usize;
        for _ in 0..ticks - 1 {
            assert!(update(&mut state, dt).is_empty());
        }
        assert_eq!(update(&mut state, dt), vec![LifecycleEvent::ProtectionEnded { worm: 0 }]);
        assert_eq!(state.worms[0].lifecycle, Lifecycle::Alive);
    }

    #[test]
    fn test_protection_holds_until_time_is_up() {
        let mut state = respawning_state();
        state.worms[0].enter_lifecycle(Lifecycle::Protected { remaining: 2e-4 });

        assert!(update(&mut state, 1e-4).is_empty());
        assert!(state.worms[0].lifecycle.is_protected());
        assert_eq!(update(&mut state, 1e-4), vec![LifecycleEvent::ProtectionEnded { worm: 0 }]);
    }

    #[test]
    fn test_clock_tracks_time_in_state() {
        let mut state = respawning_state();
        update(&mut state, 0.5);
        assert!((state.worms[0].lifecycle_clock - 0.5).abs() < 1e-6);
    }
}
