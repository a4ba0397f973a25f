//! Blast craters, blast damage and explosion ageing

use crate::game::constants::dynamite::{BASE_DAMAGE, BLAST_RADIUS, MIN_DAMAGE};
use crate::game::state::{EntityId, Explosion, GameState, WormId};
use crate::game::systems::dynamite::Detonation;
use crate::game::terrain::DigTool;
use crate::util::vec2::Vec2;

impl Explosion {
    /// Damage at `point`: linear falloff of one point per pixel, floored at
    /// the minimum anywhere inside the radius
    pub fn damage_at(&self, point: Vec2) -> Option<i32> {
        let distance = self.center.distance_to(point);
        if distance > self.radius {
            return None;
        }
        Some((self.base_damage - distance.floor() as i32).max(MIN_DAMAGE))
    }
}

/// Blast damage owed to one worm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlastHit {
    pub victim: WormId,
    pub amount: i32,
    pub source: Option<WormId>,
    pub explosion: EntityId,
}

/// Carve the crater and register the explosion. Returns the explosion id and
/// the number of cells removed.
pub fn detonate(state: &mut GameState, detonation: &Detonation) -> (EntityId, usize) {
    let p = detonation.position;
    let cleared = state.terrain.dig(p.x, p.y, BLAST_RADIUS, DigTool::Blast, 0.0);
    let id = state.add_explosion(p, BLAST_RADIUS, BASE_DAMAGE, Some(detonation.owner));
    tracing::debug!(owner = detonation.owner, x = p.x, y = p.y, cleared, "Dynamite detonated");
    (id, cleared)
}

/// Damage from explosions that have not dealt it yet, marking them applied.
/// The thrower is not spared.
pub fn collect_hits(state: &mut GameState) -> Vec<BlastHit> {
    let mut hits = Vec::new();
    for explosion in state.explosions.iter_mut().filter(|e| !e.applied) {
        explosion.applied = true;
        for worm in state.worms.iter().filter(|w| w.lifecycle.is_vulnerable()) {
            if let Some(amount) = explosion.damage_at(worm.position) {
                hits.push(BlastHit {
                    victim: worm.id,
                    amount,
                    source: explosion.source,
                    explosion: explosion.id,
                });
            }
        }
    }
    hits
}

/// Age explosions and drop the finished ones
pub fn update(state: &mut GameState, dt: f32) {
    for explosion in state.explosions.iter_mut() {
        explosion.age += dt;
    }
    state.explosions.retain(|e| !e.is_finished());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CharacterConfig, ToolsMode};
    use crate::game::constants::explosion::DURATION;
    use crate::game::state::Rgb;
    use crate::game::terrain::{CellCoord, Material, TerrainGrid};

    fn blast() -> Explosion {
        Explosion::new(0, Vec2::new(500.0, 400.0), BLAST_RADIUS, BASE_DAMAGE, Some(1))
    }

    #[test]
    fn test_falloff() {
        let e = blast();
        assert_eq!(e.damage_at(Vec2::new(500.0, 400.0)), Some(70));
        assert_eq!(e.damage_at(Vec2::new(550.0, 400.0)), Some(20));
        assert_eq!(e.damage_at(Vec2::new(500.0, 465.0)), Some(MIN_DAMAGE));
        assert_eq!(e.damage_at(Vec2::new(500.0 + BLAST_RADIUS, 400.0)), Some(MIN_DAMAGE));
        assert_eq!(e.damage_at(Vec2::new(700.0, 400.0)), None);
    }

    #[test]
    fn test_hits_are_collected_once_and_include_the_thrower() {
        let mut state = GameState::new(TerrainGrid::new(100, 80), ToolsMode::Standard, 3);
        let c = CharacterConfig::new("A", Rgb(1, 1, 1), true, 0);
        state.add_worm(&c, Vec2::new(500.0, 400.0));
        state.add_worm(&c, Vec2::new(550.0, 400.0));
        state.add_worm(&c, Vec2::new(900.0, 400.0));

        let detonation = Detonation {
            owner: 0,
            dynamite: 99,
            position: Vec2::new(500.0, 400.0),
        };
        detonate(&mut state, &detonation);

        let hits = collect_hits(&mut state);
        let victims: Vec<_> = hits.iter().map(|h| (h.victim, h.amount)).collect();
        assert_eq!(victims, vec![(0, 70), (1, 20)]);
        assert!(hits.iter().all(|h| h.source == Some(0)));

        assert!(collect_hits(&mut state).is_empty());
    }

    #[test]
    fn test_crater_is_carved() {
        let mut state = GameState::new(TerrainGrid::filled(60, 60, Material::Dirt), ToolsMode::Standard, 3);
        let center = TerrainGrid::cell_center(CellCoord::new(30, 30));

        let (_, cleared) = detonate(
            &mut state,
            &Detonation {
                owner: 0,
                dynamite: 0,
                position: center,
            },
        );

        assert!(cleared > 0);
        assert_eq!(state.terrain.cell(30, 30), Material::Empty);
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_explosions_expire() {
        let mut state = GameState::new(TerrainGrid::new(10, 10), ToolsMode::Standard, 3);
        state.add_explosion(Vec2::ZERO, 10.0, 10, None);

        update(&mut state, DURATION / 2.0);
        assert_eq!(state.explosions.len(), 1);
        update(&mut state, DURATION / 2.0);
        assert!(state.explosions.is_empty());
    }
}
