//! Level generation
//!
//! Open sky over a ground line, clustered noise underground, a few starter
//! tunnels and scattered pickups. All randomness comes from the caller's RNG.

use rand::Rng;

use super::{CellCoord, ItemKind, Material, TerrainGrid};
use crate::game::constants::generation::*;

pub fn generate<R: Rng>(width: usize, height: usize, rng: &mut R) -> TerrainGrid {
    let mut grid = TerrainGrid::new(width, height);

    fill_layers(&mut grid, rng);
    carve_starter_tunnels(&mut grid);
    place_items(&mut grid, rng);

    tracing::debug!(
        width,
        height,
        items = grid.item_count(),
        dirt = grid.count(Material::Dirt),
        rock = grid.count(Material::Rock),
        metal = grid.count(Material::Metal),
        "Terrain generated"
    );

    grid
}

fn fill_layers<R: Rng>(grid: &mut TerrainGrid, rng: &mut R) {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let surface = h as f32 * SURFACE_FRACTION;

    for row in 0..h {
        for col in 0..w {
            if (row as f32) < surface {
                continue;
            }
            let mut sample: f32 = rng.gen();
            if col > 0 && grid.cell(col - 1, row).is_solid() {
                sample += NEIGHBOUR_INFLUENCE;
            }
            if row > 0 && grid.cell(col, row - 1).is_solid() {
                sample += NEIGHBOUR_INFLUENCE;
            }

            let material = if sample > DIRT_THRESHOLD {
                Material::Dirt
            } else if sample > ROCK_THRESHOLD {
                Material::Rock
            } else if sample > CAVITY_THRESHOLD {
                Material::Empty
            } else {
                Material::Metal
            };
            grid.set_cell(col, row, material);
        }
    }

    let ground = surface as i32;
    for col in 0..w {
        grid.set_cell(col, ground, Material::Dirt);
    }
}

fn carve_starter_tunnels(grid: &mut TerrainGrid) {
    let h = grid.height() as f32;

    let (sx, sy) = SPAWN_CLEARING_TILE;
    for dy in -SPAWN_CLEARING_HALF_SIZE..=SPAWN_CLEARING_HALF_SIZE {
        for dx in -SPAWN_CLEARING_HALF_SIZE..=SPAWN_CLEARING_HALF_SIZE {
            grid.set_cell(sx + dx, sy + dy, Material::Empty);
        }
    }

    let tunnel_row = (h * TUNNEL_ROW_FRACTION) as i32;
    let half = TUNNEL_HEIGHT / 2;
    for col in TUNNEL_COLUMNS.0..TUNNEL_COLUMNS.1 {
        for row in tunnel_row - half..=tunnel_row + half {
            grid.set_cell(col, row, Material::Empty);
        }
    }

    let (top, bottom) = ((h * SHAFT_ROWS.0) as i32, (h * SHAFT_ROWS.1) as i32);
    for row in top..bottom {
        for col in SHAFT_COLUMN..SHAFT_COLUMN + SHAFT_WIDTH {
            grid.set_cell(col, row, Material::Empty);
        }
    }
}

fn place_items<R: Rng>(grid: &mut TerrainGrid, rng: &mut R) {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let min_row = (h as f32 * ITEM_MIN_ROW_FRACTION) as i32;
    if w == 0 || min_row >= h {
        return;
    }

    let mut placed: Vec<CellCoord> = Vec::new();
    let (mut gas, mut charges) = (0, 0);

    for _ in 0..ITEM_PLACEMENT_ATTEMPTS {
        if gas >= GAS_CANISTERS && charges >= EXPLOSIVE_CHARGES {
            break;
        }
        let coord = CellCoord::new(rng.gen_range(0..w), rng.gen_range(min_row..h));
        if grid.cell(coord.col, coord.row) != Material::Empty {
            continue;
        }
        let too_close = placed.iter().any(|p| {
            (coord.col - p.col).abs() < ITEM_MIN_SPACING && (coord.row - p.row).abs() < ITEM_MIN_SPACING
        });
        if too_close {
            continue;
        }

        let kind = if gas < GAS_CANISTERS && (charges >= EXPLOSIVE_CHARGES || rng.gen_bool(GAS_CHANCE)) {
            gas += 1;
            ItemKind::GasCanister
        } else {
            charges += 1;
            ItemKind::ExplosiveCharge
        };
        grid.place_item(coord, kind);
        placed.push(coord);
    }
}
