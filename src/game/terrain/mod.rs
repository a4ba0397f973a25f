//! Destructible terrain
//!
//! A dense grid of [`Material`] cells plus a sparse map of collectible items.
//! World pixel coordinates map onto the grid after subtracting the UI strip
//! height, so row 0 starts at `y = UI_HEIGHT`.

#![allow(dead_code)]

pub mod dig;
pub mod generation;

use hashbrown::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::constants::world::{TILE_SIZE, UI_HEIGHT};
use crate::util::vec2::Vec2;

pub use dig::DigTool;

/// Material of a single terrain cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    #[default]
    Empty,
    Dirt,
    Rock,
    Metal,
}

impl Material {
    #[inline]
    pub fn is_solid(self) -> bool {
        self != Material::Empty
    }
}

/// Collectible lying in an empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    GasCanister,
    ExplosiveCharge,
}

/// Grid coordinate (column, row); may lie outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub col: i32,
    pub row: i32,
}

impl CellCoord {
    #[inline]
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Destructible tile grid with item placements
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    cells: Vec<Material>,
    items: HashMap<CellCoord, ItemKind>,
    dirty: bool,
}

impl TerrainGrid {
    /// Empty grid
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Material::Empty)
    }

    /// Grid with every cell set to `material`
    pub fn filled(width: usize, height: usize, material: Material) -> Self {
        Self {
            width,
            height,
            cells: vec![material; width * height],
            items: HashMap::new(),
            dirty: true,
        }
    }

    /// Procedurally generated level
    pub fn generate<R: Rng>(width: usize, height: usize, rng: &mut R) -> Self {
        generation::generate(width, height, rng)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// World width in pixels
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    /// World height of the grid in pixels (excluding the UI strip)
    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    /// Screen y of the bottom edge of the grid
    pub fn bottom_y(&self) -> f32 {
        UI_HEIGHT + self.pixel_height()
    }

    #[inline]
    fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    #[inline]
    fn index(&self, col: i32, row: i32) -> usize {
        row as usize * self.width + col as usize
    }

    /// Material at a cell. Rows at or below the grid are open (worms fall
    /// through); every other out-of-grid cell is indestructible metal.
    pub fn cell(&self, col: i32, row: i32) -> Material {
        if self.in_bounds(col, row) {
            return self.cells[self.index(col, row)];
        }
        if row >= self.height as i32 {
            Material::Empty
        } else {
            Material::Metal
        }
    }

    /// Overwrite a cell. Out-of-grid writes are ignored.
    pub fn set_cell(&mut self, col: i32, row: i32, material: Material) {
        if self.in_bounds(col, row) {
            let idx = self.index(col, row);
            if self.cells[idx] != material {
                self.cells[idx] = material;
                self.dirty = true;
            }
        }
    }

    /// Cell containing a world pixel
    #[inline]
    pub fn world_to_cell(x: f32, y: f32) -> CellCoord {
        CellCoord {
            col: (x / TILE_SIZE).floor() as i32,
            row: ((y - UI_HEIGHT) / TILE_SIZE).floor() as i32,
        }
    }

    /// World pixel at the centre of a cell
    pub fn cell_center(coord: CellCoord) -> Vec2 {
        Vec2::new(
            (coord.col as f32 + 0.5) * TILE_SIZE,
            UI_HEIGHT + (coord.row as f32 + 0.5) * TILE_SIZE,
        )
    }

    /// Material under a world pixel
    pub fn get_tile(&self, x: f32, y: f32) -> Material {
        let c = Self::world_to_cell(x, y);
        self.cell(c.col, c.row)
    }

    #[inline]
    pub fn is_solid(&self, x: f32, y: f32) -> bool {
        self.get_tile(x, y).is_solid()
    }

    #[inline]
    pub fn is_solid_at(&self, p: Vec2) -> bool {
        self.is_solid(p.x, p.y)
    }

    /// Number of cells of a material
    pub fn count(&self, material: Material) -> usize {
        self.cells.iter().filter(|&&m| m == material).count()
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Place an item in an in-grid cell, replacing any existing one
    pub fn place_item(&mut self, coord: CellCoord, kind: ItemKind) -> bool {
        if !self.in_bounds(coord.col, coord.row) {
            return false;
        }
        self.items.insert(coord, kind);
        self.dirty = true;
        true
    }

    pub fn item_at(&self, coord: CellCoord) -> Option<ItemKind> {
        self.items.get(&coord).copied()
    }

    pub fn items(&self) -> impl Iterator<Item = (CellCoord, ItemKind)> + '_ {
        self.items.iter().map(|(c, k)| (*c, *k))
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Remove and return every item within a disc of cells around a world
    /// point. The cell radius is `max(1, radius / TILE_SIZE)`.
    pub fn check_for_items(&mut self, x: f32, y: f32, radius: f32) -> Vec<(CellCoord, ItemKind)> {
        let center = Self::world_to_cell(x, y);
        let r = ((radius / TILE_SIZE) as i32).max(1);
        let mut found = Vec::new();

        if self.items.is_empty() {
            return found;
        }

        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                let coord = CellCoord::new(center.col + dx, center.row + dy);
                if let Some(kind) = self.items.remove(&coord) {
                    found.push((coord, kind));
                }
            }
        }

        if !found.is_empty() {
            self.dirty = true;
        }
        found
    }

    // ========================================================================
    // Render cache
    // ========================================================================

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
