//! Dig footprints
//!
//! Every tool removes a differently shaped region and can only break the
//! materials it is rated for.

use serde::{Deserialize, Serialize};

use super::{Material, TerrainGrid};
use crate::game::constants::tools::{DRILL_DEPTH, DRILL_WIDTH, TORCH_CONE_ANGLE_DEG};
use crate::game::constants::world::TILE_SIZE;
use crate::util::vec2::Vec2;

/// Footprint and material rating of a dig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigTool {
    /// Rectangular shaft below the trigger point
    Drill,
    /// Disc crater from an explosion
    Blast,
    /// Line sweep along the beam
    Laser,
    /// Widening cone along the aim direction
    Torch,
}

impl DigTool {
    /// Whether this tool can remove a material. Empty is never "dug".
    pub fn can_dig(self, material: Material) -> bool {
        use Material::*;
        match self {
            DigTool::Drill => matches!(material, Dirt | Rock),
            DigTool::Blast => matches!(material, Dirt | Rock | Metal),
            DigTool::Laser => matches!(material, Rock | Metal),
            DigTool::Torch => matches!(material, Dirt | Rock),
        }
    }
}

impl TerrainGrid {
    /// Dig at a world point. `radius` is the tool reach in pixels and
    /// `direction` the aim angle (only the torch uses it). Returns the number
    /// of cells cleared.
    pub fn dig(&mut self, x: f32, y: f32, radius: f32, tool: DigTool, direction: f32) -> usize {
        let c = Self::world_to_cell(x, y);
        let cleared = match tool {
            DigTool::Drill => self.dig_shaft(c.col, c.row, tool),
            DigTool::Torch => self.dig_cone(c.col, c.row, radius, direction, tool),
            DigTool::Blast | DigTool::Laser => {
                let r = ((radius / TILE_SIZE) as i32).max(1);
                self.dig_disc(c.col, c.row, r, tool)
            }
        };
        if cleared > 0 {
            self.mark_dirty();
        }
        cleared
    }

    /// Dig a disc of `radius` pixels at every half tile along `from..to`
    pub fn dig_line(&mut self, from: Vec2, to: Vec2, radius: f32, tool: DigTool) -> usize {
        let span = to - from;
        let length = span.length();
        let step = TILE_SIZE * 0.5;
        let steps = (length / step).ceil().max(1.0) as usize;
        let r = ((radius / TILE_SIZE) as i32).max(1);

        let mut cleared = 0;
        for i in 0..=steps {
            let p = from + span * (i as f32 / steps as f32);
            let c = Self::world_to_cell(p.x, p.y);
            cleared += self.dig_disc(c.col, c.row, r, tool);
        }
        if cleared > 0 {
            self.mark_dirty();
        }
        cleared
    }

    /// `DRILL_WIDTH x DRILL_DEPTH` rectangle centred on `col`, from `row` down
    fn dig_shaft(&mut self, col: i32, row: i32, tool: DigTool) -> usize {
        let width = ((DRILL_WIDTH / TILE_SIZE) as i32).max(1);
        let depth = ((DRILL_DEPTH / TILE_SIZE) as i32).max(1);
        let start = col - width / 2;

        let mut cleared = 0;
        for r in row..row + depth {
            for c in start..start + width {
                cleared += self.clear_cell(c, r, tool) as usize;
            }
        }
        cleared
    }

    /// Cone of discs whose radius grows with distance from the origin
    fn dig_cone(&mut self, col: i32, row: i32, range: f32, direction: f32, tool: DigTool) -> usize {
        let length = (range / TILE_SIZE) as i32;
        let half_angle = (TORCH_CONE_ANGLE_DEG * 0.5).to_radians();
        let (sin, cos) = direction.sin_cos();

        let mut cleared = 0;
        for d in 1..=length {
            let df = d as f32;
            let width = (df * half_angle.tan()) as i32;
            let cx = col + (df * cos) as i32;
            let cy = row + (df * sin) as i32;
            cleared += self.dig_disc(cx, cy, width, tool);
        }
        cleared
    }

    fn dig_disc(&mut self, col: i32, row: i32, radius: i32, tool: DigTool) -> usize {
        let mut cleared = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    cleared += self.clear_cell(col + dx, row + dy, tool) as usize;
                }
            }
        }
        cleared
    }

    fn clear_cell(&mut self, col: i32, row: i32, tool: DigTool) -> bool {
        if !self.in_bounds(col, row) {
            return false;
        }
        let idx = self.index(col, row);
        if tool.can_dig(self.cells[idx]) {
            self.cells[idx] = Material::Empty;
            true
        } else {
            false
        }
    }
}
