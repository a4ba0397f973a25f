//! Per-tick player intents
//!
//! The frontend translates keys, gamepads or AI decisions into one
//! [`WormIntent`] per player slot. The core never sees device codes.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Edge-aware state of the fire button for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerState {
    #[default]
    Idle,
    /// Went down this tick
    Pressed,
    /// Still down
    Held,
    /// Went up this tick
    Released,
}

impl TriggerState {
    /// Derive the state from the button level this tick and last tick
    pub fn from_levels(was_down: bool, is_down: bool) -> Self {
        match (was_down, is_down) {
            (false, true) => TriggerState::Pressed,
            (true, true) => TriggerState::Held,
            (true, false) => TriggerState::Released,
            (false, false) => TriggerState::Idle,
        }
    }
}

/// Tool selection request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolCycle {
    #[default]
    None,
    Next,
    Previous,
}

/// Everything one player wants to do this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WormIntent {
    /// -1 (left) .. 1 (right)
    pub move_axis: f32,
    /// -1 (aim up) .. 1 (aim down), relative to a right-facing worm
    pub aim_axis: f32,
    pub tool_cycle: ToolCycle,
    pub trigger: TriggerState,
    pub jump: bool,
    /// World point a dynamite throw is aimed at, such as a mouse cursor.
    /// Without one the throw goes along the aim.
    pub throw_target: Option<Vec2>,
}

impl WormIntent {
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Intents for all player slots for a single tick. Slots with no entry are idle.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    by_slot: HashMap<u8, WormIntent>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: u8, intent: WormIntent) {
        self.by_slot.insert(slot, intent);
    }

    pub fn with(mut self, slot: u8, intent: WormIntent) -> Self {
        self.set(slot, intent);
        self
    }

    pub fn intent(&self, slot: u8) -> WormIntent {
        self.by_slot.get(&slot).copied().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.by_slot.clear();
    }
}
