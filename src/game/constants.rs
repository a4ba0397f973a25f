/// World geometry - terrain is a grid of square tiles under a fixed UI strip
pub mod world {
    /// Side length of one terrain tile in pixels
    pub const TILE_SIZE: f32 = 8.0;
    /// Height of the UI strip at the top of the screen; terrain row 0 starts here
    pub const UI_HEIGHT: f32 = 129.0;
    /// Default terrain width in tiles (1920 px)
    pub const MAP_WIDTH: usize = 240;
    /// Default terrain height in tiles ((1080 - 129) / 8)
    pub const MAP_HEIGHT: usize = 118;
    /// Simulation rate of the reference frontend
    pub const TICK_RATE: u32 = 60;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 60.0;
    /// Slack for countdown timers reaching zero. Covers the f32 drift from
    /// summing a few seconds of ticks, well under one tick at any rate.
    pub const TIMER_EPSILON: f32 = 2e-5;
}

/// Worm body
pub mod worm {
    /// Head radius in pixels
    pub const RADIUS: f32 = 12.0;
    /// Horizontal walking speed (px/s)
    pub const SPEED: f32 = 100.0;
    /// Maximum health
    pub const MAX_HEALTH: i32 = 100;
    /// Number of body segments including the head
    pub const SEGMENT_COUNT: usize = 5;
    /// Trail segments shift this often (seconds)
    pub const SEGMENT_UPDATE_INTERVAL: f32 = 0.1;
    /// Each trailing segment is this much smaller than the one before it
    pub const SEGMENT_RADIUS_STEP: f32 = 2.0;
    /// Segments at or below this radius take no part in collision
    pub const MIN_COLLISION_RADIUS: f32 = 2.0;
    /// Sample points on each collision circle
    pub const COLLISION_SAMPLES: usize = 8;
}

/// Movement physics
pub mod physics {
    /// Downward acceleration (px/s^2)
    pub const GRAVITY: f32 = 400.0;
    /// Jump impulse (negative is up)
    pub const JUMP_VELOCITY: f32 = -250.0;
    /// Maximum fall speed
    pub const TERMINAL_VELOCITY: f32 = 300.0;
    /// Move axis values at or below this count as no input
    pub const MOVE_DEADZONE: f32 = 0.05;
    /// Horizontal velocity multiplier per tick on the ground without input
    pub const GROUND_FRICTION: f32 = 0.8;
    /// Horizontal velocity multiplier per tick in the air without input
    pub const AIR_RESISTANCE: f32 = 0.95;
    /// Steepest slope a worm can walk up (degrees)
    pub const MAX_SLOPE_ANGLE_DEG: f32 = 45.0;
    /// Climb probes rise in steps of this many pixels, up to the worm radius
    pub const CLIMB_STEP: f32 = 4.0;
    /// Largest position change allowed on either axis in one tick
    pub const MAX_POSITION_CHANGE: f32 = 200.0;
    /// Slope arc is sampled from this angle...
    pub const SLOPE_ARC_START_DEG: f32 = 45.0;
    /// ...to this angle (90 is straight down)
    pub const SLOPE_ARC_END_DEG: f32 = 135.0;
    /// Slope arc sample spacing
    pub const SLOPE_ARC_STEP_DEG: f32 = 15.0;
    /// Extra reach of the ground and slope probes beyond the radius
    pub const GROUND_PROBE_MARGIN: f32 = 3.0;
    /// Worms falling out of the bottom re-enter this far below the UI strip
    pub const WRAP_ENTRY_OFFSET: f32 = 50.0;
    /// Downward speed given to a worm after wrapping
    pub const WRAP_ENTRY_VELOCITY: f32 = 50.0;
    /// Worms launched above this y are pushed back into the world
    pub const CEILING_ESCAPE_Y: f32 = -50.0;
}

/// Fall damage
pub mod fall {
    /// Falls shorter than this deal no damage (px)
    pub const DAMAGE_START_HEIGHT: f32 = 50.0;
    /// Damage per pixel fallen beyond the start height
    pub const DAMAGE_MULTIPLIER: f32 = 0.5;
    /// Landing speed must exceed this for fall damage to apply (px/s)
    pub const VELOCITY_THRESHOLD: f32 = 200.0;
}

/// Tool shapes and damage
pub mod tools {
    /// Drill shaft width (px)
    pub const DRILL_WIDTH: f32 = 36.0;
    /// Drill shaft depth (px)
    pub const DRILL_DEPTH: f32 = 40.0;
    /// Damage dealt by a drill hit
    pub const DRILL_DAMAGE: i32 = 10;

    /// Torch reach (px)
    pub const TORCH_RANGE: f32 = 80.0;
    /// Radius used when sweeping the torch cone for items (px)
    pub const TORCH_RADIUS: f32 = 30.0;
    /// Full opening angle of the torch cone (degrees)
    pub const TORCH_CONE_ANGLE_DEG: f32 = 60.0;
    /// Gas burnt per torch use
    pub const TORCH_GAS_COST: u32 = 10;
    /// Damage dealt by a torch hit
    pub const TORCH_DAMAGE: i32 = 30;

    /// Beam width (px)
    pub const LASER_WIDTH: f32 = 16.0;
    /// Beam length (px)
    pub const LASER_RANGE: f32 = 400.0;
    /// Damage dealt by a laser hit
    pub const LASER_DAMAGE: i32 = 50;

    /// Distance of the aim target for tools other than the laser
    pub const DEFAULT_TARGET_DISTANCE: f32 = 100.0;
    /// Throws aimed further than this are dropped
    pub const MAX_THROW_DISTANCE: f32 = 200.0;
}

/// Laser battery
pub mod battery {
    /// Full charge
    pub const MAX_CHARGE: f32 = 100.0;
    /// Charge used per shot; also the minimum needed to fire
    pub const SHOT_COST: f32 = 10.0;
    /// Slack when comparing recharged charge against the shot cost
    pub const CHARGE_TOLERANCE: f32 = 1e-3;
    /// Recharge per second while not cooling down
    pub const RECHARGE_RATE: f32 = 10.0;
    /// Shots closer together than this count as rapid fire (seconds)
    pub const RAPID_FIRE_WINDOW: f32 = 2.0;
    /// Rapid shots in a row before the battery overheats
    pub const RAPID_FIRE_LIMIT: u32 = 10;
    /// No recharge for this long after overheating (seconds)
    pub const COOLDOWN: f32 = 5.0;
}

/// Thrown dynamite
pub mod dynamite {
    /// Crater and damage radius (px)
    pub const BLAST_RADIUS: f32 = 96.0;
    /// Damage at the centre of the blast
    pub const BASE_DAMAGE: i32 = 70;
    /// Damage floor anywhere inside the blast radius
    pub const MIN_DAMAGE: i32 = 10;
    /// Seconds from throw to detonation
    pub const FUSE_TIME: f32 = 2.0;
    /// Charges each worm starts with
    pub const STARTING_COUNT: u32 = 10;
    /// Throw speed at zero power (scaled by 0.5 + power * 1.5)
    pub const BASE_THROW_SPEED: f32 = 200.0;
    /// Upward component added to every throw (px/s)
    pub const UPWARD_BIAS: f32 = 50.0;
    /// Throw power gained per second of holding the trigger
    pub const POWER_CHARGE_RATE: f32 = 100.0;
    /// Throw power cap
    pub const MAX_POWER: f32 = 100.0;
}

/// Explosion effect
pub mod explosion {
    /// Seconds an explosion stays visible after detonating
    pub const DURATION: f32 = 1.0;
}

/// Gas and pickups
pub mod resources {
    /// Gas each worm starts with
    pub const STARTING_GAS: u32 = 100;
    /// Gas cap
    pub const MAX_GAS: u32 = 200;
    /// Gas in one canister
    pub const GAS_CANISTER_AMOUNT: u32 = 50;
    /// Charges in one explosive pickup
    pub const EXPLOSIVE_PICKUP_AMOUNT: u32 = 1;
    /// Items within this distance of a worm are collected (radius + 5)
    pub const PICKUP_RADIUS: f32 = super::worm::RADIUS + 5.0;
}

/// Aim control
pub mod aim {
    /// Rotation speed of the aim target at full input strength (rad/s)
    pub const ROTATION_SPEED: f32 = 3.0;
    /// The drawn aim follows its target at this rate (rad/s)
    pub const INTERPOLATION_SPEED: f32 = 3.0;
    /// Input reaches full strength after being held this long (seconds)
    pub const FULL_STRENGTH_HOLD: f32 = 1.0;
    /// Axis values at or below this are treated as released
    pub const INPUT_DEADZONE: f32 = 0.05;
}

/// Death, respawn and safe spawning
pub mod spawn {
    /// Seconds spent respawning after death
    pub const RESPAWN_TIME: f32 = 3.0;
    /// Seconds of damage immunity after respawning
    pub const PROTECTION_TIME: f32 = 3.0;
    /// Safe spawn points must be at least this far from other living worms
    pub const MIN_DISTANCE_FROM_OTHERS: f32 = 150.0;
    /// Random samples tried before using the fallback point
    pub const MAX_ATTEMPTS: usize = 50;
    /// Fallback spawn x
    pub const FALLBACK_X: f32 = 100.0;
    /// Fallback spawn offset below the UI strip
    pub const FALLBACK_OFFSET_Y: f32 = 50.0;
    /// Top of the spawn band, below the UI strip
    pub const BAND_TOP_OFFSET: f32 = 50.0;
    /// Bottom of the spawn band as a fraction of terrain height
    pub const BAND_BOTTOM_FRACTION: f32 = 0.3;
    /// First level spawn x
    pub const START_X: f32 = 100.0;
    /// Horizontal spacing between level spawn points
    pub const START_SPACING: f32 = 300.0;
}

/// Loot dropped on death
pub mod tombstone {
    /// Percentage of gas and charges left behind on death (rounded up)
    pub const RESOURCE_PERCENT: u32 = 20;
    /// Worms within this distance loot the tombstone
    pub const INTERACTION_RADIUS: f32 = super::worm::RADIUS + 10.0;
}

/// Level goal
pub mod goal {
    /// Goal sits this far in from the right and bottom edges
    pub const EDGE_INSET: f32 = 100.0;
    /// Reaching within this distance completes the level
    pub const REACH_RADIUS: f32 = 50.0;
}

/// Level generation
pub mod generation {
    /// Rows above this fraction of the height are open sky
    pub const SURFACE_FRACTION: f32 = 0.35;
    /// Added to the noise sample per solid left/up neighbour
    pub const NEIGHBOUR_INFLUENCE: f32 = 0.2;
    /// Noise above this becomes dirt
    pub const DIRT_THRESHOLD: f32 = 0.7;
    /// Noise above this becomes rock
    pub const ROCK_THRESHOLD: f32 = 0.4;
    /// Noise above this becomes a cavity; anything lower is metal
    pub const CAVITY_THRESHOLD: f32 = 0.1;
    /// Centre tile and half-size of the cleared square spawn pocket
    pub const SPAWN_CLEARING_TILE: (i32, i32) = (12, 12);
    pub const SPAWN_CLEARING_HALF_SIZE: i32 = 5;
    /// Horizontal starter tunnel (row as a fraction of height, column span, rows tall)
    pub const TUNNEL_ROW_FRACTION: f32 = 0.5;
    pub const TUNNEL_COLUMNS: (i32, i32) = (20, 80);
    pub const TUNNEL_HEIGHT: i32 = 3;
    /// Vertical starter shaft (column, width, row span as fractions of height)
    pub const SHAFT_COLUMN: i32 = 25;
    pub const SHAFT_WIDTH: i32 = 2;
    pub const SHAFT_ROWS: (f32, f32) = (0.35, 0.7);
    /// Items are placed at or below this fraction of the height
    pub const ITEM_MIN_ROW_FRACTION: f32 = 0.4;
    pub const GAS_CANISTERS: usize = 12;
    pub const EXPLOSIVE_CHARGES: usize = 8;
    /// Items closer than this on both axes are rejected (tiles)
    pub const ITEM_MIN_SPACING: i32 = 10;
    /// Chance that a placed item is a gas canister
    pub const GAS_CHANCE: f64 = 0.6;
    pub const ITEM_PLACEMENT_ATTEMPTS: usize = 2000;
}
