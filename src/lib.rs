//! Vibe Bugs simulation core
//!
//! Destructible tile terrain, worm physics and the per-tick combat loop for a
//! local multiplayer digging game. Rendering, audio and menus live outside this
//! crate and talk to it through [`game::game_loop::Game`].
//!
//! # Features
//!
//! - `parallel_physics` - Integrate worm movement on the rayon pool (enabled by default)

pub mod config;
pub mod util;
pub mod game;
