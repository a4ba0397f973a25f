pub mod aim;
pub mod constants;
pub mod input;
pub mod state;
pub mod terrain;
pub mod systems;
pub mod game_loop;
pub mod match_result;
pub mod snapshot;
