pub mod physics;
pub mod tools;
pub mod dynamite;
pub mod explosion;
pub mod combat;
pub mod lifecycle;
pub mod loot;
