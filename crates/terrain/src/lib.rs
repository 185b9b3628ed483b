mod biome;
mod carving;
mod interpolator;
mod loot;
mod noise;
mod palette;
mod world;

pub use biome::*;
pub use carving::*;
pub use interpolator::*;
pub use loot::*;
pub use self::noise::*;
pub use palette::*;
pub use world::*;
