pub mod biome;
pub mod climate;
pub mod config;
pub mod error;
pub mod heightmap;
pub mod noise;
pub mod render;
pub mod rivers;
pub mod rng;
pub mod shaper;
pub mod terrain;

pub use biome::{Biome, BiomeRule, BiomeTable};
pub use config::{GenerationParams, PrevailingWind, TerrainMode};
pub use error::ConfigurationError;
pub use heightmap::{Heightmap, generate_heightmap};
pub use rivers::{River, RiverTermination};
pub use terrain::{TerrainGenerator, TerrainResult, Tile, generate};
