//! # Voxel Terrain
//!
//! Everything that describes the static block world:
//!
//! * **NoiseField**: the deterministic height-field sampler
//! * **Chunk**: a window of columns on the chunk grid
//! * **Block**: placed block instances and the frozen [`BlockCollection`](block::BlockCollection)
//! * **TerrainGenerator**: turns a [`TerrainConfig`](crate::config::TerrainConfig) into blocks
//!
//! The world is generated once at start-up and never changes afterwards.

pub mod block;
pub mod chunk;
pub mod noise_field;
pub mod terrain;
