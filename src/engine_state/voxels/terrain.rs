//! # Terrain Generator
//!
//! Builds the static world: a finite grid of chunks, each column of which holds a single block
//! lifted to the height of a noise-driven height field.
//!
//! ## Height field
//!
//! For a column at world `(x, z)` the height is
//!
//! ```text
//! y = floor(noise(x / noise_scale, z / noise_scale, jitter) * amplitude)
//! ```
//!
//! where `jitter` is a small random offset along the third noise axis, drawn per column from
//! `[0, config.jitter)`. The offset adds a little variety between runs; with
//! [`TerrainConfig::seed`] set, the jitter stream is seeded and generation becomes fully
//! reproducible.
//!
//! ## Layout
//!
//! `num_chunks` chunks are placed on a `⌊√num_chunks⌋`-wide grid (see [`Chunk`]). A chunk
//! count that is not a perfect square simply overflows into extra rows, giving an incomplete
//! rectangle rather than an error.

use cgmath::Point3;
use log::{debug, info, warn};

use crate::config::TerrainConfig;

use super::{
    block::{BlockCollection, BlockCollectionBuilder},
    chunk::Chunk,
    noise_field::NoiseField,
};

/// Generates the world's [`BlockCollection`] from a [`TerrainConfig`].
pub struct TerrainGenerator {
    config: TerrainConfig,
    noise: NoiseField,
    rng: fastrand::Rng,
}

impl TerrainGenerator {
    /// Creates a generator. The jitter stream is seeded from `config.seed` when present and
    /// from fresh entropy otherwise.
    pub fn new(config: TerrainConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            config,
            noise: NoiseField::default(),
            rng,
        }
    }

    /// Width of the chunk grid in chunks: `⌊√num_chunks⌋`.
    pub fn map_side(&self) -> u32 {
        (self.config.num_chunks as f64).sqrt().floor() as u32
    }

    /// Horizontal shift applied to every column so the map is centred near the origin.
    pub fn center(&self) -> f32 {
        -((self.config.chunk_size * self.map_side()) as f32) / 2.0
    }

    /// Every chunk of the world in generation order.
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> {
        let map_side = self.map_side();
        let size = self.config.chunk_size;
        let center = self.center();
        let count = if map_side == 0 || size == 0 {
            0
        } else {
            self.config.num_chunks
        };
        (0..count).map(move |index| Chunk::new(index, map_side, size, center))
    }

    /// Total number of blocks a generated world contains.
    pub fn block_count(&self) -> usize {
        let side = self.config.chunk_size as usize;
        side * side * self.config.num_chunks as usize
    }

    /// Generates the complete world.
    ///
    /// Blocks are appended in `(chunk, x_idx, z_idx)` row-major order, so chunk `c`
    /// occupies instance indices `c * chunk_size²..(c + 1) * chunk_size²`.
    ///
    /// # Returns
    ///
    /// The block instances for every chunk, with one
    /// [`ChunkSpan`](super::block::ChunkSpan) recorded per chunk
    pub fn generate(&mut self) -> BlockCollection {
        let map_side = self.map_side();
        if map_side * map_side != self.config.num_chunks {
            warn!(
                "{} chunks do not form a square grid; laying them out {} wide",
                self.config.num_chunks, map_side
            );
        }

        let height_bound = self.config.chunk_height as i32;
        let mut out_of_bounds = 0usize;

        let chunks: Vec<Chunk> = self.chunks().collect();
        let mut builder = BlockCollectionBuilder::with_capacity(self.block_count());
        for chunk in chunks {
            for x_idx in 0..chunk.size {
                for z_idx in 0..chunk.size {
                    let cell = chunk.cell_world_position(x_idx, z_idx);
                    let height = self.height_at(cell.x, cell.y);
                    if !(-height_bound..=height_bound).contains(&height) {
                        out_of_bounds += 1;
                    }
                    builder.push_block(Point3::new(cell.x, height as f32, cell.y));
                }
            }
            let range = builder.finish_chunk(chunk.index);
            debug_assert_eq!(range, chunk.instance_range());
            debug!(
                "Generated chunk {} at grid ({}, {})",
                chunk.index, chunk.grid_position.x, chunk.grid_position.y
            );
        }

        if out_of_bounds > 0 {
            warn!(
                "{out_of_bounds} columns exceed the nominal chunk height of {}",
                self.config.chunk_height
            );
        }

        let blocks = builder.freeze();
        info!(
            "Generated {} blocks in {} chunks",
            blocks.len(),
            blocks.chunk_spans().len()
        );
        blocks
    }

    /// Samples the height field for the column at world `(x, z)`.
    ///
    /// Each call consumes one value from the jitter stream.
    fn height_at(&mut self, x: f32, z: f32) -> i32 {
        let jitter = self.rng.f64() * self.config.jitter;
        let sample = self.noise.sample(
            x as f64 / self.config.noise_scale,
            z as f64 / self.config.noise_scale,
            jitter,
        );
        (sample * self.config.amplitude).floor() as i32
    }
}
