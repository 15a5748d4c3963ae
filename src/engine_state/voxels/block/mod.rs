//! # Block Module
//!
//! Placed terrain blocks and the frozen collection that holds them.
//!
//! Each block is a unit cube drawn as one instance of a shared cube mesh. Its
//! `instance_index` is its slot in that instance buffer and equals its position in the
//! [`BlockCollection`].

use cgmath::Point3;

use crate::engine_state::geometry::Aabb;

pub mod block_collection;

pub use block_collection::{BlockCollection, BlockCollectionBuilder, ChunkSpan};

/// Edge length of a terrain block in world units.
pub const BLOCK_SIZE: f32 = 1.0;

/// One placed block of the terrain.
///
/// Both fields are fixed at generation time; the world is static.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockInstance {
    /// Centre of the block in world space
    pub world_position: Point3<f32>,
    /// Slot in the shared instanced-geometry buffer
    pub instance_index: u32,
}

impl BlockInstance {
    pub fn new(world_position: Point3<f32>, instance_index: u32) -> Self {
        Self {
            world_position,
            instance_index,
        }
    }

    /// World-space bounds of the block's cube.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.world_position, BLOCK_SIZE)
    }
}
