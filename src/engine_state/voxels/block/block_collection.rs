//! # Block Collection
//!
//! The ordered, append-only store of every [`BlockInstance`] in the world.
//!
//! Terrain generation fills a [`BlockCollectionBuilder`] chunk by chunk and then freezes it.
//! The resulting [`BlockCollection`] exposes no way to add, move, or remove blocks, so the
//! renderer and the picking engine can share it by reference for the rest of the session.
//!
//! Because chunks are generated one after another, every chunk occupies a contiguous range of
//! instance indices. The collection records that range together with the chunk's actual
//! bounds as a [`ChunkSpan`], which lets ray queries skip whole chunks at a time.

use std::ops::Range;

use cgmath::Point3;

use crate::engine_state::geometry::Aabb;

use super::BlockInstance;

/// The contiguous slice of instances belonging to one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkSpan {
    /// Index of the chunk in generation order
    pub chunk_index: u32,
    /// Instance indices covered by the chunk
    pub range: Range<usize>,
    /// Union of the bounds of every block in the chunk
    pub bounds: Aabb,
}

/// Builder that appends blocks in generation order and tracks chunk boundaries.
///
/// Mirrors the chunk construction flow: push every block of a chunk, close the chunk, repeat,
/// then call [`freeze`](Self::freeze).
pub struct BlockCollectionBuilder {
    capacity: usize,
    blocks: Vec<BlockInstance>,
    chunks: Vec<ChunkSpan>,
    /// First instance of the chunk currently being filled
    chunk_start: usize,
    /// Running bounds of the chunk currently being filled
    chunk_bounds: Aabb,
}

impl BlockCollectionBuilder {
    /// Creates a builder for exactly `capacity` blocks.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            blocks: Vec::with_capacity(capacity),
            chunks: Vec::new(),
            chunk_start: 0,
            chunk_bounds: Aabb::empty(),
        }
    }

    /// Appends a block at `world_position`, assigning it the next instance index.
    ///
    /// Returns the assigned index.
    pub fn push_block(&mut self, world_position: Point3<f32>) -> u32 {
        debug_assert!(
            self.blocks.len() < self.capacity,
            "block collection capacity {} exceeded",
            self.capacity
        );

        let instance_index = self.blocks.len() as u32;
        let block = BlockInstance::new(world_position, instance_index);
        self.chunk_bounds.union(&block.bounds());
        self.blocks.push(block);
        instance_index
    }

    /// Closes the chunk that received the blocks pushed since the previous call.
    ///
    /// Returns the instance range the chunk ended up covering.
    pub fn finish_chunk(&mut self, chunk_index: u32) -> Range<usize> {
        let range = self.chunk_start..self.blocks.len();
        self.chunks.push(ChunkSpan {
            chunk_index,
            range: range.clone(),
            bounds: std::mem::replace(&mut self.chunk_bounds, Aabb::empty()),
        });
        self.chunk_start = self.blocks.len();
        range
    }

    /// Finishes construction. Blocks pushed after the last [`finish_chunk`](Self::finish_chunk)
    /// are kept but belong to no chunk span.
    pub fn freeze(self) -> BlockCollection {
        BlockCollection {
            blocks: self.blocks,
            chunks: self.chunks,
        }
    }
}

/// The frozen block store.
#[derive(Clone, Debug)]
pub struct BlockCollection {
    blocks: Vec<BlockInstance>,
    chunks: Vec<ChunkSpan>,
}

impl BlockCollection {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks in instance order.
    pub fn iter(&self) -> std::slice::Iter<'_, BlockInstance> {
        self.blocks.iter()
    }

    /// Per-chunk instance ranges and bounds, in generation order.
    pub fn chunk_spans(&self) -> &[ChunkSpan] {
        &self.chunks
    }

    /// The blocks covered by `span`.
    pub fn blocks_in(&self, span: &ChunkSpan) -> &[BlockInstance] {
        &self.blocks[span.range.clone()]
    }
}

impl<'a> IntoIterator for &'a BlockCollection {
    type Item = &'a BlockInstance;
    type IntoIter = std::slice::Iter<'a, BlockInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_indices_follow_push_order() {
        let mut builder = BlockCollectionBuilder::with_capacity(3);
        assert_eq!(builder.push_block(Point3::new(0.0, 0.0, 0.0)), 0);
        assert_eq!(builder.push_block(Point3::new(1.0, 0.0, 0.0)), 1);
        assert_eq!(builder.finish_chunk(0), 0..2);
        assert_eq!(builder.push_block(Point3::new(5.0, 2.0, 0.0)), 2);
        assert_eq!(builder.finish_chunk(1), 2..3);

        let blocks = builder.freeze();
        assert_eq!(blocks.len(), 3);
        for (slot, block) in blocks.iter().enumerate() {
            assert_eq!(block.instance_index as usize, slot);
        }
        let last = blocks.iter().last().unwrap();
        assert_eq!(last.world_position, Point3::new(5.0, 2.0, 0.0));
    }

    #[test]
    fn chunk_spans_cover_their_blocks() {
        let mut builder = BlockCollectionBuilder::with_capacity(4);
        builder.push_block(Point3::new(0.0, 0.0, 0.0));
        builder.push_block(Point3::new(1.0, 3.0, 0.0));
        builder.finish_chunk(0);
        builder.push_block(Point3::new(10.0, -1.0, 10.0));
        builder.push_block(Point3::new(11.0, 0.0, 10.0));
        builder.finish_chunk(1);
        let blocks = builder.freeze();

        let spans = blocks.chunk_spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].range, 0..2);
        assert_eq!(spans[1].range, 2..4);
        assert_eq!(spans[0].bounds.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(spans[0].bounds.max, Point3::new(1.5, 3.5, 0.5));

        for span in spans {
            for block in blocks.blocks_in(span) {
                let p = block.world_position;
                assert!(span.bounds.min.x < p.x && p.x < span.bounds.max.x);
                assert!(span.bounds.min.y < p.y && p.y < span.bounds.max.y);
                assert!(span.bounds.min.z < p.z && p.z < span.bounds.max.z);
            }
        }
    }
}
