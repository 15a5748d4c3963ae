//! # Chunk Module
//!
//! A chunk is a `chunk_size x chunk_size` square of terrain columns, the unit of terrain
//! generation. Chunks own no block storage: a [`Chunk`] is only a window that tells the
//! generator where its cells sit in the world and which slice of the shared instance buffer
//! they fill.
//!
//! Chunks are laid out on a `map_side x map_side` grid in row-major order: chunk `c` sits in
//! grid column `c % map_side` (x) and row `c / map_side` (z). The whole grid is shifted by
//! `center` on both horizontal axes so the map is centred near the origin.

use std::ops::Range;

use cgmath::Vector2;

/// A computation window over the shared block buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chunk {
    /// Position of the chunk in generation order
    pub index: u32,
    /// Grid coordinates `(cx, cz)`
    pub grid_position: Vector2<u32>,
    /// World x/z of the chunk's first cell (local `(0, 0)`)
    pub origin: Vector2<f32>,
    /// Blocks per chunk side
    pub size: u32,
}

impl Chunk {
    /// Places chunk `index` on a grid `map_side` chunks wide.
    ///
    /// `map_side` must be non-zero.
    pub fn new(index: u32, map_side: u32, size: u32, center: f32) -> Self {
        let grid_position = Vector2::new(index % map_side, index / map_side);
        let origin = Vector2::new(
            (grid_position.x * size) as f32 + center,
            (grid_position.y * size) as f32 + center,
        );
        Self {
            index,
            grid_position,
            origin,
            size,
        }
    }

    /// Number of blocks the chunk contributes (one per column).
    pub fn block_count(&self) -> usize {
        (self.size * self.size) as usize
    }

    /// Slice of the shared instance buffer this chunk fills.
    pub fn instance_range(&self) -> Range<usize> {
        let start = self.index as usize * self.block_count();
        start..start + self.block_count()
    }

    /// World x/z of local cell `(x_idx, z_idx)`.
    pub fn cell_world_position(&self, x_idx: u32, z_idx: u32) -> Vector2<f32> {
        Vector2::new(self.origin.x + x_idx as f32, self.origin.y + z_idx as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_laid_out_row_major() {
        let map_side = 3;
        let chunk = Chunk::new(5, map_side, 4, -6.0);
        assert_eq!(chunk.grid_position, Vector2::new(2, 1));
        assert_eq!(chunk.origin, Vector2::new(2.0, -2.0));
        assert_eq!(chunk.instance_range(), 80..96);
    }

    #[test]
    fn cells_are_offset_from_origin() {
        let chunk = Chunk::new(0, 2, 2, -2.0);
        assert_eq!(chunk.cell_world_position(0, 0), Vector2::new(-2.0, -2.0));
        assert_eq!(chunk.cell_world_position(1, 1), Vector2::new(-1.0, -1.0));
    }
}
