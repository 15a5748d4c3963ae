//! # Block Picking
//!
//! Finds the block under the centre of the screen and keeps the translucent highlight cube
//! that marks it.
//!
//! Every frame the active camera casts a ray through NDC `(0, 0)`, which for a symmetric
//! perspective projection is the camera's forward vector. The nearest block whose cube the ray
//! *enters* in front of the camera wins; a block the camera is standing inside does not count.
//!
//! ## Broad phase
//! The [`BlockCollection`] stores each chunk as a contiguous instance range with its bounds.
//! Chunks the ray misses are skipped wholesale, and the rest are visited nearest-first so the
//! search can stop once a chunk starts beyond the best hit found so far. Ties on distance are
//! broken by instance index, which keeps the result identical to testing every block in order.

use cgmath::Point3;
use log::trace;

use super::{
    camera_state::camera::Camera,
    geometry::Ray,
    voxels::block::{BlockCollection, BlockInstance, ChunkSpan},
};

/// Edge length of the highlight cube, just over one block so it never z-fights the faces.
pub const HIGHLIGHT_SIZE: f32 = 1.001;
/// Opacity the renderer draws the highlight with.
pub const HIGHLIGHT_OPACITY: f32 = 0.25;

/// The block a ray selected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    /// The selected block
    pub block: BlockInstance,
    /// Distance from the ray origin to where it enters the block
    pub distance: f32,
}

/// The translucent cube drawn around the selected block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    pub position: Point3<f32>,
    pub size: f32,
    pub opacity: f32,
}

impl Highlight {
    fn around(block: &BlockInstance) -> Self {
        Self {
            position: block.world_position,
            size: HIGHLIGHT_SIZE,
            opacity: HIGHLIGHT_OPACITY,
        }
    }
}

/// Outcome of one frame's pick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PickResult {
    pub hit: Option<PickHit>,
    pub highlight: Option<Highlight>,
}

impl PickResult {
    /// Instance index of the picked block, if the ray hit one.
    pub fn selected(&self) -> Option<u32> {
        self.hit.map(|hit| hit.block.instance_index)
    }
}

/// Holds the single highlight of the viewer and recomputes it on demand.
#[derive(Debug, Default)]
pub struct PickingEngine {
    current: PickResult,
}

impl PickingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Casts the centre-screen ray of `camera` against `blocks`.
    ///
    /// The previous highlight is always discarded first; after a miss none remains.
    ///
    /// # Arguments
    ///
    /// * `blocks` - Every block instance in the world, with its per-chunk bounds
    /// * `camera` - The camera whose forward vector defines the ray
    ///
    /// # Returns
    ///
    /// The nearest hit, or [`PickResult::default`] when the ray meets nothing
    pub fn pick(&mut self, blocks: &BlockCollection, camera: &Camera) -> PickResult {
        self.current = PickResult::default();

        let ray = Ray::new(camera.position, camera.forward());
        if let Some(hit) = cast(blocks, &ray) {
            trace!(
                "Picked block {} at distance {:.2}",
                hit.block.instance_index,
                hit.distance
            );
            self.current = PickResult {
                hit: Some(hit),
                highlight: Some(Highlight::around(&hit.block)),
            };
        }

        self.current
    }

    /// The highlight left by the most recent [`PickingEngine::pick`], if it hit.
    pub fn highlight(&self) -> Option<&Highlight> {
        self.current.highlight.as_ref()
    }
}

/// Nearest block whose cube `ray` enters at a positive distance.
pub fn cast(blocks: &BlockCollection, ray: &Ray) -> Option<PickHit> {
    let mut candidates: Vec<(f32, &ChunkSpan)> = blocks
        .chunk_spans()
        .iter()
        .filter(|span| !span.bounds.is_empty())
        .filter_map(|span| {
            span.bounds
                .intersect_ray(ray)
                .map(|interval| (interval.near.max(0.0), span))
        })
        .collect();
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut best: Option<PickHit> = None;
    for (entry, span) in candidates {
        if best.is_some_and(|hit| entry > hit.distance) {
            break;
        }
        for block in blocks.blocks_in(span) {
            let Some(interval) = block.bounds().intersect_ray(ray) else {
                continue;
            };
            if interval.near <= 0.0 {
                continue;
            }
            let closer = match best {
                None => true,
                Some(hit) => {
                    interval.near < hit.distance
                        || (interval.near == hit.distance
                            && block.instance_index < hit.block.instance_index)
                }
            };
            if closer {
                best = Some(PickHit {
                    block: *block,
                    distance: interval.near,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, InnerSpace, Vector3};

    use super::*;
    use crate::{
        config::TerrainConfig,
        engine_state::voxels::{block::BlockCollectionBuilder, terrain::TerrainGenerator},
    };

    fn single_block_at_origin() -> BlockCollection {
        let mut builder = BlockCollectionBuilder::with_capacity(1);
        builder.push_block(Point3::new(0.0, 0.0, 0.0));
        builder.finish_chunk(0);
        builder.freeze()
    }

    fn linear_scan(blocks: &BlockCollection, ray: &Ray) -> Option<PickHit> {
        let mut best: Option<PickHit> = None;
        for block in blocks {
            if let Some(interval) = block.bounds().intersect_ray(ray) {
                if interval.near > 0.0 && best.map_or(true, |hit| interval.near < hit.distance) {
                    best = Some(PickHit {
                        block: *block,
                        distance: interval.near,
                    });
                }
            }
        }
        best
    }

    #[test]
    fn forward_ray_hits_block_in_front() {
        let blocks = single_block_at_origin();
        let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Deg(-90.0), Deg(0.0));
        let mut engine = PickingEngine::new();

        let result = engine.pick(&blocks, &camera);
        let hit = result.hit.expect("block straight ahead");
        assert_eq!(hit.block.instance_index, 0);
        assert_eq!(result.selected(), Some(0));
        assert!((hit.distance - 4.5).abs() < 1e-4);

        let highlight = engine.highlight().expect("highlight after hit");
        assert_eq!(highlight.position, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(highlight.size, HIGHLIGHT_SIZE);
    }

    #[test]
    fn miss_clears_previous_highlight() {
        let blocks = single_block_at_origin();
        let mut engine = PickingEngine::new();

        let looking_at = Camera::new(Point3::new(0.0, 0.0, 5.0), Deg(-90.0), Deg(0.0));
        engine.pick(&blocks, &looking_at);
        assert!(engine.highlight().is_some());

        let looking_away = Camera::new(Point3::new(0.0, 0.0, 5.0), Deg(90.0), Deg(0.0));
        let result = engine.pick(&blocks, &looking_away);
        assert_eq!(result, PickResult::default());
        assert_eq!(result.selected(), None);
        assert!(engine.highlight().is_none());
    }

    #[test]
    fn camera_inside_block_does_not_select_it() {
        let blocks = single_block_at_origin();
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0));
        let mut engine = PickingEngine::new();
        assert!(engine.pick(&blocks, &camera).hit.is_none());
    }

    #[test]
    fn nearest_of_a_row_wins() {
        let mut builder = BlockCollectionBuilder::with_capacity(3);
        builder.push_block(Point3::new(0.0, 0.0, -6.0));
        builder.finish_chunk(0);
        builder.push_block(Point3::new(0.0, 0.0, -2.0));
        builder.push_block(Point3::new(0.0, 0.0, -4.0));
        builder.finish_chunk(1);
        let blocks = builder.freeze();

        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = cast(&blocks, &ray).expect("row ahead");
        assert_eq!(hit.block.instance_index, 1);
        assert!((hit.distance - 1.5).abs() < 1e-5);
    }

    #[test]
    fn broad_phase_matches_linear_scan_on_generated_terrain() {
        let mut generator = TerrainGenerator::new(TerrainConfig {
            chunk_size: 4,
            num_chunks: 9,
            seed: Some(3),
            ..TerrainConfig::default()
        });
        let blocks = generator.generate();

        let origins = [
            Point3::new(0.0, 20.0, 0.0),
            Point3::new(-10.0, 5.0, 10.0),
            Point3::new(3.3, 0.2, -1.7),
        ];
        let directions = [
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.3, -0.8, -0.2),
            Vector3::new(1.0, -0.1, -1.0),
            Vector3::new(-0.2, 0.05, 0.7),
        ];
        for origin in origins {
            for direction in directions {
                let ray = Ray::new(origin, direction.normalize());
                let broad = cast(&blocks, &ray);
                let linear = linear_scan(&blocks, &ray);
                assert_eq!(
                    broad.map(|hit| hit.block.instance_index),
                    linear.map(|hit| hit.block.instance_index),
                    "origin {origin:?} direction {direction:?}"
                );
            }
        }
    }
}
