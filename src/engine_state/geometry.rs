//! Rays and axis-aligned boxes shared by the terrain and picking code.

use cgmath::{InnerSpace, Point3, Vector3};

/// Direction components smaller than this are treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A half-line starting at `origin` and extending along a normalized `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }
}

/// Entry and exit distances of a ray crossing a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayInterval {
    /// Distance at which the ray enters the box (negative if the origin is inside)
    pub near: f32,
    /// Distance at which the ray leaves the box
    pub far: f32,
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// A cube of edge length `size` centred on `center`.
    pub fn from_center(center: Point3<f32>, size: f32) -> Self {
        let half = Vector3::new(size, size, size) * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The identity for [`Aabb::union`]: contains nothing.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows this box to also enclose `other`.
    pub fn union(&mut self, other: &Aabb) {
        self.min = Point3::new(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.min.z.min(other.min.z),
        );
        self.max = Point3::new(
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
            self.max.z.max(other.max.z),
        );
    }

    /// Slab test. Returns the interval over which the ray is inside the box, or `None`
    /// if the ray misses it or the box lies entirely behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<RayInterval> {
        let mut near = f32::NEG_INFINITY;
        let mut far = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (low, high) = (self.min[axis], self.max[axis]);

            if direction.abs() < PARALLEL_EPSILON {
                if origin < low || origin > high {
                    return None;
                }
                continue;
            }

            let inverse = 1.0 / direction;
            let mut t0 = (low - origin) * inverse;
            let mut t1 = (high - origin) * inverse;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            near = near.max(t0);
            far = far.min(t1);
            if near > far {
                return None;
            }
        }

        if far < 0.0 {
            return None;
        }

        Some(RayInterval { near, far })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::from_center(Point3::new(x, y, z), 1.0)
    }

    #[test]
    fn ray_hits_box_in_front() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = unit_box_at(0.0, 0.0, 0.0).intersect_ray(&ray).unwrap();
        assert!((hit.near - 4.5).abs() < 1e-5);
        assert!((hit.far - 5.5).abs() < 1e-5);
    }

    #[test]
    fn box_behind_origin_is_missed() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(unit_box_at(0.0, 0.0, 0.0).intersect_ray(&ray).is_none());
    }

    #[test]
    fn parallel_ray_outside_slab_is_missed() {
        let ray = Ray::new(Point3::new(0.0, 2.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(unit_box_at(0.0, 0.0, 0.0).intersect_ray(&ray).is_none());
    }

    #[test]
    fn origin_inside_box_reports_negative_entry() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let hit = unit_box_at(0.0, 0.0, 0.0).intersect_ray(&ray).unwrap();
        assert!(hit.near < 0.0);
        assert!((hit.far - 0.5).abs() < 1e-5);
    }

    #[test]
    fn union_encloses_both_boxes() {
        let mut bounds = Aabb::empty();
        assert!(bounds.is_empty());
        bounds.union(&unit_box_at(0.0, 0.0, 0.0));
        bounds.union(&unit_box_at(3.0, -2.0, 1.0));
        assert_eq!(bounds.min, Point3::new(-0.5, -2.5, -0.5));
        assert_eq!(bounds.max, Point3::new(3.5, 0.5, 1.5));
        assert!(!bounds.is_empty());
    }
}
