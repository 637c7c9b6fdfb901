//! Axis-aligned bounding boxes
//!
//! Boxes are plain values; a body owns a `Vec<BoundingBox>` in local space
//! and hands out translated copies. The world uses the union of a body's boxes
//! as a broad phase ahead of the exact ring overlap test.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box spanning `min..=max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    /// Build from two opposite corners in any order
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box around a vertical cylinder whose base center is `base`
    pub fn cylinder(base: DVec3, radius: f64, height: f64) -> Self {
        Self::new(
            base - DVec3::new(radius, 0.0, radius),
            base + DVec3::new(radius, height, radius),
        )
    }

    /// Inclusive overlap test
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn expand_to_include(&mut self, other: &BoundingBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn translated(&self, offset: DVec3) -> BoundingBox {
        BoundingBox {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// The eight corners, bottom face first (counter-clockwise seen from +y)
    pub fn corners(&self) -> [DVec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            DVec3::new(lo.x, lo.y, lo.z),
            DVec3::new(hi.x, lo.y, lo.z),
            DVec3::new(hi.x, lo.y, hi.z),
            DVec3::new(lo.x, lo.y, hi.z),
            DVec3::new(lo.x, hi.y, lo.z),
            DVec3::new(hi.x, hi.y, lo.z),
            DVec3::new(hi.x, hi.y, hi.z),
            DVec3::new(lo.x, hi.y, hi.z),
        ]
    }

    /// The twelve edges as corner pairs
    pub fn edges(&self) -> [(DVec3, DVec3); 12] {
        let c = self.corners();
        [
            (c[0], c[1]),
            (c[1], c[2]),
            (c[2], c[3]),
            (c[3], c[0]),
            (c[4], c[5]),
            (c[5], c[6]),
            (c[6], c[7]),
            (c[7], c[4]),
            (c[0], c[4]),
            (c[1], c[5]),
            (c[2], c[6]),
            (c[3], c[7]),
        ]
    }
}

/// Smallest box enclosing all given boxes, if any
pub fn aggregate(boxes: &[BoundingBox]) -> Option<BoundingBox> {
    let (first, rest) = boxes.split_first()?;
    let mut total = *first;
    for b in rest {
        total.expand_to_include(b);
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_corners() {
        let b = BoundingBox::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(-1.0, 0.0, 5.0));
        assert_eq!(b.min, DVec3::new(-1.0, 0.0, 3.0));
        assert_eq!(b.max, DVec3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_intersects_touching_and_apart() {
        let a = BoundingBox::new(DVec3::ZERO, DVec3::ONE);
        let touching = BoundingBox::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(2.0, 1.0, 1.0));
        let apart = BoundingBox::new(DVec3::new(1.5, 0.0, 0.0), DVec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn test_cylinder_box() {
        let b = BoundingBox::cylinder(DVec3::new(0.0, 1.0, 0.0), 0.5, 0.2);
        assert_eq!(b.min, DVec3::new(-0.5, 1.0, -0.5));
        assert_eq!(b.max, DVec3::new(0.5, 1.2, 0.5));
    }

    #[test]
    fn test_aggregate() {
        let boxes = [
            BoundingBox::new(DVec3::ZERO, DVec3::ONE),
            BoundingBox::new(DVec3::splat(-1.0), DVec3::splat(0.5)),
        ];
        let total = aggregate(&boxes).unwrap();
        assert_eq!(total.min, DVec3::splat(-1.0));
        assert_eq!(total.max, DVec3::ONE);
        assert!(aggregate(&[]).is_none());
    }
}
