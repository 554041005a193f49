//! Axis-aligned bounding volumes

use crate::foundation::math::{Mat4, Vec3};

/// Axis-aligned bounding box.
///
/// Defaults to a unit cube centered at the origin. `min` is expected to stay
/// component-wise below `max`; the struct does not enforce it.
#[derive(Debug, Clone, PartialEq)]
pub struct AABB {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self {
            min: Vec3::new(-0.5, -0.5, -0.5),
            max: Vec3::new(0.5, 0.5, 0.5),
        }
    }
}

impl AABB {
    /// Create a bounding box from explicit corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from a center point and half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Center point of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-extents of the box
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Test whether a point lies strictly inside the box.
    ///
    /// Points exactly on a face are outside.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x > self.min.x
            && point.x < self.max.x
            && point.y > self.min.y
            && point.y < self.max.y
            && point.z > self.min.z
            && point.z < self.max.z
    }

    /// Test whether this box strictly overlaps another.
    ///
    /// Boxes that only touch at a face, edge or corner do not intersect.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Shift both corners by a translation
    pub fn translate(&mut self, translation: Vec3) {
        self.min += translation;
        self.max += translation;
    }

    /// Recompute the box under an affine transform.
    ///
    /// Projects both corners through each basis vector and takes the
    /// per-axis minimum and maximum of the products, then adds the
    /// translation. Handles rotation, non-uniform scale and translation.
    pub fn transform_by(&mut self, matrix: &Mat4) {
        let old_min = self.min;
        let old_max = self.max;

        for axis in 0..3 {
            let translation = matrix[(axis, 3)];
            let mut new_min = translation;
            let mut new_max = translation;

            for component in 0..3 {
                let a = matrix[(axis, component)] * old_min[component];
                let b = matrix[(axis, component)] * old_max[component];
                new_min += a.min(b);
                new_max += a.max(b);
            }

            self.min[axis] = new_min;
            self.max[axis] = new_max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use crate::foundation::math::Mat4Ext;
    use approx::assert_relative_eq;

    #[test]
    fn default_is_unit_cube_at_origin() {
        let aabb = AABB::default();
        assert_relative_eq!(aabb.min, Vec3::new(-0.5, -0.5, -0.5));
        assert_relative_eq!(aabb.max, Vec3::new(0.5, 0.5, 0.5));
        assert_relative_eq!(aabb.center(), Vec3::zeros());
    }

    #[test]
    fn containment_excludes_boundary() {
        let aabb = AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(aabb.contains_point(Vec3::new(0.0, 0.0, 0.0)));
        assert!(!aabb.contains_point(Vec3::new(1.0, 1.0, 1.0)));
        assert!(!aabb.contains_point(Vec3::new(0.0, -1.0, 0.0)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let corner = AABB::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0));
        let face = AABB::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(!a.intersects(&corner));
        assert!(!corner.intersects(&a));
        assert!(!a.intersects(&face));
    }

    #[test]
    fn overlapping_boxes_intersect() {
        let a = AABB::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let b = AABB::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 3.0, 3.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn translate_shifts_both_corners() {
        let mut aabb = AABB::default();
        aabb.translate(Vec3::new(2.0, 0.0, -1.0));
        assert_relative_eq!(aabb.min, Vec3::new(1.5, -0.5, -1.5));
        assert_relative_eq!(aabb.max, Vec3::new(2.5, 0.5, -0.5));
    }

    #[test]
    fn transform_by_translation_matrix() {
        let mut aabb = AABB::default();
        aabb.transform_by(&Mat4::new_translation(&Vec3::new(3.0, 0.0, 0.0)));
        assert_relative_eq!(aabb.min, Vec3::new(2.5, -0.5, -0.5), epsilon = 1e-6);
        assert_relative_eq!(aabb.max, Vec3::new(3.5, 0.5, 0.5), epsilon = 1e-6);
    }

    #[test]
    fn transform_by_rotation_swaps_extents() {
        let mut aabb = AABB::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        aabb.transform_by(&Mat4::rotation_z(HALF_PI));
        assert_relative_eq!(aabb.min, Vec3::new(-2.0, -1.0, -3.0), epsilon = 1e-5);
        assert_relative_eq!(aabb.max, Vec3::new(2.0, 1.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn transform_by_nonuniform_scale() {
        let mut aabb = AABB::default();
        aabb.transform_by(&Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 4.0, 6.0)));
        assert_relative_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0), epsilon = 1e-6);
        assert_relative_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-6);
    }
}
