//! Axis-aligned box built from six rectangles.

use crate::{
    hittable::{HitRecord, Hittable, HittableList},
    rect::{AaRect, FaceOrientation},
    Material,
};
use glint_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A box between two opposite corners, with outward-facing normals.
///
/// Named `Cuboid` to stay clear of `std::boxed::Box`.
pub struct Cuboid {
    bounds: Aabb,
    sides: HittableList,
}

impl Cuboid {
    pub fn new(a: Vec3, b: Vec3, material: Arc<dyn Material>) -> Self {
        let min = a.min(b);
        let max = a.max(b);

        let face = |rect: AaRect, orientation: FaceOrientation| -> Arc<dyn Hittable> {
            Arc::new(rect.with_orientation(orientation))
        };
        let m = &material;
        let (outer, inner) = (FaceOrientation::Positive, FaceOrientation::Negative);

        // Max faces point along +axis, min faces along -axis.
        let sides = HittableList::from_objects(vec![
            face(AaRect::xy(min.x, max.x, min.y, max.y, max.z, m.clone()), outer),
            face(AaRect::xy(min.x, max.x, min.y, max.y, min.z, m.clone()), inner),
            face(AaRect::xz(min.x, max.x, min.z, max.z, max.y, m.clone()), outer),
            face(AaRect::xz(min.x, max.x, min.z, max.z, min.y, m.clone()), inner),
            face(AaRect::yz(min.y, max.y, min.z, max.z, max.x, m.clone()), outer),
            face(AaRect::yz(min.y, max.y, min.z, max.z, min.x, m.clone()), inner),
        ]);

        Self {
            bounds: Aabb::from_points(min, max),
            sides,
        }
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bounds)
    }
}
