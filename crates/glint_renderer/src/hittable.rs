//! Hittable trait and HitRecord for ray-object intersection.

use crate::{sampling, Material};
use glint_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Record of a ray-object intersection.
///
/// `normal` is a unit vector oriented by the primitive's own definition
/// (outward for spheres, per [`crate::FaceOrientation`] for rects). It does
/// not necessarily face the ray; use [`HitRecord::front_face`] when the side
/// matters.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Unit surface normal at the intersection
    pub normal: Vec3,
    /// UV texture coordinates
    pub u: f32,
    pub v: f32,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl<'a> HitRecord<'a> {
    /// True when the ray arrives against the stored normal.
    #[inline]
    pub fn front_face(&self, ray: &Ray) -> bool {
        ray.direction().dot(self.normal) < 0.0
    }

    /// The stored normal flipped, if needed, to face against the ray.
    #[inline]
    pub fn facing_normal(&self, ray: &Ray) -> Vec3 {
        if self.front_face(ray) {
            self.normal
        } else {
            -self.normal
        }
    }
}

/// Trait for objects that can be hit by rays.
///
/// Implementations are immutable after construction and shared across
/// render threads.
pub trait Hittable: Send + Sync {
    /// Closest intersection with parameter strictly inside `ray_t`.
    ///
    /// `rng` is only consumed by probabilistic primitives such as
    /// [`crate::ConstantMedium`].
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>>;

    /// Bounds over the shutter interval `[time0, time1]`, or `None` for
    /// shapes that cannot be bounded.
    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb>;

    /// Solid-angle density of sampling `direction` from `origin` via
    /// [`Hittable::random`]. Shapes that cannot be sampled report zero.
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3) -> f32 {
        0.0
    }

    /// Direction from `origin` toward a random point on this shape.
    fn random(&self, _origin: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

/// A flat list of hittable objects, tested linearly.
#[derive(Clone, Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    pub fn from_objects(objects: Vec<Arc<dyn Hittable>>) -> Self {
        Self { objects }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;

        for object in &self.objects {
            let interval = ray_t.with_max(closest.map_or(ray_t.max, |rec| rec.t));
            if let Some(rec) = object.hit(ray, interval, rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let mut objects = self.objects.iter();
        let first = objects.next()?.bounding_box(time0, time1)?;
        objects.try_fold(first, |acc, object| {
            object
                .bounding_box(time0, time1)
                .map(|bbox| Aabb::surrounding(&acc, &bbox))
        })
    }

    /// Average density over members, matching [`HittableList::random`]
    /// which picks a member uniformly.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let weight = 1.0 / self.objects.len() as f32;
        self.objects
            .iter()
            .map(|object| weight * object.pdf_value(origin, direction))
            .sum()
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let index = ((sampling::gen_f32(rng) * self.objects.len() as f32) as usize)
            .min(self.objects.len() - 1);
        self.objects[index].random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sphere_at(z: f32) -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, z),
            0.5,
            Arc::new(Lambertian::from_color(Vec3::splat(0.5))),
        ))
    }

    #[test]
    fn test_list_returns_closest_hit() {
        let list =
            HittableList::from_objects(vec![sphere_at(-5.0), sphere_at(-2.0), sphere_at(-8.0)]);
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let rec = list
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .expect("ray should hit");

        assert!((rec.t - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_list_bounding_box() {
        let list = HittableList::from_objects(vec![sphere_at(-5.0), sphere_at(2.0)]);
        let bbox = list.bounding_box(0.0, 1.0).expect("spheres are bounded");

        assert!((bbox.z.min - (-5.5)).abs() < 1e-5);
        assert!((bbox.z.max - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_empty_list_is_unbounded() {
        assert!(HittableList::new().bounding_box(0.0, 1.0).is_none());
        assert_eq!(HittableList::new().pdf_value(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn test_front_face_and_facing_normal() {
        let material = Lambertian::from_color(Vec3::ONE);
        let rec = HitRecord {
            t: 1.0,
            p: Vec3::ZERO,
            normal: Vec3::Y,
            u: 0.0,
            v: 0.0,
            material: &material,
        };

        let down = Ray::new(Vec3::Y, -Vec3::Y, 0.0);
        assert!(rec.front_face(&down));
        assert_eq!(rec.facing_normal(&down), Vec3::Y);

        let up = Ray::new(-Vec3::Y, Vec3::Y, 0.0);
        assert!(!rec.front_face(&up));
        assert_eq!(rec.facing_normal(&up), -Vec3::Y);
    }
}
