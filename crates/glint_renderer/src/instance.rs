//! Instancing wrappers that place a shared object in the world.
//!
//! Each wrapper moves the incoming ray into the object's local space,
//! delegates, and maps the resulting hit point and normal back out. Light
//! sampling queries are forwarded through the same transforms.

use crate::hittable::{HitRecord, Hittable};
use glint_math::{Aabb, Interval, Mat3, Mat4, Mat4Ext, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Offsets an object by a fixed vector.
pub struct Translate {
    object: Arc<dyn Hittable>,
    offset: Vec3,
}

impl Translate {
    pub fn new(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self { object, offset }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.object
            .bounding_box(time0, time1)
            .map(|bbox| bbox.translate(self.offset))
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin - self.offset, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin - self.offset, rng)
    }
}

/// Rotates an object about the world Y axis.
pub struct RotateY {
    object: Arc<dyn Hittable>,
    /// Local to world.
    rotation: Mat3,
    /// World to local.
    inverse: Mat3,
    angle: f32,
}

impl RotateY {
    /// - `degrees`: counter-clockwise rotation seen from +Y
    pub fn new(object: Arc<dyn Hittable>, degrees: f32) -> Self {
        let angle = degrees.to_radians();
        let rotation = Mat3::from_rotation_y(angle);
        Self {
            object,
            rotation,
            inverse: rotation.transpose(),
            angle,
        }
    }
}

impl Hittable for RotateY {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = Ray::new(
            self.inverse * ray.origin(),
            self.inverse * ray.direction(),
            ray.time(),
        );

        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;
        rec.p = self.rotation * rec.p;
        rec.normal = self.rotation * rec.normal;
        Some(rec)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let local = self.object.bounding_box(time0, time1)?;
        Some(Mat4::from_rotation_y(self.angle).transform_aabb(&local))
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object
            .pdf_value(self.inverse * origin, self.inverse * direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.rotation * self.object.random(self.inverse * origin, rng)
    }
}
