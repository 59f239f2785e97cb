//! Sphere primitives for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    sampling, Material,
};
use glint_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// A static sphere.
///
/// A negative radius keeps the same surface but flips the normal inward,
/// which is how hollow glass bubbles are modelled.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// UV coordinates for a point `p` on the unit sphere centered at origin.
    ///
    /// `u = 1 - (atan2(z, x) + π) / 2π`, `v = (asin(y) + π/2) / π`.
    pub fn uv(p: Vec3) -> (f32, f32) {
        let phi = p.z.atan2(p.x);
        let theta = p.y.clamp(-1.0, 1.0).asin();

        let u = 1.0 - (phi + PI) / (2.0 * PI);
        let v = (theta + PI / 2.0) / PI;
        (u, v)
    }
}

/// Shared quadratic solve for static and moving spheres.
fn hit_sphere<'a>(
    center: Vec3,
    radius: f32,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !ray_t.surrounds(root) {
        root = (h + sqrtd) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
    }

    let p = ray.at(root);
    // Dividing by the signed radius flips the normal for negative radii.
    let normal = (p - center) / radius;
    let (u, v) = Sphere::uv((p - center) / radius.abs());

    Some(HitRecord {
        t: root,
        p,
        normal,
        u,
        v,
        material,
    })
}

fn radius_box(center: Vec3, radius: f32) -> Aabb {
    let rvec = Vec3::splat(radius.abs());
    Aabb::from_points(center - rvec, center + rvec)
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(self.center, self.radius, self.material.as_ref(), ray, ray_t)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(radius_box(self.center, self.radius))
    }

    /// Uniform over the cone the sphere subtends from `origin`.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new(origin, direction, 0.0);
        let ray_t = Interval::new(0.001, f32::INFINITY);
        if hit_sphere(self.center, self.radius, self.material.as_ref(), &ray, ray_t).is_none() {
            return 0.0;
        }

        let distance_squared = (self.center - origin).length_squared();
        let cos_theta_max = (1.0 - self.radius * self.radius / distance_squared).max(0.0).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        if solid_angle <= 0.0 {
            return 0.0;
        }
        1.0 / solid_angle
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center - origin;
        let distance_squared = direction.length_squared();
        let uvw = Onb::from_w(direction);
        uvw.local(sampling::random_to_sphere(rng, self.radius, distance_squared))
    }
}

/// A sphere whose center moves linearly from `center0` at `time0` to
/// `center1` at `time1`, for motion blur.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: Arc<dyn Material>,
}

impl MovingSphere {
    pub fn new(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius,
            material,
        }
    }

    pub fn center(&self, time: f32) -> Vec3 {
        let span = self.time1 - self.time0;
        if span == 0.0 {
            return self.center0;
        }
        self.center0 + ((time - self.time0) / span) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(self.center(ray.time()), self.radius, self.material.as_ref(), ray, ray_t)
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        let box0 = radius_box(self.center(time0), self.radius);
        let box1 = radius_box(self.center(time1), self.radius);
        Some(Aabb::surrounding(&box0, &box1))
    }
}
