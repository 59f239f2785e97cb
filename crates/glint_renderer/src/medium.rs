//! Homogeneous participating media (fog, smoke).

use crate::{
    hittable::{HitRecord, Hittable},
    material::Isotropic,
    sampling,
    texture::Texture,
    Material,
};
use glint_math::{Aabb, Color, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A convex boundary filled with a constant-density scattering medium.
///
/// A ray crossing the volume scatters after an exponentially distributed
/// free path, so the medium is probabilistic: the same ray can hit or pass
/// through on different calls.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    neg_inv_density: f32,
    phase_function: Arc<dyn Material>,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Arc::new(Isotropic::new(albedo)),
        }
    }

    pub fn from_color(boundary: Arc<dyn Hittable>, density: f32, albedo: Color) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Arc::new(Isotropic::from_color(albedo)),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Entry and exit along the whole line, then clip to the query range.
        let enter = self.boundary.hit(ray, Interval::UNIVERSE, rng)?.t;
        let exit = self
            .boundary
            .hit(ray, Interval::new(enter + 0.0001, f32::INFINITY), rng)?
            .t;

        let t_enter = enter.max(ray_t.min).max(0.0);
        let t_exit = exit.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * sampling::gen_f32(rng).ln();
        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;

        log::trace!("medium scatter at t={t} (entered {t_enter}, exits {t_exit})");

        Some(HitRecord {
            t,
            p: ray.at(t),
            // Arbitrary; the isotropic phase function ignores it.
            normal: Vec3::X,
            u: 0.0,
            v: 0.0,
            material: self.phase_function.as_ref(),
        })
    }

    fn bounding_box(&self, time0: f32, time1: f32) -> Option<Aabb> {
        self.boundary.bounding_box(time0, time1)
    }
}
