//! Probability densities over directions, used for importance sampling.
//!
//! A [`Pdf`] pairs a sampler (`generate`) with the density it samples from
//! (`value`). The integrator divides by the density of whatever it actually
//! sampled, so each `value` must match its own `generate` exactly.

use crate::{sampling, Hittable};
use glint_math::{Onb, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Densities below this are treated as zero by samplers and the integrator.
pub const PDF_EPSILON: f32 = 1e-4;

/// A direction distribution with a matching density evaluator.
pub trait Pdf {
    /// Solid-angle density of `direction`.
    fn value(&self, direction: Vec3) -> f32;

    /// Draw a direction from this distribution.
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Cosine-weighted hemisphere around a normal: `max(0, cos θ) / π`.
#[derive(Debug, Clone, Copy)]
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            uvw: Onb::from_w(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f32 {
        let cosine = direction.normalize().dot(self.uvw.w());
        (cosine / PI).max(0.0)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(sampling::random_cosine_direction(rng))
    }
}

/// Uniform over the whole sphere of directions: `1 / 4π`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpherePdf;

impl Pdf for SpherePdf {
    fn value(&self, _direction: Vec3) -> f32 {
        1.0 / (4.0 * PI)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        sampling::random_unit_vector(rng)
    }
}

/// Directions from `origin` toward a shape, typically a light.
pub struct HittablePdf<'a> {
    target: &'a dyn Hittable,
    origin: Vec3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(target: &'a dyn Hittable, origin: Vec3) -> Self {
        Self { target, origin }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        self.target.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.target.random(self.origin, rng)
    }
}

/// Equal-weight blend of two densities.
pub struct MixturePdf<'a> {
    pdfs: [&'a dyn Pdf; 2],
}

impl<'a> MixturePdf<'a> {
    pub fn new(first: &'a dyn Pdf, second: &'a dyn Pdf) -> Self {
        Self {
            pdfs: [first, second],
        }
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        0.5 * self.pdfs[0].value(direction) + 0.5 * self.pdfs[1].value(direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if sampling::gen_f32(rng) < 0.5 {
            self.pdfs[0].generate(rng)
        } else {
            self.pdfs[1].generate(rng)
        }
    }
}
