//! Materials describe how light interacts with surfaces.
//!
//! A material either redirects the ray deterministically (specular), hands
//! the integrator a density to sample from (probabilistic), or absorbs it.
//! Emissive materials additionally report radiance via [`Material::emitted`].

use crate::pdf::{CosinePdf, Pdf, SpherePdf};
use crate::sampling::{gen_f32, random_in_unit_sphere};
use crate::texture::{SolidColor, Texture};
use crate::HitRecord;
use glint_math::{Color, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;
use std::sync::Arc;

/// How a scattered direction is produced.
pub enum ScatterKind {
    /// Delta distribution: follow this exact ray, no density involved.
    Specular(Ray),
    /// Sample a direction from this density and reweight by
    /// [`Material::scatter_pdf`].
    Probabilistic(Box<dyn Pdf>),
}

/// Result of a successful scatter.
pub struct ScatterResult {
    pub attenuation: Color,
    pub kind: ScatterKind,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray, or return `None` when it is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;

    /// The material's own density for scattering `ray_in` into `scattered`.
    /// Only meaningful for probabilistic materials.
    fn scatter_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }

    /// Radiance emitted toward `ray_in` at the hit point. Black for
    /// everything except lights.
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    /// Create a Lambertian material with a constant albedo color.
    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            kind: ScatterKind::Probabilistic(Box::new(CosinePdf::new(rec.facing_normal(ray_in)))),
        })
    }

    fn scatter_pdf(&self, ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cosine = rec
            .facing_normal(ray_in)
            .dot(scattered.direction().normalize());
        (cosine / PI).max(0.0)
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, clamped to [0, 1]; 0 is a perfect mirror
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let normal = rec.facing_normal(ray_in);
        let reflected = reflect(ray_in.direction().normalize(), normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Fuzz pushed the ray below the surface: absorb it.
        if direction.dot(normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            kind: ScatterKind::Specular(Ray::new(rec.p, direction, ray_in.time())),
        })
    }
}

/// Dielectric (glass) material. Never absorbs.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let unit_direction = ray_in.direction().normalize();
        let d_dot_n = unit_direction.dot(rec.normal);

        let (outward_normal, refraction_ratio, cosine) = if d_dot_n > 0.0 {
            // Leaving the medium. Schlick takes the incidence cosine scaled
            // by the index.
            (-rec.normal, self.ior, self.ior * d_dot_n)
        } else {
            (rec.normal, 1.0 / self.ior, -d_dot_n)
        };

        let direction = match refract(unit_direction, outward_normal, refraction_ratio) {
            Some(refracted) if gen_f32(rng) >= reflectance(cosine.min(1.0), refraction_ratio) => {
                refracted
            }
            // Total internal reflection, or Fresnel picked the reflected path.
            _ => reflect(unit_direction, outward_normal),
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            kind: ScatterKind::Specular(Ray::new(rec.p, direction, ray_in.time())),
        })
    }
}

/// Diffuse light emitter.
#[derive(Clone)]
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
    one_sided: bool,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor::new(emit)))
    }

    pub fn from_texture(emit: Arc<dyn Texture>) -> Self {
        Self {
            emit,
            one_sided: false,
        }
    }

    /// Emit only toward rays arriving against the surface normal.
    pub fn one_sided(mut self) -> Self {
        self.one_sided = true;
        self
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        None
    }

    fn emitted(&self, ray_in: &Ray, rec: &HitRecord) -> Color {
        if self.one_sided && !rec.front_face(ray_in) {
            return Color::ZERO;
        }
        self.emit.value(rec.u, rec.v, rec.p)
    }
}

/// Phase function for participating media: scatters uniformly in every
/// direction.
#[derive(Clone)]
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            kind: ScatterKind::Probabilistic(Box::new(SpherePdf)),
        })
    }

    fn scatter_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        1.0 / (4.0 * PI)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract unit vector `uv` through a surface with unit normal `n` facing
/// the incoming side. `None` when Snell's law has no solution (total
/// internal reflection).
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Option<Vec3> {
    let dt = uv.dot(n);
    let discriminant = 1.0 - etai_over_etat * etai_over_etat * (1.0 - dt * dt);
    if discriminant < 0.0 {
        return None;
    }
    Some(etai_over_etat * (uv - n * dt) - n * discriminant.sqrt())
}

/// Schlick's approximation for Fresnel reflectance.
#[inline]
pub fn reflectance(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
