//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a fixed depth cutoff
//! - Importance sampling from a 50/50 mixture of the material's density and
//!   the scene's lights
//! - Gamma correction
//! - Anti-aliasing via multi-sampling

use crate::material::ScatterKind;
use crate::pdf::{HittablePdf, MixturePdf, Pdf, PDF_EPSILON};
use crate::{Camera, Scene};
use glint_math::{Color, Interval, Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Attempts at drawing a direction with a usable density before the path
/// is treated as absorbed.
const MAX_PDF_RESAMPLES: u32 = 32;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Whether to use sky gradient instead of solid background
    pub use_sky_gradient: bool,
    /// Base seed; every bucket derives its own generator from it
    pub seed: u64,
    /// Tile edge length in pixels for the parallel driver
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            use_sky_gradient: false,
            seed: 0,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
        }
    }
}

/// Radiance arriving along `ray`.
///
/// `depth` counts the scattering events still allowed; at zero the hit
/// contributes its emission and the path ends there. Lights are
/// taken from `scene.lights()`: when there are none, directions come from
/// the material's own density alone.
pub fn ray_color(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = scene.world().hit(ray, Interval::new(0.001, f32::INFINITY), rng) else {
        return background(ray, config);
    };

    let emitted = rec.material.emitted(ray, &rec);

    // Out of bounces: the surface still shines but reflects nothing.
    if depth == 0 {
        return emitted;
    }

    let Some(scatter) = rec.material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    let material_pdf = match scatter.kind {
        ScatterKind::Specular(specular_ray) => {
            return emitted
                + scatter.attenuation * ray_color(&specular_ray, scene, depth - 1, config, rng);
        }
        ScatterKind::Probabilistic(pdf) => pdf,
    };

    let light_pdf = HittablePdf::new(scene.lights(), rec.p);
    let mixture = MixturePdf::new(material_pdf.as_ref(), &light_pdf);
    let sampling_pdf: &dyn Pdf = if scene.has_lights() {
        &mixture
    } else {
        material_pdf.as_ref()
    };

    let Some((direction, pdf_value)) = sample_direction(sampling_pdf, rng) else {
        log::warn!(
            "no direction with density >= {} after {} draws at {}; absorbing path",
            PDF_EPSILON,
            MAX_PDF_RESAMPLES,
            rec.p
        );
        return emitted;
    };

    let scattered = Ray::new(rec.p, direction, ray.time());
    let scattering_pdf = rec.material.scatter_pdf(ray, &rec, &scattered);
    if scattering_pdf <= 0.0 {
        // The material reflects nothing this way.
        return emitted;
    }

    let incoming = ray_color(&scattered, scene, depth - 1, config, rng);
    emitted + scatter.attenuation * scattering_pdf * incoming / pdf_value
}

/// Draw from `pdf`, redrawing while the density is negligible.
fn sample_direction(pdf: &dyn Pdf, rng: &mut dyn RngCore) -> Option<(Vec3, f32)> {
    for _ in 0..MAX_PDF_RESAMPLES {
        let direction = pdf.generate(rng);
        let value = pdf.value(direction);
        if value >= PDF_EPSILON {
            return Some((direction, value));
        }
    }
    None
}

fn background(ray: &Ray, config: &RenderConfig) -> Color {
    if config.use_sky_gradient {
        sky_gradient(ray)
    } else {
        config.background
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Replace NaN and infinite components with zero.
#[inline]
pub fn sanitize(color: Color) -> Color {
    let finite = |c: f32| if c.is_finite() { c } else { 0.0 };
    Color::new(finite(color.x), finite(color.y), finite(color.z))
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b]
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += sanitize(ray_color(&ray, scene, config.max_depth, config, rng));
    }

    // Average the samples
    pixel_color / config.samples_per_pixel.max(1) as f32
}

/// Linear radiance image, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Gamma-corrected RGB bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|color| color_to_rgb8(*color))
            .collect()
    }
}

/// Render the entire scene to an image buffer.
///
/// This is a simple single-threaded renderer; [`crate::render_parallel`]
/// is the production path.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> ImageBuffer {
    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);

    log::info!(
        "Rendering {}x{} at {} spp (single-threaded)",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel
    );

    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, scene, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AaRect, DiffuseLight, FaceOrientation, Hittable, HittableList, Lambertian, Material, Metal,
        Sphere,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn scene_of(objects: Vec<Arc<dyn Hittable>>, lights: Vec<Arc<dyn Hittable>>) -> Scene {
        Scene::new(
            Arc::new(HittableList::from_objects(objects)),
            HittableList::from_objects(lights),
        )
    }

    fn single_pixel_camera(look_from: Vec3, look_at: Vec3) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(1, 1)
            .with_position(look_from, look_at, Vec3::Y)
            .with_lens(0.1, 0.0, 1.0);
        camera.initialize().expect("valid camera");
        camera
    }

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up should be more blue (less red than white)
        let up_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let up_color = sky_gradient(&up_ray);

        // Ray pointing down should be more white (more red)
        let down_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 0.0);
        let down_color = sky_gradient(&down_ray);

        assert!(
            up_color.x < down_color.x,
            "up_color.x={} should be < down_color.x={}",
            up_color.x,
            down_color.x
        );
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb8_clamps() {
        assert_eq!(color_to_rgb8(Color::new(0.0, 0.25, 4.0)), [0, 127, 255]);
        assert_eq!(color_to_rgb8(Color::new(-1.0, 1.0, 0.0)), [0, 255, 0]);
    }

    #[test]
    fn test_sanitize_drops_non_finite() {
        let dirty = Color::new(f32::NAN, f32::INFINITY, 0.5);
        assert_eq!(sanitize(dirty), Color::new(0.0, 0.0, 0.5));
        assert_eq!(sanitize(Color::new(-0.5, 1.0, 2.0)), Color::new(-0.5, 1.0, 2.0));
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "samples_per_pixel": 8, "background": [0.1, 0.2, 0.3] }"#)
                .expect("valid config json");

        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.background, Color::new(0.1, 0.2, 0.3));
        assert_eq!(config.bucket_size, RenderConfig::default().bucket_size);

        let json = serde_json::to_string(&config).expect("serializable");
        let back: RenderConfig = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, config);
    }

    #[test]
    fn test_miss_returns_background_at_any_depth() {
        let scene = scene_of(Vec::new(), Vec::new());
        let config = RenderConfig {
            background: Color::new(0.2, 0.3, 0.4),
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z, 0.0);

        assert_eq!(ray_color(&ray, &scene, 50, &config, &mut rng), Color::new(0.2, 0.3, 0.4));
        assert_eq!(ray_color(&ray, &scene, 0, &config, &mut rng), Color::new(0.2, 0.3, 0.4));

        let sky = RenderConfig {
            use_sky_gradient: true,
            ..config
        };
        assert_eq!(ray_color(&ray, &scene, 50, &sky, &mut rng), sky_gradient(&ray));
    }

    #[test]
    fn test_light_reached_on_last_bounce_still_emits() {
        // Perfect mirror floor under a downward facing light.
        let mirror: Arc<dyn Material> = Arc::new(Metal::new(Vec3::ONE, 0.0));
        let emitter: Arc<dyn Material> = Arc::new(DiffuseLight::new(Vec3::splat(4.0)).one_sided());
        let scene = scene_of(
            vec![
                Arc::new(AaRect::xz(-5.0, 5.0, -5.0, 5.0, 0.0, mirror)),
                Arc::new(
                    AaRect::xz(-1.0, 1.0, -1.0, 1.0, 3.0, emitter)
                        .with_orientation(FaceOrientation::Negative),
                ),
            ],
            Vec::new(),
        );
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(0);

        let at_light = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y, 0.0);
        assert_eq!(ray_color(&at_light, &scene, 0, &config, &mut rng), Vec3::splat(4.0));

        // Down to the mirror, then up into the light.
        let via_mirror = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.0);
        assert_eq!(ray_color(&via_mirror, &scene, 1, &config, &mut rng), Vec3::splat(4.0));
        assert_eq!(ray_color(&via_mirror, &scene, 2, &config, &mut rng), Vec3::splat(4.0));
        assert_eq!(ray_color(&via_mirror, &scene, 0, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_facing_mirrors_terminate() {
        // Two perfect mirrors bounce forever without the depth cutoff.
        let mirror: Arc<dyn Material> = Arc::new(Metal::new(Vec3::splat(0.9), 0.0));
        let scene = scene_of(
            vec![
                Arc::new(AaRect::xy(-10.0, 10.0, -10.0, 10.0, -1.0, mirror.clone())),
                Arc::new(AaRect::xy(-10.0, 10.0, -10.0, 10.0, 1.0, mirror)),
            ],
            Vec::new(),
        );
        let config = RenderConfig {
            background: Color::ONE,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::ZERO, Vec3::Z, 0.0);
        assert_eq!(ray_color(&ray, &scene, config.max_depth, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_lambertian_converges_to_albedo_under_uniform_sky() {
        // A diffuse plane under a uniform white environment reflects
        // exactly its albedo. The designated light is not in the world, so
        // light-sampled directions just see the environment too.
        let ground: Arc<dyn Hittable> = Arc::new(AaRect::xz(
            -1000.0,
            1000.0,
            -1000.0,
            1000.0,
            0.0,
            Arc::new(Lambertian::from_color(Vec3::splat(0.5))),
        ));
        let phantom_light: Arc<dyn Hittable> = Arc::new(AaRect::xz(
            -1.0,
            1.0,
            -1.0,
            1.0,
            3.0,
            Arc::new(DiffuseLight::new(Vec3::ONE)),
        ));
        let camera = single_pixel_camera(Vec3::new(0.0, 1.0, 1.0), Vec3::ZERO);
        let config = RenderConfig {
            samples_per_pixel: 10_000,
            background: Color::ONE,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(17);

        let mixed = scene_of(vec![ground.clone()], vec![phantom_light]);
        let estimate = render_pixel(&camera, &mixed, 0, 0, &config, &mut rng);
        assert!((estimate.x - 0.5).abs() < 0.02, "mixture estimate {estimate}");
        assert_eq!(estimate.x, estimate.y);

        // Without lights the cosine density cancels exactly.
        let unlit = scene_of(vec![ground], Vec::new());
        let estimate = render_pixel(&camera, &unlit, 0, 0, &config, &mut rng);
        assert!((estimate.x - 0.5).abs() < 1e-3, "material-only estimate {estimate}");
    }

    #[test]
    fn test_sphere_apex_direct_lighting_matches_analytic() {
        // Unit sphere lit by a one-sided square light above it. At the apex
        // the outgoing radiance is albedo / π · E with
        // E = ∫ Le · cosθ_surface · cosθ_light / d² dA = ∫ Le · h² / d⁴ dA.
        let albedo = 0.8;
        let emit = 4.0;
        let (half, height) = (0.5f32, 3.0f32);

        let emitter = Arc::new(DiffuseLight::new(Vec3::splat(emit)).one_sided());
        let light: Arc<dyn Hittable> = Arc::new(
            AaRect::xz(-half, half, -half, half, height, emitter)
                .with_orientation(FaceOrientation::Negative),
        );
        let sphere: Arc<dyn Hittable> = Arc::new(Sphere::new(
            Vec3::ZERO,
            1.0,
            Arc::new(Lambertian::from_color(Vec3::splat(albedo))),
        ));
        let scene = scene_of(vec![sphere, light.clone()], vec![light]);

        let h = height - 1.0;
        let n = 400;
        let cell = 2.0 * half / n as f32;
        let mut irradiance = 0.0f64;
        for i in 0..n {
            for j in 0..n {
                let x = -half + (i as f32 + 0.5) * cell;
                let z = -half + (j as f32 + 0.5) * cell;
                let d2 = x * x + h * h + z * z;
                irradiance += (emit * h * h / (d2 * d2) * cell * cell) as f64;
            }
        }
        let expected = albedo as f64 / std::f64::consts::PI * irradiance;

        let camera = single_pixel_camera(Vec3::new(0.0, 2.0, 3.0), Vec3::new(0.0, 1.0, 0.0));
        let config = RenderConfig {
            samples_per_pixel: 10_000,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2024);

        let estimate = render_pixel(&camera, &scene, 0, 0, &config, &mut rng);
        let relative = (estimate.x as f64 - expected).abs() / expected;
        assert!(relative < 0.05, "estimate {} vs analytic {expected}", estimate.x);
    }

    #[test]
    fn test_render_fills_image() {
        let scene = scene_of(
            vec![Arc::new(Sphere::new(
                Vec3::new(0.0, 0.0, -1.0),
                0.5,
                Arc::new(Lambertian::from_color(Color::new(0.5, 0.5, 0.5))),
            ))],
            Vec::new(),
        );
        let mut camera = Camera::new().with_resolution(8, 6);
        camera.initialize().expect("valid camera");
        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 5,
            use_sky_gradient: true,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);

        let image = render(&camera, &scene, &config, &mut rng);
        assert_eq!(image.pixels.len(), 48);
        assert_eq!(image.to_rgb8().len(), 48 * 3);
        assert!(image.pixels.iter().all(|c| c.is_finite() && c.min_element() >= 0.0));

        // The center pixel sees the sphere, which is darker than the sky.
        assert!(image.get(4, 3).x < image.get(0, 0).x);
    }
}
