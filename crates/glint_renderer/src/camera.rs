//! Thin-lens camera for ray generation.

use crate::error::{SceneError, SceneResult};
use crate::sampling::{gen_f32, gen_range_f32, random_in_unit_disk};
use glint_math::{Ray, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// Configure with the `with_*` builders, then call [`Camera::initialize`]
/// once before generating rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,
    /// Viewport width / height. `None` follows the image resolution.
    aspect_ratio: Option<f32>,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,       // Vertical field of view in degrees
    aperture: f32,   // Lens diameter; 0 is a pinhole
    focus_dist: f32, // Distance from camera to plane of perfect focus

    // Shutter
    time0: f32,
    time1: f32,

    // Cached computed values (set by initialize())
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            aspect_ratio: None,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            time0: 0.0,
            time1: 0.0,
            // Cached values (initialized to defaults)
            center: Vec3::ZERO,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Override the viewport aspect ratio instead of deriving it from the
    /// resolution.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Shutter open/close times. Each ray gets a uniform time in between.
    pub fn with_shutter(mut self, time0: f32, time1: f32) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    pub fn shutter(&self) -> (f32, f32) {
        (self.time0, self.time1)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
            .unwrap_or(self.image_width as f32 / self.image_height as f32)
    }

    /// Validate the settings and compute the viewport. Must be called before
    /// generating rays.
    pub fn initialize(&mut self) -> SceneResult<()> {
        self.validate()?;

        self.center = self.look_from;
        self.lens_radius = self.aperture / 2.0;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * self.aspect_ratio();

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Calculate viewport vectors
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        // Calculate pixel delta vectors
        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left =
            self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;

        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        log::debug!(
            "Camera: {}x{} vfov={} aperture={} focus={} shutter=[{}, {}]",
            self.image_width,
            self.image_height,
            self.vfov,
            self.aperture,
            self.focus_dist,
            self.time0,
            self.time1
        );

        Ok(())
    }

    fn validate(&self) -> SceneResult<()> {
        let invalid = |msg: String| -> SceneResult<()> { Err(SceneError::InvalidCamera(msg)) };

        if self.image_width == 0 || self.image_height == 0 {
            return invalid(format!(
                "resolution {}x{} has a zero dimension",
                self.image_width, self.image_height
            ));
        }
        let aspect = self.aspect_ratio();
        if !aspect.is_finite() || aspect <= 0.0 {
            return invalid(format!("aspect ratio {aspect} must be positive and finite"));
        }
        if self.vfov.is_nan() || self.vfov <= 0.0 || self.vfov >= 180.0 {
            return invalid(format!("vertical fov {} must lie in (0, 180) degrees", self.vfov));
        }
        if !self.focus_dist.is_finite() || self.focus_dist <= 0.0 {
            return invalid(format!("focus distance {} must be positive", self.focus_dist));
        }
        if self.aperture.is_nan() || self.aperture < 0.0 {
            return invalid(format!("aperture {} must not be negative", self.aperture));
        }

        let view = self.look_from - self.look_at;
        if view.length_squared() == 0.0 {
            return invalid("look_from and look_at coincide".to_string());
        }
        if self.vup.cross(view).length_squared() == 0.0 {
            return invalid("view up vector is parallel to the view direction".to_string());
        }

        Ok(())
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.lens_radius <= 0.0 {
            self.center
        } else {
            self.lens_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = if self.time1 > self.time0 {
            gen_range_f32(rng, self.time0, self.time1)
        } else {
            self.time0
        };

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Sample a point on the lens disk.
    fn lens_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.lens_radius * random_in_unit_disk(rng);
        self.center + p.x * self.u + p.y * self.v
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole() -> Camera {
        Camera::new()
            .with_resolution(100, 100)
            .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
    }

    #[test]
    fn test_camera_initialize() {
        let mut camera = Camera::new()
            .with_resolution(800, 600)
            .with_position(
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(0.0, 1.0, 0.0),
            )
            .with_lens(90.0, 0.0, 1.0);

        camera.initialize().expect("valid camera");

        assert_eq!(camera.center, Vec3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 0.001);
        assert!((camera.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_camera_ray_direction() {
        let mut camera = pinhole();
        camera.initialize().expect("valid camera");

        let mut rng = StdRng::seed_from_u64(42);

        // Center ray should point roughly towards -Z
        let ray = camera.get_ray(50, 50, &mut rng);
        assert!(ray.direction().z < 0.0);
        assert!(ray.direction().normalize().dot(-Vec3::Z) > 0.99);

        // Top-left pixel looks up and to the left.
        let corner = camera.get_ray(0, 0, &mut rng);
        assert!(corner.direction().x < 0.0 && corner.direction().y > 0.0);
    }

    #[test]
    fn test_camera_shutter_times() {
        let mut camera = pinhole().with_shutter(0.25, 0.75);
        camera.initialize().expect("valid camera");
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let t = camera.get_ray(10, 10, &mut rng).time();
            assert!((0.25..0.75).contains(&t));
        }

        let mut still = pinhole();
        still.initialize().expect("valid camera");
        assert_eq!(still.get_ray(10, 10, &mut rng).time(), 0.0);
    }

    #[test]
    fn test_camera_thin_lens_origins() {
        let mut camera = pinhole().with_lens(40.0, 0.5, 10.0);
        camera.initialize().expect("valid camera");
        let mut rng = StdRng::seed_from_u64(8);

        let origins: Vec<Vec3> = (0..100)
            .map(|_| camera.get_ray(50, 50, &mut rng).origin())
            .collect();
        assert!(origins.iter().all(|o| o.length() <= 0.25 + 1e-5 && o.z.abs() < 1e-6));
        assert!(origins.iter().any(|o| o.length() > 0.05));
    }

    #[test]
    fn test_camera_rejects_degenerate_settings() {
        let cases = [
            pinhole().with_resolution(0, 100),
            pinhole().with_aspect_ratio(0.0),
            pinhole().with_lens(180.0, 0.0, 1.0),
            pinhole().with_lens(45.0, 0.0, 0.0),
            pinhole().with_lens(45.0, -1.0, 1.0),
            pinhole().with_position(Vec3::ONE, Vec3::ONE, Vec3::Y),
            pinhole().with_position(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), Vec3::Y),
        ];

        for mut camera in cases {
            assert!(matches!(camera.initialize(), Err(SceneError::InvalidCamera(_))));
        }
    }
}
