//! Axis-aligned rectangles.
//!
//! One type covers all three planes: a rect spans `[a0, a1] x [b0, b1]` on
//! the two in-plane axes and sits at `k` on the remaining one.

use crate::{
    hittable::{HitRecord, Hittable},
    sampling, Material,
};
use glint_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Which pair of axes the rectangle spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Spans x and y, fixed z.
    XY,
    /// Spans x and z, fixed y.
    XZ,
    /// Spans y and z, fixed x.
    YZ,
}

impl Plane {
    /// Indices of `(a, b, k)` axes.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// How a rect orients its reported normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceOrientation {
    /// Always along +k.
    Positive,
    /// Always along -k.
    Negative,
    /// Along whichever k direction faces the incoming ray.
    #[default]
    Auto,
}

/// An axis-aligned rectangle in one of the three principal planes.
pub struct AaRect {
    plane: Plane,
    a: Interval,
    b: Interval,
    k: f32,
    orientation: FaceOrientation,
    material: Arc<dyn Material>,
}

impl AaRect {
    pub fn new(
        plane: Plane,
        a: Interval,
        b: Interval,
        k: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            plane,
            a,
            b,
            k,
            orientation: FaceOrientation::default(),
            material,
        }
    }

    /// Rect spanning `[x0, x1] x [y0, y1]` at `z = k`.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XY, Interval::new(x0, x1), Interval::new(y0, y1), k, material)
    }

    /// Rect spanning `[x0, x1] x [z0, z1]` at `y = k`.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XZ, Interval::new(x0, x1), Interval::new(z0, z1), k, material)
    }

    /// Rect spanning `[y0, y1] x [z0, z1]` at `x = k`.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::YZ, Interval::new(y0, y1), Interval::new(z0, z1), k, material)
    }

    pub fn with_orientation(mut self, orientation: FaceOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn area(&self) -> f32 {
        self.a.size() * self.b.size()
    }

    /// Plane intersection without the material lookup, shared by `hit` and
    /// `pdf_value`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, f32, f32)> {
        let (ai, bi, ki) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        let t = (self.k - origin[ki]) / direction[ki];
        if !ray_t.surrounds(t) {
            return None;
        }

        let a = origin[ai] + t * direction[ai];
        let b = origin[bi] + t * direction[bi];
        if !self.a.contains(a) || !self.b.contains(b) {
            return None;
        }

        Some((t, a, b))
    }

    fn normal_for(&self, ray: &Ray) -> Vec3 {
        let (_, _, ki) = self.plane.axes();
        let mut axis = Vec3::ZERO;
        axis[ki] = 1.0;

        match self.orientation {
            FaceOrientation::Positive => axis,
            FaceOrientation::Negative => -axis,
            FaceOrientation::Auto => {
                if ray.direction()[ki] > 0.0 {
                    -axis
                } else {
                    axis
                }
            }
        }
    }
}

impl Hittable for AaRect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let (t, a, b) = self.intersect(ray, ray_t)?;

        Some(HitRecord {
            t,
            p: ray.at(t),
            normal: self.normal_for(ray),
            u: (a - self.a.min) / self.a.size(),
            v: (b - self.b.min) / self.b.size(),
            material: self.material.as_ref(),
        })
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        let (ai, bi, ki) = self.plane.axes();
        let mut min = Vec3::ZERO;
        let mut max = Vec3::ZERO;
        min[ai] = self.a.min;
        max[ai] = self.a.max;
        min[bi] = self.b.min;
        max[bi] = self.b.max;
        min[ki] = self.k;
        max[ki] = self.k;

        // Zero thickness along k is padded by the box itself.
        Some(Aabb::from_points(min, max))
    }

    /// Area-to-solid-angle density: `distance² / (|cos θ| · area)`.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new(origin, direction, 0.0);
        let Some((t, _, _)) = self.intersect(&ray, Interval::new(0.001, f32::INFINITY)) else {
            return 0.0;
        };

        let (_, _, ki) = self.plane.axes();
        let length_squared = direction.length_squared();
        let distance_squared = t * t * length_squared;
        let cosine = (direction[ki] / length_squared.sqrt()).abs();
        if cosine <= 0.0 {
            return 0.0;
        }

        distance_squared / (cosine * self.area())
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let (ai, bi, ki) = self.plane.axes();
        let mut point = Vec3::ZERO;
        point[ai] = sampling::gen_range_f32(rng, self.a.min, self.a.max);
        point[bi] = sampling::gen_range_f32(rng, self.b.min, self.b.max);
        point[ki] = self.k;
        point - origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Vec3::splat(0.5)))
    }

    fn t_range() -> Interval {
        Interval::new(0.001, f32::INFINITY)
    }

    #[test]
    fn test_xy_rect_hit_uv() {
        let rect = AaRect::xy(0.0, 2.0, 0.0, 4.0, -3.0, gray());
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::new(0.5, 3.0, 0.0), -Vec3::Z, 0.0);

        let rec = rect.hit(&ray, t_range(), &mut rng).expect("inside the rect");
        assert!((rec.t - 3.0).abs() < 1e-5);
        assert!((rec.u - 0.25).abs() < 1e-5);
        assert!((rec.v - 0.75).abs() < 1e-5);
        // Auto faces the ray.
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_rect_misses_outside_and_parallel() {
        let rect = AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, gray());
        let mut rng = StdRng::seed_from_u64(0);

        let outside = Ray::new(Vec3::new(1.5, 0.0, 0.0), Vec3::Y, 0.0);
        assert!(rect.hit(&outside, t_range(), &mut rng).is_none());

        let parallel = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        assert!(rect.hit(&parallel, t_range(), &mut rng).is_none());

        let behind = Ray::new(Vec3::ZERO, -Vec3::Y, 0.0);
        assert!(rect.hit(&behind, t_range(), &mut rng).is_none());
    }

    #[test]
    fn test_rect_orientation_policies() {
        let mut rng = StdRng::seed_from_u64(0);
        let up = Ray::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, 0.0);
        let down = Ray::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, 0.0);

        let auto = AaRect::xz(-1.0, 1.0, -1.0, 1.0, 0.0, gray());
        assert_eq!(auto.hit(&up, t_range(), &mut rng).map(|r| r.normal), Some(-Vec3::Y));
        assert_eq!(auto.hit(&down, t_range(), &mut rng).map(|r| r.normal), Some(Vec3::Y));

        let fixed = AaRect::xz(-1.0, 1.0, -1.0, 1.0, 0.0, gray())
            .with_orientation(FaceOrientation::Positive);
        assert_eq!(fixed.hit(&up, t_range(), &mut rng).map(|r| r.normal), Some(Vec3::Y));
        assert_eq!(fixed.hit(&down, t_range(), &mut rng).map(|r| r.normal), Some(Vec3::Y));

        let flipped = AaRect::yz(-1.0, 1.0, -1.0, 1.0, 0.0, gray())
            .with_orientation(FaceOrientation::Negative);
        let along_x = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X, 0.0);
        assert_eq!(flipped.hit(&along_x, t_range(), &mut rng).map(|r| r.normal), Some(-Vec3::X));
    }

    #[test]
    fn test_rect_bounding_box_is_padded() {
        let rect = AaRect::yz(0.0, 1.0, 2.0, 3.0, 5.0, gray());
        let bbox = rect.bounding_box(0.0, 1.0).expect("rects are bounded");

        assert!(bbox.x.size() > 0.0);
        assert!(bbox.x.contains(5.0));
        assert_eq!(bbox.y, Interval::new(0.0, 1.0));
        assert_eq!(bbox.z, Interval::new(2.0, 3.0));
    }

    #[test]
    fn test_rect_random_lands_on_rect() {
        let rect = AaRect::xy(-1.0, 1.0, 0.0, 2.0, 4.0, gray());
        let origin = Vec3::new(0.2, 0.1, 0.0);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let point = origin + rect.random(origin, &mut rng);
            assert!((point.z - 4.0).abs() < 1e-5);
            assert!((-1.0..=1.0).contains(&point.x));
            assert!((0.0..=2.0).contains(&point.y));
        }
    }
}
