//! Glint renderer - CPU Monte Carlo path tracing.
//!
//! Scenes are built from shared, immutable [`Hittable`] objects and
//! [`Material`]s, accelerated with a [`BvhNode`], and rendered with an
//! importance-sampled path tracer that mixes each material's own density
//! with sampling toward the scene's lights.

mod bucket;
mod bvh;
mod camera;
mod cuboid;
mod error;
mod hittable;
mod instance;
mod material;
mod medium;
mod perlin;
mod rect;
mod renderer;
mod scene;
mod sphere;
mod texture;

pub mod pdf;
pub mod sampling;

pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use error::{RenderError, RenderResult, SceneError, SceneResult, TextureError, TextureResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use instance::{RotateY, Translate};
pub use material::{
    reflect, reflectance, refract, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal,
    ScatterKind, ScatterResult,
};
pub use medium::ConstantMedium;
pub use perlin::Perlin;
pub use rect::{AaRect, FaceOrientation, Plane};
pub use renderer::{
    color_to_rgb8, linear_to_gamma, ray_color, render, render_pixel, sanitize, ImageBuffer,
    RenderConfig,
};
pub use scene::Scene;
pub use sphere::{MovingSphere, Sphere};
pub use texture::{CheckerTexture, ImageTexture, NoiseStyle, NoiseTexture, SolidColor, Texture};

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Aabb, Color, Interval, Ray, Vec3};
