//! Textures: spatially varying colors sampled by materials.

use crate::error::{TextureError, TextureResult};
use crate::perlin::Perlin;
use glint_math::{Color, Vec3};
use rand::RngCore;
use std::path::Path;
use std::sync::Arc;

/// Octaves summed by turbulence-based noise styles.
const TURBULENCE_DEPTH: usize = 7;

/// A color as a function of surface (u, v) and world-space hit point.
pub trait Texture: Send + Sync {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// Constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.albedo
    }
}

/// 3D checker pattern alternating between two textures.
#[derive(Clone)]
pub struct CheckerTexture {
    frequency: f32,
    odd: Arc<dyn Texture>,
    even: Arc<dyn Texture>,
}

impl CheckerTexture {
    pub fn new(odd: Arc<dyn Texture>, even: Arc<dyn Texture>) -> Self {
        Self {
            frequency: 10.0,
            odd,
            even,
        }
    }

    pub fn from_colors(odd: Color, even: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(odd)), Arc::new(SolidColor::new(even)))
    }

    /// Angular frequency of the sine lattice; higher means smaller checks.
    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let f = self.frequency;
        let sines = (f * p.x).sin() * (f * p.y).sin() * (f * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// How a [`NoiseTexture`] maps Perlin noise to gray levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseStyle {
    /// Plain noise remapped from [-1, 1] to [0, 1].
    Smooth,
    /// Absolute sum of octaves, camouflage-like.
    Turbulence,
    /// Sine bands along z phase-shifted by turbulence.
    Marble,
}

/// Procedural Perlin-noise texture.
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
    style: NoiseStyle,
}

impl NoiseTexture {
    pub fn new(scale: f32, style: NoiseStyle, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
            style,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let gray = match self.style {
            NoiseStyle::Smooth => 0.5 * (1.0 + self.noise.noise(self.scale * p)),
            NoiseStyle::Turbulence => self.noise.turbulence(self.scale * p, TURBULENCE_DEPTH),
            NoiseStyle::Marble => {
                let phase = self.scale * p.z + 10.0 * self.noise.turbulence(p, TURBULENCE_DEPTH);
                0.5 * (1.0 + phase.sin())
            }
        };
        Color::splat(gray)
    }
}

/// Texture backed by a decoded RGB8 image, row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageTexture {
    /// Wrap a row-major RGB buffer of `width * height * 3` bytes.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> TextureResult<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(TextureError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode an image file with the `image` crate.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Self::from_rgb8(width, height, rgb.into_raw())
    }

    /// Pixel indices for `(u, v)`, with `v = 1` mapping to row 0 and both
    /// coordinates clamped to the image edges.
    fn pixel_coords(&self, u: f32, v: f32) -> (usize, usize) {
        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * self.width as f32) as usize).min(self.width as usize - 1);
        let j = ((v * self.height as f32) as usize).min(self.height as usize - 1);
        (i, j)
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        if self.data.is_empty() {
            // Debugging aid for a missing image.
            return Color::new(0.0, 1.0, 1.0);
        }

        let (i, j) = self.pixel_coords(u, v);
        let idx = 3 * (j * self.width as usize + i);
        let scale = 1.0 / 255.0;
        Color::new(
            self.data[idx] as f32 * scale,
            self.data[idx + 1] as f32 * scale,
            self.data[idx + 2] as f32 * scale,
        )
    }
}
