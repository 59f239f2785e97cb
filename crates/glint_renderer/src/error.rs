//! Error types for scene construction, texture loading and rendering.

use thiserror::Error;

/// Fatal configuration errors raised while building a scene or camera.
///
/// None of these are recoverable: rendering with a broken BVH or camera
/// would silently produce a wrong image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("primitive #{index} has no bounding box over [{time0}, {time1}] for the BVH")]
    MissingBoundingBox { index: usize, time0: f32, time1: f32 },

    #[error("cannot build a BVH from an empty object list")]
    EmptyScene,

    #[error("invalid camera: {0}")]
    InvalidCamera(String),
}

/// Errors that can occur while building an image texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGB")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Errors surfaced by the render drivers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    #[error("render cancelled")]
    Cancelled,
}

pub type SceneResult<T> = Result<T, SceneError>;
pub type TextureResult<T> = Result<T, TextureError>;
pub type RenderResult<T> = Result<T, RenderError>;
