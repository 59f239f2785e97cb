//! A renderable scene: the world plus the shapes used for light sampling.

use crate::error::SceneResult;
use crate::{BvhNode, Hittable, HittableList};
use rand::RngCore;
use std::sync::Arc;

/// Root geometry and designated lights, read-only while rendering.
///
/// `lights` are only used to steer sampling; anything that should be
/// visible must also be part of `world`.
#[derive(Clone)]
pub struct Scene {
    world: Arc<dyn Hittable>,
    lights: HittableList,
}

impl Scene {
    pub fn new(world: Arc<dyn Hittable>, lights: HittableList) -> Self {
        Self { world, lights }
    }

    /// Wrap `objects` in a BVH built for the shutter interval
    /// `[time0, time1]`.
    pub fn with_bvh(
        objects: HittableList,
        lights: HittableList,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> SceneResult<Self> {
        let bvh = BvhNode::new(objects.into_objects(), time0, time1, rng)?;
        Ok(Self::new(Arc::new(bvh), lights))
    }

    pub fn world(&self) -> &dyn Hittable {
        self.world.as_ref()
    }

    pub fn lights(&self) -> &HittableList {
        &self.lights
    }

    pub fn has_lights(&self) -> bool {
        !self.lights.is_empty()
    }
}
