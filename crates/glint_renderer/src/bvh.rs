//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over the scene's primitives. Each level picks a random
//! axis, sorts its primitives by bounding-box minimum along it and splits
//! the list in half, which gives balanced trees in expectation without a
//! surface-area heuristic.

use crate::error::{SceneError, SceneResult};
use crate::{HitRecord, Hittable};
use glint_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 2;

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with one or two primitives.
    Leaf {
        objects: Vec<Arc<dyn Hittable>>,
        bbox: Aabb,
    },
}

/// A primitive paired with its cached bounds for the build.
type Entry = (Arc<dyn Hittable>, Aabb);

impl BvhNode {
    /// Build a BVH over `objects` valid for the shutter interval
    /// `[time0, time1]`.
    ///
    /// Fails if the list is empty or if any primitive cannot report a
    /// bounding box; the error names the offending index.
    pub fn new(
        objects: Vec<Arc<dyn Hittable>>,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> SceneResult<Self> {
        if objects.is_empty() {
            return Err(SceneError::EmptyScene);
        }

        let entries = objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| match object.bounding_box(time0, time1) {
                Some(bbox) => Ok((object, bbox)),
                None => Err(SceneError::MissingBoundingBox { index, time0, time1 }),
            })
            .collect::<SceneResult<Vec<Entry>>>()?;

        let count = entries.len();
        let node = Self::build(entries, rng);

        log::debug!(
            "Built BVH: {} primitives, depth {}, bounds {:?}",
            count,
            node.depth(),
            node.bbox()
        );

        Ok(node)
    }

    /// Recursive median split on a random axis.
    fn build(mut entries: Vec<Entry>, rng: &mut dyn RngCore) -> Self {
        let bounds = entries
            .iter()
            .map(|(_, bbox)| *bbox)
            .reduce(|acc, bbox| Aabb::surrounding(&acc, &bbox))
            .unwrap_or(Aabb::EMPTY);

        if entries.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects: entries.into_iter().map(|(object, _)| object).collect(),
                bbox: bounds,
            };
        }

        let axis = rng.gen_range(0..3);
        entries.sort_unstable_by(|(_, a), (_, b)| {
            a.axis_interval(axis)
                .min
                .total_cmp(&b.axis_interval(axis).min)
        });

        // Split at midpoint
        let mid = entries.len() / 2;
        let right_entries = entries.split_off(mid);

        let left = Self::build(entries, rng);
        let right = Self::build(right_entries, rng);
        debug_assert!(bounds.contains_box(&left.bbox()) && bounds.contains_box(&right.bbox()));

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Number of levels, counting a lone leaf as 1.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if !self.bbox().hit(ray, ray_t) {
            return None;
        }

        match self {
            BvhNode::Leaf { objects, .. } => {
                let mut closest: Option<HitRecord<'a>> = None;
                for object in objects {
                    let interval = ray_t.with_max(closest.map_or(ray_t.max, |rec| rec.t));
                    if let Some(rec) = object.hit(ray, interval, rng) {
                        closest = Some(rec);
                    }
                }
                closest
            }

            BvhNode::Branch { left, right, .. } => {
                let hit_left = left.hit(ray, ray_t, rng);

                // Right is always tested; a left hit only shortens its range.
                let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, ray_t.with_max(right_max), rng);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.bbox())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::gen_range_f32;
    use crate::{AaRect, HittableList, Lambertian, Material, MovingSphere, Sphere};
    use glint_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Unbounded;

    impl Hittable for Unbounded {
        fn hit<'a>(
            &'a self,
            _ray: &Ray,
            _ray_t: Interval,
            _rng: &mut dyn RngCore,
        ) -> Option<HitRecord<'a>> {
            None
        }

        fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
            None
        }
    }

    fn random_scene(rng: &mut StdRng, count: usize) -> Vec<Arc<dyn Hittable>> {
        (0..count)
            .map(|i| {
                let material: Arc<dyn Material> =
                    Arc::new(Lambertian::from_color(Vec3::splat(0.5)));
                let center = Vec3::new(
                    gen_range_f32(rng, -10.0, 10.0),
                    gen_range_f32(rng, -10.0, 10.0),
                    gen_range_f32(rng, -10.0, 10.0),
                );
                let object: Arc<dyn Hittable> = match i % 3 {
                    0 => Arc::new(Sphere::new(center, gen_range_f32(rng, 0.2, 1.5), material)),
                    1 => Arc::new(MovingSphere::new(
                        center,
                        center + Vec3::new(0.0, 0.5, 0.0),
                        0.0,
                        1.0,
                        0.7,
                        material,
                    )),
                    _ => Arc::new(AaRect::xy(
                        center.x,
                        center.x + 1.5,
                        center.y,
                        center.y + 1.0,
                        center.z,
                        material,
                    )),
                };
                object
            })
            .collect()
    }

    fn same_material(a: &dyn Material, b: &dyn Material) -> bool {
        std::ptr::eq(
            a as *const dyn Material as *const u8,
            b as *const dyn Material as *const u8,
        )
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let objects = random_scene(&mut rng, 120);
        let list = HittableList::from_objects(objects.clone());
        let bvh = BvhNode::new(objects, 0.0, 1.0, &mut rng).expect("all primitives bounded");

        let mut hits = 0;
        for _ in 0..500 {
            let origin = Vec3::new(
                gen_range_f32(&mut rng, -15.0, 15.0),
                gen_range_f32(&mut rng, -15.0, 15.0),
                gen_range_f32(&mut rng, -15.0, 15.0),
            );
            let target = Vec3::new(
                gen_range_f32(&mut rng, -8.0, 8.0),
                gen_range_f32(&mut rng, -8.0, 8.0),
                gen_range_f32(&mut rng, -8.0, 8.0),
            );
            let time = gen_range_f32(&mut rng, 0.0, 1.0);
            let ray = Ray::new(origin, target - origin, time);
            let range = Interval::new(0.001, f32::INFINITY);

            let expected = list.hit(&ray, range, &mut rng);
            let actual = bvh.hit(&ray, range, &mut rng);

            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => {
                    hits += 1;
                    assert!((e.t - a.t).abs() < 1e-5, "t {} vs {}", e.t, a.t);
                    assert!(same_material(e.material, a.material));
                }
                (e, a) => panic!("brute force hit={} but bvh hit={}", e.is_some(), a.is_some()),
            }
        }

        // The scene is dense enough that most rays hit something.
        assert!(hits > 100);
    }

    #[test]
    fn test_bvh_single_primitive_is_leaf() {
        let mut rng = StdRng::seed_from_u64(1);
        let sphere: Arc<dyn Hittable> = Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::from_color(Vec3::splat(0.5))),
        ));

        let bvh = BvhNode::new(vec![sphere], 0.0, 1.0, &mut rng).expect("bounded");
        assert!(matches!(bvh, BvhNode::Leaf { .. }));
        assert_eq!(bvh.depth(), 1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = bvh
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .expect("ray should hit");
        assert!((rec.p.z - (-0.5)).abs() < 1e-4);
    }

    #[test]
    fn test_bvh_is_balanced() {
        let mut rng = StdRng::seed_from_u64(2);
        let objects = random_scene(&mut rng, 64);
        let bvh = BvhNode::new(objects, 0.0, 1.0, &mut rng).expect("bounded");

        // Midpoint splits: 64 -> 32 -> ... -> 2 gives 6 levels.
        assert_eq!(bvh.depth(), 6);
    }

    #[test]
    fn test_bvh_rejects_empty_list() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            BvhNode::new(Vec::new(), 0.0, 1.0, &mut rng),
            Err(SceneError::EmptyScene)
        ));
    }

    #[test]
    fn test_bvh_rejects_unbounded_primitive() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut objects = random_scene(&mut rng, 4);
        objects.insert(2, Arc::new(Unbounded));

        let err = BvhNode::new(objects, 0.0, 1.0, &mut rng).err();
        assert_eq!(
            err,
            Some(SceneError::MissingBoundingBox {
                index: 2,
                time0: 0.0,
                time1: 1.0
            })
        );
    }
}
