//! Built-in demo scenes.
//!
//! Every builder returns a camera without a resolution; the caller picks
//! one and initializes it.

use anyhow::{Context, Result};
use clap::ValueEnum;
use glint_math::{Color, Vec3};
use glint_renderer::{
    AaRect, BvhNode, Camera, CheckerTexture, ConstantMedium, Cuboid, Dielectric, DiffuseLight,
    FaceOrientation, Hittable, HittableList, ImageTexture, Lambertian, Material, Metal,
    MovingSphere, NoiseStyle, NoiseTexture, RotateY, Scene, Sphere, Translate,
};
use rand::rngs::StdRng;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

/// Selectable demo scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Cornell box with two rotated white boxes.
    Cornell,
    /// Cornell box with a glass sphere sampled alongside the ceiling light.
    CornellGlass,
    /// Cornell box whose boxes are replaced by smoke and fog.
    CornellSmoke,
    /// Two marble spheres under a sky.
    Perlin,
    /// Checkered ground with a field of small, partly moving spheres.
    Checker,
    /// Everything at once: ground boxes, volumes, textures and instancing.
    Final,
}

/// A scene plus how to view and light it.
pub struct DemoScene {
    pub camera: Camera,
    pub scene: Scene,
    /// Environment radiance for rays that escape.
    pub background: Color,
    pub use_sky_gradient: bool,
}

impl DemoScene {
    fn enclosed(camera: Camera, scene: Scene) -> Self {
        Self {
            camera,
            scene,
            background: Color::ZERO,
            use_sky_gradient: false,
        }
    }

    fn outdoor(camera: Camera, scene: Scene) -> Self {
        Self {
            camera,
            scene,
            background: Color::new(0.7, 0.8, 1.0),
            use_sky_gradient: true,
        }
    }
}

/// Build the selected scene. `earth` is an optional equirectangular image
/// used by [`SceneKind::Final`].
pub fn build(kind: SceneKind, rng: &mut StdRng, earth: Option<&Path>) -> Result<DemoScene> {
    log::info!("Building scene {kind:?}");
    match kind {
        SceneKind::Cornell => cornell_box(rng),
        SceneKind::CornellGlass => cornell_glass(rng),
        SceneKind::CornellSmoke => cornell_smoke(rng),
        SceneKind::Perlin => perlin_spheres(rng),
        SceneKind::Checker => checker_spheres(rng),
        SceneKind::Final => final_scene(rng, earth),
    }
}

fn lambertian(r: f32, g: f32, b: f32) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(Color::new(r, g, b)))
}

fn cornell_camera() -> Camera {
    Camera::new()
        .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0)
        .with_shutter(0.0, 1.0)
}

/// The five walls of the box. Ceiling light excluded.
fn cornell_walls() -> HittableList {
    let red = lambertian(0.65, 0.05, 0.05);
    let white = lambertian(0.73, 0.73, 0.73);
    let green = lambertian(0.12, 0.45, 0.15);

    let mut walls = HittableList::new();
    walls.add(Arc::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    walls.add(Arc::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    walls.add(Arc::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    walls.add(Arc::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    walls.add(Arc::new(AaRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white)));
    walls
}

/// Downward facing ceiling light.
fn ceiling_light(x0: f32, x1: f32, z0: f32, z1: f32, radiance: f32) -> Arc<dyn Hittable> {
    let emitter = Arc::new(DiffuseLight::new(Color::splat(radiance)).one_sided());
    Arc::new(AaRect::xz(x0, x1, z0, z1, 554.0, emitter).with_orientation(FaceOrientation::Negative))
}

/// Axis-aligned box of `size`, turned about its corner and moved into place.
fn placed_box(
    size: Vec3,
    degrees: f32,
    offset: Vec3,
    material: Arc<dyn Material>,
) -> Arc<dyn Hittable> {
    let cuboid: Arc<dyn Hittable> = Arc::new(Cuboid::new(Vec3::ZERO, size, material));
    Arc::new(Translate::new(Arc::new(RotateY::new(cuboid, degrees)), offset))
}

fn cornell_box(rng: &mut StdRng) -> Result<DemoScene> {
    let mut objects = cornell_walls();
    let light = ceiling_light(213.0, 343.0, 227.0, 332.0, 15.0);
    objects.add(light.clone());

    let white = lambertian(0.73, 0.73, 0.73);
    objects.add(placed_box(
        Vec3::splat(165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white.clone(),
    ));
    objects.add(placed_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white,
    ));

    let lights = HittableList::from_objects(vec![light]);
    let camera = cornell_camera();
    let (time0, time1) = camera.shutter();
    let scene = Scene::with_bvh(objects, lights, time0, time1, rng)?;
    Ok(DemoScene::enclosed(camera, scene))
}

fn cornell_glass(rng: &mut StdRng) -> Result<DemoScene> {
    let mut objects = cornell_walls();
    let light = ceiling_light(213.0, 343.0, 227.0, 332.0, 15.0);
    objects.add(light.clone());

    let glass: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::new(190.0, 90.0, 190.0),
        90.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    objects.add(glass.clone());
    objects.add(placed_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        lambertian(0.73, 0.73, 0.73),
    ));

    let lights = HittableList::from_objects(vec![light, glass]);
    let camera = cornell_camera();
    let (time0, time1) = camera.shutter();
    let scene = Scene::with_bvh(objects, lights, time0, time1, rng)?;
    Ok(DemoScene::enclosed(camera, scene))
}

fn cornell_smoke(rng: &mut StdRng) -> Result<DemoScene> {
    let mut objects = cornell_walls();
    let light = ceiling_light(113.0, 443.0, 127.0, 432.0, 7.0);
    objects.add(light.clone());

    let white = lambertian(0.73, 0.73, 0.73);
    let short = placed_box(Vec3::splat(165.0), -18.0, Vec3::new(130.0, 0.0, 65.0), white.clone());
    let tall = placed_box(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white,
    );
    objects.add(Arc::new(ConstantMedium::from_color(tall, 0.01, Color::ZERO)));
    objects.add(Arc::new(ConstantMedium::from_color(short, 0.01, Color::ONE)));

    let lights = HittableList::from_objects(vec![light]);
    let camera = cornell_camera();
    let (time0, time1) = camera.shutter();
    let scene = Scene::with_bvh(objects, lights, time0, time1, rng)?;
    Ok(DemoScene::enclosed(camera, scene))
}

fn outdoor_camera(aperture: f32) -> Camera {
    Camera::new()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, aperture, 10.0)
        .with_shutter(0.0, 1.0)
}

fn perlin_spheres(rng: &mut StdRng) -> Result<DemoScene> {
    let marble: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(NoiseTexture::new(
        4.0,
        NoiseStyle::Marble,
        rng,
    ))));

    let mut objects = HittableList::new();
    objects.add(Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        marble.clone(),
    )));
    objects.add(Arc::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble)));

    let camera = outdoor_camera(0.0);
    let (time0, time1) = camera.shutter();
    let scene = Scene::with_bvh(objects, HittableList::new(), time0, time1, rng)?;
    Ok(DemoScene::outdoor(camera, scene))
}

fn checker_spheres(rng: &mut StdRng) -> Result<DemoScene> {
    let mut objects = HittableList::new();

    let checker = CheckerTexture::from_colors(Color::new(0.2, 0.3, 0.1), Color::new(0.9, 0.9, 0.9));
    objects.add(Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(Arc::new(checker))),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f32 = rng.gen();
            if choose_mat < 0.8 {
                // Diffuse spheres bounce during the shutter interval.
                let albedo = Color::new(
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                );
                let center1 = center + Vec3::new(0.0, 0.5 * rng.gen::<f32>(), 0.0);
                objects.add(Arc::new(MovingSphere::new(
                    center,
                    center1,
                    0.0,
                    1.0,
                    0.2,
                    Arc::new(Lambertian::from_color(albedo)),
                )));
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                );
                let fuzz = 0.5 * rng.gen::<f32>();
                objects.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz)))));
            } else {
                objects.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5)))));
            }
        }
    }

    objects.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.add(Arc::new(Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0, lambertian(0.4, 0.2, 0.1))));
    objects.add(Arc::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    log::debug!("Checker scene has {} objects", objects.len());

    let camera = outdoor_camera(0.1);
    let (time0, time1) = camera.shutter();
    let scene = Scene::with_bvh(objects, HittableList::new(), time0, time1, rng)?;
    Ok(DemoScene::outdoor(camera, scene))
}

fn final_scene(rng: &mut StdRng, earth: Option<&Path>) -> Result<DemoScene> {
    let camera = Camera::new()
        .with_position(
            Vec3::new(478.0, 278.0, -600.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
        .with_shutter(0.0, 1.0);
    let (time0, time1) = camera.shutter();

    let mut objects = HittableList::new();

    let ground = lambertian(0.48, 0.83, 0.53);
    let boxes_per_side = 20;
    let mut ground_boxes = Vec::with_capacity(boxes_per_side * boxes_per_side);
    for i in 0..boxes_per_side {
        for j in 0..boxes_per_side {
            let w = 100.0;
            let x0 = -1000.0 + i as f32 * w;
            let z0 = -1000.0 + j as f32 * w;
            let y1 = rng.gen_range(1.0..101.0);
            let cuboid: Arc<dyn Hittable> = Arc::new(Cuboid::new(
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            ));
            ground_boxes.push(cuboid);
        }
    }
    objects.add(Arc::new(BvhNode::new(ground_boxes, time0, time1, rng)?));

    let light = ceiling_light(123.0, 423.0, 147.0, 412.0, 7.0);
    objects.add(light.clone());

    let center0 = Vec3::new(400.0, 400.0, 200.0);
    let center1 = center0 + Vec3::new(30.0, 0.0, 0.0);
    objects.add(Arc::new(MovingSphere::new(
        center0,
        center1,
        0.0,
        1.0,
        50.0,
        lambertian(0.7, 0.3, 0.1),
    )));
    objects.add(Arc::new(Sphere::new(
        Vec3::new(260.0, 150.0, 45.0),
        50.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.add(Arc::new(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0)),
    )));

    // Glass ball filled with blue fog.
    let boundary: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::new(360.0, 150.0, 145.0),
        70.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    objects.add(boundary.clone());
    objects.add(Arc::new(ConstantMedium::from_color(
        boundary,
        0.2,
        Color::new(0.2, 0.4, 0.9),
    )));

    // Thin mist over the whole scene.
    let mist: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::ZERO,
        5000.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    objects.add(Arc::new(ConstantMedium::from_color(mist, 0.0001, Color::ONE)));

    match earth {
        Some(path) => {
            let texture = ImageTexture::load(path)
                .with_context(|| format!("loading earth texture {}", path.display()))?;
            objects.add(Arc::new(Sphere::new(
                Vec3::new(400.0, 200.0, 400.0),
                100.0,
                Arc::new(Lambertian::new(Arc::new(texture))),
            )));
        }
        None => log::info!("No earth texture given, leaving the globe out"),
    }

    let marble = NoiseTexture::new(0.1, NoiseStyle::Marble, rng);
    objects.add(Arc::new(Sphere::new(
        Vec3::new(220.0, 280.0, 300.0),
        80.0,
        Arc::new(Lambertian::new(Arc::new(marble))),
    )));

    let white = lambertian(0.73, 0.73, 0.73);
    let cluster: Vec<Arc<dyn Hittable>> = (0..1000)
        .map(|_| {
            let center = Vec3::new(
                rng.gen_range(0.0..165.0),
                rng.gen_range(0.0..165.0),
                rng.gen_range(0.0..165.0),
            );
            Arc::new(Sphere::new(center, 10.0, white.clone())) as Arc<dyn Hittable>
        })
        .collect();
    let cluster: Arc<dyn Hittable> = Arc::new(BvhNode::new(cluster, time0, time1, rng)?);
    objects.add(Arc::new(Translate::new(
        Arc::new(RotateY::new(cluster, 15.0)),
        Vec3::new(-100.0, 270.0, 395.0),
    )));

    let lights = HittableList::from_objects(vec![light]);
    let scene = Scene::with_bvh(objects, lights, time0, time1, rng)?;
    Ok(DemoScene::enclosed(camera, scene))
}
