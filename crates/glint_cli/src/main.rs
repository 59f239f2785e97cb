//! Glint command line renderer.
//!
//! Renders one of the built-in demo scenes with the bucketed parallel path
//! tracer and writes a PPM or PNG.

mod output;
mod scenes;

use anyhow::{Context, Result};
use clap::Parser;
use glint_renderer::{render_parallel, RenderConfig, RenderError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scenes::SceneKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    name = "glint",
    version,
    about = "Monte Carlo path tracer rendering built-in demo scenes"
)]
struct Args {
    /// Scene to render
    #[arg(value_enum, default_value = "cornell")]
    scene: SceneKind,

    #[arg(short = 'W', long, default_value_t = 600)]
    width: u32,

    #[arg(short = 'H', long, default_value_t = 600)]
    height: u32,

    /// Samples per pixel
    #[arg(short, long)]
    spp: Option<u32>,

    /// Maximum path depth
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Seed for scene layout and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads; defaults to one per core
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Output image, `.ppm` or any extension the image crate encodes
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// JSON render config; explicit flags take precedence over its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Equirectangular earth map for the final scene
    #[arg(long)]
    earth: Option<PathBuf>,
}

impl Args {
    /// Layer the flags over `base`.
    fn apply_overrides(&self, mut base: RenderConfig) -> RenderConfig {
        if let Some(spp) = self.spp {
            base.samples_per_pixel = spp;
        }
        if let Some(max_depth) = self.max_depth {
            base.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            base.seed = seed;
        }
        base
    }
}

fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring render thread pool")?;
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let handler_cancel = cancel.clone();
        ctrlc::set_handler(move || {
            log::warn!("Interrupt received, stopping render");
            handler_cancel.store(true, Ordering::Relaxed);
        })
        .context("installing interrupt handler")?;
    }

    let file_config = args.config.as_deref().map(load_config).transpose()?;
    let seed = args
        .seed
        .or(file_config.as_ref().map(|config| config.seed))
        .unwrap_or_default();

    let start = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let demo = scenes::build(args.scene, &mut rng, args.earth.as_deref())?;
    log::info!("Scene built in {:.2?}", start.elapsed());

    // Without a config file the scene decides what escaping rays see.
    let base = file_config.unwrap_or_else(|| RenderConfig {
        background: demo.background,
        use_sky_gradient: demo.use_sky_gradient,
        ..RenderConfig::default()
    });
    let config = args.apply_overrides(base);

    let mut camera = demo.camera.with_resolution(args.width, args.height);
    camera.initialize().context("invalid camera")?;

    let image = match render_parallel(&camera, &demo.scene, &config, &cancel) {
        Ok(image) => image,
        Err(err @ RenderError::Cancelled) => {
            log::warn!("Render cancelled, nothing written");
            return Err(err.into());
        }
    };

    output::save_image(&image, &args.output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["glint"]).expect("defaults parse");
        assert_eq!(args.scene, SceneKind::Cornell);
        assert_eq!((args.width, args.height), (600, 600));
        assert_eq!(args.apply_overrides(RenderConfig::default()), RenderConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from(["glint", "final", "--spp", "16", "-d", "8", "--seed", "3"])
            .expect("flags parse");
        assert_eq!(args.scene, SceneKind::Final);

        let base = RenderConfig {
            samples_per_pixel: 500,
            bucket_size: 16,
            ..RenderConfig::default()
        };
        let config = args.apply_overrides(base);
        assert_eq!(config.samples_per_pixel, 16);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.seed, 3);
        assert_eq!(config.bucket_size, 16);
    }

    #[test]
    fn test_scene_names() {
        let args = Args::try_parse_from(["glint", "cornell-smoke"]).expect("kebab-case scene name");
        assert_eq!(args.scene, SceneKind::CornellSmoke);
        assert!(Args::try_parse_from(["glint", "teapot"]).is_err());
    }

    #[test]
    fn test_load_config_rejects_garbage() {
        let dir = std::env::temp_dir().join(format!("glint-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("bad.json");
        std::fs::write(&path, "{ not json").expect("write temp file");
        assert!(load_config(&path).is_err());

        std::fs::write(&path, r#"{ "samples_per_pixel": 12 }"#).expect("write temp file");
        let config = load_config(&path).expect("partial config parses");
        assert_eq!(config.samples_per_pixel, 12);
        assert_eq!(config.max_depth, 50);

        std::fs::remove_dir_all(&dir).ok();
    }
}
