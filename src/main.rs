use std::{fmt::Display, fs::File, path::PathBuf, time::Instant};

use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;
use rasterizer::{
    render::{
        animator::Animator,
        canvas::ImageFormat,
        projection::ProjectionMode,
        renderer::{RenderSettings, Renderer},
        shading::ShadingMode,
    },
    yaml,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Png,
    Ppm,
    /// Animated camera flight
    Gif,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Ppm => write!(f, "ppm"),
            OutputFormat::Gif => write!(f, "gif"),
        }
    }
}

/// Software rasterizer
/// Renders polygon scenes from yaml files with back-face culling, perspective or axonometric
/// projection and flat, gouraud or toon shading.
/// Supports platonic solids, surfaces of revolution, height fields and .obj models
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// The scene file to render
    scene_file: PathBuf,

    /// The format of the output. `gif` renders the scene's camera flight
    #[clap(short = 'f', long, default_value = "png")]
    format: OutputFormat,

    /// The output path of the rendered image.
    /// By default it's `./<scene_filename>.<format>`
    #[clap(short, long)]
    output_path: Option<PathBuf>,

    #[clap(long, help = format!("Width (in pixels) of the output image.
Overrides the one in the scene file. If not specified anywhere, defaults to {}", RenderSettings::DEFAULT_WIDTH))]
    width: Option<usize>,

    #[clap(long, help = format!("Height (in pixels) of the output image.
Overrides the one in the scene file. If not specified anywhere, defaults to {}", RenderSettings::DEFAULT_HEIGHT))]
    height: Option<usize>,

    /// Overrides the one in the scene file
    #[clap(short, long)]
    projection: Option<ProjectionMode>,

    /// Overrides the one in the scene file
    #[clap(short, long)]
    shading: Option<ShadingMode>,

    /// Resolve depth by sorting polygons instead of using the z-buffer
    #[clap(long)]
    painter: bool,

    /// Distance (in pixels) from the eye to the perspective image plane.
    /// Overrides the one in the scene file
    #[clap(long)]
    view_distance: Option<f64>,

    /// Rasterize on a single thread
    #[clap(long)]
    sequential: bool,

    /// Frames per second of the gif.
    /// Overrides the one in the scene file
    #[clap(long)]
    framerate: Option<u32>,
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scene_source = std::fs::read_to_string(&args.scene_file)
        .map_err(|e| format!("Failed to read scene file: {}", e))?;
    let mut config = yaml::parse_file(&scene_source, &args.scene_file)
        .map_err(|e| format!("Failed to parse scene: {}", e))?;

    let settings_builder = &mut config.settings_builder;
    if let Some(width) = args.width {
        settings_builder.width(width);
    }
    if let Some(height) = args.height {
        settings_builder.height(height);
    }
    if let Some(projection) = args.projection {
        settings_builder.projection(projection);
    }
    if let Some(shading) = args.shading {
        settings_builder.shading(shading);
    }
    if args.painter {
        settings_builder.z_buffer(false);
    }
    if let Some(view_distance) = args.view_distance {
        settings_builder.view_distance(view_distance);
    }
    if args.sequential {
        settings_builder.parallel(false);
    }

    let settings = settings_builder
        .build()
        .map_err(|e| format!("Invalid render settings: {}", e))?;
    let scene = config
        .scene_builder
        .build()
        .map_err(|e| format!("Invalid scene: {}", e))?;
    let camera = config
        .camera_builder
        .build()
        .map_err(|e| format!("Invalid camera: {}", e))?;
    info!(
        "{} objects, {}x{} {} projection, {} shading, {} depth",
        scene.objects().len(),
        settings.width(),
        settings.height(),
        settings.projection().mode(),
        settings.shading(),
        settings.depth_resolution()
    );
    let renderer = Renderer::new(scene, camera, settings);

    let output_path = match args.output_path {
        Some(path) => path,
        None => {
            let mut path: PathBuf = args
                .scene_file
                .file_name()
                .ok_or_else(|| format!("{:?} is not a file", args.scene_file))?
                .into();
            path.set_extension(args.format.to_string());
            path
        }
    };
    let file =
        File::create(&output_path).map_err(|e| format!("Failed to create output file: {}", e))?;

    let now = Instant::now();
    match args.format {
        OutputFormat::Gif => {
            let framerate = args
                .framerate
                .or(config.animation_framerate)
                .unwrap_or(Animator::DEFAULT_FRAMERATE);
            let animator = Animator::new(renderer, config.flight, framerate)
                .ok_or("Framerate must be positive")?;
            animator
                .render_to_gif(file)
                .map_err(|e| format!("Failed to save animation: {}", e))?;
            info!("render time: {:?}", now.elapsed());
        }
        OutputFormat::Png | OutputFormat::Ppm => {
            let (canvas, stats) = renderer.render_with_stats();
            info!("render time: {:?}", now.elapsed());
            info!("{stats}");

            let format = match args.format {
                OutputFormat::Ppm => ImageFormat::Ppm,
                _ => ImageFormat::Png,
            };
            canvas
                .write_image(file, format)
                .map_err(|e| format!("Failed to save image: {}", e))?;
        }
    }
    info!("saved to {:?}", output_path);
    Ok(())
}
