use anyhow::Context;
use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;

use wormholes::{HoleCountConfig, HoleCounter, Preset, input_folder_name};
use wormholes::report::side_by_side;

#[derive(Parser)]
#[command(name = "wormholes")]
#[command(about = "Count hole regions in microscopy images")]
struct Cli {
    /// Input image files (e.g. WormHole_1H.tif WormHole_2H.tif)
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Parameter preset
    #[arg(long, value_enum, default_value_t = Preset::Circular)]
    preset: Preset,

    /// JSON config file (overrides --preset)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save every stage image under DIR/<NN>_<image name>/ (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Save each image with hole markers to DIR/<NN>_<image name>_holes.png
    #[arg(long, value_name = "DIR")]
    annotate_dir: Option<PathBuf>,

    /// Save all annotated images side by side into one figure
    #[arg(long, value_name = "FILE")]
    figure: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => HoleCountConfig::from_json_file(path)?,
        None => HoleCountConfig::from_preset(args.preset),
    };
    config.validate()?;
    tracing::debug!("Config: {:?}", config);

    if let Some(dir) = &args.annotate_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let mut panels = Vec::new();

    for (index, path) in args.images.iter().enumerate() {
        tracing::info!("Loading image: {}", path.display());
        let img = ImageReader::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;
        tracing::debug!("Image loaded: {}x{}", img.width(), img.height());

        let name = input_folder_name(index, path);
        let mut counter = HoleCounter::new(config.clone());
        if let Some(debug_dir) = &args.debug_out {
            counter = counter.with_debug(debug_dir.join(&name));
        }

        let report = counter.count(&img)?;
        println!("{}: {} holes", path.display(), report.count());

        if args.verbose {
            for (i, hole) in report.holes.iter().enumerate() {
                let (row, col) = hole.centroid();
                println!("  Hole {} at ({:.1}, {:.1}) - area: {}, circularity: {:.3}",
                        i + 1, col, row, hole.area(), hole.circularity());
            }
        }

        if args.annotate_dir.is_none() && args.figure.is_none() {
            continue;
        }

        let annotated = report.annotate(&img);
        if let Some(dir) = &args.annotate_dir {
            let out = dir.join(format!("{}_holes.png", name));
            annotated.save(&out)
                .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", out.display(), e))?;
            tracing::info!("{}: {} holes, annotated image saved to {}", path.display(), report.count(), out.display());
        }
        panels.push(annotated);
    }

    if let Some(figure) = &args.figure {
        side_by_side(&panels)
            .save(figure)
            .map_err(|e| anyhow::anyhow!("Failed to save figure {}: {}", figure.display(), e))?;
        tracing::info!("Figure saved to {}", figure.display());
    }

    Ok(())
}
