use clap::Parser;
use std::path::PathBuf;

use greenbox::models::Hsv;
use greenbox::overlay::OverlaySink;
use greenbox::{
    AnalyzerConfig, CanvasOverlay, FrameSession, FrameSource, HueScale, ImageFileSource, Pipeline,
    RecordingOverlay,
};

#[derive(Parser)]
#[command(name = "greenbox")]
#[command(about = "Find green regions in images and report their bounding boxes")]
struct Cli {
    /// Input image files, analyzed in order as frames
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// JSON config file; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Downscale divisor
    #[arg(long)]
    divisor: Option<u32>,

    /// Minimum contour area in downscaled pixels
    #[arg(long)]
    min_area: Option<f64>,

    /// Lower HSV bound, e.g. 30,60,60
    #[arg(long, value_name = "H,S,V", value_parser = parse_hsv)]
    lower: Option<Hsv>,

    /// Upper HSV bound, e.g. 50,255,255
    #[arg(long, value_name = "H,S,V", value_parser = parse_hsv)]
    upper: Option<Hsv>,

    /// Encode hue over 0..255 instead of 0..180
    #[arg(long)]
    full_hue: bool,

    /// Save each image with its boxes drawn into this directory
    #[arg(long, value_name = "DIR")]
    overlay_out: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print one JSON object per image
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_hsv(s: &str) -> Result<Hsv, String> {
    let parts: Vec<u8> = s
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid HSV component: {}", e))?;
    match parts.as_slice() {
        [h, s, v] => Ok(Hsv(*h, *s, *v)),
        _ => Err(format!("expected H,S,V, got '{}'", s)),
    }
}

fn build_config(args: &Cli) -> anyhow::Result<AnalyzerConfig> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::from_json_file(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(divisor) = args.divisor {
        config.divisor = divisor;
    }
    if let Some(min_area) = args.min_area {
        config.min_area = min_area;
    }
    if let Some(lower) = args.lower {
        config.hue_range.lower = lower;
    }
    if let Some(upper) = args.upper {
        config.hue_range.upper = upper;
    }
    if args.full_hue {
        config.hue_scale = HueScale::Full;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&args)?;
    tracing::debug!("Config: {:?}", config);

    let mut pipeline = Pipeline::new(config.clone()).with_verbose(args.verbose);
    if let Some(debug_dir) = args.debug_out.clone() {
        pipeline = pipeline.with_debug(debug_dir)?;
    }
    if let Some(dir) = &args.overlay_out {
        std::fs::create_dir_all(dir)?;
    }

    let mut source = ImageFileSource::new(args.images.clone(), config.input_layout);
    let mut session = FrameSession::new(pipeline, RecordingOverlay::default());
    let mut unreadable = 0;

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                eprintln!("{:#}", e);
                unreadable += 1;
                continue;
            }
        };
        let path = source
            .last_path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(format!("frame-{:05}", frame.sequence)));

        match session.process(&frame) {
            Ok(boxes) => {
                if args.json {
                    println!(
                        "{}",
                        serde_json::json!({
                            "image": path.display().to_string(),
                            "width": frame.width,
                            "height": frame.height,
                            "boxes": boxes,
                        })
                    );
                } else {
                    println!("{}: {} region(s)", path.display(), boxes.len());
                    for (i, bbox) in boxes.iter().enumerate() {
                        println!(
                            "  Region {} at ({}, {}) {}x{}",
                            i + 1,
                            bbox.x,
                            bbox.y,
                            bbox.width,
                            bbox.height
                        );
                    }
                }

                if let Some(dir) = &args.overlay_out {
                    let mut overlay = CanvasOverlay::from_frame(&frame)?;
                    overlay.draw(&boxes, &config.paint)?;
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| format!("{:05}", frame.sequence));
                    overlay.save(&dir.join(format!("{}_boxes.png", name)))?;
                }
            }
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }

    let stats = session.stats();
    if args.verbose {
        eprintln!(
            "Analyzed {} image(s), {} failed, {} unreadable, {} region(s) total",
            stats.processed, stats.failed, unreadable, stats.boxes
        );
    }

    Ok(())
}
