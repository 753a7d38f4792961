use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

use crate::config::AnalyzerConfig;
use crate::detection::{downscale, filter_regions, find_boundaries, segment_into};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{BoundingBox, Contour, Frame, Mask};
use crate::overlay;

/// Per-frame state machine. Stages run strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Idle,
    Downscaling,
    Segmenting,
    ExtractingContours,
    Filtering,
    Done,
}

impl PipelineStage {
    pub fn next(self) -> Self {
        match self {
            PipelineStage::Idle => PipelineStage::Downscaling,
            PipelineStage::Downscaling => PipelineStage::Segmenting,
            PipelineStage::Segmenting => PipelineStage::ExtractingContours,
            PipelineStage::ExtractingContours => PipelineStage::Filtering,
            PipelineStage::Filtering | PipelineStage::Done => PipelineStage::Done,
        }
    }

    /// Human-readable name (used in logs and debug output)
    pub fn name(&self) -> &str {
        match self {
            PipelineStage::Idle => "Idle",
            PipelineStage::Downscaling => "Downscaling",
            PipelineStage::Segmenting => "Color Segmentation",
            PipelineStage::ExtractingContours => "Contour Extraction",
            PipelineStage::Filtering => "Region Filtering",
            PipelineStage::Done => "Done",
        }
    }
}

/// Intermediate artefact of a partial run
#[derive(Debug, Clone)]
pub enum StageOutput {
    Input(Frame),
    Downscaled(Frame),
    Mask(Mask),
    Contours(Vec<Contour>),
    Boxes(Vec<BoundingBox>),
}

/// Working memory recycled between frames by whoever owns it.
///
/// Never share one instance between concurrent calls.
#[derive(Debug, Default)]
pub struct FrameBuffers {
    mask: Vec<u8>,
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to every stage
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Frame analysis pipeline: downscale, segment, extract contours, filter.
///
/// Holds only static configuration; every call is independent of the ones
/// before it.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: AnalyzerConfig,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            context: PipelineContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Analyze one frame with freshly allocated buffers
    pub fn run(&self, frame: &Frame) -> AnalysisResult<Vec<BoundingBox>> {
        self.run_with(frame, &mut FrameBuffers::default())
    }

    /// Analyze one frame, recycling `buffers` for the working mask
    pub fn run_with(
        &self,
        frame: &Frame,
        buffers: &mut FrameBuffers,
    ) -> AnalysisResult<Vec<BoundingBox>> {
        let mut stage = PipelineStage::Idle;

        advance(&mut stage);
        let small = self.downscale_stage(frame).inspect_err(|e| failed(stage, e))?;

        advance(&mut stage);
        let mask = self
            .segment_stage(&small, std::mem::take(&mut buffers.mask))
            .inspect_err(|e| failed(stage, e))?;

        advance(&mut stage);
        let contours = self.extract_stage(&mask).inspect_err(|e| failed(stage, e))?;

        advance(&mut stage);
        let boxes = self.filter_stage(&contours);

        if self.debug_enabled() {
            self.save_debug_output(frame, &small, &mask, &contours, &boxes);
        }
        buffers.mask = mask.into_raw();

        advance(&mut stage);
        Ok(boxes)
    }

    /// Run the pipeline but stop after `stop` (useful for debugging)
    pub fn run_until(&self, frame: &Frame, stop: PipelineStage) -> AnalysisResult<StageOutput> {
        if stop == PipelineStage::Idle {
            return Ok(StageOutput::Input(frame.clone()));
        }
        let small = self.downscale_stage(frame)?;
        if stop == PipelineStage::Downscaling {
            return Ok(StageOutput::Downscaled(small));
        }
        let mask = self.segment_stage(&small, Vec::new())?;
        if stop == PipelineStage::Segmenting {
            return Ok(StageOutput::Mask(mask));
        }
        let contours = self.extract_stage(&mask)?;
        if stop == PipelineStage::ExtractingContours {
            return Ok(StageOutput::Contours(contours));
        }
        Ok(StageOutput::Boxes(self.filter_stage(&contours)))
    }

    fn downscale_stage(&self, frame: &Frame) -> AnalysisResult<Frame> {
        if frame.layout != self.config.input_layout {
            return Err(AnalysisError::UnsupportedLayout(format!(
                "frame is {:?}, configured for {:?}",
                frame.layout, self.config.input_layout
            )));
        }
        let small = downscale(
            frame,
            self.config.divisor,
            self.config.analysis_layout,
            self.config.channel_type,
            self.config.resize_filter.into(),
        )?;
        debug!(
            "Downscaled frame {} from {}x{} to {}x{}",
            frame.sequence, frame.width, frame.height, small.width, small.height
        );
        Ok(small)
    }

    fn segment_stage(&self, small: &Frame, buffer: Vec<u8>) -> AnalysisResult<Mask> {
        let mask = segment_into(small, &self.config.hue_range, self.config.hue_scale, buffer)?;
        debug!("Mask selects {} pixels", mask.selected_count());
        Ok(mask)
    }

    fn extract_stage(&self, mask: &Mask) -> AnalysisResult<Vec<Contour>> {
        let contours = find_boundaries(mask)?;
        debug!("Found {} contours", contours.len());
        Ok(contours)
    }

    fn filter_stage(&self, contours: &[Contour]) -> Vec<BoundingBox> {
        for (i, contour) in contours.iter().enumerate() {
            if self.context.verbose {
                info!(
                    "  Contour {}: {:?}, area={:.1}, points={}",
                    i + 1,
                    contour.kind,
                    contour.area(),
                    contour.points.len()
                );
            } else {
                trace!("Contour {}: area={:.1}", i + 1, contour.area());
            }
        }
        let boxes = filter_regions(contours, self.config.min_area, self.config.divisor);
        debug!(
            "Kept {} of {} contours above area {}",
            boxes.len(),
            contours.len(),
            self.config.min_area
        );
        boxes
    }

    fn debug_enabled(&self) -> bool {
        self.context.debug.as_ref().is_some_and(|d| d.enabled)
    }

    // Debug dumps never fail the frame; problems are only logged.
    fn save_debug_output(
        &self,
        frame: &Frame,
        small: &Frame,
        mask: &Mask,
        contours: &[Contour],
        boxes: &[BoundingBox],
    ) {
        let Some(debug_config) = &self.context.debug else {
            return;
        };
        let frame_dir = debug_config.output_dir.join(format!("{:05}", frame.sequence));
        if let Err(e) = write_debug_images(&frame_dir, frame, small, mask, contours, boxes, &self.config) {
            warn!("Failed to save debug output to {}: {:#}", frame_dir.display(), e);
        } else if self.context.verbose {
            info!("  Debug: saved {}/", frame_dir.display());
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

fn advance(stage: &mut PipelineStage) {
    let next = stage.next();
    trace!("{} -> {}", stage.name(), next.name());
    *stage = next;
}

fn failed(stage: PipelineStage, error: &AnalysisError) {
    debug!("Frame aborted during {}: {}", stage.name(), error);
}

fn write_debug_images(
    dir: &Path,
    frame: &Frame,
    small: &Frame,
    mask: &Mask,
    contours: &[Contour],
    boxes: &[BoundingBox],
    config: &AnalyzerConfig,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    if let Some(img) = small.to_rgb_image() {
        img.save(dir.join("downscaled.png"))?;
    }
    mask.as_gray().save(dir.join("mask.png"))?;
    overlay::render_contours(mask.width(), mask.height(), contours).save(dir.join("contours.png"))?;

    if let Some(img) = frame.to_rgb_image() {
        let mut canvas = image::DynamicImage::ImageRgb8(img).to_rgba8();
        overlay::draw_boxes(&mut canvas, boxes, &config.paint);
        canvas.save(dir.join("boxes.png"))?;
    }
    Ok(())
}
