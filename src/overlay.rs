use anyhow::{Context, Result};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{BoundingBox, Contour, Frame};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

/// How boxes are rendered by an overlay sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paint {
    pub style: PaintStyle,
    /// RGBA
    pub color: [u8; 4],
}

impl Paint {
    pub const LIME: [u8; 4] = [0, 255, 0, 255];
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            style: PaintStyle::Fill,
            color: Self::LIME,
        }
    }
}

/// Consumer of one frame's boxes
pub trait OverlaySink {
    fn draw(&mut self, boxes: &[BoundingBox], paint: &Paint) -> Result<()>;

    /// Forget whatever the last frame drew
    fn clear(&mut self);
}

/// Draw boxes onto an RGBA canvas, clipped to its bounds
pub fn draw_boxes(canvas: &mut RgbaImage, boxes: &[BoundingBox], paint: &Paint) {
    let color = Rgba(paint.color);
    for bbox in boxes {
        if bbox.width == 0 || bbox.height == 0 {
            continue;
        }
        let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
        match paint.style {
            PaintStyle::Fill => draw_filled_rect_mut(canvas, rect, color),
            PaintStyle::Stroke => draw_hollow_rect_mut(canvas, rect, color),
        }
    }
}

/// Outer borders in green, holes in red, on black
pub fn render_contours(width: u32, height: u32, contours: &[Contour]) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    for contour in contours {
        let color = if contour.is_hole() {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 255, 0])
        };
        let n = contour.points.len();
        for i in 0..n {
            let p = contour.points[i];
            let q = contour.points[(i + 1) % n];
            draw_line_segment_mut(
                &mut canvas,
                (p.x as f32, p.y as f32),
                (q.x as f32, q.y as f32),
                color,
            );
        }
    }
    canvas
}

/// Renders boxes over a copy of the frame they were detected in
pub struct CanvasOverlay {
    background: RgbaImage,
    canvas: RgbaImage,
}

impl CanvasOverlay {
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let rgb = frame
            .to_rgb_image()
            .context("Frame buffer is too small to render")?;
        let background = image::DynamicImage::ImageRgb8(rgb).to_rgba8();
        Ok(Self {
            canvas: background.clone(),
            background,
        })
    }

    /// Replace the background with a new frame, dropping any drawn boxes
    pub fn set_frame(&mut self, frame: &Frame) -> Result<()> {
        *self = Self::from_frame(frame)?;
        Ok(())
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.canvas
            .save(path)
            .with_context(|| format!("Failed to save overlay: {}", path.display()))
    }
}

impl OverlaySink for CanvasOverlay {
    fn draw(&mut self, boxes: &[BoundingBox], paint: &Paint) -> Result<()> {
        self.canvas = self.background.clone();
        draw_boxes(&mut self.canvas, boxes, paint);
        Ok(())
    }

    fn clear(&mut self) {
        self.canvas = self.background.clone();
    }
}

/// Keeps the most recent boxes instead of drawing them
#[derive(Debug, Default, Clone)]
pub struct RecordingOverlay {
    pub boxes: Vec<BoundingBox>,
    pub paint: Option<Paint>,
    pub draws: usize,
    pub clears: usize,
}

impl OverlaySink for RecordingOverlay {
    fn draw(&mut self, boxes: &[BoundingBox], paint: &Paint) -> Result<()> {
        self.boxes = boxes.to_vec();
        self.paint = Some(*paint);
        self.draws += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.boxes.clear();
        self.clears += 1;
    }
}
