use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};

use crate::models::{Frame, PixelLayout};

/// Supplier of raw frames, one per call
pub trait FrameSource {
    /// `Ok(None)` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Pack a decoded image into a frame of the requested layout
pub fn frame_from_image(img: &DynamicImage, layout: PixelLayout) -> Frame {
    let (width, height) = (img.width(), img.height());
    let data = match layout {
        PixelLayout::Rgb => img.to_rgb8().into_raw(),
        PixelLayout::Rgba => img.to_rgba8().into_raw(),
        PixelLayout::Bgr => {
            let mut data = img.to_rgb8().into_raw();
            data.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
            data
        }
        PixelLayout::Bgra => {
            let mut data = img.to_rgba8().into_raw();
            data.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
            data
        }
    };
    Frame::new(width, height, layout, data)
}

/// Frames decoded from a list of image files, in order.
///
/// A file that fails to open or decode is reported once; the next call
/// moves on to the following file.
pub struct ImageFileSource {
    paths: std::vec::IntoIter<PathBuf>,
    layout: PixelLayout,
    sequence: u64,
    last_path: Option<PathBuf>,
}

impl ImageFileSource {
    pub fn new(paths: Vec<PathBuf>, layout: PixelLayout) -> Self {
        Self {
            paths: paths.into_iter(),
            layout,
            sequence: 0,
            last_path: None,
        }
    }

    /// Path of the most recent `next_frame` call, whether it decoded or not
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.paths.next() else {
            self.last_path = None;
            return Ok(None);
        };
        self.last_path = Some(path.clone());
        let img = ImageReader::open(&path)
            .with_context(|| format!("Failed to open image: {}", path.display()))?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;

        let frame = frame_from_image(&img, self.layout).with_sequence(self.sequence);
        self.sequence += 1;
        Ok(Some(frame))
    }
}

/// Frames already held in memory; handy for replaying captures
pub struct MemorySource {
    frames: std::collections::VecDeque<Frame>,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for MemorySource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}
