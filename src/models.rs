use image::GrayImage;
use imageproc::contours::BorderType;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Byte order of the color channels in a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelLayout {
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

impl PixelLayout {
    pub fn channels(&self) -> usize {
        match self {
            PixelLayout::Rgb | PixelLayout::Bgr => 3,
            PixelLayout::Rgba | PixelLayout::Bgra => 4,
        }
    }

    /// Offsets of red, green and blue inside one pixel
    pub fn rgb_offsets(&self) -> [usize; 3] {
        match self {
            PixelLayout::Rgb | PixelLayout::Rgba => [0, 1, 2],
            PixelLayout::Bgr | PixelLayout::Bgra => [2, 1, 0],
        }
    }

    pub fn alpha_offset(&self) -> Option<usize> {
        match self {
            PixelLayout::Rgba | PixelLayout::Bgra => Some(3),
            PixelLayout::Rgb | PixelLayout::Bgr => None,
        }
    }
}

/// Numeric type of a single channel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    U8,
    /// Normalized to 0.0..=1.0
    F32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameBuffer {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl FrameBuffer {
    pub fn len(&self) -> usize {
        match self {
            FrameBuffer::U8(data) => data.len(),
            FrameBuffer::F32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel_type(&self) -> ChannelType {
        match self {
            FrameBuffer::U8(_) => ChannelType::U8,
            FrameBuffer::F32(_) => ChannelType::F32,
        }
    }
}

/// One raw video frame as handed over by a frame source
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: FrameBuffer,
    /// Assigned by the frame source; only used to name debug output
    pub sequence: u64,
}

impl Frame {
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            layout,
            data: FrameBuffer::U8(data),
            sequence: 0,
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Number of channel values a well-formed buffer must hold
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels()
    }

    /// Channel values as bytes; only `F32` buffers are copied (quantized)
    pub fn to_u8(&self) -> Cow<'_, [u8]> {
        match &self.data {
            FrameBuffer::U8(data) => Cow::Borrowed(data),
            FrameBuffer::F32(data) => Cow::Owned(
                data.iter()
                    .map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
                    .collect(),
            ),
        }
    }

    /// RGB rendition of the frame, used for overlays and debug dumps
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        let bytes = self.to_u8();
        if bytes.len() < self.expected_len() {
            return None;
        }
        let channels = self.channels();
        let [r, g, b] = self.layout.rgb_offsets();
        let rgb: Vec<u8> = bytes[..self.expected_len()]
            .chunks_exact(channels)
            .flat_map(|px| [px[r], px[g], px[b]])
            .collect();
        image::RgbImage::from_raw(self.width, self.height, rgb)
    }
}

/// Hue, saturation, value triple in the 8-bit encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hsv(pub u8, pub u8, pub u8);

impl Hsv {
    pub fn hue(&self) -> u8 {
        self.0
    }

    pub fn saturation(&self) -> u8 {
        self.1
    }

    pub fn value(&self) -> u8 {
        self.2
    }
}

/// Inclusive per-channel HSV bounds selecting one color family.
///
/// Bounds that are out of order on any channel select nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HueRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl HueRange {
    pub fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.0..=self.upper.0).contains(&hsv.0)
            && (self.lower.1..=self.upper.1).contains(&hsv.1)
            && (self.lower.2..=self.upper.2).contains(&hsv.2)
    }
}

impl Default for HueRange {
    fn default() -> Self {
        Self {
            lower: Hsv(30, 60, 60),
            upper: Hsv(50, 255, 255),
        }
    }
}

/// Encoding of the hue channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HueScale {
    /// Degrees halved, 0..180
    #[default]
    Half,
    /// Degrees mapped onto 0..256, saturated at 255
    Full,
}

impl HueScale {
    pub fn range(&self) -> i32 {
        match self {
            HueScale::Half => 180,
            HueScale::Full => 256,
        }
    }
}

/// Axis-aligned box in full-resolution frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Map a box from downscaled space back by the downscale divisor
    pub fn scaled(&self, divisor: u32) -> Self {
        Self {
            x: self.x * divisor,
            y: self.y * divisor,
            width: self.width * divisor,
            height: self.height * divisor,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Binary image: 255 marks a selected pixel, 0 an unselected one
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    pub const SELECTED: u8 = 255;

    pub fn from_gray(image: GrayImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `false` for points outside the mask
    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        self.image
            .get_pixel_checked(x, y)
            .is_some_and(|px| px[0] == Self::SELECTED)
    }

    pub fn selected_count(&self) -> usize {
        self.image.as_raw().iter().filter(|&&v| v == Self::SELECTED).count()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.image
    }

    /// Give the backing buffer back so it can be reused for the next frame
    pub fn into_raw(self) -> Vec<u8> {
        self.image.into_raw()
    }
}

/// Whether a contour bounds a region from outside or a hole inside one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    Outer,
    Hole,
}

impl From<BorderType> for BorderKind {
    fn from(border: BorderType) -> Self {
        match border {
            BorderType::Outer => BorderKind::Outer,
            BorderType::Hole => BorderKind::Hole,
        }
    }
}

/// Closed boundary curve in mask coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
    pub kind: BorderKind,
    /// Index of the enclosing contour in the same extraction result
    pub parent: Option<usize>,
}

impl Contour {
    /// Enclosed polygon area (shoelace formula, unsigned)
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let p = self.points[i];
                let q = self.points[(i + 1) % n];
                p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }

    /// Smallest axis-aligned box containing every point
    pub fn bounding_rect(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(BoundingBox {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn is_hole(&self) -> bool {
        self.kind == BorderKind::Hole
    }
}
