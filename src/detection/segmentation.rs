use image::GrayImage;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Frame, HueRange, HueScale, Hsv, Mask, PixelLayout};

const HSV_SHIFT: u32 = 12;
const HSV_HALF: i32 = 1 << (HSV_SHIFT - 1);

// round(numerator / (factor * i)) for every i, 0 at index 0.
// No entry lands exactly on .5, so integer round-half-up is exact.
const fn reciprocal_table(numerator: i32, factor: i32) -> [i32; 256] {
    let mut table = [0i32; 256];
    let mut i = 1;
    while i < 256 {
        let den = factor * i as i32;
        table[i] = (2 * numerator + den) / (2 * den);
        i += 1;
    }
    table
}

const SDIV_TABLE: [i32; 256] = reciprocal_table(255 << HSV_SHIFT, 1);
const HDIV_TABLE_180: [i32; 256] = reciprocal_table(180 << HSV_SHIFT, 6);
const HDIV_TABLE_256: [i32; 256] = reciprocal_table(256 << HSV_SHIFT, 6);

/// Convert one pixel to 8-bit HSV.
///
/// Fixed-point formula of the usual 8-bit BGR to HSV conversion: V is the
/// max channel, S and H are scaled through 12-bit reciprocal tables and the
/// hue sector is picked with priority red, green, blue.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8, scale: HueScale) -> Hsv {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = (diff * SDIV_TABLE[v as usize] + HSV_HALF) >> HSV_SHIFT;

    let sector = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    let hdiv = match scale {
        HueScale::Half => &HDIV_TABLE_180,
        HueScale::Full => &HDIV_TABLE_256,
    };
    let mut h = (sector * hdiv[diff as usize] + HSV_HALF) >> HSV_SHIFT;
    if h < 0 {
        h += scale.range();
    }

    Hsv(h.clamp(0, 255) as u8, s as u8, v as u8)
}

/// Select the pixels whose HSV value lies inside `range`.
pub fn segment(frame: &Frame, range: &HueRange, scale: HueScale) -> AnalysisResult<Mask> {
    segment_into(frame, range, scale, Vec::new())
}

/// Like [`segment`], writing the mask into a recycled buffer.
pub fn segment_into(
    frame: &Frame,
    range: &HueRange,
    scale: HueScale,
    mut buffer: Vec<u8>,
) -> AnalysisResult<Mask> {
    if frame.channels() != 3 {
        return Err(AnalysisError::UnsupportedLayout(format!(
            "segmentation needs 3 channels, got {:?} with {}",
            frame.layout,
            frame.channels()
        )));
    }
    if frame.width == 0 || frame.height == 0 || frame.data.len() < frame.expected_len() {
        return Err(AnalysisError::ConversionFailure(format!(
            "cannot convert {}x{} {:?} frame from a buffer of {} values",
            frame.width,
            frame.height,
            frame.layout,
            frame.data.len()
        )));
    }

    let bytes = frame.to_u8();
    let [ri, gi, bi] = frame.layout.rgb_offsets();
    buffer.clear();
    buffer.extend(bytes[..frame.expected_len()].chunks_exact(3).map(|px| {
        let hsv = rgb_to_hsv(px[ri], px[gi], px[bi], scale);
        if range.contains(hsv) { Mask::SELECTED } else { 0 }
    }));

    let image = GrayImage::from_raw(frame.width, frame.height, buffer).ok_or_else(|| {
        AnalysisError::ConversionFailure("mask buffer does not match frame size".to_string())
    })?;
    Ok(Mask::from_gray(image))
}

/// HSV rendition of a whole 3-channel frame, mostly for inspection.
pub fn to_hsv(frame: &Frame, scale: HueScale) -> AnalysisResult<Vec<Hsv>> {
    if !matches!(frame.layout, PixelLayout::Rgb | PixelLayout::Bgr) {
        return Err(AnalysisError::UnsupportedLayout(format!(
            "HSV conversion needs a 3-channel layout, got {:?}",
            frame.layout
        )));
    }
    if frame.data.len() < frame.expected_len() {
        return Err(AnalysisError::ConversionFailure(format!(
            "buffer holds {} values, {} needed",
            frame.data.len(),
            frame.expected_len()
        )));
    }
    let bytes = frame.to_u8();
    let [ri, gi, bi] = frame.layout.rgb_offsets();
    Ok(bytes[..frame.expected_len()]
        .chunks_exact(3)
        .map(|px| rgb_to_hsv(px[ri], px[gi], px[bi], scale))
        .collect())
}
