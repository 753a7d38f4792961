use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, Rgba};
use std::borrow::Cow;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{ChannelType, Frame, FrameBuffer, PixelLayout};

/// Reduce both frame dimensions by `divisor` (remainders discarded).
///
/// The result is re-ordered into `layout` and stored as `channel_type`.
pub fn downscale(
    frame: &Frame,
    divisor: u32,
    layout: PixelLayout,
    channel_type: ChannelType,
    filter: FilterType,
) -> AnalysisResult<Frame> {
    if divisor == 0 {
        return Err(AnalysisError::InvalidDimension("downscale divisor is zero".to_string()));
    }
    let width = frame.width / divisor;
    let height = frame.height / divisor;
    if width == 0 || height == 0 {
        return Err(AnalysisError::InvalidDimension(format!(
            "{}x{} frame divided by {} leaves {}x{}",
            frame.width, frame.height, divisor, width, height
        )));
    }
    if frame.data.len() < frame.expected_len() {
        return Err(AnalysisError::ConversionFailure(format!(
            "{}x{} {:?} frame needs {} values, buffer holds {}",
            frame.width,
            frame.height,
            frame.layout,
            frame.expected_len(),
            frame.data.len()
        )));
    }

    // Borrowed for byte frames; the one copy happens in reorder_channels
    let bytes = frame.to_u8();
    let bytes = &bytes[..frame.expected_len()];
    let resized = if divisor == 1 {
        Cow::Borrowed(bytes)
    } else {
        Cow::Owned(resize_raw(
            bytes,
            frame.width,
            frame.height,
            frame.layout,
            width,
            height,
            filter,
        )?)
    };

    let reordered = reorder_channels(resized, frame.layout, layout);
    let data = match channel_type {
        ChannelType::U8 => FrameBuffer::U8(reordered),
        ChannelType::F32 => {
            FrameBuffer::F32(reordered.into_iter().map(|v| v as f32 / 255.0).collect())
        }
    };

    Ok(Frame {
        width,
        height,
        layout,
        data,
        sequence: frame.sequence,
    })
}

// Resampling does not care about channel order, only channel count.
fn resize_raw(
    bytes: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
    new_width: u32,
    new_height: u32,
    filter: FilterType,
) -> AnalysisResult<Vec<u8>> {
    let malformed = || {
        AnalysisError::ConversionFailure(format!("buffer does not fit a {}x{} image", width, height))
    };
    match layout.channels() {
        3 => {
            let img: ImageBuffer<Rgb<u8>, &[u8]> =
                ImageBuffer::from_raw(width, height, bytes).ok_or_else(malformed)?;
            Ok(imageops::resize(&img, new_width, new_height, filter).into_raw())
        }
        _ => {
            let img: ImageBuffer<Rgba<u8>, &[u8]> =
                ImageBuffer::from_raw(width, height, bytes).ok_or_else(malformed)?;
            Ok(imageops::resize(&img, new_width, new_height, filter).into_raw())
        }
    }
}

fn reorder_channels(bytes: Cow<'_, [u8]>, from: PixelLayout, to: PixelLayout) -> Vec<u8> {
    if from == to {
        return bytes.into_owned();
    }
    let [fr, fg, fb] = from.rgb_offsets();
    let [tr, tg, tb] = to.rgb_offsets();
    let out_channels = to.channels();
    let mut out = vec![0u8; bytes.len() / from.channels() * out_channels];
    for (src, dst) in bytes
        .chunks_exact(from.channels())
        .zip(out.chunks_exact_mut(out_channels))
    {
        dst[tr] = src[fr];
        dst[tg] = src[fg];
        dst[tb] = src[fb];
        if let Some(ta) = to.alpha_offset() {
            // Opaque unless the source carries its own alpha
            dst[ta] = from.alpha_offset().map_or(255, |fa| src[fa]);
        }
    }
    out
}
