//! Tests for HSV conversion and range masking.

mod common;

use greenbox::detection::{rgb_to_hsv, segment, to_hsv};
use common::*;

#[test]
fn test_hsv_reference_values() {
    let half = HueScale::Half;
    assert_eq!(rgb_to_hsv(0, 0, 0, half), Hsv(0, 0, 0));
    assert_eq!(rgb_to_hsv(255, 255, 255, half), Hsv(0, 0, 255));
    assert_eq!(rgb_to_hsv(128, 128, 128, half), Hsv(0, 0, 128));
    assert_eq!(rgb_to_hsv(255, 0, 0, half), Hsv(0, 255, 255));
    assert_eq!(rgb_to_hsv(0, 255, 0, half), Hsv(60, 255, 255));
    assert_eq!(rgb_to_hsv(0, 0, 255, half), Hsv(120, 255, 255));
    assert_eq!(rgb_to_hsv(255, 255, 0, half), Hsv(30, 255, 255));
}

#[test]
fn test_hsv_fixture_colors() {
    let [r, g, b] = TEST_MIDPOINT;
    assert_eq!(rgb_to_hsv(r, g, b, HueScale::Half), Hsv(40, 150, 150));

    let [r, g, b] = TEST_GREEN;
    assert_eq!(rgb_to_hsv(r, g, b, HueScale::Half), Hsv(45, 255, 200));
}

#[test]
fn test_negative_hue_wraps() {
    // Red sector with blue above green lands just below the top of the range
    assert_eq!(rgb_to_hsv(255, 0, 10, HueScale::Half), Hsv(179, 255, 255));
}

#[test]
fn test_full_hue_scale() {
    assert_eq!(rgb_to_hsv(0, 255, 0, HueScale::Full), Hsv(85, 255, 255));
    assert_eq!(rgb_to_hsv(0, 0, 255, HueScale::Full), Hsv(171, 255, 255));
    let [r, g, b] = TEST_GREEN;
    assert_eq!(rgb_to_hsv(r, g, b, HueScale::Full).hue(), 64);
}

#[test]
fn test_mask_selects_block_only() -> anyhow::Result<()> {
    let frame = frame_with_block(20, 10, block(5, 2, 4, 3, TEST_GREEN));
    let mask = segment(&frame, &HueRange::default(), HueScale::Half)?;

    assert_eq!((mask.width(), mask.height()), (20, 10));
    assert_eq!(mask.selected_count(), 12);
    assert!(mask.is_selected(5, 2));
    assert!(mask.is_selected(8, 4));
    assert!(!mask.is_selected(9, 4));
    assert!(!mask.is_selected(0, 0));
    Ok(())
}

#[test]
fn test_channel_order_follows_layout() -> anyhow::Result<()> {
    // Same bytes read as RGB and BGR give different colors
    let bgr = Frame::new(1, 1, PixelLayout::Bgr, vec![0, 200, 100]);
    let rgb = Frame::new(1, 1, PixelLayout::Rgb, vec![0, 200, 100]);

    let range = HueRange::default();
    assert_eq!(segment(&bgr, &range, HueScale::Half)?.selected_count(), 1);
    assert_eq!(segment(&rgb, &range, HueScale::Half)?.selected_count(), 0);
    Ok(())
}

#[test]
fn test_bounds_are_inclusive() -> anyhow::Result<()> {
    let frame = make_frame(4, 4, PixelLayout::Rgb, TEST_MIDPOINT, &[]);
    let exact = HueRange::new(Hsv(40, 150, 150), Hsv(40, 150, 150));
    assert_eq!(segment(&frame, &exact, HueScale::Half)?.selected_count(), 16);

    let just_above = HueRange::new(Hsv(41, 150, 150), Hsv(50, 150, 150));
    assert_eq!(segment(&frame, &just_above, HueScale::Half)?.selected_count(), 0);
    Ok(())
}

#[test]
fn test_out_of_order_bounds_select_nothing() -> anyhow::Result<()> {
    let frame = make_frame(8, 8, PixelLayout::Bgr, TEST_GREEN, &[]);
    let reversed = HueRange::new(Hsv(50, 255, 255), Hsv(30, 60, 60));
    assert_eq!(segment(&frame, &reversed, HueScale::Half)?.selected_count(), 0);
    Ok(())
}

#[test]
fn test_four_channel_frame_is_rejected() {
    let frame = make_frame(4, 4, PixelLayout::Rgba, TEST_GREEN, &[]);
    let result = segment(&frame, &HueRange::default(), HueScale::Half);
    assert!(matches!(result, Err(AnalysisError::UnsupportedLayout(_))));
}

#[test]
fn test_undersized_buffer_fails_conversion() {
    let frame = Frame::new(4, 4, PixelLayout::Bgr, vec![0; 47]);
    let result = segment(&frame, &HueRange::default(), HueScale::Half);
    assert!(matches!(result, Err(AnalysisError::ConversionFailure(_))));
}

#[test]
fn test_float_frame_matches_byte_frame() -> anyhow::Result<()> {
    let bytes = frame_with_block(12, 12, block(2, 2, 6, 6, TEST_GREEN));
    let mut floats = bytes.clone();
    if let FrameBuffer::U8(data) = &bytes.data {
        floats.data = FrameBuffer::F32(data.iter().map(|&v| v as f32 / 255.0).collect());
    }

    let range = HueRange::default();
    assert_eq!(
        segment(&bytes, &range, HueScale::Half)?,
        segment(&floats, &range, HueScale::Half)?
    );
    Ok(())
}

#[test]
fn test_to_hsv_covers_every_pixel() -> anyhow::Result<()> {
    let frame = make_frame(3, 2, PixelLayout::Rgb, TEST_RED, &[block(0, 0, 1, 1, TEST_MIDPOINT)]);
    let hsv = to_hsv(&frame, HueScale::Half)?;
    assert_eq!(hsv.len(), 6);
    assert_eq!(hsv[0], Hsv(40, 150, 150));
    assert_eq!(hsv[5], Hsv(0, 255, 255));
    Ok(())
}

#[test]
fn test_hsv_dark_and_low_contrast_pixels() {
    // Fixed-point rounding decides these; exact division would land one step off
    let half = HueScale::Half;
    assert_eq!(rgb_to_hsv(0, 1, 58, half), Hsv(120, 255, 58));
    assert_eq!(rgb_to_hsv(0, 1, 58, HueScale::Full).hue(), 170);
    assert_eq!(rgb_to_hsv(25, 79, 0, half), Hsv(50, 255, 79));
    assert_eq!(rgb_to_hsv(25, 79, 0, HueScale::Full).hue(), 72);
    assert_eq!(rgb_to_hsv(11, 22, 11, half), Hsv(60, 127, 22));
    assert_eq!(rgb_to_hsv(6, 36, 6, half), Hsv(60, 212, 36));
}

fn selects(r: u8, g: u8, b: u8) -> anyhow::Result<bool> {
    let frame = Frame::new(1, 1, PixelLayout::Rgb, vec![r, g, b]);
    Ok(segment(&frame, &HueRange::default(), HueScale::Half)?.is_selected(0, 0))
}

#[test]
fn test_default_range_hue_edges() -> anyhow::Result<()> {
    assert_eq!(rgb_to_hsv(200, 196, 0, HueScale::Half).hue(), 29);
    assert!(!selects(200, 196, 0)?);
    assert_eq!(rgb_to_hsv(200, 197, 0, HueScale::Half).hue(), 30);
    assert!(selects(200, 197, 0)?);

    assert_eq!(rgb_to_hsv(64, 200, 0, HueScale::Half).hue(), 50);
    assert!(selects(64, 200, 0)?);
    assert_eq!(rgb_to_hsv(63, 200, 0, HueScale::Half).hue(), 51);
    assert!(!selects(63, 200, 0)?);

    assert!(selects(25, 79, 0)?);
    Ok(())
}

#[test]
fn test_is_selected_outside_mask_is_false() -> anyhow::Result<()> {
    let frame = make_frame(4, 3, PixelLayout::Bgr, TEST_GREEN, &[]);
    let mask = segment(&frame, &HueRange::default(), HueScale::Half)?;
    assert!(mask.is_selected(3, 2));
    assert!(!mask.is_selected(4, 0));
    assert!(!mask.is_selected(0, 3));
    assert!(!mask.is_selected(u32::MAX, u32::MAX));
    Ok(())
}
