use greenbox::{AnalyzerConfig, Frame, Mask, PixelLayout};
use image::{GrayImage, Luma};

/// RGB color converting to HSV (45, 255, 200): inside the default range.
pub const TEST_GREEN: [u8; 3] = [100, 200, 0];
/// RGB color converting to HSV (40, 150, 150): the middle of the default range.
pub const TEST_MIDPOINT: [u8; 3] = [121, 150, 62];
pub const TEST_RED: [u8; 3] = [255, 0, 0];
pub const TEST_BLACK: [u8; 3] = [0, 0, 0];

/// Axis-aligned block painted into a synthetic frame
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub rgb: [u8; 3],
}

/// Write one RGB color into a pixel slice of the given layout
fn put(px: &mut [u8], layout: PixelLayout, rgb: [u8; 3]) {
    let [r, g, b] = layout.rgb_offsets();
    px[r] = rgb[0];
    px[g] = rgb[1];
    px[b] = rgb[2];
    if let Some(a) = layout.alpha_offset() {
        px[a] = 255;
    }
}

/// Creates a frame filled with `background` with `blocks` painted on top, in order.
pub fn make_frame(
    width: u32,
    height: u32,
    layout: PixelLayout,
    background: [u8; 3],
    blocks: &[Block],
) -> Frame {
    let channels = layout.channels();
    let mut data = vec![0u8; width as usize * height as usize * channels];
    for px in data.chunks_exact_mut(channels) {
        put(px, layout, background);
    }
    for block in blocks {
        for y in block.y..(block.y + block.height).min(height) {
            for x in block.x..(block.x + block.width).min(width) {
                let i = (y as usize * width as usize + x as usize) * channels;
                put(&mut data[i..i + channels], layout, block.rgb);
            }
        }
    }
    Frame::new(width, height, layout, data)
}

/// Creates a BGR frame on black with a single block.
pub fn frame_with_block(width: u32, height: u32, block: Block) -> Frame {
    make_frame(width, height, PixelLayout::Bgr, TEST_BLACK, &[block])
}

pub fn block(x: u32, y: u32, width: u32, height: u32, rgb: [u8; 3]) -> Block {
    Block {
        x,
        y,
        width,
        height,
        rgb,
    }
}

/// Mask with the listed rectangles selected.
pub fn make_mask(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> Mask {
    let mut img = GrayImage::new(width, height);
    for &(rx, ry, rw, rh) in rects {
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    Mask::from_gray(img)
}

/// Default config with another divisor
pub fn config_with_divisor(divisor: u32) -> AnalyzerConfig {
    AnalyzerConfig {
        divisor,
        ..AnalyzerConfig::default()
    }
}

/// True when `actual` is within `tolerance` of `expected` on every field.
pub fn approx_box(
    actual: &greenbox::BoundingBox,
    expected: &greenbox::BoundingBox,
    tolerance: u32,
) -> bool {
    actual.x.abs_diff(expected.x) <= tolerance
        && actual.y.abs_diff(expected.y) <= tolerance
        && actual.width.abs_diff(expected.width) <= tolerance
        && actual.height.abs_diff(expected.height) <= tolerance
}
