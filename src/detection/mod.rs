//! The four per-frame stages: downscale, segment, extract contours, filter.

pub mod contours;
pub mod downscale;
pub mod regions;
pub mod segmentation;

pub use contours::{compress_chain, find_boundaries};
pub use downscale::downscale;
pub use regions::filter_regions;
pub use segmentation::{rgb_to_hsv, segment, segment_into, to_hsv};
