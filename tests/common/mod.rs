mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from greenbox for tests
pub use greenbox::{
    AnalysisError, AnalyzerConfig, BoundingBox, Frame, FrameBuffer, HueRange, HueScale, Hsv,
    Mask, PixelLayout, Pipeline,
};
