pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod overlay;
pub mod pipeline;
pub mod session;
pub mod source;

pub use config::{AnalyzerConfig, ResizeFilter};
pub use error::{AnalysisError, AnalysisResult};
pub use models::{
    BorderKind, BoundingBox, ChannelType, Contour, Frame, FrameBuffer, HueRange, HueScale, Hsv,
    Mask, PixelLayout,
};
pub use overlay::{CanvasOverlay, OverlaySink, Paint, PaintStyle, RecordingOverlay};
pub use pipeline::{
    DebugConfig, FrameBuffers, Pipeline, PipelineContext, PipelineStage, StageOutput,
};
pub use session::{FrameSession, FrameWorker, SessionStats};
pub use source::{FrameSource, ImageFileSource, MemorySource};
