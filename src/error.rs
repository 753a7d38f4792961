use thiserror::Error;

/// Failure of a single frame's analysis.
///
/// A failed frame yields no boxes at all; later frames are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Divisor is zero or the downscaled frame would be empty.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Channel count or layout does not match the configuration.
    #[error("unsupported layout: {0}")]
    UnsupportedLayout(String),

    /// The pixel buffer cannot be converted (undersized or malformed).
    #[error("conversion failure: {0}")]
    ConversionFailure(String),

    /// The mask handed to the contour extractor is malformed.
    #[error("extraction failure: {0}")]
    ExtractionFailure(String),
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
