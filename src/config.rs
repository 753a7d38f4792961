use anyhow::{Context, Result};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{ChannelType, HueRange, HueScale, PixelLayout};
use crate::overlay::Paint;

/// Resampling filter used by the downscaler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    #[default]
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Static analyzer configuration, fixed when a pipeline is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Both frame dimensions are divided by this before analysis
    pub divisor: u32,
    pub hue_range: HueRange,
    /// Contours must enclose strictly more than this, in downscaled pixels
    pub min_area: f64,
    pub hue_scale: HueScale,
    /// Layout every incoming frame must have
    pub input_layout: PixelLayout,
    /// Layout produced by the downscaler and read by the segmenter
    pub analysis_layout: PixelLayout,
    pub channel_type: ChannelType,
    pub resize_filter: ResizeFilter,
    pub paint: Paint,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            divisor: 4,
            hue_range: HueRange::default(),
            min_area: 500.0,
            hue_scale: HueScale::Half,
            input_layout: PixelLayout::Bgr,
            analysis_layout: PixelLayout::Bgr,
            channel_type: ChannelType::U8,
            resize_filter: ResizeFilter::Nearest,
            paint: Paint::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load a JSON config; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
