use thiserror::Error;

/// Input image rejected before any pixel work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One side is shorter than the configured minimum.
    #[error("image is too small ({width}x{height}); minimum dimension is {min_size}px")]
    TooSmall {
        width: u32,
        height: u32,
        min_size: u32,
    },

    /// Width/height ratio falls outside the allowed range.
    #[error("invalid aspect ratio {ratio:.2} for {width}x{height}; allowed range [{min} - {max}]")]
    AspectRatio {
        width: u32,
        height: u32,
        ratio: f32,
        min: f32,
        max: f32,
    },
}

/// Library error type for print generation.
#[derive(Debug, Error)]
pub enum Error {
    /// The source image failed dimension checks.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Style parameters produce degenerate geometry or are out of range.
    #[error("configuration error in {stage}: {detail}")]
    Configuration { stage: &'static str, detail: String },

    /// No profile with this name is known.
    #[error("unknown style profile '{0}'")]
    UnknownProfile(String),

    /// The resampler refused a buffer.
    #[error("resampling failed in {stage}: {detail}")]
    Resample { stage: &'static str, detail: String },

    /// One or more input paths do not exist.
    #[error("input path(s) not found: {0}")]
    MissingInput(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Metadata serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Image encode/decode error.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn configuration(stage: &'static str, detail: impl Into<String>) -> Self {
        Self::Configuration {
            stage,
            detail: detail.into(),
        }
    }

    pub(crate) fn resample(stage: &'static str, detail: impl std::fmt::Display) -> Self {
        Self::Resample {
            stage,
            detail: detail.to_string(),
        }
    }

    /// Whether the error stems from input validation rather than processing.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
