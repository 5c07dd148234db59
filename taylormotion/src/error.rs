use std::io;

use thiserror::Error;

/// Reasons a `SimulationConfig` cannot be run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("step size must be positive, got {0}")]
    StepSize(f64),
    #[error("tolerance radius must be positive, got {0}")]
    ToleranceRadius(f64),
    #[error("{0:?} is not a tolerance radius")]
    Radius(String),
    #[error("term count must be at least 1")]
    TermCount,
    #[error("bounds factor must be positive, got {0}")]
    BoundsFactor(f64),
    /// The heading divides by the x-span, so start and end may not share an x coordinate.
    #[error("start and end share the x coordinate {0}, the heading is undefined")]
    VerticalTrack(f64),
    #[error("image size must be positive, got {width}x{height}")]
    ImageSize { width: i64, height: i64 },
    #[error("scale must be positive, got {0}")]
    Scale(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("no convergence for tolerance radius {tolerance_radius} after {attempts} term counts")]
    Exhausted { tolerance_radius: f64, attempts: u32 },
    /// A sweep worker died before answering for every radius.
    #[error("sweep finished without results for {missing} of its radii")]
    Incomplete { missing: usize },
}

/// Everything that can go wrong between reading a configuration and writing the final image.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("results file: {0}")]
    Csv(#[from] csv::Error),
    #[error("image encoding: {0}")]
    Image(#[from] image::ImageError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// `line` counts from 1, the header being line 1.
    #[error("malformed results at line {line}: {reason}")]
    Results { line: u64, reason: String },
}
