//! Error taxonomy for file intake, geometry, and export.
//!
//! Every error is local to the operation that raised it: intake errors
//! leave the previous outline in place, shape errors skip one outline,
//! export errors write nothing.

use thiserror::Error;

/// Vector markup could not be used.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("markup syntax error: {0}")]
    Syntax(String),
    #[error("no root <svg> element found")]
    MissingRoot,
    #[error("vector conversion failed: {0}")]
    Convert(String),
}

/// One outline could not become an extrudable shape.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeBuildError {
    #[error("outline has {0} points; at least 3 are needed")]
    TooFewPoints(usize),
    #[error("outline encloses no area")]
    ZeroArea,
    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    #[error("no solid is loaded")]
    NoSolid,
    #[error("no rendered frame is available")]
    NoFrame,
    #[error("unsupported resolution multiplier {0}; use 1, 2 or 3")]
    BadMultiplier(u32),
    #[error("serialization failed: {0}")]
    Serialize(String),
    #[error("download failed: {0}")]
    Download(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolidError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },
    #[error(transparent)]
    ShapeBuild(#[from] ShapeBuildError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl SolidError {
    /// Text to show the user.
    pub fn user_message(&self) -> String {
        match self {
            SolidError::Parse(ParseError::MissingRoot) => "Invalid SVG: No SVG element found".to_string(),
            SolidError::Parse(e) => format!("Failed to read SVG: {e}"),
            SolidError::UnsupportedFileType(_) => "Unsupported file type".to_string(),
            SolidError::FileTooLarge { .. } => "File too large: Image must be smaller than 10MB".to_string(),
            SolidError::ShapeBuild(e) => format!("Skipped an outline: {e}"),
            SolidError::Export(e) => e.user_message(),
        }
    }
}

impl ExportError {
    pub fn user_message(&self) -> String {
        match self {
            ExportError::NoSolid => "Model not loaded".to_string(),
            ExportError::NoFrame => "Canvas not available for PNG export".to_string(),
            e => format!("Export failed: {e}"),
        }
    }
}
