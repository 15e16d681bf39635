//! # Shape Analysis Library
//!
//! Three analyses over a single raster image:
//!
//! - **Shape detection**: trace edge contours, approximate each by a polygon
//!   and label it (Triangle, Square, Rectangle, ..., Star, Circle).
//! - **Symmetry**: binarize, find every outermost region, mark its centroid and
//!   vertical axis, and flag the regions whose outline is left/right balanced.
//! - **Curve completion**: bridge small gaps in dark outlines with a
//!   morphological closing and blank out what they enclose.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shapes::Pipeline;
//!
//! let pipeline = Pipeline::builder().build()?;
//!
//! let detection = pipeline.detect_shapes("shapes.png")?;
//! for label in &detection.labels {
//!     println!("{label}");
//! }
//! detection.image.save("shapes-annotated.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use shapes::{Pipeline, algorithms::MirrorSymmetry};
//!
//! let pipeline = Pipeline::builder()
//!     .with_epsilon_fraction(0.03)
//!     .with_closing(7, 2)
//!     .set_symmetry_test(MirrorSymmetry)
//!     .with_font_file("DejaVuSans.ttf")?
//!     .build()?;
//! let report = pipeline.find_symmetry("logo.png")?;
//! println!("{} symmetric regions", report.symmetric_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod render;
pub mod pipeline;
pub mod manager;

pub use error::{Result, ShapeError};
pub use types::{
    BorderKind, BoundingBox, Centroid, Contour, CurveCompletion, DetectedShape, ShapeDetection,
    ShapeLabel, SymmetryRegion, SymmetryReport,
};
pub use config::{
    AnalysisConfig, ClassifierConfig, CompletionConfig, ContourConfig, SymmetryConfig,
    SymmetryMethod,
};
pub use traits::*;
pub use render::LabelFont;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use manager::{AnalysisCommand, AnalysisOutput, ImageAnalyzer};

use std::path::Path;

/// Detect and label shapes with the default pipeline
pub fn detect_shapes<P: AsRef<Path>>(path: P) -> Result<ShapeDetection> {
    Pipeline::default().detect_shapes(path)
}

/// Analyze symmetry with the default pipeline
pub fn find_symmetry<P: AsRef<Path>>(path: P) -> Result<SymmetryReport> {
    Pipeline::default().find_symmetry(path)
}

/// Complete broken curves with the default pipeline
pub fn complete_curves<P: AsRef<Path>>(path: P) -> Result<CurveCompletion> {
    Pipeline::default().complete_curves(path)
}
