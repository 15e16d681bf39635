use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShapeError};

/// All tunable heuristics of the analysis pipeline.
///
/// Every section falls back to its defaults, so a config file only needs to
/// name the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    pub contours: ContourConfig,
    pub classifier: ClassifierConfig,
    pub symmetry: SymmetryConfig,
    pub completion: CompletionConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        check_kernel("contours.blur_kernel_size", self.contours.blur_kernel_size)?;
        check_kernel("completion.blur_kernel_size", self.completion.blur_kernel_size)?;
        check_kernel("completion.kernel_size", self.completion.kernel_size)?;

        if self.contours.canny_low > self.contours.canny_high {
            return Err(ShapeError::InvalidConfig(format!(
                "contours.canny_low ({}) must not exceed contours.canny_high ({})",
                self.contours.canny_low, self.contours.canny_high
            )));
        }
        if !(self.classifier.epsilon_fraction > 0.0) {
            return Err(ShapeError::InvalidConfig(
                "classifier.epsilon_fraction must be positive".to_string(),
            ));
        }
        if self.classifier.square_aspect_min > self.classifier.square_aspect_max {
            return Err(ShapeError::InvalidConfig(
                "classifier.square_aspect_min must not exceed classifier.square_aspect_max".to_string(),
            ));
        }
        if self.classifier.max_polygon_vertices < 7 {
            return Err(ShapeError::InvalidConfig(
                "classifier.max_polygon_vertices must be at least 7".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_kernel(name: &str, size: u32) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(ShapeError::InvalidConfig(format!(
            "{name} must be a positive odd number, got {size}"
        )));
    }
    Ok(())
}

/// Gaussian sigma used for a fixed `size`×`size` kernel when no sigma is given.
pub fn sigma_for_kernel(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Edge map and boundary tracing used by shape detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ContourConfig {
    #[schemars(description = "Side of the square Gaussian blur kernel (odd)")]
    pub blur_kernel_size: u32,
    #[schemars(description = "Lower hysteresis threshold of the Canny edge detector")]
    pub canny_low: f32,
    #[schemars(description = "Upper hysteresis threshold of the Canny edge detector")]
    pub canny_high: f32,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClassifierConfig {
    #[schemars(description = "Approximation tolerance as a fraction of the contour perimeter")]
    pub epsilon_fraction: f64,
    #[schemars(description = "Smallest width/height ratio of a four-sided polygon labeled Square")]
    pub square_aspect_min: f64,
    #[schemars(description = "Largest width/height ratio of a four-sided polygon labeled Square")]
    pub square_aspect_max: f64,
    #[schemars(description = "Largest vertex count labeled as a generic polygon; above it is a Star")]
    pub max_polygon_vertices: usize,
    pub outline_thickness: u32,
    #[schemars(description = "Pixels between the first polygon vertex and the label baseline")]
    pub label_offset: i32,
    pub label_scale: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            epsilon_fraction: 0.02,
            square_aspect_min: 0.95,
            square_aspect_max: 1.05,
            max_polygon_vertices: 12,
            outline_thickness: 2,
            label_offset: 10,
            label_scale: 14.0,
        }
    }
}

/// How contour points are paired when testing left/right balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryMethod {
    /// Point `i` against point `(N - i) mod N` of the traversal order.
    #[default]
    IndexPairing,
    /// Every point reflected through the centroid axis must land near the contour.
    Mirror,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SymmetryConfig {
    #[schemars(description = "Global binarization level; pixels above it are foreground")]
    pub threshold: u8,
    #[schemars(description = "Largest per-axis pixel difference of a balanced point pair")]
    pub tolerance: i32,
    pub method: SymmetryMethod,
    pub centroid_radius: i32,
    pub axis_thickness: u32,
    pub contour_thickness: u32,
    pub label_scale: f32,
}

impl Default for SymmetryConfig {
    fn default() -> Self {
        Self {
            threshold: 127,
            tolerance: 10,
            method: SymmetryMethod::IndexPairing,
            centroid_radius: 5,
            axis_thickness: 3,
            contour_thickness: 2,
            label_scale: 14.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CompletionConfig {
    pub blur_kernel_size: u32,
    #[schemars(description = "Binarization level; pixels at or below it are strokes")]
    pub threshold: u8,
    #[schemars(description = "Side of the square all-ones structuring element (odd)")]
    pub kernel_size: u32,
    #[schemars(description = "Number of dilations followed by the same number of erosions")]
    pub iterations: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: 5,
            threshold: 127,
            kernel_size: 5,
            iterations: 3,
        }
    }
}
