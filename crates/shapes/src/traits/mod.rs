use image::GrayImage;
use crate::{error::Result, types::{Centroid, Contour}};

/// Trait for image preprocessing algorithms
pub trait ImagePreprocessor: Send + Sync {
    /// Produce a new image (e.g. blurred, thresholded, edge map); the input is left untouched
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Trace boundaries in a binary image (non-zero pixels are foreground)
    fn extract_contours(&self, image: &GrayImage) -> Result<Vec<Contour>>;
}

/// Trait for polygon approximation algorithms
pub trait PolygonApproximator: Send + Sync {
    /// Reduce a closed contour to a closed vertex sequence within `epsilon` pixels
    fn approximate(&self, contour: &Contour, epsilon: f64) -> Vec<[i32; 2]>;
}

/// Trait for left/right balance tests about the vertical axis through a centroid
pub trait SymmetryTest: Send + Sync {
    fn is_symmetric(&self, points: &[[i32; 2]], centroid: Centroid, tolerance: i32) -> bool;
}
