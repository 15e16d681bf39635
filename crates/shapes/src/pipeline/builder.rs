use std::path::Path;

use crate::{
    algorithms::{symmetry_test_for, DouglasPeuckerApproximator},
    config::AnalysisConfig,
    error::Result,
    pipeline::Pipeline,
    render::LabelFont,
    traits::{PolygonApproximator, SymmetryTest},
};

/// Builder for creating analysis pipelines with a fluent API
#[derive(Default)]
pub struct PipelineBuilder {
    config: AnalysisConfig,
    approximator: Option<Box<dyn PolygonApproximator>>,
    symmetry_test: Option<Box<dyn SymmetryTest>>,
    font: Option<LabelFont>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the polygon approximator (replaces any existing one)
    pub fn set_approximator<A>(mut self, approximator: A) -> Self
    where
        A: PolygonApproximator + 'static,
    {
        self.approximator = Some(Box::new(approximator));
        self
    }

    /// Set the symmetry test, overriding `symmetry.method` from the configuration
    pub fn set_symmetry_test<S>(mut self, test: S) -> Self
    where
        S: SymmetryTest + 'static,
    {
        self.symmetry_test = Some(Box::new(test));
        self
    }

    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Load the label font from a TrueType/OpenType file
    pub fn with_font_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let font = LabelFont::from_file(path)?;
        Ok(self.with_font(font))
    }

    /// Classification tolerance as a fraction of contour perimeter
    pub fn with_epsilon_fraction(mut self, fraction: f64) -> Self {
        self.config.classifier.epsilon_fraction = fraction;
        self
    }

    /// Per-axis pixel tolerance of the symmetry test
    pub fn with_symmetry_tolerance(mut self, tolerance: i32) -> Self {
        self.config.symmetry.tolerance = tolerance;
        self
    }

    /// Structuring element size and iteration count of the gap-closing pass
    pub fn with_closing(mut self, kernel_size: u32, iterations: u32) -> Self {
        self.config.completion.kernel_size = kernel_size;
        self.config.completion.iterations = iterations;
        self
    }

    /// Validate the configuration and build the pipeline, filling in default stages
    pub fn build(self) -> Result<Pipeline> {
        self.config.validate()?;

        let approximator = self
            .approximator
            .unwrap_or_else(|| Box::new(DouglasPeuckerApproximator));
        let symmetry_test = self
            .symmetry_test
            .unwrap_or_else(|| symmetry_test_for(self.config.symmetry.method));

        Ok(Pipeline::new(self.config, approximator, symmetry_test, self.font))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithms::MirrorSymmetry,
        config::SymmetryMethod,
        error::ShapeError,
        types::Centroid,
    };

    struct AlwaysBalanced;

    impl SymmetryTest for AlwaysBalanced {
        fn is_symmetric(&self, _: &[[i32; 2]], _: Centroid, _: i32) -> bool {
            true
        }
    }

    #[test]
    fn test_default_build() {
        let pipeline = Pipeline::builder().build().expect("defaults are valid");
        assert_eq!(pipeline.config(), &AnalysisConfig::default());
        assert!(pipeline.has_font());
    }

    #[test]
    fn test_fluent_overrides() {
        let pipeline = Pipeline::builder()
            .with_epsilon_fraction(0.05)
            .with_symmetry_tolerance(3)
            .with_closing(7, 2)
            .build()
            .unwrap();
        let config = pipeline.config();
        assert_eq!(config.classifier.epsilon_fraction, 0.05);
        assert_eq!(config.symmetry.tolerance, 3);
        assert_eq!((config.completion.kernel_size, config.completion.iterations), (7, 2));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Pipeline::builder().with_closing(4, 3).build();
        assert!(matches!(result, Err(ShapeError::InvalidConfig(_))));
    }

    #[test]
    fn test_custom_symmetry_test_is_used() {
        use image::{DynamicImage, GrayImage, Luma};

        let mut img = GrayImage::new(200, 100);
        for y in 40..60 {
            for x in 20..180 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let image = DynamicImage::ImageLuma8(img);

        let pipeline = Pipeline::builder().set_symmetry_test(AlwaysBalanced).build().unwrap();
        assert!(pipeline.find_symmetry_image(&image).unwrap().regions[0].symmetric);

        let mut config = AnalysisConfig::default();
        config.symmetry.method = SymmetryMethod::Mirror;
        let mirror = Pipeline::builder().with_config(config).build().unwrap();
        assert!(mirror.find_symmetry_image(&image).unwrap().regions[0].symmetric);

        let explicit = Pipeline::builder().set_symmetry_test(MirrorSymmetry).build().unwrap();
        assert!(explicit.find_symmetry_image(&image).unwrap().regions[0].symmetric);
    }

    #[test]
    fn test_missing_font_fails_build() {
        assert!(Pipeline::builder().with_font_file("/nonexistent/label.ttf").is_err());
    }
}
