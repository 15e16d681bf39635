pub mod builder;

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, Rgb};
use tracing::{debug, info, warn};
use crate::{
    algorithms::{
        classify_contour, close_binary, fill_contours, mask_out, to_gray, CannyPreprocessor,
        DouglasPeuckerApproximator, GaussianBlurPreprocessor, ImageprocContourExtractor,
        ThresholdPreprocessor, symmetry_test_for,
    },
    config::AnalysisConfig,
    error::{Result, ShapeError},
    render::{draw_closed_polyline, draw_label, draw_marker, draw_thick_line, LabelFont},
    traits::{ContourExtractor, ImagePreprocessor, PolygonApproximator, SymmetryTest},
    types::{
        Contour, CurveCompletion, DetectedShape, ShapeDetection, SymmetryRegion, SymmetryReport,
    },
};

const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LABEL_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const SYMMETRY_INK: Luma<u8> = Luma([0]);
const SYMMETRY_TEXT: Luma<u8> = Luma([255]);
const SYMMETRY_LABEL: &str = "Symmetric";

/// Preprocessing chain followed by border tracing
pub struct ContourStage {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    extractor: Box<dyn ContourExtractor>,
}

impl ContourStage {
    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        extractor: Box<dyn ContourExtractor>,
    ) -> Self {
        Self {
            preprocessors,
            extractor,
        }
    }

    /// Blur, Canny edge map, full border hierarchy.
    pub fn edges(config: &AnalysisConfig) -> Self {
        Self::new(
            vec![
                Box::new(GaussianBlurPreprocessor {
                    kernel_size: config.contours.blur_kernel_size,
                }),
                Box::new(CannyPreprocessor {
                    low: config.contours.canny_low,
                    high: config.contours.canny_high,
                }),
            ],
            Box::new(ImageprocContourExtractor::all()),
        )
    }

    /// Global threshold, outermost borders only.
    pub fn silhouettes(config: &AnalysisConfig) -> Self {
        Self::new(
            vec![Box::new(ThresholdPreprocessor::binary(config.symmetry.threshold))],
            Box::new(ImageprocContourExtractor::external()),
        )
    }

    /// Run every preprocessor in order, then trace the final image.
    ///
    /// Returns the image the contours were traced on together with the contours.
    pub fn trace(&self, image: &GrayImage) -> Result<(GrayImage, Vec<Contour>)> {
        let mut processed = image.clone();
        for preprocessor in &self.preprocessors {
            processed = preprocessor.preprocess(&processed)?;
        }
        let contours = self.extractor.extract_contours(&processed)?;
        Ok((processed, contours))
    }
}

/// Shape detection, symmetry analysis and curve completion over one image.
///
/// The pipeline only holds configuration and stateless stages; each call
/// allocates its own buffers and never writes to its input.
pub struct Pipeline {
    config: AnalysisConfig,
    edge_stage: ContourStage,
    silhouette_stage: ContourStage,
    approximator: Box<dyn PolygonApproximator>,
    symmetry_test: Box<dyn SymmetryTest>,
    font: Option<LabelFont>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a pipeline from already-checked parts
    ///
    /// Without a font the bundled one is used for labels.
    pub fn new(
        config: AnalysisConfig,
        approximator: Box<dyn PolygonApproximator>,
        symmetry_test: Box<dyn SymmetryTest>,
        font: Option<LabelFont>,
    ) -> Self {
        let font = font.or_else(|| match LabelFont::embedded() {
            Ok(font) => Some(font),
            Err(err) => {
                warn!(error = %err, "bundled label font unavailable, labels will not be drawn");
                None
            }
        });
        Self {
            edge_stage: ContourStage::edges(&config),
            silhouette_stage: ContourStage::silhouettes(&config),
            config,
            approximator,
            symmetry_test,
            font,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Decode the image at `path`.
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path = path.as_ref();
        image::open(path).map_err(|source| ShapeError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn detect_shapes<P: AsRef<Path>>(&self, path: P) -> Result<ShapeDetection> {
        info!(path = %path.as_ref().display(), "detecting shapes");
        let image = Self::load_image(path)?;
        self.detect_shapes_image(&image)
    }

    pub fn find_symmetry<P: AsRef<Path>>(&self, path: P) -> Result<SymmetryReport> {
        info!(path = %path.as_ref().display(), "finding symmetry");
        let image = Self::load_image(path)?;
        self.find_symmetry_image(&image)
    }

    pub fn complete_curves<P: AsRef<Path>>(&self, path: P) -> Result<CurveCompletion> {
        info!(path = %path.as_ref().display(), "completing curves");
        let image = Self::load_image(path)?;
        self.complete_curves_image(&image)
    }

    /// Classify every traced edge contour and annotate a color copy of `image`.
    ///
    /// Color input is reduced to gray with the BT.601 weights. Edges come from
    /// the configured blur followed by `imageproc`'s Canny, which applies its
    /// own sigma 1.4 smoothing as well.
    pub fn detect_shapes_image(&self, image: &DynamicImage) -> Result<ShapeDetection> {
        let settings = &self.config.classifier;
        let gray = to_gray(image);
        let (_, contours) = self.edge_stage.trace(&gray)?;

        let mut canvas = image.to_rgb8();
        let mut labels = Vec::with_capacity(contours.len());
        let mut shapes = Vec::with_capacity(contours.len());

        for (index, contour) in contours.iter().enumerate() {
            let classification = classify_contour(contour, self.approximator.as_ref(), settings);

            draw_closed_polyline(
                &mut canvas,
                &classification.polygon,
                settings.outline_thickness,
                OUTLINE_COLOR,
            );
            if let Some(&[x, y]) = classification.polygon.first() {
                draw_label(
                    &mut canvas,
                    self.font.as_ref(),
                    &classification.label.to_string(),
                    [x, y - settings.label_offset],
                    settings.label_scale,
                    LABEL_COLOR,
                );
            }

            labels.push(classification.label);
            shapes.push(DetectedShape {
                contour_index: index,
                border: contour.border,
                bounding_box: contour.bounding_box(),
                polygon: classification.polygon,
                label: classification.label,
            });
        }

        debug!(contours = contours.len(), "classified contours");
        Ok(ShapeDetection {
            image: canvas,
            labels,
            shapes,
        })
    }

    /// Mark centroid, axis and balance of every outermost region of the binarized image.
    ///
    /// Color input is reduced to gray with the BT.601 weights before thresholding.
    pub fn find_symmetry_image(&self, image: &DynamicImage) -> Result<SymmetryReport> {
        let settings = &self.config.symmetry;
        let gray = to_gray(image);
        let (binary, contours) = self.silhouette_stage.trace(&gray)?;

        let mut canvas = binary;
        let height = canvas.height() as i32;
        let mut regions = Vec::new();

        for (index, contour) in contours.iter().enumerate() {
            let Some(centroid) = contour.centroid() else {
                warn!(contour = index, "skipping contour with zero area");
                continue;
            };

            draw_closed_polyline(&mut canvas, &contour.points, settings.contour_thickness, SYMMETRY_INK);
            draw_marker(&mut canvas, [centroid.x, centroid.y], settings.centroid_radius, SYMMETRY_INK);
            draw_thick_line(
                &mut canvas,
                [centroid.x, 0],
                [centroid.x, height],
                settings.axis_thickness,
                SYMMETRY_INK,
            );

            let symmetric = self
                .symmetry_test
                .is_symmetric(&contour.points, centroid, settings.tolerance);
            if symmetric {
                draw_label(
                    &mut canvas,
                    self.font.as_ref(),
                    SYMMETRY_LABEL,
                    [centroid.x - 30, centroid.y - 10],
                    settings.label_scale,
                    SYMMETRY_TEXT,
                );
            }

            regions.push(SymmetryRegion {
                contour_index: index,
                centroid,
                symmetric,
            });
        }

        debug!(
            contours = contours.len(),
            regions = regions.len(),
            symmetric = regions.iter().filter(|r| r.symmetric).count(),
            "analyzed symmetry"
        );
        Ok(SymmetryReport {
            image: canvas,
            regions,
        })
    }

    /// Close small gaps in dark outlines and blank out everything they enclose.
    pub fn complete_curves_image(&self, image: &DynamicImage) -> Result<CurveCompletion> {
        let settings = &self.config.completion;
        let gray = to_gray(image);

        let blurred = GaussianBlurPreprocessor {
            kernel_size: settings.blur_kernel_size,
        }
        .preprocess(&gray)?;
        let strokes = ThresholdPreprocessor::inverse(settings.threshold).preprocess(&blurred)?;
        let closed = close_binary(&strokes, settings.kernel_size, settings.iterations);

        let regions = ImageprocContourExtractor::external().extract_contours(&closed)?;
        let filled = fill_contours(gray.width(), gray.height(), &regions);
        let completed = mask_out(&gray, &strokes, &filled);

        debug!(regions = regions.len(), "completed curves");
        Ok(CurveCompletion {
            image: completed,
            filled_regions: regions.len(),
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(
            AnalysisConfig::default(),
            Box::new(DouglasPeuckerApproximator),
            symmetry_test_for(Default::default()),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShapeLabel;

    fn white_canvas(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255u8]))
    }

    /// Black square outline, 3 px strokes, optional gap in the left side.
    fn outlined_square(gap: u32) -> GrayImage {
        let mut img = white_canvas(120, 120);
        for i in 30..=90 {
            for t in 0..3 {
                img.put_pixel(i, 30 + t, Luma([0u8]));
                img.put_pixel(i, 88 + t, Luma([0u8]));
                img.put_pixel(88 + t, i, Luma([0u8]));
                if i < 55 || i >= 55 + gap {
                    img.put_pixel(30 + t, i, Luma([0u8]));
                }
            }
        }
        img
    }

    fn diamond(img: &mut GrayImage, cx: u32, cy: u32, half: u32) {
        for dy in 0..=2 * half {
            let y = cy + dy - half;
            let width = half - (dy as i32 - half as i32).unsigned_abs();
            for x in cx - width..=cx + width {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
    }

    #[test]
    fn test_contour_stage_keeps_processed_image() {
        let mut img = GrayImage::new(50, 50);
        diamond(&mut img, 25, 25, 5);
        let stage = ContourStage::silhouettes(&AnalysisConfig::default());
        let (binary, contours) = stage.trace(&img).unwrap();
        assert_eq!(contours.len(), 1);
        assert!(binary.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_detect_shapes_labels_follow_contours() {
        let mut img = GrayImage::new(160, 160);
        for y in 40..=120 {
            for x in 40..=120 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let image = DynamicImage::ImageLuma8(img);
        let detection = Pipeline::default().detect_shapes_image(&image).unwrap();

        assert!(!detection.labels.is_empty());
        assert_eq!(detection.labels.len(), detection.shapes.len());
        assert_eq!(detection.image.dimensions(), (160, 160));
        for (index, shape) in detection.shapes.iter().enumerate() {
            assert_eq!(shape.contour_index, index);
            assert_eq!(shape.label, detection.labels[index]);
        }
        // outlines are drawn in green on the color copy
        assert!(detection.image.pixels().any(|p| *p == OUTLINE_COLOR));
    }

    #[test]
    fn test_detect_shapes_on_blank_image() {
        let image = DynamicImage::ImageLuma8(white_canvas(40, 40));
        let detection = Pipeline::default().detect_shapes_image(&image).unwrap();
        assert!(detection.labels.is_empty());
        assert!(detection.image.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_symmetry_marks_narrow_diamond() {
        let mut img = GrayImage::new(100, 100);
        diamond(&mut img, 50, 15, 5);
        let report = Pipeline::default()
            .find_symmetry_image(&DynamicImage::ImageLuma8(img))
            .unwrap();

        assert_eq!(report.regions.len(), 1);
        assert!(report.regions[0].symmetric);
        assert_eq!(report.regions[0].centroid, crate::types::Centroid { x: 50, y: 15 });
    }

    #[test]
    fn test_symmetry_rejects_wide_rectangle() {
        let mut img = GrayImage::new(200, 100);
        for y in 40..60 {
            for x in 20..180 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let report = Pipeline::default()
            .find_symmetry_image(&DynamicImage::ImageLuma8(img))
            .unwrap();
        assert_eq!(report.regions.len(), 1);
        assert!(!report.regions[0].symmetric);
        assert_eq!(report.symmetric_count(), 0);

        // the axis crosses the foreground through the centroid, the rest stays white
        let cx = report.regions[0].centroid.x as u32;
        assert_eq!(cx, 99);
        assert_eq!(report.image.get_pixel(cx, 57)[0], 0);
        assert_eq!(report.image.get_pixel(140, 50)[0], 255);
    }

    #[test]
    fn test_symmetry_without_contours_returns_binarized_copy() {
        let img = GrayImage::from_pixel(30, 30, Luma([90u8]));
        let report = Pipeline::default()
            .find_symmetry_image(&DynamicImage::ImageLuma8(img))
            .unwrap();
        assert!(report.regions.is_empty());
        assert!(report.image.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_completion_closes_gap() {
        let image = DynamicImage::ImageLuma8(outlined_square(4));
        let completion = Pipeline::default().complete_curves_image(&image).unwrap();
        assert_eq!(completion.filled_regions, 1);
        // enclosed interior is blanked, the page outside survives
        assert_eq!(completion.image.get_pixel(60, 60)[0], 0);
        assert_eq!(completion.image.get_pixel(5, 5)[0], 255);
    }

    #[test]
    fn test_completion_is_idempotent_on_closed_curves() {
        let pipeline = Pipeline::default();
        let first = pipeline
            .complete_curves_image(&DynamicImage::ImageLuma8(outlined_square(0)))
            .unwrap();
        let second = pipeline
            .complete_curves_image(&DynamicImage::ImageLuma8(first.image.clone()))
            .unwrap();

        let differing = first
            .image
            .pixels()
            .zip(second.image.pixels())
            .filter(|(a, b)| a != b)
            .count();
        let total = (first.image.width() * first.image.height()) as usize;
        assert!(differing * 100 <= total, "{differing} of {total} pixels differ");
    }

    #[test]
    fn test_input_is_not_mutated() {
        let source = DynamicImage::ImageLuma8(outlined_square(4));
        let before = source.clone();
        let pipeline = Pipeline::default();
        pipeline.detect_shapes_image(&source).unwrap();
        pipeline.find_symmetry_image(&source).unwrap();
        pipeline.complete_curves_image(&source).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let pipeline = Pipeline::default();
        let path = std::env::temp_dir().join("shapes-pipeline-missing.png");
        assert!(pipeline.detect_shapes(&path).unwrap_err().is_load_error());
        assert!(pipeline.find_symmetry(&path).unwrap_err().is_load_error());
        assert!(pipeline.complete_curves(&path).unwrap_err().is_load_error());
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let path = std::env::temp_dir().join(format!("shapes-corrupt-{}.png", std::process::id()));
        std::fs::write(&path, b"definitely not a png").unwrap();

        let pipeline = Pipeline::default();
        assert!(matches!(pipeline.detect_shapes(&path), Err(ShapeError::ImageLoad { .. })));
        assert!(matches!(pipeline.find_symmetry(&path), Err(ShapeError::ImageLoad { .. })));
        assert!(matches!(pipeline.complete_curves(&path), Err(ShapeError::ImageLoad { .. })));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_default_pipeline_draws_shape_labels() {
        let mut img = GrayImage::new(160, 160);
        for y in 40..=140 {
            for x in 40..=140 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let pipeline = Pipeline::default();
        assert!(pipeline.has_font());

        let detection = pipeline
            .detect_shapes_image(&DynamicImage::ImageLuma8(img))
            .unwrap();
        assert!(detection.labels.contains(&ShapeLabel::Square));
        // blue label text above the square, on the black background
        let blue = detection
            .image
            .pixels()
            .filter(|p| p[2] > 128 && p[0] < 64 && p[1] < 64)
            .count();
        assert!(blue > 0, "no label pixels drawn");
    }

    #[test]
    fn test_default_pipeline_draws_symmetric_label() {
        let mut img = GrayImage::new(100, 100);
        diamond(&mut img, 50, 50, 5);
        let report = Pipeline::default()
            .find_symmetry_image(&DynamicImage::ImageLuma8(img))
            .unwrap();
        assert!(report.regions[0].symmetric);

        // "Symmetric" starts 30 px left of the centroid, clear of the diamond and axis
        let text = (20..46)
            .flat_map(|y| (0..44).map(move |x| (x, y)))
            .filter(|&(x, y)| report.image.get_pixel(x, y)[0] > 128)
            .count();
        assert!(text > 0, "no label pixels drawn");
    }

    #[test]
    fn test_label_strings_for_detection() {
        let labels = [ShapeLabel::Square, ShapeLabel::Polygon(9)];
        let text: Vec<String> = labels.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["Square", "Polygon (9 sides)"]);
    }
}
