use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::DynamicImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::{info, warn};
use crate::{
    error::{Result, ShapeError},
    pipeline::Pipeline,
    types::{CurveCompletion, ShapeDetection, SymmetryReport},
};

#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(tag = "type")]
#[strum(serialize_all = "snake_case")]
pub enum AnalysisCommand {
    /// Label every traced outline with a geometric class
    #[serde(rename = "detect_shapes")]
    DetectShapes,

    /// Mark centroid, vertical axis and left/right balance of each region
    #[serde(rename = "find_symmetry")]
    FindSymmetry,

    /// Close small gaps in broken outlines
    #[serde(rename = "complete_curves")]
    CompleteCurves,
}

impl AnalysisCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Get a description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Self::DetectShapes => "Approximate each outline by a polygon and label it (Triangle, Square, ...)",
            Self::FindSymmetry => "Draw centroid and vertical axis of each region and mark the balanced ones",
            Self::CompleteCurves => "Bridge small gaps in dark outlines and blank out what they enclose",
        }
    }
}

/// Result of one command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "result", rename_all = "snake_case")]
pub enum AnalysisOutput {
    Shapes(ShapeDetection),
    Symmetry(SymmetryReport),
    Completion(CurveCompletion),
}

impl AnalysisOutput {
    pub fn command(&self) -> AnalysisCommand {
        match self {
            Self::Shapes(_) => AnalysisCommand::DetectShapes,
            Self::Symmetry(_) => AnalysisCommand::FindSymmetry,
            Self::Completion(_) => AnalysisCommand::CompleteCurves,
        }
    }

    /// The raster to display or save.
    pub fn image(&self) -> DynamicImage {
        match self {
            Self::Shapes(detection) => DynamicImage::ImageRgb8(detection.image.clone()),
            Self::Symmetry(report) => DynamicImage::ImageLuma8(report.image.clone()),
            Self::Completion(completion) => DynamicImage::ImageLuma8(completion.image.clone()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Interactive session state: the selected input and the last good result.
///
/// Commands run one at a time. A failing command leaves the previous output
/// in place.
#[derive(Clone)]
pub struct ImageAnalyzer {
    pipeline: Arc<Pipeline>,
    selected: Option<PathBuf>,
    last_output: Option<AnalysisOutput>,
}

impl ImageAnalyzer {
    pub fn new() -> Self {
        Self::with_pipeline(Pipeline::default())
    }

    /// Create a new analyzer with a custom pipeline
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            selected: None,
            last_output: None,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Select the image later commands run on. The file must exist.
    pub fn select_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ShapeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} was not found", path.display()),
            )));
        }
        info!(path = %path.display(), "selected image");
        self.selected = Some(path.to_path_buf());
        Ok(())
    }

    pub fn selected_image(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn last_output(&self) -> Option<&AnalysisOutput> {
        self.last_output.as_ref()
    }

    pub fn execute(&mut self, command: AnalysisCommand) -> Result<&AnalysisOutput> {
        let path = self.selected.as_ref().ok_or(ShapeError::NoImageSelected)?;

        let outcome = match command {
            AnalysisCommand::DetectShapes => self.pipeline.detect_shapes(path).map(AnalysisOutput::Shapes),
            AnalysisCommand::FindSymmetry => self.pipeline.find_symmetry(path).map(AnalysisOutput::Symmetry),
            AnalysisCommand::CompleteCurves => {
                self.pipeline.complete_curves(path).map(AnalysisOutput::Completion)
            }
        };

        match outcome {
            Ok(output) => Ok(&*self.last_output.insert(output)),
            Err(err) => {
                warn!(%command, error = %err, "command failed, keeping previous output");
                Err(err)
            }
        }
    }
}

impl Default for ImageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
