use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shapes::{AnalysisConfig, Pipeline, ShapeError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Image formats the CLI accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("Image not found: {0}")]
    MissingImage(PathBuf),
    #[error("Unsupported image format {0}. Please use .png, .jpg or .jpeg files")]
    UnsupportedImageFormat(PathBuf),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Settings file: analysis parameters plus an optional label font
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RunConfig {
    /// TrueType/OpenType font used to draw labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    #[serde(flatten)]
    pub analysis: AnalysisConfig,
}

impl RunConfig {
    /// Load RunConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load RunConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load RunConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load RunConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Convert RunConfig to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert RunConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Build the pipeline, with a font given on the command line taking precedence
    pub fn build_pipeline(self, font_override: Option<&Path>) -> Result<Pipeline, CliError> {
        let mut builder = Pipeline::builder().with_config(self.analysis);
        if let Some(font) = font_override.or(self.font.as_deref()) {
            builder = builder.with_font_file(font)?;
        }
        Ok(builder.build()?)
    }
}

/// Check that `path` names an existing png/jpg/jpeg file.
pub fn check_image_path(path: &Path) -> Result<(), CliError> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !supported {
        return Err(CliError::UnsupportedImageFormat(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(CliError::MissingImage(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapes::SymmetryMethod;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RunConfig::from_toml(
            r#"
font = "fonts/DejaVuSans.ttf"

[classifier]
epsilon_fraction = 0.04

[symmetry]
method = "mirror"
"#,
        )
        .unwrap();
        assert_eq!(config.font, Some(PathBuf::from("fonts/DejaVuSans.ttf")));
        assert_eq!(config.analysis.classifier.epsilon_fraction, 0.04);
        assert_eq!(config.analysis.classifier.max_polygon_vertices, 12);
        assert_eq!(config.analysis.symmetry.method, SymmetryMethod::Mirror);
        assert_eq!(config.analysis.completion, AnalysisConfig::default().completion);
    }

    #[test]
    fn test_json_config() {
        let config = RunConfig::from_json(r#"{"completion": {"iterations": 1}}"#).unwrap();
        assert_eq!(config.font, None);
        assert_eq!(config.analysis.completion.iterations, 1);
        assert_eq!(config.analysis.completion.kernel_size, 5);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RunConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(RunConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_unsupported_config_extension() {
        assert!(matches!(
            RunConfig::from_file("settings.yaml"),
            Err(CliError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_invalid_config_fails_pipeline_build() {
        let config = RunConfig::from_toml("[completion]\nkernel_size = 4\n").unwrap();
        assert!(matches!(
            config.build_pipeline(None),
            Err(CliError::Shape(ShapeError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_image_path_checks() {
        assert!(matches!(
            check_image_path(Path::new("picture.gif")),
            Err(CliError::UnsupportedImageFormat(_))
        ));
        assert!(matches!(
            check_image_path(Path::new("/nonexistent/picture.PNG")),
            Err(CliError::MissingImage(_))
        ));
    }
}
