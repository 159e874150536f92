use floorplan::RecognizerConfig;

use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanCliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    PlanError(#[from] floorplan::PlanError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Load a recognizer configuration from TOML string
pub fn config_from_toml(content: &str) -> Result<RecognizerConfig, PlanCliError> {
    Ok(toml::from_str(content)?)
}

/// Load a recognizer configuration from JSON string
pub fn config_from_json(content: &str) -> Result<RecognizerConfig, PlanCliError> {
    Ok(serde_json::from_str(content)?)
}

/// Auto-detect file format and load configuration
pub fn config_from_file<P: AsRef<Path>>(path: P) -> Result<RecognizerConfig, PlanCliError> {
    let path_ref = path.as_ref();
    match path_ref.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => config_from_toml(&fs::read_to_string(path_ref)?),
        Some("json") => config_from_json(&fs::read_to_string(path_ref)?),
        _ => Err(PlanCliError::UnsupportedFileFormat),
    }
}

/// Convert a configuration to TOML string
pub fn config_to_toml(config: &RecognizerConfig) -> Result<String, PlanCliError> {
    Ok(toml::to_string_pretty(config)?)
}

/// JSON schema of the configuration file
pub fn config_schema() -> Result<String, PlanCliError> {
    let schema = schemars::schema_for!(RecognizerConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// Document text from a file; `None` when no file was given
pub fn read_text(path: Option<&Path>) -> Result<Option<String>, PlanCliError> {
    path.map(fs::read_to_string).transpose().map_err(PlanCliError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = config_from_toml(
            r#"
            scale = 0.01

            [lines]
            min_length = 40

            [walls]
            fill_missing_walls = true
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.scale, Some(0.01));
        assert_eq!(config.lines.min_length, 40);
        assert_eq!(config.lines.edge_threshold, RecognizerConfig::default().lines.edge_threshold);
        assert!(config.walls.fill_missing_walls);
        assert_eq!(config.rooms, RecognizerConfig::default().rooms);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RecognizerConfig::default();
        let text = config_to_toml(&config).expect("serializable");
        assert_eq!(config_from_toml(&text).expect("parsable"), config);
    }

    #[test]
    fn test_json_and_unknown_extension() {
        let config = config_from_json(r#"{"rooms": {"min_living_area": 9.0}}"#).expect("valid json");
        assert_eq!(config.rooms.min_living_area, 9.0);
        assert!(matches!(config_from_file("plan.yaml"), Err(PlanCliError::UnsupportedFileFormat)));
    }

    #[test]
    fn test_schema_names_sections() {
        let schema = config_schema().expect("schema");
        assert!(schema.contains("\"walls\""));
        assert!(schema.contains("\"min_living_area\""));
    }
}
