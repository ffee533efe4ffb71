use crate::area::{AreaCalculator, METERS_PER_DEGREE_AT_EQUATOR};
use crate::drawing::DrawingPolicy;
use crate::error::{Result, TerrasiteError};
use crate::import::ImportOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for terrain drawing, import and area computation
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub min_drawing_vertices: ConfigValue<usize>,
    pub min_import_vertices: ConfigValue<usize>,
    pub meters_per_degree: ConfigValue<f64>,
    pub placeholder_prefix: ConfigValue<String>,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            min_drawing_vertices: ConfigValue::new(4, ConfigSource::Default),
            min_import_vertices: ConfigValue::new(4, ConfigSource::Default),
            meters_per_degree: ConfigValue::new(METERS_PER_DEGREE_AT_EQUATOR, ConfigSource::Default),
            placeholder_prefix: ConfigValue::new("Terrain".to_string(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| TerrasiteError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| TerrasiteError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(min) = file_config.min_drawing_vertices {
            self.min_drawing_vertices
                .update(validate_vertex_floor("min_drawing_vertices", min)?, ConfigSource::File);
        }

        if let Some(min) = file_config.min_import_vertices {
            self.min_import_vertices
                .update(validate_vertex_floor("min_import_vertices", min)?, ConfigSource::File);
        }

        if let Some(mpd) = file_config.meters_per_degree {
            self.meters_per_degree.update(validate_meters_per_degree(mpd)?, ConfigSource::File);
        }

        if let Some(prefix) = file_config.placeholder_prefix {
            self.placeholder_prefix.update(prefix, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // TERRASITE_MIN_DRAWING_VERTICES
        if let Ok(raw) = env::var("TERRASITE_MIN_DRAWING_VERTICES") {
            match parse_vertex_floor("min_drawing_vertices", &raw) {
                Ok(min) => self.min_drawing_vertices.update(min, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid TERRASITE_MIN_DRAWING_VERTICES value '{}': expected an integer >= 3",
                    raw
                ),
            }
        }

        // TERRASITE_MIN_IMPORT_VERTICES
        if let Ok(raw) = env::var("TERRASITE_MIN_IMPORT_VERTICES") {
            match parse_vertex_floor("min_import_vertices", &raw) {
                Ok(min) => self.min_import_vertices.update(min, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid TERRASITE_MIN_IMPORT_VERTICES value '{}': expected an integer >= 3",
                    raw
                ),
            }
        }

        // TERRASITE_METERS_PER_DEGREE
        if let Ok(raw) = env::var("TERRASITE_METERS_PER_DEGREE") {
            match parse_meters_per_degree(&raw) {
                Ok(mpd) => self.meters_per_degree.update(mpd, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid TERRASITE_METERS_PER_DEGREE value '{}': expected a positive number",
                    raw
                ),
            }
        }

        // TERRASITE_PLACEHOLDER_PREFIX
        if let Ok(prefix) = env::var("TERRASITE_PLACEHOLDER_PREFIX") {
            self.placeholder_prefix.update(prefix, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(min) = overrides.min_drawing_vertices {
            self.min_drawing_vertices.update(min, ConfigSource::Cli);
        }

        if let Some(min) = overrides.min_import_vertices {
            self.min_import_vertices.update(min, ConfigSource::Cli);
        }

        if let Some(mpd) = overrides.meters_per_degree {
            self.meters_per_degree.update(mpd, ConfigSource::Cli);
        }

        if let Some(prefix) = overrides.placeholder_prefix {
            self.placeholder_prefix.update(prefix, ConfigSource::Cli);
        }
    }

    pub fn drawing_policy(&self) -> DrawingPolicy {
        DrawingPolicy::new(self.min_drawing_vertices.value)
    }

    pub fn area_calculator(&self) -> AreaCalculator {
        AreaCalculator::new(self.meters_per_degree.value)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            min_vertices: self.min_import_vertices.value,
            placeholder_prefix: self.placeholder_prefix.value.clone(),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "min_drawing_vertices".to_string(),
            (self.min_drawing_vertices.value.to_string(), self.min_drawing_vertices.source),
        );

        map.insert(
            "min_import_vertices".to_string(),
            (self.min_import_vertices.value.to_string(), self.min_import_vertices.source),
        );

        map.insert(
            "meters_per_degree".to_string(),
            (self.meters_per_degree.value.to_string(), self.meters_per_degree.source),
        );

        map.insert(
            "placeholder_prefix".to_string(),
            (self.placeholder_prefix.value.clone(), self.placeholder_prefix.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    min_drawing_vertices: Option<usize>,
    min_import_vertices: Option<usize>,
    meters_per_degree: Option<f64>,
    placeholder_prefix: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub min_drawing_vertices: Option<usize>,
    pub min_import_vertices: Option<usize>,
    pub meters_per_degree: Option<f64>,
    pub placeholder_prefix: Option<String>,
}

/// Parse a vertex floor; anything below a triangle is meaningless
pub fn parse_vertex_floor(key: &str, s: &str) -> Result<usize> {
    let value = s.trim().parse::<usize>().map_err(|_| TerrasiteError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("Invalid vertex count: {}", s),
    })?;
    validate_vertex_floor(key, value)
}

/// Parse the meters-per-degree constant
pub fn parse_meters_per_degree(s: &str) -> Result<f64> {
    let value = s.trim().parse::<f64>().map_err(|_| TerrasiteError::ConfigInvalid {
        key: "meters_per_degree".to_string(),
        reason: format!("Invalid number: {}", s),
    })?;
    validate_meters_per_degree(value)
}

fn validate_vertex_floor(key: &str, value: usize) -> Result<usize> {
    if value < 3 {
        return Err(TerrasiteError::ConfigInvalid {
            key: key.to_string(),
            reason: format!("{} is below the 3 points needed for a ring", value),
        });
    }
    Ok(value)
}

fn validate_meters_per_degree(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(TerrasiteError::ConfigInvalid {
            key: "meters_per_degree".to_string(),
            reason: format!("{} is not a positive number", value),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.min_drawing_vertices.value, 4);
        assert_eq!(config.min_import_vertices.value, 4);
        assert_eq!(config.meters_per_degree.value, 111_320.0);
        assert_eq!(config.placeholder_prefix.value, "Terrain");
        assert_eq!(config.meters_per_degree.source, ConfigSource::Default);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
min_drawing_vertices = 5
min_import_vertices = 3
meters_per_degree = 111000.0
placeholder_prefix = "Parcelle"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.min_drawing_vertices.value, 5);
        assert_eq!(config.min_drawing_vertices.source, ConfigSource::File);
        assert_eq!(config.min_import_vertices.value, 3);
        assert_eq!(config.meters_per_degree.value, 111_000.0);
        assert_eq!(config.placeholder_prefix.value, "Parcelle");
    }

    #[test]
    fn test_file_rejects_bad_floor() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "min_drawing_vertices = 2").unwrap();

        let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, TerrasiteError::ConfigInvalid { ref key, .. } if key == "min_drawing_vertices"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            min_drawing_vertices: Some(6),
            meters_per_degree: Some(110_000.0),
            ..Default::default()
        });

        assert_eq!(config.min_drawing_vertices.value, 6);
        assert_eq!(config.min_drawing_vertices.source, ConfigSource::Cli);
        assert_eq!(config.meters_per_degree.value, 110_000.0);
        assert_eq!(config.min_import_vertices.source, ConfigSource::Default);
        assert_eq!(config.placeholder_prefix.source, ConfigSource::Default);
    }

    #[test]
    fn test_derived_components() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.drawing_policy().min_vertices(), 4);
        assert_eq!(config.area_calculator().meters_per_degree(), 111_320.0);

        let options = config.import_options();
        assert_eq!(options.min_vertices, 4);
        assert_eq!(options.placeholder_prefix, "Terrain");
    }

    #[test]
    fn test_parsers() {
        assert_eq!(parse_vertex_floor("k", "4").unwrap(), 4);
        assert_eq!(parse_vertex_floor("k", " 7 ").unwrap(), 7);
        assert!(parse_vertex_floor("k", "2").is_err());
        assert!(parse_vertex_floor("k", "four").is_err());

        assert_eq!(parse_meters_per_degree("111320").unwrap(), 111_320.0);
        assert!(parse_meters_per_degree("0").is_err());
        assert!(parse_meters_per_degree("-5").is_err());
        assert!(parse_meters_per_degree("inf").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 4);
        let (value, source) = &map["min_drawing_vertices"];
        assert_eq!(value, "4");
        assert_eq!(*source, ConfigSource::Default);
    }
}
