//! # Input Files
//!
//! Loading of project snapshots, metric histories and configuration from
//! disk. Every path is canonicalized and size-checked before it is read.
//!
//! ## Project File
//!
//! ```json
//! {
//!   "format": "vertical_drama",
//!   "artifacts": [{"docType": "concept_brief", "exists": true, "isApproved": true}],
//!   "criteria": {"seasonEpisodeCount": 60}
//! }
//! ```
//!
//! ## Metrics File
//!
//! Either a bare array of unit snapshots, or
//! `{"total_units": 60, "snapshots": [...]}`.

use serde_json::Value as Json;
use slate_core::{
    ArtifactRecord, Format, MetricHistory, MetricSnapshot, ProjectCriteria, SlateConfig,
    SlateError,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a project or metrics file (16 MB).
pub const MAX_INPUT_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Maximum size of a config file (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), SlateError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| SlateError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(SlateError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize `path` and ensure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, SlateError> {
    let canonical = path.canonicalize().map_err(|e| {
        SlateError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(SlateError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read a validated input file to a string.
pub fn read_input_file(path: &Path, max_size: u64) -> Result<String, SlateError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, max_size)?;

    std::fs::read_to_string(&validated)
        .map_err(|e| SlateError::Io(format!("Read {}: {}", path.display(), e)))
}

fn read_json(path: &Path) -> Result<Json, SlateError> {
    let text = read_input_file(path, MAX_INPUT_FILE_SIZE)?;
    serde_json::from_str(&text)
        .map_err(|e| SlateError::Serialization(format!("{}: {}", path.display(), e)))
}

// =============================================================================
// PROJECT
// =============================================================================

/// A project snapshot as handed to the core.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub format: Format,
    /// The format key as written in the file.
    pub format_key: String,
    pub artifacts: Vec<ArtifactRecord>,
    pub criteria: ProjectCriteria,
}

impl Project {
    /// Build a project from loosely-shaped JSON.
    ///
    /// A missing `artifacts` field means no artifacts; a present one that is
    /// not an array is rejected. Unknown formats fall back to the default.
    pub fn from_json(value: &Json) -> Result<Self, SlateError> {
        let obj = value.as_object().ok_or_else(|| {
            SlateError::InputShape("project file must contain a JSON object".to_string())
        })?;

        let format_key = obj
            .get("format")
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();
        let format = resolve_format(&format_key);

        let artifacts = match obj.get("artifacts") {
            None | Some(Json::Null) => Vec::new(),
            Some(list) => ArtifactRecord::list_from_json(list)?,
        };
        let criteria = obj
            .get("criteria")
            .map(ProjectCriteria::from_json_lenient)
            .unwrap_or_default();

        Ok(Self {
            format,
            format_key,
            artifacts,
            criteria,
        })
    }
}

/// Resolve a format key, warning when it falls back to the default ladder.
pub fn resolve_format(format_key: &str) -> Format {
    Format::parse(format_key).unwrap_or_else(|| {
        let fallback = Format::default();
        tracing::warn!(
            format = %format_key,
            fallback = %fallback,
            "Unknown format, using default ladder"
        );
        fallback
    })
}

/// Load a project file.
pub fn load_project(path: &Path) -> Result<Project, SlateError> {
    let project = Project::from_json(&read_json(path)?)?;
    tracing::debug!(
        path = %path.display(),
        format = %project.format,
        artifacts = project.artifacts.len(),
        "Loaded project"
    );
    Ok(project)
}

// =============================================================================
// METRICS
// =============================================================================

/// A unit metric history plus the planned season length, if recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsFile {
    pub total_units: Option<u32>,
    pub history: MetricHistory,
}

impl MetricsFile {
    pub fn from_json(value: &Json) -> Result<Self, SlateError> {
        let (total_units, snapshots) = match value {
            Json::Array(_) => (None, value.clone()),
            Json::Object(obj) => {
                let total = ["total_units", "totalUnits"]
                    .iter()
                    .find_map(|k| obj.get(*k).and_then(Json::as_u64))
                    .map(|n| u32::try_from(n).unwrap_or(u32::MAX));
                let snapshots = ["snapshots", "units"]
                    .iter()
                    .find_map(|k| obj.get(*k))
                    .cloned()
                    .unwrap_or_else(|| Json::Array(Vec::new()));
                (total, snapshots)
            }
            _ => {
                return Err(SlateError::InputShape(
                    "metrics file must contain an array or an object".to_string(),
                ));
            }
        };

        let snapshots: Vec<MetricSnapshot> = serde_json::from_value(snapshots)
            .map_err(|e| SlateError::Serialization(format!("metric snapshots: {}", e)))?;
        let history = MetricHistory::from_snapshots(snapshots)?;

        Ok(Self {
            total_units,
            history,
        })
    }

    /// Season length: explicit override, then the file's own value, then
    /// the project's unit count, then the history length.
    #[must_use]
    pub fn resolve_total_units(
        &self,
        overridden: Option<u32>,
        criteria: Option<&ProjectCriteria>,
    ) -> u32 {
        overridden
            .or(self.total_units)
            .or_else(|| criteria.and_then(|c| c.unit_count))
            .unwrap_or_else(|| u32::try_from(self.history.len()).unwrap_or(u32::MAX))
    }
}

/// Load a metrics file.
pub fn load_metrics(path: &Path) -> Result<MetricsFile, SlateError> {
    let metrics = MetricsFile::from_json(&read_json(path)?)?;
    tracing::debug!(
        path = %path.display(),
        units = metrics.history.len(),
        "Loaded metric history"
    );
    Ok(metrics)
}

// =============================================================================
// CONFIG
// =============================================================================

/// Load and validate configuration; built-in defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<SlateConfig, SlateError> {
    let Some(path) = path else {
        return Ok(SlateConfig::default());
    };

    let text = read_input_file(path, MAX_CONFIG_FILE_SIZE)?;
    let config = SlateConfig::from_toml_str(&text)?;
    tracing::info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
