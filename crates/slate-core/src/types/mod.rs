//! # Core Type Definitions
//!
//! Shared input records and the crate-level error type:
//! - Collaborator inputs (`ArtifactRecord`, `ProjectCriteria`)
//! - Derived per-stage status (`StageStatus`)
//! - Shared enums (`Severity`)
//! - Error types (`SlateError`)
//!
//! ## Input Tolerance
//!
//! Records arrive from an external document registry. Every field is optional
//! on the wire: a missing or mistyped field degrades to "absent" instead of
//! failing the whole call. Only a structurally unusable input (an artifact list
//! that is not a list) is rejected with [`SlateError::InputShape`].

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use thiserror::Error;

// =============================================================================
// ARTIFACT RECORD
// =============================================================================

/// One document as reported by the document registry.
///
/// The core never mutates these; it only reads them to derive stage status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactRecord {
    /// Raw document type as stored by the registry (any casing/separators).
    #[serde(alias = "docType", alias = "stage")]
    pub doc_type: String,
    /// Whether the document exists.
    pub exists: bool,
    /// Whether the active version has been approved.
    #[serde(alias = "isApproved")]
    pub approved: bool,
    /// Identifier of the active version, if any.
    #[serde(alias = "activeVersionId", skip_serializing_if = "Option::is_none")]
    pub active_version_id: Option<String>,
    /// Text of the active version, used for placeholder and keyword scans.
    #[serde(alias = "rawText", skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl ArtifactRecord {
    /// Create an existing, unapproved artifact of the given type.
    #[must_use]
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            exists: true,
            ..Self::default()
        }
    }

    /// Mark this artifact as approved.
    #[must_use]
    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }

    /// Attach the active version's text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.raw_text = Some(text.into());
        self
    }

    /// Attach the active version identifier.
    #[must_use]
    pub fn with_version(mut self, version_id: impl Into<String>) -> Self {
        self.active_version_id = Some(version_id.into());
        self
    }

    /// Parse an artifact list from loosely-shaped JSON.
    ///
    /// Returns `SlateError::InputShape` if `value` is not an array. Elements
    /// that are not objects, and fields that are missing or of the wrong type,
    /// degrade to absent values.
    pub fn list_from_json(value: &Json) -> Result<Vec<ArtifactRecord>, SlateError> {
        let items = value.as_array().ok_or_else(|| {
            SlateError::InputShape(format!(
                "artifact list must be an array, got {}",
                json_kind(value)
            ))
        })?;

        Ok(items.iter().filter_map(Self::from_json_lenient).collect())
    }

    fn from_json_lenient(value: &Json) -> Option<ArtifactRecord> {
        let obj = value.as_object()?;
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| obj.get(*k).and_then(Json::as_str))
                .map(str::to_string)
        };
        let flag = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| obj.get(*k).and_then(Json::as_bool))
                .unwrap_or(false)
        };

        Some(ArtifactRecord {
            doc_type: text(&["docType", "doc_type", "stage"]).unwrap_or_default(),
            exists: flag(&["exists"]),
            approved: flag(&["approved", "isApproved", "is_approved"]),
            active_version_id: text(&["activeVersionId", "active_version_id"]),
            raw_text: text(&["rawText", "raw_text"]),
        })
    }
}

// =============================================================================
// STAGE STATUS
// =============================================================================

/// Status of one ladder stage, derived from the first matching artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageStatus {
    pub exists: bool,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_version_id: Option<String>,
}

impl StageStatus {
    /// Status for a stage with no matching artifact.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    /// Derive the status from an artifact record.
    #[must_use]
    pub fn from_record(record: &ArtifactRecord) -> Self {
        Self {
            exists: record.exists,
            approved: record.exists && record.approved,
            active_version_id: record.active_version_id.clone(),
        }
    }

    /// Exists but still waiting for approval.
    #[must_use]
    pub fn is_pending_approval(&self) -> bool {
        self.exists && !self.approved
    }
}

// =============================================================================
// PROJECT CRITERIA
// =============================================================================

/// Project-level criteria supplied by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectCriteria {
    /// Planned number of units (episodes) in the season.
    #[serde(alias = "unitCount", alias = "seasonEpisodeCount")]
    pub unit_count: Option<u32>,
    /// Minimum unit length (seconds or minutes, caller-defined).
    #[serde(alias = "unitLengthMin")]
    pub unit_length_min: Option<u32>,
    /// Maximum unit length.
    #[serde(alias = "unitLengthMax")]
    pub unit_length_max: Option<u32>,
    /// Canon consistency score (0-100) from the continuity checker.
    #[serde(alias = "canonConsistencyScore")]
    pub canon_consistency_score: Option<f64>,
    /// Number of unresolved high-severity drift flags.
    #[serde(alias = "openHighDriftFlagCount")]
    pub open_high_drift_flag_count: u32,
}

impl ProjectCriteria {
    /// Parse criteria from loosely-shaped JSON.
    ///
    /// Negative counts clamp to zero; `null` or non-object input yields the
    /// default (everything absent).
    #[must_use]
    pub fn from_json_lenient(value: &Json) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let count = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| obj.get(*k).and_then(Json::as_i64))
                .map(|n| n.clamp(0, i64::from(u32::MAX)) as u32)
        };

        Self {
            unit_count: count(&["unitCount", "unit_count", "seasonEpisodeCount"]),
            unit_length_min: count(&["unitLengthMin", "unit_length_min"]),
            unit_length_max: count(&["unitLengthMax", "unit_length_max"]),
            canon_consistency_score: ["canonConsistencyScore", "canon_consistency_score"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Json::as_f64)),
            open_high_drift_flag_count: count(&[
                "openHighDriftFlagCount",
                "open_high_drift_flag_count",
            ])
            .unwrap_or(0),
        }
    }
}

// =============================================================================
// SEVERITY
// =============================================================================

/// Severity attached to blockers and unit recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Med,
    Low,
}

impl Severity {
    /// Wire token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Med => "med",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in Slate.
///
/// - Missing data is never an error; it surfaces as blockers or flags
/// - The core never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum SlateError {
    /// Input is structurally unusable (not a list, out-of-order history).
    #[error("Invalid input shape: {0}")]
    InputShape(String),

    /// Configuration values are inconsistent (weights, thresholds).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

// =============================================================================
// TESTS
// =============================================================================
