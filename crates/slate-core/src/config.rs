//! # Configuration
//!
//! Injectable weight and threshold tables for the readiness and temporal
//! engines. Every field has a reference default, and every struct is
//! `#[serde(default)]`, so a partial TOML file overrides only what it names:
//!
//! ```toml
//! [readiness]
//! eligible_threshold = 80.0
//!
//! [readiness.weights]
//! concept = 0.30
//! arc = 0.20
//! grid = 0.20
//! characters = 0.20
//! format = 0.10
//!
//! [temporal]
//! retention_floor = 65.0
//! ```
//!
//! Call [`SlateConfig::validate`] (done by [`SlateConfig::from_toml_str`])
//! before handing a config to the engines.

#![allow(clippy::float_arithmetic)]

use crate::readiness::Component;
use crate::types::SlateError;
use serde::{Deserialize, Serialize};

/// Allowed drift of a weight set from 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// =============================================================================
// TOP LEVEL
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlateConfig {
    pub readiness: ReadinessConfig,
    pub temporal: TemporalConfig,
}

impl SlateConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, SlateError> {
        let config: SlateConfig =
            toml::from_str(text).map_err(|e| SlateError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), SlateError> {
        self.readiness.validate()?;
        self.temporal.validate()
    }
}

// =============================================================================
// READINESS
// =============================================================================

/// Readiness scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Component weights; must sum to 1.0.
    pub weights: ComponentWeights,
    /// Per-component point deductions.
    pub deductions: DeductionTable,
    /// Composite score at or above which a fully-gated project is eligible.
    pub eligible_threshold: f64,
    /// Blockers kept after truncation (by evaluation order).
    pub max_blockers: usize,
    /// Minimum canon consistency score for the `canon_consistent` gate.
    pub canon_consistency_floor: f64,
    /// Ceiling applied to continuity components while high drift flags are open.
    pub drift_clamp: u8,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            weights: ComponentWeights::default(),
            deductions: DeductionTable::default(),
            eligible_threshold: 75.0,
            max_blockers: 6,
            canon_consistency_floor: 70.0,
            drift_clamp: 50,
        }
    }
}

impl ReadinessConfig {
    pub fn validate(&self) -> Result<(), SlateError> {
        self.weights.validate()?;
        if !(0.0..=100.0).contains(&self.eligible_threshold) {
            return Err(SlateError::InvalidConfig(format!(
                "eligible_threshold {} outside [0, 100]",
                self.eligible_threshold
            )));
        }
        if !(0.0..=100.0).contains(&self.canon_consistency_floor) {
            return Err(SlateError::InvalidConfig(format!(
                "canon_consistency_floor {} outside [0, 100]",
                self.canon_consistency_floor
            )));
        }
        if self.max_blockers == 0 {
            return Err(SlateError::InvalidConfig(
                "max_blockers must be at least 1".to_string(),
            ));
        }
        if self.drift_clamp > 100 {
            return Err(SlateError::InvalidConfig(format!(
                "drift_clamp {} exceeds 100",
                self.drift_clamp
            )));
        }
        Ok(())
    }
}

/// Weights of the five readiness components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub concept: f64,
    pub arc: f64,
    pub grid: f64,
    pub characters: f64,
    pub format: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            concept: 0.25,
            arc: 0.25,
            grid: 0.20,
            characters: 0.20,
            format: 0.10,
        }
    }
}

impl ComponentWeights {
    #[must_use]
    pub fn weight(&self, component: Component) -> f64 {
        match component {
            Component::Concept => self.concept,
            Component::Arc => self.arc,
            Component::Grid => self.grid,
            Component::Characters => self.characters,
            Component::Format => self.format,
        }
    }

    pub fn validate(&self) -> Result<(), SlateError> {
        validate_weight_set(
            "readiness.weights",
            &[
                self.concept,
                self.arc,
                self.grid,
                self.characters,
                self.format,
            ],
        )
    }
}

/// Point deductions for one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Artifact does not exist.
    pub missing: u8,
    /// Artifact exists but is not approved.
    pub unapproved: u8,
    /// Placeholder tokens found in the artifact text.
    pub placeholders: u8,
    /// Per required keyword absent from the artifact text.
    pub per_keyword: u8,
}

impl Deductions {
    #[must_use]
    pub const fn new(missing: u8, unapproved: u8, placeholders: u8, per_keyword: u8) -> Self {
        Self {
            missing,
            unapproved,
            placeholders,
            per_keyword,
        }
    }
}

/// Deductions for every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionTable {
    pub concept: Deductions,
    pub arc: Deductions,
    pub grid: Deductions,
    pub characters: Deductions,
    pub format: Deductions,
}

impl Default for DeductionTable {
    fn default() -> Self {
        Self {
            concept: Deductions::new(50, 20, 15, 5),
            arc: Deductions::new(50, 20, 20, 5),
            grid: Deductions::new(45, 20, 20, 10),
            characters: Deductions::new(40, 15, 15, 5),
            format: Deductions::new(40, 15, 15, 5),
        }
    }
}

impl DeductionTable {
    #[must_use]
    pub fn for_component(&self, component: Component) -> Deductions {
        match component {
            Component::Concept => self.concept,
            Component::Arc => self.arc,
            Component::Grid => self.grid,
            Component::Characters => self.characters,
            Component::Format => self.format,
        }
    }
}

// =============================================================================
// TEMPORAL
// =============================================================================

/// Temporal metrics configuration: flag detectors and the unit floor gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// Points above target that count as overheated.
    pub overheat_margin: f64,
    /// Largest absolute delta that counts as flat.
    pub flatline_delta: f64,
    /// Absolute delta above which a swing is whiplash.
    pub whiplash_delta: f64,
    pub retention_floor: f64,
    pub cliffhanger_floor: f64,
    pub confusion_ceiling: f64,
    pub retention_weights: RetentionWeights,
    pub engagement_weights: EngagementWeights,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            overheat_margin: 15.0,
            flatline_delta: 5.0,
            whiplash_delta: 35.0,
            retention_floor: 60.0,
            cliffhanger_floor: 60.0,
            confusion_ceiling: 70.0,
            retention_weights: RetentionWeights::default(),
            engagement_weights: EngagementWeights::default(),
        }
    }
}

impl TemporalConfig {
    pub fn validate(&self) -> Result<(), SlateError> {
        validate_weight_set(
            "temporal.retention_weights",
            &[
                self.retention_weights.hook,
                self.retention_weights.cliffhanger,
                self.retention_weights.pacing,
            ],
        )?;
        validate_weight_set(
            "temporal.engagement_weights",
            &[
                self.engagement_weights.emotional,
                self.engagement_weights.character,
                self.engagement_weights.novelty,
            ],
        )?;
        for (name, value) in [
            ("overheat_margin", self.overheat_margin),
            ("flatline_delta", self.flatline_delta),
            ("whiplash_delta", self.whiplash_delta),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SlateError::InvalidConfig(format!(
                    "temporal.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Sub-factor weights of the retention composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionWeights {
    pub hook: f64,
    pub cliffhanger: f64,
    pub pacing: f64,
}

impl Default for RetentionWeights {
    fn default() -> Self {
        Self {
            hook: 0.35,
            cliffhanger: 0.35,
            pacing: 0.30,
        }
    }
}

/// Sub-factor weights of the engagement composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementWeights {
    pub emotional: f64,
    pub character: f64,
    pub novelty: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            emotional: 0.40,
            character: 0.35,
            novelty: 0.25,
        }
    }
}

fn validate_weight_set(name: &str, weights: &[f64]) -> Result<(), SlateError> {
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(SlateError::InvalidConfig(format!(
            "{name} contains invalid weight {bad}"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(SlateError::InvalidConfig(format!(
            "{name} must sum to 1.0, got {sum}"
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
