//! # Temporal Metrics
//!
//! Per-unit metric analysis for episodic formats:
//! - the target tension trajectory across a season,
//! - retention and engagement composites,
//! - drift flags detected from the metric history,
//! - the hard floor gate a unit must clear before the next one is generated.
//!
//! The signal of interest is the *deviation* from the target curve, not the
//! raw tension value.
//!
//! ## Target Curve
//!
//! | Segment | pct | Shape |
//! |---------|-----|-------|
//! | Opening | ≤ 0.15 | 40 → 65 |
//! | Build | ≤ 0.60 | 60 → 75 base, ±5 wave (~4 units), capped at 85 |
//! | Escalation | ≤ 0.85 | 78 → 88 |
//! | Finale | > 0.85 | 85 → 95 |
//!
//! The build and finale segments carry an offset that fades across the
//! segment so the curve meets its neighbours exactly at 0.15, 0.60 and 0.85.

#![allow(clippy::float_arithmetic)]

use crate::config::{EngagementWeights, RetentionWeights, TemporalConfig};
use crate::types::{Severity, SlateError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const OPENING_END: f64 = 0.15;
const BUILD_END: f64 = 0.60;
const ESCALATION_END: f64 = 0.85;

const WAVE_AMPLITUDE: f64 = 5.0;
const WAVE_PERIOD_UNITS: f64 = 4.0;
const BUILD_CAP: f64 = 85.0;

// =============================================================================
// TARGET CURVE
// =============================================================================

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Target tension for unit `unit_index` of `total_units`.
///
/// `total_units == 0` is treated as a single-unit season.
#[must_use]
pub fn target_tension(unit_index: u32, total_units: u32) -> f64 {
    let total = total_units.max(1);
    target_tension_at(f64::from(unit_index) / f64::from(total), total)
}

/// Target tension at season position `pct` (clamped to `[0, 1]`).
///
/// `total_units` sets how many wave cycles fit into the build segment.
#[must_use]
pub fn target_tension_at(pct: f64, total_units: u32) -> f64 {
    let pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 1.0) };

    if pct <= OPENING_END {
        lerp(40.0, 65.0, pct / OPENING_END)
    } else if pct <= BUILD_END {
        let t = (pct - OPENING_END) / (BUILD_END - OPENING_END);
        let base = lerp(60.0, 75.0, t);
        let offset = lerp(5.0, 3.0, t);

        // Whole half-periods so the wave is zero at both segment edges.
        let span_units = (BUILD_END - OPENING_END) * f64::from(total_units.max(1));
        let half_periods = (span_units / (WAVE_PERIOD_UNITS / 2.0)).round().max(1.0);
        let wave = WAVE_AMPLITUDE * (PI * half_periods * t).sin();

        (base + offset + wave).min(BUILD_CAP)
    } else if pct <= ESCALATION_END {
        let t = (pct - BUILD_END) / (ESCALATION_END - BUILD_END);
        lerp(78.0, 88.0, t)
    } else {
        let t = (pct - ESCALATION_END) / (1.0 - ESCALATION_END);
        lerp(85.0, 95.0, t) + lerp(3.0, 0.0, t)
    }
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

/// Retention sub-factors (0-100 each).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionFactors {
    pub hook: f64,
    pub cliffhanger: f64,
    pub pacing: f64,
}

impl RetentionFactors {
    #[must_use]
    pub fn score(&self, weights: &RetentionWeights) -> f64 {
        weights.hook * self.hook
            + weights.cliffhanger * self.cliffhanger
            + weights.pacing * self.pacing
    }
}

/// Engagement sub-factors (0-100 each).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementFactors {
    pub emotional: f64,
    pub character: f64,
    pub novelty: f64,
}

impl EngagementFactors {
    #[must_use]
    pub fn score(&self, weights: &EngagementWeights) -> f64 {
        weights.emotional * self.emotional
            + weights.character * self.character
            + weights.novelty * self.novelty
    }
}

/// A reviewer or model recommendation attached to a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: Severity,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Metrics recorded for one unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSnapshot {
    #[serde(alias = "unitIndex")]
    pub unit_index: u32,
    #[serde(alias = "tensionLevel")]
    pub tension_level: f64,
    /// Change in tension from the previous unit.
    #[serde(alias = "tensionDelta")]
    pub tension_delta: f64,
    pub retention: RetentionFactors,
    pub engagement: EngagementFactors,
    /// Confusion score (0-100, lower is better).
    pub confusion: f64,
    pub recommendations: Vec<Recommendation>,
}

/// Derived composites of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScores {
    pub retention: f64,
    pub engagement: f64,
}

impl MetricSnapshot {
    #[must_use]
    pub fn composites(&self, config: &TemporalConfig) -> CompositeScores {
        CompositeScores {
            retention: self.retention.score(&config.retention_weights),
            engagement: self.engagement.score(&config.engagement_weights),
        }
    }

    /// Inputs of the unit floor gate.
    #[must_use]
    pub fn unit_metrics(&self, config: &TemporalConfig) -> UnitMetrics {
        UnitMetrics {
            retention: self.retention.score(&config.retention_weights),
            cliffhanger: self.retention.cliffhanger,
            confusion: self.confusion,
            recommendations: self.recommendations.clone(),
        }
    }

    /// Tension minus target.
    #[must_use]
    pub fn tension_deviation(&self, total_units: u32) -> f64 {
        self.tension_level - target_tension(self.unit_index, total_units)
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// Append-only, strictly ordered per-project snapshot history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricHistory {
    snapshots: Vec<MetricSnapshot>,
}

impl MetricHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history, rejecting out-of-order unit indices.
    pub fn from_snapshots(snapshots: Vec<MetricSnapshot>) -> Result<Self, SlateError> {
        let mut history = Self::new();
        for snapshot in snapshots {
            history.append(snapshot)?;
        }
        Ok(history)
    }

    /// Append a snapshot; its unit index must exceed the last one's.
    pub fn append(&mut self, snapshot: MetricSnapshot) -> Result<(), SlateError> {
        if let Some(last) = self.snapshots.last()
            && snapshot.unit_index <= last.unit_index
        {
            return Err(SlateError::InputShape(format!(
                "unit {} appended after unit {}",
                snapshot.unit_index, last.unit_index
            )));
        }
        self.snapshots.push(snapshot);
        Ok(())
    }

    #[must_use]
    pub fn snapshots(&self) -> &[MetricSnapshot] {
        &self.snapshots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Verdict for the latest unit against everything before it.
    #[must_use]
    pub fn verdict_for_latest(&self, total_units: u32, config: &TemporalConfig) -> Option<UnitVerdict> {
        let (current, prior) = self.snapshots.split_last()?;
        Some(evaluate_unit(current, prior, total_units, config))
    }
}

// =============================================================================
// FLAGS
// =============================================================================

/// Drift pattern detected across sequential units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    OverheatRisk,
    FlatlineRisk,
    WhiplashRisk,
}

impl Flag {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::OverheatRisk => "overheat_risk",
            Flag::FlatlineRisk => "flatline_risk",
            Flag::WhiplashRisk => "whiplash_risk",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run every drift detector against `current` and the prior `history`.
///
/// Detectors never short-circuit each other and abstain (rather than fail)
/// when the history is too short for them.
#[must_use]
pub fn detect_tension_flags(
    current: &MetricSnapshot,
    history: &[MetricSnapshot],
    total_units: u32,
    config: &TemporalConfig,
) -> Vec<Flag> {
    let mut flags = Vec::new();

    let overheated =
        |s: &MetricSnapshot| s.tension_deviation(total_units) > config.overheat_margin;
    if let Some(previous) = history.last()
        && overheated(current)
        && overheated(previous)
    {
        flags.push(Flag::OverheatRisk);
    }

    let flat = |s: &MetricSnapshot| s.tension_delta.abs() <= config.flatline_delta;
    if let [.., before_previous, previous] = history
        && flat(current)
        && flat(previous)
        && flat(before_previous)
    {
        flags.push(Flag::FlatlineRisk);
    }

    if current.tension_delta.abs() > config.whiplash_delta {
        flags.push(Flag::WhiplashRisk);
    }

    flags
}

// =============================================================================
// UNIT GATE
// =============================================================================

/// Inputs of the unit floor gate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitMetrics {
    pub retention: f64,
    pub cliffhanger: f64,
    pub confusion: f64,
    pub recommendations: Vec<Recommendation>,
}

/// Why a unit failed its floor gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum UnitGateReason {
    RetentionBelowFloor { value: f64, floor: f64 },
    CliffhangerBelowFloor { value: f64, floor: f64 },
    ConfusionAboveCeiling { value: f64, ceiling: f64 },
    HighSeverityRecommendations { count: usize },
}

/// Result of the unit floor gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitGate {
    pub passed: bool,
    pub reasons: Vec<UnitGateReason>,
}

/// Hard floor a unit must clear before it is marked complete.
#[must_use]
pub fn metrics_pass_gate(metrics: &UnitMetrics, config: &TemporalConfig) -> UnitGate {
    let mut reasons = Vec::new();

    if metrics.retention < config.retention_floor {
        reasons.push(UnitGateReason::RetentionBelowFloor {
            value: metrics.retention,
            floor: config.retention_floor,
        });
    }
    if metrics.cliffhanger < config.cliffhanger_floor {
        reasons.push(UnitGateReason::CliffhangerBelowFloor {
            value: metrics.cliffhanger,
            floor: config.cliffhanger_floor,
        });
    }
    if metrics.confusion > config.confusion_ceiling {
        reasons.push(UnitGateReason::ConfusionAboveCeiling {
            value: metrics.confusion,
            ceiling: config.confusion_ceiling,
        });
    }
    let high = metrics
        .recommendations
        .iter()
        .filter(|r| r.severity == Severity::High)
        .count();
    if high > 0 {
        reasons.push(UnitGateReason::HighSeverityRecommendations { count: high });
    }

    UnitGate {
        passed: reasons.is_empty(),
        reasons,
    }
}

// =============================================================================
// UNIT VERDICT
// =============================================================================

/// Everything the unit scheduler needs to decide on the next unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitVerdict {
    pub unit_index: u32,
    pub target_tension: f64,
    pub deviation: f64,
    pub composites: CompositeScores,
    pub flags: Vec<Flag>,
    pub gate: UnitGate,
    /// The next unit may be generated.
    pub may_advance: bool,
}

/// Evaluate `current` against the prior `history`.
#[must_use]
pub fn evaluate_unit(
    current: &MetricSnapshot,
    history: &[MetricSnapshot],
    total_units: u32,
    config: &TemporalConfig,
) -> UnitVerdict {
    let gate = metrics_pass_gate(&current.unit_metrics(config), config);
    UnitVerdict {
        unit_index: current.unit_index,
        target_tension: target_tension(current.unit_index, total_units),
        deviation: current.tension_deviation(total_units),
        composites: current.composites(config),
        flags: detect_tension_flags(current, history, total_units, config),
        may_advance: gate.passed,
        gate,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn snapshot(unit_index: u32, tension_level: f64, tension_delta: f64) -> MetricSnapshot {
        MetricSnapshot {
            unit_index,
            tension_level,
            tension_delta,
            ..MetricSnapshot::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn curve_endpoints() {
        assert!(close(target_tension(0, 20), 40.0));
        assert!(close(target_tension(20, 20), 95.0));
        assert!(close(target_tension_at(OPENING_END, 20), 65.0));
        assert!(close(target_tension_at(ESCALATION_END, 20), 88.0));
    }

    #[test]
    fn escalation_is_linear() {
        let mid = (BUILD_END + ESCALATION_END) / 2.0;
        assert!(close(target_tension_at(mid, 40), 83.0));
    }

    #[test]
    fn build_segment_respects_cap() {
        for total in [4, 10, 40, 120] {
            for i in 0..=1000 {
                let pct = OPENING_END + (BUILD_END - OPENING_END) * f64::from(i) / 1000.0;
                assert!(target_tension_at(pct, total) <= BUILD_CAP);
            }
        }
    }

    #[test]
    fn zero_total_units_does_not_divide_by_zero() {
        let value = target_tension(0, 0);
        assert!(value.is_finite());
        assert!(close(value, 40.0));
        assert!(close(target_tension(5, 0), 95.0));
    }

    #[test]
    fn composites_use_weights() {
        let snap = MetricSnapshot {
            retention: RetentionFactors {
                hook: 80.0,
                cliffhanger: 60.0,
                pacing: 70.0,
            },
            engagement: EngagementFactors {
                emotional: 50.0,
                character: 100.0,
                novelty: 20.0,
            },
            ..MetricSnapshot::default()
        };
        let scores = snap.composites(&TemporalConfig::default());
        // 0.35 * 80 + 0.35 * 60 + 0.30 * 70
        assert!(close(scores.retention, 70.0));
        // 0.40 * 50 + 0.35 * 100 + 0.25 * 20
        assert!(close(scores.engagement, 60.0));
    }

    #[test]
    fn overheat_needs_previous_unit() {
        let config = TemporalConfig::default();
        let hot = snapshot(10, 100.0, 2.0);
        assert!(detect_tension_flags(&hot, &[], 20, &config).is_empty());

        let previous_hot = snapshot(9, 100.0, 2.0);
        assert_eq!(
            detect_tension_flags(&hot, &[previous_hot], 20, &config),
            vec![Flag::OverheatRisk]
        );

        let previous_calm = snapshot(9, target_tension(9, 20), 2.0);
        assert!(detect_tension_flags(&hot, &[previous_calm], 20, &config).is_empty());
    }

    #[test]
    fn flatline_needs_two_prior_units() {
        let config = TemporalConfig::default();
        let current = snapshot(5, 60.0, 1.0);
        let one = [snapshot(4, 60.0, -2.0)];
        assert!(detect_tension_flags(&current, &one, 20, &config).is_empty());

        let two = [snapshot(3, 60.0, 5.0), snapshot(4, 60.0, -2.0)];
        assert_eq!(
            detect_tension_flags(&current, &two, 20, &config),
            vec![Flag::FlatlineRisk]
        );

        let broken = [snapshot(3, 60.0, 5.1), snapshot(4, 60.0, -2.0)];
        assert!(detect_tension_flags(&current, &broken, 20, &config).is_empty());
    }

    #[test]
    fn whiplash_needs_no_history() {
        let config = TemporalConfig::default();
        let swing = snapshot(0, 40.0, -35.5);
        assert_eq!(
            detect_tension_flags(&swing, &[], 10, &config),
            vec![Flag::WhiplashRisk]
        );
        let edge = snapshot(0, 40.0, 35.0);
        assert!(detect_tension_flags(&edge, &[], 10, &config).is_empty());
    }

    #[test]
    fn overheat_and_whiplash_fire_together() {
        let config = TemporalConfig::default();
        let previous = snapshot(9, 100.0, 2.0);
        let current = snapshot(10, 100.0, 40.0);
        assert_eq!(
            detect_tension_flags(&current, &[previous], 20, &config),
            vec![Flag::OverheatRisk, Flag::WhiplashRisk]
        );
    }

    #[test]
    fn gate_reports_every_failure_in_order() {
        let metrics = UnitMetrics {
            retention: 10.0,
            cliffhanger: 10.0,
            confusion: 90.0,
            recommendations: vec![
                Recommendation {
                    severity: Severity::High,
                    code: "continuity_break".into(),
                    note: None,
                },
                Recommendation {
                    severity: Severity::Low,
                    code: "typo".into(),
                    note: None,
                },
            ],
        };
        let gate = metrics_pass_gate(&metrics, &TemporalConfig::default());

        assert!(!gate.passed);
        assert_eq!(gate.reasons.len(), 4);
        assert!(matches!(
            gate.reasons[3],
            UnitGateReason::HighSeverityRecommendations { count: 1 }
        ));
    }

    #[test]
    fn gate_boundaries_are_inclusive() {
        let metrics = UnitMetrics {
            retention: 60.0,
            cliffhanger: 60.0,
            confusion: 70.0,
            recommendations: Vec::new(),
        };
        let gate = metrics_pass_gate(&metrics, &TemporalConfig::default());
        assert!(gate.passed);
        assert!(gate.reasons.is_empty());
    }

    #[test]
    fn history_rejects_out_of_order_units() {
        let mut history = MetricHistory::new();
        history.append(snapshot(0, 40.0, 0.0)).expect("first");
        history.append(snapshot(1, 45.0, 5.0)).expect("second");

        let result = history.append(snapshot(1, 50.0, 5.0));
        assert!(matches!(result, Err(SlateError::InputShape(_))));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn verdict_for_latest_uses_prior_history() {
        let config = TemporalConfig::default();
        let history = MetricHistory::from_snapshots(vec![
            snapshot(0, 40.0, 0.0),
            snapshot(1, 42.0, 2.0),
            snapshot(2, 43.0, 1.0),
        ])
        .expect("ordered");

        let verdict = history.verdict_for_latest(20, &config).expect("non-empty");
        assert_eq!(verdict.unit_index, 2);
        assert_eq!(verdict.flags, vec![Flag::FlatlineRisk]);
        // Default snapshot metrics are all zero, so the floor gate fails.
        assert!(!verdict.may_advance);
        assert!(MetricHistory::new().verdict_for_latest(20, &config).is_none());
    }
}
