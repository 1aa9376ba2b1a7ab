//! # Admission Gates
//!
//! Named boolean conditions a project must satisfy before it may advance to a
//! dependent stage. Gates are format-conditional: a gate anchored to a stage
//! that is not on the active ladder is skipped entirely, so it can never be
//! reported as unmet.
//!
//! | Gate | Anchor | Met when |
//! |------|--------|----------|
//! | `concept_locked` | concept brief | exists and approved |
//! | `characters_defined` | character bible | exists |
//! | `format_rules_set` | format rules | exists |
//! | `arc_approved` | season arc / treatment | exists and approved |
//! | `grid_complete` | episode grid / beat sheet | exists and approved |
//! | `unit_count_set` | episode grid | unit count ≥ 1 |
//! | `unit_length_valid` | episode grid | bounds unset, or 0 < min ≤ max |
//! | `canon_consistent` | project | score unset, or ≥ floor |
//! | `drift_resolved` | project | no open high drift flags |

use crate::config::ReadinessConfig;
use crate::copy;
use crate::ladder::{Format, Stage};
use crate::readiness::Component;
use crate::types::{ProjectCriteria, StageStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// GATE CODES
// =============================================================================

/// Machine code of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCode {
    ConceptLocked,
    CharactersDefined,
    FormatRulesSet,
    ArcApproved,
    GridComplete,
    UnitCountSet,
    UnitLengthValid,
    CanonConsistent,
    DriftResolved,
}

/// Gates in evaluation order.
pub const GATE_ORDER: [GateCode; 9] = [
    GateCode::ConceptLocked,
    GateCode::CharactersDefined,
    GateCode::FormatRulesSet,
    GateCode::ArcApproved,
    GateCode::GridComplete,
    GateCode::UnitCountSet,
    GateCode::UnitLengthValid,
    GateCode::CanonConsistent,
    GateCode::DriftResolved,
];

/// What a gate hangs off in a given format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAnchor {
    /// Anchored to a ladder stage present in the format.
    Stage(Stage),
    /// Project-wide; applies to every format.
    Project,
    /// The anchor stage is foreign to this format; the gate is skipped.
    Inapplicable,
}

impl GateCode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GateCode::ConceptLocked => "concept_locked",
            GateCode::CharactersDefined => "characters_defined",
            GateCode::FormatRulesSet => "format_rules_set",
            GateCode::ArcApproved => "arc_approved",
            GateCode::GridComplete => "grid_complete",
            GateCode::UnitCountSet => "unit_count_set",
            GateCode::UnitLengthValid => "unit_length_valid",
            GateCode::CanonConsistent => "canon_consistent",
            GateCode::DriftResolved => "drift_resolved",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<GateCode> {
        GATE_ORDER.iter().copied().find(|g| g.as_str() == raw)
    }

    /// Resolve the gate's anchor for `format`.
    #[must_use]
    pub fn anchor(&self, format: Format) -> GateAnchor {
        let stage = match self {
            GateCode::ConceptLocked => format.component_stage(Component::Concept),
            GateCode::CharactersDefined => format.component_stage(Component::Characters),
            GateCode::FormatRulesSet => format.component_stage(Component::Format),
            GateCode::ArcApproved => format.component_stage(Component::Arc),
            GateCode::GridComplete => format.component_stage(Component::Grid),
            GateCode::UnitCountSet | GateCode::UnitLengthValid => {
                format.contains(Stage::EpisodeGrid).then_some(Stage::EpisodeGrid)
            }
            GateCode::CanonConsistent | GateCode::DriftResolved => return GateAnchor::Project,
        };
        stage.map_or(GateAnchor::Inapplicable, GateAnchor::Stage)
    }

    /// Gates decided by project criteria rather than by an artifact.
    ///
    /// Artifact-backed gates are already surfaced as readiness deductions.
    #[must_use]
    pub fn is_criteria_backed(&self) -> bool {
        matches!(
            self,
            GateCode::UnitCountSet
                | GateCode::UnitLengthValid
                | GateCode::CanonConsistent
                | GateCode::DriftResolved
        )
    }
}

impl std::fmt::Display for GateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GATE
// =============================================================================

/// One evaluated gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub code: GateCode,
    pub label: String,
    pub met: bool,
    /// Remediation hint, present only while the gate is unmet.
    pub how_to_fix: Option<String>,
    /// Anchor stage, `None` for project-wide gates.
    pub stage: Option<Stage>,
}

/// Result of evaluating every applicable gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub gates: Vec<Gate>,
    /// All applicable gates are met.
    pub eligible: bool,
    pub message: String,
}

impl GateReport {
    /// Gates that are not met, in evaluation order.
    pub fn unmet(&self) -> impl Iterator<Item = &Gate> {
        self.gates.iter().filter(|g| !g.met)
    }

    #[must_use]
    pub fn gate(&self, code: GateCode) -> Option<&Gate> {
        self.gates.iter().find(|g| g.code == code)
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Evaluate every gate applicable to `format`.
#[must_use]
pub fn compute_gates(
    format: Format,
    completed: &BTreeMap<Stage, StageStatus>,
    criteria: &ProjectCriteria,
    config: &ReadinessConfig,
) -> GateReport {
    let status = |stage: Stage| completed.get(&stage).cloned().unwrap_or_default();

    let gates: Vec<Gate> = GATE_ORDER
        .iter()
        .filter_map(|code| {
            let stage = match code.anchor(format) {
                GateAnchor::Inapplicable => return None,
                GateAnchor::Stage(stage) => Some(stage),
                GateAnchor::Project => None,
            };
            let met = match code {
                GateCode::ConceptLocked | GateCode::ArcApproved | GateCode::GridComplete => {
                    stage.is_some_and(|s| status(s).approved)
                }
                GateCode::CharactersDefined | GateCode::FormatRulesSet => {
                    stage.is_some_and(|s| status(s).exists)
                }
                GateCode::UnitCountSet => criteria.unit_count.is_some_and(|n| n >= 1),
                GateCode::UnitLengthValid => {
                    unit_length_valid(criteria.unit_length_min, criteria.unit_length_max)
                }
                GateCode::CanonConsistent => criteria
                    .canon_consistency_score
                    .is_none_or(|score| score >= config.canon_consistency_floor),
                GateCode::DriftResolved => criteria.open_high_drift_flag_count == 0,
            };

            Some(Gate {
                code: *code,
                label: copy::gate_label(*code).to_string(),
                met,
                how_to_fix: (!met).then(|| copy::gate_how_to_fix(*code).to_string()),
                stage,
            })
        })
        .collect();

    let eligible = gates.iter().all(|g| g.met);
    let message = copy::gate_report_message(&gates);

    GateReport {
        gates,
        eligible,
        message,
    }
}

fn unit_length_valid(min: Option<u32>, max: Option<u32>) -> bool {
    match (min, max) {
        (None, None) => true,
        (Some(min), None) => min > 0,
        (None, Some(max)) => max > 0,
        (Some(min), Some(max)) => min > 0 && min <= max,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(entries: &[(Stage, bool, bool)]) -> BTreeMap<Stage, StageStatus> {
        entries
            .iter()
            .map(|(stage, exists, approved)| {
                (
                    *stage,
                    StageStatus {
                        exists: *exists,
                        approved: *approved,
                        active_version_id: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn feature_film_skips_episodic_gates() {
        let report = compute_gates(
            Format::FeatureFilm,
            &BTreeMap::new(),
            &ProjectCriteria::default(),
            &ReadinessConfig::default(),
        );

        assert!(report.gate(GateCode::UnitCountSet).is_none());
        assert!(report.gate(GateCode::FormatRulesSet).is_none());
        assert!(report.gate(GateCode::ConceptLocked).is_some());
        assert!(!report.eligible);
    }

    #[test]
    fn vertical_drama_all_met() {
        let completed = statuses(&[
            (Stage::ConceptBrief, true, true),
            (Stage::FormatRules, true, false),
            (Stage::CharacterBible, true, false),
            (Stage::SeasonArc, true, true),
            (Stage::EpisodeGrid, true, true),
        ]);
        let criteria = ProjectCriteria {
            unit_count: Some(60),
            unit_length_min: Some(60),
            unit_length_max: Some(120),
            canon_consistency_score: Some(88.0),
            open_high_drift_flag_count: 0,
        };

        let report = compute_gates(
            Format::VerticalDrama,
            &completed,
            &criteria,
            &ReadinessConfig::default(),
        );

        assert_eq!(report.gates.len(), GATE_ORDER.len());
        assert!(report.eligible, "unmet: {:?}", report.unmet().collect::<Vec<_>>());
        assert!(report.gates.iter().all(|g| g.how_to_fix.is_none()));
    }

    #[test]
    fn unapproved_arc_blocks_arc_gate_only() {
        let completed = statuses(&[
            (Stage::ConceptBrief, true, true),
            (Stage::CharacterBible, true, false),
            (Stage::SeasonArc, true, false),
        ]);
        let report = compute_gates(
            Format::LimitedSeries,
            &completed,
            &ProjectCriteria::default(),
            &ReadinessConfig::default(),
        );

        let arc = report.gate(GateCode::ArcApproved).expect("arc gate");
        assert!(!arc.met);
        assert!(arc.how_to_fix.is_some());
        assert_eq!(arc.stage, Some(Stage::SeasonArc));
        assert!(report.gate(GateCode::ConceptLocked).expect("concept").met);
    }

    #[test]
    fn unit_length_bounds() {
        assert!(unit_length_valid(None, None));
        assert!(unit_length_valid(Some(60), Some(60)));
        assert!(!unit_length_valid(Some(120), Some(60)));
        assert!(!unit_length_valid(Some(0), Some(60)));
        assert!(!unit_length_valid(None, Some(0)));
    }

    #[test]
    fn canon_floor_is_inclusive() {
        let config = ReadinessConfig::default();
        let at_floor = ProjectCriteria {
            canon_consistency_score: Some(70.0),
            ..ProjectCriteria::default()
        };
        let below = ProjectCriteria {
            canon_consistency_score: Some(69.9),
            ..ProjectCriteria::default()
        };

        let met = |c: &ProjectCriteria| {
            compute_gates(Format::Documentary, &BTreeMap::new(), c, &config)
                .gate(GateCode::CanonConsistent)
                .map(|g| g.met)
        };
        assert_eq!(met(&at_floor), Some(true));
        assert_eq!(met(&below), Some(false));
    }

    #[test]
    fn open_drift_fails_project_gate() {
        let criteria = ProjectCriteria {
            open_high_drift_flag_count: 1,
            ..ProjectCriteria::default()
        };
        let report = compute_gates(
            Format::ShortFilm,
            &BTreeMap::new(),
            &criteria,
            &ReadinessConfig::default(),
        );
        let drift = report.gate(GateCode::DriftResolved).expect("drift gate");
        assert!(!drift.met);
        assert_eq!(drift.stage, None);
    }

    #[test]
    fn gate_code_parse_round_trip() {
        for code in GATE_ORDER {
            assert_eq!(GateCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(GateCode::parse("nope"), None);
    }
}
