//! # Copy
//!
//! Maps machine codes to user-facing text. The decision modules only ever
//! emit codes; everything a person reads is produced here.

use crate::gates::{Gate, GateCode};
use crate::ladder::{Format, Stage};
use crate::pipeline::{NextStep, StepAction};
use crate::readiness::{BlockerCode, Component, DeductionKind};
use crate::temporal::{Flag, UnitGateReason};

// =============================================================================
// LABELS
// =============================================================================

#[must_use]
pub fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Idea => "Idea",
        Stage::ConceptBrief => "Concept Brief",
        Stage::MarketSheet => "Market Sheet",
        Stage::FormatRules => "Format Rules",
        Stage::CharacterBible => "Character Bible",
        Stage::Treatment => "Treatment",
        Stage::SeasonArc => "Season Arc",
        Stage::BeatSheet => "Beat Sheet",
        Stage::EpisodeGrid => "Episode Grid",
        Stage::Script => "Script",
        Stage::ProductionDraft => "Production Draft",
        Stage::PitchDeck => "Pitch Deck",
    }
}

#[must_use]
pub fn format_label(format: Format) -> &'static str {
    match format {
        Format::FeatureFilm => "Feature Film",
        Format::ShortFilm => "Short Film",
        Format::TvSeries => "TV Series",
        Format::LimitedSeries => "Limited Series",
        Format::VerticalDrama => "Vertical Drama",
        Format::Documentary => "Documentary",
    }
}

#[must_use]
pub fn component_label(component: Component) -> &'static str {
    match component {
        Component::Concept => "Concept",
        Component::Arc => "Story Arc",
        Component::Grid => "Structure Grid",
        Component::Characters => "Characters",
        Component::Format => "Format Rules",
    }
}

// =============================================================================
// GATES
// =============================================================================

#[must_use]
pub fn gate_label(code: GateCode) -> &'static str {
    match code {
        GateCode::ConceptLocked => "Concept locked",
        GateCode::CharactersDefined => "Characters defined",
        GateCode::FormatRulesSet => "Format rules set",
        GateCode::ArcApproved => "Arc approved",
        GateCode::GridComplete => "Grid complete",
        GateCode::UnitCountSet => "Unit count set",
        GateCode::UnitLengthValid => "Unit length valid",
        GateCode::CanonConsistent => "Canon consistent",
        GateCode::DriftResolved => "Drift resolved",
    }
}

#[must_use]
pub fn gate_how_to_fix(code: GateCode) -> &'static str {
    match code {
        GateCode::ConceptLocked => "Write the concept brief and approve it.",
        GateCode::CharactersDefined => "Create the character bible.",
        GateCode::FormatRulesSet => "Create the format rules document.",
        GateCode::ArcApproved => "Write the arc and approve it.",
        GateCode::GridComplete => "Create the episode grid or beat sheet.",
        GateCode::UnitCountSet => "Set how many units the season has.",
        GateCode::UnitLengthValid => {
            "Set a positive unit length, with the minimum not above the maximum."
        }
        GateCode::CanonConsistent => "Resolve canon conflicts until the consistency check passes.",
        GateCode::DriftResolved => "Resolve every open high-severity drift flag.",
    }
}

/// Summary line for a gate evaluation.
#[must_use]
pub fn gate_report_message(gates: &[Gate]) -> String {
    let unmet: Vec<&str> = gates
        .iter()
        .filter(|g| !g.met)
        .map(|g| gate_label(g.code))
        .collect();
    match unmet.len() {
        0 => "All gates met. Ready to generate.".to_string(),
        1 => format!("1 gate outstanding: {}.", unmet[0]),
        n => format!("{} gates outstanding: {}.", n, unmet.join(", ")),
    }
}

// =============================================================================
// BLOCKERS
// =============================================================================

/// Blocker message. `detail` lists the offending tokens or keywords, if any.
#[must_use]
pub fn blocker_message(code: BlockerCode, detail: &[&str]) -> String {
    match code {
        BlockerCode::Component(component, kind) => {
            let label = component_label(component);
            match kind {
                DeductionKind::Missing => format!("{label} document is missing."),
                DeductionKind::Unapproved => format!("{label} document is not approved."),
                DeductionKind::Placeholders => {
                    format!("{label} document contains placeholders: {}.", detail.join(", "))
                }
                DeductionKind::MissingFields => {
                    format!("{label} document does not cover: {}.", detail.join(", "))
                }
            }
        }
        BlockerCode::Gate(gate) => format!("{} is not met.", gate_label(gate)),
    }
}

#[must_use]
pub fn blocker_how_to_fix(code: BlockerCode) -> String {
    match code {
        BlockerCode::Component(component, kind) => {
            let label = component_label(component).to_lowercase();
            match kind {
                DeductionKind::Missing => format!("Create the {label} document."),
                DeductionKind::Unapproved => format!("Review and approve the {label} document."),
                DeductionKind::Placeholders => {
                    format!("Replace the placeholder text in the {label} document.")
                }
                DeductionKind::MissingFields => {
                    format!("Add the missing sections to the {label} document.")
                }
            }
        }
        BlockerCode::Gate(gate) => gate_how_to_fix(gate).to_string(),
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// One-line label for a recommended next step.
#[must_use]
pub fn step_label(step: &NextStep) -> String {
    let stage = step.stage.map(stage_label);
    match (step.action, stage) {
        (StepAction::Create, Some(s)) => format!("Create {s}"),
        (StepAction::Approve, Some(s)) => format!("Approve {s}"),
        (StepAction::Review, Some(s)) => format!("Review {s}"),
        (StepAction::Create, None) => "Create next document".to_string(),
        (StepAction::Approve, None) => "Approve pending documents".to_string(),
        (StepAction::Review, None) => "Review the project".to_string(),
        (StepAction::EnterUnitGeneration, _) => "Start episode generation".to_string(),
    }
}

// =============================================================================
// TEMPORAL
// =============================================================================

#[must_use]
pub fn flag_message(flag: Flag) -> &'static str {
    match flag {
        Flag::OverheatRisk => "Tension has run well above target for two units in a row.",
        Flag::FlatlineRisk => "Tension has barely moved for three units.",
        Flag::WhiplashRisk => "Tension swung sharply from the previous unit.",
    }
}

#[must_use]
pub fn unit_gate_reason(reason: &UnitGateReason) -> String {
    match reason {
        UnitGateReason::RetentionBelowFloor { value, floor } => {
            format!("Retention {value:.1} is below the floor of {floor:.0}.")
        }
        UnitGateReason::CliffhangerBelowFloor { value, floor } => {
            format!("Cliffhanger {value:.1} is below the floor of {floor:.0}.")
        }
        UnitGateReason::ConfusionAboveCeiling { value, ceiling } => {
            format!("Confusion {value:.1} is above the ceiling of {ceiling:.0}.")
        }
        UnitGateReason::HighSeverityRecommendations { count: 1 } => {
            "1 high-severity recommendation is open.".to_string()
        }
        UnitGateReason::HighSeverityRecommendations { count } => {
            format!("{count} high-severity recommendations are open.")
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Priority, StepReason};

    fn gate(code: GateCode, met: bool) -> Gate {
        Gate {
            code,
            label: gate_label(code).to_string(),
            met,
            how_to_fix: None,
            stage: None,
        }
    }

    #[test]
    fn report_message_lists_unmet_gates() {
        let gates = [
            gate(GateCode::ConceptLocked, true),
            gate(GateCode::ArcApproved, false),
            gate(GateCode::DriftResolved, false),
        ];
        assert_eq!(
            gate_report_message(&gates),
            "2 gates outstanding: Arc approved, Drift resolved."
        );
        assert_eq!(
            gate_report_message(&gates[..1]),
            "All gates met. Ready to generate."
        );
    }

    #[test]
    fn blocker_message_carries_detail() {
        let code = BlockerCode::Component(Component::Grid, DeductionKind::MissingFields);
        let message = blocker_message(code, &["cliffhanger", "hook"]);
        assert!(message.contains("cliffhanger, hook"));
        assert!(message.starts_with("Structure Grid"));
    }

    #[test]
    fn gate_blocker_reuses_gate_copy() {
        let code = BlockerCode::Gate(GateCode::UnitCountSet);
        assert_eq!(blocker_message(code, &[]), "Unit count set is not met.");
        assert_eq!(
            blocker_how_to_fix(code),
            gate_how_to_fix(GateCode::UnitCountSet)
        );
    }

    #[test]
    fn step_labels() {
        let step = NextStep {
            stage: Some(Stage::SeasonArc),
            reason: StepReason::AwaitingApproval,
            action: StepAction::Approve,
            priority: Priority::Primary,
        };
        assert_eq!(step_label(&step), "Approve Season Arc");

        let handoff = NextStep {
            stage: None,
            reason: StepReason::GatesCleared,
            action: StepAction::EnterUnitGeneration,
            priority: Priority::Primary,
        };
        assert_eq!(step_label(&handoff), "Start episode generation");
    }

    #[test]
    fn unit_gate_reason_pluralizes() {
        let one = UnitGateReason::HighSeverityRecommendations { count: 1 };
        let two = UnitGateReason::HighSeverityRecommendations { count: 2 };
        assert!(unit_gate_reason(&one).starts_with("1 high-severity recommendation "));
        assert!(unit_gate_reason(&two).starts_with("2 high-severity recommendations "));
    }
}
