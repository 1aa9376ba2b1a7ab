//! # Scenario Tier Tests (T0-T3)
//!
//! End-to-end decisions over realistic project snapshots.
//!
//! ## Tiers
//! - T0: Stage Ladder
//! - T1: Pipeline State
//! - T2: Readiness & Gates
//! - T3: Unit Metrics

#![allow(clippy::float_arithmetic)]

use slate_core::{
    ArtifactRecord, Blocker, BlockerCode, Component, Format, GateCode, PipelineState,
    ProjectCriteria, ReadinessConfig, ReadinessInputs, ReadinessResult, Stage, StepAction,
    StepReason, TemporalConfig, compute_pipeline_state, compute_readiness_score,
};

fn readiness(
    format: Format,
    artifacts: &[ArtifactRecord],
    criteria: &ProjectCriteria,
) -> ReadinessResult {
    compute_readiness_score(
        ReadinessInputs {
            format,
            artifacts,
            criteria,
        },
        &ReadinessConfig::default(),
    )
}

fn pipeline(format: Format, artifacts: &[ArtifactRecord]) -> PipelineState {
    compute_pipeline_state(format, artifacts, None, &ReadinessConfig::default())
}

/// A vertical drama with every document written, approved and complete.
fn finished_vertical() -> Vec<ArtifactRecord> {
    vec![
        ArtifactRecord::new("idea").with_text("A courier inherits a haunted phone."),
        ArtifactRecord::new("Concept Brief")
            .approved()
            .with_text("Logline, genre, tone, audience and hook are all settled."),
        ArtifactRecord::new("format-rules")
            .approved()
            .with_text("Runtime 90s, platform vertical, every unit ends on a cliffhanger."),
        ArtifactRecord::new("characters")
            .approved()
            .with_text("Protagonist and antagonist each have a want, a need and a flaw."),
        ArtifactRecord::new("season_arc")
            .approved()
            .with_text("Premiere, midpoint, finale; the stakes rise each act."),
        ArtifactRecord::new("episode_grid")
            .approved()
            .with_text("Episode by episode: hook up front, cliffhanger at the end."),
    ]
}

fn season_criteria() -> ProjectCriteria {
    ProjectCriteria {
        unit_count: Some(60),
        ..ProjectCriteria::default()
    }
}

fn codes(blockers: &[Blocker]) -> Vec<String> {
    blockers.iter().map(|b| b.code.to_string()).collect()
}

// =============================================================================
// TIER T0: STAGE LADDER
// =============================================================================

mod t0_stage_ladder {
    use super::*;
    use slate_core::{get_ladder, map_doc_type_for_format, map_doc_type_to_ladder_stage};

    /// T0.1: Format keys resolve through aliases and separators.
    #[test]
    fn format_keys_resolve() {
        assert_eq!(Format::resolve("Vertical Drama"), Format::VerticalDrama);
        assert_eq!(Format::resolve("tv-series"), Format::TvSeries);
        assert_eq!(Format::resolve("MiniSeries"), Format::LimitedSeries);
    }

    /// T0.2: Unknown formats fall back to the feature-film ladder.
    #[test]
    fn unknown_format_uses_default_ladder() {
        assert_eq!(get_ladder("radio_play"), Format::FeatureFilm.ladder().to_vec());
        assert_eq!(get_ladder(""), Format::FeatureFilm.ladder().to_vec());
    }

    /// T0.3: Doc-type synonyms land on the same stage.
    #[test]
    fn doc_type_synonyms() {
        for raw in ["Episode Grid", "episode-grid", "EPISODE_GRID", "grid"] {
            assert_eq!(map_doc_type_to_ladder_stage(raw), Some(Stage::EpisodeGrid));
        }
        assert_eq!(map_doc_type_to_ladder_stage("storyboard"), None);
    }

    /// T0.4: Format-dependent synonyms.
    #[test]
    fn blueprint_depends_on_format() {
        assert_eq!(
            map_doc_type_for_format(Format::TvSeries, "blueprint"),
            Some(Stage::SeasonArc)
        );
        assert_eq!(
            map_doc_type_for_format(Format::FeatureFilm, "blueprint"),
            Some(Stage::Treatment)
        );
    }
}

// =============================================================================
// TIER T1: PIPELINE STATE
// =============================================================================

mod t1_pipeline_state {
    use super::*;

    /// T1.1: Empty project starts at the bottom of the ladder.
    #[test]
    fn empty_project() {
        let state = pipeline(Format::VerticalDrama, &[]);

        assert_eq!(state.current_stage, None);
        assert_eq!(state.current_stage_index, None);
        assert_eq!(state.progress_percent, 0);
        let stages: Vec<Option<Stage>> = state.next_steps.iter().map(|s| s.stage).collect();
        assert_eq!(
            stages,
            vec![
                Some(Stage::Idea),
                Some(Stage::ConceptBrief),
                Some(Stage::FormatRules)
            ]
        );
    }

    /// T1.2: An unapproved current stage is the primary step.
    #[test]
    fn unapproved_current_stage_comes_first() {
        let artifacts = [
            ArtifactRecord::new("idea"),
            ArtifactRecord::new("concept_brief"),
        ];
        let state = pipeline(Format::VerticalDrama, &artifacts);

        let primary = state.primary_step().expect("steps");
        assert_eq!(primary.action, StepAction::Approve);
        assert_eq!(primary.stage, Some(Stage::ConceptBrief));
        assert_eq!(primary.reason, StepReason::AwaitingApproval);

        // Approval is not repeated further down the list.
        let approvals = state
            .next_steps
            .iter()
            .filter(|s| s.action == StepAction::Approve)
            .count();
        assert_eq!(approvals, 1);
        assert_eq!(state.next_steps.len(), 3);
        assert_eq!(state.next_steps[1].stage, Some(Stage::FormatRules));
    }

    /// T1.3: Completed episodic ladder with clear gates hands off.
    #[test]
    fn complete_episodic_ladder_hands_off() {
        let criteria = season_criteria();
        let state = compute_pipeline_state(
            Format::VerticalDrama,
            &finished_vertical(),
            Some(&criteria),
            &ReadinessConfig::default(),
        );

        assert!(state.is_complete());
        assert_eq!(state.progress_percent, 100);
        let actions: Vec<StepAction> = state.next_steps.iter().map(|s| s.action).collect();
        assert_eq!(
            actions,
            vec![StepAction::EnterUnitGeneration, StepAction::Review]
        );
    }

    /// T1.4: Stages foreign to the format are ignored.
    #[test]
    fn foreign_stages_ignored() {
        let artifacts = [
            ArtifactRecord::new("idea"),
            ArtifactRecord::new("pitch_deck"),
            ArtifactRecord::new("script"),
        ];
        let state = pipeline(Format::TvSeries, &artifacts);

        assert_eq!(state.current_stage, Some(Stage::Idea));
        assert_eq!(state.completed_count, 1);
        assert!(state.excluded_stages.contains(&Stage::PitchDeck));
    }
}

// =============================================================================
// TIER T2: READINESS & GATES
// =============================================================================

mod t2_readiness {
    use super::*;
    use slate_core::readiness::{DeductionKind, is_eligible};

    /// T2.1: Empty vertical project with no unit count.
    #[test]
    fn empty_vertical_project() {
        let result = readiness(Format::VerticalDrama, &[], &ProjectCriteria::default());

        let unmet: Vec<GateCode> = result
            .gates
            .iter()
            .filter(|g| !g.met)
            .map(|g| g.code)
            .collect();
        assert!(unmet.contains(&GateCode::UnitCountSet));
        assert!(unmet.contains(&GateCode::GridComplete));
        assert!(!result.eligible);
        assert!(result.score < 50.0);
        assert!((result.score - 30.25).abs() < 1e-9);
    }

    /// T2.2: A finished project scores full marks with nothing blocking.
    #[test]
    fn finished_project_scores_full() {
        let result = readiness(Format::VerticalDrama, &finished_vertical(), &season_criteria());

        assert!(result.components.values().all(|score| *score == 100));
        assert!((result.score - 100.0).abs() < 1e-9);
        assert!(result.eligible);
        assert!(result.blockers.is_empty());
    }

    /// T2.3: Blockers are truncated in evaluation order.
    #[test]
    fn blockers_truncate_in_evaluation_order() {
        let criteria = ProjectCriteria {
            open_high_drift_flag_count: 2,
            ..ProjectCriteria::default()
        };
        let result = readiness(Format::VerticalDrama, &[], &criteria);

        assert_eq!(
            codes(&result.blockers),
            vec![
                "concept_missing",
                "arc_missing",
                "grid_missing",
                "characters_missing",
                "format_missing",
                "gate_unit_count_set",
            ]
        );
    }

    /// T2.4: Open drift clamps continuity components.
    #[test]
    fn drift_clamps_continuity_components() {
        let criteria = ProjectCriteria {
            open_high_drift_flag_count: 1,
            ..season_criteria()
        };
        let result = readiness(Format::VerticalDrama, &finished_vertical(), &criteria);

        assert_eq!(result.components[&Component::Arc], 50);
        assert_eq!(result.components[&Component::Characters], 50);
        assert_eq!(result.components[&Component::Concept], 100);
        assert!(!result.eligible);
        assert_eq!(
            result.blockers.first().map(|b| b.code),
            Some(BlockerCode::Gate(GateCode::DriftResolved))
        );
    }

    /// T2.5: Threshold is inclusive.
    #[test]
    fn threshold_is_inclusive() {
        assert!(is_eligible(true, 75.0, 75.0));
        assert!(!is_eligible(true, 74.99, 75.0));
        assert!(!is_eligible(false, 100.0, 75.0));

        let config = ReadinessConfig {
            eligible_threshold: 100.0,
            ..ReadinessConfig::default()
        };
        let result = compute_readiness_score(
            ReadinessInputs {
                format: Format::VerticalDrama,
                artifacts: &finished_vertical(),
                criteria: &season_criteria(),
            },
            &config,
        );
        assert!(result.eligible);
    }

    /// T2.6: Feature films have no unit gates and no format component.
    #[test]
    fn feature_film_skips_episodic_gates() {
        let result = readiness(Format::FeatureFilm, &[], &ProjectCriteria::default());

        assert!(result.gates.iter().all(|g| g.code != GateCode::UnitCountSet));
        assert!(result.gates.iter().all(|g| g.code != GateCode::FormatRulesSet));
        assert_eq!(result.components[&Component::Format], 100);
        assert!((result.score - 33.75).abs() < 1e-9);
    }

    /// T2.7: Placeholder text is reported with the offending tokens.
    #[test]
    fn placeholders_are_reported() {
        let mut artifacts = finished_vertical();
        artifacts[1] = ArtifactRecord::new("concept_brief")
            .approved()
            .with_text("Logline TBD. Genre, tone, audience, hook: ???");
        let result = readiness(Format::VerticalDrama, &artifacts, &season_criteria());

        assert_eq!(result.components[&Component::Concept], 85);
        let blocker = &result.blockers[0];
        assert_eq!(
            blocker.code,
            BlockerCode::Component(Component::Concept, DeductionKind::Placeholders)
        );
        assert!(blocker.message.contains("TBD"));
        assert_eq!(blocker.target_stage, Some(Stage::ConceptBrief));
    }

    /// T2.8: An unapproved beat sheet blocks a finished feature film.
    #[test]
    fn feature_film_unapproved_beat_sheet_is_reported() {
        let artifacts = [
            ArtifactRecord::new("idea"),
            ArtifactRecord::new("concept_brief")
                .approved()
                .with_text("Logline, genre, tone, audience and hook."),
            ArtifactRecord::new("market_sheet").approved(),
            ArtifactRecord::new("character_bible")
                .approved()
                .with_text("Protagonist, antagonist, want, need, flaw."),
            ArtifactRecord::new("treatment")
                .approved()
                .with_text("Inciting incident, midpoint, climax, resolution."),
            ArtifactRecord::new("beat_sheet")
                .with_text("Opening image, catalyst, midpoint, finale."),
            ArtifactRecord::new("script").approved(),
            ArtifactRecord::new("production_draft").approved(),
        ];
        let result = readiness(Format::FeatureFilm, &artifacts, &ProjectCriteria::default());

        let unmet: Vec<GateCode> = result
            .gates
            .iter()
            .filter(|g| !g.met)
            .map(|g| g.code)
            .collect();
        assert_eq!(unmet, vec![GateCode::GridComplete]);
        assert_eq!(result.components[&Component::Grid], 80);
        assert!(!result.eligible);
        assert_eq!(codes(&result.blockers), vec!["grid_unapproved"]);
        assert_eq!(result.blockers[0].target_stage, Some(Stage::BeatSheet));
        assert!(Stage::BeatSheet.requires_approval());
    }
}

// =============================================================================
// TIER T3: UNIT METRICS
// =============================================================================

mod t3_unit_metrics {
    use super::*;
    use slate_core::temporal::{
        EngagementFactors, RetentionFactors, UnitGateReason, target_tension_at,
    };
    use slate_core::{Flag, MetricHistory, MetricSnapshot, UnitMetrics, metrics_pass_gate};

    fn unit(index: u32, tension: f64, delta: f64) -> MetricSnapshot {
        MetricSnapshot {
            unit_index: index,
            tension_level: tension,
            tension_delta: delta,
            retention: RetentionFactors {
                hook: 80.0,
                cliffhanger: 75.0,
                pacing: 70.0,
            },
            engagement: EngagementFactors {
                emotional: 70.0,
                character: 70.0,
                novelty: 70.0,
            },
            confusion: 20.0,
            recommendations: Vec::new(),
        }
    }

    /// T3.1: Only the retention floor fails.
    #[test]
    fn retention_only_failure() {
        let metrics = UnitMetrics {
            retention: 59.0,
            cliffhanger: 61.0,
            confusion: 50.0,
            recommendations: Vec::new(),
        };
        let gate = metrics_pass_gate(&metrics, &TemporalConfig::default());

        assert!(!gate.passed);
        assert_eq!(gate.reasons.len(), 1);
        assert!(matches!(
            gate.reasons[0],
            UnitGateReason::RetentionBelowFloor { .. }
        ));
    }

    /// T3.2: Curve segments join without jumps.
    #[test]
    fn curve_is_continuous_at_segment_edges() {
        for edge in [0.15, 0.60, 0.85] {
            for total in [8, 24, 80] {
                let left = target_tension_at(edge - 1e-9, total);
                let right = target_tension_at(edge + 1e-9, total);
                assert!((left - right).abs() < 1e-3, "jump at {edge} for {total}");
            }
        }
    }

    /// T3.3: A healthy unit advances; a whiplash unit is flagged but still
    /// judged on its floor metrics.
    #[test]
    fn healthy_season_advances() {
        let config = TemporalConfig::default();
        let total = 10;
        let mut history = MetricHistory::new();
        let mut previous = slate_core::target_tension(0, total);

        for index in 0..4 {
            let tension = slate_core::target_tension(index, total);
            history
                .append(unit(index, tension, tension - previous))
                .expect("ordered");
            previous = tension;
        }
        let verdict = history.verdict_for_latest(total, &config).expect("verdict");
        assert!(verdict.may_advance);
        assert!(verdict.deviation.abs() < 1e-9);

        history.append(unit(4, 20.0, -40.0)).expect("ordered");
        let verdict = history.verdict_for_latest(total, &config).expect("verdict");
        assert!(verdict.flags.contains(&Flag::WhiplashRisk));
        assert!(verdict.may_advance);
    }
}
