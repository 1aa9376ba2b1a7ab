//! # Pipeline State
//!
//! Derives where a project stands on its format's ladder and what should
//! happen next. State is recomputed from scratch on every call; nothing here
//! has identity beyond a single invocation.
//!
//! ## Next-Step Ranking
//!
//! 1. Walk the ladder forward from the stage after the current one, emitting
//!    "create" steps for missing stages.
//! 2. An unapproved, approval-required current stage is put in front. The
//!    first missing stage always follows the current one, so this is also
//!    the "approve predecessor" step.
//! 3. A fully satisfied ladder yields a single "review" step.
//! 4. Formats with a hand-off get an "enter unit generation" step at the very
//!    front once readiness reports the project eligible: every gate met and
//!    the score at or above the threshold.
//!
//! At most [`MAX_NEXT_STEPS`] steps are returned; the first is `primary`.

use crate::config::ReadinessConfig;
use crate::ladder::{Format, Stage, map_doc_type_for_format};
use crate::readiness::{ReadinessInputs, compute_readiness_score};
use crate::types::{ArtifactRecord, ProjectCriteria, SlateError, StageStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on recommended next steps.
pub const MAX_NEXT_STEPS: usize = 3;

// =============================================================================
// NEXT STEPS
// =============================================================================

/// What a next step asks the user to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Create,
    Approve,
    Review,
    EnterUnitGeneration,
}

/// Why a step was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepReason {
    /// Next missing stage on the ladder.
    NextInLadder,
    /// The current stage is waiting for approval.
    AwaitingApproval,
    /// Every ladder stage exists.
    LadderComplete,
    /// Readiness is eligible and the format hands off downstream.
    GatesCleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Primary,
    Secondary,
}

/// One recommended action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    /// Stage the step acts on; `None` for project-wide steps.
    pub stage: Option<Stage>,
    pub reason: StepReason,
    pub action: StepAction,
    pub priority: Priority,
}

impl NextStep {
    fn new(stage: Option<Stage>, action: StepAction, reason: StepReason) -> Self {
        Self {
            stage,
            reason,
            action,
            priority: Priority::Secondary,
        }
    }
}

// =============================================================================
// PIPELINE STATE
// =============================================================================

/// Snapshot of a project's position on its ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pub format: Format,
    pub ladder: Vec<Stage>,
    /// Highest-index ladder stage that exists.
    pub current_stage: Option<Stage>,
    pub current_stage_index: Option<usize>,
    /// Status of every ladder stage.
    pub completed_stages: BTreeMap<Stage, StageStatus>,
    /// Number of ladder stages that exist.
    pub completed_count: usize,
    /// `completed_count` as a percentage of the ladder, rounded down.
    pub progress_percent: u8,
    pub next_steps: Vec<NextStep>,
    /// Known stages that do not belong to this format.
    pub excluded_stages: Vec<Stage>,
}

impl PipelineState {
    /// Whether every ladder stage exists.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_count == self.ladder.len()
    }

    /// The primary recommendation, if any.
    #[must_use]
    pub fn primary_step(&self) -> Option<&NextStep> {
        self.next_steps.first()
    }
}

/// First existing artifact (in caller order) that maps onto `stage`.
///
/// Callers must supply a stable ordering: duplicates resolve first-wins.
#[must_use]
pub fn matching_artifact(
    format: Format,
    artifacts: &[ArtifactRecord],
    stage: Stage,
) -> Option<&ArtifactRecord> {
    artifacts
        .iter()
        .find(|a| a.exists && map_doc_type_for_format(format, &a.doc_type) == Some(stage))
}

/// Status of every stage on `format`'s ladder.
#[must_use]
pub fn resolve_completed_stages(
    format: Format,
    artifacts: &[ArtifactRecord],
) -> BTreeMap<Stage, StageStatus> {
    format
        .ladder()
        .iter()
        .map(|stage| {
            let status = matching_artifact(format, artifacts, *stage)
                .map(StageStatus::from_record)
                .unwrap_or_else(StageStatus::absent);
            (*stage, status)
        })
        .collect()
}

/// Compute the pipeline state for `format` from the registry's artifacts.
///
/// `criteria` enables the hand-off step; without it readiness is not
/// evaluated and no hand-off is recommended.
#[must_use]
pub fn compute_pipeline_state(
    format: Format,
    artifacts: &[ArtifactRecord],
    criteria: Option<&ProjectCriteria>,
    config: &ReadinessConfig,
) -> PipelineState {
    let ladder = format.ladder();
    let completed = resolve_completed_stages(format, artifacts);
    let status = |stage: Stage| completed.get(&stage).cloned().unwrap_or_default();

    let current_stage_index = ladder.iter().rposition(|s| status(*s).exists);
    let current_stage = current_stage_index.and_then(|i| ladder.get(i).copied());

    // Every stage past the current one is missing.
    let start = current_stage_index.map_or(0, |i| i.saturating_add(1));
    let mut steps: Vec<NextStep> = ladder
        .iter()
        .skip(start)
        .take(MAX_NEXT_STEPS)
        .map(|stage| NextStep::new(Some(*stage), StepAction::Create, StepReason::NextInLadder))
        .collect();

    if let Some(current) = current_stage
        && current.requires_approval()
        && status(current).is_pending_approval()
    {
        steps.insert(
            0,
            NextStep::new(
                Some(current),
                StepAction::Approve,
                StepReason::AwaitingApproval,
            ),
        );
    }

    let completed_count = ladder.iter().filter(|s| status(**s).exists).count();
    if completed_count == ladder.len() {
        steps.push(NextStep::new(
            None,
            StepAction::Review,
            StepReason::LadderComplete,
        ));
    }

    if format.handoff().is_some()
        && let Some(criteria) = criteria
        && compute_readiness_score(
            ReadinessInputs {
                format,
                artifacts,
                criteria,
            },
            config,
        )
        .eligible
    {
        steps.insert(
            0,
            NextStep::new(
                None,
                StepAction::EnterUnitGeneration,
                StepReason::GatesCleared,
            ),
        );
    }

    steps.truncate(MAX_NEXT_STEPS);
    for (i, step) in steps.iter_mut().enumerate() {
        step.priority = if i == 0 {
            Priority::Primary
        } else {
            Priority::Secondary
        };
    }

    let progress_percent = if ladder.is_empty() {
        100
    } else {
        ((completed_count as u64).saturating_mul(100) / (ladder.len() as u64)) as u8
    };

    PipelineState {
        format,
        ladder: ladder.to_vec(),
        current_stage,
        current_stage_index,
        completed_stages: completed,
        completed_count,
        progress_percent: progress_percent.min(100),
        next_steps: steps,
        excluded_stages: format.excluded_stages(),
    }
}

/// Compute the pipeline state from loosely-shaped registry JSON.
///
/// Returns `SlateError::InputShape` when `artifacts` is not an array; unknown
/// format keys fall back to the default ladder.
pub fn compute_pipeline_state_json(
    format_key: &str,
    artifacts: &serde_json::Value,
    criteria: Option<&ProjectCriteria>,
    config: &ReadinessConfig,
) -> Result<PipelineState, SlateError> {
    let records = ArtifactRecord::list_from_json(artifacts)?;
    Ok(compute_pipeline_state(
        Format::resolve(format_key),
        &records,
        criteria,
        config,
    ))
}

// =============================================================================
// TESTS
// =============================================================================
