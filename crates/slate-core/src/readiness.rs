//! # Readiness Scoring
//!
//! Weighted composite readiness score over five components, plus the blocker
//! list explaining every deduction.
//!
//! ## Scoring Algorithm
//!
//! Each component starts at 100 and is reduced in a fixed order:
//!
//! 1. artifact missing (every required keyword then counts as missing too)
//! 2. artifact exists but is unapproved
//! 3. placeholder tokens in the artifact text
//! 4. required keywords absent from the artifact text
//! 5. open high-severity drift flags clamp `arc` and `characters`
//!
//! Components are clamped to `[0, 100]`. A component whose backing stage is
//! not on the format's ladder scores 100 and emits nothing. The composite is
//! the weighted sum, rounded to two decimals.
//!
//! ## Blockers
//!
//! Blockers are emitted in deduction order, component by component, followed
//! by unmet criteria-backed gates. The list is truncated positionally to
//! `max_blockers`; it is never re-sorted by severity.

#![allow(clippy::float_arithmetic)]

use crate::config::ReadinessConfig;
use crate::copy;
use crate::gates::{Gate, GateAnchor, GateCode, compute_gates};
use crate::ladder::{Format, Stage};
use crate::pipeline::{matching_artifact, resolve_completed_stages};
use crate::types::{ArtifactRecord, ProjectCriteria, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// COMPONENTS
// =============================================================================

/// Readiness components, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Concept,
    Arc,
    Grid,
    Characters,
    Format,
}

pub const COMPONENT_ORDER: [Component; 5] = [
    Component::Concept,
    Component::Arc,
    Component::Grid,
    Component::Characters,
    Component::Format,
];

impl Component {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Concept => "concept",
            Component::Arc => "arc",
            Component::Grid => "grid",
            Component::Characters => "characters",
            Component::Format => "format",
        }
    }

    /// Components whose score is capped while high drift flags stay open.
    #[must_use]
    pub fn tracks_continuity(&self) -> bool {
        matches!(self, Component::Arc | Component::Characters)
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// STATIC SCAN TABLES
// =============================================================================

/// Placeholder tokens, matched case-insensitively. Alphanumeric tokens only
/// match on word boundaries so `TK` does not fire inside ordinary words.
pub const PLACEHOLDER_TOKENS: [&str; 7] =
    ["TBD", "TK", "???", "TODO", "XXX", "PLACEHOLDER", "LOREM IPSUM"];

/// Keywords a stage's text must mention, matched as case-insensitive substrings.
#[must_use]
pub fn required_keywords(stage: Stage) -> &'static [&'static str] {
    match stage {
        Stage::ConceptBrief => &["logline", "genre", "tone", "audience", "hook"],
        Stage::SeasonArc => &["premiere", "midpoint", "finale", "stakes"],
        Stage::Treatment => &["inciting", "midpoint", "climax", "resolution"],
        Stage::EpisodeGrid => &["episode", "cliffhanger", "hook"],
        Stage::BeatSheet => &["opening image", "catalyst", "midpoint", "finale"],
        Stage::CharacterBible => &["protagonist", "antagonist", "want", "need", "flaw"],
        Stage::FormatRules => &["runtime", "platform", "cliffhanger"],
        _ => &[],
    }
}

/// Placeholder tokens present in `text`, in table order.
#[must_use]
pub fn find_placeholders(text: &str) -> Vec<&'static str> {
    let haystack = text.to_lowercase();
    PLACEHOLDER_TOKENS
        .iter()
        .copied()
        .filter(|token| contains_token(&haystack, &token.to_lowercase()))
        .collect()
}

/// Required keywords of `stage` absent from `text`, in table order.
#[must_use]
pub fn missing_keywords(stage: Stage, text: &str) -> Vec<&'static str> {
    let haystack = text.to_lowercase();
    required_keywords(stage)
        .iter()
        .copied()
        .filter(|kw| !haystack.contains(kw))
        .collect()
}

fn contains_token(haystack: &str, needle: &str) -> bool {
    let word_bounded = needle.chars().next().is_some_and(char::is_alphanumeric);
    haystack.match_indices(needle).any(|(start, matched)| {
        if !word_bounded {
            return true;
        }
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

// =============================================================================
// BLOCKERS
// =============================================================================

/// Kind of deduction that produced a component blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    Missing,
    Unapproved,
    Placeholders,
    MissingFields,
}

const DEDUCTION_KINDS: [DeductionKind; 4] = [
    DeductionKind::Missing,
    DeductionKind::Unapproved,
    DeductionKind::Placeholders,
    DeductionKind::MissingFields,
];

impl DeductionKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeductionKind::Missing => "missing",
            DeductionKind::Unapproved => "unapproved",
            DeductionKind::Placeholders => "placeholders",
            DeductionKind::MissingFields => "missing_fields",
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            DeductionKind::Missing => Severity::High,
            DeductionKind::Unapproved | DeductionKind::Placeholders => Severity::Med,
            DeductionKind::MissingFields => Severity::Low,
        }
    }
}

/// Machine code of a blocker, e.g. `arc_unapproved` or `gate_unit_count_set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BlockerCode {
    Component(Component, DeductionKind),
    Gate(GateCode),
}

impl BlockerCode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<BlockerCode> {
        if let Some(gate) = raw.strip_prefix("gate_") {
            return GateCode::parse(gate).map(BlockerCode::Gate);
        }
        COMPONENT_ORDER.iter().find_map(|component| {
            let kind = raw
                .strip_prefix(component.as_str())?
                .strip_prefix('_')?;
            DEDUCTION_KINDS
                .iter()
                .find(|k| k.as_str() == kind)
                .map(|k| BlockerCode::Component(*component, *k))
        })
    }
}

impl std::fmt::Display for BlockerCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockerCode::Component(component, kind) => write!(f, "{}_{}", component, kind.as_str()),
            BlockerCode::Gate(gate) => write!(f, "gate_{}", gate),
        }
    }
}

impl From<BlockerCode> for String {
    fn from(code: BlockerCode) -> Self {
        code.to_string()
    }
}

impl TryFrom<String> for BlockerCode {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        BlockerCode::parse(&raw).ok_or_else(|| format!("unknown blocker code: {raw}"))
    }
}

/// One unmet condition with a remediation hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    pub code: BlockerCode,
    pub severity: Severity,
    pub message: String,
    pub how_to_fix: String,
    /// Stage the caller should route the user to.
    pub target_stage: Option<Stage>,
}

/// Stage a blocker code routes the user to in `format`.
///
/// Project-wide gates route to the stage holding the story arc.
#[must_use]
pub fn blocker_target_stage(format: Format, code: BlockerCode) -> Option<Stage> {
    match code {
        BlockerCode::Component(component, _) => format.component_stage(component),
        BlockerCode::Gate(gate) => match gate.anchor(format) {
            GateAnchor::Stage(stage) => Some(stage),
            GateAnchor::Project => format.component_stage(Component::Arc),
            GateAnchor::Inapplicable => None,
        },
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// Inputs to a readiness evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessInputs<'a> {
    pub format: Format,
    pub artifacts: &'a [ArtifactRecord],
    pub criteria: &'a ProjectCriteria,
}

/// Readiness evaluation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessResult {
    /// Weighted composite, 0-100, two decimals.
    pub score: f64,
    pub components: BTreeMap<Component, u8>,
    pub gates: Vec<Gate>,
    pub blockers: Vec<Blocker>,
    pub eligible: bool,
}

/// Eligibility: every gate met AND the score at or above the threshold.
#[must_use]
pub fn is_eligible(all_gates_met: bool, score: f64, threshold: f64) -> bool {
    all_gates_met && score >= threshold
}

/// Weighted composite of component scores, rounded to two decimals.
///
/// Components absent from the map count as 100.
#[must_use]
pub fn composite_score(
    components: &BTreeMap<Component, u8>,
    config: &ReadinessConfig,
) -> f64 {
    let raw: f64 = COMPONENT_ORDER
        .iter()
        .map(|c| {
            let score = components.get(c).copied().unwrap_or(100);
            config.weights.weight(*c) * f64::from(score)
        })
        .sum();

    ((raw * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

/// Compute the readiness score, gates, blockers and eligibility.
#[must_use]
pub fn compute_readiness_score(
    inputs: ReadinessInputs<'_>,
    config: &ReadinessConfig,
) -> ReadinessResult {
    let ReadinessInputs {
        format,
        artifacts,
        criteria,
    } = inputs;

    let drift_open = criteria.open_high_drift_flag_count > 0;
    let mut components = BTreeMap::new();
    let mut blockers = Vec::new();

    for component in COMPONENT_ORDER {
        let score = match format.component_stage(component) {
            Some(stage) => score_component(
                format,
                component,
                stage,
                matching_artifact(format, artifacts, stage),
                drift_open,
                config,
                &mut blockers,
            ),
            None => 100,
        };
        components.insert(component, score);
    }

    let completed = resolve_completed_stages(format, artifacts);
    let report = compute_gates(format, &completed, criteria, config);

    for gate in report.unmet().filter(|g| g.code.is_criteria_backed()) {
        let code = BlockerCode::Gate(gate.code);
        blockers.push(Blocker {
            code,
            severity: Severity::High,
            message: copy::blocker_message(code, &[]),
            how_to_fix: copy::blocker_how_to_fix(code),
            target_stage: blocker_target_stage(format, code),
        });
    }

    blockers.truncate(config.max_blockers);

    let score = composite_score(&components, config);
    let eligible = is_eligible(report.eligible, score, config.eligible_threshold);

    ReadinessResult {
        score,
        components,
        gates: report.gates,
        blockers,
        eligible,
    }
}

fn score_component(
    format: Format,
    component: Component,
    stage: Stage,
    artifact: Option<&ArtifactRecord>,
    drift_open: bool,
    config: &ReadinessConfig,
    blockers: &mut Vec<Blocker>,
) -> u8 {
    let table = config.deductions.for_component(component);
    let mut score: i32 = 100;

    let mut push = |kind: DeductionKind, detail: &[&str]| {
        let code = BlockerCode::Component(component, kind);
        blockers.push(Blocker {
            code,
            severity: kind.severity(),
            message: copy::blocker_message(code, detail),
            how_to_fix: copy::blocker_how_to_fix(code),
            target_stage: blocker_target_stage(format, code),
        });
    };

    match artifact {
        None => {
            score -= i32::from(table.missing);
            push(DeductionKind::Missing, &[]);
            let absent = required_keywords(stage).len() as i32;
            score -= i32::from(table.per_keyword) * absent;
        }
        Some(record) => {
            if !record.approved {
                score -= i32::from(table.unapproved);
                push(DeductionKind::Unapproved, &[]);
            }

            let text = record.raw_text.as_deref().unwrap_or("");

            let placeholders = find_placeholders(text);
            if !placeholders.is_empty() {
                score -= i32::from(table.placeholders);
                push(DeductionKind::Placeholders, placeholders.as_slice());
            }

            let missing = missing_keywords(stage, text);
            if !missing.is_empty() {
                score -= i32::from(table.per_keyword) * missing.len() as i32;
                push(DeductionKind::MissingFields, missing.as_slice());
            }
        }
    }

    if drift_open && component.tracks_continuity() {
        score = score.min(i32::from(config.drift_clamp));
    }

    score.clamp(0, 100) as u8
}

// =============================================================================
// TESTS
// =============================================================================
