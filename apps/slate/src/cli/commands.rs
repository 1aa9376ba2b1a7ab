//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands. Report
//! builders and text renderers are public so they can be tested without a
//! terminal.

use super::Outcome;
use crate::project::{MetricsFile, Project, load_metrics, load_project, resolve_format};
use serde::Serialize;
use serde_json::{Value as Json, json};
use slate_core::copy::{
    component_label, flag_message, format_label, stage_label, step_label, unit_gate_reason,
};
use slate_core::pipeline::resolve_completed_stages;
use slate_core::{
    Format, GateReport, PipelineState, Priority, ReadinessInputs, ReadinessResult, SlateConfig,
    SlateError, UnitVerdict, compute_gates, compute_pipeline_state, compute_readiness_score,
};
use std::fmt::Write as _;
use std::path::Path;

/// Print any serializable report as pretty JSON.
fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn outcome(passed: bool) -> Outcome {
    if passed {
        Outcome::Passed
    } else {
        Outcome::Blocked
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

// =============================================================================
// LADDER COMMAND
// =============================================================================

/// Ladder, exclusions and hand-off of a format.
pub fn ladder_report(format: Format) -> Json {
    json!({
        "format": format,
        "ladder": format.ladder(),
        "requires_approval": format
            .ladder()
            .iter()
            .filter(|s| s.requires_approval())
            .collect::<Vec<_>>(),
        "excluded_stages": format.excluded_stages(),
        "handoff": format.handoff(),
    })
}

/// Show the stage ladder of a format.
pub fn cmd_ladder(format_key: &str, json_mode: bool) -> Result<Outcome, SlateError> {
    let format = resolve_format(format_key);

    if json_mode {
        print_json(&ladder_report(format));
        return Ok(Outcome::Passed);
    }

    println!("{} Ladder", format_label(format));
    println!("==================");
    for (i, stage) in format.ladder().iter().enumerate() {
        let approval = if stage.requires_approval() {
            " (approval required)"
        } else {
            ""
        };
        println!("  {}. {}{}", i + 1, stage_label(*stage), approval);
    }
    if format.handoff().is_some() {
        println!();
        println!("Hands off to episode generation once all gates are met.");
    }

    Ok(Outcome::Passed)
}

// =============================================================================
// PIPELINE COMMAND
// =============================================================================

/// Text rendering of a pipeline state.
pub fn render_pipeline(state: &PipelineState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Slate Pipeline");
    let _ = writeln!(out, "==============");
    let _ = writeln!(out, "Format:   {}", format_label(state.format));
    let _ = writeln!(
        out,
        "Progress: {}/{} ({}%)",
        state.completed_count,
        state.ladder.len(),
        state.progress_percent
    );
    let _ = writeln!(
        out,
        "Current:  {}",
        state.current_stage.map_or("(none)", stage_label)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Stages:");
    for stage in &state.ladder {
        let status = state.completed_stages.get(stage);
        let marker = match status {
            Some(s) if s.is_pending_approval() && stage.requires_approval() => "[~]",
            Some(s) if s.exists => "[x]",
            _ => "[ ]",
        };
        let _ = writeln!(out, "  {} {}", marker, stage_label(*stage));
    }

    if !state.next_steps.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Next steps:");
        for (i, step) in state.next_steps.iter().enumerate() {
            let primary = if step.priority == Priority::Primary {
                " (primary)"
            } else {
                ""
            };
            let _ = writeln!(out, "  {}. {}{}", i + 1, step_label(step), primary);
        }
    }

    out
}

/// Show current stage, progress and next steps.
pub fn cmd_pipeline(
    project_path: &Path,
    config: &SlateConfig,
    json_mode: bool,
) -> Result<Outcome, SlateError> {
    let project = load_project(project_path)?;
    let state = compute_pipeline_state(
        project.format,
        &project.artifacts,
        Some(&project.criteria),
        &config.readiness,
    );
    tracing::info!(
        format = %state.format,
        completed = state.completed_count,
        ladder = state.ladder.len(),
        "Pipeline state computed"
    );

    if json_mode {
        print_json(&state);
    } else {
        print!("{}", render_pipeline(&state));
    }
    Ok(Outcome::Passed)
}

// =============================================================================
// GATES COMMAND
// =============================================================================

/// Evaluate the gates of a loaded project.
pub fn gate_report(project: &Project, config: &SlateConfig) -> GateReport {
    let completed = resolve_completed_stages(project.format, &project.artifacts);
    compute_gates(
        project.format,
        &completed,
        &project.criteria,
        &config.readiness,
    )
}

/// Text rendering of a gate report.
pub fn render_gates(report: &GateReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Readiness Gates");
    let _ = writeln!(out, "===============");
    for gate in &report.gates {
        let marker = if gate.met { "[x]" } else { "[ ]" };
        let _ = writeln!(out, "  {} {}", marker, gate.label);
        if let Some(fix) = &gate.how_to_fix {
            let _ = writeln!(out, "      fix: {}", fix);
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.message);
    out
}

/// Evaluate readiness gates.
pub fn cmd_gates(
    project_path: &Path,
    config: &SlateConfig,
    json_mode: bool,
) -> Result<Outcome, SlateError> {
    let project = load_project(project_path)?;
    let report = gate_report(&project, config);
    tracing::info!(
        eligible = report.eligible,
        unmet = report.unmet().count(),
        "Gates evaluated"
    );

    if json_mode {
        print_json(&report);
    } else {
        print!("{}", render_gates(&report));
    }
    Ok(outcome(report.eligible))
}

// =============================================================================
// READINESS COMMAND
// =============================================================================

/// Score a loaded project.
pub fn readiness_report(project: &Project, config: &SlateConfig) -> ReadinessResult {
    compute_readiness_score(
        ReadinessInputs {
            format: project.format,
            artifacts: &project.artifacts,
            criteria: &project.criteria,
        },
        &config.readiness,
    )
}

/// Text rendering of a readiness result.
pub fn render_readiness(result: &ReadinessResult, config: &SlateConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Slate Readiness");
    let _ = writeln!(out, "===============");
    let _ = writeln!(
        out,
        "Score:    {:.2} / 100 (threshold {})",
        result.score, config.readiness.eligible_threshold
    );
    let _ = writeln!(out, "Eligible: {}", yes_no(result.eligible));
    let _ = writeln!(out);

    let _ = writeln!(out, "Components:");
    for (component, score) in &result.components {
        let _ = writeln!(out, "  {:<15} {:>3}", component_label(*component), score);
    }

    if !result.blockers.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Blockers:");
        for blocker in &result.blockers {
            let _ = writeln!(out, "  [{}] {}", blocker.severity, blocker.message);
            let _ = writeln!(out, "      fix: {}", blocker.how_to_fix);
        }
    }
    out
}

/// Compute the readiness score, gates and blockers.
pub fn cmd_readiness(
    project_path: &Path,
    config: &SlateConfig,
    json_mode: bool,
) -> Result<Outcome, SlateError> {
    let project = load_project(project_path)?;
    let result = readiness_report(&project, config);
    tracing::info!(
        score = result.score,
        eligible = result.eligible,
        blockers = result.blockers.len(),
        "Readiness computed"
    );

    if json_mode {
        print_json(&result);
    } else {
        print!("{}", render_readiness(&result, config));
    }
    Ok(outcome(result.eligible))
}

// =============================================================================
// UNIT COMMAND
// =============================================================================

/// Verdict for the latest unit of a metric history.
pub fn unit_report(
    metrics: &MetricsFile,
    total_units: u32,
    config: &SlateConfig,
) -> Result<UnitVerdict, SlateError> {
    metrics
        .history
        .verdict_for_latest(total_units, &config.temporal)
        .ok_or_else(|| SlateError::InputShape("metric history has no units".to_string()))
}

/// Text rendering of a unit verdict.
pub fn render_unit(verdict: &UnitVerdict) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Unit {}", verdict.unit_index);
    let _ = writeln!(out, "==========");
    let _ = writeln!(out, "Target tension: {:.1}", verdict.target_tension);
    let _ = writeln!(out, "Deviation:      {:+.1}", verdict.deviation);
    let _ = writeln!(out, "Retention:      {:.1}", verdict.composites.retention);
    let _ = writeln!(out, "Engagement:     {:.1}", verdict.composites.engagement);
    let _ = writeln!(out, "May advance:    {}", yes_no(verdict.may_advance));

    if !verdict.flags.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Flags:");
        for flag in &verdict.flags {
            let _ = writeln!(out, "  {}: {}", flag, flag_message(*flag));
        }
    }
    if !verdict.gate.reasons.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Gate failures:");
        for reason in &verdict.gate.reasons {
            let _ = writeln!(out, "  - {}", unit_gate_reason(reason));
        }
    }
    out
}

/// Judge the latest unit against the preceding history.
pub fn cmd_unit(
    metrics_path: &Path,
    total_units: Option<u32>,
    config: &SlateConfig,
    json_mode: bool,
) -> Result<Outcome, SlateError> {
    let metrics = load_metrics(metrics_path)?;
    let total = metrics.resolve_total_units(total_units, None);
    let verdict = unit_report(&metrics, total, config)?;
    tracing::info!(
        unit = verdict.unit_index,
        total_units = total,
        flags = verdict.flags.len(),
        may_advance = verdict.may_advance,
        "Unit evaluated"
    );

    if json_mode {
        print_json(&verdict);
    } else {
        print!("{}", render_unit(&verdict));
    }
    Ok(outcome(verdict.may_advance))
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Combined decision over a project and, optionally, its unit history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub pipeline: PipelineState,
    pub readiness: ReadinessResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitVerdict>,
    /// Readiness is eligible and the latest unit, if any, may advance.
    pub may_proceed: bool,
}

/// Run every engine over a loaded project.
pub fn build_check_report(
    project: &Project,
    metrics: Option<&MetricsFile>,
    total_units: Option<u32>,
    config: &SlateConfig,
) -> CheckReport {
    let pipeline = compute_pipeline_state(
        project.format,
        &project.artifacts,
        Some(&project.criteria),
        &config.readiness,
    );
    let readiness = readiness_report(project, config);

    let unit = metrics.and_then(|m| {
        let total = m.resolve_total_units(total_units, Some(&project.criteria));
        let verdict = m.history.verdict_for_latest(total, &config.temporal);
        if verdict.is_none() {
            tracing::warn!("Metric history is empty, skipping unit verdict");
        }
        verdict
    });

    let may_proceed = readiness.eligible && unit.as_ref().is_none_or(|v| v.may_advance);

    CheckReport {
        pipeline,
        readiness,
        unit,
        may_proceed,
    }
}

/// Run every engine and report whether the project may proceed.
pub fn cmd_check(
    project_path: &Path,
    metrics_path: Option<&Path>,
    total_units: Option<u32>,
    config: &SlateConfig,
    json_mode: bool,
) -> Result<Outcome, SlateError> {
    let project = load_project(project_path)?;
    let metrics = metrics_path.map(load_metrics).transpose()?;
    let report = build_check_report(&project, metrics.as_ref(), total_units, config);
    tracing::info!(
        score = report.readiness.score,
        may_proceed = report.may_proceed,
        "Check complete"
    );

    if json_mode {
        print_json(&report);
        return Ok(outcome(report.may_proceed));
    }

    print!("{}", render_pipeline(&report.pipeline));
    println!();
    print!("{}", render_readiness(&report.readiness, config));
    if let Some(verdict) = &report.unit {
        println!();
        print!("{}", render_unit(verdict));
    }
    println!();
    println!("May proceed: {}", yes_no(report.may_proceed));

    Ok(outcome(report.may_proceed))
}
