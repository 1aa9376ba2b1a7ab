//! # slate-core
//!
//! The deterministic decision engine for Slate.
//!
//! Given a project's format, its stored artifacts and a handful of project
//! criteria, this crate decides:
//! - where the project sits on its format's stage ladder and what to do next,
//! - how ready it is for unit generation, and what blocks it,
//! - whether a generated unit may hand off to the next one.
//!
//! ## Architectural Constraints
//!
//! - Pure functions over caller-supplied snapshots; no storage, no I/O
//! - Decisions are emitted as codes; the `copy` module owns all user-facing text
//! - Unrecognized input degrades to defaults instead of failing
//! - NO async, NO network dependencies

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod copy;
pub mod gates;
pub mod ladder;
pub mod pipeline;
pub mod readiness;
pub mod temporal;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ArtifactRecord, ProjectCriteria, Severity, SlateError, StageStatus};

// =============================================================================
// RE-EXPORTS: Configuration
// =============================================================================

pub use config::{ReadinessConfig, SlateConfig, TemporalConfig};

// =============================================================================
// RE-EXPORTS: Stage Ladder
// =============================================================================

pub use ladder::{
    ALL_FORMATS, ALL_STAGES, Format, Handoff, Stage, all_stages, get_ladder,
    map_doc_type_for_format, map_doc_type_to_ladder_stage,
};

// =============================================================================
// RE-EXPORTS: Pipeline & Readiness
// =============================================================================

pub use gates::{Gate, GateCode, GateReport, compute_gates};
pub use pipeline::{
    NextStep, PipelineState, Priority, StepAction, StepReason, compute_pipeline_state,
    compute_pipeline_state_json,
};
pub use readiness::{
    Blocker, BlockerCode, Component, ReadinessInputs, ReadinessResult, compute_readiness_score,
};

// =============================================================================
// RE-EXPORTS: Temporal Metrics
// =============================================================================

pub use temporal::{
    Flag, MetricHistory, MetricSnapshot, UnitGate, UnitMetrics, UnitVerdict,
    detect_tension_flags, evaluate_unit, metrics_pass_gate, target_tension,
};
