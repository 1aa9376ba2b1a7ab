//! # Stage Ladder Registry
//!
//! Maps a production format to its ordered list of required stages and
//! canonicalizes the heterogeneous identifiers that collaborators use for
//! stages, doc types and formats.
//!
//! ## Ladders
//!
//! | Format | Ladder | Hand-off |
//! |--------|--------|----------|
//! | feature_film (default) | idea → concept_brief → market_sheet → character_bible → treatment → beat_sheet → script → production_draft | - |
//! | short_film | idea → concept_brief → character_bible → script → production_draft | - |
//! | tv_series | idea → concept_brief → market_sheet → character_bible → season_arc → episode_grid | unit generation |
//! | limited_series | idea → concept_brief → character_bible → season_arc → episode_grid | unit generation |
//! | vertical_drama | idea → concept_brief → format_rules → character_bible → season_arc → episode_grid | unit generation |
//! | documentary | idea → concept_brief → treatment → pitch_deck | - |
//!
//! Order encodes dependency: a later stage is only reachable once the earlier
//! stages exist. All tables are `'static`; lookups never allocate beyond key
//! normalization and never fail.

use crate::readiness::Component;
use serde::{Deserialize, Serialize};

// =============================================================================
// STAGE
// =============================================================================

/// Closed, format-independent vocabulary of required deliverables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idea,
    ConceptBrief,
    MarketSheet,
    FormatRules,
    CharacterBible,
    Treatment,
    SeasonArc,
    BeatSheet,
    EpisodeGrid,
    Script,
    ProductionDraft,
    PitchDeck,
}

/// Every known stage, in declaration order.
pub const ALL_STAGES: [Stage; 12] = [
    Stage::Idea,
    Stage::ConceptBrief,
    Stage::MarketSheet,
    Stage::FormatRules,
    Stage::CharacterBible,
    Stage::Treatment,
    Stage::SeasonArc,
    Stage::BeatSheet,
    Stage::EpisodeGrid,
    Stage::Script,
    Stage::ProductionDraft,
    Stage::PitchDeck,
];

impl Stage {
    /// Canonical token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idea => "idea",
            Stage::ConceptBrief => "concept_brief",
            Stage::MarketSheet => "market_sheet",
            Stage::FormatRules => "format_rules",
            Stage::CharacterBible => "character_bible",
            Stage::Treatment => "treatment",
            Stage::SeasonArc => "season_arc",
            Stage::BeatSheet => "beat_sheet",
            Stage::EpisodeGrid => "episode_grid",
            Stage::Script => "script",
            Stage::ProductionDraft => "production_draft",
            Stage::PitchDeck => "pitch_deck",
        }
    }

    /// Parse a canonical token (after normalization). Aliases are not accepted
    /// here; use [`map_doc_type_to_ladder_stage`] for raw doc types.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Stage> {
        let key = normalize_stage_key(raw);
        ALL_STAGES.iter().copied().find(|s| s.as_str() == key)
    }

    /// Stages whose successor may not be recommended until they are approved.
    #[must_use]
    pub fn requires_approval(&self) -> bool {
        matches!(
            self,
            Stage::ConceptBrief
                | Stage::Treatment
                | Stage::SeasonArc
                | Stage::BeatSheet
                | Stage::EpisodeGrid
                | Stage::Script
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// FORMAT
// =============================================================================

/// Production formats with a defined ladder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    FeatureFilm,
    ShortFilm,
    TvSeries,
    LimitedSeries,
    VerticalDrama,
    Documentary,
}

/// Every supported format.
pub const ALL_FORMATS: [Format; 6] = [
    Format::FeatureFilm,
    Format::ShortFilm,
    Format::TvSeries,
    Format::LimitedSeries,
    Format::VerticalDrama,
    Format::Documentary,
];

/// Downstream mode a format hands off to once its ladder is gated through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handoff {
    /// Serialized generation of episodic units.
    UnitGeneration,
}

const FORMAT_ALIASES: &[(&str, Format)] = &[
    ("feature_film", Format::FeatureFilm),
    ("feature", Format::FeatureFilm),
    ("film", Format::FeatureFilm),
    ("movie", Format::FeatureFilm),
    ("short_film", Format::ShortFilm),
    ("short", Format::ShortFilm),
    ("tv_series", Format::TvSeries),
    ("series", Format::TvSeries),
    ("tv", Format::TvSeries),
    ("episodic", Format::TvSeries),
    ("limited_series", Format::LimitedSeries),
    ("limited", Format::LimitedSeries),
    ("miniseries", Format::LimitedSeries),
    ("mini_series", Format::LimitedSeries),
    ("vertical_drama", Format::VerticalDrama),
    ("vertical", Format::VerticalDrama),
    ("micro_drama", Format::VerticalDrama),
    ("shorts", Format::VerticalDrama),
    ("documentary", Format::Documentary),
    ("doc", Format::Documentary),
    ("docu", Format::Documentary),
];

impl Format {
    /// Canonical token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::FeatureFilm => "feature_film",
            Format::ShortFilm => "short_film",
            Format::TvSeries => "tv_series",
            Format::LimitedSeries => "limited_series",
            Format::VerticalDrama => "vertical_drama",
            Format::Documentary => "documentary",
        }
    }

    /// Parse a format key or alias. `None` for unknown keys.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Format> {
        let key = normalize_format_key(raw);
        FORMAT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, format)| *format)
    }

    /// Parse a format key, falling back to the default ladder's format.
    #[must_use]
    pub fn resolve(raw: &str) -> Format {
        Self::parse(raw).unwrap_or_default()
    }

    /// Ordered required stages for this format.
    #[must_use]
    pub fn ladder(&self) -> &'static [Stage] {
        use Stage::*;
        match self {
            Format::FeatureFilm => &[
                Idea,
                ConceptBrief,
                MarketSheet,
                CharacterBible,
                Treatment,
                BeatSheet,
                Script,
                ProductionDraft,
            ],
            Format::ShortFilm => &[Idea, ConceptBrief, CharacterBible, Script, ProductionDraft],
            Format::TvSeries => &[
                Idea,
                ConceptBrief,
                MarketSheet,
                CharacterBible,
                SeasonArc,
                EpisodeGrid,
            ],
            Format::LimitedSeries => &[Idea, ConceptBrief, CharacterBible, SeasonArc, EpisodeGrid],
            Format::VerticalDrama => &[
                Idea,
                ConceptBrief,
                FormatRules,
                CharacterBible,
                SeasonArc,
                EpisodeGrid,
            ],
            Format::Documentary => &[Idea, ConceptBrief, Treatment, PitchDeck],
        }
    }

    /// Whether `stage` is part of this format's ladder.
    #[must_use]
    pub fn contains(&self, stage: Stage) -> bool {
        self.ladder().contains(&stage)
    }

    /// Position of `stage` in the ladder.
    #[must_use]
    pub fn index_of(&self, stage: Stage) -> Option<usize> {
        self.ladder().iter().position(|s| *s == stage)
    }

    /// Known stages that are foreign to this format.
    #[must_use]
    pub fn excluded_stages(&self) -> Vec<Stage> {
        ALL_STAGES
            .iter()
            .copied()
            .filter(|s| !self.contains(*s))
            .collect()
    }

    /// Whether the format is built from sequential episodic units.
    #[must_use]
    pub fn is_episodic(&self) -> bool {
        self.contains(Stage::EpisodeGrid)
    }

    /// Downstream hand-off, if the format defines one.
    #[must_use]
    pub fn handoff(&self) -> Option<Handoff> {
        self.is_episodic().then_some(Handoff::UnitGeneration)
    }

    /// The ladder stage backing a readiness component in this format.
    ///
    /// `None` when no stage in this ladder covers the component.
    #[must_use]
    pub fn component_stage(&self, component: Component) -> Option<Stage> {
        let candidates: &[Stage] = match component {
            Component::Concept => &[Stage::ConceptBrief],
            Component::Arc => &[Stage::SeasonArc, Stage::Treatment],
            Component::Grid => &[Stage::EpisodeGrid, Stage::BeatSheet],
            Component::Characters => &[Stage::CharacterBible],
            Component::Format => &[Stage::FormatRules],
        };
        candidates.iter().copied().find(|s| self.contains(*s))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// KEY NORMALIZATION
// =============================================================================

/// Canonicalize an identifier: lowercase, and collapse runs of `-`, `_` and
/// whitespace into a single `_`, trimming separators at both ends.
fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            pending_sep = !out.is_empty();
            continue;
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        out.extend(ch.to_lowercase());
    }

    out
}

/// Normalize a format key (`"Vertical-Drama"` → `"vertical_drama"`).
#[must_use]
pub fn normalize_format_key(raw: &str) -> String {
    normalize_key(raw)
}

/// Normalize a stage or doc-type key (`"Episode Grid"` → `"episode_grid"`).
#[must_use]
pub fn normalize_stage_key(raw: &str) -> String {
    normalize_key(raw)
}

// =============================================================================
// DOC TYPE MAPPING
// =============================================================================

const STAGE_ALIASES: &[(&str, Stage)] = &[
    ("idea", Stage::Idea),
    ("seed", Stage::Idea),
    ("spark", Stage::Idea),
    ("concept_brief", Stage::ConceptBrief),
    ("concept", Stage::ConceptBrief),
    ("brief", Stage::ConceptBrief),
    ("logline", Stage::ConceptBrief),
    ("concept_doc", Stage::ConceptBrief),
    ("market_sheet", Stage::MarketSheet),
    ("market", Stage::MarketSheet),
    ("market_analysis", Stage::MarketSheet),
    ("comps", Stage::MarketSheet),
    ("format_rules", Stage::FormatRules),
    ("format_bible", Stage::FormatRules),
    ("format", Stage::FormatRules),
    ("character_bible", Stage::CharacterBible),
    ("characters", Stage::CharacterBible),
    ("character_sheet", Stage::CharacterBible),
    ("cast_bible", Stage::CharacterBible),
    ("treatment", Stage::Treatment),
    ("synopsis", Stage::Treatment),
    ("season_arc", Stage::SeasonArc),
    ("series_arc", Stage::SeasonArc),
    ("story_arc", Stage::SeasonArc),
    ("arc", Stage::SeasonArc),
    ("season_outline", Stage::SeasonArc),
    ("beat_sheet", Stage::BeatSheet),
    ("beats", Stage::BeatSheet),
    ("beat_outline", Stage::BeatSheet),
    ("episode_grid", Stage::EpisodeGrid),
    ("grid", Stage::EpisodeGrid),
    ("episode_map", Stage::EpisodeGrid),
    ("episode_breakdown", Stage::EpisodeGrid),
    ("script", Stage::Script),
    ("screenplay", Stage::Script),
    ("feature_script", Stage::Script),
    ("pilot_script", Stage::Script),
    ("production_draft", Stage::ProductionDraft),
    ("shooting_script", Stage::ProductionDraft),
    ("production_script", Stage::ProductionDraft),
    ("pitch_deck", Stage::PitchDeck),
    ("deck", Stage::PitchDeck),
    ("lookbook", Stage::PitchDeck),
];

/// Map a raw doc type onto a canonical stage.
///
/// Total: returns `None` only for unrecognized input.
#[must_use]
pub fn map_doc_type_to_ladder_stage(raw: &str) -> Option<Stage> {
    let key = normalize_stage_key(raw);
    lookup_alias(&key)
}

/// Map a raw doc type onto a stage, resolving synonyms whose meaning depends
/// on the format.
///
/// `blueprint` is the season arc in episodic formats and the treatment
/// otherwise; `outline` is the episode grid in episodic formats and the beat
/// sheet otherwise. Everything else goes through the global alias table.
#[must_use]
pub fn map_doc_type_for_format(format: Format, raw: &str) -> Option<Stage> {
    let key = normalize_stage_key(raw);
    match key.as_str() {
        "blueprint" if format.is_episodic() => Some(Stage::SeasonArc),
        "blueprint" => Some(Stage::Treatment),
        "outline" if format.is_episodic() => Some(Stage::EpisodeGrid),
        "outline" => Some(Stage::BeatSheet),
        _ => lookup_alias(&key),
    }
}

fn lookup_alias(key: &str) -> Option<Stage> {
    STAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, stage)| *stage)
}

/// Ladder for a raw format key; unknown formats get the feature-film ladder.
#[must_use]
pub fn get_ladder(format_key: &str) -> Vec<Stage> {
    Format::resolve(format_key).ladder().to_vec()
}

/// The closed set of all known stages.
#[must_use]
pub fn all_stages() -> &'static [Stage] {
    &ALL_STAGES
}

// =============================================================================
// TESTS
// =============================================================================
