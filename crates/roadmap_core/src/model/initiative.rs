//! Initiative domain model.
//!
//! # Responsibility
//! - Define the roadmap card record and its creation/edit payload.
//! - Validate form input before it reaches the store.
//!
//! # Invariants
//! - `score` lies in `[0, SCORE_MAX]`.
//! - `objective` may be empty only for milestones.
//! - Missing optional wire fields fall back to UI defaults on read.

use crate::board::color::{HexColor, DEFAULT_CARD_COLOR};
use crate::board::geometry::{DEFAULT_CARD_WIDTH, SCORE_MAX};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque initiative identifier, unique within one product.
pub type InitiativeId = String;

/// One roadmap item, rendered as a card or, when flagged, a milestone star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    pub id: InitiativeId,
    pub title: String,
    /// Vertical axis value. Fractional values survive until the next
    /// drag or resize commit rounds them.
    pub score: f64,
    pub objective: String,
    /// Horizontal pixel offset at zoom level 0.
    #[serde(default)]
    pub x: f64,
    /// Logical card width in pixels.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Base card color as `#RRGGBB`.
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub is_milestone: bool,
}

fn default_width() -> f64 {
    DEFAULT_CARD_WIDTH
}

fn default_color() -> String {
    DEFAULT_CARD_COLOR.to_string()
}

impl Initiative {
    /// Builds a new initiative from a validated draft.
    ///
    /// New cards start at the left edge with the default width.
    pub fn from_draft(id: impl Into<InitiativeId>, draft: &InitiativeDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title.trim().to_string(),
            score: draft.score,
            objective: draft.objective.trim().to_string(),
            x: 0.0,
            width: DEFAULT_CARD_WIDTH,
            color: draft.color.clone(),
            is_milestone: draft.is_milestone,
        }
    }

    /// Replaces form-editable fields, keeping id and layout (`x`, `width`).
    pub fn apply_draft(&mut self, draft: &InitiativeDraft) {
        self.title = draft.title.trim().to_string();
        self.score = draft.score;
        self.objective = draft.objective.trim().to_string();
        self.color = draft.color.clone();
        self.is_milestone = draft.is_milestone;
    }
}

/// Create/edit form payload for one initiative.
#[derive(Debug, Clone, PartialEq)]
pub struct InitiativeDraft {
    pub title: String,
    pub score: f64,
    pub objective: String,
    pub color: String,
    pub is_milestone: bool,
}

impl InitiativeDraft {
    /// Creates a regular card draft with the default color.
    pub fn new(title: impl Into<String>, score: f64, objective: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            score,
            objective: objective.into(),
            color: DEFAULT_CARD_COLOR.to_string(),
            is_milestone: false,
        }
    }

    /// Creates a milestone draft; milestones need no objective.
    pub fn milestone(title: impl Into<String>, score: f64) -> Self {
        Self {
            is_milestone: true,
            ..Self::new(title, score, "")
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Checks form rules before the draft is accepted by the store.
    ///
    /// # Errors
    /// - `EmptyTitle` when the trimmed title is empty.
    /// - `EmptyObjective` when a non-milestone has an empty trimmed objective.
    /// - `ScoreOutOfRange` when score is not finite or outside `[0, 25]`.
    /// - `InvalidColor` when color is not `#RRGGBB`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !self.is_milestone && self.objective.trim().is_empty() {
            return Err(ValidationError::EmptyObjective);
        }
        if !self.score.is_finite() || self.score < 0.0 || self.score > SCORE_MAX {
            return Err(ValidationError::ScoreOutOfRange(self.score));
        }
        if self.color.parse::<HexColor>().is_err() {
            return Err(ValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

/// Form validation errors for initiative drafts.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyTitle,
    EmptyObjective,
    ScoreOutOfRange(f64),
    InvalidColor(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "initiative title cannot be empty"),
            Self::EmptyObjective => {
                write!(f, "initiative objective is required unless it is a milestone")
            }
            Self::ScoreOutOfRange(score) => {
                write!(f, "score {score} is outside 0..={SCORE_MAX}")
            }
            Self::InvalidColor(value) => write!(f, "invalid card color `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Generates a timestamp-derived id that is not already in `existing`.
///
/// Ids are Unix epoch milliseconds; on collision the value is bumped until
/// it is free.
pub fn next_initiative_id<'a>(existing: impl IntoIterator<Item = &'a Initiative>) -> InitiativeId {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    let taken: Vec<&str> = existing
        .into_iter()
        .map(|initiative| initiative.id.as_str())
        .collect();

    let mut candidate = now_ms;
    loop {
        let id = candidate.to_string();
        if !taken.contains(&id.as_str()) {
            return id;
        }
        candidate += 1;
    }
}
