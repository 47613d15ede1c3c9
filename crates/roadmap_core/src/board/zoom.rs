//! Discrete zoom levels and the card metrics derived from them.

use crate::board::geometry::{LayoutMetrics, MILESTONE_SIZE, SCORE_MAX};

pub const MIN_ZOOM_LEVEL: i8 = -3;
pub const MAX_ZOOM_LEVEL: i8 = 5;

const BASE_MONTH_WIDTH: f64 = 250.0;
const BASE_SCORE_ROW_HEIGHT: f64 = 40.0;
const MONTH_WIDTH_STEP: f64 = 50.0;
const SCORE_ROW_HEIGHT_STEP: f64 = 5.0;
const ZOOM_PERCENT_STEP: i32 = 20;
const LATER_COLUMN_RATIO: f64 = 1.2;

/// Column labels: twelve months plus a trailing "Later" bucket.
pub const MONTH_COLUMNS: [&str; 13] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec", "Later",
];

/// Zoom level in `[MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL]`; 0 is 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ZoomLevel(i8);

impl ZoomLevel {
    /// Clamps `level` into the supported range.
    pub fn new(level: i8) -> Self {
        Self(level.clamp(MIN_ZOOM_LEVEL, MAX_ZOOM_LEVEL))
    }

    pub fn level(self) -> i8 {
        self.0
    }

    /// One step in; saturates at `MAX_ZOOM_LEVEL`.
    pub fn zoom_in(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// One step out; saturates at `MIN_ZOOM_LEVEL`.
    pub fn zoom_out(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }

    pub fn can_zoom_in(self) -> bool {
        self.0 < MAX_ZOOM_LEVEL
    }

    pub fn can_zoom_out(self) -> bool {
        self.0 > MIN_ZOOM_LEVEL
    }

    /// Display percentage, 20 points per level.
    pub fn percent(self) -> i32 {
        100 + i32::from(self.0) * ZOOM_PERCENT_STEP
    }

    /// Multiplier applied to card content.
    pub fn scale(self) -> f64 {
        f64::from(self.percent()) / 100.0
    }

    pub fn month_width(self) -> f64 {
        BASE_MONTH_WIDTH + f64::from(self.0) * MONTH_WIDTH_STEP
    }

    pub fn score_row_height(self) -> f64 {
        BASE_SCORE_ROW_HEIGHT + f64::from(self.0) * SCORE_ROW_HEIGHT_STEP
    }

    pub fn later_width(self) -> f64 {
        self.month_width() * LATER_COLUMN_RATIO
    }

    /// Width of column `index` in `MONTH_COLUMNS`.
    pub fn column_width(self, index: usize) -> f64 {
        if index + 1 == MONTH_COLUMNS.len() {
            self.later_width()
        } else {
            self.month_width()
        }
    }

    pub fn grid_width(self) -> f64 {
        self.month_width() * 12.0 + self.later_width()
    }

    pub fn grid_height(self) -> f64 {
        SCORE_MAX * self.score_row_height()
    }

    pub fn metrics(self) -> LayoutMetrics {
        LayoutMetrics {
            month_width: self.month_width(),
            score_row_height: self.score_row_height(),
            zoom_scale: self.scale(),
        }
    }

    pub fn card_metrics(self) -> CardMetrics {
        CardMetrics::for_scale(self.scale())
    }
}

/// Score axis tick labels from top to bottom (25, 20, ..., 0).
pub fn score_axis_ticks() -> Vec<u8> {
    (0..6u8).map(|step| 25 - step * 5).collect()
}

/// Scaled card element sizes with legibility floors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardMetrics {
    pub scale: f64,
    pub min_width: f64,
    pub padding: f64,
    pub title_font: f64,
    pub score_font: f64,
    pub objective_font: f64,
    pub icon_size: f64,
    pub milestone_size: f64,
    pub resize_affordance_width: f64,
    pub resize_grip_width: f64,
    pub resize_grip_height: f64,
}

impl CardMetrics {
    pub fn for_scale(scale: f64) -> Self {
        Self {
            scale,
            min_width: (50.0 * scale).max(50.0),
            padding: (12.0 * scale).max(2.0),
            title_font: (12.0 * scale).max(8.0),
            score_font: (10.0 * scale).max(8.0),
            objective_font: (11.0 * scale).max(8.0),
            icon_size: (16.0 * scale).max(12.0),
            milestone_size: MILESTONE_SIZE * scale,
            resize_affordance_width: (8.0 * scale).max(1.0),
            resize_grip_width: (4.0 * scale).max(1.0),
            resize_grip_height: (32.0 * scale).max(16.0),
        }
    }

    /// On-screen width of a regular card with logical `width`.
    pub fn rendered_width(&self, width: f64) -> f64 {
        width * self.scale
    }
}
