//! Score/pixel conversion for card placement.
//!
//! # Invariants
//! - A card is vertically centered on its score line.
//! - Committed scores are whole numbers in `[0, SCORE_MAX]`.
//! - Committed `x` is never negative; committed width never below
//!   `MIN_CARD_WIDTH`.

/// Top of the score axis.
pub const SCORE_MAX: f64 = 25.0;
/// Approximate rendered card height before zoom scaling.
pub const ESTIMATED_CARD_HEIGHT: f64 = 90.0;
/// Hard floor for card width in logical pixels.
pub const MIN_CARD_WIDTH: f64 = 150.0;
/// Width given to newly created cards.
pub const DEFAULT_CARD_WIDTH: f64 = 200.0;
/// Milestone star edge length before zoom scaling.
pub const MILESTONE_SIZE: f64 = 40.0;

/// Point in board pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for PixelPoint {
    type Output = PixelPoint;

    fn add(self, rhs: Self) -> Self::Output {
        PixelPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for PixelPoint {
    type Output = PixelPoint;

    fn sub(self, rhs: Self) -> Self::Output {
        PixelPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Layout constants for one zoom level.
///
/// `score_row_height` and `zoom_scale` must be positive; `ZoomLevel`
/// guarantees this for every reachable level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub month_width: f64,
    pub score_row_height: f64,
    pub zoom_scale: f64,
}

impl LayoutMetrics {
    fn half_card_height(&self) -> f64 {
        ESTIMATED_CARD_HEIGHT * self.zoom_scale / 2.0
    }
}

/// Pixel position of a card from its stored `x` and `score`.
pub fn card_position(x: f64, score: f64, metrics: &LayoutMetrics) -> PixelPoint {
    PixelPoint {
        x,
        y: (SCORE_MAX - score) * metrics.score_row_height - metrics.half_card_height(),
    }
}

/// Inverts `card_position` for a pixel `y`, rounding to a whole score.
///
/// Rounds half away from zero and clamps to `[0, SCORE_MAX]`.
pub fn score_from_pixel_y(pixel_y: f64, metrics: &LayoutMetrics) -> f64 {
    let raw = SCORE_MAX - (pixel_y + metrics.half_card_height()) / metrics.score_row_height;
    let rounded = raw.round();
    if rounded.is_nan() {
        return 0.0;
    }
    rounded.clamp(0.0, SCORE_MAX)
}

/// Floors a released `x` at the left board edge.
pub fn clamp_x(x: f64) -> f64 {
    x.max(0.0)
}

/// Width after dragging the right edge from `start_pointer_x` to `pointer_x`.
pub fn resized_width(start_width: f64, start_pointer_x: f64, pointer_x: f64) -> f64 {
    (start_width + (pointer_x - start_pointer_x)).max(MIN_CARD_WIDTH)
}
