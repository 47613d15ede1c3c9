//! Board-level interaction session.
//!
//! # Responsibility
//! - Hold the single "active card" slot shared by drag and resize.
//! - Hold the single "open modal" slot.
//! - Turn pointer motion into live card frames and a final commit.
//! - Track the board pan offset.
//!
//! # Invariants
//! - At most one card is dragging or resizing at any time.
//! - No drag/resize starts while a modal is open, and no modal opens while
//!   a card is active.
//! - Panning excludes card interactions and modals; the pan offset
//!   survives across pans.
//! - `release` always returns the card slot to idle.

use crate::board::geometry::{
    card_position, clamp_x, resized_width, score_from_pixel_y, LayoutMetrics, PixelPoint,
};
use crate::model::initiative::{Initiative, InitiativeId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Modal dialogs that block board interaction while open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalKind {
    /// Initiative form; `None` means creating a new initiative.
    InitiativeEditor(Option<InitiativeId>),
    ProductEditor,
    RemoteSync,
}

/// Rejected session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Another card is already being dragged or resized.
    Busy(InitiativeId),
    ModalOpen(ModalKind),
    /// Milestones have no resize affordance.
    NotResizable(InitiativeId),
    /// The board itself is being panned.
    Panning,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy(id) => write!(f, "initiative {id} is already being moved"),
            Self::ModalOpen(kind) => write!(f, "board is blocked by open modal {kind:?}"),
            Self::NotResizable(id) => {
                write!(f, "initiative {id} is a milestone and cannot be resized")
            }
            Self::Panning => write!(f, "board is being panned"),
        }
    }
}

impl Error for SessionError {}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    Dragging { pointer_offset: PixelPoint },
    Resizing { start_pointer_x: f64, start_width: f64 },
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveCard {
    initiative_id: InitiativeId,
    interaction: Interaction,
    frame: CardFrame,
    metrics: LayoutMetrics,
}

/// Live on-screen frame of the active card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardFrame {
    pub position: PixelPoint,
    pub width: f64,
}

/// Logical values to write back once an interaction ends.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionCommit {
    pub initiative_id: InitiativeId,
    pub x: f64,
    pub score: f64,
    pub width: f64,
}

/// Single-active-interaction state for one board.
#[derive(Debug, Clone, Default)]
pub struct BoardSession {
    active: Option<ActiveCard>,
    open_modal: Option<ModalKind>,
    pan_offset: PixelPoint,
    pan_anchor: Option<PixelPoint>,
}

impl BoardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the card being dragged or resized.
    pub fn active_card_id(&self) -> Option<&str> {
        self.active
            .as_ref()
            .map(|active| active.initiative_id.as_str())
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self.active.as_ref().map(|active| active.interaction),
            Some(Interaction::Dragging { .. })
        )
    }

    pub fn is_resizing(&self) -> bool {
        matches!(
            self.active.as_ref().map(|active| active.interaction),
            Some(Interaction::Resizing { .. })
        )
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.open_modal.is_none() && self.pan_anchor.is_none()
    }

    /// Current live frame of the active card.
    pub fn live_frame(&self) -> Option<CardFrame> {
        self.active.as_ref().map(|active| active.frame)
    }

    /// Starts dragging `initiative` from `pointer`.
    ///
    /// Captures the pointer offset from the card's rendered position so the
    /// card does not jump under the cursor.
    pub fn begin_drag(
        &mut self,
        initiative: &Initiative,
        pointer: PixelPoint,
        metrics: LayoutMetrics,
    ) -> Result<(), SessionError> {
        self.ensure_available()?;
        let position = card_position(initiative.x, initiative.score, &metrics);
        self.active = Some(ActiveCard {
            initiative_id: initiative.id.clone(),
            interaction: Interaction::Dragging {
                pointer_offset: pointer - position,
            },
            frame: CardFrame {
                position,
                width: initiative.width,
            },
            metrics,
        });
        Ok(())
    }

    /// Starts resizing `initiative` from its right edge at `pointer_x`.
    pub fn begin_resize(
        &mut self,
        initiative: &Initiative,
        pointer_x: f64,
        metrics: LayoutMetrics,
    ) -> Result<(), SessionError> {
        self.ensure_available()?;
        if initiative.is_milestone {
            return Err(SessionError::NotResizable(initiative.id.clone()));
        }
        self.active = Some(ActiveCard {
            initiative_id: initiative.id.clone(),
            interaction: Interaction::Resizing {
                start_pointer_x: pointer_x,
                start_width: initiative.width,
            },
            frame: CardFrame {
                position: card_position(initiative.x, initiative.score, &metrics),
                width: initiative.width,
            },
            metrics,
        });
        Ok(())
    }

    /// Feeds pointer motion; returns the updated live frame.
    ///
    /// Dragging moves the card freely (no clamping until release); resizing
    /// changes only the width.
    pub fn pointer_moved(&mut self, pointer: PixelPoint) -> Option<CardFrame> {
        let active = self.active.as_mut()?;
        match active.interaction {
            Interaction::Dragging { pointer_offset } => {
                active.frame.position = pointer - pointer_offset;
            }
            Interaction::Resizing {
                start_pointer_x,
                start_width,
            } => {
                active.frame.width = resized_width(start_width, start_pointer_x, pointer.x);
            }
        }
        Some(active.frame)
    }

    /// Ends the active interaction and returns the values to persist.
    ///
    /// Drag release floors `x` at zero; resize release keeps `x`. Both
    /// recompute the score from the card's current `y`.
    pub fn release(&mut self) -> Option<PositionCommit> {
        let active = self.active.take()?;
        let frame = active.frame;
        let x = match active.interaction {
            Interaction::Dragging { .. } => clamp_x(frame.position.x),
            Interaction::Resizing { .. } => frame.position.x,
        };
        Some(PositionCommit {
            initiative_id: active.initiative_id,
            x,
            score: score_from_pixel_y(frame.position.y, &active.metrics),
            width: frame.width,
        })
    }

    /// Opens a modal, blocking drag/resize until it closes.
    pub fn open_modal(&mut self, modal: ModalKind) -> Result<(), SessionError> {
        self.ensure_available()?;
        self.open_modal = Some(modal);
        Ok(())
    }

    /// Closes the open modal, returning it.
    pub fn close_modal(&mut self) -> Option<ModalKind> {
        self.open_modal.take()
    }

    pub fn open_modal_kind(&self) -> Option<&ModalKind> {
        self.open_modal.as_ref()
    }

    /// Accumulated board pan offset.
    pub fn pan_offset(&self) -> PixelPoint {
        self.pan_offset
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// Starts panning the board from `pointer`.
    pub fn begin_pan(&mut self, pointer: PixelPoint) -> Result<(), SessionError> {
        self.ensure_available()?;
        self.pan_anchor = Some(pointer);
        Ok(())
    }

    /// Adds the motion since the last pointer event to the pan offset.
    pub fn pan_moved(&mut self, pointer: PixelPoint) -> Option<PixelPoint> {
        let anchor = self.pan_anchor?;
        self.pan_anchor = Some(pointer);
        self.pan_offset = self.pan_offset + (pointer - anchor);
        Some(self.pan_offset)
    }

    /// Stops panning; returns whether a pan was active.
    pub fn end_pan(&mut self) -> bool {
        self.pan_anchor.take().is_some()
    }

    fn ensure_available(&self) -> Result<(), SessionError> {
        if self.pan_anchor.is_some() {
            return Err(SessionError::Panning);
        }
        if let Some(active) = &self.active {
            return Err(SessionError::Busy(active.initiative_id.clone()));
        }
        if let Some(modal) = &self.open_modal {
            return Err(SessionError::ModalOpen(modal.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardSession, ModalKind, SessionError};
    use crate::board::geometry::{PixelPoint, MIN_CARD_WIDTH};
    use crate::board::zoom::ZoomLevel;
    use crate::model::initiative::{Initiative, InitiativeDraft};

    fn card(id: &str, x: f64, score: f64) -> Initiative {
        let mut initiative =
            Initiative::from_draft(id, &InitiativeDraft::new("Card", score, "goal"));
        initiative.x = x;
        initiative
    }

    #[test]
    fn drag_commits_clamped_x_and_rounded_score() {
        let metrics = ZoomLevel::default().metrics();
        let initiative = card("1", 100.0, 10.0);
        let mut session = BoardSession::new();

        // Card top-left sits at (100, 15 * 40 - 45 = 555).
        session
            .begin_drag(&initiative, PixelPoint::new(110.0, 565.0), metrics)
            .expect("idle session should accept drag");
        assert_eq!(session.active_card_id(), Some("1"));
        assert!(session.is_dragging());

        let frame = session
            .pointer_moved(PixelPoint::new(-400.0, 565.0 - 3.0 * 40.0 - 10.0))
            .expect("active drag should yield frame");
        assert_eq!(frame.position.x, -410.0);

        let commit = session.release().expect("drag should commit");
        assert_eq!(commit.initiative_id, "1");
        assert_eq!(commit.x, 0.0);
        assert_eq!(commit.score, 13.0);
        assert_eq!(commit.width, initiative.width);
        assert!(session.is_idle());
    }

    #[test]
    fn resize_commits_floored_width_and_keeps_position() {
        let metrics = ZoomLevel::new(2).metrics();
        let mut initiative = card("7", 40.0, 12.4);
        initiative.width = 260.0;
        let mut session = BoardSession::new();

        session
            .begin_resize(&initiative, 300.0, metrics)
            .expect("idle session should accept resize");
        let grown = session
            .pointer_moved(PixelPoint::new(350.0, 0.0))
            .expect("resize frame");
        assert_eq!(grown.width, 310.0);
        let shrunk = session
            .pointer_moved(PixelPoint::new(-5_000.0, 999.0))
            .expect("resize frame");
        assert_eq!(shrunk.width, MIN_CARD_WIDTH);

        let commit = session.release().expect("resize should commit");
        assert_eq!(commit.x, 40.0);
        assert_eq!(commit.score, 12.0);
        assert_eq!(commit.width, MIN_CARD_WIDTH);
    }

    #[test]
    fn only_one_card_can_be_active() {
        let metrics = ZoomLevel::default().metrics();
        let mut session = BoardSession::new();
        session
            .begin_drag(&card("a", 0.0, 5.0), PixelPoint::default(), metrics)
            .expect("first drag");

        let err = session
            .begin_resize(&card("b", 0.0, 5.0), 0.0, metrics)
            .expect_err("second interaction must be rejected");
        assert_eq!(err, SessionError::Busy("a".to_string()));
        assert!(session.open_modal(ModalKind::ProductEditor).is_err());
    }

    #[test]
    fn open_modal_blocks_interactions_until_closed() {
        let metrics = ZoomLevel::default().metrics();
        let mut session = BoardSession::new();
        session
            .open_modal(ModalKind::InitiativeEditor(Some("a".to_string())))
            .expect("modal should open");

        let err = session
            .begin_drag(&card("a", 0.0, 5.0), PixelPoint::default(), metrics)
            .expect_err("drag behind modal must be rejected");
        assert!(matches!(err, SessionError::ModalOpen(_)));
        assert!(session.open_modal(ModalKind::RemoteSync).is_err());

        assert_eq!(
            session.close_modal(),
            Some(ModalKind::InitiativeEditor(Some("a".to_string())))
        );
        assert!(session
            .begin_drag(&card("a", 0.0, 5.0), PixelPoint::default(), metrics)
            .is_ok());
    }

    #[test]
    fn milestones_move_but_do_not_resize() {
        let metrics = ZoomLevel::default().metrics();
        let mut star = card("m", 10.0, 20.0);
        star.is_milestone = true;
        let mut session = BoardSession::new();

        assert_eq!(
            session.begin_resize(&star, 0.0, metrics),
            Err(SessionError::NotResizable("m".to_string()))
        );
        session
            .begin_drag(&star, PixelPoint::new(10.0, 155.0), metrics)
            .expect("milestone drag");
        let commit = session.release().expect("milestone commit");
        assert_eq!(commit.score, 20.0);
        assert_eq!(commit.x, 10.0);
    }

    #[test]
    fn pan_accumulates_offset_across_pans() {
        let metrics = ZoomLevel::default().metrics();
        let mut session = BoardSession::new();
        assert!(session.pan_moved(PixelPoint::new(5.0, 5.0)).is_none());

        session
            .begin_pan(PixelPoint::new(100.0, 100.0))
            .expect("idle session should accept pan");
        assert!(session.is_panning());
        assert_eq!(
            session.pan_moved(PixelPoint::new(130.0, 90.0)),
            Some(PixelPoint::new(30.0, -10.0))
        );
        assert_eq!(
            session.pan_moved(PixelPoint::new(150.0, 80.0)),
            Some(PixelPoint::new(50.0, -20.0))
        );

        let err = session
            .begin_drag(&card("a", 0.0, 5.0), PixelPoint::default(), metrics)
            .expect_err("drag during pan must be rejected");
        assert_eq!(err, SessionError::Panning);
        assert!(session.end_pan());
        assert!(session.is_idle());

        session.begin_pan(PixelPoint::new(0.0, 0.0)).expect("second pan");
        session.pan_moved(PixelPoint::new(-10.0, 20.0));
        session.end_pan();
        assert_eq!(session.pan_offset(), PixelPoint::new(40.0, 0.0));
        assert!(!session.end_pan());
    }

    #[test]
    fn pan_waits_for_active_card() {
        let metrics = ZoomLevel::default().metrics();
        let mut session = BoardSession::new();
        session
            .begin_drag(&card("a", 0.0, 5.0), PixelPoint::default(), metrics)
            .expect("drag");

        assert_eq!(
            session.begin_pan(PixelPoint::default()),
            Err(SessionError::Busy("a".to_string()))
        );
        assert_eq!(session.pan_offset(), PixelPoint::default());
    }

    #[test]
    fn release_without_interaction_is_noop() {
        let mut session = BoardSession::new();
        assert!(session.pointer_moved(PixelPoint::new(1.0, 1.0)).is_none());
        assert!(session.release().is_none());
    }
}
