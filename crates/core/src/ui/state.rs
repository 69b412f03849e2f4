//! Overlay state machine.
//!
//! The selection overlay walks `Hidden -> Showing -> Selecting -> Hidden`,
//! with cancellation (escape, or a zero-area release) short-circuiting back
//! to `Hidden`. The transitions live here as plain data manipulation, away
//! from any window handle, so the interaction rules are unit-testable.
//!
//! One rule is load-bearing rather than cosmetic: the phase flips back to
//! `Hidden` *before* a finalized region is returned to the caller, so the
//! screen grab that follows can never include the overlay itself.

use crate::region::Region;
use eframe::egui;

/// Where the overlay currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayPhase {
    /// Not on screen.
    Hidden,
    /// Covering the display, waiting for a pointer-down.
    Showing,
    /// Pointer is down; `begin` is fixed, `current` tracks the pointer.
    Selecting {
        begin: egui::Pos2,
        current: egui::Pos2,
    },
}

/// What a pointer-up produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// A non-empty region, in physical pixel coordinates.
    Finalized(Region),
    /// Zero-area release; treated as a cancel, not an error.
    Cancelled,
}

/// The overlay's interaction state.
///
/// Exactly one of these exists per overlay surface; a second show request
/// while visible is suppressed rather than stacking surfaces.
pub struct OverlayState {
    phase: OverlayPhase,
}

impl OverlayState {
    pub fn new() -> Self {
        Self {
            phase: OverlayPhase::Hidden,
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn is_hidden(&self) -> bool {
        self.phase == OverlayPhase::Hidden
    }

    /// Asks the overlay to appear.
    ///
    /// Returns true on the `Hidden -> Showing` transition. While already
    /// Showing or Selecting the request is a no-op and returns false.
    pub fn request_show(&mut self) -> bool {
        if self.is_hidden() {
            self.phase = OverlayPhase::Showing;
            true
        } else {
            false
        }
    }

    /// Pointer pressed at `pos`. Only meaningful while Showing.
    pub fn pointer_down(&mut self, pos: egui::Pos2) {
        if self.phase == OverlayPhase::Showing {
            self.phase = OverlayPhase::Selecting {
                begin: pos,
                current: pos,
            };
        }
    }

    /// Pointer moved to `pos` during a drag.
    pub fn pointer_moved(&mut self, pos: egui::Pos2) {
        if let OverlayPhase::Selecting { current, .. } = &mut self.phase {
            *current = pos;
        }
    }

    /// The rectangle to highlight, normalized for any drag direction.
    pub fn selection_rect(&self) -> Option<egui::Rect> {
        match self.phase {
            OverlayPhase::Selecting { begin, current } => {
                Some(egui::Rect::from_two_pos(begin, current))
            }
            _ => None,
        }
    }

    /// Pointer released at `pos`; ends the selection and hides the overlay.
    ///
    /// The phase is `Hidden` by the time this returns, so the caller may
    /// capture immediately after dismissing the surface. `pixels_per_point`
    /// converts the logical UI positions into physical pixels.
    pub fn pointer_up(&mut self, pos: egui::Pos2, pixels_per_point: f32) -> Option<SelectionOutcome> {
        let OverlayPhase::Selecting { begin, .. } = self.phase else {
            return None;
        };

        self.phase = OverlayPhase::Hidden;

        let region = Region::from_points(
            (begin.x * pixels_per_point).round() as i32,
            (begin.y * pixels_per_point).round() as i32,
            (pos.x * pixels_per_point).round() as i32,
            (pos.y * pixels_per_point).round() as i32,
        );

        if region.is_empty() {
            Some(SelectionOutcome::Cancelled)
        } else {
            Some(SelectionOutcome::Finalized(region))
        }
    }

    /// Escape pressed. Hides the overlay from any visible phase.
    ///
    /// Returns true when the overlay was visible, so the caller knows to
    /// dismiss the surface. Nothing is captured.
    pub fn escape(&mut self) -> bool {
        if self.is_hidden() {
            false
        } else {
            self.phase = OverlayPhase::Hidden;
            true
        }
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn drag_in_any_direction_yields_normalized_region() {
        let drags = [
            (pos2(10.0, 20.0), pos2(110.0, 220.0)),
            (pos2(110.0, 220.0), pos2(10.0, 20.0)),
            (pos2(110.0, 20.0), pos2(10.0, 220.0)),
            (pos2(10.0, 220.0), pos2(110.0, 20.0)),
        ];

        for (down, up) in drags {
            let mut state = OverlayState::new();
            assert!(state.request_show());
            state.pointer_down(down);
            state.pointer_moved(up);

            match state.pointer_up(up, 1.0) {
                Some(SelectionOutcome::Finalized(region)) => {
                    assert!(region.x1 <= region.x2);
                    assert!(region.y1 <= region.y2);
                    assert_eq!(region, Region::from_points(10, 20, 110, 220));
                }
                other => panic!("expected finalized region, got {:?}", other),
            }
        }
    }

    #[test]
    fn zero_area_release_is_cancellation() {
        let mut state = OverlayState::new();
        state.request_show();
        state.pointer_down(pos2(50.0, 50.0));

        assert_eq!(
            state.pointer_up(pos2(50.0, 50.0), 1.0),
            Some(SelectionOutcome::Cancelled)
        );
        assert!(state.is_hidden());
    }

    #[test]
    fn overlay_is_hidden_when_region_is_emitted() {
        let mut state = OverlayState::new();
        state.request_show();
        state.pointer_down(pos2(0.0, 0.0));
        state.pointer_moved(pos2(100.0, 100.0));

        let outcome = state.pointer_up(pos2(100.0, 100.0), 1.0);
        assert!(matches!(outcome, Some(SelectionOutcome::Finalized(_))));
        // Hidden before the caller can act on the region.
        assert!(state.is_hidden());
    }

    #[test]
    fn second_show_request_is_suppressed() {
        let mut state = OverlayState::new();
        assert!(state.request_show());
        assert!(!state.request_show());

        state.pointer_down(pos2(1.0, 1.0));
        assert!(!state.request_show());
    }

    #[test]
    fn escape_cancels_from_showing_and_selecting() {
        let mut state = OverlayState::new();
        assert!(!state.escape());

        state.request_show();
        assert!(state.escape());
        assert!(state.is_hidden());

        state.request_show();
        state.pointer_down(pos2(5.0, 5.0));
        assert!(state.escape());
        assert!(state.is_hidden());
    }

    #[test]
    fn scale_factor_maps_logical_points_to_pixels() {
        let mut state = OverlayState::new();
        state.request_show();
        state.pointer_down(pos2(10.0, 10.0));

        match state.pointer_up(pos2(60.0, 40.0), 2.0) {
            Some(SelectionOutcome::Finalized(region)) => {
                assert_eq!(region, Region::from_points(20, 20, 120, 80));
            }
            other => panic!("expected finalized region, got {:?}", other),
        }
    }

    #[test]
    fn pointer_events_before_show_are_ignored() {
        let mut state = OverlayState::new();
        state.pointer_down(pos2(5.0, 5.0));
        assert!(state.is_hidden());
        assert_eq!(state.pointer_up(pos2(50.0, 50.0), 1.0), None);
    }
}
