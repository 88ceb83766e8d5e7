use foundation::math::Vec2;

use crate::interaction::{InteractionState, StateError};

/// Degrees of rotation per pixel of pointer travel.
pub const DRAG_SENSITIVITY_DEG_PER_PX: f64 = 0.5;

/// Pointer drag in progress, anchored where it began.
///
/// The globe position during a drag is always `anchor ± delta * sensitivity`,
/// never an accumulation of per-move deltas, so it cannot drift.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DragGesture {
    active: bool,
    anchor_px: Vec2,
    anchor_latitude: f64,
    anchor_longitude: f64,
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn anchor_px(&self) -> Vec2 {
        self.anchor_px
    }

    /// Starts a drag at `pos_px` unless one is already running.
    ///
    /// Returns `true` when a new drag started.
    pub fn pointer_down(&mut self, state: &InteractionState, pos_px: Vec2) -> bool {
        if self.active {
            return false;
        }
        *self = Self {
            active: true,
            anchor_px: pos_px,
            anchor_latitude: state.latitude(),
            anchor_longitude: state.longitude(),
        };
        true
    }

    /// Rotates the globe to follow the pointer.
    ///
    /// Moving down tilts toward positive latitude; moving right decreases
    /// longitude. Returns `Ok(false)` when no drag is active.
    pub fn pointer_move(
        &self,
        state: &mut InteractionState,
        pos_px: Vec2,
        sensitivity: f64,
    ) -> Result<bool, StateError> {
        if !self.active {
            return Ok(false);
        }
        let delta = pos_px - self.anchor_px;
        state.set_latitude(self.anchor_latitude + delta.y * sensitivity)?;
        state.set_longitude(self.anchor_longitude - delta.x * sensitivity)?;
        Ok(true)
    }

    /// Ends the drag. There is no inertia: the globe stays where it was left.
    pub fn pointer_up(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::{DragGesture, DRAG_SENSITIVITY_DEG_PER_PX};
    use crate::interaction::InteractionState;
    use foundation::math::Vec2;

    #[test]
    fn move_without_down_is_ignored() {
        let gesture = DragGesture::new();
        let mut state = InteractionState::default();
        let moved = gesture
            .pointer_move(&mut state, Vec2::new(50.0, 50.0), DRAG_SENSITIVITY_DEG_PER_PX)
            .unwrap();
        assert!(!moved);
        assert_eq!(state, InteractionState::default());
    }

    #[test]
    fn drag_offsets_from_anchor() {
        let mut gesture = DragGesture::new();
        let mut state = InteractionState::new(1, 10.0, 30.0, false, "50").unwrap();
        assert!(gesture.pointer_down(&state, Vec2::new(100.0, 100.0)));

        gesture
            .pointer_move(&mut state, Vec2::new(120.0, 90.0), DRAG_SENSITIVITY_DEG_PER_PX)
            .unwrap();
        assert_eq!(state.latitude(), 5.0);
        assert_eq!(state.longitude(), 20.0);

        // Positions are recomputed from the anchor, not accumulated.
        gesture
            .pointer_move(&mut state, Vec2::new(100.0, 100.0), DRAG_SENSITIVITY_DEG_PER_PX)
            .unwrap();
        assert_eq!(state.latitude(), 10.0);
        assert_eq!(state.longitude(), 30.0);
    }

    #[test]
    fn drag_respects_domain_rules() {
        let mut gesture = DragGesture::new();
        let mut state = InteractionState::new(1, 80.0, 170.0, false, "50").unwrap();
        gesture.pointer_down(&state, Vec2::new(0.0, 0.0));
        gesture
            .pointer_move(&mut state, Vec2::new(-40.0, 100.0), DRAG_SENSITIVITY_DEG_PER_PX)
            .unwrap();
        assert_eq!(state.latitude(), 90.0);
        assert_eq!(state.longitude(), -170.0);
    }

    #[test]
    fn second_down_keeps_original_anchor() {
        let mut gesture = DragGesture::new();
        let mut state = InteractionState::default();
        gesture.pointer_down(&state, Vec2::new(0.0, 0.0));
        state.set_longitude(45.0).unwrap();
        assert!(!gesture.pointer_down(&state, Vec2::new(10.0, 10.0)));
        assert_eq!(gesture.anchor_px(), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn up_ends_drag() {
        let mut gesture = DragGesture::new();
        let mut state = InteractionState::default();
        gesture.pointer_down(&state, Vec2::new(0.0, 0.0));
        assert!(gesture.pointer_up());
        assert!(!gesture.pointer_up());
        let moved = gesture
            .pointer_move(&mut state, Vec2::new(30.0, 0.0), DRAG_SENSITIVITY_DEG_PER_PX)
            .unwrap();
        assert!(!moved);
        assert_eq!(state.longitude(), 0.0);
    }
}
