//! Auto-rotation and the day counter coupled to it.
//!
//! Each frame the globe optionally spins west by `velocity * dt`, then the
//! day advances if longitude just changed sign while the previous frame's
//! longitude sat inside the ±20° band around the reference meridian. The
//! band keeps a wrap at the ±180° seam (where the sign also flips) from
//! counting as a day.
//!
//! The tracker is updated every frame whether or not animation is on, so a
//! manual drag or a typed longitude that crosses 0° also advances the day.

use foundation::DayIndex;

use crate::event_bus::{EventBus, SessionEvent};
use crate::frame::Frame;
use crate::interaction::InteractionState;

/// Half-width of the band, in degrees, the previous longitude must sit in.
pub const CROSSING_BAND_DEG: f64 = 20.0;

/// Last frame's longitude, plus the velocity text last reported as unusable
/// so a bad value is reported once rather than every frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LongitudeTracker {
    previous: f64,
    reported_velocity: Option<String>,
}

impl LongitudeTracker {
    pub fn new(longitude: f64) -> Self {
        Self {
            previous: longitude,
            reported_velocity: None,
        }
    }

    pub fn previous(&self) -> f64 {
        self.previous
    }
}

/// What a single [`step`] changed.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub rotated: bool,
    pub day_advanced: Option<(DayIndex, DayIndex)>,
    /// Animation is on but the velocity text did not parse.
    pub velocity_rejected: bool,
    /// First frame rejecting this particular velocity text.
    pub rejection_reported: bool,
}

/// True when moving from `previous` to `current` passes the reference
/// meridian.
pub fn crossed_reference_meridian(previous: f64, current: f64) -> bool {
    current * previous < 0.0 && previous > -CROSSING_BAND_DEG && previous < CROSSING_BAND_DEG
}

/// Advances the interaction state by one frame.
pub fn step(
    frame: Frame,
    state: &mut InteractionState,
    tracker: &mut LongitudeTracker,
    bus: &mut EventBus,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    if state.animate() {
        match state.velocity_deg_per_s() {
            Some(velocity) => {
                let next = state.longitude() - frame.dt_s * velocity as f64;
                if state.set_longitude(next).is_ok() {
                    outcome.rotated = true;
                    bus.emit(
                        frame.index,
                        SessionEvent::Rotated {
                            longitude: state.longitude(),
                        },
                    );
                }
            }
            None => {
                outcome.velocity_rejected = true;
                let text = state.velocity();
                if tracker.reported_velocity.as_deref() != Some(text) {
                    outcome.rejection_reported = true;
                    tracker.reported_velocity = Some(text.to_string());
                    bus.emit(
                        frame.index,
                        SessionEvent::VelocityRejected {
                            text: text.to_string(),
                        },
                    );
                }
            }
        }
    }
    if !outcome.velocity_rejected {
        tracker.reported_velocity = None;
    }

    let current = state.longitude();
    if crossed_reference_meridian(tracker.previous, current) {
        outcome.day_advanced = state.advance_day();
        if let Some((from, to)) = outcome.day_advanced {
            bus.emit(frame.index, SessionEvent::DayAdvanced { from, to });
        }
    }
    tracker.previous = current;

    outcome
}

#[cfg(test)]
mod tests {
    use super::{crossed_reference_meridian, step, LongitudeTracker};
    use crate::event_bus::{EventBus, SessionEvent};
    use crate::frame::{Frame, FrameClock};
    use crate::interaction::InteractionState;
    use foundation::time::Time;
    use foundation::DayIndex;

    fn frame(dt_s: f64) -> Frame {
        Frame {
            index: 0,
            dt_s,
            time: Time(0.0),
        }
    }

    #[test]
    fn idle_frame_changes_nothing() {
        let mut state = InteractionState::default();
        let mut tracker = LongitudeTracker::default();
        let mut bus = EventBus::new();
        let outcome = step(frame(0.5), &mut state, &mut tracker, &mut bus);
        assert!(!outcome.rotated);
        assert_eq!(outcome.day_advanced, None);
        assert_eq!(state, InteractionState::default());
        assert!(bus.events().is_empty());
    }

    #[test]
    fn animation_spins_west_by_velocity() {
        let mut state = InteractionState::new(1, 0.0, 10.0, true, "50").unwrap();
        let mut tracker = LongitudeTracker::new(10.0);
        let mut bus = EventBus::new();
        let outcome = step(frame(0.1), &mut state, &mut tracker, &mut bus);
        assert!(outcome.rotated);
        assert_eq!(state.longitude(), 5.0);
        assert_eq!(tracker.previous(), 5.0);
    }

    #[test]
    fn crossing_inside_band_advances_once() {
        let mut state = InteractionState::new(1, 0.0, 19.0, false, "50").unwrap();
        let mut tracker = LongitudeTracker::new(-5.0);
        let mut bus = EventBus::new();
        let outcome = step(frame(0.016), &mut state, &mut tracker, &mut bus);
        assert_eq!(
            outcome.day_advanced,
            Some((DayIndex::FIRST, DayIndex::new(2).unwrap()))
        );
        assert_eq!(state.day().get(), 2);

        // Same longitude next frame: no second increment.
        step(frame(0.016), &mut state, &mut tracker, &mut bus);
        assert_eq!(state.day().get(), 2);
    }

    #[test]
    fn band_is_checked_against_previous_longitude() {
        // Current value is outside the band but the previous one is inside.
        let mut state = InteractionState::new(1, 0.0, 25.0, false, "50").unwrap();
        let mut tracker = LongitudeTracker::new(-5.0);
        let mut bus = EventBus::new();
        let outcome = step(frame(0.016), &mut state, &mut tracker, &mut bus);
        assert!(outcome.day_advanced.is_some());
        assert_eq!(state.day().get(), 2);
    }

    #[test]
    fn seam_wrap_does_not_advance() {
        assert!(!crossed_reference_meridian(179.0, -179.0));
        assert!(!crossed_reference_meridian(-20.0, 1.0));
        assert!(!crossed_reference_meridian(20.0, -1.0));
        assert!(crossed_reference_meridian(19.9, -0.1));
        // Landing exactly on zero is not a sign change.
        assert!(!crossed_reference_meridian(3.0, 0.0));
        assert!(!crossed_reference_meridian(0.0, -3.0));
    }

    #[test]
    fn day_never_exceeds_last() {
        let mut state = InteractionState::default();
        state.set_day(51).unwrap();
        let mut tracker = LongitudeTracker::default();
        let mut bus = EventBus::new();
        for i in 0..1000 {
            let lon = if i % 2 == 0 { 1.0 } else { -1.0 };
            state.set_longitude(lon).unwrap();
            let outcome = step(frame(0.016), &mut state, &mut tracker, &mut bus);
            assert_eq!(outcome.day_advanced, None);
        }
        assert_eq!(state.day(), DayIndex::LAST);
    }

    #[test]
    fn full_rotation_advances_one_day() {
        // 90 deg/s at 10 fps: one revolution in 4 s.
        let mut state = InteractionState::new(1, 0.0, 10.0, true, "90").unwrap();
        let mut tracker = LongitudeTracker::new(state.longitude());
        let mut bus = EventBus::new();
        let mut clock = FrameClock::new();
        for _ in 0..40 {
            let f = clock.tick_fixed(0.1);
            step(f, &mut state, &mut tracker, &mut bus);
        }
        assert_eq!(state.day().get(), 2);
        let advances = bus
            .events()
            .iter()
            .filter(|e| matches!(e.event, SessionEvent::DayAdvanced { .. }))
            .count();
        assert_eq!(advances, 1);
    }

    #[test]
    fn manual_crossing_advances_day_while_idle() {
        // Pinned behaviour: the tracker runs even when animation is off, so
        // moving the globe across 0° by hand also advances the day.
        let mut state = InteractionState::new(1, 0.0, 4.0, false, "50").unwrap();
        let mut tracker = LongitudeTracker::new(4.0);
        let mut bus = EventBus::new();
        step(frame(0.016), &mut state, &mut tracker, &mut bus);
        state.set_longitude(-3.0).unwrap();
        step(frame(0.016), &mut state, &mut tracker, &mut bus);
        assert_eq!(state.day().get(), 2);
    }

    #[test]
    fn unparsable_velocity_holds_position() {
        let mut state = InteractionState::new(1, 0.0, 10.0, true, "fast").unwrap();
        let mut tracker = LongitudeTracker::new(10.0);
        let mut bus = EventBus::new();
        let outcome = step(frame(0.5), &mut state, &mut tracker, &mut bus);
        assert!(outcome.velocity_rejected);
        assert!(outcome.rejection_reported);
        assert!(!outcome.rotated);
        assert_eq!(state.longitude(), 10.0);
        assert_eq!(
            bus.events()[0].event,
            SessionEvent::VelocityRejected {
                text: "fast".to_string()
            }
        );
    }

    #[test]
    fn bad_velocity_is_reported_once_per_value() {
        let mut state = InteractionState::new(1, 0.0, 10.0, true, "fast").unwrap();
        let mut tracker = LongitudeTracker::new(10.0);
        let mut bus = EventBus::new();
        let mut clock = FrameClock::new();
        let rejections = |bus: &EventBus| {
            bus.events()
                .iter()
                .filter(|e| matches!(e.event, SessionEvent::VelocityRejected { .. }))
                .count()
        };

        for _ in 0..60 {
            step(clock.tick_fixed(1.0 / 60.0), &mut state, &mut tracker, &mut bus);
        }
        assert_eq!(rejections(&bus), 1);

        state.set_velocity("slow");
        for _ in 0..60 {
            step(clock.tick_fixed(1.0 / 60.0), &mut state, &mut tracker, &mut bus);
        }
        assert_eq!(rejections(&bus), 2);

        // A good value in between re-arms the report for the old text.
        state.set_velocity("10");
        step(clock.tick_fixed(1.0 / 60.0), &mut state, &mut tracker, &mut bus);
        state.set_velocity("slow");
        let outcome = step(clock.tick_fixed(1.0 / 60.0), &mut state, &mut tracker, &mut bus);
        assert!(outcome.rejection_reported);
        assert_eq!(rejections(&bus), 3);
    }
}
