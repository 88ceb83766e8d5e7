use foundation::math::{clamp_latitude, wrap_longitude};
use foundation::{DayIndex, DayOutOfRange};

pub const DEFAULT_VELOCITY: &str = "50";

/// A user-control write that would break an interaction invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum StateError {
    Day(DayOutOfRange),
    NonFinite { field: &'static str, value: f64 },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::Day(e) => write!(f, "{e}"),
            StateError::NonFinite { field, value } => {
                write!(f, "{field} must be a finite number, got {value}")
            }
        }
    }
}

impl std::error::Error for StateError {}

impl From<DayOutOfRange> for StateError {
    fn from(e: DayOutOfRange) -> Self {
        StateError::Day(e)
    }
}

/// The user-adjustable view parameters.
///
/// Every write goes through a setter: latitude is clamped to `[-90, 90]`,
/// longitude is wrapped into `[-180, 180)`, and the day stays in `1..=51`.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    day: DayIndex,
    latitude: f64,
    longitude: f64,
    animate: bool,
    velocity: String,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            day: DayIndex::FIRST,
            latitude: 0.0,
            longitude: 0.0,
            animate: false,
            velocity: DEFAULT_VELOCITY.to_string(),
        }
    }
}

impl InteractionState {
    pub fn new(
        day: i64,
        latitude: f64,
        longitude: f64,
        animate: bool,
        velocity: impl Into<String>,
    ) -> Result<Self, StateError> {
        let mut state = Self::default();
        state.set_day(day)?;
        state.set_latitude(latitude)?;
        state.set_longitude(longitude)?;
        state.set_animate(animate);
        state.set_velocity(velocity);
        Ok(state)
    }

    pub fn day(&self) -> DayIndex {
        self.day
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn animate(&self) -> bool {
        self.animate
    }

    /// The velocity exactly as the user typed it.
    pub fn velocity(&self) -> &str {
        &self.velocity
    }

    /// Angular velocity in degrees per second, if the text has an integer prefix.
    pub fn velocity_deg_per_s(&self) -> Option<i64> {
        parse_velocity(&self.velocity)
    }

    pub fn set_day(&mut self, day: i64) -> Result<(), StateError> {
        self.day = DayIndex::new(day)?;
        Ok(())
    }

    pub fn set_day_index(&mut self, day: DayIndex) {
        self.day = day;
    }

    pub fn set_latitude(&mut self, latitude: f64) -> Result<(), StateError> {
        if !latitude.is_finite() {
            return Err(StateError::NonFinite {
                field: "latitude",
                value: latitude,
            });
        }
        self.latitude = clamp_latitude(latitude);
        Ok(())
    }

    pub fn set_longitude(&mut self, longitude: f64) -> Result<(), StateError> {
        if !longitude.is_finite() {
            return Err(StateError::NonFinite {
                field: "longitude",
                value: longitude,
            });
        }
        self.longitude = wrap_longitude(longitude);
        Ok(())
    }

    pub fn set_animate(&mut self, animate: bool) {
        self.animate = animate;
    }

    pub fn set_velocity(&mut self, velocity: impl Into<String>) {
        self.velocity = velocity.into();
    }

    /// Moves to the next day unless already on the last one.
    ///
    /// Returns `(from, to)` when the day changed.
    pub fn advance_day(&mut self) -> Option<(DayIndex, DayIndex)> {
        let from = self.day;
        let to = from.next()?;
        self.day = to;
        Some((from, to))
    }
}

/// Parses the leading integer of `text`.
///
/// Leading whitespace is skipped, then an optional sign and decimal digits
/// are read; anything after the digits is ignored (`"3.9"` is 3,
/// `"12abc"` is 12). Text without leading digits yields `None`.
pub fn parse_velocity(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let magnitude: i64 = digits[..len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
