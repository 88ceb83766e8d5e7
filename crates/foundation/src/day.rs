//! Day indices over the fixed 51-day observation window (1/22 .. 3/12).

/// Number of observed days per location.
pub const DAY_COUNT: usize = 51;

// (month, first day, last day), in calendar order.
const CALENDAR: [(u8, u8, u8); 3] = [(1, 22, 31), (2, 1, 29), (3, 1, 12)];

/// A 1-based day index, always within `1..=DAY_COUNT`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayIndex(u8);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DayOutOfRange(pub i64);

impl std::fmt::Display for DayOutOfRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {} is outside 1..={DAY_COUNT}", self.0)
    }
}

impl std::error::Error for DayOutOfRange {}

impl DayIndex {
    pub const FIRST: DayIndex = DayIndex(1);
    pub const LAST: DayIndex = DayIndex(DAY_COUNT as u8);

    pub fn new(day: i64) -> Result<Self, DayOutOfRange> {
        if (1..=DAY_COUNT as i64).contains(&day) {
            Ok(Self(day as u8))
        } else {
            Err(DayOutOfRange(day))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Position of this day inside a location's value sequence.
    pub fn value_index(self) -> usize {
        usize::from(self.0) - 1
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    /// The following day, or `None` on the last one.
    pub fn next(self) -> Option<Self> {
        if self.is_last() {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    pub fn all() -> impl Iterator<Item = DayIndex> {
        (1..=DAY_COUNT as u8).map(DayIndex)
    }

    /// Calendar `(month, day)` of this index.
    pub fn month_day(self) -> (u8, u8) {
        let mut offset = self.value_index() as u8;
        for (month, first, last) in CALENDAR {
            let len = last - first + 1;
            if offset < len {
                return (month, first + offset);
            }
            offset -= len;
        }
        unreachable!("calendar covers every DayIndex")
    }

    /// `"1/22"` style label.
    pub fn label(self) -> String {
        let (month, day) = self.month_day();
        format!("{month}/{day}")
    }

    /// Dataset header naming this day's column (`"D1_22"`).
    pub fn column_name(self) -> String {
        let (month, day) = self.month_day();
        format!("D{month}_{day}")
    }
}

impl Default for DayIndex {
    fn default() -> Self {
        Self::FIRST
    }
}

impl std::fmt::Display for DayIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
