use foundation::{DayIndex, DAY_COUNT};

/// A row handed to the store that would break the fixed 51-day layout.
#[derive(Debug, Clone, PartialEq)]
pub enum RowError {
    WrongValueCount { expected: usize, found: usize },
    NonFiniteCoordinate { latitude: f64, longitude: f64 },
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::WrongValueCount { expected, found } => {
                write!(f, "expected {expected} day values, found {found}")
            }
            RowError::NonFiniteCoordinate {
                latitude,
                longitude,
            } => write!(f, "non-finite coordinate ({latitude}, {longitude})"),
        }
    }
}

impl std::error::Error for RowError {}

/// One location: fixed coordinates in degrees plus a value per day.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    latitude: f64,
    longitude: f64,
    values: [f64; DAY_COUNT],
}

impl LocationRow {
    pub fn new(latitude: f64, longitude: f64, values: &[f64]) -> Result<Self, RowError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(RowError::NonFiniteCoordinate {
                latitude,
                longitude,
            });
        }
        let values: [f64; DAY_COUNT] =
            values
                .try_into()
                .map_err(|_| RowError::WrongValueCount {
                    expected: DAY_COUNT,
                    found: values.len(),
                })?;
        Ok(Self {
            latitude,
            longitude,
            values,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn values(&self) -> &[f64; DAY_COUNT] {
        &self.values
    }

    pub fn day_value(&self, day: DayIndex) -> f64 {
        self.values[day.value_index()]
    }

    /// Zero and NaN both mean "nothing observed that day".
    pub fn has_observation(&self, day: DayIndex) -> bool {
        let v = self.day_value(day);
        v != 0.0 && !v.is_nan()
    }
}

/// Rows in dataset order. Read-only once handed to the frame driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowStore {
    rows: Vec<LocationRow>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: LocationRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[LocationRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocationRow> {
        self.rows.iter()
    }

    /// Number of rows with an observation on `day`.
    pub fn visible_count(&self, day: DayIndex) -> usize {
        self.rows.iter().filter(|r| r.has_observation(day)).count()
    }
}

impl FromIterator<LocationRow> for RowStore {
    fn from_iter<I: IntoIterator<Item = LocationRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RowStore {
    type Item = &'a LocationRow;
    type IntoIter = std::slice::Iter<'a, LocationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
