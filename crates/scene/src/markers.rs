//! Per-row marker placement and color tiers.

use foundation::math::{deg_to_rad, mat4_rotate_x, mat4_rotate_y, Mat4};
use foundation::DayIndex;

use crate::camera::ViewProjection;
use crate::rows::{LocationRow, RowStore};

/// Magnitude band of a day value. Bounds are half-open: `[0, 10)`,
/// `[10, 100)`, `[100, 1000)`, `[1000, ∞)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorTier {
    Green,
    Cyan,
    Blue,
    Red,
}

impl ColorTier {
    pub const ALL: [ColorTier; 4] = [
        ColorTier::Green,
        ColorTier::Cyan,
        ColorTier::Blue,
        ColorTier::Red,
    ];

    pub fn for_value(value: f64) -> Self {
        if value < 10.0 {
            ColorTier::Green
        } else if value < 100.0 {
            ColorTier::Cyan
        } else if value < 1000.0 {
            ColorTier::Blue
        } else {
            ColorTier::Red
        }
    }

    pub fn rgba(self) -> [f32; 4] {
        match self {
            ColorTier::Green => [0.0, 1.0, 0.0, 1.0],
            ColorTier::Cyan => [0.0, 1.0, 1.0, 1.0],
            ColorTier::Blue => [0.0, 0.0, 1.0, 1.0],
            ColorTier::Red => [1.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorTier::Green => "green",
            ColorTier::Cyan => "cyan",
            ColorTier::Blue => "blue",
            ColorTier::Red => "red",
        }
    }
}

/// Clip-space transform for a row's marker segment.
///
/// Rotation only: the segment starts at the globe centre and its length
/// comes from the mesh, not from the value.
pub fn placement_matrix(
    vp: &ViewProjection,
    row: &LocationRow,
    latitude_deg: f64,
    longitude_deg: f64,
) -> Mat4 {
    let m = mat4_rotate_x(
        &vp.view_projection,
        deg_to_rad(-row.latitude() + latitude_deg),
    );
    mat4_rotate_y(&m, deg_to_rad(row.longitude() - longitude_deg))
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerPlacement {
    pub row_index: usize,
    pub value: f64,
    pub tier: ColorTier,
    pub matrix: Mat4,
}

/// Markers to draw for `day`, in dataset order. Rows without an
/// observation that day are skipped.
pub fn visible_markers<'a>(
    rows: &'a RowStore,
    day: DayIndex,
    latitude_deg: f64,
    longitude_deg: f64,
    vp: &'a ViewProjection,
) -> impl Iterator<Item = MarkerPlacement> + 'a {
    rows.iter()
        .enumerate()
        .filter(move |(_, row)| row.has_observation(day))
        .map(move |(row_index, row)| {
            let value = row.day_value(day);
            MarkerPlacement {
                row_index,
                value,
                tier: ColorTier::for_value(value),
                matrix: placement_matrix(vp, row, latitude_deg, longitude_deg),
            }
        })
}

/// Visible-marker count per tier for `day`, in [`ColorTier::ALL`] order.
pub fn tier_histogram(rows: &RowStore, day: DayIndex) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for row in rows.iter().filter(|r| r.has_observation(day)) {
        counts[ColorTier::for_value(row.day_value(day)) as usize] += 1;
    }
    counts
}
