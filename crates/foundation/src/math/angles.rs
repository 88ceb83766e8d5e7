//! Degree helpers and the latitude/longitude domain rules.

pub const LATITUDE_LIMIT_DEG: f64 = 90.0;
pub const LONGITUDE_LIMIT_DEG: f64 = 180.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / std::f64::consts::PI
}

/// Saturating clamp. NaN passes through unchanged.
pub fn clamp(x: f64, min: f64, max: f64) -> f64 {
    if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

pub fn clamp_latitude(lat_deg: f64) -> f64 {
    clamp(lat_deg, -LATITUDE_LIMIT_DEG, LATITUDE_LIMIT_DEG)
}

/// Wraps a longitude into `[-180, 180)`, continuous across the date line.
///
/// Crossing +180 re-enters at -180 and vice versa; `-180` itself stays `-180`.
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    let full = 2.0 * LONGITUDE_LIMIT_DEG;
    let wrapped = (lon_deg + LONGITUDE_LIMIT_DEG).rem_euclid(full) - LONGITUDE_LIMIT_DEG;
    // rem_euclid can round up to `full` for tiny negative inputs.
    if wrapped >= LONGITUDE_LIMIT_DEG {
        wrapped - full
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp, clamp_latitude, deg_to_rad, rad_to_deg, wrap_longitude};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn clamp_saturates() {
        assert_eq!(clamp(-95.0, -90.0, 90.0), -90.0);
        assert_eq!(clamp(95.0, -90.0, 90.0), 90.0);
        assert_eq!(clamp(0.0, -90.0, 90.0), 0.0);
        assert_eq!(clamp_latitude(-90.5), -90.0);
    }

    #[test]
    fn clamp_is_monotonic() {
        let mut prev = f64::NEG_INFINITY;
        for i in -200..=200 {
            let v = clamp_latitude(i as f64 * 0.75);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn wrap_matches_seam_behaviour() {
        assert_eq!(wrap_longitude(0.0), 0.0);
        assert_eq!(wrap_longitude(179.0), 179.0);
        assert_eq!(wrap_longitude(180.0), -180.0);
        assert_eq!(wrap_longitude(181.0), -179.0);
        assert_eq!(wrap_longitude(-181.0), 179.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(540.0), -180.0);
        assert_close(wrap_longitude(-725.5), -5.5, 1e-9);
    }

    #[test]
    fn wrap_is_idempotent_and_half_open() {
        let mut x = -1000.0;
        while x <= 1000.0 {
            let w = wrap_longitude(x);
            assert!((-180.0..180.0).contains(&w), "wrap({x}) = {w}");
            assert_eq!(wrap_longitude(w), w, "wrap not idempotent at {x}");
            x += 0.37;
        }
        let tiny = wrap_longitude(-1e-18);
        assert!((-180.0..180.0).contains(&tiny));
    }

    #[test]
    fn degree_radian_round_trip() {
        assert_close(deg_to_rad(180.0), std::f64::consts::PI, 1e-15);
        assert_close(rad_to_deg(deg_to_rad(-37.5)), -37.5, 1e-12);
    }
}
