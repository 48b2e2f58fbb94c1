//! Converts geographic coordinates into the local planar frame that every
//! other EchoSpray stage works in.
//!
//! The conversion is an equirectangular small-area approximation: one degree
//! of latitude is treated as a fixed [`METERS_PER_DEGREE`], and one degree of
//! longitude as that constant scaled by the cosine of the origin latitude.
//! This is accurate to well under a meter for the few hundred meters of
//! separation the tracking radius allows, and falls apart over long
//! distances. It is not a geodesic solver and never needs to be one here.

use std::f64::consts::PI;

/// Meters spanned by one degree of latitude.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A user position as reported by a location provider. Replaced wholesale on
/// every update, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Reported fix accuracy in meters.
    pub accuracy_m: f64,
}

/// Planar offset from an origin position, in meters. `dx_m` points east,
/// `dy_m` points north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalOffset {
    /// Eastward offset in meters.
    pub dx_m: f64,
    /// Northward offset in meters.
    pub dy_m: f64,
}

/// Computes the planar offset of (`latitude`, `longitude`) from `origin`.
pub fn local_offset(origin: &GeoPosition, latitude: f64, longitude: f64) -> LocalOffset {
    let dy_m = (latitude - origin.latitude) * METERS_PER_DEGREE;
    let dx_m =
        (longitude - origin.longitude) * METERS_PER_DEGREE * (origin.latitude * PI / 180.0).cos();
    LocalOffset { dx_m, dy_m }
}

/// Collapses a planar offset into straight-line distance (meters) and
/// compass bearing (degrees). Bearing 0 means the target is due north and
/// positive bearing rotates clockwise, so due east is +90. The range is
/// (-180, 180]. A zero offset has no meaningful bearing; by convention it
/// reports 0.
pub fn distance_bearing(offset: LocalOffset) -> (f64, f64) {
    let distance_m = offset.dx_m.hypot(offset.dy_m);
    if distance_m == 0.0 {
        return (0.0, 0.0);
    }
    let bearing_deg = offset.dx_m.atan2(offset.dy_m).to_degrees();
    (distance_m, bearing_deg)
}

/// A 2D canvas that geographic coordinates can be projected onto. The origin
/// position lands at the canvas center, north is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas width in pixels.
    pub width_px: f64,
    /// Canvas height in pixels.
    pub height_px: f64,
    /// Ground meters represented by one pixel.
    pub meters_per_px: f64,
}

/// Projects (`latitude`, `longitude`) into pixel coordinates on `viewport`,
/// centered on `origin`. A simple scale-and-translate over [`local_offset`],
/// shared by the plan-view map and the radar widget so they can never
/// disagree on where a pin sits.
pub fn project_to_viewport(
    latitude: f64,
    longitude: f64,
    origin: &GeoPosition,
    viewport: &Viewport,
) -> (f64, f64) {
    let offset = local_offset(origin, latitude, longitude);
    let x = viewport.width_px / 2.0 + offset.dx_m / viewport.meters_per_px;
    // Screen y grows downward, north grows upward
    let y = viewport.height_px / 2.0 - offset.dy_m / viewport.meters_per_px;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn origin() -> GeoPosition {
        GeoPosition {
            latitude: 0.0,
            longitude: 0.0,
            accuracy_m: 5.0,
        }
    }

    #[test]
    fn coincident_points_have_zero_distance() {
        let here = GeoPosition {
            latitude: 37.7749,
            longitude: -122.4194,
            accuracy_m: 5.0,
        };
        let (distance, bearing) = distance_bearing(local_offset(&here, 37.7749, -122.4194));
        assert!(distance.abs() < EPSILON);
        assert_eq!(bearing, 0.0);
    }

    #[test]
    fn one_millidegree_north_is_111_meters() {
        let (distance, bearing) = distance_bearing(local_offset(&origin(), 0.001, 0.0));
        assert!((distance - 111.32).abs() < 0.01);
        assert!(bearing.abs() < EPSILON);
    }

    #[test]
    fn due_east_bears_90_degrees() {
        let (_, bearing) = distance_bearing(local_offset(&origin(), 0.0, 0.001));
        assert!((bearing - 90.0).abs() < EPSILON);
    }

    #[test]
    fn swapping_endpoints_flips_the_bearing() {
        let a = GeoPosition {
            latitude: 51.5,
            longitude: -0.12,
            accuracy_m: 5.0,
        };
        let b = GeoPosition {
            latitude: 51.5007,
            longitude: -0.1213,
            accuracy_m: 5.0,
        };
        let (d_ab, brg_ab) = distance_bearing(local_offset(&a, b.latitude, b.longitude));
        let (d_ba, brg_ba) = distance_bearing(local_offset(&b, a.latitude, a.longitude));

        // Near-identical cos(latitude) factors at either end, so the
        // distances agree and the bearings differ by half a turn.
        assert!((d_ab - d_ba).abs() < 0.001);
        let flipped = (brg_ab - brg_ba + 540.0).rem_euclid(360.0) - 180.0;
        assert!(flipped.abs() < 0.01);
    }

    #[test]
    fn longitude_shrinks_away_from_the_equator() {
        let nordkapp = GeoPosition {
            latitude: 71.0,
            longitude: 25.0,
            accuracy_m: 5.0,
        };
        let at_equator = local_offset(&origin(), 0.0, 0.001);
        let up_north = local_offset(&nordkapp, 71.0, 25.001);
        assert!(up_north.dx_m < at_equator.dx_m * 0.4);
    }

    #[test]
    fn viewport_centers_the_origin() {
        let viewport = Viewport {
            width_px: 400.0,
            height_px: 300.0,
            meters_per_px: 1.0,
        };
        let (x, y) = project_to_viewport(0.0, 0.0, &origin(), &viewport);
        assert_eq!((x, y), (200.0, 150.0));
    }

    #[test]
    fn viewport_north_is_up() {
        let viewport = Viewport {
            width_px: 400.0,
            height_px: 300.0,
            meters_per_px: 2.0,
        };
        // ~111.32 m north of the origin, so 55.66 px above center
        let (x, y) = project_to_viewport(0.001, 0.0, &origin(), &viewport);
        assert!((x - 200.0).abs() < EPSILON);
        assert!((y - (150.0 - 55.66)).abs() < 0.01);
    }
}
