//! Maps resolved (distance, bearing) pairs into render-ready screen
//! positions for the radar widget and the camera overlay.
//!
//! Everything here is stateless and recomputed per cycle; easing and
//! animation belong to the presentation layer, not to this crate.

use crate::proximity::ProximityRecord;

/// Horizontal overlay pixels per degree of bearing.
pub const OVERLAY_PX_PER_DEGREE: f64 = 8.0;

/// Distance at which overlay markers bottom out on size and opacity, in
/// meters.
pub const FADE_RANGE_M: f64 = 150.0;

/// Marker scale applied to the locked target.
pub const LOCKED_SCALE: f64 = 1.6;

/// A per-pin render hint. Derived every cycle, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal offset from the overlay center, in pixels.
    pub x: f64,
    /// Vertical offset from the overlay center, in pixels.
    pub y: f64,
    /// Marker scale factor.
    pub scale: f64,
    /// Marker opacity in [0, 1].
    pub opacity: f64,
    /// Draw order; nearer pins get larger values and draw on top.
    pub z_order: i32,
}

/// Places a tracked pin on a radar of radius `radar_radius_px`.
///
/// Polar placement: radius is the pin's distance scaled into the radar disc,
/// angle is `bearing - 90` so a due-north pin renders at the top. Returns a
/// Cartesian offset from the radar center in screen coordinates, y growing
/// downward.
pub fn map_for_radar(
    record: &ProximityRecord,
    radar_radius_px: f64,
    tracking_radius_m: f64,
) -> (f64, f64) {
    let r = (record.distance_m / tracking_radius_m) * radar_radius_px;
    let theta = (record.bearing_deg - 90.0).to_radians();
    (theta.cos() * r, theta.sin() * r)
}

/// Computes the overlay render hint for a tracked pin.
///
/// The horizontal offset is linear in bearing, so side targets slide off
/// the edge of the viewport instead of wrapping. Size and opacity fall off
/// with distance down to fixed floors; the locked target is pinned to
/// [`LOCKED_SCALE`] regardless of distance.
pub fn map_for_overlay(record: &ProximityRecord, is_locked: bool) -> ScreenPoint {
    let scale = if is_locked {
        LOCKED_SCALE
    } else {
        (1.2 - record.distance_m / FADE_RANGE_M).max(0.3)
    };
    ScreenPoint {
        x: record.bearing_deg * OVERLAY_PX_PER_DEGREE,
        y: 0.0,
        scale,
        opacity: (1.0 - record.distance_m / FADE_RANGE_M).max(0.1),
        z_order: 100 - record.distance_m.round() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::Pin;

    fn record(distance_m: f64, bearing_deg: f64) -> ProximityRecord {
        ProximityRecord {
            pin: Pin {
                id: "a".to_owned(),
                title: "pin a".to_owned(),
                creator: "tester".to_owned(),
                latitude: 0.0,
                longitude: 0.0,
                created_at_ms: 0,
                audio_ref: String::new(),
                visual_ref: None,
            },
            distance_m,
            bearing_deg,
        }
    }

    const EPSILON: f64 = 1e-9;

    #[test]
    fn due_north_renders_at_the_top_of_the_radar() {
        let (x, y) = map_for_radar(&record(100.0, 0.0), 60.0, 200.0);
        assert!(x.abs() < EPSILON);
        assert!((y + 30.0).abs() < EPSILON); // up is negative y
    }

    #[test]
    fn due_east_renders_at_the_right_edge() {
        let (x, y) = map_for_radar(&record(200.0, 90.0), 60.0, 200.0);
        assert!((x - 60.0).abs() < EPSILON);
        assert!(y.abs() < EPSILON);
    }

    #[test]
    fn radar_radius_scales_with_distance() {
        let near = map_for_radar(&record(50.0, 180.0), 60.0, 200.0);
        let far = map_for_radar(&record(150.0, 180.0), 60.0, 200.0);
        assert!((near.1 - 15.0).abs() < EPSILON);
        assert!((far.1 - 45.0).abs() < EPSILON);
    }

    #[test]
    fn overlay_offset_is_linear_in_bearing() {
        assert!((map_for_overlay(&record(10.0, 0.0), false).x).abs() < EPSILON);
        assert!((map_for_overlay(&record(10.0, 45.0), false).x - 360.0).abs() < EPSILON);
        assert!((map_for_overlay(&record(10.0, -45.0), false).x + 360.0).abs() < EPSILON);
    }

    #[test]
    fn overlay_fades_with_distance_down_to_the_floors() {
        let near = map_for_overlay(&record(0.0, 0.0), false);
        assert!((near.scale - 1.2).abs() < EPSILON);
        assert!((near.opacity - 1.0).abs() < EPSILON);

        let far = map_for_overlay(&record(149.0, 0.0), false);
        assert!(far.scale >= 0.3);
        assert!(far.opacity >= 0.1);

        // Past the fade range both floors hold (reachable while tracked,
        // since tracking extends to 200 m)
        let distant = map_for_overlay(&record(190.0, 0.0), false);
        assert!((distant.scale - 0.3).abs() < EPSILON);
        assert!((distant.opacity - 0.1).abs() < EPSILON);
    }

    #[test]
    fn locked_target_is_enlarged_regardless_of_distance() {
        let hint = map_for_overlay(&record(11.9, 0.0), true);
        assert!((hint.scale - LOCKED_SCALE).abs() < EPSILON);
    }

    #[test]
    fn nearer_pins_draw_on_top() {
        let near = map_for_overlay(&record(3.2, 0.0), false);
        let far = map_for_overlay(&record(140.0, 0.0), false);
        assert_eq!(near.z_order, 97);
        assert_eq!(far.z_order, -40);
        assert!(near.z_order > far.z_order);
    }
}
