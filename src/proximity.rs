//! Decides which pins are nearby and whether one of them is locked.
//!
//! [`resolve`] is a pure function from (user position, pin field) to a
//! [`Resolution`]; it owns no state and is cheap enough to rerun on every
//! position or pin update. The lock decision has no hysteresis: a target
//! locks below [`LOCK_RADIUS_M`] and unlocks the instant it drifts back out,
//! which can flicker right at the boundary. That matches the shipped
//! behavior; the constant is named so a hysteresis band can be slotted in
//! later without hunting for magic numbers.

use crate::geo::{distance_bearing, local_offset, GeoPosition};
use crate::pin::Pin;
use log::warn;
use std::cmp::Ordering;

/// Pins farther away than this are ignored entirely, in meters.
pub const TRACKING_RADIUS_M: f64 = 200.0;

/// The closest tracked pin becomes the locked target below this distance,
/// in meters.
pub const LOCK_RADIUS_M: f64 = 12.0;

/// A pin's position relative to the user, recomputed from scratch every
/// cycle. Carries no identity beyond the pin's own id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityRecord {
    /// The pin this record describes.
    pub pin: Pin,
    /// Straight-line distance from the user, in meters.
    pub distance_m: f64,
    /// Compass bearing from the user to the pin, in degrees (-180, 180].
    pub bearing_deg: f64,
}

/// Whether a pin is currently the active alert target. At most one pin is
/// ever locked.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LockState {
    /// No pin within the lock radius.
    #[default]
    Unlocked,
    /// The closest tracked pin is inside the lock radius.
    Locked {
        /// The locked target.
        pin: Pin,
        /// Its distance at the time of resolution, in meters.
        distance_m: f64,
    },
}

impl LockState {
    /// True when a target is locked.
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked { .. })
    }

    /// The locked pin's id, if any.
    pub fn locked_pin_id(&self) -> Option<&str> {
        match self {
            LockState::Unlocked => None,
            LockState::Locked { pin, .. } => Some(&pin.id),
        }
    }
}

/// One full pass of the resolver: every tracked pin, closest first, plus the
/// lock decision.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Tracked pins ordered by (distance, id) ascending.
    pub tracked: Vec<ProximityRecord>,
    /// The lock decision for this cycle.
    pub lock: LockState,
}

/// Resolves the pin field against the user's position.
///
/// No position yet is a normal startup state, not an error: it resolves to
/// an empty tracked set and [`LockState::Unlocked`]. Pins with non-finite
/// coordinates are skipped with a warning and can never lock.
pub fn resolve(
    user: Option<&GeoPosition>,
    pins: &[Pin],
    tracking_radius_m: f64,
    lock_radius_m: f64,
) -> Resolution {
    let Some(user) = user else {
        return Resolution::default();
    };

    let mut tracked: Vec<ProximityRecord> = pins
        .iter()
        .filter(|pin| {
            let finite = pin.latitude.is_finite() && pin.longitude.is_finite();
            if !finite {
                warn!("pin {} has non-finite coordinates, skipping", pin.id);
            }
            finite
        })
        .map(|pin| {
            let offset = local_offset(user, pin.latitude, pin.longitude);
            let (distance_m, bearing_deg) = distance_bearing(offset);
            ProximityRecord {
                pin: pin.clone(),
                distance_m,
                bearing_deg,
            }
        })
        .filter(|record| record.distance_m < tracking_radius_m)
        .collect();

    // (distance, id) ascending; the id leg makes exact-tie selection
    // deterministic across runs
    tracked.sort_by(|a, b| {
        a.distance_m
            .partial_cmp(&b.distance_m)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.pin.id.cmp(&b.pin.id))
    });

    let lock = match tracked.first() {
        Some(closest) if closest.distance_m < lock_radius_m => LockState::Locked {
            pin: closest.pin.clone(),
            distance_m: closest.distance_m,
        },
        _ => LockState::Unlocked,
    };

    Resolution { tracked, lock }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin_at(id: &str, latitude: f64, longitude: f64) -> Pin {
        Pin {
            id: id.to_owned(),
            title: format!("pin {}", id),
            creator: "tester".to_owned(),
            latitude,
            longitude,
            created_at_ms: 0,
            audio_ref: String::new(),
            visual_ref: None,
        }
    }

    fn user_at(latitude: f64, longitude: f64) -> GeoPosition {
        GeoPosition {
            latitude,
            longitude,
            accuracy_m: 5.0,
        }
    }

    fn resolve_default(user: Option<&GeoPosition>, pins: &[Pin]) -> Resolution {
        resolve(user, pins, TRACKING_RADIUS_M, LOCK_RADIUS_M)
    }

    #[test]
    fn no_position_resolves_to_nothing() {
        let pins = [pin_at("a", 0.0, 0.0)];
        let res = resolve_default(None, &pins);
        assert!(res.tracked.is_empty());
        assert_eq!(res.lock, LockState::Unlocked);
    }

    #[test]
    fn empty_field_resolves_to_nothing() {
        let res = resolve_default(Some(&user_at(0.0, 0.0)), &[]);
        assert!(res.tracked.is_empty());
        assert_eq!(res.lock, LockState::Unlocked);
    }

    #[test]
    fn pin_111_meters_north_is_tracked_but_not_locked() {
        let user = user_at(0.0, 0.0);
        let pins = [pin_at("a", 0.001, 0.0)];
        let res = resolve_default(Some(&user), &pins);

        assert_eq!(res.tracked.len(), 1);
        let record = &res.tracked[0];
        assert!((record.distance_m - 111.32).abs() < 0.01);
        assert!(record.bearing_deg.abs() < 1e-6);
        assert_eq!(res.lock, LockState::Unlocked);
    }

    #[test]
    fn pin_beyond_tracking_radius_is_dropped() {
        let user = user_at(0.0, 0.0);
        // ~222.6 m north
        let pins = [pin_at("a", 0.002, 0.0)];
        let res = resolve_default(Some(&user), &pins);
        assert!(res.tracked.is_empty());
    }

    #[test]
    fn pin_inside_lock_radius_locks() {
        let user = user_at(0.0, 0.0);
        // ~5.57 m north
        let pins = [pin_at("a", 0.00005, 0.0)];
        let res = resolve_default(Some(&user), &pins);

        match &res.lock {
            LockState::Locked { pin, distance_m } => {
                assert_eq!(pin.id, "a");
                assert!((distance_m - 5.566).abs() < 0.01);
            }
            LockState::Unlocked => panic!("expected a lock at ~5.6 m"),
        }
    }

    #[test]
    fn closest_of_two_lockable_pins_wins() {
        let user = user_at(0.0, 0.0);
        let pins = [
            pin_at("far", 0.0000719, 0.0), // ~8 m
            pin_at("near", 0.0000449, 0.0), // ~5 m
        ];
        let res = resolve_default(Some(&user), &pins);

        assert_eq!(res.lock.locked_pin_id(), Some("near"));
        assert_eq!(res.tracked[0].pin.id, "near");
        assert_eq!(res.tracked[1].pin.id, "far");
    }

    #[test]
    fn exact_distance_ties_break_by_id() {
        let user = user_at(0.0, 0.0);
        // Same latitude offset north and south: identical distances
        let pins = [pin_at("b", 0.00005, 0.0), pin_at("a", -0.00005, 0.0)];
        let res = resolve_default(Some(&user), &pins);
        assert_eq!(res.lock.locked_pin_id(), Some("a"));
    }

    #[test]
    fn at_most_one_pin_is_ever_locked() {
        let user = user_at(0.0, 0.0);
        let pins: Vec<Pin> = (0..20)
            .map(|i| pin_at(&format!("p{:02}", i), 0.00001 * i as f64, 0.0))
            .collect();
        let res = resolve_default(Some(&user), &pins);

        // The lock is a single variant by construction; make sure it agrees
        // with the head of the tracked ordering
        assert_eq!(res.lock.locked_pin_id(), Some("p00"));
    }

    #[test]
    fn non_finite_pins_are_skipped() {
        let user = user_at(0.0, 0.0);
        let mut broken = pin_at("broken", f64::NAN, 0.0);
        broken.longitude = f64::INFINITY;
        let pins = [broken, pin_at("ok", 0.0001, 0.0)];
        let res = resolve_default(Some(&user), &pins);

        assert_eq!(res.tracked.len(), 1);
        assert_eq!(res.tracked[0].pin.id, "ok");
    }

    #[test]
    fn unlock_is_instant_at_the_boundary() {
        let user = user_at(0.0, 0.0);
        // ~12.03 m north: tracked, just outside the lock radius
        let pins = [pin_at("a", 0.000108, 0.0)];
        let res = resolve_default(Some(&user), &pins);
        assert!(res.tracked.len() == 1);
        assert_eq!(res.lock, LockState::Unlocked);
    }
}
