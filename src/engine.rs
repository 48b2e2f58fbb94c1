//! The single evaluator that ties the pipeline together.
//!
//! Positions and pin snapshots come in, a fresh [`Resolution`] comes out,
//! and the alert scheduler is reconciled before anything downstream can
//! observe the new state. There is exactly one evaluator per engine and it
//! is driven from one thread, so every consumer sees a consistent snapshot:
//! never a stale distance next to a fresh lock.

use crate::alert::{AlertCue, AlertScheduler};
use crate::geo::GeoPosition;
use crate::location::LocationSource;
use crate::pin::Pin;
use crate::proximity::{resolve, LockState, Resolution};
use crate::screen::{map_for_overlay, ScreenPoint};
use log::debug;
use std::sync::mpsc::{self, Receiver};

/// One tracked pin as handed to the presentation layer: resolved values
/// plus the overlay render hint, all derived this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPin {
    /// The pin.
    pub pin: Pin,
    /// Distance from the user, in meters.
    pub distance_m: f64,
    /// Bearing from the user, in degrees.
    pub bearing_deg: f64,
    /// Overlay render hint.
    pub screen: ScreenPoint,
}

/// The proximity engine. Owns the last known position, the current pin
/// snapshot, the latest resolution, and the alert timer.
pub struct ProximityEngine {
    pins: Vec<Pin>,
    position: Option<GeoPosition>,
    tracking_radius_m: f64,
    lock_radius_m: f64,
    resolution: Resolution,
    scheduler: AlertScheduler,
}

impl ProximityEngine {
    /// Builds an engine and the channel its alert cues arrive on.
    pub fn new(tracking_radius_m: f64, lock_radius_m: f64) -> (Self, Receiver<AlertCue>) {
        let (cue_tx, cue_rx) = mpsc::channel();
        let engine = ProximityEngine {
            pins: Vec::new(),
            position: None,
            tracking_radius_m,
            lock_radius_m,
            resolution: Resolution::default(),
            scheduler: AlertScheduler::new(cue_tx),
        };
        (engine, cue_rx)
    }

    /// Replaces the pin snapshot and re-resolves.
    pub fn set_pins(&mut self, pins: Vec<Pin>) {
        self.pins = pins;
        self.reevaluate();
    }

    /// Accepts a pushed position fix and re-resolves.
    pub fn update_position(&mut self, position: GeoPosition) {
        self.position = Some(position);
        self.reevaluate();
    }

    /// Drains every buffered fix from `source`, keeps the freshest, and
    /// re-resolves once. Intermediate fixes carry no information the
    /// resolver wants; only the latest matters.
    pub fn drain_positions(&mut self, source: &mut impl LocationSource) {
        if let Some(latest) = source.by_ref().last() {
            self.update_position(latest);
        }
    }

    /// The last position the engine saw, if any.
    pub fn position(&self) -> Option<&GeoPosition> {
        self.position.as_ref()
    }

    /// The current lock decision.
    pub fn lock_state(&self) -> &LockState {
        &self.resolution.lock
    }

    /// The raw proximity records for this cycle, closest first. The radar
    /// mapper consumes these directly.
    pub fn tracked_records(&self) -> &[crate::proximity::ProximityRecord] {
        &self.resolution.tracked
    }

    /// Every tracked pin with its overlay render hint, closest first.
    pub fn tracked_pins(&self) -> Vec<TrackedPin> {
        let locked_id = self.resolution.lock.locked_pin_id();
        self.resolution
            .tracked
            .iter()
            .map(|record| TrackedPin {
                screen: map_for_overlay(record, locked_id == Some(record.pin.id.as_str())),
                pin: record.pin.clone(),
                distance_m: record.distance_m,
                bearing_deg: record.bearing_deg,
            })
            .collect()
    }

    /// Shuts down the alert timer. Further updates still resolve, but no
    /// cues are emitted after this returns.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    // Resolution completes fully before the scheduler or any snapshot
    // consumer sees it.
    fn reevaluate(&mut self) {
        self.resolution = resolve(
            self.position.as_ref(),
            &self.pins,
            self.tracking_radius_m,
            self.lock_radius_m,
        );
        debug!(
            "resolved {} tracked pin(s), lock: {:?}",
            self.resolution.tracked.len(),
            self.resolution.lock.locked_pin_id()
        );
        self.scheduler.sync(&self.resolution.lock);
    }
}
