//! Terminal radar for EchoSpray: a simulated walker strolls north through
//! a demo pin field while the chart shows every tracked pin relative to
//! the user, the locked target in red. Press q to quit.

mod gui;

use std::sync::{Arc, Mutex};

use echospray::dummy_location::{step_position, DummyWalker};
use echospray::engine::ProximityEngine;
use echospray::geo::GeoPosition;
use echospray::pin::{now_ms, Pin};
use echospray::proximity::{LockState, LOCK_RADIUS_M, TRACKING_RADIUS_M};
use echospray::screen::map_for_radar;
use gui::{engage_gui, RadarFrame};

const RADAR_RADIUS_PX: f64 = 60.0;

fn main() {
    env_logger::init();

    let origin = GeoPosition {
        latitude: 37.7749,
        longitude: -122.4194,
        accuracy_m: 5.0,
    };

    let (mut engine, cues) = ProximityEngine::new(TRACKING_RADIUS_M, LOCK_RADIUS_M);
    engine.set_pins(demo_pin_field(&origin));

    let walker = DummyWalker::builder()
        .origin(origin)
        .speed(3.0)
        .heading(0.0)
        .jitter(1.0)
        .build();
    let walker_mtx = Arc::new(Mutex::new(walker));
    let walker = walker_mtx.clone();

    let gui_walker_handle = walker_mtx.clone();
    let mut last_cue_hz: Option<f64> = None;

    let _ = engage_gui(
        Box::new(move || {
            engine.drain_positions(&mut *gui_walker_handle.lock().unwrap());
            while let Ok(cue) = cues.try_recv() {
                last_cue_hz = Some(cue.frequency_hz);
            }

            let locked_id = engine.lock_state().locked_pin_id().map(str::to_owned);
            let mut tracked = vec![];
            let mut locked = vec![];
            for record in engine.tracked_records() {
                let (x, y) = map_for_radar(record, RADAR_RADIUS_PX, TRACKING_RADIUS_M);
                // Chart y grows upward, screen y grows downward
                let blip = (x, -y);
                if locked_id.as_deref() == Some(record.pin.id.as_str()) {
                    locked.push(blip);
                } else {
                    tracked.push(blip);
                }
            }

            let status = match engine.lock_state() {
                LockState::Locked { pin, distance_m } => match last_cue_hz {
                    Some(hz) => {
                        format!("SIGNAL LOCKED \"{}\" {:.1}m ({:.0} Hz)", pin.title, distance_m, hz)
                    }
                    None => format!("SIGNAL LOCKED \"{}\" {:.1}m", pin.title, distance_m),
                },
                LockState::Unlocked => {
                    format!("SCANNING ({} tracked)", engine.tracked_records().len())
                }
            };

            RadarFrame {
                tracked,
                locked,
                status,
            }
        }),
        RADAR_RADIUS_PX * 1.25,
    );

    walker.lock().unwrap().stop();
}

/// A ring of pins around the origin plus one close by, so a fresh run
/// shows tracking immediately and locks within a few seconds of walking.
fn demo_pin_field(origin: &GeoPosition) -> Vec<Pin> {
    let ring_count = 8;
    let mut pins: Vec<Pin> = (0..ring_count)
        .map(|i| {
            let heading_deg = (i as f64 / ring_count as f64) * 360.0;
            let spot = step_position(origin, heading_deg, 120.0);
            demo_pin(&format!("ring-{}", i), &format!("Echo {}", i), spot)
        })
        .collect();
    pins.push(demo_pin(
        "near-0",
        "First Catch",
        step_position(origin, 0.0, 25.0),
    ));
    pins
}

fn demo_pin(id: &str, title: &str, spot: GeoPosition) -> Pin {
    Pin {
        id: id.to_owned(),
        title: title.to_owned(),
        creator: "monitor".to_owned(),
        latitude: spot.latitude,
        longitude: spot.longitude,
        created_at_ms: now_ms(),
        audio_ref: format!("demo/{}.webm", id),
        visual_ref: None,
    }
}
