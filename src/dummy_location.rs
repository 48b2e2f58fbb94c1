//! A simulated pedestrian for exercising the engine without any GPS
//! hardware.
//!
//! [`DummyWalker`] runs a background thread that advances a position along a
//! compass heading at walking speed, sprinkles in GPS-style jitter, and
//! buffers the resulting fixes. The owning side drains them through the
//! [`LocationSource`] iterator and can steer the walk over a signal channel
//! while it runs.

use crate::geo::{GeoPosition, METERS_PER_DEGREE};
use crate::location::LocationSource;
use rand::prelude::*;
use std::collections::VecDeque;
use std::f64::consts::PI;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A [`LocationSource`] fed by a background thread that simulates a walk.
pub struct DummyWalker {
    handle: Option<thread::JoinHandle<()>>,
    tx: mpsc::Sender<Signal>,
    fixes: Arc<Mutex<VecDeque<GeoPosition>>>,
}

enum Signal {
    Speed(f64),
    Heading(f64),
    Jitter(f64),
    Stop,
}

/// Configures and spawns a [`DummyWalker`].
#[derive(Debug, Clone)]
pub struct DummyWalkerBuilder {
    origin: GeoPosition,
    speed_mps: f64,
    heading_deg: f64,
    jitter_m: f64,
    update_hz: f64,
}

impl Default for DummyWalkerBuilder {
    fn default() -> Self {
        Self {
            origin: GeoPosition {
                latitude: 37.7749,
                longitude: -122.4194,
                accuracy_m: 5.0,
            },
            speed_mps: 1.4,
            heading_deg: 0.0,
            jitter_m: 0.0,
            update_hz: 2.0,
        }
    }
}

impl DummyWalkerBuilder {
    /// Sets the walk's starting position.
    pub fn origin(mut self, origin: GeoPosition) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the walking speed in meters per second.
    pub fn speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = speed_mps;
        self
    }

    /// Sets the compass heading of the walk in degrees.
    pub fn heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = heading_deg;
        self
    }

    /// Sets the per-fix position jitter in meters.
    pub fn jitter(mut self, jitter_m: f64) -> Self {
        self.jitter_m = jitter_m;
        self
    }

    /// Sets how many fixes are produced per second.
    pub fn update_hz(mut self, update_hz: f64) -> Self {
        self.update_hz = update_hz;
        self
    }

    /// Spawns the walker thread and returns its handle.
    pub fn build(self) -> DummyWalker {
        let (tx, rx) = mpsc::channel::<Signal>();
        let fixes = Arc::new(Mutex::new(VecDeque::new()));
        let th_fixes = Arc::clone(&fixes);

        let period = Duration::from_secs_f64(1.0 / self.update_hz);
        let handle = thread::spawn(move || {
            let mut rng = thread_rng();
            let mut running = true;
            let mut position = self.origin;
            let mut speed_mps = self.speed_mps;
            let mut heading_deg = self.heading_deg;
            let mut jitter_m = self.jitter_m;
            while running {
                while let Ok(received) = rx.try_recv() {
                    match received {
                        Signal::Speed(new_speed) => speed_mps = new_speed,
                        Signal::Heading(new_heading) => heading_deg = new_heading,
                        Signal::Jitter(new_jitter) => jitter_m = new_jitter,
                        Signal::Stop => running = false,
                    }
                }
                position = step_position(&position, heading_deg, speed_mps * period.as_secs_f64());
                let fix = if jitter_m > 0.0 {
                    let wobble_heading = rng.gen_range(0.0..360.0);
                    let wobble = rng.gen_range(0.0..jitter_m);
                    let mut jittered = step_position(&position, wobble_heading, wobble);
                    jittered.accuracy_m = 5.0 + jitter_m;
                    jittered
                } else {
                    position
                };
                th_fixes.lock().unwrap().push_back(fix);
                spin_sleep::sleep(period);
            }
        });

        DummyWalker {
            handle: Some(handle),
            tx,
            fixes,
        }
    }
}

impl DummyWalker {
    /// Starts configuring a walker.
    pub fn builder() -> DummyWalkerBuilder {
        DummyWalkerBuilder::default()
    }

    /// Changes the walking speed mid-walk.
    pub fn set_speed(&self, speed_mps: f64) {
        self.tx.send(Signal::Speed(speed_mps)).unwrap();
    }

    /// Changes the heading mid-walk.
    pub fn set_heading(&self, heading_deg: f64) {
        self.tx.send(Signal::Heading(heading_deg)).unwrap();
    }

    /// Changes the jitter mid-walk.
    pub fn set_jitter(&self, jitter_m: f64) {
        self.tx.send(Signal::Jitter(jitter_m)).unwrap();
    }

    /// Stops the walker thread and waits for it to finish.
    pub fn stop(&mut self) {
        let _ = self.tx.send(Signal::Stop);
        // `.take()` moves the JoinHandle out of the struct so we can call
        // `.join()` on it here, leaving `None` behind.
        if let Some(thread) = self.handle.take() {
            thread.join().unwrap();
        }
    }
}

impl Iterator for DummyWalker {
    type Item = GeoPosition;
    fn next(&mut self) -> Option<Self::Item> {
        self.fixes.lock().unwrap().pop_front()
    }
}

impl LocationSource for DummyWalker {
    fn clear(&mut self) {
        self.fixes.lock().unwrap().clear();
    }
}

/// Advances `position` by `meters` along compass `heading_deg`. The inverse
/// of the local-offset conversion: east displacement divides back out the
/// cos(latitude) factor.
pub fn step_position(position: &GeoPosition, heading_deg: f64, meters: f64) -> GeoPosition {
    let heading = heading_deg * PI / 180.0;
    let dy_m = heading.cos() * meters;
    let dx_m = heading.sin() * meters;
    GeoPosition {
        latitude: position.latitude + dy_m / METERS_PER_DEGREE,
        longitude: position.longitude
            + dx_m / (METERS_PER_DEGREE * (position.latitude * PI / 180.0).cos()),
        accuracy_m: position.accuracy_m,
    }
}
