//! The adaptive sonar alert: while a pin is locked, a short tone repeats,
//! faster and higher-pitched the closer you get.
//!
//! The cadence and pitch are pure functions of the locked distance
//! ([`ping_interval_ms`], [`tone_frequency_hz`]) so they can never drift.
//! The repeating timer lives on its own thread behind a signal channel, the
//! same shape as the simulated walker: the owning [`AlertScheduler`] sends
//! [re]arm and disarm signals, and the thread is the only place a timer
//! exists, so two timers for different targets can never overlap.

use crate::proximity::LockState;
use log::{debug, info};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

/// Fastest allowed cadence, in milliseconds. Keeps a point-blank target
/// from flooding the playback collaborator.
pub const MIN_INTERVAL_MS: u64 = 150;

/// Slowest allowed cadence, in milliseconds. Keeps the cue audible right at
/// the lock boundary.
pub const MAX_INTERVAL_MS: u64 = 1000;

/// Lowest tone the cue will reach, in hertz.
pub const MIN_TONE_HZ: f64 = 440.0;

/// Time between cues for a locked target `distance_m` meters away.
/// 10 m maps to the 1000 ms ceiling, 1.5 m and below to the 150 ms floor.
pub fn ping_interval_ms(distance_m: f64) -> u64 {
    // Round rather than truncate: 5.6 * 100.0 is 559.999... in binary
    (distance_m * 100.0)
        .clamp(MIN_INTERVAL_MS as f64, MAX_INTERVAL_MS as f64)
        .round() as u64
}

/// Cue pitch for a locked target `distance_m` meters away. Rises from the
/// 440 Hz floor as the target gets closer, up to 1200 Hz at zero distance.
pub fn tone_frequency_hz(distance_m: f64) -> f64 {
    (1200.0 - distance_m * 60.0).max(MIN_TONE_HZ)
}

/// One emitted alert cue. The playback collaborator turns this into a short
/// fixed-envelope tone; the scheduler never queues or retries them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertCue {
    /// Tone pitch in hertz.
    pub frequency_hz: f64,
}

enum Signal {
    Arm { interval_ms: u64, frequency_hz: f64 },
    Disarm,
    Stop,
}

/// Owns the repeating alert timer for the current lock session.
///
/// Feed it every freshly resolved [`LockState`] through [`sync`]; it arms,
/// retimes, and disarms the timer to match. Cues arrive on the channel the
/// scheduler was built with. Dropping the scheduler stops the timer thread,
/// so a cue can never outlive its engine.
///
/// [`sync`]: AlertScheduler::sync
pub struct AlertScheduler {
    handle: Option<thread::JoinHandle<()>>,
    tx: Sender<Signal>,
    // Identity of the armed session: locked pin id and its distance. The
    // timer is rearmed only when one of these actually changes.
    armed: Option<(String, f64)>,
}

impl AlertScheduler {
    /// Spawns the timer thread. Emitted cues are sent to `cues`.
    pub fn new(cues: Sender<AlertCue>) -> Self {
        let (tx, rx) = mpsc::channel::<Signal>();
        let handle = thread::spawn(move || run_timer(rx, cues));
        AlertScheduler {
            handle: Some(handle),
            tx,
            armed: None,
        }
    }

    /// Reconciles the timer with a freshly resolved lock state.
    ///
    /// The previous timer is always replaced before a new one starts: the
    /// timer thread holds exactly one cadence, and an arm signal overwrites
    /// it in the same loop iteration that would have fired it.
    pub fn sync(&mut self, lock: &LockState) {
        match lock {
            LockState::Locked { pin, distance_m } => {
                let session = (pin.id.clone(), *distance_m);
                if self.armed.as_ref() == Some(&session) {
                    return;
                }
                match &self.armed {
                    Some((prev_id, _)) if *prev_id != pin.id => {
                        info!("lock target changed {} -> {}", prev_id, pin.id);
                    }
                    None => info!("lock acquired on {} at {:.1} m", pin.id, distance_m),
                    _ => debug!("lock on {} retimed at {:.1} m", pin.id, distance_m),
                }
                let interval_ms = ping_interval_ms(*distance_m);
                let frequency_hz = tone_frequency_hz(*distance_m);
                self.armed = Some(session);
                // A send can only fail once stop() has run; cues are moot
                // by then
                let _ = self.tx.send(Signal::Arm {
                    interval_ms,
                    frequency_hz,
                });
            }
            LockState::Unlocked => {
                if self.armed.take().is_some() {
                    info!("lock released");
                    let _ = self.tx.send(Signal::Disarm);
                }
            }
        }
    }

    /// Stops the timer thread and waits for it to finish.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.tx.send(Signal::Stop);
            handle.join().unwrap();
        }
    }
}

impl Drop for AlertScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.tx.send(Signal::Stop);
            let _ = handle.join();
        }
    }
}

fn run_timer(rx: Receiver<Signal>, cues: Sender<AlertCue>) {
    let mut cadence: Option<(Duration, f64)> = None;
    loop {
        match cadence {
            // Idle: nothing to time, just wait for the next signal
            None => match rx.recv() {
                Ok(Signal::Arm {
                    interval_ms,
                    frequency_hz,
                }) => {
                    cadence = Some((Duration::from_millis(interval_ms), frequency_hz));
                }
                Ok(Signal::Disarm) => {}
                Ok(Signal::Stop) | Err(_) => return,
            },
            // Active: sleep one interval, but let any signal cut the sleep
            // short. A timeout is the tick; anything else reshapes or ends
            // the session before another cue can fire.
            Some((interval, frequency_hz)) => match rx.recv_timeout(interval) {
                Ok(Signal::Arm {
                    interval_ms,
                    frequency_hz,
                }) => {
                    cadence = Some((Duration::from_millis(interval_ms), frequency_hz));
                }
                Ok(Signal::Disarm) => cadence = None,
                Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => return,
                Err(RecvTimeoutError::Timeout) => {
                    // Fire-and-forget: if the consumer is gone the cue is
                    // dropped, not retried
                    let _ = cues.send(AlertCue { frequency_hz });
                }
            },
        }
    }
}
