//! Headless EchoSpray driver: runs the proximity engine against a simulated
//! walk or a recorded trace, logging lock transitions and rendering alert
//! cues to the log or a WAV file.

use clap::Parser;
use echospray::{
    args::{FeedCommand, ReplayCommand, SimulateCommand, SprayArgs},
    dummy_location::DummyWalker,
    engine::ProximityEngine,
    fix_decoder::FixSentence,
    geo::GeoPosition,
    pin::{PinStore, RonPinStore},
    proximity::LockState,
    tone::{LogSink, ToneSink, WavSink, CUE_DURATION_MS},
};

use log::{info, warn};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    str::FromStr,
    sync::mpsc::Receiver,
    time::Duration,
};

// Example:
// cargo run --bin echospray --
//                           --pins     pins.ron
//                           --out      approach.wav simulate
//                           --lat      37.7749
//                           --lon      -122.4194
//                           --speed    1.4
//                           --duration 120

fn main() {
    env_logger::init();
    let args = SprayArgs::parse();

    let mut store = RonPinStore::new(&args.pin_file);
    store
        .seed_if_empty()
        .expect("Failed to seed the pin field");
    let pins = store.list_pins().expect("Failed to read the pin field");
    info!("loaded {} pin(s) from {}", pins.len(), args.pin_file);

    let (mut engine, cues) = ProximityEngine::new(args.tracking_radius_m, args.lock_radius_m);
    engine.set_pins(pins);

    let mut sink: Box<dyn ToneSink> = match &args.outfile {
        Some(path) => Box::new(WavSink::create(path).expect("Failed to create cue WAV file")),
        None => Box::new(LogSink),
    };

    match args.feed {
        FeedCommand::Simulate(cmd) => run_simulated(&mut engine, &cues, sink.as_mut(), cmd),
        FeedCommand::Replay(cmd) => run_replay(&mut engine, &cues, sink.as_mut(), cmd),
    }

    engine.stop();
}

/// Drives the engine from a [`DummyWalker`] for the requested duration,
/// polling at the walker's own update cadence.
fn run_simulated(
    engine: &mut ProximityEngine,
    cues: &Receiver<echospray::alert::AlertCue>,
    sink: &mut dyn ToneSink,
    cmd: SimulateCommand,
) {
    const TICK_HZ: f64 = 4.0;

    let mut walker = DummyWalker::builder()
        .origin(GeoPosition {
            latitude: cmd.latitude,
            longitude: cmd.longitude,
            accuracy_m: 5.0,
        })
        .speed(cmd.speed_mps)
        .heading(cmd.heading_deg)
        .jitter(cmd.jitter_m)
        .build();

    let tick = Duration::from_secs_f64(1.0 / TICK_HZ);
    let ticks = (cmd.duration_s * TICK_HZ).ceil() as u64;
    let mut last_lock = LockState::Unlocked;

    for _ in 0..ticks {
        spin_sleep::sleep(tick);
        engine.drain_positions(&mut walker);
        drain_cues(cues, sink);
        report_transition(engine.lock_state(), &mut last_lock);
    }

    walker.stop();
}

/// Replays `$FIX` sentences from a file or stdin, dwelling on each fix so
/// the alert timer gets a chance to tick between positions.
fn run_replay(
    engine: &mut ProximityEngine,
    cues: &Receiver<echospray::alert::AlertCue>,
    sink: &mut dyn ToneSink,
    cmd: ReplayCommand,
) {
    let reader: Box<dyn BufRead> = if cmd.fix_file == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(
            File::open(&cmd.fix_file).expect("Failed to open the trace file"),
        ))
    };

    let dwell = Duration::from_secs_f64(cmd.tick_s);
    let mut last_lock = LockState::Unlocked;

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!("trace read failed: {}", error);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match FixSentence::from_str(&line) {
            Ok(fix) => engine.update_position(fix.into()),
            Err(error) => {
                warn!("was unable to parse fix sentence: {}", error);
                continue;
            }
        }
        report_transition(engine.lock_state(), &mut last_lock);
        spin_sleep::sleep(dwell);
        drain_cues(cues, sink);
    }
}

fn drain_cues(cues: &Receiver<echospray::alert::AlertCue>, sink: &mut dyn ToneSink) {
    while let Ok(cue) = cues.try_recv() {
        sink.emit_tone(cue.frequency_hz, CUE_DURATION_MS);
    }
}

fn report_transition(lock: &LockState, last: &mut LockState) {
    // Distance wobbles every fix; only the target identity is worth a line
    if lock.locked_pin_id() != last.locked_pin_id() {
        match lock {
            LockState::Locked { pin, distance_m } => {
                info!("CAPTURE ZONE: \"{}\" at {:.1} m", pin.title, distance_m);
            }
            LockState::Unlocked => info!("scanning"),
        }
        *last = lock.clone();
    }
}
