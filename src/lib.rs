//! EchoSpray is the engine behind an audio-graffiti scavenger hunt: people
//! leave geotagged audio pins around a city, and other people find them by
//! physically walking toward them. As a user closes in on a pin, the engine
//! resolves live position fixes against the pin field, locks the closest
//! pin inside the capture radius, and drives an escalating sonar cue that
//! pings faster and higher-pitched the nearer the target gets. It also
//! hands the presentation layer everything it needs to draw the radar and
//! camera-overlay views.
//!
//! The engine only consumes positions and pins and emits proximity, cue,
//! and screen-space results. Capturing audio, generating artwork, and
//! drawing pixels belong to external collaborators; the binaries in this
//! crate stand in for them with a simulated walker, a trace replayer, a
//! terminal radar, and a WAV cue renderer.

#![warn(missing_docs)]
#[allow(missing_docs)]
pub mod args;
pub mod alert;
pub mod dummy_location;
pub mod engine;
pub mod fix_decoder;
pub mod geo;
pub mod location;
pub mod pin;
pub mod proximity;
pub mod screen;
pub mod tone;
