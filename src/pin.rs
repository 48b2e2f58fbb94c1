//! The pin model and the persistence shim behind it.
//!
//! A [`Pin`] is a geotagged audio artifact: somebody stood somewhere, recorded
//! a clip, and left it hanging in the air for other people to walk into. The
//! engine treats pins as read-only inputs; everything that creates or stores
//! them lives behind the [`PinStore`] trait. The bundled implementation,
//! [`RonPinStore`], keeps the whole field in a single [ron] file:
//!
//! ```text
//! [(id:"a1",title:"Neon Echoes",creator:"Echo_Maker",...), ...]
//! ```

use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/// A geotagged audio artifact. The audio and artwork themselves live with
/// the content collaborators; a pin only carries opaque references to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Unique pin id. Also the identity used for lock comparisons and
    /// deterministic tie breaking, so ids must never repeat within a field.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Whoever sprayed it.
    pub creator: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Creation time, milliseconds since the unix epoch.
    pub created_at_ms: u64,
    /// Opaque reference to the recorded audio clip.
    pub audio_ref: String,
    /// Opaque reference to the generated cover art, if any.
    pub visual_ref: Option<String>,
}

/// Read/write access to a pin field. The engine only ever calls
/// [`PinStore::list_pins`]; the create path belongs to the recorder UI.
pub trait PinStore {
    /// Returns every pin in the field.
    fn list_pins(&self) -> Result<Vec<Pin>, PinStoreError>;

    /// Appends a pin to the field.
    fn add_pin(&mut self, pin: Pin) -> Result<(), PinStoreError>;

    /// Removes every pin from the field.
    fn clear(&mut self) -> Result<(), PinStoreError>;
}

/// A nice little error that we can return if things go wrong while reading
/// or writing a pin field.
#[derive(Debug)]
pub enum PinStoreError {
    /// Returned when io fails while reading or writing the field file.
    IoError(std::io::Error),

    /// Returned when serialization of the field fails.
    RonError(ron::Error),

    /// Returned when deserialization of the field fails.
    RonSpannedError(ron::de::SpannedError),
}

impl fmt::Display for PinStoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PinStoreError::IoError(error) => write!(f, "io error: {}", error),
            PinStoreError::RonError(error) => write!(f, "ron error: {}", error),
            PinStoreError::RonSpannedError(error) => write!(f, "ron spanning error: {}", error),
        }
    }
}

impl std::error::Error for PinStoreError {}

impl From<std::io::Error> for PinStoreError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}

impl From<ron::Error> for PinStoreError {
    fn from(value: ron::Error) -> Self {
        Self::RonError(value)
    }
}

impl From<ron::de::SpannedError> for PinStoreError {
    fn from(value: ron::de::SpannedError) -> Self {
        Self::RonSpannedError(value)
    }
}

/// A [`PinStore`] backed by a single ron file on disk. A missing file reads
/// as an empty field, so a fresh install works without any setup step.
#[derive(Debug, Clone)]
pub struct RonPinStore {
    path: PathBuf,
}

impl RonPinStore {
    /// Opens a store at `path`. The file is not touched until the first
    /// write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Writes a single demo pin into an empty field, so first-run users have
    /// something to walk toward.
    pub fn seed_if_empty(&mut self) -> Result<(), PinStoreError> {
        if self.list_pins()?.is_empty() {
            self.add_pin(demo_pin())?;
        }
        Ok(())
    }

    fn write_all(&self, pins: &[Pin]) -> Result<(), PinStoreError> {
        let encoded = ron::ser::to_string(&pins)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }
}

impl PinStore for RonPinStore {
    fn list_pins(&self) -> Result<Vec<Pin>, PinStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };
        Ok(ron::de::from_str(&raw)?)
    }

    fn add_pin(&mut self, pin: Pin) -> Result<(), PinStoreError> {
        let mut pins = self.list_pins()?;
        pins.push(pin);
        self.write_all(&pins)
    }

    fn clear(&mut self) -> Result<(), PinStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// The pin a fresh field is seeded with.
fn demo_pin() -> Pin {
    Pin {
        id: "seed-1".to_owned(),
        title: "Neon Echoes".to_owned(),
        creator: "Echo_Maker".to_owned(),
        latitude: 37.7749,
        longitude: -122.4194,
        created_at_ms: now_ms(),
        audio_ref: "seed/neon-echoes.webm".to_owned(),
        visual_ref: None,
    }
}

/// Milliseconds since the unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_pin(id: &str, latitude: f64, longitude: f64) -> Pin {
        Pin {
            id: id.to_owned(),
            title: format!("pin {}", id),
            creator: "tester".to_owned(),
            latitude,
            longitude,
            created_at_ms: 1_700_000_000_000,
            audio_ref: format!("audio/{}.webm", id),
            visual_ref: None,
        }
    }

    #[test]
    fn missing_file_reads_as_empty_field() {
        let dir = tempdir().unwrap();
        let store = RonPinStore::new(dir.path().join("pins.ron"));
        assert!(store.list_pins().unwrap().is_empty());
    }

    #[test]
    fn pins_round_trip_through_the_file() {
        let dir = tempdir().unwrap();
        let mut store = RonPinStore::new(dir.path().join("pins.ron"));

        store.add_pin(test_pin("a", 37.0, -122.0)).unwrap();
        store.add_pin(test_pin("b", 37.001, -122.001)).unwrap();

        let pins = store.list_pins().unwrap();
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[0], test_pin("a", 37.0, -122.0));
        assert_eq!(pins[1].id, "b");
    }

    #[test]
    fn seeding_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = RonPinStore::new(dir.path().join("pins.ron"));

        store.seed_if_empty().unwrap();
        store.seed_if_empty().unwrap();
        assert_eq!(store.list_pins().unwrap().len(), 1);

        // A non-empty field is left alone
        store.add_pin(test_pin("a", 37.0, -122.0)).unwrap();
        store.seed_if_empty().unwrap();
        assert_eq!(store.list_pins().unwrap().len(), 2);
    }

    #[test]
    fn clear_empties_the_field() {
        let dir = tempdir().unwrap();
        let mut store = RonPinStore::new(dir.path().join("pins.ron"));

        store.add_pin(test_pin("a", 37.0, -122.0)).unwrap();
        store.clear().unwrap();
        assert!(store.list_pins().unwrap().is_empty());

        // Clearing an already-missing file is fine too
        store.clear().unwrap();
    }
}
