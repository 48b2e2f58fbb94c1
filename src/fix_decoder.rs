//! Decoder for recorded location traces.
//!
//! A trace is a plain text file with one fix sentence per line:
//!
//! ```text
//! $FIX,37.774900,-122.419400,5.0
//! ```
//!
//! latitude, longitude (degrees), then reported accuracy (meters). The
//! replay path feeds each parsed sentence to the engine as if a live
//! provider had pushed it; unparseable lines are skipped with a warning,
//! never fatal.

use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::map,
    error::Error,
    number::complete::double,
    sequence::{preceded, tuple},
    Finish, IResult,
};

use crate::geo::GeoPosition;
use std::str::FromStr;

/// One parsed `$FIX` sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct FixSentence {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Reported accuracy in meters.
    pub accuracy_m: f64,
}

fn parse_fix(s: &str) -> IResult<&str, FixSentence> {
    map(
        tuple((
            preceded(tag("$FIX"), preceded(char(','), double)),
            preceded(char(','), double),
            preceded(char(','), double),
        )),
        |(latitude, longitude, accuracy_m)| FixSentence {
            latitude,
            longitude,
            accuracy_m,
        },
    )(s)
}

impl FromStr for FixSentence {
    type Err = Error<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_fix(s.trim_end()).finish() {
            Ok((_remaining, fix)) => Ok(fix),
            Err(Error { input, code }) => Err(Error {
                input: input.to_string(),
                code,
            }),
        }
    }
}

impl From<FixSentence> for GeoPosition {
    fn from(fix: FixSentence) -> Self {
        GeoPosition {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy_m: fix.accuracy_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_sentence() {
        let s = "$FIX,37.774900,-122.419400,5.0";

        let (leftover, fix) = parse_fix(s).unwrap();

        assert_eq!(leftover, "");
        assert_eq!(
            fix,
            FixSentence {
                latitude: 37.7749,
                longitude: -122.4194,
                accuracy_m: 5.0,
            }
        );
    }

    #[test]
    fn parses_negative_and_integer_fields() {
        let s = "$FIX,-33.86,151.21,12";

        let (leftover, fix) = parse_fix(s).unwrap();

        assert_eq!(leftover, "");
        assert_eq!(
            fix,
            FixSentence {
                latitude: -33.86,
                longitude: 151.21,
                accuracy_m: 12.0,
            }
        );
    }

    #[test]
    fn from_str_tolerates_a_trailing_newline() {
        let fix = FixSentence::from_str("$FIX,0.5,0.25,8.0\r\n").unwrap();
        assert_eq!(fix.latitude, 0.5);
        assert_eq!(fix.longitude, 0.25);
        assert_eq!(fix.accuracy_m, 8.0);
    }

    #[test]
    fn rejects_garbage() {
        // Often happens at the beginning of a capture when the recorder
        // still has stale lines buffered
        assert!(FixSentence::from_str("$GPGGA,123519,4807.038,N").is_err());
        assert!(FixSentence::from_str("$FIX,only-two,1.0").is_err());
        assert!(FixSentence::from_str("").is_err());
    }

    #[test]
    fn converts_into_a_position() {
        let fix = FixSentence::from_str("$FIX,1.0,2.0,3.0").unwrap();
        let position: GeoPosition = fix.into();
        assert_eq!(position.latitude, 1.0);
        assert_eq!(position.longitude, 2.0);
        assert_eq!(position.accuracy_m, 3.0);
    }
}
