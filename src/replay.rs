//! Parser for recorded sensor tracks.
//!
//! One reading per line, fixes and headings interleaved in the order they
//! were received:
//!
//! ```text
//! FIX,51.500700,-0.124600,1.35,1564480000.25
//! HDG,271.5
//! ```
//!
//! Fix fields are latitude, longitude, speed (m/s, negative when unknown)
//! and a unix timestamp in seconds. Blank lines and lines starting with `#`
//! are ignored.

use crate::error::FileError;
use crate::geometry::Coordinate;
use crate::session::{Fix, SessionInput};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, space0},
    combinator::{all_consuming, map},
    number::complete::double,
    sequence::{delimited, preceded, tuple},
    Finish, IResult,
};

/// One line of a recorded track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackEntry {
    Fix(Fix),
    Heading(f64),
}

impl TrackEntry {
    /// When the reading was taken, for fixes.
    pub fn timestamp(&self) -> Option<f64> {
        match self {
            TrackEntry::Fix(fix) => Some(fix.timestamp),
            TrackEntry::Heading(_) => None,
        }
    }
}

impl From<TrackEntry> for SessionInput {
    fn from(entry: TrackEntry) -> Self {
        match entry {
            TrackEntry::Fix(fix) => SessionInput::Fix(fix),
            TrackEntry::Heading(deg) => SessionInput::Heading(deg),
        }
    }
}

fn field(s: &str) -> IResult<&str, f64> {
    preceded(delimited(space0, char(','), space0), double)(s)
}

fn parse_fix(s: &str) -> IResult<&str, TrackEntry> {
    map(
        preceded(tag("FIX"), tuple((field, field, field, field))),
        |(lat, lon, speed, timestamp)| {
            TrackEntry::Fix(Fix {
                coordinate: Coordinate::new(lat, lon),
                speed,
                timestamp,
            })
        },
    )(s)
}

fn parse_heading(s: &str) -> IResult<&str, TrackEntry> {
    map(preceded(tag("HDG"), field), TrackEntry::Heading)(s)
}

fn parse_entry(s: &str) -> IResult<&str, TrackEntry> {
    all_consuming(delimited(space0, alt((parse_fix, parse_heading)), space0))(s)
}

impl std::str::FromStr for TrackEntry {
    type Err = nom::error::Error<String>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_entry(s).finish() {
            Ok((_remaining, entry)) => Ok(entry),
            Err(nom::error::Error { input, code }) => Err(nom::error::Error {
                input: input.to_string(),
                code,
            }),
        }
    }
}

/// Parses a whole track, reporting the first bad line.
pub fn parse_track(text: &str) -> Result<Vec<TrackEntry>, FileError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            line.parse::<TrackEntry>().map_err(|e| FileError::Parse {
                line: i + 1,
                reason: format!("{:?} at {:?}", e.code, e.input),
            })
        })
        .collect()
}
