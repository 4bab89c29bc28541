//! A [SampleSink] that writes one RON-encoded [SampleRow] per line, plus a
//! helper to dump the planned route next to it.
//!
//! A motion log looks like:
//!
//! ```text
//! (timestamp:1564480000.0,longitude:-0.1246,latitude:51.5007,speed:1.2,avg_speed:1.1)
//! (timestamp:1564480001.0,longitude:-0.1245,latitude:51.5008,speed:1.4,avg_speed:1.2)
//! ```

use crate::error::{FileError, NavError};
use crate::geometry::Coordinate;
use crate::sample_aggregator::{SampleRow, SampleSink};

use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

/// Line-oriented writer for recorded samples. Each row is flushed as it is
/// written, so a crash loses at most the row in flight.
pub struct RonTrackLog<W: Write> {
    out: W,
    rows: usize,
}

impl RonTrackLog<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RonTrackLog<W> {
    pub fn new(out: W) -> Self {
        Self { out, rows: 0 }
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_row(&mut self, row: &SampleRow) -> Result<(), FileError> {
        let line = ron::ser::to_string(row)?;
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.rows += 1;
        Ok(())
    }
}

impl<W: Write> SampleSink for RonTrackLog<W> {
    fn append_sample(&mut self, row: &SampleRow) -> Result<(), NavError> {
        self.write_row(row).map_err(|e| NavError::Sink(e.to_string()))
    }
}

/// Reads rows written by [RonTrackLog]. Blank lines are skipped.
pub fn read_rows(input: impl Read) -> Result<Vec<SampleRow>, FileError> {
    BufReader::new(input)
        .lines()
        .enumerate()
        .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|(i, line)| {
            let line = line?;
            ron::from_str(&line).map_err(|e| FileError::Parse {
                line: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// A waypoint with its position in the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub id: usize,
    pub longitude: f64,
    pub latitude: f64,
}

/// Writes the planned route as an indexed RON list.
pub fn write_route(out: &mut impl Write, waypoints: &[Coordinate]) -> Result<(), FileError> {
    let points: Vec<RoutePoint> = waypoints
        .iter()
        .enumerate()
        .map(|(id, c)| RoutePoint {
            id,
            longitude: c.lon,
            latitude: c.lat,
        })
        .collect();
    let text = ron::ser::to_string_pretty(&points, ron::ser::PrettyConfig::default())?;
    out.write_all(text.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Reads a route file: a RON list of `(lat: .., lon: ..)` coordinates.
pub fn load_route(path: impl AsRef<Path>) -> Result<Vec<Coordinate>, FileError> {
    let text = std::fs::read_to_string(path)?;
    Ok(ron::from_str(&text)?)
}
