//! This module reads and writes trace files, the record of one tracing
//! trial. A trace file is plain comma-delimited text with a header line
//! followed by one line per sample:
//!
//! ```text
//! x,y,timestamp,encoder_1_deg,encoder_2_deg
//! 412,398,16,12.5,47.25
//! 415,401,33,,
//! ```
//!
//! Where:
//!
//! - `x` and `y` are the pointer position in window pixels
//! - `timestamp` is milliseconds since recording started
//! - the encoder columns are the most recent joint angles in degrees, left
//!   empty if no reading had arrived yet
//!
//! Files are written once, at the end of a trial, and named
//! `trial_<N>_<YYYYmmdd-HHMMSS>.csv`. Readers look columns up by header name
//! and skip rows they cannot make sense of.

use chrono::{DateTime, Local};
use log::{debug, warn};
use nom::{
    bytes::complete::take_while, character::complete::char, multi::separated_list0, IResult,
};

use std::{
    borrow::Cow,
    fmt,
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{accuracy::compute_accuracy, encoder_message_decoder::EncoderReading, Point};

/// Column names, in the order they are written.
pub const HEADER: [&str; 5] = ["x", "y", "timestamp", "encoder_1_deg", "encoder_2_deg"];

/// One recorded sample of a trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSample {
    /// Pointer x position, in window pixels
    pub x: f64,
    /// Pointer y position, in window pixels
    pub y: f64,
    /// Milliseconds since recording started
    pub timestamp_ms: u64,
    /// Most recent encoder angles at the time of the sample, if any
    pub encoder: Option<EncoderReading>,
}

impl TraceSample {
    /// The pointer position of this sample.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The accuracy of one recorded trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialScore {
    /// Trial number, from the file name when possible
    pub trial: u32,
    /// Accuracy in percent
    pub accuracy: f64,
    /// The file the trial was read from
    pub path: PathBuf,
}

/// Things that can go wrong while reading or writing trace files.
#[derive(Debug)]
pub enum TraceFileError {
    /// Returned when the file has no header line at all.
    NoHeader,

    /// Returned when the header lacks a column we cannot do without.
    MissingColumn(&'static str),

    /// Returned when io fails when reading or writing files.
    IoError(io::Error),
}

impl fmt::Display for TraceFileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TraceFileError as TFE;
        let msg = match self {
            TFE::NoHeader => Cow::from("no header in trace file"),
            TFE::MissingColumn(name) => Cow::from(format!("missing column `{}`", name)),
            TFE::IoError(error) => Cow::from(format!("io error: {}", error)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for TraceFileError {}

impl From<io::Error> for TraceFileError {
    fn from(value: io::Error) -> Self {
        Self::IoError(value)
    }
}

fn parse_fields(s: &str) -> IResult<&str, Vec<&str>> {
    separated_list0(char(','), take_while(|c| c != ','))(s)
}

fn split_row(line: &str) -> Vec<&str> {
    match parse_fields(line.trim_end_matches(['\r', '\n'])) {
        Ok((_, fields)) => fields.into_iter().map(str::trim).collect(),
        Err(_) => Vec::new(),
    }
}

/// Where each column we care about lives in a row.
struct ColumnIndex {
    x: usize,
    y: usize,
    timestamp: Option<usize>,
    encoder_1: Option<usize>,
    encoder_2: Option<usize>,
}

impl ColumnIndex {
    fn from_header(header: &[&str]) -> Result<Self, TraceFileError> {
        let find = |name: &str| header.iter().position(|h| *h == name);
        Ok(Self {
            x: find(HEADER[0]).ok_or(TraceFileError::MissingColumn(HEADER[0]))?,
            y: find(HEADER[1]).ok_or(TraceFileError::MissingColumn(HEADER[1]))?,
            timestamp: find(HEADER[2]),
            encoder_1: find(HEADER[3]),
            encoder_2: find(HEADER[4]),
        })
    }

    fn sample(&self, fields: &[&str]) -> Option<TraceSample> {
        let number = |i: Option<usize>| -> Option<f64> {
            fields.get(i?).and_then(|f| f.parse::<f64>().ok())
        };

        let x = number(Some(self.x))?;
        let y = number(Some(self.y))?;
        let timestamp_ms = self
            .timestamp
            .and_then(|i| fields.get(i))
            .and_then(|f| f.parse::<u64>().ok())
            .unwrap_or(0);
        let encoder = match (number(self.encoder_1), number(self.encoder_2)) {
            (Some(encoder_1_deg), Some(encoder_2_deg)) => Some(EncoderReading {
                encoder_1_deg,
                encoder_2_deg,
            }),
            _ => None,
        };

        Some(TraceSample {
            x,
            y,
            timestamp_ms,
            encoder,
        })
    }
}

/// Write the header and `samples` to the [Write]able object provided.
pub fn write_trace(out: &mut impl Write, samples: &[TraceSample]) -> Result<(), TraceFileError> {
    writeln!(out, "{}", HEADER.join(","))?;
    for s in samples {
        let (e1, e2) = match s.encoder {
            Some(e) => (e.encoder_1_deg.to_string(), e.encoder_2_deg.to_string()),
            None => (String::new(), String::new()),
        };
        writeln!(out, "{},{},{},{},{}", s.x, s.y, s.timestamp_ms, e1, e2)?;
    }
    out.flush()?;
    Ok(())
}

/// Write a trace file to the path provided.
pub fn write_trace_path(
    path: impl AsRef<Path>,
    samples: &[TraceSample],
) -> Result<(), TraceFileError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_trace(&mut out, samples)
}

/// Read samples from the [BufRead]able object provided. Rows whose position
/// cannot be parsed are skipped.
pub fn read_trace(input: impl BufRead) -> Result<Vec<TraceSample>, TraceFileError> {
    let mut lines = input.lines();
    let header_line = lines.next().ok_or(TraceFileError::NoHeader)??;
    let index = ColumnIndex::from_header(&split_row(&header_line))?;

    let mut samples = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match index.sample(&split_row(&line)) {
            Some(sample) => samples.push(sample),
            None => warn!("Skipping malformed trace row: {:?}", line),
        }
    }
    Ok(samples)
}

/// Read a trace file from the path provided.
pub fn read_trace_path(path: impl AsRef<Path>) -> Result<Vec<TraceSample>, TraceFileError> {
    read_trace(BufReader::new(File::open(path)?))
}

/// The file name a trial recorded at `now` is saved under.
pub fn trial_file_name(trial: u32, now: DateTime<Local>) -> String {
    format!("trial_{}_{}.csv", trial, now.format("%Y%m%d-%H%M%S"))
}

/// Save a finished trial into `dir`, creating the directory if needed.
/// Returns the path of the new file.
pub fn save_trial(
    dir: impl AsRef<Path>,
    trial: u32,
    samples: &[TraceSample],
    now: DateTime<Local>,
) -> Result<PathBuf, TraceFileError> {
    fs::create_dir_all(dir.as_ref())?;
    let path = dir.as_ref().join(trial_file_name(trial, now));
    write_trace_path(&path, samples)?;
    debug!("Saved trial {} to {}", trial, path.display());
    Ok(path)
}

/// Whether a file name looks like a recorded trial.
pub fn is_trial_file(file_name: &str) -> bool {
    file_name.ends_with(".csv") && file_name.contains("trial_")
}

/// The trial number embedded in a file name, e.g. `7` for
/// `trial_7_20250425-005227.csv`.
pub fn trial_number(file_name: &str) -> Option<u32> {
    let (_, rest) = file_name.split_once("trial_")?;
    let (number, _) = rest.split_once('_')?;
    number.parse().ok()
}

/// Score every trial file in `dir` against `spiral`.
///
/// Files are visited in file name order. A file whose name carries no
/// trial number is numbered after the trials scored before it. The result
/// is ordered by trial number.
pub fn score_folder(
    dir: impl AsRef<Path>,
    spiral: &[Point],
    max_distance: f64,
) -> Result<Vec<TrialScore>, TraceFileError> {
    let mut names: Vec<String> = fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_trial_file(name))
        .collect();
    names.sort();

    let mut scores: Vec<TrialScore> = Vec::with_capacity(names.len());
    for name in names {
        let path = dir.as_ref().join(&name);
        let points: Vec<Point> = match read_trace_path(&path) {
            Ok(samples) => samples.iter().map(TraceSample::point).collect(),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                Vec::new()
            }
        };
        let accuracy = compute_accuracy(&points, spiral, max_distance);
        let trial = trial_number(&name).unwrap_or(scores.len() as u32 + 1);
        scores.push(TrialScore {
            trial,
            accuracy,
            path,
        });
    }

    scores.sort_by_key(|s| s.trial);
    Ok(scores)
}
