//! CSV reading and writing of session datasets.
//!
//! Column layout: `user_id,session_ts,group,propensity,charged_in_low,energy_kwh`.
//! Timestamps are written as `YYYY-MM-DDTHH:MM:SS`; on read a space
//! separator and `True`/`False`/`1`/`0` booleans are accepted too.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::sim::types::{Group, Session};

/// Column header of the session dataset.
pub const HEADER: &str = "user_id,session_ts,group,propensity,charged_in_low,energy_kwh";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Raw CSV row before validation.
#[derive(Debug, Deserialize)]
struct SessionRecord {
    user_id: u64,
    session_ts: String,
    group: String,
    propensity: f64,
    charged_in_low: String,
    energy_kwh: f64,
}

impl SessionRecord {
    fn into_session(self, line: usize) -> Result<Session> {
        let malformed = |what: String| Error::InvalidInput(format!("line {line}: {what}"));

        let group: Group = self.group.parse().map_err(malformed)?;
        let session_ts = parse_timestamp(&self.session_ts)
            .ok_or_else(|| malformed(format!("unparseable session_ts \"{}\"", self.session_ts)))?;
        let charged_in_low = parse_bool(&self.charged_in_low).ok_or_else(|| {
            malformed(format!(
                "charged_in_low must be a boolean, got \"{}\"",
                self.charged_in_low
            ))
        })?;

        Ok(Session {
            user_id: self.user_id,
            session_ts,
            group,
            propensity: self.propensity,
            charged_in_low,
            energy_kwh: self.energy_kwh,
        })
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "True" | "TRUE" | "1" => Some(true),
        "false" | "False" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// Writes sessions as CSV to any writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_sessions(sessions: &[Session], writer: impl Write) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if sessions.is_empty() {
        wtr.write_record(HEADER.split(','))?;
    }
    for s in sessions {
        wtr.serialize(s)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes sessions to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_sessions(sessions: &[Session], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_sessions(sessions, io::BufWriter::new(file))?;
    info!(path = %path.display(), sessions = sessions.len(), "dataset written");
    Ok(())
}

/// Parses sessions from CSV.
///
/// # Errors
///
/// Returns `Csv` for structurally broken rows and `InvalidInput` for rows
/// with an unknown group, timestamp, or boolean.
pub fn read_sessions(reader: impl Read) -> Result<Vec<Session>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut sessions = Vec::new();
    for (i, record) in rdr.deserialize::<SessionRecord>().enumerate() {
        // line 1 is the header
        sessions.push(record?.into_session(i + 2)?);
    }
    Ok(sessions)
}

/// Loads sessions from the CSV file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or any row is malformed.
pub fn load_sessions(path: &Path) -> Result<Vec<Session>> {
    let file = File::open(path)?;
    let sessions = read_sessions(io::BufReader::new(file))?;
    info!(path = %path.display(), sessions = sessions.len(), "dataset loaded");
    Ok(sessions)
}
