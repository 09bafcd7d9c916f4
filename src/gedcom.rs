/// Minimal GEDCOM line reader.
///
/// Turns a GEDCOM 5.x file into the record events the ingestor consumes.
/// Only level-0 `INDI`/`FAM` records and their level-1 `NAME`, `FAMC`,
/// `FAMS`, `HUSB`, `WIFE` and `CHIL` lines matter; everything else is
/// skipped.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::ingest::Event;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read line {line}: {source}")]
    Read { line: usize, source: std::io::Error },
}

/// One parsed GEDCOM line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    pub level: u32,
    pub xref: Option<&'a str>,
    pub tag: &'a str,
    pub value: &'a str,
}

/// Split `level [@xref@] tag [value]`. Returns `None` for malformed lines.
pub fn parse_line(raw: &str) -> Option<Line<'_>> {
    let raw = raw.trim_start_matches('\u{feff}').trim_start();
    let raw = raw.trim_end_matches(['\r', '\n']);

    let (level, rest) = raw.split_once(' ')?;
    let level = level.parse::<u32>().ok()?;
    let rest = rest.trim_start();

    let (xref, rest) = match rest.split_once(' ') {
        Some((first, tail)) if first.len() > 1 && first.starts_with('@') && first.ends_with('@') => {
            (Some(first), tail.trim_start())
        }
        _ => (None, rest),
    };

    let (tag, value) = match rest.split_once(' ') {
        Some((tag, value)) => (tag, value.trim_end()),
        None => (rest.trim_end(), ""),
    };
    if tag.is_empty() {
        return None;
    }

    Some(Line {
        level,
        xref,
        tag,
        value,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Record {
    Person,
    Family,
    Other,
}

/// Incremental converter from GEDCOM lines to events.
#[derive(Debug)]
pub struct EventReader {
    record: Record,
    events: Vec<Event>,
    skipped: usize,
}

impl Default for EventReader {
    fn default() -> Self {
        Self::new()
    }
}

impl EventReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            record: Record::Other,
            events: Vec::new(),
            skipped: 0,
        }
    }

    pub fn feed(&mut self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        let Some(line) = parse_line(raw) else {
            self.skipped += 1;
            debug!("skipping malformed line {raw:?}");
            return;
        };

        if line.level == 0 {
            self.close_record();
            self.record = match (line.tag, line.xref) {
                ("INDI", Some(xref)) => {
                    self.events.push(Event::PersonStart(xref.to_string()));
                    Record::Person
                }
                ("FAM", Some(xref)) => {
                    self.events.push(Event::FamilyStart(xref.to_string()));
                    Record::Family
                }
                _ => Record::Other,
            };
            return;
        }
        if line.level != 1 || line.value.is_empty() {
            return;
        }

        let value = line.value.to_string();
        let event = match (self.record, line.tag) {
            (Record::Person, "NAME") => Event::Name(value),
            (Record::Person, "FAMC") => Event::ParentFamily(value),
            (Record::Person, "FAMS") => Event::ChildFamily(value),
            (Record::Family, "HUSB" | "WIFE") => Event::Parent(value),
            (Record::Family, "CHIL") => Event::Child(value),
            _ => return,
        };
        self.events.push(event);
    }

    /// Close the last record and return all events.
    #[must_use]
    pub fn finish(mut self) -> Vec<Event> {
        self.close_record();
        if self.skipped > 0 {
            warn!("skipped {} malformed GEDCOM lines", self.skipped);
        }
        self.events
    }

    fn close_record(&mut self) {
        match self.record {
            Record::Person => self.events.push(Event::PersonEnd),
            Record::Family => self.events.push(Event::FamilyEnd),
            Record::Other => {}
        }
        self.record = Record::Other;
    }
}

/// Read every event from a GEDCOM stream. Invalid UTF-8 is replaced.
pub fn read_events<R: BufRead>(mut input: R) -> Result<Vec<Event>, ReadError> {
    let mut reader = EventReader::new();
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        line_no += 1;
        let n = input
            .read_until(b'\n', &mut buf)
            .map_err(|source| ReadError::Read {
                line: line_no,
                source,
            })?;
        if n == 0 {
            break;
        }
        reader.feed(&String::from_utf8_lossy(&buf));
    }
    Ok(reader.finish())
}

/// Read every event from a GEDCOM file.
pub fn read_file(path: &Path) -> Result<Vec<Event>, ReadError> {
    let file = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_events(BufReader::new(file))
}
