//! Translation file loader.
//!
//! One mapping per line:
//!
//! ```text
//! # comment
//! // comment
//! G1meter.value,M1x
//! M1sl=0,G1slider=0
//! ```
//!
//! Each half of the comma-separated pair starts with a two-character prefix;
//! the first character of the left prefix is the direction tag (`G` or `M`).
//! The rest of each half, up to an optional `=`, is the key (left) and its
//! substitute (right). Lines with any other tag are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{MapError, Result};
use crate::table::{Direction, TranslationTables};

const PREFIX_LEN: usize = 2;

/// One parsed mapping line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub direction: Direction,
    pub key: String,
    pub value: String,
}

/// Load both tables from a translation file.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<TranslationTables> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MapError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let tables = load_from_reader(BufReader::new(file))?;
    info!(
        ?path,
        gui = tables.gui.len(),
        micro = tables.micro.len(),
        "loaded translation tables"
    );
    Ok(tables)
}

/// Load both tables from any line source.
pub fn load_from_reader(reader: impl BufRead) -> Result<TranslationTables> {
    let mut tables = TranslationTables::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(entry) = parse_line(idx + 1, &line)? {
            tables
                .table_mut(entry.direction)
                .add(entry.key, entry.value);
        }
    }
    Ok(tables)
}

/// Parse a single line. `line_no` is 1-based and only used for errors.
///
/// Returns `Ok(None)` for blank lines, comments, and unknown direction tags.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<MapEntry>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() || line.starts_with('#') || line.starts_with('/') {
        return Ok(None);
    }

    let malformed = |reason: &str| MapError::Malformed {
        line: line_no,
        reason: reason.to_string(),
    };

    // Lines with other tags are skipped before any shape checks.
    let Some(direction) = line.chars().next().and_then(Direction::from_tag) else {
        debug!(line = line_no, "ignoring mapping with unknown direction tag");
        return Ok(None);
    };

    let (left, right) = line
        .split_once(',')
        .ok_or_else(|| malformed("missing ',' between message and translation"))?;

    let key = strip_half(left).ok_or_else(|| malformed("message is missing its prefix"))?;
    let value = strip_half(right).ok_or_else(|| malformed("translation is missing its prefix"))?;
    if key.is_empty() {
        return Err(malformed("empty message key"));
    }

    Ok(Some(MapEntry {
        direction,
        key: key.to_string(),
        value: value.to_string(),
    }))
}

/// Drop the two-character prefix and anything from the first `=` onward.
fn strip_half(half: &str) -> Option<&str> {
    let body = match half.find('=') {
        Some(eq) if eq < PREFIX_LEN => return None,
        Some(eq) => half.get(PREFIX_LEN..eq)?,
        None => half.get(PREFIX_LEN..)?,
    };
    Some(body)
}
