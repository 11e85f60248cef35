//! Parsing of search-tool output into match records.
//!
//! Two wire formats are supported: newline-delimited JSON (the current
//! format) and the colon-delimited plain text older tool versions emit.
//! The parser never mutates its input and preserves the order in which
//! the tool reported matches.

use crate::error::{FastFindError, Result};
use crate::types::{MatchRecord, OutputFormat, ResultSet};
use serde::Deserialize;

/// One line of JSON output. Only the discriminator is typed up front;
/// the payload is decoded once the record is known to be a match.
#[derive(Debug, Deserialize)]
struct JsonEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MatchData {
    path: PathText,
    line_number: u64,
    submatches: Vec<SubMatch>,
}

#[derive(Debug, Deserialize)]
struct PathText {
    text: String,
}

#[derive(Debug, Deserialize)]
struct SubMatch {
    start: u64,
    end: u64,
}

/// Parse raw process output into an ordered result set.
pub fn parse(raw: &[u8], format: OutputFormat) -> Result<ResultSet> {
    match format {
        OutputFormat::JsonLines => parse_json_lines(raw),
        OutputFormat::LegacyText => parse_legacy_text(raw),
    }
}

fn parse_json_lines(raw: &[u8]) -> Result<ResultSet> {
    let text = String::from_utf8_lossy(raw);
    let mut records = Vec::new();

    // The tool emits LF line endings on every platform, so split on '\n'
    // rather than the native terminator; trimming also drops any stray
    // '\r'.
    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let envelope: JsonEnvelope = serde_json::from_str(line)
            .map_err(|e| FastFindError::Parse(format!("invalid JSON record: {}", e)))?;
        if envelope.kind != "match" {
            // Begin/end/context/summary records carry no match location.
            continue;
        }

        let data: MatchData = serde_json::from_value(envelope.data)
            .map_err(|e| FastFindError::Parse(format!("malformed match record: {}", e)))?;
        let submatch = data.submatches.first().ok_or_else(|| {
            FastFindError::Parse("match record without submatches".to_string())
        })?;

        records.push(MatchRecord {
            filename: data.path.text,
            line_number: data.line_number,
            column: submatch.start,
            // The end offset is exclusive, so the span length is the
            // plain difference.
            match_length: submatch.end.saturating_sub(submatch.start),
        });
    }

    Ok(records)
}

fn parse_legacy_text(raw: &[u8]) -> Result<ResultSet> {
    let text = String::from_utf8_lossy(raw);
    let terminator = if cfg!(windows) { "\r\n" } else { "\n" };
    let mut records = Vec::new();

    for line in text.split(terminator) {
        if line.trim().is_empty() {
            continue;
        }
        // Location and content are separated by a colon and two tabs.
        // Summary and context lines lack the separator and are skipped.
        let Some((location, _content)) = line.split_once(":\t\t") else {
            continue;
        };
        records.push(parse_location(location)?);
    }

    Ok(records)
}

/// Split a `path:line:column` location segment.
///
/// The path may itself contain colons (Windows drive letters), so the
/// segment is scanned from the right: the last field is the column, the
/// one before it the line number, and everything else the filename.
fn parse_location(location: &str) -> Result<MatchRecord> {
    let (rest, column) = location
        .rsplit_once(':')
        .ok_or_else(|| FastFindError::Parse(format!("missing column field: '{}'", location)))?;
    let (filename, line_number) = rest
        .rsplit_once(':')
        .ok_or_else(|| FastFindError::Parse(format!("missing line field: '{}'", location)))?;

    let line_number = line_number
        .parse()
        .map_err(|_| FastFindError::Parse(format!("invalid line number: '{}'", line_number)))?;
    let column = column
        .parse()
        .map_err(|_| FastFindError::Parse(format!("invalid column: '{}'", column)))?;

    Ok(MatchRecord {
        filename: filename.to_string(),
        line_number,
        column,
        match_length: 0,
    })
}
