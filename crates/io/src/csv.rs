// Delimited-text snapshot loading

use std::io::Read;
use std::path::Path;

use docdrift_core::Snapshot;

use crate::error::IoError;
use crate::snapshot::{snapshot_from_rows, HeaderRow};

const BOM: char = '\u{feff}';

pub(crate) fn load(path: &Path, delimiter: Option<u8>, header: HeaderRow) -> Result<Snapshot, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    let rows = parse_rows(&content, delimiter).map_err(|e| IoError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    snapshot_from_rows(rows, header).ok_or_else(|| IoError::EmptyHeader(path.to_path_buf()))
}

/// Guess the delimiter from the first lines: the candidate that splits
/// line 1 into more than one field and keeps the field count most stable.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts[0] <= 1 {
            continue;
        }

        // consistent lines × field count; wider splits win ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read a text file as UTF-8, stripping a BOM. Bytes that are not valid
/// UTF-8 are decoded as GBK, the usual encoding of Chinese Excel exports.
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = encoding_rs::GBK.decode(&bytes);
            if had_errors {
                log::warn!("{}: neither UTF-8 nor GBK, some characters were replaced", path.display());
            } else {
                log::debug!("{}: decoded as GBK", path.display());
            }
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// The reader drops empty lines; give each one a lone delimiter so it comes
/// back as a blank row and later rows keep their sheet position.
fn mark_empty_lines(content: &str, delimiter: u8) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_quotes = false;
    let mut line_start = true;
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if line_start && !in_quotes && (c == '\n' || (c == '\r' && chars.peek() == Some(&'\n'))) {
            out.push(delimiter as char);
        }
        if c == '"' {
            in_quotes = !in_quotes;
        }
        out.push(c);
        line_start = c == '\n';
    }
    out
}

fn parse_rows(content: &str, delimiter: u8) -> Result<Vec<Vec<String>>, csv::Error> {
    let content = mark_empty_lines(content, delimiter);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(rows)
}
