use std::{collections::HashSet, fmt, io::Error, path::Path};

use crate::{types::Item, warning};

pub const COLUMN_URI: &str = "Track URI";
pub const COLUMN_TITLE: &str = "Track Name";
pub const COLUMN_ARTIST: &str = "Artist Name(s)";
pub const COLUMN_ALBUM: &str = "Album Name";

#[derive(Debug)]
pub enum SourceError {
    IoError(Error),
    CsvError(csv::Error),
    MissingColumns(Vec<String>),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::IoError(e) => write!(f, "cannot read input table: {e}"),
            SourceError::CsvError(e) => write!(f, "malformed input table: {e}"),
            SourceError::MissingColumns(cols) => {
                write!(f, "input table must contain the column(s): {}", cols.join(", "))
            }
        }
    }
}

impl std::error::Error for SourceError {}

impl From<Error> for SourceError {
    fn from(err: Error) -> Self {
        SourceError::IoError(err)
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        SourceError::CsvError(err)
    }
}

/// Returns the positions of `required` in `headers`, comparing trimmed names.
pub fn require_columns(
    headers: &csv::StringRecord,
    required: &[&str],
) -> Result<Vec<usize>, SourceError> {
    let mut positions = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for name in required {
        match headers.iter().position(|h| h.trim() == *name) {
            Some(i) => positions.push(i),
            None => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(SourceError::MissingColumns(missing))
    }
}

/// Reads items from an exported library table (Exportify format).
///
/// Rows without a track identifier are skipped; a repeated identifier keeps
/// its first occurrence.
pub fn parse_items(data: &[u8]) -> Result<Vec<Item>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);
    let headers = reader.headers()?.clone();
    let cols = require_columns(
        &headers,
        &[COLUMN_URI, COLUMN_TITLE, COLUMN_ARTIST, COLUMN_ALBUM],
    )?;

    let field = |row: &csv::StringRecord, i: usize| row.get(cols[i]).unwrap_or("").to_string();

    let mut items: Vec<Item> = Vec::new();
    let mut seen = HashSet::new();

    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let identifier = field(&row, 0).trim().to_string();
        if identifier.is_empty() {
            warning!("Skipping row {} without a track URI", line + 2);
            continue;
        }
        if !seen.insert(identifier.clone()) {
            continue;
        }
        items.push(Item {
            identifier,
            title: field(&row, 1),
            artist: field(&row, 2),
            album: field(&row, 3),
        });
    }

    Ok(items)
}

pub async fn load_items(path: &Path) -> Result<Vec<Item>, SourceError> {
    let data = async_fs::read(path).await?;
    parse_items(&data)
}
