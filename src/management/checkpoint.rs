use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    io::Error,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::{
    types::{EnrichmentRecord, Item, LinkExportRow, PlatformLinks},
    utils,
};

#[derive(Debug)]
pub enum CheckpointError {
    IoError(Error),
    CsvError(csv::Error),
    DuplicateIdentifier(String),
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::IoError(e) => write!(f, "checkpoint io error: {e}"),
            CheckpointError::CsvError(e) => write!(f, "checkpoint csv error: {e}"),
            CheckpointError::DuplicateIdentifier(id) => {
                write!(f, "checkpoint contains {id} more than once")
            }
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<Error> for CheckpointError {
    fn from(err: Error) -> Self {
        CheckpointError::IoError(err)
    }
}

impl From<csv::Error> for CheckpointError {
    fn from(err: csv::Error) -> Self {
        CheckpointError::CsvError(err)
    }
}

/// Ordered enrichment records keyed by track identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointTable {
    records: Vec<EnrichmentRecord>,
    index: HashMap<String, usize>,
}

impl CheckpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh table with one unprocessed record per item. Later
    /// duplicates of an identifier are ignored.
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut table = Self::new();
        table.merge_items(items);
        table
    }

    /// Builds a table from existing records, rejecting duplicate identifiers.
    pub fn from_records(records: Vec<EnrichmentRecord>) -> Result<Self, CheckpointError> {
        let mut table = Self::new();
        for record in records {
            match table.index.entry(record.identifier.clone()) {
                Entry::Occupied(_) => {
                    return Err(CheckpointError::DuplicateIdentifier(record.identifier));
                }
                Entry::Vacant(slot) => {
                    slot.insert(table.records.len());
                    table.records.push(record);
                }
            }
        }
        Ok(table)
    }

    /// Appends an unprocessed record for every item not yet in the table.
    /// Existing records are left untouched. Returns the number added.
    pub fn merge_items(&mut self, items: Vec<Item>) -> usize {
        let mut added = 0;
        for item in items {
            if let Entry::Vacant(slot) = self.index.entry(item.identifier.clone()) {
                slot.insert(self.records.len());
                self.records.push(EnrichmentRecord::new(item));
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, identifier: &str) -> Option<&EnrichmentRecord> {
        self.index.get(identifier).map(|&i| &self.records[i])
    }

    /// Marks `identifier` processed with `links`. Returns false if unknown.
    pub fn resolve(&mut self, identifier: &str, links: PlatformLinks) -> bool {
        match self.index.get(identifier) {
            Some(&i) => {
                self.records[i].apply(links);
                true
            }
            None => false,
        }
    }

    /// Identifiers of unprocessed records, in table order.
    pub fn pending(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| !r.processed)
            .map(|r| r.identifier.clone())
            .collect()
    }

    pub fn records(&self) -> &[EnrichmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_processed(&self) -> usize {
        self.records.iter().filter(|r| r.processed).count()
    }

    pub fn count_pending(&self) -> usize {
        self.len() - self.count_processed()
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, CheckpointError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if self.records.is_empty() {
            writer.write_record(CHECKPOINT_HEADERS)?;
        }
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer
            .into_inner()
            .map_err(|e| CheckpointError::IoError(e.into_error()))
    }

    pub fn from_csv(data: &[u8]) -> Result<Self, CheckpointError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(data);
        let records = reader
            .deserialize::<EnrichmentRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_records(records)
    }
}

const CHECKPOINT_HEADERS: [&str; 8] = [
    "Track URI",
    "Track Name",
    "Artist Name(s)",
    "Album Name",
    "Tidal Link",
    "Deezer Link",
    "YouTube Link",
    "isProcessed",
];

/// Durable storage for a [`CheckpointTable`].
#[async_trait]
pub trait CheckpointStore: Send {
    async fn save(&mut self, table: &CheckpointTable) -> Result<(), CheckpointError>;
}

/// Checkpoint persisted as a CSV file.
pub struct CsvCheckpointStore {
    path: PathBuf,
}

impl CsvCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the checkpoint, or `None` when the file does not exist.
    pub async fn load(&self) -> Result<Option<CheckpointTable>, CheckpointError> {
        if !self.exists() {
            return Ok(None);
        }
        let data = async_fs::read(&self.path).await?;
        CheckpointTable::from_csv(&data).map(Some)
    }
}

#[async_trait]
impl CheckpointStore for CsvCheckpointStore {
    /// Writes a temporary sibling and renames it over the checkpoint, so an
    /// interrupted save never truncates the previous file.
    async fn save(&mut self, table: &CheckpointTable) -> Result<(), CheckpointError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await?;
        }

        let data = table.to_csv()?;
        let tmp = utils::temp_sibling(&self.path);
        async_fs::write(&tmp, data).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Writes every processed record to `path` as a flat links table.
/// Returns the number of rows written.
pub async fn export_links(table: &CheckpointTable, path: &Path) -> Result<usize, CheckpointError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut rows = 0;
    for record in table.records().iter().filter(|r| r.processed) {
        writer.serialize(LinkExportRow::from(record))?;
        rows += 1;
    }
    if rows == 0 {
        writer.write_record([
            "spotify uri",
            "title",
            "artist",
            "album",
            "tidal link",
            "deezer link",
            "youtube link",
            "isProcessed",
        ])?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| CheckpointError::IoError(e.into_error()))?;
    async_fs::write(path, data).await?;
    Ok(rows)
}
