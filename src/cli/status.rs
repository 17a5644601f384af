use std::path::Path;

use tabled::Table;

use crate::{
    error,
    management::CsvCheckpointStore,
    types::{CheckpointStatusRow, PendingTableRow},
    warning,
};

pub async fn status(progress: &Path, show_pending: bool) {
    let table = match CsvCheckpointStore::new(progress).load().await {
        Ok(Some(table)) => table,
        Ok(None) => {
            warning!("No checkpoint found at {}.", progress.display());
            return;
        }
        Err(e) => error!("Cannot read checkpoint {}: {}", progress.display(), e),
    };

    let records = table.records();
    let row = CheckpointStatusRow {
        total: table.len(),
        processed: table.count_processed(),
        pending: table.count_pending(),
        tidal: records.iter().filter(|r| r.tidal_link.is_some()).count(),
        deezer: records.iter().filter(|r| r.deezer_link.is_some()).count(),
        youtube: records.iter().filter(|r| r.youtube_link.is_some()).count(),
    };
    println!("{}", Table::new(vec![row]));

    if show_pending {
        let rows: Vec<PendingTableRow> = records
            .iter()
            .filter(|r| !r.processed)
            .map(|r| PendingTableRow {
                name: r.title.clone(),
                artists: r.artist.clone(),
                uri: r.identifier.clone(),
            })
            .collect();

        if rows.is_empty() {
            println!("Nothing pending.");
        } else {
            println!("{}", Table::new(rows));
        }
    }
}
