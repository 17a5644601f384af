use std::path::{Path, PathBuf};

use tokio::sync::watch;

use crate::{
    enrichment::{self, RunOptions},
    error, info,
    management::{CheckpointTable, CsvCheckpointStore, checkpoint, library},
    odesli::OdesliClient,
    success, utils, warning,
};

pub async fn links(input: &Path, progress: Option<PathBuf>, output: Option<PathBuf>) {
    let items = match library::load_items(input).await {
        Ok(items) => items,
        Err(e) => error!("Cannot load {}: {}", input.display(), e),
    };

    let mut store =
        CsvCheckpointStore::new(progress.unwrap_or_else(|| utils::default_progress_path(input)));

    let mut table = match store.load().await {
        Ok(Some(mut table)) => {
            info!("Loading progress from previous run...");
            let added = table.merge_items(items);
            if added > 0 {
                info!("{} new tracks added to the checkpoint.", added);
            }
            table
        }
        Ok(None) => CheckpointTable::from_items(items),
        Err(e) => error!("Cannot read checkpoint {}: {}", store.path().display(), e),
    };

    let pending = table.count_pending();
    info!(
        "{} of {} tracks left to resolve.",
        pending,
        table.len()
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warning!("Interrupted, saving progress... Press Ctrl-C again to quit without saving.");
        let _ = stop_tx.send(true);

        if tokio::signal::ctrl_c().await.is_ok() {
            error!("Aborted, progress since the last save is lost.");
        }
    });

    let resolver = OdesliClient::from_config();
    let options = RunOptions::from_config();
    let pb = utils::progress_bar(pending as u64);

    let result =
        enrichment::run(&mut table, &resolver, &mut store, &options, stop_rx, Some(&pb)).await;
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot save progress to {}: {}", store.path().display(), e)
        }
    };
    pb.finish_and_clear();

    success!(
        "Resolved {} tracks ({} without any match), progress saved to {}.",
        summary.resolved,
        summary.unmatched,
        store.path().display()
    );
    if summary.failed > 0 {
        warning!(
            "{} lookups failed and stay pending. Run the command again to retry them.",
            summary.failed
        );
    }
    if summary.interrupted {
        warning!("Run interrupted, {} tracks still pending.", table.count_pending());
    }

    if let Some(output) = output {
        match checkpoint::export_links(&table, &output).await {
            Ok(rows) => success!("{} links written to {}.", rows, output.display()),
            Err(e) => error!("Cannot write {}: {}", output.display(), e),
        }
    }
}
