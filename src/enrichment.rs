//! Resumable link enrichment.
//!
//! Walks the unprocessed records of a [`CheckpointTable`] in table order and
//! asks a [`LinkResolver`] for their links. After every `flush_every`
//! attempted records the table is saved and the runner pauses for
//! `flush_delay`, unless nothing is left to resolve. A final save always
//! happens, also after an interruption.

use std::time::Duration;

use indicatif::ProgressBar;
use tokio::{sync::watch, time::sleep};

use crate::{
    config,
    management::{CheckpointError, CheckpointStore, CheckpointTable},
    odesli::LinkResolver,
    warning,
};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub flush_every: usize,
    pub flush_delay: Duration,
}

impl RunOptions {
    pub fn from_config() -> Self {
        Self {
            flush_every: config::flush_every(),
            flush_delay: config::flush_delay(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lookups completed during this run, successful or not.
    pub attempted: usize,
    pub resolved: usize,
    pub failed: usize,
    /// Successful lookups where no platform had a match.
    pub unmatched: usize,
    /// Saves performed, including the final one.
    pub flushes: usize,
    pub interrupted: bool,
}

/// Enriches every pending record of `table`.
///
/// A failed lookup is logged and leaves the record unprocessed; the run
/// continues with the next record. Setting `stop` to `true` ends the run
/// before the next record, during an in-flight lookup (the record stays
/// pending) or during a pause, and still flushes.
///
/// # Errors
///
/// Only the final save is fatal. A failed periodic save is reported as a
/// warning and retried at the next flush.
pub async fn run<R, S>(
    table: &mut CheckpointTable,
    resolver: &R,
    store: &mut S,
    options: &RunOptions,
    mut stop: watch::Receiver<bool>,
    progress: Option<&ProgressBar>,
) -> Result<RunSummary, CheckpointError>
where
    R: LinkResolver + ?Sized,
    S: CheckpointStore + ?Sized,
{
    let flush_every = options.flush_every.max(1);
    let mut summary = RunSummary::default();
    let pending = table.pending();
    let last = pending.len().saturating_sub(1);

    for (position, identifier) in pending.iter().enumerate() {
        if *stop.borrow() {
            summary.interrupted = true;
            break;
        }

        let outcome = tokio::select! {
            biased;
            _ = stop_requested(&mut stop) => None,
            result = resolver.resolve(identifier) => Some(result),
        };
        let Some(result) = outcome else {
            summary.interrupted = true;
            break;
        };

        summary.attempted += 1;
        match result {
            Ok(links) => {
                if links.is_empty() {
                    summary.unmatched += 1;
                }
                table.resolve(identifier, links);
                summary.resolved += 1;
            }
            Err(e) => {
                summary.failed += 1;
                let title = table
                    .get(identifier)
                    .map(|r| r.title.clone())
                    .unwrap_or_default();
                let message = format!("Lookup failed for {title} ({identifier}): {e}");
                match progress {
                    Some(pb) => pb.suspend(|| warning!("{}", message)),
                    None => warning!("{}", message),
                }
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }

        // The last record is covered by the final save below.
        if summary.attempted % flush_every == 0 && position < last {
            if let Err(e) = store.save(table).await {
                warning!("Failed to save progress: {}", e);
            }
            summary.flushes += 1;

            if pause(options.flush_delay, &mut stop).await {
                summary.interrupted = true;
                break;
            }
        }
    }

    store.save(table).await?;
    summary.flushes += 1;

    Ok(summary)
}

/// Resolves once `stop` is set. A dropped sender never requests a stop.
async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    if stop.wait_for(|stopped| *stopped).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Sleeps for `delay` unless `stop` turns true first. Returns whether the
/// run should stop.
async fn pause(delay: Duration, stop: &mut watch::Receiver<bool>) -> bool {
    if delay.is_zero() {
        return *stop.borrow();
    }

    let stopped = tokio::select! {
        _ = sleep(delay) => false,
        _ = stop_requested(stop) => true,
    };

    stopped || *stop.borrow()
}
