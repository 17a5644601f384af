use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric, seq::SliceRandom};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use sha2::{Digest, Sha256};

/// Longest `Retry-After` we are willing to wait for.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Shuffles `uris` in place with a uniform Fisher-Yates permutation.
pub fn shuffle_uris<R: Rng + ?Sized>(uris: &mut [String], rng: &mut R) {
    uris.shuffle(rng);
}

/// Splits `items` into consecutive batches of at most `size` elements.
///
/// A `size` of zero is treated as one.
pub fn batches<T>(items: &[T], size: usize) -> impl Iterator<Item = &[T]> {
    items.chunks(size.max(1))
}

/// Reads the `Retry-After` header as whole seconds.
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Default checkpoint path for an input table: `liked_songs.csv` becomes
/// `liked_songs_progress.csv` in the same directory.
pub fn default_progress_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "library".to_string());
    input.with_file_name(format!("{stem}_progress.csv"))
}

/// Temporary sibling used for atomic replacement of `path`.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "checkpoint.csv".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
