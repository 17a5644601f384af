use std::path::Path;

use crate::{deezer, error, success, utils, warning};

pub async fn deezer(input: &Path, output: &Path) {
    let client = deezer::DeezerClient::from_config();
    let pb = utils::progress_bar(0);
    pb.set_message("Searching Deezer...");

    match deezer::resolve_file(input, output, &client, Some(&pb)).await {
        Ok(summary) => {
            pb.finish_and_clear();
            success!(
                "Results saved to {} ({} matched, {} without match).",
                output.display(),
                summary.matched,
                summary.unmatched
            );
            if summary.failed > 0 {
                warning!("{} searches failed and were left empty.", summary.failed);
            }
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Cannot resolve Deezer links for {}: {}", input.display(), e)
        }
    }
}
