use std::path::Path;

use indicatif::ProgressBar;

use crate::{
    Res,
    deezer::CatalogSearch,
    management::library::{COLUMN_ARTIST, COLUMN_TITLE, require_columns},
    warning,
};

pub const COLUMN_DEEZER_LINK: &str = "Deezer Link";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeezerSummary {
    pub rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub failed: usize,
}

pub fn build_query(title: &str, artist: &str) -> String {
    format!("{} {}", title.trim(), artist.trim())
}

/// Copies the input table and fills a `Deezer Link` column with the first
/// strict search match for every row.
///
/// All input columns are kept in place. An existing `Deezer Link` column is
/// overwritten, otherwise one is appended. Rows without a match, or whose
/// search failed, get an empty cell.
///
/// # Errors
///
/// Fails before any search when `Track Name` or `Artist Name(s)` is missing.
pub async fn resolve_table<S: CatalogSearch + ?Sized>(
    input: &[u8],
    search: &S,
    progress: Option<&ProgressBar>,
) -> Res<(Vec<u8>, DeezerSummary)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();
    let cols = require_columns(&headers, &[COLUMN_TITLE, COLUMN_ARTIST])?;
    let (title_col, artist_col) = (cols[0], cols[1]);

    let mut out_headers: Vec<String> = headers.iter().map(str::to_string).collect();
    let link_col = match out_headers.iter().position(|h| h.trim() == COLUMN_DEEZER_LINK) {
        Some(i) => i,
        None => {
            out_headers.push(COLUMN_DEEZER_LINK.to_string());
            out_headers.len() - 1
        }
    };

    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    if let Some(pb) = progress {
        pb.set_length(rows.len() as u64);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&out_headers)?;

    let mut summary = DeezerSummary::default();

    for row in rows {
        let title = row.get(title_col).unwrap_or("");
        let artist = row.get(artist_col).unwrap_or("");
        let query = build_query(title, artist);

        let link = match search.first_match(&query).await {
            Ok(Some(track)) => {
                summary.matched += 1;
                track.link
            }
            Ok(None) => {
                summary.unmatched += 1;
                String::new()
            }
            Err(e) => {
                summary.failed += 1;
                let message = format!("Deezer search failed for {query}: {e}");
                match progress {
                    Some(pb) => pb.suspend(|| warning!("{}", message)),
                    None => warning!("{}", message),
                }
                String::new()
            }
        };
        summary.rows += 1;

        let mut fields: Vec<String> = row.iter().map(str::to_string).collect();
        fields.resize(out_headers.len(), String::new());
        fields[link_col] = link;
        writer.write_record(&fields)?;

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    let data = writer.into_inner().map_err(|e| e.into_error())?;
    Ok((data, summary))
}

pub async fn resolve_file<S: CatalogSearch + ?Sized>(
    input: &Path,
    output: &Path,
    search: &S,
    progress: Option<&ProgressBar>,
) -> Res<DeezerSummary> {
    let data = async_fs::read(input).await?;
    let (out, summary) = resolve_table(&data, search, progress).await?;
    async_fs::write(output, out).await?;
    Ok(summary)
}
