//! Catalog loading and normalization
//!
//! Reads the raw anime catalog CSV, validates the schema, fuses each valid
//! row into a single-text document, and persists the normalized corpus so
//! the chunking/indexing stage can run as a separate step.

use std::fs;
use std::path::{Path, PathBuf};

use crate::data::{AnimeRecord, FusedDocument};
use crate::error::{Error, Result};

/// Required columns in the raw catalog, case-sensitive.
///
/// `sypnopsis` is the column name shipped by the common anime-with-synopsis
/// catalog; it must be matched verbatim.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Name", "Genres", "sypnopsis"];

/// Header of the persisted corpus CSV.
pub const CORPUS_COLUMN: &str = "combined_info";

/// Loads, validates, and normalizes the raw anime catalog.
pub struct CatalogNormalizer {
    input_csv: PathBuf,
    output_csv: PathBuf,
}

impl CatalogNormalizer {
    /// Create a normalizer reading from `input_csv` and persisting the fused
    /// corpus to `output_csv`.
    pub fn new(input_csv: impl Into<PathBuf>, output_csv: impl Into<PathBuf>) -> Self {
        Self {
            input_csv: input_csv.into(),
            output_csv: output_csv.into(),
        }
    }

    /// Load the raw catalog, drop incomplete rows, fuse the remainder, and
    /// persist the corpus CSV.
    ///
    /// Returns the fused documents in input row order. Fails with
    /// [`Error::Schema`] when a required column is absent from the header;
    /// individual unreadable or incomplete rows are skipped, not fatal.
    pub fn normalize(&self) -> Result<Vec<FusedDocument>> {
        tracing::info!("Loading raw catalog from {:?}", self.input_csv);

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.input_csv)?;

        // Schema check happens once, before any per-row work.
        let headers = reader.headers()?.clone();
        let positions = column_positions(&headers)?;

        let mut documents = Vec::new();
        let mut dropped = 0usize;
        let mut malformed = 0usize;

        for (row_index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    tracing::debug!("Skipping malformed row {}: {}", row_index, err);
                    malformed += 1;
                    continue;
                }
            };

            // A missing value in any column drops the whole row, required
            // or not; there is no partial fill.
            if record.len() != headers.len()
                || record.iter().any(|field| field.trim().is_empty())
            {
                dropped += 1;
                continue;
            }

            let Some(record) = extract_record(&record, &positions) else {
                dropped += 1;
                continue;
            };

            if !record.is_complete() {
                dropped += 1;
                continue;
            }

            // Ids are assigned from output position so a corpus reloaded via
            // `load_corpus` yields identical ids even after row drops.
            documents.push(FusedDocument::from_record(documents.len(), &record));
        }

        tracing::info!(
            "Catalog normalized: {} documents kept, {} dropped, {} malformed rows skipped",
            documents.len(),
            dropped,
            malformed
        );

        self.persist_corpus(&documents)?;
        Ok(documents)
    }

    /// Write the fused corpus as a single-column `combined_info` CSV.
    fn persist_corpus(&self, documents: &[FusedDocument]) -> Result<()> {
        if let Some(parent) = self.output_csv.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.output_csv)?;
        writer.write_record([CORPUS_COLUMN])?;
        for doc in documents {
            writer.write_record([doc.text.as_str()])?;
        }
        writer.flush()?;

        tracing::info!("Corpus persisted to {:?}", self.output_csv);
        Ok(())
    }
}

/// Resolve the byte positions of the required columns in the header row.
fn column_positions(headers: &csv::StringRecord) -> Result<[usize; 3]> {
    let mut missing = Vec::new();
    let mut positions = [0usize; 3];

    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        match headers.iter().position(|h| h == *name) {
            Some(pos) => positions[slot] = pos,
            None => missing.push((*name).to_string()),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        tracing::error!("Catalog header is missing columns: {:?}", missing);
        Err(Error::Schema(missing))
    }
}

/// Pull the three required fields out of a row; `None` when any is absent.
fn extract_record(row: &csv::StringRecord, positions: &[usize; 3]) -> Option<AnimeRecord> {
    let name = row.get(positions[0])?;
    let genres = row.get(positions[1])?;
    let synopsis = row.get(positions[2])?;
    Some(AnimeRecord {
        name: name.to_string(),
        genres: genres.to_string(),
        synopsis: synopsis.to_string(),
    })
}

/// Re-read a persisted corpus CSV into fused documents.
///
/// Document ids are assigned from row position, matching what
/// [`CatalogNormalizer::normalize`] produced for the same corpus.
pub fn load_corpus(path: &Path) -> Result<Vec<FusedDocument>> {
    tracing::info!("Loading corpus from {:?}", path);

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?;
    if !headers.iter().any(|h| h == CORPUS_COLUMN) {
        return Err(Error::Schema(vec![CORPUS_COLUMN.to_string()]));
    }

    let mut documents = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record = record?;
        let Some(text) = record.get(0) else { continue };
        if text.trim().is_empty() {
            continue;
        }
        documents.push(FusedDocument {
            id: format!("anime_{row_index}"),
            text: text.to_string(),
        });
    }

    tracing::info!("Loaded {} corpus documents", documents.len());
    Ok(documents)
}
