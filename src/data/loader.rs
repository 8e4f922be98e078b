// ============================================================
// Layer 4 — Record Store
// ============================================================
// Loads labelled reviews from a delimiter-separated file using
// the csv crate.
//
// File layout (NSMC ratings_train.txt / ratings_test.txt):
//   id	document	label          ← header row
//   9976970	아 더빙.. 진짜 짜증나네요 목소리	0
//   3819312	흠...포스터보고 초딩영화줄....	1
//
// Loading steps (applied in order):
//   1. Parse every row, rejecting rows whose column count
//      differs from the header (malformed file)
//   2. Drop rows whose text or label field is empty
//   3. Parse the label as a non-negative class id
//   4. If sample_fraction < 1.0, draw round(len * fraction)
//      rows without replacement using a seeded RNG — the same
//      seed and input always give the same subset, in the same
//      order
//
// Reference: csv crate documentation
//            rand crate documentation (seq::index::sample)

use std::path::PathBuf;

use rand::{rngs::StdRng, SeedableRng};

use crate::domain::error::FinetuneError;
use crate::domain::review::Review;

/// How to read a delimited review file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field separator, e.g. b'\t'
    pub delimiter:    u8,
    /// Whether the first row is a header
    pub has_headers:  bool,
    /// Zero-based index of the text column
    pub text_column:  usize,
    /// Zero-based index of the label column
    pub label_column: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter:    b'\t',
            has_headers:  true,
            text_column:  1,
            label_column: 2,
        }
    }
}

/// Reads reviews from one delimited file.
pub struct RecordStore {
    path:    PathBuf,
    options: LoadOptions,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self { path: path.into(), options }
    }

    /// Load, clean and optionally subsample the file.
    pub fn load(&self, sample_fraction: f64, seed: u64) -> Result<Vec<Review>, FinetuneError> {
        if !(sample_fraction > 0.0 && sample_fraction <= 1.0) {
            return Err(FinetuneError::Config(format!(
                "sample fraction must be in (0, 1], got {sample_fraction}"
            )));
        }

        let reviews = self.read_complete_rows()?;
        let total   = reviews.len();
        let reviews = subsample(reviews, sample_fraction, seed);

        tracing::info!(
            "Loaded {} of {} complete rows from '{}'",
            reviews.len(),
            total,
            self.path.display()
        );
        Ok(reviews)
    }

    fn read_complete_rows(&self) -> Result<Vec<Review>, FinetuneError> {
        let opts = &self.options;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(opts.delimiter)
            .has_headers(opts.has_headers)
            .flexible(false)
            .from_path(&self.path)
            .map_err(|e| FinetuneError::data_load(&self.path, e))?;

        let needed      = opts.text_column.max(opts.label_column) + 1;
        let mut reviews = Vec::new();
        let mut dropped = 0usize;

        for row in reader.records() {
            let row  = row.map_err(|e| FinetuneError::data_load(&self.path, e))?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            if row.len() < needed {
                return Err(FinetuneError::data_load(
                    &self.path,
                    format!("line {line}: expected at least {needed} columns, found {}", row.len()),
                ));
            }

            let text  = &row[opts.text_column];
            let label = row[opts.label_column].trim();

            // Empty field == missing value
            if text.is_empty() || label.is_empty() {
                dropped += 1;
                continue;
            }

            let label = label.parse::<usize>().map_err(|_| {
                FinetuneError::data_load(
                    &self.path,
                    format!("line {line}: label '{label}' is not a class id"),
                )
            })?;

            reviews.push(Review::new(text, label));
        }

        if dropped > 0 {
            tracing::debug!(
                "Dropped {} incomplete rows from '{}'",
                dropped,
                self.path.display()
            );
        }
        Ok(reviews)
    }
}

/// Seeded draw of round(len * fraction) rows without replacement.
fn subsample(reviews: Vec<Review>, fraction: f64, seed: u64) -> Vec<Review> {
    if fraction >= 1.0 {
        return reviews;
    }

    let total = reviews.len();
    let keep  = ((total as f64) * fraction).round() as usize;
    let mut rng = StdRng::seed_from_u64(seed);

    // Take ownership of each drawn row exactly once
    let mut slots: Vec<Option<Review>> = reviews.into_iter().map(Some).collect();
    rand::seq::index::sample(&mut rng, total, keep.min(total))
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    fn corpus(rows: usize) -> String {
        let mut s = String::from("id\tdocument\tlabel\n");
        for i in 0..rows {
            s.push_str(&format!("{i}\treview number {i}\t{}\n", i % 2));
        }
        s
    }

    #[test]
    fn test_loads_rows_in_file_order() {
        let f = write_file("id\tdocument\tlabel\n1\tgood movie\t1\n2\tbad movie\t0\n");
        let reviews = RecordStore::new(f.path(), LoadOptions::default())
            .load(1.0, 999)
            .unwrap();
        assert_eq!(
            reviews,
            vec![Review::new("good movie", 1), Review::new("bad movie", 0)]
        );
    }

    #[test]
    fn test_drops_incomplete_rows() {
        let f = write_file("id\tdocument\tlabel\n1\t\t1\n2\tfine\t\n3\tkept\t0\n");
        let reviews = RecordStore::new(f.path(), LoadOptions::default())
            .load(1.0, 999)
            .unwrap();
        assert_eq!(reviews, vec![Review::new("kept", 0)]);
        assert!(reviews.iter().all(|r| !r.text.is_empty()));
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let err = RecordStore::new("does/not/exist.txt", LoadOptions::default())
            .load(1.0, 999)
            .unwrap_err();
        assert!(matches!(err, FinetuneError::DataLoad { .. }));
    }

    #[test]
    fn test_wrong_column_count_is_data_load_error() {
        let f = write_file("id\tdocument\tlabel\n1\tgood\t1\n2\tbad\t0\textra\n");
        let err = RecordStore::new(f.path(), LoadOptions::default())
            .load(1.0, 999)
            .unwrap_err();
        assert!(matches!(err, FinetuneError::DataLoad { .. }));
    }

    #[test]
    fn test_non_numeric_label_is_data_load_error() {
        let f = write_file("id\tdocument\tlabel\n1\tgood\tpositive\n");
        let err = RecordStore::new(f.path(), LoadOptions::default())
            .load(1.0, 999)
            .unwrap_err();
        assert!(matches!(err, FinetuneError::DataLoad { .. }));
    }

    #[test]
    fn test_subsample_is_deterministic() {
        let f     = write_file(&corpus(50));
        let store = RecordStore::new(f.path(), LoadOptions::default());
        let a = store.load(0.4, 999).unwrap();
        let b = store.load(0.4, 999).unwrap();
        assert_eq!(a.len(), 20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_subset() {
        let f     = write_file(&corpus(50));
        let store = RecordStore::new(f.path(), LoadOptions::default());
        let a = store.load(0.4, 1).unwrap();
        let b = store.load(0.4, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fraction_out_of_range_rejected() {
        let f = write_file(&corpus(5));
        let store = RecordStore::new(f.path(), LoadOptions::default());
        assert!(matches!(store.load(0.0, 1), Err(FinetuneError::Config(_))));
        assert!(matches!(store.load(1.5, 1), Err(FinetuneError::Config(_))));
    }

    #[test]
    fn test_custom_columns_without_header() {
        let f = write_file("1,great,x\n0,awful,y\n");
        let opts = LoadOptions {
            delimiter:    b',',
            has_headers:  false,
            text_column:  1,
            label_column: 0,
        };
        let reviews = RecordStore::new(f.path(), opts).load(1.0, 0).unwrap();
        assert_eq!(reviews, vec![Review::new("great", 1), Review::new("awful", 0)]);
    }
}
