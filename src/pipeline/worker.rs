//! Per-file worker logic.
//!
//! Each worker owns the file it opened for the duration of that file:
//! it discards the header row, streams data rows through the record
//! parser one at a time, and produces a [`FileResult`]. A malformed row
//! is logged and skipped so that a single corrupt row never loses the
//! rest of the file. Cancellation is honored at the file-open boundary
//! and at every row read.

use crate::error::{Error, Result};
use crate::models::FileResult;
use crate::parser::RecordParser;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Read one incident CSV file to completion.
///
/// Blocking; the dispatcher runs it inside `spawn_blocking`. Returns
/// `Error::FileOpen` if the file cannot be opened (the caller logs it and
/// moves on) and `Error::Interrupted` on cancellation. Row-level problems
/// never surface as errors.
pub fn read_incident_file(
    path: &Path,
    parser: &RecordParser,
    token: &CancellationToken,
) -> Result<FileResult> {
    if token.is_cancelled() {
        return Err(Error::interrupted("cancelled before file open"));
    }

    let file = File::open(path).map_err(|e| Error::FileOpen {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Arity is checked per-row by the parser, so keep the reader flexible;
    // has_headers consumes the header line before the first record.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut result = FileResult::default();

    for (index, row) in reader.records().enumerate() {
        if token.is_cancelled() {
            return Err(Error::interrupted("cancelled mid-file"));
        }

        // header occupies line 1
        let line = index as u64 + 2;
        result.rows_read += 1;

        let record = match row {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "{}",
                    Error::RowParse {
                        path: path.to_path_buf(),
                        line,
                        reason: e.to_string(),
                    }
                );
                result.rows_malformed += 1;
                continue;
            }
        };

        match parser.parse_row(&record) {
            Ok(Some(incident)) => result.records.push(incident),
            Ok(None) => {} // intentional filtering, not an error
            Err(mismatch) => {
                warn!(
                    "{}",
                    Error::SchemaMismatch {
                        path: path.to_path_buf(),
                        line,
                        expected: mismatch.expected,
                        found: mismatch.found,
                    }
                );
                result.rows_malformed += 1;
            }
        }
    }

    debug!(
        "Processed {}: {} of {} rows accepted",
        path.display(),
        result.records.len(),
        result.rows_read
    );

    Ok(result)
}
