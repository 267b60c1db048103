// Primitives for reading CSV files.

use crate::feedback::{
    io_common::{make_default_id, FeedbackRow},
    *,
};

/// Reads the feedback texts of a CSV file with a header row.
///
/// Rows with an empty feedback cell are skipped.
pub fn read_csv_feedback(path: &str, column: &str) -> FeedbackResult<Vec<FeedbackRow>> {
    let default_id = make_default_id(path)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let headers = rdr.headers().context(CsvOpenSnafu { path })?.clone();
    debug!("read_csv_feedback: headers: {:?}", headers);
    let col_idx = headers
        .iter()
        .position(|h| h.trim() == column)
        .context(MissingColumnSnafu { path, column })?;

    let mut res: Vec<FeedbackRow> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let text = line.get(col_idx).unwrap_or("").trim();
        if text.is_empty() {
            warn!("read_csv_feedback: line {}: no feedback, skipping", lineno);
            continue;
        }
        res.push(FeedbackRow {
            id: default_id(lineno),
            text: text.to_string(),
        });
    }
    debug!("read_csv_feedback: {} rows in {}", res.len(), path);
    Ok(res)
}
