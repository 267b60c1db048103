use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::feedback::{
    io_common::{make_default_id, FeedbackRow},
    *,
};

/// Reads the feedback texts of an Excel file. The first row of the worksheet
/// is the header.
pub fn read_excel_feedback(
    path: &str,
    column: &str,
    worksheet: Option<&str>,
) -> FeedbackResult<Vec<FeedbackRow>> {
    let default_id = make_default_id(path)?;
    let wrange = get_range(path, worksheet)?;

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    debug!("read_excel_feedback: header: {:?}", header);
    let col_idx = header
        .iter()
        .position(|c| matches!(c, DataType::String(s) if s.trim() == column))
        .context(MissingColumnSnafu { path, column })?;

    let mut res: Vec<FeedbackRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        let text = match row.get(col_idx) {
            Some(DataType::String(s)) => s.trim().to_string(),
            Some(DataType::Int(i)) => i.to_string(),
            Some(DataType::Float(f)) => f.to_string(),
            Some(DataType::Empty) | None => "".to_string(),
            Some(c) => {
                return ExcelWrongCellTypeSnafu {
                    lineno: lineno as u64,
                    content: format!("{:?}", c),
                }
                .fail();
            }
        };
        if text.is_empty() {
            warn!("read_excel_feedback: row {}: no feedback, skipping", lineno);
            continue;
        }
        res.push(FeedbackRow {
            id: default_id(lineno),
            text,
        });
    }
    debug!("read_excel_feedback: {} rows in {}", res.len(), path);
    Ok(res)
}

fn get_range(path: &str, worksheet: Option<&str>) -> FeedbackResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?,
    }
    .context(OpeningExcelSnafu { path })?;
    Ok(wrange)
}
