use std::path::Path;

use crate::feedback::*;

/// One row of an uploaded feedback file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeedbackRow {
    pub id: String,
    pub text: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

pub fn input_type(path: &str) -> FeedbackResult<InputType> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("csv") => Ok(InputType::Csv),
        Some("xlsx") => Ok(InputType::Xlsx),
        _ => UnsupportedFileTypeSnafu { path }.fail(),
    }
}

pub fn simplify_file_name(path: &str) -> FeedbackResult<String> {
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .context(InvalidFileNameSnafu { path })?;
    Ok(name.to_string())
}

/// The faculty a file belongs to: its name without extension, in lower case.
pub fn faculty_name_from_path(path: &str) -> FeedbackResult<String> {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|n| n.to_str())
        .context(InvalidFileNameSnafu { path })?;
    Ok(stem.to_lowercase())
}

pub fn make_default_id(path: &str) -> FeedbackResult<impl Fn(usize) -> String> {
    let simplified_file_name = simplify_file_name(path)?;
    Ok(move |lineno| format!("{}-{:08}", simplified_file_name, lineno))
}
