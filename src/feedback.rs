use log::{debug, info, warn};

use sentiment_vote::builder::Builder;
use sentiment_vote::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
pub mod oracles;
pub mod store;

use crate::feedback::config_reader::*;
use crate::feedback::io_common::{FeedbackRow, InputType};
use crate::feedback::store::FeedbackStore;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FeedbackError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("The spreadsheet {path} is empty"))]
    EmptyExcel { path: String },
    #[snafu(display("Unexpected cell in row {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("No column {column} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error producing JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Only csv and xlsx files are accepted: {path}"))]
    UnsupportedFileType { path: String },
    #[snafu(display("Cannot read the file name of {path}"))]
    InvalidFileName { path: String },
    #[snafu(display("Faculty {name:?} not found"))]
    UnknownFaculty { name: String },
    #[snafu(display("Faculty {name:?} already exists"))]
    DuplicateFaculty { name: String },
    #[snafu(display("Invalid faculty name {name:?}"))]
    InvalidFacultyName { name: String },
    #[snafu(display("Sentiment analysis failed: {source}"))]
    Voting { source: VotingErrors },
    #[snafu(display("Difference detected between the report and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type FeedbackResult<T> = Result<T, FeedbackError>;

/// The analysis of one uploaded batch.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub faculty: String,
    pub file: String,
    /// sha256 of the feedback texts, one per line.
    pub digest: String,
    pub oracles: Vec<String>,
    pub rows: Vec<RowResult>,
    pub summary: FeedbackSummary,
    pub verdict: Sentiment,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RowResult {
    pub id: String,
    pub feedback: String,
    pub sentiment: Sentiment,
}

pub fn build_ensemble(settings: &Settings) -> FeedbackResult<Ensemble> {
    let oracles = match &settings.oracles {
        Some(sources) => oracles::build_oracles(sources)?,
        None => oracles::default_oracles(),
    };
    Builder::new(&settings.rules)
        .oracles(oracles)
        .build()
        .context(VotingSnafu {})
}

fn read_feedback(
    path: &str,
    settings: &Settings,
    worksheet: Option<&str>,
) -> FeedbackResult<Vec<FeedbackRow>> {
    info!("Attempting to read feedback file {:?}", path);
    match io_common::input_type(path)? {
        InputType::Csv => io_csv::read_csv_feedback(path, &settings.feedback_column),
        InputType::Xlsx => {
            io_excel::read_excel_feedback(path, &settings.feedback_column, worksheet)
        }
    }
}

/// Keeps a copy of the uploaded file, as it was processed.
fn archive_upload(input: &str, settings: &Settings) -> FeedbackResult<PathBuf> {
    let dir = &settings.upload_directory;
    fs::create_dir_all(dir).context(WritingFileSnafu {
        path: dir.display().to_string(),
    })?;
    let target = dir.join(io_common::simplify_file_name(input)?);
    if is_same_file(input, &target)? {
        debug!("archive_upload: {:?} is already archived", input);
        return Ok(target);
    }
    fs::copy(input, &target).context(WritingFileSnafu {
        path: target.display().to_string(),
    })?;
    debug!("archive_upload: {:?} -> {:?}", input, target);
    Ok(target)
}

// Copying a file onto itself truncates it, whatever the spelling of the path.
fn is_same_file(input: &str, target: &Path) -> FeedbackResult<bool> {
    if !target.exists() {
        return Ok(false);
    }
    let input_c = fs::canonicalize(input).context(OpeningFileSnafu { path: input })?;
    let target_c = fs::canonicalize(target).context(OpeningFileSnafu {
        path: target.display().to_string(),
    })?;
    Ok(input_c == target_c)
}

/// Classifies all the feedback of a file, stores the summary and the verdict
/// of the faculty member the file is named after.
pub fn process_upload(
    input: &str,
    settings: &Settings,
    store: &FeedbackStore,
    ensemble: &Ensemble,
    worksheet: Option<&str>,
) -> FeedbackResult<UploadReport> {
    io_common::input_type(input)?;
    let faculty_name = io_common::faculty_name_from_path(input)?;
    ensure!(
        store.find_faculty(&faculty_name)?.is_some(),
        UnknownFacultySnafu {
            name: faculty_name.clone()
        }
    );

    let archived = archive_upload(input, settings)?;
    let archived_s = archived.display().to_string();
    let rows = read_feedback(&archived_s, settings, worksheet)?;
    info!("process_upload: {} feedback rows for {:?}", rows.len(), faculty_name);

    let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
    let batch = ensemble.classify_all(&texts).context(VotingSnafu {})?;

    store.record_summary(&faculty_name, &batch.summary)?;
    let verdict = store.update_verdict(&faculty_name, &batch.summary)?;
    info!("process_upload: verdict for {:?}: {}", faculty_name, verdict);

    Ok(UploadReport {
        faculty: faculty_name,
        file: io_common::simplify_file_name(input)?,
        digest: sha256::digest(texts.join("\n")),
        oracles: ensemble.oracle_names(),
        rows: rows
            .iter()
            .zip(batch.labels.iter())
            .map(|(r, s)| RowResult {
                id: r.id.clone(),
                feedback: r.text.clone(),
                sentiment: *s,
            })
            .collect(),
        summary: batch.summary,
        verdict,
    })
}

fn build_report_js(report: &UploadReport, rules: &VoteRules) -> JSValue {
    let (labels, data): (Vec<String>, Vec<u64>) = report
        .summary
        .iter()
        .map(|(s, c)| (s.to_string(), c))
        .unzip();
    json!({
        "config": {
            "faculty": report.faculty,
            "file": report.file,
            "digest": report.digest,
            "oracles": report.oracles,
            "tiebreakMode": rules.tiebreak_mode,
        },
        "results": report.rows,
        "summary": report.summary,
        "chart": { "labels": labels, "data": data },
        "verdict": report.verdict,
        "verdictCode": report.verdict.code(),
    })
}

pub fn read_reference(path: &str) -> FeedbackResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Compares the report with a reference report, printing the differences.
pub fn check_reference(report_js: &JSValue, reference_path: &str) -> FeedbackResult<()> {
    let reference = read_reference(reference_path)?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(SerializingJsonSnafu {})?;
    let pretty_report = serde_json::to_string_pretty(report_js).context(SerializingJsonSnafu {})?;
    if pretty_reference != pretty_report {
        warn!("Found differences with the reference report");
        print_diff(pretty_reference.as_str(), pretty_report.as_str(), "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("check_reference: report matches {}", reference_path);
    Ok(())
}

fn write_output(pretty_js: &str, out: Option<&str>) -> FeedbackResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", pretty_js);
            Ok(())
        }
        Some(path) => {
            info!("Writing report to {}", path);
            fs::write(path, pretty_js).context(WritingFileSnafu { path })
        }
    }
}

pub fn run_upload(
    config_path: Option<&str>,
    input: &str,
    out: Option<&str>,
    reference: Option<&str>,
    worksheet: Option<&str>,
) -> FeedbackResult<()> {
    let settings = load_settings(config_path)?;
    let store = FeedbackStore::from_settings(&settings);
    let ensemble = build_ensemble(&settings)?;
    info!("Oracles: {:?}", ensemble.oracle_names());

    let report = process_upload(input, &settings, &store, &ensemble, worksheet)?;
    let report_js = build_report_js(&report, &settings.rules);
    let pretty_js = serde_json::to_string_pretty(&report_js).context(SerializingJsonSnafu {})?;
    write_output(&pretty_js, out)?;

    if let Some(reference_path) = reference {
        check_reference(&report_js, reference_path)?;
    }
    Ok(())
}

pub fn run_add(config_path: Option<&str>, name: &str) -> FeedbackResult<()> {
    let settings = load_settings(config_path)?;
    let record = FeedbackStore::from_settings(&settings).add_faculty(name)?;
    println!("Faculty '{}' added", record.name);
    Ok(())
}

pub fn run_delete(config_path: Option<&str>, name: &str) -> FeedbackResult<()> {
    let settings = load_settings(config_path)?;
    let record = FeedbackStore::from_settings(&settings).delete_faculty(name)?;
    println!("Faculty '{}' deleted", record.name);
    Ok(())
}

pub fn run_rename(config_path: Option<&str>, old_name: &str, new_name: &str) -> FeedbackResult<()> {
    let settings = load_settings(config_path)?;
    FeedbackStore::from_settings(&settings).rename_faculty(old_name, new_name)?;
    println!("Faculty '{}' renamed to '{}'", old_name, new_name.trim());
    Ok(())
}

pub fn run_list(config_path: Option<&str>) -> FeedbackResult<()> {
    let settings = load_settings(config_path)?;
    let store = FeedbackStore::from_settings(&settings);
    let analyzed = store.load_analyzed_feedback()?;
    for record in store.load_faculty()? {
        let verdict = record
            .analyzed_feedback
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let counts = analyzed
            .get(&record.name.to_lowercase())
            .map(|s| {
                s.iter()
                    .map(|(l, c)| format!("{}={}", l, c))
                    .collect::<Vec<String>>()
                    .join(" ")
            })
            .unwrap_or_default();
        println!("{}\t{}\t{}", record.name, verdict, counts);
    }
    Ok(())
}
