use crate::feedback::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sentiment_vote::polarity::Threshold;

pub const DEFAULT_FACULTY_FILE: &str = "faculty.json";
pub const DEFAULT_ANALYZED_FEEDBACK_FILE: &str = "Analyzed_feedback.json";
pub const DEFAULT_UPLOAD_DIRECTORY: &str = "uploads";
pub const DEFAULT_FEEDBACK_COLUMN: &str = "feedback";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "facultyFile")]
    pub faculty_file: Option<String>,
    #[serde(rename = "analyzedFeedbackFile")]
    pub analyzed_feedback_file: Option<String>,
    #[serde(rename = "uploadDirectory")]
    pub upload_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackRules {
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "feedbackColumn")]
    pub feedback_column: Option<String>,
}

impl FeedbackRules {
    pub fn tiebreak_mode(&self) -> FeedbackResult<TieBreakMode> {
        match self.tiebreak_mode.as_deref() {
            None | Some("preferNeutral") => Ok(TieBreakMode::PreferNeutral),
            Some("useLabelOrder") => Ok(TieBreakMode::UseLabelOrder),
            Some(x) => whatever!("unknown tiebreak mode: {}", x),
        }
    }
}

/// The description of one oracle of the ensemble.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OracleSource {
    pub name: String,
    /// `lexicon` or `command`
    pub kind: String,
    /// lexicon: `"strict"` or the bound of the neutral band (default 0.05)
    pub threshold: Option<JSValue>,
    /// lexicon: extra word weights, added to the built-in ones
    pub words: Option<HashMap<String, f64>>,
    /// command: the program to run
    pub program: Option<String>,
    /// command: its arguments
    pub args: Option<Vec<String>>,
}

impl OracleSource {
    pub fn threshold(&self) -> FeedbackResult<Threshold> {
        read_threshold(&self.threshold)
    }
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub rules: FeedbackRules,
    pub oracles: Option<Vec<OracleSource>>,
}

/// The configuration, with all the defaults applied and the paths resolved.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub faculty_file: PathBuf,
    pub analyzed_feedback_file: PathBuf,
    pub upload_directory: PathBuf,
    pub feedback_column: String,
    pub rules: VoteRules,
    pub oracles: Option<Vec<OracleSource>>,
}

impl Settings {
    /// Relative paths are taken from `root`.
    pub fn resolve(config: &FeedbackConfig, root: &Path) -> FeedbackResult<Settings> {
        let os = &config.output_settings;
        let resolve_path = |p: &Option<String>, default: &str| -> PathBuf {
            root.join(p.clone().unwrap_or_else(|| default.to_string()))
        };
        Ok(Settings {
            faculty_file: resolve_path(&os.faculty_file, DEFAULT_FACULTY_FILE),
            analyzed_feedback_file: resolve_path(
                &os.analyzed_feedback_file,
                DEFAULT_ANALYZED_FEEDBACK_FILE,
            ),
            upload_directory: resolve_path(&os.upload_directory, DEFAULT_UPLOAD_DIRECTORY),
            feedback_column: config
                .rules
                .feedback_column
                .clone()
                .unwrap_or_else(|| DEFAULT_FEEDBACK_COLUMN.to_string()),
            rules: VoteRules {
                tiebreak_mode: config.rules.tiebreak_mode()?,
            },
            oracles: config.oracles.clone(),
        })
    }
}

pub fn read_config(path: &str) -> FeedbackResult<FeedbackConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: FeedbackConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Reads the configuration file if any. Without a file, the defaults apply
/// relative to the current directory.
pub fn load_settings(config_path: Option<&str>) -> FeedbackResult<Settings> {
    match config_path {
        Some(p) => {
            let config = read_config(p)?;
            let root = Path::new(p).parent().context(MissingParentDirSnafu { path: p })?;
            Settings::resolve(&config, root)
        }
        None => Settings::resolve(&FeedbackConfig::default(), Path::new(".")),
    }
}

fn read_threshold(x: &Option<JSValue>) -> FeedbackResult<Threshold> {
    match x {
        None => Ok(Threshold::Band(0.05)),
        Some(JSValue::String(s)) if s == "strict" => Ok(Threshold::Strict),
        Some(JSValue::Number(n)) => match n.as_f64() {
            Some(b) if b >= 0.0 => Ok(Threshold::Band(b)),
            _ => whatever!("invalid threshold: {}", n),
        },
        // Numbers written as strings, as for the other numeric settings.
        Some(JSValue::String(s)) => match s.parse::<f64>() {
            Ok(b) if b >= 0.0 => Ok(Threshold::Band(b)),
            _ => whatever!("invalid threshold: {:?}", s),
        },
        Some(v) => whatever!("invalid threshold: {}", v),
    }
}
