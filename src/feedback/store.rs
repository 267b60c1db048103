// The JSON files holding the faculty records and their feedback summaries.
// Every write replaces the whole file. There is no locking: two processes
// updating the same files concurrently may lose an update.

use crate::feedback::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FacultyRecord {
    pub name: String,
    /// The verdict of the last processed upload, `None` before the first one.
    #[serde(with = "verdict_code")]
    pub analyzed_feedback: Option<Sentiment>,
}

impl FacultyRecord {
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
struct FacultyFile {
    #[serde(default)]
    faculty: Vec<FacultyRecord>,
}

/// The last feedback summary of every faculty member, by faculty name.
pub type AnalyzedFeedback = BTreeMap<String, FeedbackSummary>;

pub struct FeedbackStore {
    faculty_path: PathBuf,
    analyzed_path: PathBuf,
}

impl FeedbackStore {
    pub fn new(faculty_path: &Path, analyzed_path: &Path) -> FeedbackStore {
        FeedbackStore {
            faculty_path: faculty_path.to_path_buf(),
            analyzed_path: analyzed_path.to_path_buf(),
        }
    }

    pub fn from_settings(settings: &Settings) -> FeedbackStore {
        FeedbackStore::new(&settings.faculty_file, &settings.analyzed_feedback_file)
    }

    /// A missing file is an empty list.
    pub fn load_faculty(&self) -> FeedbackResult<Vec<FacultyRecord>> {
        let f: FacultyFile = read_json_or_default(&self.faculty_path)?;
        Ok(f.faculty)
    }

    pub fn save_faculty(&self, faculty: &[FacultyRecord]) -> FeedbackResult<()> {
        let f = FacultyFile {
            faculty: faculty.to_vec(),
        };
        write_json(&self.faculty_path, &f)
    }

    pub fn load_analyzed_feedback(&self) -> FeedbackResult<AnalyzedFeedback> {
        read_json_or_default(&self.analyzed_path)
    }

    pub fn save_analyzed_feedback(&self, analyzed: &AnalyzedFeedback) -> FeedbackResult<()> {
        write_json(&self.analyzed_path, analyzed)
    }

    pub fn find_faculty(&self, name: &str) -> FeedbackResult<Option<FacultyRecord>> {
        Ok(self.load_faculty()?.into_iter().find(|f| f.matches(name)))
    }

    pub fn add_faculty(&self, name: &str) -> FeedbackResult<FacultyRecord> {
        let name = name.trim();
        ensure!(!name.is_empty(), InvalidFacultyNameSnafu { name });
        let mut faculty = self.load_faculty()?;
        ensure!(
            !faculty.iter().any(|f| f.matches(name)),
            DuplicateFacultySnafu { name }
        );
        let record = FacultyRecord {
            name: name.to_string(),
            analyzed_feedback: None,
        };
        faculty.push(record.clone());
        self.save_faculty(&faculty)?;
        info!("add_faculty: added {:?}", name);
        Ok(record)
    }

    pub fn delete_faculty(&self, name: &str) -> FeedbackResult<FacultyRecord> {
        let mut faculty = self.load_faculty()?;
        let idx = faculty
            .iter()
            .position(|f| f.matches(name))
            .context(UnknownFacultySnafu { name })?;
        let removed = faculty.remove(idx);
        self.save_faculty(&faculty)?;
        info!("delete_faculty: removed {:?}", removed.name);
        Ok(removed)
    }

    pub fn rename_faculty(&self, old_name: &str, new_name: &str) -> FeedbackResult<()> {
        let new_name = new_name.trim();
        let mut faculty = self.load_faculty()?;
        let idx = faculty
            .iter()
            .position(|f| f.matches(old_name))
            .context(UnknownFacultySnafu { name: old_name })?;
        ensure!(
            !new_name.is_empty(),
            InvalidFacultyNameSnafu { name: new_name }
        );
        ensure!(
            !faculty.iter().any(|f| f.matches(new_name)),
            DuplicateFacultySnafu { name: new_name }
        );
        faculty[idx].name = new_name.to_string();
        self.save_faculty(&faculty)?;
        info!("rename_faculty: {:?} -> {:?}", old_name, new_name);
        Ok(())
    }

    /// Replaces the stored summary of a faculty member.
    pub fn record_summary(&self, name: &str, summary: &FeedbackSummary) -> FeedbackResult<()> {
        let mut analyzed = self.load_analyzed_feedback()?;
        analyzed.insert(name.to_string(), summary.clone());
        self.save_analyzed_feedback(&analyzed)
    }

    /// Resolves the verdict of the summary and stores it with the faculty
    /// record. Nothing is written if no record matches the name.
    pub fn update_verdict(
        &self,
        name: &str,
        summary: &FeedbackSummary,
    ) -> FeedbackResult<Sentiment> {
        let verdict = resolve_verdict(summary);
        let mut faculty = self.load_faculty()?;
        let record = faculty
            .iter_mut()
            .find(|f| f.matches(name))
            .context(UnknownFacultySnafu { name })?;
        record.analyzed_feedback = Some(verdict);
        self.save_faculty(&faculty)?;
        info!("update_verdict: {:?} -> {:?}", name, verdict);
        Ok(verdict)
    }
}

fn read_json_or_default<T>(path: &Path) -> FeedbackResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    let p = path.display().to_string();
    if !path.exists() {
        debug!("read_json_or_default: {} does not exist", p);
        return Ok(T::default());
    }
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path: p.clone() })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path: p })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> FeedbackResult<()> {
    let p = path.display().to_string();
    if let Some(parent) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(WritingFileSnafu { path: p.clone() })?;
    }
    let js = serde_json::to_string_pretty(value).context(SerializingJsonSnafu {})?;
    fs::write(path, js).context(WritingFileSnafu { path: p })
}

// Verdicts are stored as their numeric code, -1 when unset.
mod verdict_code {
    use sentiment_vote::Sentiment;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<Sentiment>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i8(v.map(|x| x.code()).unwrap_or(-1))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Sentiment>, D::Error> {
        let code = i8::deserialize(d)?;
        match code {
            -1 => Ok(None),
            c => Sentiment::from_code(c)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unknown verdict code {}", c))),
        }
    }
}
