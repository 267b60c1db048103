// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The three sentiment categories every vote is reduced to.
///
/// The discriminants are the stored verdict codes of a faculty record.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Negative = 0,
    Positive = 1,
    Neutral = 2,
}

impl Sentiment {
    /// All the categories, in the order used by `TieBreakMode::UseLabelOrder`.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// The stored verdict code.
    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn from_code(code: i8) -> Option<Sentiment> {
        match code {
            0 => Some(Sentiment::Negative),
            1 => Some(Sentiment::Positive),
            2 => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A label as emitted by an oracle, before it is mapped to a `Sentiment`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum RawLabel {
    /// A textual label such as `POSITIVE`.
    Named(String),
    /// The class id of a 3-way classifier (`LABEL_2` or `2`).
    ClassId(u32),
}

impl RawLabel {
    /// Reads the output of a classifier.
    ///
    /// `LABEL_<n>` and bare integers are class ids, everything else is kept
    /// as a named label. No validation happens here: see `to_sentiment`.
    pub fn parse(s: &str) -> RawLabel {
        let s = s.trim();
        let digits = s.strip_prefix("LABEL_").unwrap_or(s);
        // Plain decimal only: no sign, no leading zero.
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'));
        match digits.parse::<u32>() {
            Ok(id) if canonical => RawLabel::ClassId(id),
            _ => RawLabel::Named(s.to_string()),
        }
    }

    /// Maps the label into the three-value space.
    ///
    /// Class ids follow the negative/neutral/positive order of 3-way
    /// classifiers. Returns `None` for anything else.
    pub fn to_sentiment(&self) -> Option<Sentiment> {
        match self {
            RawLabel::ClassId(0) => Some(Sentiment::Negative),
            RawLabel::ClassId(1) => Some(Sentiment::Neutral),
            RawLabel::ClassId(2) => Some(Sentiment::Positive),
            RawLabel::ClassId(_) => None,
            RawLabel::Named(s) => match s.to_uppercase().as_str() {
                "POSITIVE" => Some(Sentiment::Positive),
                "NEGATIVE" => Some(Sentiment::Negative),
                "NEUTRAL" => Some(Sentiment::Neutral),
                _ => None,
            },
        }
    }
}

impl From<Sentiment> for RawLabel {
    fn from(s: Sentiment) -> RawLabel {
        RawLabel::Named(s.as_str().to_string())
    }
}

impl Display for RawLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawLabel::Named(s) => write!(f, "{}", s),
            RawLabel::ClassId(id) => write!(f, "LABEL_{}", id),
        }
    }
}

/// The vote of one oracle over one text.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OracleVote {
    pub oracle: String,
    pub label: RawLabel,
}

// ******** Output data structures *********

/// Number of occurrences of each label.
///
/// Only labels that occurred are present: every stored count is at least 1,
/// and the counts sum to the number of labels that were added.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<Sentiment, u64>);

/// The label counts over all the feedback rows of one faculty member.
pub type FeedbackSummary = Tally;

impl Tally {
    pub fn new() -> Tally {
        Tally(BTreeMap::new())
    }

    pub fn add(&mut self, label: Sentiment) {
        *self.0.entry(label).or_insert(0) += 1;
    }

    /// The count for a label, 0 when it never occurred.
    pub fn get(&self, label: Sentiment) -> u64 {
        self.0.get(&label).cloned().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Sentiment, u64)> + '_ {
        self.0.iter().map(|(s, c)| (*s, *c))
    }
}

impl FromIterator<Sentiment> for Tally {
    fn from_iter<I: IntoIterator<Item = Sentiment>>(iter: I) -> Tally {
        let mut t = Tally::new();
        for s in iter {
            t.add(s);
        }
        t
    }
}

/// The outcome of classifying one text.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TextResult {
    pub label: Sentiment,
    pub tally: Tally,
    pub votes: Vec<OracleVote>,
}

/// The outcome of classifying a batch of texts.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BatchResult {
    /// One label per input text, in input order.
    pub labels: Vec<Sentiment>,
    pub summary: FeedbackSummary,
}

/// Errors that prevent the aggregation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// No vote was provided for a text.
    EmptyVoteSet,
    /// An ensemble needs at least one oracle.
    EmptyEnsemble,
    /// An oracle returned a label outside of the known categories.
    UnmappableLabel { oracle: String, label: RawLabel },
    /// An oracle could not produce a label at all.
    OracleFailed { oracle: String, message: String },
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::EmptyVoteSet => write!(f, "cannot resolve an empty vote set"),
            VotingErrors::EmptyEnsemble => write!(f, "the ensemble has no oracle"),
            VotingErrors::UnmappableLabel { oracle, label } => {
                write!(f, "oracle {} returned unknown label {:?}", oracle, label.to_string())
            }
            VotingErrors::OracleFailed { oracle, message } => {
                write!(f, "oracle {} failed: {}", oracle, message)
            }
        }
    }
}

// ********* Configuration **********

/// How the per-text resolver picks a label when several share the top count.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieBreakMode {
    /// Positive against negative gives neutral, otherwise the non-neutral
    /// label wins. The same precedence as the faculty verdict.
    PreferNeutral,
    /// The first tied label in `Sentiment::ALL` order.
    UseLabelOrder,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub tiebreak_mode: TieBreakMode,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        tiebreak_mode: TieBreakMode::PreferNeutral,
    };
}

impl Default for VoteRules {
    fn default() -> VoteRules {
        VoteRules::DEFAULT_RULES
    }
}
