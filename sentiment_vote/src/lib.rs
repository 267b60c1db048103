/*!
Majority-vote aggregation of independent sentiment classifiers.

Two reductions share the same tally-then-tie-break shape:
- [resolve_votes] reduces the votes of several oracles over one text to one label,
- [resolve_verdict] reduces the labels of a batch of texts to one verdict.

```
use sentiment_vote::*;

let votes = vec![
    RawLabel::parse("POSITIVE"),
    RawLabel::parse("LABEL_2"),
    RawLabel::parse("NEGATIVE"),
];
assert_eq!(resolve_votes(&votes, &VoteRules::DEFAULT_RULES)?, Sentiment::Positive);
# Ok::<(), VotingErrors>(())
```
*/

mod config;
use log::{debug, info};

pub use crate::config::*;

pub mod builder;
pub mod manual;
pub mod polarity;

/// A sentiment classifier, treated as a black box.
///
/// Oracles are built once and handed to an [Ensemble]. The order in which
/// the oracles of an ensemble are invoked has no effect on the outcome.
pub trait Oracle {
    /// The name used in logs and error messages.
    fn name(&self) -> &str;

    /// Classifies one text. The label does not need to be valid: invalid
    /// labels are reported by the ensemble.
    fn predict(&self, text: &str) -> Result<RawLabel, OracleError>;
}

/// A failure of an oracle to produce any label.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OracleError(pub String);

impl std::error::Error for OracleError {}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runs a fixed set of oracles over texts.
pub struct Ensemble {
    pub(crate) oracles: Vec<Box<dyn Oracle>>,
    pub(crate) rules: VoteRules,
}

impl Ensemble {
    pub fn oracle_names(&self) -> Vec<String> {
        self.oracles.iter().map(|o| o.name().to_string()).collect()
    }

    pub fn rules(&self) -> &VoteRules {
        &self.rules
    }

    /// Collects the vote of every oracle over the text and resolves them.
    pub fn classify(&self, text: &str) -> Result<TextResult, VotingErrors> {
        let mut votes: Vec<OracleVote> = Vec::new();
        for oracle in self.oracles.iter() {
            let label = oracle
                .predict(text)
                .map_err(|e| VotingErrors::OracleFailed {
                    oracle: oracle.name().to_string(),
                    message: e.0,
                })?;
            votes.push(OracleVote {
                oracle: oracle.name().to_string(),
                label,
            });
        }
        let tally = tally_votes(&votes)?;
        let label = resolve_tally(&tally, &self.rules)?;
        debug!("classify: tally: {:?} label: {:?}", tally, label);
        Ok(TextResult {
            label,
            tally,
            votes,
        })
    }

    /// Classifies all the texts of a batch and counts the resulting labels.
    pub fn classify_all<S: AsRef<str>>(&self, texts: &[S]) -> Result<BatchResult, VotingErrors> {
        info!(
            "classify_all: processing {} texts with {} oracles",
            texts.len(),
            self.oracles.len()
        );
        let mut labels: Vec<Sentiment> = Vec::new();
        for text in texts.iter() {
            labels.push(self.classify(text.as_ref())?.label);
        }
        let summary: FeedbackSummary = labels.iter().cloned().collect();
        info!("classify_all: summary: {:?}", summary);
        Ok(BatchResult { labels, summary })
    }
}

/// Maps every vote to its sentiment and counts them.
///
/// The mapping happens before counting, so `LABEL_2` and `POSITIVE` are the
/// same vote. Fails on the first vote that cannot be mapped.
pub fn tally_votes(votes: &[OracleVote]) -> Result<Tally, VotingErrors> {
    if votes.is_empty() {
        return Err(VotingErrors::EmptyVoteSet);
    }
    let mut tally = Tally::new();
    for v in votes.iter() {
        let s = v
            .label
            .to_sentiment()
            .ok_or_else(|| VotingErrors::UnmappableLabel {
                oracle: v.oracle.clone(),
                label: v.label.clone(),
            })?;
        tally.add(s);
    }
    Ok(tally)
}

/// Resolves the raw labels of one text into a single sentiment.
pub fn resolve_votes(votes: &[RawLabel], rules: &VoteRules) -> Result<Sentiment, VotingErrors> {
    let named: Vec<OracleVote> = votes
        .iter()
        .enumerate()
        .map(|(idx, label)| OracleVote {
            oracle: format!("#{}", idx),
            label: label.clone(),
        })
        .collect();
    let tally = tally_votes(&named)?;
    resolve_tally(&tally, rules)
}

/// Picks the label with the highest count, breaking ties with the rules.
pub fn resolve_tally(tally: &Tally, rules: &VoteRules) -> Result<Sentiment, VotingErrors> {
    let max_count = tally.iter().map(|(_, c)| c).max().ok_or(VotingErrors::EmptyVoteSet)?;
    let tied: Vec<Sentiment> = Sentiment::ALL
        .iter()
        .cloned()
        .filter(|s| tally.get(*s) == max_count)
        .collect();
    if let [single] = tied.as_slice() {
        return Ok(*single);
    }
    debug!("resolve_tally: tie between {:?}", tied);
    let res = match rules.tiebreak_mode {
        TieBreakMode::UseLabelOrder => tied[0],
        TieBreakMode::PreferNeutral => {
            let has = |s: Sentiment| tied.contains(&s);
            if has(Sentiment::Positive) && has(Sentiment::Negative) {
                Sentiment::Neutral
            } else if has(Sentiment::Positive) {
                Sentiment::Positive
            } else {
                Sentiment::Negative
            }
        }
    };
    Ok(res)
}

/// The verdict for a faculty member, given the labels of all the feedback rows.
///
/// The order of the checks matters: with 5 positive, 5 negative and 2
/// neutral, the verdict is neutral and not a strict majority.
///
/// ```
/// use sentiment_vote::*;
///
/// let summary: FeedbackSummary = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative, Sentiment::Negative, Sentiment::Neutral]
///     .into_iter()
///     .collect();
/// assert_eq!(resolve_verdict(&summary), Sentiment::Negative);
/// ```
pub fn resolve_verdict(summary: &FeedbackSummary) -> Sentiment {
    let pos = summary.get(Sentiment::Positive);
    let neg = summary.get(Sentiment::Negative);
    let neu = summary.get(Sentiment::Neutral);
    let res = if pos == neg && neg == neu {
        Sentiment::Neutral
    } else if pos == neg {
        Sentiment::Neutral
    } else if pos == neu {
        Sentiment::Positive
    } else if neg == neu {
        Sentiment::Negative
    } else if pos > neg {
        Sentiment::Positive
    } else if neg > pos {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };
    debug!(
        "resolve_verdict: positive: {} negative: {} neutral: {} -> {:?}",
        pos, neg, neu, res
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(pos: u64, neg: u64, neu: u64) -> FeedbackSummary {
        let mut t = Tally::new();
        for (s, n) in [
            (Sentiment::Positive, pos),
            (Sentiment::Negative, neg),
            (Sentiment::Neutral, neu),
        ] {
            for _ in 0..n {
                t.add(s);
            }
        }
        t
    }

    fn labels(xs: &[&str]) -> Vec<RawLabel> {
        xs.iter().map(|s| RawLabel::parse(s)).collect()
    }

    struct Fixed(&'static str, &'static str);

    impl Oracle for Fixed {
        fn name(&self) -> &str {
            self.0
        }
        fn predict(&self, _text: &str) -> Result<RawLabel, OracleError> {
            Ok(RawLabel::parse(self.1))
        }
    }

    struct Broken;

    impl Oracle for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn predict(&self, _text: &str) -> Result<RawLabel, OracleError> {
            Err(OracleError("model not loaded".to_string()))
        }
    }

    #[test]
    fn verdict_all_equal() {
        assert_eq!(resolve_verdict(&summary(3, 3, 3)), Sentiment::Neutral);
        assert_eq!(resolve_verdict(&summary(0, 0, 0)), Sentiment::Neutral);
    }

    #[test]
    fn verdict_positive_negative_tie_beats_majority() {
        assert_eq!(resolve_verdict(&summary(5, 5, 2)), Sentiment::Neutral);
    }

    #[test]
    fn verdict_positive_neutral_tie() {
        assert_eq!(resolve_verdict(&summary(4, 1, 4)), Sentiment::Positive);
        // Checked before the negative count.
        assert_eq!(resolve_verdict(&summary(1, 4, 1)), Sentiment::Positive);
    }

    #[test]
    fn verdict_negative_neutral_tie() {
        assert_eq!(resolve_verdict(&summary(1, 4, 4)), Sentiment::Negative);
        assert_eq!(resolve_verdict(&summary(6, 2, 2)), Sentiment::Negative);
    }

    #[test]
    fn verdict_plain_majority() {
        assert_eq!(resolve_verdict(&summary(7, 2, 1)), Sentiment::Positive);
        assert_eq!(resolve_verdict(&summary(1, 3, 0)), Sentiment::Negative);
        // Neutral majority still compares positive and negative only.
        assert_eq!(resolve_verdict(&summary(1, 0, 9)), Sentiment::Positive);
    }

    #[test]
    fn verdict_is_idempotent() {
        let s = summary(2, 7, 3);
        assert_eq!(resolve_verdict(&s), resolve_verdict(&s.clone()));
    }

    #[test]
    fn votes_majority() {
        let rules = VoteRules::DEFAULT_RULES;
        let v = labels(&["NEGATIVE", "LABEL_0", "POSITIVE", "NEUTRAL", "0"]);
        assert_eq!(resolve_votes(&v, &rules), Ok(Sentiment::Negative));
    }

    #[test]
    fn votes_are_mapped_before_counting() {
        let rules = VoteRules::DEFAULT_RULES;
        // Three distinct raw values, but two of them are the same sentiment.
        let v = labels(&["LABEL_1", "NEUTRAL", "POSITIVE"]);
        assert_eq!(resolve_votes(&v, &rules), Ok(Sentiment::Neutral));
    }

    #[test]
    fn votes_tie_prefer_neutral() {
        let rules = VoteRules::DEFAULT_RULES;
        assert_eq!(
            resolve_votes(&labels(&["POSITIVE", "NEGATIVE"]), &rules),
            Ok(Sentiment::Neutral)
        );
        assert_eq!(
            resolve_votes(&labels(&["POSITIVE", "NEUTRAL"]), &rules),
            Ok(Sentiment::Positive)
        );
        assert_eq!(
            resolve_votes(&labels(&["NEUTRAL", "NEGATIVE"]), &rules),
            Ok(Sentiment::Negative)
        );
        assert_eq!(
            resolve_votes(&labels(&["NEUTRAL", "NEGATIVE", "POSITIVE"]), &rules),
            Ok(Sentiment::Neutral)
        );
    }

    #[test]
    fn votes_tie_label_order() {
        let rules = VoteRules {
            tiebreak_mode: TieBreakMode::UseLabelOrder,
        };
        assert_eq!(
            resolve_votes(&labels(&["NEGATIVE", "POSITIVE"]), &rules),
            Ok(Sentiment::Positive)
        );
        assert_eq!(
            resolve_votes(&labels(&["NEUTRAL", "NEGATIVE"]), &rules),
            Ok(Sentiment::Negative)
        );
    }

    #[test]
    fn votes_do_not_depend_on_order() {
        let rules = VoteRules::DEFAULT_RULES;
        let v = labels(&["POSITIVE", "NEGATIVE", "LABEL_2", "NEUTRAL", "NEGATIVE"]);
        let expected = resolve_votes(&v, &rules);
        let mut rotated = v.clone();
        for _ in 0..v.len() {
            rotated.rotate_left(1);
            assert_eq!(resolve_votes(&rotated, &rules), expected);
        }
        let mut reversed = v;
        reversed.reverse();
        assert_eq!(resolve_votes(&reversed, &rules), expected);
    }

    #[test]
    fn votes_empty() {
        assert_eq!(
            resolve_votes(&[], &VoteRules::DEFAULT_RULES),
            Err(VotingErrors::EmptyVoteSet)
        );
    }

    #[test]
    fn votes_unknown_label_is_reported() {
        let v = labels(&["POSITIVE", "4 stars"]);
        assert_eq!(
            resolve_votes(&v, &VoteRules::DEFAULT_RULES),
            Err(VotingErrors::UnmappableLabel {
                oracle: "#1".to_string(),
                label: RawLabel::Named("4 stars".to_string()),
            })
        );
        let v = labels(&["LABEL_3"]);
        assert!(matches!(
            resolve_votes(&v, &VoteRules::DEFAULT_RULES),
            Err(VotingErrors::UnmappableLabel { .. })
        ));
    }

    #[test]
    fn tally_counts_sum_to_votes() {
        let votes: Vec<OracleVote> = labels(&["POSITIVE", "LABEL_2", "negative"])
            .into_iter()
            .map(|label| OracleVote {
                oracle: "x".to_string(),
                label,
            })
            .collect();
        let t = tally_votes(&votes).unwrap();
        assert_eq!(t.total(), 3);
        assert_eq!(t.get(Sentiment::Positive), 2);
        assert_eq!(t.get(Sentiment::Negative), 1);
        assert_eq!(t.get(Sentiment::Neutral), 0);
        assert!(t.iter().all(|(_, c)| c >= 1));
    }

    #[test]
    fn ensemble_classify_all() {
        let _ = env_logger::try_init();
        let ensemble = builder::Builder::new(&VoteRules::DEFAULT_RULES)
            .oracle(Box::new(Fixed("a", "POSITIVE")))
            .oracle(Box::new(Fixed("b", "LABEL_2")))
            .oracle(Box::new(Fixed("c", "NEGATIVE")))
            .build()
            .unwrap();
        let res = ensemble.classify_all(&["good", "fine"]).unwrap();
        assert_eq!(res.labels, vec![Sentiment::Positive, Sentiment::Positive]);
        assert_eq!(res.summary.get(Sentiment::Positive), 2);
        assert_eq!(resolve_verdict(&res.summary), Sentiment::Positive);
    }

    #[test]
    fn ensemble_reports_the_failing_oracle() {
        let ensemble = builder::Builder::new(&VoteRules::DEFAULT_RULES)
            .oracle(Box::new(Fixed("a", "POSITIVE")))
            .oracle(Box::new(Fixed("stars", "5 stars")))
            .build()
            .unwrap();
        assert_eq!(
            ensemble.classify("great"),
            Err(VotingErrors::UnmappableLabel {
                oracle: "stars".to_string(),
                label: RawLabel::Named("5 stars".to_string()),
            })
        );

        let ensemble = builder::Builder::new(&VoteRules::DEFAULT_RULES)
            .oracle(Box::new(Broken))
            .build()
            .unwrap();
        assert!(matches!(
            ensemble.classify("great"),
            Err(VotingErrors::OracleFailed { oracle, .. }) if oracle == "broken"
        ));
    }

    #[test]
    fn ensemble_empty_batch() {
        let ensemble = builder::Builder::new(&VoteRules::DEFAULT_RULES)
            .oracle(Box::new(Fixed("a", "POSITIVE")))
            .build()
            .unwrap();
        let texts: Vec<String> = vec![];
        let res = ensemble.classify_all(&texts).unwrap();
        assert!(res.labels.is_empty());
        assert!(res.summary.is_empty());
        assert_eq!(resolve_verdict(&res.summary), Sentiment::Neutral);
    }

    #[test]
    fn raw_label_parsing() {
        assert_eq!(RawLabel::parse("LABEL_0"), RawLabel::ClassId(0));
        assert_eq!(RawLabel::parse(" 2 "), RawLabel::ClassId(2));
        assert_eq!(RawLabel::parse("Positive"), RawLabel::Named("Positive".to_string()));
        assert_eq!(RawLabel::parse("Positive").to_sentiment(), Some(Sentiment::Positive));
        assert_eq!(RawLabel::parse("LABEL_1").to_sentiment(), Some(Sentiment::Neutral));
        assert_eq!(RawLabel::parse("-1").to_sentiment(), None);
        for s in ["+2", "LABEL_+2", "LABEL_002", "02", "LABEL_"] {
            assert_eq!(RawLabel::parse(s), RawLabel::Named(s.to_string()));
            assert_eq!(RawLabel::parse(s).to_sentiment(), None, "{}", s);
        }
        assert_eq!(RawLabel::ClassId(7).to_string(), "LABEL_7");
    }

    #[test]
    fn summary_json_keys() {
        let s = summary(2, 0, 1);
        let js = serde_json::to_string(&s).unwrap();
        assert_eq!(js, r#"{"POSITIVE":2,"NEUTRAL":1}"#);
        let back: FeedbackSummary = serde_json::from_str(&js).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn verdict_codes() {
        assert_eq!(Sentiment::Negative.code(), 0);
        assert_eq!(Sentiment::Positive.code(), 1);
        assert_eq!(Sentiment::Neutral.code(), 2);
        assert_eq!(Sentiment::from_code(-1), None);
        for s in Sentiment::ALL {
            assert_eq!(Sentiment::from_code(s.code()), Some(s));
        }
    }
}
