pub use crate::config::*;
use crate::{Ensemble, Oracle};

/// A builder for assembling an ensemble of oracles.
///
/// The oracles are constructed by the caller, once, and moved into the
/// ensemble.
///
/// ```
/// use sentiment_vote::builder::Builder;
/// use sentiment_vote::polarity::{PolarityOracle, Threshold};
/// use sentiment_vote::{Sentiment, VoteRules, VotingErrors};
///
/// let ensemble = Builder::new(&VoteRules::DEFAULT_RULES)
///     .oracle(Box::new(PolarityOracle::new("length", Threshold::Strict, |t: &str| {
///         t.len() as f64 - 5.0
///     })))
///     .build()?;
///
/// assert_eq!(ensemble.classify("excellent")?.label, Sentiment::Positive);
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: VoteRules,
    pub(crate) _oracles: Vec<Box<dyn Oracle>>,
}

impl Builder {
    pub fn new(rules: &VoteRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _oracles: Vec::new(),
        }
    }

    /// Adds an oracle to the ensemble.
    pub fn oracle(mut self, oracle: Box<dyn Oracle>) -> Builder {
        self._oracles.push(oracle);
        self
    }

    pub fn oracles(mut self, oracles: Vec<Box<dyn Oracle>>) -> Builder {
        self._oracles.extend(oracles);
        self
    }

    /// Fails if no oracle was added: an ensemble always produces votes.
    pub fn build(self) -> Result<Ensemble, VotingErrors> {
        if self._oracles.is_empty() {
            return Err(VotingErrors::EmptyEnsemble);
        }
        Ok(Ensemble {
            oracles: self._oracles,
            rules: self._rules,
        })
    }
}
