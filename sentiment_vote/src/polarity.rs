// Oracles built from a numeric polarity score.

use crate::{Oracle, OracleError, RawLabel, Sentiment};

/// How a polarity score is cut into three categories.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Threshold {
    /// Positive above 0, negative below 0, neutral at exactly 0.
    Strict,
    /// Positive at or above the bound, negative at or below its opposite,
    /// neutral in between. Compound scores typically use 0.05.
    Band(f64),
}

impl Threshold {
    pub fn classify(&self, score: f64) -> Sentiment {
        match *self {
            Threshold::Strict if score > 0.0 => Sentiment::Positive,
            Threshold::Strict if score < 0.0 => Sentiment::Negative,
            Threshold::Strict => Sentiment::Neutral,
            Threshold::Band(b) if score >= b => Sentiment::Positive,
            Threshold::Band(b) if score <= -b => Sentiment::Negative,
            Threshold::Band(_) => Sentiment::Neutral,
        }
    }
}

/// An oracle that scores a text and applies a threshold to the score.
pub struct PolarityOracle<F> {
    name: String,
    threshold: Threshold,
    scorer: F,
}

impl<F> PolarityOracle<F>
where
    F: Fn(&str) -> f64,
{
    pub fn new(name: &str, threshold: Threshold, scorer: F) -> PolarityOracle<F> {
        PolarityOracle {
            name: name.to_string(),
            threshold,
            scorer,
        }
    }
}

impl<F> Oracle for PolarityOracle<F>
where
    F: Fn(&str) -> f64,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, text: &str) -> Result<RawLabel, OracleError> {
        let score = (self.scorer)(text);
        if score.is_nan() {
            return Err(OracleError(format!("score is not a number for {:?}", text)));
        }
        Ok(self.threshold.classify(score).into())
    }
}
