// The oracles that can be declared in the configuration.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use sentiment_vote::polarity::{PolarityOracle, Threshold};
use sentiment_vote::{Oracle, OracleError, RawLabel};

use crate::feedback::config_reader::OracleSource;
use crate::feedback::*;

// Word weights in [-1, 1].
const BUILTIN_WORDS: &[(&str, f64)] = &[
    ("amazing", 0.9),
    ("approachable", 0.6),
    ("best", 0.8),
    ("brilliant", 0.9),
    ("clear", 0.5),
    ("engaging", 0.7),
    ("enjoyed", 0.6),
    ("excellent", 0.9),
    ("fair", 0.3),
    ("good", 0.5),
    ("great", 0.7),
    ("helpful", 0.6),
    ("inspiring", 0.8),
    ("interesting", 0.5),
    ("knowledgeable", 0.6),
    ("love", 0.8),
    ("organized", 0.4),
    ("patient", 0.5),
    ("recommend", 0.6),
    ("supportive", 0.6),
    ("useful", 0.5),
    ("well", 0.3),
    ("awful", -0.9),
    ("bad", -0.6),
    ("boring", -0.6),
    ("confusing", -0.6),
    ("disorganized", -0.6),
    ("dull", -0.5),
    ("hard", -0.2),
    ("late", -0.3),
    ("poor", -0.6),
    ("rude", -0.8),
    ("slow", -0.3),
    ("terrible", -0.9),
    ("unclear", -0.5),
    ("unfair", -0.6),
    ("unhelpful", -0.6),
    ("useless", -0.8),
    ("waste", -0.7),
    ("worst", -0.9),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "hardly", "isn't", "wasn't", "don't", "didn't"];

/// Scores a text as the mean weight of the words it contains from a lexicon.
/// A negation flips the sign of the next word from the lexicon.
#[derive(PartialEq, Debug, Clone)]
pub struct LexiconScorer {
    weights: HashMap<String, f64>,
}

impl LexiconScorer {
    pub fn builtin() -> LexiconScorer {
        LexiconScorer {
            weights: BUILTIN_WORDS
                .iter()
                .map(|(w, s)| (w.to_string(), *s))
                .collect(),
        }
    }

    pub fn with_words(mut self, words: &HashMap<String, f64>) -> LexiconScorer {
        for (w, s) in words.iter() {
            self.weights.insert(w.to_lowercase(), *s);
        }
        self
    }

    pub fn score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut total = 0.0;
        let mut matched = 0;
        let mut negated = false;
        for token in lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
        {
            if NEGATIONS.contains(&token) {
                negated = true;
            } else if let Some(w) = self.weights.get(token) {
                total += if negated { -w } else { *w };
                matched += 1;
                negated = false;
            }
        }
        if matched == 0 {
            0.0
        } else {
            total / matched as f64
        }
    }
}

/// Runs an external classifier: the text is written on its standard input,
/// and it must print one label on its standard output.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CommandOracle {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandOracle {
    pub fn new(name: &str, program: &str, args: &[String]) -> CommandOracle {
        CommandOracle {
            name: name.to_string(),
            program: program.to_string(),
            args: args.to_vec(),
        }
    }
}

impl Oracle for CommandOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, text: &str) -> Result<RawLabel, OracleError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| OracleError(format!("cannot start {}: {}", self.program, e)))?;
        // Fed from its own thread: the pipes would fill up otherwise.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.to_string();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });
        let output = child
            .wait_with_output()
            .map_err(|e| OracleError(format!("{} did not complete: {}", self.program, e)))?;
        if !output.status.success() {
            return Err(OracleError(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if let Some(writer) = writer {
            let written = writer
                .join()
                .map_err(|_| OracleError(format!("cannot write to {}", self.program)))?;
            match written {
                // The classifier answered without reading all the text.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(OracleError(format!("cannot write to {}: {}", self.program, e)))
                }
                Ok(()) => {}
            }
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        debug!("CommandOracle {}: output {:?}", self.name, line);
        Ok(RawLabel::parse(line))
    }
}

/// The ensemble used when the configuration does not declare any oracle.
pub fn default_oracles() -> Vec<Box<dyn Oracle>> {
    vec![
        lexicon_oracle("lexicon-compound", Threshold::Band(0.05), LexiconScorer::builtin()),
        lexicon_oracle("lexicon-polarity", Threshold::Strict, LexiconScorer::builtin()),
        lexicon_oracle("lexicon-strong", Threshold::Band(0.5), LexiconScorer::builtin()),
    ]
}

pub fn build_oracles(sources: &[OracleSource]) -> FeedbackResult<Vec<Box<dyn Oracle>>> {
    let mut res: Vec<Box<dyn Oracle>> = Vec::new();
    for src in sources.iter() {
        let oracle: Box<dyn Oracle> = match src.kind.as_str() {
            "lexicon" => {
                let mut scorer = LexiconScorer::builtin();
                if let Some(words) = &src.words {
                    scorer = scorer.with_words(words);
                }
                lexicon_oracle(&src.name, src.threshold()?, scorer)
            }
            "command" => {
                let program = match &src.program {
                    Some(p) => p,
                    None => whatever!("oracle {}: a command oracle needs a program", src.name),
                };
                Box::new(CommandOracle::new(
                    &src.name,
                    program,
                    src.args.as_deref().unwrap_or(&[]),
                ))
            }
            x => whatever!("oracle {}: unknown kind {:?}", src.name, x),
        };
        res.push(oracle);
    }
    Ok(res)
}

fn lexicon_oracle(name: &str, threshold: Threshold, scorer: LexiconScorer) -> Box<dyn Oracle> {
    Box::new(PolarityOracle::new(name, threshold, move |t: &str| {
        scorer.score(t)
    }))
}
