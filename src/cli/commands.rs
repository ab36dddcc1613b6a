//! Command implementations for the lexibayes CLI.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use lexibayes_core::Vocabulary;
use lexibayes_models::{MultinomialNB, TermWeighting};
use log::{debug, info};

use super::args::{Command, EvaluateArgs, LexibayesArgs, PredictArgs};

/// A tokenized training or test document with its class label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledDocument {
    pub label: String,
    pub tokens: Vec<String>,
}

/// Lowercases `text` and splits it on anything that is not alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Parses `label<TAB>text` lines. Blank lines are skipped.
///
/// `source` names the input in error messages.
pub fn parse_labeled(contents: &str, source: &str) -> Result<Vec<LabeledDocument>> {
    let mut docs = Vec::new();

    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let Some((label, text)) = line.split_once('\t') else {
            bail!("{}:{}: expected `label<TAB>text`", source, lineno + 1);
        };

        let label = label.trim();
        if label.is_empty() {
            bail!("{}:{}: empty label", source, lineno + 1);
        }

        docs.push(LabeledDocument {
            label: label.to_owned(),
            tokens: tokenize(text),
        });
    }

    Ok(docs)
}

pub fn read_labeled(path: &Path) -> Result<Vec<LabeledDocument>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let docs = parse_labeled(&contents, &path.display().to_string())?;
    info!("loaded {} labelled documents from {}", docs.len(), path.display());
    Ok(docs)
}

/// Reads one unlabelled document per non-blank line.
pub fn read_unlabeled(path: &Path) -> Result<Vec<Vec<String>>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let docs: Vec<Vec<String>> = contents
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(tokenize)
        .collect();
    info!("loaded {} documents from {}", docs.len(), path.display());
    Ok(docs)
}

/// Builds the vocabulary from `train` and fits a model over it.
pub fn train(train: &[LabeledDocument], weighting: TermWeighting) -> Result<MultinomialNB<String>> {
    let vocabulary = Vocabulary::from_tokens(train.iter().flat_map(|d| d.tokens.iter()));
    debug!("vocabulary has {} terms", vocabulary.len());

    let rows: Vec<&[String]> = train.iter().map(|d| d.tokens.as_slice()).collect();
    let x = vocabulary.count_matrix(&rows);
    let y: Vec<String> = train.iter().map(|d| d.label.clone()).collect();

    let mut model = MultinomialNB::new().with_weighting(weighting);
    model
        .fit(&vocabulary, &x, &y)
        .context("training the classifier failed")?;
    Ok(model)
}

/// Predicts labels for tokenized documents with the model's own vocabulary.
pub fn predict_documents<D: AsRef<[String]>>(
    model: &MultinomialNB<String>,
    docs: &[D],
) -> Result<Vec<String>> {
    let Some(vocabulary) = model.vocabulary() else {
        bail!("model has not been trained");
    };
    let x = vocabulary.count_matrix(docs);
    Ok(model.predict(&x)?)
}

/// Per-class outcome of an evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReport {
    pub label: String,
    pub support: usize,
    pub correct: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub total: usize,
    pub correct: usize,
    /// Ordered by first appearance in the test set.
    pub classes: Vec<ClassReport>,
}

impl Evaluation {
    /// Fraction of correctly classified documents, `0.0` for an empty test set.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Trains on `train`, predicts `test`, and tallies the results.
pub fn evaluate(
    train_docs: &[LabeledDocument],
    test_docs: &[LabeledDocument],
    weighting: TermWeighting,
) -> Result<Evaluation> {
    let model = train(train_docs, weighting)?;

    let rows: Vec<&[String]> = test_docs.iter().map(|d| d.tokens.as_slice()).collect();
    let predicted = predict_documents(&model, &rows)?;

    let mut classes: Vec<ClassReport> = Vec::new();
    let mut correct = 0;

    for (doc, pred) in test_docs.iter().zip(&predicted) {
        let hit = doc.label == *pred;
        if hit {
            correct += 1;
        }

        let idx = match classes.iter().position(|c| c.label == doc.label) {
            Some(idx) => idx,
            None => {
                classes.push(ClassReport {
                    label: doc.label.clone(),
                    support: 0,
                    correct: 0,
                });
                classes.len() - 1
            }
        };
        classes[idx].support += 1;
        if hit {
            classes[idx].correct += 1;
        }
    }

    Ok(Evaluation {
        total: test_docs.len(),
        correct,
        classes,
    })
}

fn run_evaluate(args: &EvaluateArgs) -> Result<()> {
    let train_docs = read_labeled(&args.train)?;
    let test_docs = read_labeled(&args.test)?;

    let report = evaluate(&train_docs, &test_docs, args.weighting.into())?;

    println!(
        "accuracy: {:.4} ({}/{})",
        report.accuracy(),
        report.correct,
        report.total
    );
    for class in &report.classes {
        println!(
            "  {:<20} {:>6}/{:<6}",
            class.label, class.correct, class.support
        );
    }
    Ok(())
}

fn run_predict(args: &PredictArgs) -> Result<()> {
    let train_docs = read_labeled(&args.train)?;
    let model = train(&train_docs, args.weighting.into())?;

    let docs = read_unlabeled(&args.input)?;
    for label in predict_documents(&model, &docs)? {
        println!("{label}");
    }
    Ok(())
}

/// Runs the parsed command.
pub fn execute_command(args: LexibayesArgs) -> Result<()> {
    match &args.command {
        Command::Evaluate(a) => run_evaluate(a),
        Command::Predict(a) => run_predict(a),
    }
}
