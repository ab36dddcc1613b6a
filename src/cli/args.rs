//! Command line argument parsing using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use lexibayes_models::TermWeighting;
use std::path::PathBuf;

/// Train and evaluate a multinomial Naive Bayes text classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "lexibayes")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LexibayesArgs {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl LexibayesArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train on one labelled file and report accuracy on another
    Evaluate(EvaluateArgs),

    /// Train on a labelled file and print one predicted label per input line
    Predict(PredictArgs),
}

/// Arguments for `evaluate`
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Training file, one `label<TAB>text` document per line
    #[arg(long)]
    pub train: PathBuf,

    /// Held-out file in the same format
    #[arg(long)]
    pub test: PathBuf,

    /// How repeated terms in a query document are scored
    #[arg(long, value_enum, default_value_t = Weighting::Presence)]
    pub weighting: Weighting,
}

/// Arguments for `predict`
#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    /// Training file, one `label<TAB>text` document per line
    #[arg(long)]
    pub train: PathBuf,

    /// Unlabelled documents, one per line
    #[arg(long)]
    pub input: PathBuf,

    /// How repeated terms in a query document are scored
    #[arg(long, value_enum, default_value_t = Weighting::Presence)]
    pub weighting: Weighting,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Each distinct term counts once
    Presence,
    /// Terms are weighted by how often they occur
    Count,
}

impl From<Weighting> for TermWeighting {
    fn from(w: Weighting) -> Self {
        match w {
            Weighting::Presence => TermWeighting::Presence,
            Weighting::Count => TermWeighting::Count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate_defaults() {
        let args = LexibayesArgs::try_parse_from([
            "lexibayes", "evaluate", "--train", "a.tsv", "--test", "b.tsv",
        ])
        .unwrap();

        assert_eq!(args.verbosity(), 1);
        match args.command {
            Command::Evaluate(e) => {
                assert_eq!(e.train, PathBuf::from("a.tsv"));
                assert_eq!(e.weighting, Weighting::Presence);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_predict_with_count_weighting() {
        let args = LexibayesArgs::try_parse_from([
            "lexibayes", "-vv", "predict", "--train", "a.tsv", "--input", "q.txt",
            "--weighting", "count",
        ])
        .unwrap();

        assert_eq!(args.verbosity(), 3);
        match args.command {
            Command::Predict(p) => {
                assert_eq!(TermWeighting::from(p.weighting), TermWeighting::Count)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = LexibayesArgs::try_parse_from([
            "lexibayes", "-q", "-v", "predict", "--train", "a", "--input", "b",
        ])
        .unwrap();
        assert_eq!(args.verbosity(), 0);
    }
}
