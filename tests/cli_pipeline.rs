use std::io::Write;

use lexibayes::cli::commands::{evaluate, predict_documents, read_labeled, read_unlabeled, train};
use lexibayes::{ErrorKind, LexibayesError, TermWeighting};
use tempfile::NamedTempFile;

const TRAIN: &str = "\
sports\tthe team won the match in the final minute
sports\tgoal scored by the striker in the match
sports\tcoach praises team after league win
tech\tnew processor doubles compiler speed
tech\tthe compiler release adds a faster linker
tech\tprocessor cache and memory speed benchmarks
";

const TEST: &str = "\
sports\tstriker scored in the league final
tech\tlinker and compiler benchmarks
";

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn evaluate_from_files() {
    let train_file = write_temp(TRAIN);
    let test_file = write_temp(TEST);

    let train_docs = read_labeled(train_file.path()).unwrap();
    let test_docs = read_labeled(test_file.path()).unwrap();
    assert_eq!(train_docs.len(), 6);

    for weighting in [TermWeighting::Presence, TermWeighting::Count] {
        let report = evaluate(&train_docs, &test_docs, weighting).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.correct, 2);
        assert_eq!(report.accuracy(), 1.0);
    }
}

#[test]
fn predict_unlabelled_file() {
    let train_file = write_temp(TRAIN);
    let input_file = write_temp("faster processor memory\n\nteam match goal\n");

    let model = train(&read_labeled(train_file.path()).unwrap(), TermWeighting::Presence).unwrap();
    let docs = read_unlabeled(input_file.path()).unwrap();
    assert_eq!(docs.len(), 2);

    let labels = predict_documents(&model, &docs).unwrap();
    assert_eq!(labels, vec!["tech", "sports"]);
}

#[test]
fn vocabulary_is_shared_with_model() {
    let train_file = write_temp(TRAIN);
    let model = train(&read_labeled(train_file.path()).unwrap(), TermWeighting::Presence).unwrap();

    let vocabulary = model.vocabulary().unwrap();
    assert_eq!(model.n_features(), vocabulary.len());
    assert_eq!(vocabulary.term(0), Some("the"));
    assert_eq!(model.classes().unwrap(), &["sports".to_string(), "tech".to_string()]);

    // A matrix built against a different vocabulary is rejected, not truncated.
    let narrow = lexibayes::Vocabulary::new(["team"]).unwrap();
    let x = narrow.count_vector(["team"]);
    let x = lexibayes::CountMatrix::from_row_slice(1, x.len(), &x);
    let err = model.predict(&x).unwrap_err();
    assert!(matches!(err, LexibayesError::ShapeMismatch { .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn missing_file_is_reported() {
    let err = read_labeled(std::path::Path::new("/definitely/not/here.tsv")).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.tsv"));
}
