use thiserror::Error;

/// Broad classification of a [`LexibayesError`].
///
/// Both kinds are caller misuse: fix the input and call again. Neither is retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed shapes or an unusable vocabulary.
    InvalidInput,
    /// Prediction requested before the model was trained.
    UntrainedModel,
}

#[derive(Debug, Error)]
pub enum LexibayesError {
    /// Shape or dimensionality mismatch
    #[error("shape mismatch: {expected}, {got}")]
    ShapeMismatch { expected: String, got: String },

    /// The vocabulary has no terms, so there are no feature columns.
    #[error("vocabulary is empty")]
    EmptyVocabulary,

    /// The training dataset contains zero documents.
    #[error("training data contains zero documents")]
    EmptyTrainingData,

    /// A term was given twice to a strict vocabulary constructor.
    #[error("duplicate vocabulary term `{0}`")]
    DuplicateTerm(String),

    /// Model used before calling `fit`
    #[error("model used before calling `fit`")]
    NotFitted,
}

impl LexibayesError {
    /// Returns whether this error is an input problem or an untrained model.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LexibayesError::NotFitted => ErrorKind::UntrainedModel,
            LexibayesError::ShapeMismatch { .. }
            | LexibayesError::EmptyVocabulary
            | LexibayesError::EmptyTrainingData
            | LexibayesError::DuplicateTerm(_) => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, LexibayesError>;
