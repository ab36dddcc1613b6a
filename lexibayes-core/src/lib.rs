pub mod error;
pub mod logspace;
pub mod types;
pub mod vocabulary;

pub use types::{Count, CountMatrix, Float, Label, Matrix, Predictions, Vector};

pub use error::{ErrorKind, LexibayesError, Result};

pub use logspace::{argmax_first, log_sum_exp};
pub use vocabulary::Vocabulary;
