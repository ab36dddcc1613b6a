//! Command line front end: a reference caller that tokenizes labelled text files,
//! builds a vocabulary, and drives the classifier.

pub mod args;
pub mod commands;

pub use args::LexibayesArgs;
pub use commands::execute_command;
