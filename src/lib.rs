pub mod cli;

// Re-export public API
pub use lexibayes_core::*;
pub use lexibayes_models::*;
