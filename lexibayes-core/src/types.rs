pub type Float = f64;
pub type Matrix = nalgebra::DMatrix<Float>;
pub type Vector = nalgebra::DVector<Float>;

/// Occurrence count of a single term in a single document.
pub type Count = u32;

/// Document-by-term count matrix. Rows are documents, columns follow vocabulary order.
pub type CountMatrix = nalgebra::DMatrix<Count>;

/// Default integer class label.
pub type Label = usize;
pub type Predictions = Vec<Label>;
