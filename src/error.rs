use thiserror::Error;

/// Failure modes of the batch pipeline. Schema and validation problems are
/// never retried; they indicate bad input rather than transient conditions.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("column '{0}' not found in the input header")]
    MissingColumn(String),

    #[error("row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("no review rows for category '{0}'")]
    EmptyCategory(String),

    #[error("none of the chosen items {choices:?} appear in the item universe")]
    NoChoiceOverlap { choices: Vec<String> },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
