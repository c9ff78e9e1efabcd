use polars::error::PolarsError;
use thiserror::Error;

/// Errors produced by the fare pipeline.
#[derive(Debug, Error)]
pub enum FareError {
    #[error("data loading error: {0}")]
    DataLoading(#[from] PolarsError),

    /// A column that every stage requires carries null values.
    #[error("column '{column}' contains missing values")]
    MissingValue { column: String },

    /// A fit was attempted on data with no rows.
    #[error("input data has no rows")]
    EmptyData,

    #[error("model error: {0}")]
    Model(String),

    #[error("model serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
