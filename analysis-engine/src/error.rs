use thiserror::Error;

/// Why a numeric sequence could not be summarised.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsError {
    #[error("Dataset is empty. Please select a valid dataset.")]
    EmptyDataset,

    #[error("No valid numeric values found in the dataset.")]
    NoValidValues,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Statistics(#[from] StatisticsError),

    #[error("Dataset not found: {dataset_id}")]
    DatasetNotFound { dataset_id: String },

    #[error("Column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("Invalid CSV data: {message}")]
    InvalidCsv { message: String },

    #[error("A chat request is already in flight")]
    RequestInFlight,

    #[error("Relay responded with status {status}")]
    RelayStatus { status: u16 },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        AnalysisError::InvalidCsv {
            message: err.to_string(),
        }
    }
}
