use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrokeForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Key '{0}' is not on the layout")]
    MissingKey(char),

    #[error("Invalid remap: {0}")]
    InvalidRemap(String),

    #[error("Illegal remap: '{key}' (freq {freq:.4}) exceeds cap {cap:.4} at {pos}")]
    IllegalRemap {
        key: char,
        pos: crate::geometry::Pos,
        freq: f64,
        cap: f64,
    },

    #[error("No legal move found after {attempts} attempts")]
    NoLegalMove { attempts: usize },

    #[error("Thread Pool Error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type SfResult<T> = Result<T, StrokeForgeError>;
