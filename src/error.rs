use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvonetError {
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Size mismatch: expected {expected} parameters, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Population too small: need at least {required} individuals, got {actual}")]
    PopulationTooSmall { required: usize, actual: usize },

    #[error("Task {index} failed: {message}")]
    TaskFailure { index: usize, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Training driver thread panicked")]
    DriverPanicked,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl EvonetError {
    /// Shape mismatch between two `rows x cols` shapes.
    pub fn shape(expected: (usize, usize), actual: (usize, usize)) -> Self {
        EvonetError::ShapeMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }

    /// Shape mismatch between two flat lengths.
    pub fn length(expected: usize, actual: usize) -> Self {
        EvonetError::ShapeMismatch {
            expected: format!("length {}", expected),
            actual: format!("length {}", actual),
        }
    }
}

pub type Result<T> = std::result::Result<T, EvonetError>;
