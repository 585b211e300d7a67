use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown grade symbol '{symbol}' for index {index} in {module} results")]
    UnknownGrade {
        module: String,
        index: u32,
        symbol: String,
    },

    #[error("roster has no entries for course '{0}'")]
    MissingRoster(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RankError>;
