//! Domain error types.

/// Top-level error type for stockfolio.
#[derive(Debug, thiserror::Error)]
pub enum StockfolioError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("price provider error: {reason}")]
    PriceProvider { reason: String },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockfolioError {
    pub fn holding_not_found(id: i64) -> Self {
        StockfolioError::NotFound {
            entity: "Stock",
            id: id.to_string(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        StockfolioError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<&StockfolioError> for std::process::ExitCode {
    fn from(err: &StockfolioError) -> Self {
        let code: u8 = match err {
            StockfolioError::Io(_) => 1,
            StockfolioError::ConfigParse { .. }
            | StockfolioError::ConfigMissing { .. }
            | StockfolioError::ConfigInvalid { .. } => 2,
            StockfolioError::Database { .. } | StockfolioError::DatabaseQuery { .. } => 3,
            StockfolioError::InvalidInput { .. } | StockfolioError::Csv { .. } => 4,
            StockfolioError::PriceProvider { .. } => 5,
            StockfolioError::NotFound { .. } => 6,
            StockfolioError::Forbidden { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
