use thiserror::Error;

pub type Result<T> = std::result::Result<T, LeadflowError>;

#[derive(Debug, Error)]
pub enum LeadflowError {
    #[error("Lead not found: {0}")]
    LeadNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid lead ID format: {0}")]
    InvalidLeadId(String),

    #[error("Index {index} out of bounds for column {column} ({len} leads)")]
    IndexOutOfBounds {
        column: String,
        index: usize,
        len: usize,
    },

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("You can have a maximum of {0} stages.")]
    TooManyStages(usize),

    #[error("You need at least {0} stages in your pipeline.")]
    TooFewStages(usize),

    #[error("All stages must have names.")]
    EmptyStageTitle,

    #[error("Stage names must be unique.")]
    DuplicateStageTitle(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LeadflowError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Errors that callers drop silently after logging: the referenced
    /// lead, column or position no longer exists.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            Self::LeadNotFound(_)
                | Self::ColumnNotFound(_)
                | Self::InvalidLeadId(_)
                | Self::IndexOutOfBounds { .. }
        )
    }

    /// Errors whose message is shown to the user as a blocking warning.
    pub fn is_user_warning(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::TooManyStages(_)
                | Self::TooFewStages(_)
                | Self::EmptyStageTitle
                | Self::DuplicateStageTitle(_)
        )
    }
}
