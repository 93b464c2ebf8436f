use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldbookError {
    #[error("Unknown attribute type: {0}")]
    UnknownAttributeType(String),

    #[error("Invalid pattern for attribute '{attribute}': {source}")]
    InvalidPattern {
        attribute: String,
        #[source]
        source: regex::Error,
    },

    #[error("No row was found for {0}")]
    NoResultFound(String),

    #[error("Multiple rows were found for {0}")]
    MultipleResultsFound(String),

    #[error("Destination path is required")]
    MissingUploadPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FieldbookError>;
