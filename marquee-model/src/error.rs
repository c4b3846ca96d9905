use std::fmt::{self, Display};

/// Errors produced by model constructors and parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownSortDirection(String),
    UnknownOrderCategory(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownSortDirection(raw) => {
                write!(f, "unknown sort direction: {raw}")
            }
            ModelError::UnknownOrderCategory(raw) => {
                write!(f, "unknown order category: {raw}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
