use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The structure-definition document is not well-formed markup.
    #[error("malformed structure definition at byte {position}: {msg}")]
    Markup { position: u64, msg: String },

    /// The document is well-formed but does not describe a valid structure.
    #[error("invalid structure definition: {reason}")]
    InvalidDefinition { reason: String },

    #[error("{path} is not part of the application structure")]
    NotPartOfStructure { path: String },

    #[error(
        "too many directories at {key}: {} found, {limit} allowed ({})",
        actual_names.len(),
        actual_names.join(", ")
    )]
    TooManySiblings {
        key: String,
        limit: u32,
        actual_names: Vec<String>,
    },

    #[error("{path}: no nest rule allows a child at position {position}")]
    ChildNotAllowed { path: String, position: String },

    #[error("{path}: too many nested directories, {limit} allowed")]
    TooManyChildren { path: String, limit: u32 },

    #[error("{path} is missing required child {name:?}")]
    MissingRequiredChild { path: String, name: String },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidDefinition {
            reason: reason.into(),
        }
    }

    /// Stable identifier used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Io { .. } => "io",
            Error::Markup { .. } => "malformed_definition",
            Error::InvalidDefinition { .. } => "invalid_definition",
            Error::NotPartOfStructure { .. } => "not_part_of_structure",
            Error::TooManySiblings { .. } => "too_many_siblings",
            Error::ChildNotAllowed { .. } => "child_not_allowed",
            Error::TooManyChildren { .. } => "too_many_children",
            Error::MissingRequiredChild { .. } => "missing_required_child",
        }
    }

    /// Whether this error rejects a single path rather than aborting the run.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NotPartOfStructure { .. }
                | Error::TooManySiblings { .. }
                | Error::ChildNotAllowed { .. }
                | Error::TooManyChildren { .. }
                | Error::MissingRequiredChild { .. }
        )
    }
}
