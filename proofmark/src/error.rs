/// Errors raised while building or diffing documents.
///
/// Any error aborts the whole operation; no partial output is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A structural invariant of the document tree or the event stream was
    /// violated.
    #[error("invalid tree: {reason}")]
    InvalidTree {
        /// What went wrong.
        reason: String,
    },

    /// A leaf, atom or ancestor lookup went past the end of its collection.
    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Size of the collection.
        size: usize,
    },

    /// The settings ask for an engine or mode that is not implemented.
    #[error("unsupported setting: {setting}")]
    UnsupportedSetting {
        /// Name of the offending setting.
        setting: &'static str,
    },
}

impl DiffError {
    pub(crate) fn invalid_tree(reason: impl Into<String>) -> Self {
        DiffError::InvalidTree {
            reason: reason.into(),
        }
    }
}

impl From<snakepit::Error> for DiffError {
    fn from(err: snakepit::Error) -> Self {
        match err {
            snakepit::Error::UnsupportedSetting { setting } => {
                DiffError::UnsupportedSetting { setting }
            }
        }
    }
}

impl From<indextree::NodeError> for DiffError {
    fn from(err: indextree::NodeError) -> Self {
        DiffError::invalid_tree(err.to_string())
    }
}

/// Result type of the diffing core.
pub type Result<T, E = DiffError> = core::result::Result<T, E>;
