//! Error types for call dispatch

use thiserror::Error;

/// Result type alias for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// A method cannot be turned into a call descriptor.
///
/// These are raised while a descriptor is built, before anything reaches the
/// database, and are never cached.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no method named {0} in the procedure interface")]
    UnknownMethod(String),

    #[error("{method}: parameter {index} has no name and name-based binding is configured")]
    UnresolvedParameterName { method: String, index: usize },

    #[error("{method}: output parameter has no name and name-based binding is configured")]
    UnresolvedOutParameterName { method: String },

    #[error("{method}: cannot resolve the element type of {}", describe_slot(*.index))]
    UnresolvedElementType { method: String, index: Option<usize> },

    #[error("{method}: declares both an output parameter and a return value")]
    AmbiguousOutput { method: String },

    #[error("{method}: declares a return value slot but returns nothing")]
    MissingReturnType { method: String },

    #[error("{method}: output index {index} is outside 1..={max}")]
    InvalidOutIndex {
        method: String,
        index: usize,
        max: usize,
    },

    #[error("{method}: {count} placeholders exceed the 254 usable positions")]
    TooManyParameters { method: String, count: usize },

    #[error("no type mapping for {0}")]
    UnsupportedType(String),

    #[error("invalid caller configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

fn describe_slot(index: Option<usize>) -> String {
    match index {
        Some(index) => format!("parameter {}", index),
        None => "the return type".to_string(),
    }
}

/// Error raised by an invocation
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scalar or array result did not come from exactly one row
    #[error("incorrect result size: expected {expected}, actual {actual}")]
    IncorrectResultSize { expected: usize, actual: usize },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("array element {index} is NULL but the declared element type is not nullable")]
    NullElement { index: usize },

    #[error("no output parameter is registered to read the result from")]
    NoOutParameter,

    #[error("{method} takes {expected} arguments, {actual} supplied")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("argument {index} must be a {expected}")]
    ArgumentShape { index: usize, expected: &'static str },

    /// Translated backend failure
    #[error("call to {procedure} using \"{call}\" failed: {source}")]
    CallFailed {
        procedure: String,
        call: String,
        #[source]
        source: sprocket_core::Error,
    },

    /// Untranslated backend failure
    #[error(transparent)]
    Backend(#[from] sprocket_core::Error),

    /// A failure followed by further failures while releasing resources
    #[error("{primary}")]
    Suppressed {
        primary: Box<DispatchError>,
        suppressed: Vec<DispatchError>,
    },
}

impl DispatchError {
    /// Attach secondary failures. Returns `self` unchanged when `more` is empty.
    pub fn with_suppressed(self, more: Vec<DispatchError>) -> DispatchError {
        if more.is_empty() {
            return self;
        }
        match self {
            DispatchError::Suppressed {
                primary,
                mut suppressed,
            } => {
                suppressed.extend(more);
                DispatchError::Suppressed {
                    primary,
                    suppressed,
                }
            }
            other => DispatchError::Suppressed {
                primary: Box::new(other),
                suppressed: more,
            },
        }
    }

    /// The failure that surfaced first
    pub fn primary(&self) -> &DispatchError {
        match self {
            DispatchError::Suppressed { primary, .. } => primary,
            other => other,
        }
    }

    /// Failures that happened after the primary one
    pub fn suppressed(&self) -> &[DispatchError] {
        match self {
            DispatchError::Suppressed { suppressed, .. } => suppressed,
            _ => &[],
        }
    }

    /// The backend error behind this failure, translated or not
    pub fn backend_error(&self) -> Option<&sprocket_core::Error> {
        match self.primary() {
            DispatchError::CallFailed { source, .. } => Some(source),
            DispatchError::Backend(source) => Some(source),
            _ => None,
        }
    }

    pub(crate) fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        DispatchError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Fold the outcome of a cleanup step into the outcome of the work it followed
pub(crate) fn merge_cleanup<T>(
    result: DispatchResult<T>,
    cleanup: DispatchResult<()>,
) -> DispatchResult<T> {
    match (result, cleanup) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(error)) => Err(error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(cleanup_error)) => {
            tracing::warn!(error = %cleanup_error, "cleanup failed after an earlier error");
            Err(error.with_suppressed(vec![cleanup_error]))
        }
    }
}
