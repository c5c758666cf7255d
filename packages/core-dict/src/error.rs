//! Error types for the container layer.

/// Errors raised by containers, prototypes and the event dispatcher.
///
/// Lookups have exactly one failure kind, [`Error::KeyNotFound`]. The other
/// variants carry failures raised by collaborators (hooks, subscribers) or by
/// typed conversions layered on top of the mapping.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Neither the own store nor the prototype chain holds the key.
    #[error("\"{key}\" key not found eventually")]
    KeyNotFound { key: String },

    /// A computed-access or computed-assignment hook failed.
    #[error("hook for '{key}' failed: {message}")]
    Hook { key: String, message: String },

    /// A value did not have the expected type.
    #[error("expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: &'static str,
    },

    /// A shared prototype is mutably borrowed by another holder.
    #[error("prototype is busy")]
    PrototypeBusy,

    /// Generic error with message.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a key-not-found error for `key`.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Error::KeyNotFound { key: key.into() }
    }

    /// Create a hook failure for `key`.
    pub fn hook(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Hook {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other {
            message: message.into(),
        }
    }

    /// True for [`Error::KeyNotFound`].
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound { .. })
    }
}
