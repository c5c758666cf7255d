//! Errors raised while lexing, parsing or evaluating an expression.

/// Expression failures.
///
/// Unresolved names keep their container error, so a missing entry still
/// surfaces as [`datadict_core::Error::KeyNotFound`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("invalid token at {position}: {text}")]
    Lex { position: usize, text: String },

    #[error("parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("{message}")]
    Eval { message: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("{name}() takes {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error(transparent)]
    Lookup(#[from] datadict_core::Error),
}

impl ExprError {
    pub(crate) fn eval(message: impl Into<String>) -> Self {
        ExprError::Eval {
            message: message.into(),
        }
    }

    /// True when the failure is an unresolved name or key.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, ExprError::Lookup(e) if e.is_key_not_found())
    }
}

pub type Result<T> = std::result::Result<T, ExprError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_errors_pass_through() {
        let e: ExprError = datadict_core::Error::key_not_found("focal").into();
        assert!(e.is_key_not_found());
        assert_eq!(e.to_string(), "\"focal\" key not found eventually");
    }

    #[test]
    fn arity_display() {
        let e = ExprError::Arity {
            name: "sqrt".to_string(),
            expected: "1",
            got: 2,
        };
        assert_eq!(e.to_string(), "sqrt() takes 1 argument(s), got 2");
    }
}
