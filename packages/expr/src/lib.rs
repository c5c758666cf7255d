//! Restricted expressions over container entries.
//!
//! Names in an expression are looked up in a [`Namespace`]; for a
//! [`DataDict`](datadict_core::DataDict) that is `get`, so prototype fallback
//! and computed entries both apply. The grammar has literals, arithmetic,
//! comparisons, `and`/`or`/`not`, subscripts, member access on maps and a
//! fixed table of builtin functions. There is no assignment and no way to
//! reach anything outside the namespace.
//!
//! # Example
//!
//! ```rust
//! use datadict_core::{datadict, Value};
//! use datadict_expr::Evaluate;
//!
//! let d = datadict! { "f" => 0.5, "n" => 4 };
//! assert_eq!(d.evaluate("f * n").unwrap(), Value::from(2.0));
//! assert!(d.evaluate("missing + 1").unwrap_err().is_key_not_found());
//! ```

mod error;
mod eval;
mod lexer;
mod parser;

use datadict_core::Value;

pub use error::{ExprError, Result};
pub use eval::{eval, Namespace};
pub use lexer::{tokenize, SpannedToken, Token};
pub use parser::{parse, BinOp, CmpOp, Expr, UnOp};

/// A parsed expression, reusable across namespaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Expr,
}

impl Expression {
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let ast = parse(&source)?;
        Ok(Self { source, ast })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    pub fn eval<N: Namespace + ?Sized>(&self, ns: &N) -> Result<Value> {
        log::trace!("evaluate {:?}", self.source);
        eval(&self.ast, ns)
    }
}

impl std::str::FromStr for Expression {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self> {
        Expression::parse(s)
    }
}

/// `evaluate` for anything that can resolve names.
pub trait Evaluate {
    fn evaluate(&self, source: &str) -> Result<Value>;
}

impl<N: Namespace + ?Sized> Evaluate for N {
    fn evaluate(&self, source: &str) -> Result<Value> {
        Expression::parse(source)?.eval(self)
    }
}
