//! Prototype fallback and the `Empty` sentinel.

use std::cell::RefCell;

use crate::{Error, Value};

/// A mapping consulted when a container misses a key.
///
/// Prototypes are shared, never owned: containers hold them as
/// `Rc<dyn Prototype>`. Wrap a container in `RefCell` to let other holders
/// keep mutating it; lookups always observe its current state.
pub trait Prototype {
    /// Resolve `key`, failing with [`Error::KeyNotFound`] when absent.
    fn lookup(&self, key: &str) -> Result<Value, Error>;

    /// True only for the [`Empty`] sentinel.
    fn is_sentinel(&self) -> bool {
        false
    }

    /// One-line description shown in long listings.
    fn summary(&self) -> String;
}

/// The "no prototype" marker: holds nothing, every lookup fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Empty;

impl Prototype for Empty {
    fn lookup(&self, key: &str) -> Result<Value, Error> {
        Err(Error::key_not_found(key))
    }

    fn is_sentinel(&self) -> bool {
        true
    }

    fn summary(&self) -> String {
        "<Empty>".to_string()
    }
}

impl<P: Prototype> Prototype for RefCell<P> {
    fn lookup(&self, key: &str) -> Result<Value, Error> {
        self.try_borrow()
            .map_err(|_| Error::PrototypeBusy)?
            .lookup(key)
    }

    fn is_sentinel(&self) -> bool {
        self.try_borrow().map(|p| p.is_sentinel()).unwrap_or(false)
    }

    fn summary(&self) -> String {
        match self.try_borrow() {
            Ok(p) => p.summary(),
            Err(_) => "<busy>".to_string(),
        }
    }
}
