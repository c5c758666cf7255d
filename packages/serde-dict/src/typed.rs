//! Typed get and set extension traits.

use serde::de::DeserializeOwned;
use serde::Serialize;

use datadict_core::{DataDict, Error, Prototype};

use crate::convert::{from_value, to_value};

/// Extension trait for typed reads.
///
/// Implemented for everything that answers lookups, so the same calls work
/// on a container, an object or a shared prototype. Reads go through the
/// normal lookup path: prototype fallback and computed entries apply.
///
/// # Example
///
/// ```rust
/// use datadict_core::datadict;
/// use datadict_serde::TypedGet;
///
/// let d = datadict! { "shape" => vec![3, 4] };
/// let shape: Vec<usize> = d.get_as("shape").unwrap();
/// assert_eq!(shape, vec![3, 4]);
/// ```
pub trait TypedGet: Prototype {
    /// Read `key` and deserialize it into a Rust type.
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, Error> {
        from_value(self.lookup(key)?)
    }

    /// Like [`get_as`](TypedGet::get_as), but a missing key reads as `None`.
    fn try_get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        match self.lookup(key) {
            Ok(value) => from_value(value).map(Some),
            Err(e) if e.is_key_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read `key` as a serde_json::Value.
    fn get_json(&self, key: &str) -> Result<serde_json::Value, Error> {
        self.get_as(key)
    }
}

impl<P: Prototype + ?Sized> TypedGet for P {}

/// Extension trait for typed writes.
pub trait TypedSet {
    /// Serialize `data` and store it under `key`, running hooks and events
    /// like any other set.
    fn set_as<T: Serialize + ?Sized>(&mut self, key: &str, data: &T) -> Result<(), Error>;
}

impl TypedSet for DataDict {
    fn set_as<T: Serialize + ?Sized>(&mut self, key: &str, data: &T) -> Result<(), Error> {
        let value = to_value(data)?;
        self.set(key, value)
    }
}
