//! DataObj: named-field access over a [`DataDict`].
//!
//! Field names route to the mapping's get/set/delete. Names starting with
//! [`INTERNAL_PREFIX`](crate::INTERNAL_PREFIX) address a separate internal
//! slot table instead, so bookkeeping never shows up as (or gets overridden
//! by) a domain field.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::dict::is_internal;
use crate::source::{Fields, Source};
use crate::{DataDict, Error, Prototype, Value};

/// Internal names that belong to the container's wiring. They are reached
/// through [`DataDict::prototype`], [`DataDict::dispatcher`] and
/// [`DataDict::events_enabled`] and their setters, never through the slot
/// table.
const WIRING: [&str; 3] = ["_proto", "_dispatcher", "_events"];

fn wiring_error(name: &str) -> Error {
    Error::other(format!(
        "'{}' is container wiring, use the prototype/dispatcher/events accessors",
        name
    ))
}

/// A [`DataDict`] read and written through field names.
///
/// Every mapping operation is still available through `Deref`.
///
/// ```rust
/// use datadict_core::{DataObj, Value};
///
/// let mut mirror = DataObj::new();
/// mirror.set_attr("radius", Value::from(2.5)).unwrap();
/// mirror.set_attr("_dirty", Value::from(true)).unwrap();
///
/// assert_eq!(mirror.attr("radius").unwrap(), Value::from(2.5));
/// assert!(mirror.contains("radius"));
/// assert!(!mirror.contains("_dirty"));
/// ```
#[derive(Clone)]
pub struct DataObj {
    dict: DataDict,
    internal: BTreeMap<String, Value>,
}

impl Default for DataObj {
    fn default() -> Self {
        Self::new()
    }
}

impl DataObj {
    pub fn new() -> Self {
        DataDict::builder().build_obj()
    }

    /// Wrap an existing container.
    pub fn from_dict(dict: DataDict) -> Self {
        Self {
            dict,
            internal: BTreeMap::new(),
        }
    }

    pub fn as_dict(&self) -> &DataDict {
        &self.dict
    }

    pub fn into_dict(self) -> DataDict {
        self.dict
    }

    /// Read a field.
    ///
    /// Internal names read the slot table; wiring names (`_proto`,
    /// `_dispatcher`, `_events`) fail with [`Error::Other`].
    pub fn attr(&self, name: &str) -> Result<Value, Error> {
        if WIRING.contains(&name) {
            return Err(wiring_error(name));
        }
        if is_internal(name) {
            return self
                .internal
                .get(name)
                .cloned()
                .ok_or_else(|| Error::key_not_found(name));
        }
        self.dict.get(name)
    }

    /// Write a field. Internal names other than the wiring names go to the
    /// slot table without hooks or events.
    pub fn set_attr(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        if WIRING.contains(&name) {
            return Err(wiring_error(name));
        }
        if is_internal(name) {
            self.internal.insert(name.to_string(), value.into());
            return Ok(());
        }
        self.dict.set(name, value)
    }

    /// Delete a field.
    pub fn del_attr(&mut self, name: &str) -> Result<Value, Error> {
        if WIRING.contains(&name) {
            return Err(wiring_error(name));
        }
        if is_internal(name) {
            return self
                .internal
                .remove(name)
                .ok_or_else(|| Error::key_not_found(name));
        }
        self.dict.delete(name)
    }

    /// True if reading `name` would succeed without a missing key.
    pub fn has_attr(&self, name: &str) -> bool {
        match self.attr(name) {
            Ok(_) => true,
            Err(e) => !e.is_key_not_found(),
        }
    }

    /// Names of the internal slots.
    pub fn internal_names(&self) -> Vec<String> {
        self.internal.keys().cloned().collect()
    }
}

impl Deref for DataObj {
    type Target = DataDict;

    fn deref(&self) -> &DataDict {
        &self.dict
    }
}

impl DerefMut for DataObj {
    fn deref_mut(&mut self) -> &mut DataDict {
        &mut self.dict
    }
}

impl Prototype for DataObj {
    fn lookup(&self, key: &str) -> Result<Value, Error> {
        self.dict.get(key)
    }

    fn summary(&self) -> String {
        self.dict.summary()
    }
}

impl Fields for DataObj {
    /// The field view is the raw own store.
    fn fields(&self) -> BTreeMap<String, Value> {
        self.dict
            .keys()
            .into_iter()
            .filter_map(|k| self.dict.get_raw(&k).cloned().map(|v| (k, v)))
            .collect()
    }
}

impl<'a> From<&'a DataObj> for Source<'a> {
    fn from(obj: &'a DataObj) -> Self {
        Source::Dict(&obj.dict)
    }
}

impl fmt::Display for DataObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.dict, f)
    }
}

impl fmt::Debug for DataObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataObj")
            .field("dict", &self.dict)
            .field("internal", &self.internal_names())
            .finish()
    }
}

/// A typed field name.
///
/// ```rust
/// use datadict_core::{DataObj, Field};
///
/// const RADIUS: Field<f64> = Field::new("radius");
///
/// let mut mirror = DataObj::new();
/// RADIUS.set(&mut mirror, 2.0).unwrap();
/// assert_eq!(RADIUS.get(&mirror).unwrap(), 2.0);
/// ```
pub struct Field<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Field<T>
where
    T: TryFrom<Value, Error = Error>,
{
    pub fn get(&self, dict: &DataDict) -> Result<T, Error> {
        T::try_from(dict.get(self.name)?)
    }
}

impl<T: Into<Value>> Field<T> {
    pub fn set(&self, dict: &mut DataDict, value: T) -> Result<(), Error> {
        dict.set(self.name, value)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventDispatcher, CHANGESTATE};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn wiring_names_are_not_slots() {
        let proto = Rc::new(RefCell::new(DataDict::new()));
        let mut obj = DataDict::builder().prototype(proto).build_obj();

        for name in ["_proto", "_dispatcher", "_events"] {
            assert!(matches!(obj.set_attr(name, 1), Err(Error::Other { .. })));
            assert!(matches!(obj.attr(name), Err(Error::Other { .. })));
            assert!(matches!(obj.del_attr(name), Err(Error::Other { .. })));
        }
        assert!(obj.internal_names().is_empty());
        assert!(!obj.prototype().is_sentinel());

        obj.set_attr("_note", "kept").unwrap();
        assert_eq!(obj.internal_names(), vec!["_note".to_string()]);
    }

    #[test]
    fn fields_route_to_mapping() {
        let mut obj = DataObj::new();
        obj.set_attr("x", 1).unwrap();
        assert_eq!(obj.get("x").unwrap(), Value::from(1));
        obj.set("y", 2).unwrap();
        assert_eq!(obj.attr("y").unwrap(), Value::from(2));
        assert_eq!(obj.del_attr("x").unwrap(), Value::from(1));
        assert!(!obj.contains("x"));
    }

    #[test]
    fn internal_names_bypass_mapping() {
        let hub = Rc::new(EventDispatcher::new());
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        hub.register_fn(CHANGESTATE, move |_| {
            c.set(c.get() + 1);
            Ok(())
        });

        let mut obj = DataDict::builder().dispatcher(hub).build_obj();
        obj.set_attr("_cache", 1).unwrap();
        assert_eq!(count.get(), 0);
        assert!(!obj.contains("_cache"));
        assert_eq!(obj.attr("_cache").unwrap(), Value::from(1));
        assert_eq!(obj.internal_names(), vec!["_cache".to_string()]);

        obj.set_attr("visible", 1).unwrap();
        assert_eq!(count.get(), 1);

        obj.del_attr("_cache").unwrap();
        assert!(obj.del_attr("_cache").unwrap_err().is_key_not_found());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn missing_field_is_key_not_found() {
        let obj = DataObj::new();
        assert_eq!(obj.attr("nope").unwrap_err(), Error::key_not_found("nope"));
        assert_eq!(obj.attr("_nope").unwrap_err(), Error::key_not_found("_nope"));
        assert!(!obj.has_attr("nope"));
    }

    #[test]
    fn fields_fall_back_to_prototype() {
        let proto = Rc::new(RefCell::new(DataObj::new()));
        proto.borrow_mut().set_attr("n", 1.5).unwrap();
        let obj = DataDict::builder().prototype(proto).build_obj();
        assert_eq!(obj.attr("n").unwrap(), Value::from(1.5));
        assert!(obj.has_attr("n"));
        assert!(!obj.contains("n"));
    }

    #[test]
    fn kind_defaults_to_dataobj() {
        let obj = DataObj::new();
        assert_eq!(obj.kind(), "DataObj");
        let named = DataDict::builder().kind("Mirror").build_obj();
        assert_eq!(named.kind(), "Mirror");
    }

    #[test]
    fn typed_fields() {
        const RADIUS: Field<f64> = Field::new("radius");
        const LABEL: Field<String> = Field::new("label");

        let mut obj = DataObj::new();
        RADIUS.set(&mut obj, 3.0).unwrap();
        LABEL.set(&mut obj, "M1".to_string()).unwrap();
        assert_eq!(RADIUS.get(&obj).unwrap(), 3.0);
        assert_eq!(LABEL.get(&obj).unwrap(), "M1");

        obj.set_attr("radius", "wide").unwrap();
        assert!(matches!(RADIUS.get(&obj), Err(Error::Type { .. })));
    }

    #[test]
    fn obj_fields_feed_other_containers() {
        let mut obj = DataObj::new();
        obj.set_attr("a", 1).unwrap();
        let copy = DataDict::from_sources([Source::from(&obj)]);
        assert_eq!(copy.get("a").unwrap(), Value::from(1));

        let via_fields = DataDict::from_sources([Source::fields_of(&obj)]);
        assert_eq!(via_fields.get("a").unwrap(), Value::from(1));
    }
}
