//! Seed sources for bulk construction and update.

use std::collections::BTreeMap;

use crate::store::Store;
use crate::{DataDict, Value};

/// Something whose named fields can seed a container.
pub trait Fields {
    fn fields(&self) -> BTreeMap<String, Value>;
}

/// One input to a bulk merge, chosen explicitly by the caller.
///
/// Sources are merged left to right; on key collision the later one wins.
/// Merging copies raw values: no hooks run and no events are published.
#[derive(Debug)]
pub enum Source<'a> {
    /// Another container: its own store, not its prototype.
    Dict(&'a DataDict),
    /// A key/value sequence, applied in order.
    Pairs(Vec<(String, Value)>),
    /// The named fields of an object.
    Fields(BTreeMap<String, Value>),
}

impl<'a> Source<'a> {
    /// Build a key/value source from anything convertible.
    pub fn pairs<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Source::Pairs(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Take the fields of a field-bearing object.
    pub fn fields_of<F: Fields + ?Sized>(object: &F) -> Self {
        Source::Fields(object.fields())
    }

    pub(crate) fn merge_into(self, store: &mut Store) {
        match self {
            Source::Dict(dict) => {
                store.extend(dict.store().iter().map(|(k, v)| (k.clone(), v.clone())))
            }
            Source::Pairs(pairs) => store.extend(pairs),
            Source::Fields(fields) => store.extend(fields),
        }
    }
}

impl<'a> From<&'a DataDict> for Source<'a> {
    fn from(dict: &'a DataDict) -> Self {
        Source::Dict(dict)
    }
}

impl From<BTreeMap<String, Value>> for Source<'_> {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Source::Fields(fields)
    }
}

impl From<Vec<(String, Value)>> for Source<'_> {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        Source::Pairs(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lens {
        focal: f64,
        name: &'static str,
    }

    impl Fields for Lens {
        fn fields(&self) -> BTreeMap<String, Value> {
            let mut out = BTreeMap::new();
            out.insert("focal".to_string(), Value::from(self.focal));
            out.insert("name".to_string(), Value::from(self.name));
            out
        }
    }

    #[test]
    fn fields_of_copies_named_fields() {
        let lens = Lens {
            focal: 0.5,
            name: "L1",
        };
        let mut store = Store::new();
        Source::fields_of(&lens).merge_into(&mut store);
        assert_eq!(store.get("focal"), Some(&Value::from(0.5)));
        assert_eq!(store.get("name"), Some(&Value::from("L1")));
    }

    #[test]
    fn pairs_apply_in_order() {
        let mut store = Store::new();
        Source::pairs([("x", 1), ("x", 2)]).merge_into(&mut store);
        assert_eq!(store.get("x"), Some(&Value::from(2)));
        assert_eq!(store.len(), 1);
    }
}
