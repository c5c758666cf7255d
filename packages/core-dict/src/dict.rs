//! DataDict: a mapping with prototype fallback, value hooks and change events.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dispatcher::{EventDispatcher, CHANGESTATE};
use crate::prototype::{Empty, Prototype};
use crate::source::Source;
use crate::store::Store;
use crate::{DataObj, Error, Value};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Prefix marking internal names. Such keys are hidden from listings and,
/// on [`DataObj`], address internal state instead of the mapping.
pub const INTERNAL_PREFIX: char = '_';

/// True if `name` starts with [`INTERNAL_PREFIX`].
pub fn is_internal(name: &str) -> bool {
    name.starts_with(INTERNAL_PREFIX)
}

/// A key/value container with hooks.
///
/// - Reads fall back to a shared [`Prototype`] when the own store misses.
/// - A stored value exposing [`Computed`](crate::Computed) is resolved on
///   every read instead of being returned raw.
/// - A stored value exposing [`Attached`](crate::Attached) is told about
///   each assignment right after it is stored.
/// - Every successful set or delete publishes [`CHANGESTATE`] when a
///   dispatcher is wired in and events are enabled.
///
/// Membership ([`DataDict::contains`], [`DataDict::keys`]) only considers
/// the own store, while [`DataDict::get`] also consults the prototype.
/// Both readings are relied upon and kept as they are.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use datadict_core::{DataDict, Value};
///
/// let defaults = Rc::new(RefCell::new(DataDict::new()));
/// defaults.borrow_mut().set("material", Value::from("glass")).unwrap();
///
/// let mut lens = DataDict::builder().prototype(defaults.clone()).build();
/// assert_eq!(lens.get("material").unwrap(), Value::from("glass"));
/// assert!(!lens.contains("material"));
///
/// lens.set("material", Value::from("quartz")).unwrap();
/// assert_eq!(lens.get("material").unwrap(), Value::from("quartz"));
/// ```
pub struct DataDict {
    id: u64,
    kind: String,
    store: Store,
    proto: Rc<dyn Prototype>,
    dispatcher: Option<Rc<EventDispatcher>>,
    events: bool,
}

impl Default for DataDict {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DataDict {
    /// Copies the store and shares prototype and dispatcher. The copy gets
    /// its own identity.
    fn clone(&self) -> Self {
        Self {
            id: next_id(),
            kind: self.kind.clone(),
            store: self.store.clone(),
            proto: self.proto.clone(),
            dispatcher: self.dispatcher.clone(),
            events: self.events,
        }
    }
}

impl DataDict {
    /// Create an empty container with the [`Empty`] prototype and no
    /// dispatcher.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DictBuilder {
        DictBuilder::new()
    }

    /// Create a container seeded from `sources`, merged left to right.
    pub fn from_sources<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Source<'a>>,
    {
        let mut builder = Self::builder();
        for source in sources {
            builder = builder.source(source);
        }
        builder.build()
    }

    /// Unique identity of this instance.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name of the container type.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: impl Into<String>) {
        self.kind = kind.into();
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub fn prototype(&self) -> &Rc<dyn Prototype> {
        &self.proto
    }

    pub fn set_prototype(&mut self, proto: Rc<dyn Prototype>) {
        self.proto = proto;
    }

    pub fn dispatcher(&self) -> Option<&Rc<EventDispatcher>> {
        self.dispatcher.as_ref()
    }

    pub fn set_dispatcher(&mut self, dispatcher: Option<Rc<EventDispatcher>>) {
        self.dispatcher = dispatcher;
    }

    /// Attach (`true`) or detach (`false`) the dispatcher for this instance.
    pub fn set_events(&mut self, enabled: bool) {
        log::debug!("events {} for {}", if enabled { "on" } else { "off" }, self.id);
        self.events = enabled;
    }

    /// True when mutations will be published.
    pub fn events_enabled(&self) -> bool {
        self.events && self.dispatcher.is_some()
    }

    /// Look up `key`: own store first, then the prototype. Computed values
    /// are resolved against this container.
    pub fn get(&self, key: &str) -> Result<Value, Error> {
        let value = match self.store.get(key) {
            Some(v) => v.clone(),
            None => self.proto.lookup(key)?,
        };
        self.resolve(key, value)
    }

    fn resolve(&self, key: &str, value: Value) -> Result<Value, Error> {
        if let Value::Object(object) = &value {
            if let Some(computed) = object.as_computed() {
                return computed.resolve(self, key);
            }
        }
        Ok(value)
    }

    /// Like [`DataDict::get`], but a missing key yields `default`.
    /// Other failures still propagate.
    pub fn get_or(&self, key: &str, default: Value) -> Result<Value, Error> {
        match self.get(key) {
            Err(e) if e.is_key_not_found() => Ok(default),
            other => other,
        }
    }

    /// The raw value in the own store, without hooks or prototype.
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }

    /// Store `value` under `key`, run its assignment hook, then publish.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), Error> {
        let key = key.into();
        let value = value.into();
        log::trace!("set {}[{}]", self.id, key);
        self.store.insert(key.clone(), value.clone());
        if let Value::Object(object) = &value {
            if let Some(hook) = object.as_attached() {
                hook.attach(self, &key)?;
            }
        }
        self.notify()
    }

    /// Remove `key` from the own store and publish. Prototype entries are
    /// never removed through a container that doesn't own them.
    pub fn delete(&mut self, key: &str) -> Result<Value, Error> {
        let removed = self
            .store
            .remove(key)
            .ok_or_else(|| Error::key_not_found(key))?;
        log::trace!("delete {}[{}]", self.id, key);
        self.notify()?;
        Ok(removed)
    }

    /// True iff `key` is in the own store. The prototype is not consulted.
    pub fn contains(&self, key: &str) -> bool {
        self.store.contains(key)
    }

    /// Own-store keys in storage order.
    pub fn keys(&self) -> Vec<String> {
        self.store.keys().cloned().collect()
    }

    /// Iterate over a snapshot of the own-store keys.
    pub fn iter(&self) -> std::vec::IntoIter<String> {
        self.keys().into_iter()
    }

    /// Iterate over `(key, value)` pairs with [`DataDict::get`] semantics,
    /// so computed values resolve per item.
    pub fn items(&self) -> Items<'_> {
        Items {
            dict: self,
            keys: self.iter(),
        }
    }

    /// Return the raw value under `key`, storing `default` first if absent.
    /// Neither hooks nor events fire.
    pub fn set_default(&mut self, key: impl Into<String>, default: Value) -> Value {
        let key = key.into();
        if let Some(v) = self.store.get(&key) {
            return v.clone();
        }
        self.store.insert(key, default.clone());
        default
    }

    /// Merge `source` into the own store, later keys overriding. Like
    /// construction, no hooks run and nothing is published.
    pub fn update(&mut self, source: Source<'_>) {
        source.merge_into(&mut self.store);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn notify(&self) -> Result<(), Error> {
        if !self.events {
            return Ok(());
        }
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.publish(CHANGESTATE, self),
            None => Ok(()),
        }
    }
}

impl Prototype for DataDict {
    fn lookup(&self, key: &str) -> Result<Value, Error> {
        self.get(key)
    }

    fn summary(&self) -> String {
        DataDict::summary(self)
    }
}

impl std::fmt::Debug for DataDict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataDict")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("keys", &self.keys())
            .field("events", &self.events_enabled())
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a DataDict {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy `(key, value)` iterator returned by [`DataDict::items`].
pub struct Items<'a> {
    dict: &'a DataDict,
    keys: std::vec::IntoIter<String>,
}

impl Iterator for Items<'_> {
    type Item = Result<(String, Value), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        Some(self.dict.get(&key).map(|v| (key, v)))
    }
}

/// Wiring and seed data for a new container.
pub struct DictBuilder {
    kind: String,
    store: Store,
    overrides: Vec<(String, Value)>,
    proto: Rc<dyn Prototype>,
    dispatcher: Option<Rc<EventDispatcher>>,
    events: bool,
}

impl Default for DictBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DictBuilder {
    pub fn new() -> Self {
        Self {
            kind: "DataDict".to_string(),
            store: Store::new(),
            overrides: Vec::new(),
            proto: Rc::new(Empty),
            dispatcher: None,
            events: true,
        }
    }

    /// Name shown by the describe listings.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn prototype(mut self, proto: Rc<dyn Prototype>) -> Self {
        self.proto = proto;
        self
    }

    pub fn dispatcher(mut self, dispatcher: Rc<EventDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn events(mut self, enabled: bool) -> Self {
        self.events = enabled;
        self
    }

    /// Merge a seed source now; later sources override earlier ones.
    pub fn source(mut self, source: Source<'_>) -> Self {
        source.merge_into(&mut self.store);
        self
    }

    /// Keyword-style override, applied after every source.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> DataDict {
        let mut store = self.store;
        store.extend(self.overrides);
        DataDict {
            id: next_id(),
            kind: self.kind,
            store,
            proto: self.proto,
            dispatcher: self.dispatcher,
            events: self.events,
        }
    }

    /// Build an attribute-access container.
    pub fn build_obj(self) -> DataObj {
        let kind_is_default = self.kind == "DataDict";
        let mut dict = self.build();
        if kind_is_default {
            dict.set_kind("DataObj");
        }
        DataObj::from_dict(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{computed, on_attach, Link};
    use std::cell::{Cell, RefCell};

    fn with_proto(proto: &Rc<RefCell<DataDict>>) -> DataDict {
        DataDict::builder().prototype(proto.clone()).build()
    }

    #[test]
    fn set_then_get() {
        let mut d = DataDict::new();
        d.set("x", 1).unwrap();
        assert_eq!(d.get("x").unwrap(), Value::from(1));
        d.set("x", "two").unwrap();
        assert_eq!(d.get("x").unwrap(), Value::from("two"));
    }

    #[test]
    fn missing_key_fails() {
        let d = DataDict::new();
        assert_eq!(d.get("nope").unwrap_err(), Error::key_not_found("nope"));
    }

    #[test]
    fn prototype_fallback_and_precedence() {
        let proto = Rc::new(RefCell::new(DataDict::new()));
        proto.borrow_mut().set("x", 1).unwrap();
        proto.borrow_mut().set("y", 2).unwrap();

        let mut d = with_proto(&proto);
        d.set("y", 20).unwrap();

        assert_eq!(d.get("x").unwrap(), Value::from(1));
        assert_eq!(d.get("y").unwrap(), Value::from(20));
    }

    #[test]
    fn prototype_changes_are_observed() {
        let proto = Rc::new(RefCell::new(DataDict::new()));
        let d = with_proto(&proto);
        assert!(d.get("late").is_err());
        proto.borrow_mut().set("late", 5).unwrap();
        assert_eq!(d.get("late").unwrap(), Value::from(5));
    }

    #[test]
    fn delete_reveals_prototype_value() {
        let proto = Rc::new(RefCell::new(DataDict::new()));
        proto.borrow_mut().set("x", 1).unwrap();
        let mut d = with_proto(&proto);
        d.set("x", 10).unwrap();
        d.set("z", 3).unwrap();

        assert_eq!(d.delete("x").unwrap(), Value::from(10));
        assert_eq!(d.get("x").unwrap(), Value::from(1));
        assert!(proto.borrow().contains("x"));

        d.delete("z").unwrap();
        assert!(d.get("z").unwrap_err().is_key_not_found());
    }

    #[test]
    fn delete_prototype_only_key_fails() {
        let proto = Rc::new(RefCell::new(DataDict::new()));
        proto.borrow_mut().set("x", 1).unwrap();
        let mut d = with_proto(&proto);
        assert_eq!(d.delete("x").unwrap_err(), Error::key_not_found("x"));
        assert_eq!(d.get("x").unwrap(), Value::from(1));
    }

    #[test]
    fn contains_ignores_prototype() {
        let proto = Rc::new(RefCell::new(DataDict::new()));
        proto.borrow_mut().set("x", 1).unwrap();
        let mut d = with_proto(&proto);
        d.set("y", 2).unwrap();

        assert!(!d.contains("x"));
        assert!(d.contains("y"));
        assert_eq!(d.keys(), vec!["y".to_string()]);
    }

    #[test]
    fn get_or_only_swallows_missing_keys() {
        let mut d = DataDict::new();
        assert_eq!(d.get_or("x", Value::from(7)).unwrap(), Value::from(7));

        d.set("bad", computed(|_, k| Err(Error::hook(k, "broken"))))
            .unwrap();
        assert_eq!(
            d.get_or("bad", Value::Null).unwrap_err(),
            Error::hook("bad", "broken")
        );
    }

    #[test]
    fn computed_values_resolve_on_read() {
        let mut d = DataDict::new();
        d.set("a", 2).unwrap();
        d.set(
            "double",
            computed(|d, _| Ok(Value::from(d.get("a")?.as_i64().unwrap_or(0) * 2))),
        )
        .unwrap();
        assert_eq!(d.get("double").unwrap(), Value::from(4));
        d.set("a", 5).unwrap();
        assert_eq!(d.get("double").unwrap(), Value::from(10));
    }

    #[test]
    fn link_mirrors_another_key() {
        let mut d = DataDict::new();
        d.set("f", 0.5).unwrap();
        d.set("focal", Value::object(Link::new("f"))).unwrap();
        assert_eq!(d.get("focal").unwrap(), Value::from(0.5));
    }

    #[test]
    fn prototype_computed_value_resolves_in_prototype() {
        let proto = Rc::new(RefCell::new(DataDict::new()));
        proto.borrow_mut().set("n", 1).unwrap();
        proto
            .borrow_mut()
            .set("twice", computed(|d, _| Ok(Value::from(d.get("n")?.as_i64().unwrap_or(0) * 2))))
            .unwrap();

        let mut d = with_proto(&proto);
        d.set("n", 100).unwrap();
        assert_eq!(d.get("twice").unwrap(), Value::from(2));
    }

    #[test]
    fn attach_hook_runs_after_store() {
        let mut d = DataDict::new();
        let value = on_attach(Value::from(3), |d, key| {
            let stored = d.contains(key);
            d.set_default("attached_to", Value::from(key));
            d.set_default("was_stored", Value::from(stored));
            Ok(())
        });
        d.set("pos", value).unwrap();

        assert_eq!(d.get("pos").unwrap(), Value::from(3));
        assert_eq!(d.get("attached_to").unwrap(), Value::from("pos"));
        assert_eq!(d.get("was_stored").unwrap(), Value::from(true));
    }

    #[test]
    fn attach_failure_propagates_without_publish() {
        let hub = Rc::new(EventDispatcher::new());
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        hub.register_fn(CHANGESTATE, move |_| {
            c.set(c.get() + 1);
            Ok(())
        });

        let mut d = DataDict::builder().dispatcher(hub).build();
        let value = on_attach(Value::Null, |_, k| Err(Error::hook(k, "rejected")));
        assert!(d.set("x", value).is_err());
        assert!(d.contains("x"));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn every_mutation_publishes_once() {
        let hub = Rc::new(EventDispatcher::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        hub.register_fn(CHANGESTATE, move |d| {
            s.borrow_mut().push((d.id(), d.len()));
            Ok(())
        });

        let mut d = DataDict::builder().dispatcher(hub).build();
        d.set("x", 1).unwrap();
        d.set("x", 1).unwrap();
        d.delete("x").unwrap();
        assert!(d.delete("x").is_err());
        d.set_default("y", Value::from(2));

        let id = d.id();
        assert_eq!(*seen.borrow(), vec![(id, 1), (id, 1), (id, 0)]);
    }

    #[test]
    fn events_can_be_toggled() {
        let hub = Rc::new(EventDispatcher::new());
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        hub.register_fn(CHANGESTATE, move |_| {
            c.set(c.get() + 1);
            Ok(())
        });

        let mut d = DataDict::builder().dispatcher(hub).build();
        assert!(d.events_enabled());
        d.set_events(false);
        assert!(!d.events_enabled());
        d.set("x", 1).unwrap();
        assert_eq!(count.get(), 0);
        d.set_events(true);
        d.set("x", 2).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscriber_error_reaches_setter() {
        let hub = Rc::new(EventDispatcher::new());
        hub.register_fn(CHANGESTATE, |_| Err(Error::other("veto")));
        let mut d = DataDict::builder().dispatcher(hub).build();
        assert_eq!(d.set("x", 1).unwrap_err(), Error::other("veto"));
        assert_eq!(d.get("x").unwrap(), Value::from(1));
    }

    #[test]
    fn items_follow_insertion_order() {
        let mut d = DataDict::from_sources([Source::pairs([("x", 1)])]);
        d.set("y", 2).unwrap();
        let items: Vec<(String, Value)> = d.items().collect::<Result<_, _>>().unwrap();
        assert_eq!(
            items,
            vec![
                ("x".to_string(), Value::from(1)),
                ("y".to_string(), Value::from(2)),
            ]
        );
        // restartable
        assert_eq!(d.items().count(), 2);
    }

    #[test]
    fn items_resolve_computed_values() {
        let mut d = DataDict::new();
        d.set("c", computed(|_, k| Ok(Value::from(k)))).unwrap();
        let items: Vec<(String, Value)> = d.items().collect::<Result<_, _>>().unwrap();
        assert_eq!(items, vec![("c".to_string(), Value::from("c"))]);
    }

    #[test]
    fn iteration_is_a_snapshot() {
        let mut d = DataDict::new();
        d.set("a", 1).unwrap();
        d.set("b", 2).unwrap();
        let keys = d.iter();
        d.set("c", 3).unwrap();
        assert_eq!(keys.collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!((&d).into_iter().count(), 3);
    }

    #[test]
    fn later_sources_win() {
        let a = DataDict::builder().set("x", 1).set("a", "A").build();
        let b = DataDict::builder().set("x", 2).build();
        let merged = DataDict::from_sources([Source::Dict(&a), Source::Dict(&b)]);
        assert_eq!(merged.get("x").unwrap(), Value::from(2));
        assert_eq!(merged.get("a").unwrap(), Value::from("A"));
    }

    #[test]
    fn overrides_apply_after_sources() {
        let a = DataDict::builder().set("x", 1).build();
        let d = DataDict::builder().set("x", 99).source(Source::Dict(&a)).build();
        assert_eq!(d.get("x").unwrap(), Value::from(99));
    }

    #[test]
    fn construction_runs_no_hooks() {
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let value = on_attach(Value::Null, move |_, _| {
            f.set(true);
            Ok(())
        });
        let d = DataDict::builder().set("h", value).build();
        assert!(d.contains("h"));
        assert!(!fired.get());
    }

    #[test]
    fn set_default_returns_raw_value() {
        let mut d = DataDict::new();
        d.set("c", computed(|_, _| Ok(Value::from(1)))).unwrap();
        assert!(matches!(d.set_default("c", Value::Null), Value::Object(_)));
        assert_eq!(d.set_default("n", Value::from(4)), Value::from(4));
        assert_eq!(d.set_default("n", Value::from(5)), Value::from(4));
    }

    #[test]
    fn update_merges_without_events() {
        let hub = Rc::new(EventDispatcher::new());
        hub.register_fn(CHANGESTATE, |_| Err(Error::other("should not fire")));
        let mut d = DataDict::builder().dispatcher(hub).build();
        d.update(Source::pairs([("a", 1), ("b", 2)]));
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn clones_get_new_identity() {
        let d = DataDict::builder().set("x", 1).build();
        let c = d.clone();
        assert_ne!(d.id(), c.id());
        assert_eq!(c.get("x").unwrap(), Value::from(1));
    }
}
