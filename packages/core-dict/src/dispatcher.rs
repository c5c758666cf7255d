//! Publish/subscribe registry keyed by event name.
//!
//! Containers with events enabled publish [`CHANGESTATE`] after every
//! successful set or delete, carrying themselves as the payload. The
//! dispatcher is shared as an `Rc` by every container wired to it and lives
//! as long as its last holder.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use datadict_core::{DataDict, EventDispatcher, Value, CHANGESTATE};
//!
//! let hub = Rc::new(EventDispatcher::new());
//! let seen = Rc::new(Cell::new(0));
//! let counter = seen.clone();
//! hub.register_fn(CHANGESTATE, move |_| {
//!     counter.set(counter.get() + 1);
//!     Ok(())
//! });
//!
//! let mut dict = DataDict::builder().dispatcher(hub).build();
//! dict.set("x", Value::from(1)).unwrap();
//! dict.delete("x").unwrap();
//! assert_eq!(seen.get(), 2);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::{DataDict, Error};

/// Name of the event published on every successful mutation.
pub const CHANGESTATE: &str = "changestate";

/// Receives published events.
///
/// `action` is the name given at registration, so one target can be
/// subscribed several times and tell the subscriptions apart.
pub trait Subscriber {
    fn handle(&self, action: &str, payload: &DataDict) -> Result<(), Error>;
}

struct FnSubscriber<F> {
    f: F,
}

impl<F> Subscriber for FnSubscriber<F>
where
    F: Fn(&DataDict) -> Result<(), Error>,
{
    fn handle(&self, _action: &str, payload: &DataDict) -> Result<(), Error> {
        (self.f)(payload)
    }
}

#[derive(Clone)]
struct Subscription {
    target: Rc<dyn Subscriber>,
    action: String,
}

/// Subscription table: event name to subscriptions in registration order.
#[derive(Default)]
pub struct EventDispatcher {
    table: RefCell<HashMap<String, Vec<Subscription>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscription. Registering the same triple twice yields two
    /// invocations per publish.
    pub fn register(
        &self,
        event: impl Into<String>,
        target: Rc<dyn Subscriber>,
        action: impl Into<String>,
    ) {
        let event = event.into();
        let action = action.into();
        log::debug!("register '{}' for event '{}'", action, event);
        self.table
            .borrow_mut()
            .entry(event)
            .or_default()
            .push(Subscription { target, action });
    }

    /// Subscribe a closure. The returned handle can be passed to
    /// [`EventDispatcher::unregister`].
    pub fn register_fn<F>(&self, event: impl Into<String>, f: F) -> Rc<dyn Subscriber>
    where
        F: Fn(&DataDict) -> Result<(), Error> + 'static,
    {
        let target: Rc<dyn Subscriber> = Rc::new(FnSubscriber { f });
        self.register(event, target.clone(), "call");
        target
    }

    /// Remove every subscription of `target` under `event`, returning how
    /// many were removed.
    pub fn unregister(&self, event: &str, target: &Rc<dyn Subscriber>) -> usize {
        let mut table = self.table.borrow_mut();
        let Some(subs) = table.get_mut(event) else {
            return 0;
        };
        let before = subs.len();
        subs.retain(|s| !Rc::ptr_eq(&s.target, target));
        let removed = before - subs.len();
        if subs.is_empty() {
            table.remove(event);
        }
        log::debug!("unregistered {} subscription(s) from '{}'", removed, event);
        removed
    }

    /// Number of subscriptions under `event`.
    pub fn subscriptions(&self, event: &str) -> usize {
        self.table.borrow().get(event).map_or(0, Vec::len)
    }

    /// Invoke every subscription under `event` in registration order.
    ///
    /// The first failing handler aborts the remaining ones and its error is
    /// returned as-is. The subscriber list is snapshotted first, so handlers
    /// may register further subscriptions; those only see later publishes.
    pub fn publish(&self, event: &str, payload: &DataDict) -> Result<(), Error> {
        let subs = match self.table.borrow().get(event) {
            Some(subs) => subs.clone(),
            None => return Ok(()),
        };
        log::trace!("publish '{}' to {} subscriber(s)", event, subs.len());
        for sub in &subs {
            sub.target.handle(&sub.action, payload)?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        let mut map = f.debug_map();
        for (event, subs) in table.iter() {
            let actions: Vec<&str> = subs.iter().map(|s| s.action.as_str()).collect();
            map.entry(event, &actions);
        }
        map.finish()
    }
}
