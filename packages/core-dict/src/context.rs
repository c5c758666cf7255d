//! Shared wiring created once at startup.

use std::rc::Rc;

use crate::dict::DictBuilder;
use crate::{DataDict, DataObj, Empty, EventDispatcher, Prototype};

/// One dispatcher and one sentinel prototype, handed to every container
/// built through it.
///
/// ```rust
/// use datadict_core::{Context, Value, CHANGESTATE};
///
/// let ctx = Context::new();
/// ctx.dispatcher().register_fn(CHANGESTATE, |d| {
///     assert!(d.contains("x"));
///     Ok(())
/// });
///
/// let mut d = ctx.dict();
/// d.set("x", Value::from(1)).unwrap();
/// ```
#[derive(Clone)]
pub struct Context {
    dispatcher: Rc<EventDispatcher>,
    sentinel: Rc<dyn Prototype>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_dispatcher(Rc::new(EventDispatcher::new()))
    }

    pub fn with_dispatcher(dispatcher: Rc<EventDispatcher>) -> Self {
        Self {
            dispatcher,
            sentinel: Rc::new(Empty),
        }
    }

    pub fn dispatcher(&self) -> &Rc<EventDispatcher> {
        &self.dispatcher
    }

    pub fn sentinel(&self) -> &Rc<dyn Prototype> {
        &self.sentinel
    }

    /// A builder pre-wired with this context.
    pub fn builder(&self) -> DictBuilder {
        DataDict::builder()
            .dispatcher(self.dispatcher.clone())
            .prototype(self.sentinel.clone())
    }

    pub fn dict(&self) -> DataDict {
        self.builder().build()
    }

    pub fn obj(&self) -> DataObj {
        self.builder().build_obj()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CHANGESTATE;
    use std::cell::Cell;

    #[test]
    fn containers_share_the_dispatcher() {
        let ctx = Context::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        ctx.dispatcher().register_fn(CHANGESTATE, move |_| {
            c.set(c.get() + 1);
            Ok(())
        });

        let mut a = ctx.dict();
        let mut b = ctx.obj();
        a.set("x", 1).unwrap();
        b.set_attr("y", 2).unwrap();
        assert_eq!(count.get(), 2);
        assert!(Rc::ptr_eq(a.dispatcher().unwrap(), ctx.dispatcher()));
        assert!(a.prototype().is_sentinel());
    }
}
