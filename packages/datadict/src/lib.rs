//! datadict: attribute-style data containers.
//!
//! A container is a string-keyed mapping with a prototype it falls back to,
//! values that compute themselves on read or react to being assigned, and a
//! change event published after every mutation. This crate gathers the
//! layers into one dependency:
//!
//! - the containers themselves ([`DataDict`], [`DataObj`]) and their
//!   wiring ([`Context`], [`EventDispatcher`], [`Prototype`])
//! - restricted expressions over entries ([`Evaluate`], [`expr`])
//! - typed access through serde ([`TypedGet`], [`TypedSet`], [`fields_of`])
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use datadict::prelude::*;
//!
//! let ctx = Context::new();
//! let changes = Rc::new(RefCell::new(0));
//! let seen = changes.clone();
//! ctx.dispatcher().register_fn(CHANGESTATE, move |_| {
//!     *seen.borrow_mut() += 1;
//!     Ok(())
//! });
//!
//! let quad = Rc::new(RefCell::new(datadict! { "length" => 0.5, "k1" => 0.0 }));
//! let mut qf = ctx.builder().kind("Quadrupole").prototype(quad).build_obj();
//! qf.set_attr("name", "qf").unwrap();
//! qf.set_attr("k1", 1.2).unwrap();
//!
//! assert_eq!(qf.evaluate("k1 * length").unwrap(), Value::from(0.6));
//! assert_eq!(qf.get_as::<f64>("length").unwrap(), 0.5);
//! assert_eq!(qf.to_string(), "<Quadrupole \"qf\">");
//! assert_eq!(*changes.borrow(), 2);
//! ```

pub use datadict_core::{
    computed, datadict, is_internal, on_attach, ArrayMeta, Attached, Computed, ComputedFn,
    Context, DataDict, DataObj, DictBuilder, Empty, Error, EventDispatcher, Field, Fields, Items,
    Link, NdArray, Object, OnAttach, Prototype, Source, Subscriber, Value, CHANGESTATE,
    INTERNAL_PREFIX,
};
pub use datadict_expr::{Evaluate, ExprError, Expression, Namespace};
pub use datadict_serde::{fields_of, from_value, snapshot, to_value, TypedGet, TypedSet};

/// The expression layer: lexer, parser and evaluator.
pub mod expr {
    pub use datadict_expr::*;
}

/// Conversions between [`Value`](crate::Value) and serde data.
pub mod convert {
    pub use datadict_serde::*;
}

/// The names most code needs.
pub mod prelude {
    pub use crate::{
        computed, datadict, Context, DataDict, DataObj, Error, Evaluate, EventDispatcher, Field,
        Link, Prototype, Source, TypedGet, TypedSet, Value, CHANGESTATE,
    };
}
