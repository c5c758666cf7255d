//! Hooked mappings: the container layer.
//!
//! A [`DataDict`] is a string-keyed mapping that:
//! - falls back to a shared [`Prototype`] on lookup miss (the [`Empty`]
//!   sentinel when there is none),
//! - resolves stored values exposing [`Computed`] at read time and tells
//!   values exposing [`Attached`] when they are assigned,
//! - publishes [`CHANGESTATE`] through an [`EventDispatcher`] after every
//!   successful set or delete.
//!
//! [`DataObj`] layers named-field access on top of the same storage.
//!
//! # Example
//!
//! ```rust
//! use datadict_core::{datadict, DataObj, Source, Value};
//!
//! let defaults = datadict! { "material" => "glass", "thickness" => 0.01 };
//! let mut lens = DataObj::from_dict(datadict_core::DataDict::from_sources([
//!     Source::Dict(&defaults),
//! ]));
//! lens.set_attr("name", "L1").unwrap();
//! assert_eq!(lens.attr("material").unwrap(), Value::from("glass"));
//! assert_eq!(lens.to_string(), "<DataDict \"L1\">");
//! ```

mod context;
mod dict;
mod dispatcher;
mod display;
mod error;
mod obj;
mod object;
mod prototype;
mod source;
mod store;
mod value;

pub use context::Context;
pub use dict::{is_internal, DataDict, DictBuilder, Items, INTERNAL_PREFIX};
pub use dispatcher::{EventDispatcher, Subscriber, CHANGESTATE};
pub use error::Error;
pub use obj::{DataObj, Field};
pub use object::{
    computed, on_attach, ArrayMeta, Attached, Computed, ComputedFn, Link, NdArray, Object, OnAttach,
};
pub use prototype::{Empty, Prototype};
pub use source::{Fields, Source};
pub use value::Value;

/// Build a [`DataDict`] from `key => value` pairs.
///
/// ```rust
/// use datadict_core::{datadict, Value};
///
/// let d = datadict! { "x" => 1, "label" => "a" };
/// assert_eq!(d.get("x").unwrap(), Value::from(1));
/// assert_eq!(d.keys(), vec!["x", "label"]);
/// ```
#[macro_export]
macro_rules! datadict {
    () => {
        $crate::DataDict::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::DataDict::builder()
            $(.set($key, $value))+
            .build()
    };
}
