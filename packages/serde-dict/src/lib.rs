//! Serde integration for datadict containers.
//!
//! This layer adds:
//! - `TypedGet` / `TypedSet`: read entries into Rust types and store Rust
//!   types as entries
//! - `fields_of`: seed a container from any serializable struct
//! - `snapshot`: the resolved view of a container as JSON
//! - Value <-> serde conversions
//!
//! # Example
//!
//! ```rust
//! use datadict_core::{DataDict, Value};
//! use datadict_serde::{fields_of, TypedGet};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Mirror {
//!     radius: f64,
//!     coating: String,
//! }
//!
//! let m = Mirror { radius: 2.0, coating: "gold".to_string() };
//! let d = DataDict::from_sources([fields_of(&m).unwrap()]);
//! assert_eq!(d.get("coating").unwrap(), Value::from("gold"));
//! assert_eq!(d.get_as::<f64>("radius").unwrap(), 2.0);
//! ```

mod convert;
mod typed;

pub use convert::{fields_of, from_value, json_to_value, snapshot, to_value, value_to_json};
pub use typed::{TypedGet, TypedSet};
