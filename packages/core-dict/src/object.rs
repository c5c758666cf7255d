//! Capabilities a stored value may expose.
//!
//! A stored [`Value::Object`] is asked, through [`Object`], whether it can
//! compute itself on read ([`Computed`]), wants to hear about being assigned
//! ([`Attached`]) or carries array metadata for display ([`ArrayMeta`]).
//! Every capability is optional and is checked with a typed query instead of
//! probing for methods.

use std::fmt;

use crate::{DataDict, Error, Value};

/// A stored value with optional capabilities.
pub trait Object {
    /// Short type name used in error messages and listings.
    fn type_name(&self) -> &'static str {
        "object"
    }

    /// Default textual form.
    fn render(&self) -> String {
        format!("<{}>", self.type_name())
    }

    /// The computed-access capability, if any.
    fn as_computed(&self) -> Option<&dyn Computed> {
        None
    }

    /// The computed-assignment capability, if any.
    fn as_attached(&self) -> Option<&dyn Attached> {
        None
    }

    /// Shape and element type, for values that behave like n-d arrays.
    fn array_meta(&self) -> Option<ArrayMeta> {
        None
    }
}

/// Computed-access: the value read from a container is produced on demand.
pub trait Computed {
    /// Produce the value seen by a reader of `key` in `dict`.
    fn resolve(&self, dict: &DataDict, key: &str) -> Result<Value, Error>;
}

/// Computed-assignment: called right after the value is stored under `key`.
pub trait Attached {
    fn attach(&self, dict: &mut DataDict, key: &str) -> Result<(), Error>;
}

/// Element type and shape of an array-like value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayMeta {
    pub dtype: String,
    pub shape: Vec<usize>,
}

impl fmt::Display for ArrayMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<array {}{:?}>", self.dtype, self.shape)
    }
}

/// A computed entry backed by a closure.
pub struct ComputedFn<F> {
    f: F,
}

impl<F> Object for ComputedFn<F>
where
    F: Fn(&DataDict, &str) -> Result<Value, Error>,
{
    fn type_name(&self) -> &'static str {
        "computed"
    }

    fn as_computed(&self) -> Option<&dyn Computed> {
        Some(self)
    }
}

impl<F> Computed for ComputedFn<F>
where
    F: Fn(&DataDict, &str) -> Result<Value, Error>,
{
    fn resolve(&self, dict: &DataDict, key: &str) -> Result<Value, Error> {
        (self.f)(dict, key)
    }
}

/// Build a computed entry from a closure.
///
/// ```rust
/// use datadict_core::{computed, DataDict, Value};
///
/// let mut lens = DataDict::new();
/// lens.set("focal", Value::from(0.5)).unwrap();
/// lens.set(
///     "power",
///     computed(|d, _| Ok(Value::from(1.0 / d.get("focal")?.as_f64().unwrap_or(f64::NAN)))),
/// )
/// .unwrap();
/// assert_eq!(lens.get("power").unwrap(), Value::from(2.0));
/// ```
pub fn computed<F>(f: F) -> Value
where
    F: Fn(&DataDict, &str) -> Result<Value, Error> + 'static,
{
    Value::object(ComputedFn { f })
}

/// A computed entry that mirrors another key of the same container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    target: String,
}

impl Link {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Object for Link {
    fn type_name(&self) -> &'static str {
        "link"
    }

    fn render(&self) -> String {
        format!("<link to '{}'>", self.target)
    }

    fn as_computed(&self) -> Option<&dyn Computed> {
        Some(self)
    }
}

impl Computed for Link {
    fn resolve(&self, dict: &DataDict, _key: &str) -> Result<Value, Error> {
        dict.get(&self.target)
    }
}

/// A computed-assignment hook backed by a closure.
///
/// The stored value reads back as `value`; `f` runs each time it is assigned.
pub struct OnAttach<F> {
    value: Value,
    f: F,
}

impl<F> Object for OnAttach<F>
where
    F: Fn(&mut DataDict, &str) -> Result<(), Error>,
{
    fn type_name(&self) -> &'static str {
        "attached"
    }

    fn render(&self) -> String {
        self.value.to_string()
    }

    fn as_computed(&self) -> Option<&dyn Computed> {
        Some(self)
    }

    fn as_attached(&self) -> Option<&dyn Attached> {
        Some(self)
    }
}

impl<F> Computed for OnAttach<F> {
    fn resolve(&self, _dict: &DataDict, _key: &str) -> Result<Value, Error> {
        Ok(self.value.clone())
    }
}

impl<F> Attached for OnAttach<F>
where
    F: Fn(&mut DataDict, &str) -> Result<(), Error>,
{
    fn attach(&self, dict: &mut DataDict, key: &str) -> Result<(), Error> {
        (self.f)(dict, key)
    }
}

/// Wrap `value` so that `f` runs whenever it is assigned into a container.
pub fn on_attach<F>(value: Value, f: F) -> Value
where
    F: Fn(&mut DataDict, &str) -> Result<(), Error> + 'static,
{
    Value::object(OnAttach { value, f })
}

/// A dense n-dimensional array of floats, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NdArray {
    /// Create an array; fails if `data` does not fill `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, Error> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(Error::other(format!(
                "array of shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// A one-dimensional array.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

impl Object for NdArray {
    fn type_name(&self) -> &'static str {
        "ndarray"
    }

    fn render(&self) -> String {
        let items: Vec<String> = self.data.iter().map(|x| Value::Float(*x).to_string()).collect();
        format!("array([{}])", items.join(", "))
    }

    fn array_meta(&self) -> Option<ArrayMeta> {
        Some(ArrayMeta {
            dtype: "float64".to_string(),
            shape: self.shape.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_meta_display() {
        let meta = ArrayMeta {
            dtype: "float64".to_string(),
            shape: vec![3, 4],
        };
        assert_eq!(meta.to_string(), "<array float64[3, 4]>");
    }

    #[test]
    fn ndarray_rejects_bad_shape() {
        assert!(NdArray::new(vec![2, 2], vec![1.0, 2.0, 3.0]).is_err());
        let a = NdArray::new(vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(a.shape(), &[2, 2]);
    }

    #[test]
    fn plain_objects_have_no_capabilities() {
        let a = NdArray::from_vec(vec![1.0]);
        assert!(a.as_computed().is_none());
        assert!(a.as_attached().is_none());
        assert_eq!(a.render(), "array([1.0])");
    }

    #[test]
    fn link_renders_its_target() {
        let link = Link::new("focal");
        assert_eq!(link.target(), "focal");
        assert_eq!(link.render(), "<link to 'focal'>");
        assert!(link.as_computed().is_some());
    }
}
