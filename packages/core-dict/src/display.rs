//! Short and long textual forms of a container.

use std::fmt;

use crate::dict::is_internal;
use crate::{DataDict, Value};

/// Listings longer than this are cut down to their head and tail.
const MAX_LINES: usize = 120;
const KEEP_LINES: usize = 15;

impl DataDict {
    /// One-line form: the kind plus the `"name"` entry, or the identity
    /// when there is no own `"name"` entry.
    pub fn summary(&self) -> String {
        if self.contains("name") {
            let name = self
                .get("name")
                .ok()
                .or_else(|| self.get_raw("name").cloned())
                .unwrap_or_default();
            format!("<{} \"{}\">", self.kind(), name)
        } else {
            format!("<{} {}>", self.kind(), self.id())
        }
    }

    /// Multi-line listing of the public own-store entries, sorted by key.
    ///
    /// Values are shown raw (computed entries are not evaluated). Array-like
    /// objects are shown as `<array dtype[shape]>`. Listings over 120 lines
    /// keep the first and last 15 with `...` in between.
    pub fn describe(&self) -> String {
        let mut header = format!("<{} {}", self.kind(), self.id());
        if !self.prototype().is_sentinel() {
            header.push_str(&format!(" _proto={}", self.prototype().summary()));
        }

        let mut keys: Vec<&String> = self.store().keys().filter(|k| !is_internal(k)).collect();
        keys.sort();

        let mut out = vec![header];
        for key in keys {
            let shown = match self.get_raw(key) {
                Some(Value::Object(object)) => match object.array_meta() {
                    Some(meta) => meta.to_string(),
                    None => object.render(),
                },
                Some(value) => value.to_string(),
                None => continue,
            };
            out.push(format!("  {:<25} = {}", key, shown));
        }
        if let Some(last) = out.last_mut() {
            last.push_str(" >");
        }

        if out.len() > MAX_LINES {
            let tail = out.split_off(out.len() - KEEP_LINES);
            out.truncate(KEEP_LINES);
            out.push("  ...".to_string());
            out.extend(tail);
        }
        out.join("\n")
    }
}

impl fmt::Display for DataDict {
    /// `{}` gives the one-line summary, `{:#}` the full listing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.describe())
        } else {
            write!(f, "{}", self.summary())
        }
    }
}
