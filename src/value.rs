//! Small helpers for building template [`Value`]s.

use std::collections::HashMap;

use gtmpl_value::Value;
use url::Url;

use crate::category::Category;

/// Builds a [`Value::Object`] from `(key, value)` pairs.
pub fn object(fields: Vec<(&str, Value)>) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    for (key, value) in fields {
        m.insert(key.to_owned(), value);
    }
    Value::Object(m)
}

/// Converts an optional value into a [`Value`], mapping `None` to
/// [`Value::Nil`] so templates can gate on it with `if`/`with`.
pub fn opt(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Nil)
}

impl From<&Category> for Value {
    /// Converts [`Category`]s into [`Value`]s for templating: the URL-safe
    /// name (badge classes) plus the display label.
    fn from(c: &Category) -> Value {
        object(vec![
            ("name", Value::String(c.name().to_owned())),
            ("label", Value::String(c.label().to_owned())),
        ])
    }
}

/// Converts URLs into [`Value`]s for templating.
pub fn url(url: &Url) -> Value {
    Value::String(url.to_string())
}
