//! Arguments and options for URL generation.

use std::collections::{BTreeMap, HashMap};

use routekit_pattern::{Bindings, Key, ParamValue};

use crate::error::Result;

/// Values to substitute into a layer's pattern.
///
/// Built from a map or an array of pairs (`Named`), or from a vector of values
/// consumed in pattern order (`Positional`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlArgs {
    /// Values keyed by parameter name.
    Named(Bindings),
    /// Values bound to the pattern's parameters left to right.
    Positional(Vec<ParamValue>),
}

impl UrlArgs {
    /// No bindings, for patterns without required parameters.
    pub fn none() -> Self {
        Self::Named(Bindings::new())
    }

    /// Creates named bindings.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Creates positional bindings.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Resolves the arguments against the pattern's parameters.
    pub(crate) fn into_bindings<'k>(self, keys: impl IntoIterator<Item = &'k Key>) -> Bindings {
        match self {
            Self::Named(bindings) => bindings,
            Self::Positional(values) => keys
                .into_iter()
                .zip(values)
                .map(|(key, value)| (key.name.clone(), value))
                .collect(),
        }
    }
}

impl Default for UrlArgs {
    fn default() -> Self {
        Self::none()
    }
}

impl From<()> for UrlArgs {
    fn from((): ()) -> Self {
        Self::none()
    }
}

impl<K: Into<String>, V: Into<ParamValue>, const N: usize> From<[(K, V); N]> for UrlArgs {
    fn from(pairs: [(K, V); N]) -> Self {
        Self::named(pairs)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> From<HashMap<K, V>> for UrlArgs {
    fn from(map: HashMap<K, V>) -> Self {
        Self::named(map)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> From<BTreeMap<K, V>> for UrlArgs {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::named(map)
    }
}

impl<V: Into<ParamValue>> From<Vec<V>> for UrlArgs {
    fn from(values: Vec<V>) -> Self {
        Self::positional(values)
    }
}

/// A query component for a generated URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Already-encoded query text, with or without a leading `?`.
    Raw(String),
    /// Key/value pairs, form-urlencoded in order.
    Pairs(Vec<(String, String)>),
}

impl Query {
    /// Creates a query from key/value pairs.
    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn encode(&self) -> Result<String> {
        match self {
            Self::Raw(raw) => Ok(raw.strip_prefix('?').unwrap_or(raw).to_string()),
            Self::Pairs(pairs) => Ok(serde_urlencoded::to_string(pairs)?),
        }
    }

    /// Appends this query to a path. An empty query leaves the path unchanged.
    pub(crate) fn append_to(&self, path: String) -> Result<String> {
        let query = self.encode()?;
        if query.is_empty() {
            Ok(path)
        } else {
            Ok(format!("{path}?{query}"))
        }
    }
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for Query {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

/// Options for [`Layer::url`](crate::Layer::url).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlOptions {
    /// Query component appended to the built path.
    pub query: Option<Query>,
}

impl UrlOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query component.
    #[must_use]
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }
}
