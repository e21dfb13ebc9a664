//! Request methods and the per-request context passed through a layer's stack.

use serde_json::{Map, Value};

use crate::params::Params;

/// HTTP request methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// HEAD method
    Head,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// OPTIONS method
    Options,
    /// CONNECT method
    Connect,
    /// TRACE method
    Trace,
    /// Any other method token, stored uppercase.
    Extension(String),
}

impl Method {
    /// Parses a method token, case-insensitively.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "HEAD" => Self::Head,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "OPTIONS" => Self::Options,
            "CONNECT" => Self::Connect,
            "TRACE" => Self::Trace,
            other => Self::Extension(other.to_string()),
        }
    }

    /// Returns the method as an uppercase string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Extension(token) => token,
        }
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalizes a method list: uppercases each token and, when `GET` is
/// present, places `HEAD` immediately before the first `GET`.
pub(crate) fn normalize_methods<I>(methods: I) -> Vec<Method>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let parsed: Vec<Method> = methods
        .into_iter()
        .map(|m| Method::parse(m.as_ref()))
        .collect();

    let Some(first_get) = parsed.iter().position(|m| *m == Method::Get) else {
        return parsed;
    };

    let mut normalized = Vec::with_capacity(parsed.len() + 1);
    for (i, method) in parsed.into_iter().enumerate() {
        if i == first_get {
            normalized.push(Method::Head);
        }
        if method != Method::Head {
            normalized.push(method);
        }
    }
    normalized
}

/// Per-request state handed to every middleware in a layer's stack.
#[derive(Debug, Clone)]
pub struct Context {
    /// HTTP method.
    pub method: Method,
    /// Request path, without the query string.
    pub path: String,
    /// Path parameters parsed so far.
    pub params: Params,
    /// Free-form data shared between middleware.
    pub state: Map<String, Value>,
}

impl Context {
    /// Creates a new context.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            state: Map::new(),
        }
    }

    /// Creates a GET context.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST context.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Stores a value in the shared state.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.insert(key.into(), value.into());
    }

    /// Gets a value from the shared state.
    pub fn get_state(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }
}
