//! Layer options and declarative route configuration.

use std::collections::HashMap;

use routekit_pattern::PatternOptions;
use serde::Deserialize;
use serde_json::Value;

use crate::middleware::Middleware;

/// Options recognized by a [`Layer`](crate::Layer).
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use routekit_layer::LayerOptions;
///
/// let opts: LayerOptions =
///     serde_json::from_str(r#"{"name": "user", "strict": true}"#).unwrap();
/// assert_eq!(opts.name.as_deref(), Some("user"));
/// assert!(opts.end);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayerOptions {
    /// Route identifier, used for reverse lookups and error messages.
    pub name: Option<String>,
    /// Match case-sensitively.
    pub sensitive: bool,
    /// Require the exact trailing-slash form.
    pub strict: bool,
    /// Anchor the match at the end of the path. Routers mounting middleware
    /// under a path set this to false.
    pub end: bool,
    /// Skip capture extraction entirely.
    pub ignore_captures: bool,
    /// Mount-path prefix applied when the route is registered.
    pub prefix: Option<String>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            name: None,
            sensitive: false,
            strict: false,
            end: true,
            ignore_captures: false,
            prefix: None,
        }
    }
}

impl LayerOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets case-sensitive matching.
    #[must_use]
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Sets strict trailing-slash matching.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets whether the match is anchored at the end of the path.
    #[must_use]
    pub fn end(mut self, end: bool) -> Self {
        self.end = end;
        self
    }

    /// Disables capture extraction.
    #[must_use]
    pub fn ignore_captures(mut self, ignore: bool) -> Self {
        self.ignore_captures = ignore;
        self
    }

    /// Sets the mount-path prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Returns the subset of options the pattern compiler understands.
    pub fn pattern_options(&self) -> PatternOptions {
        PatternOptions {
            sensitive: self.sensitive,
            strict: self.strict,
            end: self.end,
        }
    }
}

/// A route declared as data, e.g. loaded from a JSON routes file.
///
/// `middleware` entries are resolved against a [`HandlerRegistry`]; only
/// strings naming a registered handler are callable.
///
/// ```
/// use routekit_layer::RouteConfig;
///
/// let config: RouteConfig = serde_json::from_str(
///     r#"{"path": "/users/:id", "methods": ["get"], "middleware": ["show_user"]}"#,
/// )
/// .unwrap();
/// assert_eq!(config.methods, vec!["get"]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteConfig {
    /// Path pattern.
    pub path: String,
    /// Method tokens, in any case.
    #[serde(default)]
    pub methods: Vec<String>,
    /// Handler references.
    #[serde(default)]
    pub middleware: Vec<Value>,
    /// Layer options.
    #[serde(default)]
    pub options: LayerOptions,
}

/// Named handlers available to declarative routes.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Middleware>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, handler: Middleware) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Looks up a handler.
    pub fn get(&self, name: &str) -> Option<&Middleware> {
        self.handlers.get(name)
    }
}

/// Returns the JSON type name of a value, for error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = LayerOptions::default();
        assert!(opts.end);
        assert!(!opts.sensitive && !opts.strict && !opts.ignore_captures);
        assert_eq!(opts.name, None);
    }

    #[test]
    fn test_builder() {
        let opts = LayerOptions::new()
            .name("users")
            .sensitive(true)
            .prefix("/api");
        assert_eq!(opts.name.as_deref(), Some("users"));
        assert!(opts.pattern_options().sensitive);
        assert_eq!(opts.prefix.as_deref(), Some("/api"));
    }

    #[test]
    fn test_route_config_deserialize() {
        let config: RouteConfig = serde_json::from_str(
            r#"{
                "path": "/users/:id",
                "methods": ["get", "put"],
                "middleware": ["load_user", 7],
                "options": {"name": "user", "ignore_captures": true}
            }"#,
        )
        .unwrap();
        assert_eq!(config.middleware.len(), 2);
        assert_eq!(config.options.name.as_deref(), Some("user"));
        assert!(config.options.ignore_captures);
        assert!(config.options.end);
    }

    #[test]
    fn test_json_type() {
        assert_eq!(json_type(&Value::Null), "null");
        assert_eq!(json_type(&serde_json::json!(1)), "number");
        assert_eq!(json_type(&serde_json::json!({})), "object");
    }
}
