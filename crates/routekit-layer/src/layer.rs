//! The single-route layer.

use routekit_pattern::{compile, compile_builder, Key, Matcher, PatternOptions};
use tracing::{debug, trace};

use crate::config::{json_type, HandlerRegistry, LayerOptions, RouteConfig};
use crate::context::{normalize_methods, Context, Method};
use crate::error::{LayerError, Result};
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::params::{safe_decode_component, Params};
use crate::url::{UrlArgs, UrlOptions};

/// Pattern, descriptors and matcher, always compiled together.
#[derive(Debug, Clone)]
struct CompiledPath {
    path: String,
    param_names: Vec<Key>,
    regexp: Matcher,
}

impl CompiledPath {
    fn compile(path: String, options: &PatternOptions) -> Result<Self> {
        let mut param_names = Vec::new();
        let regexp = compile(&path, &mut param_names, options)?;
        Ok(Self {
            path,
            param_names,
            regexp,
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.param_names.iter().position(|key| key.name == name)
    }
}

/// A single route: methods, a compiled path and an ordered middleware stack.
///
/// # Example
///
/// ```
/// use routekit_layer::{Layer, LayerOptions, Method};
///
/// let layer = Layer::new("/users/:id", ["get"], Vec::new(), LayerOptions::default()).unwrap();
/// assert_eq!(layer.methods(), &[Method::Head, Method::Get]);
/// assert!(layer.matches("/users/42"));
///
/// let captures = layer.captures("/users/42");
/// let params = layer.params("/users/42", &captures, None);
/// assert_eq!(params.get("id"), Some("42"));
///
/// assert_eq!(layer.url([("id", 42)], None).unwrap(), "/users/42");
/// ```
#[derive(Debug, Clone)]
pub struct Layer {
    opts: LayerOptions,
    methods: Vec<Method>,
    stack: Vec<Middleware>,
    compiled: CompiledPath,
}

impl Layer {
    /// Creates a layer.
    ///
    /// Methods are uppercased, and `HEAD` is placed right before the first
    /// `GET`. Fails if the pattern does not compile.
    pub fn new<I>(
        path: impl Into<String>,
        methods: I,
        middleware: Vec<Middleware>,
        opts: LayerOptions,
    ) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let compiled = CompiledPath::compile(path.into(), &opts.pattern_options())?;
        Ok(Self {
            methods: normalize_methods(methods),
            stack: middleware,
            compiled,
            opts,
        })
    }

    /// Creates a layer from a declarative route, resolving each middleware
    /// entry by name and applying the configured mount prefix.
    pub fn from_config(config: &RouteConfig, registry: &HandlerRegistry) -> Result<Self> {
        let describe = || {
            (
                config.methods.join(","),
                config
                    .options
                    .name
                    .clone()
                    .unwrap_or_else(|| config.path.clone()),
            )
        };

        let middleware = config
            .middleware
            .iter()
            .map(|entry| match entry {
                serde_json::Value::String(handler) => {
                    registry.get(handler).cloned().ok_or_else(|| {
                        let (methods, route) = describe();
                        LayerError::UnknownHandler {
                            methods,
                            route,
                            handler: handler.clone(),
                        }
                    })
                }
                other => {
                    let (methods, route) = describe();
                    Err(LayerError::NotCallable {
                        methods,
                        route,
                        found: json_type(other),
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut layer = Self::new(
            config.path.clone(),
            &config.methods,
            middleware,
            config.options.clone(),
        )?;
        if let Some(prefix) = config.options.prefix.as_deref().filter(|p| !p.is_empty()) {
            layer.set_prefix(prefix)?;
        }
        Ok(layer)
    }

    /// Returns the path pattern.
    pub fn path(&self) -> &str {
        &self.compiled.path
    }

    /// Returns the route name, if any.
    pub fn name(&self) -> Option<&str> {
        self.opts.name.as_deref()
    }

    /// Returns the normalized methods.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the parameter descriptors in pattern order.
    pub fn param_names(&self) -> &[Key] {
        &self.compiled.param_names
    }

    /// Returns the middleware stack in execution order.
    pub fn stack(&self) -> &[Middleware] {
        &self.stack
    }

    /// Returns the layer options.
    pub fn opts(&self) -> &LayerOptions {
        &self.opts
    }

    /// Returns true if the path matches this layer.
    pub fn matches(&self, path: &str) -> bool {
        self.compiled.regexp.is_match(path)
    }

    /// Returns the raw captures for a path, one per parameter, in pattern order.
    ///
    /// Empty when captures are ignored or the path does not match.
    pub fn captures(&self, path: &str) -> Vec<Option<String>> {
        if self.opts.ignore_captures {
            return Vec::new();
        }
        self.compiled.regexp.captures(path).unwrap_or_default()
    }

    /// Merges decoded captures into `existing` (or fresh params), keyed by
    /// parameter name. Captures without a matching parameter are skipped and
    /// unrelated keys are left alone.
    pub fn params(
        &self,
        path: &str,
        captures: &[Option<String>],
        existing: Option<Params>,
    ) -> Params {
        let mut params = existing.unwrap_or_default();
        for (key, capture) in self.compiled.param_names.iter().zip(captures) {
            params.insert(
                key.name.clone(),
                capture.as_deref().map(safe_decode_component),
            );
        }
        trace!(path, pattern = self.path(), count = params.len(), "extracted params");
        params
    }

    /// Generates a URL by substituting `args` into the pattern.
    ///
    /// Catch-all parameters (`*`, `(.*)`) are left out of the result. Values
    /// are checked with the same case sensitivity as [`Layer::matches`].
    ///
    /// # Example
    ///
    /// ```
    /// use routekit_layer::{Layer, LayerOptions, UrlOptions};
    ///
    /// let layer = Layer::new("/:category/:title", ["get"], Vec::new(), LayerOptions::default()).unwrap();
    /// assert_eq!(layer.url(vec!["programming", "how-to-node"], None).unwrap(), "/programming/how-to-node");
    ///
    /// let opts = UrlOptions::new().query("page=3");
    /// assert_eq!(
    ///     layer.url([("category", "a"), ("title", "b")], Some(&opts)).unwrap(),
    ///     "/a/b?page=3"
    /// );
    /// ```
    pub fn url(&self, args: impl Into<UrlArgs>, options: Option<&UrlOptions>) -> Result<String> {
        let builder =
            compile_builder(self.path(), &self.opts.pattern_options())?.without_wildcards();
        let bindings = args.into().into_bindings(builder.keys());
        let path = builder.build(&bindings)?;

        match options.and_then(|o| o.query.as_ref()) {
            Some(query) => query.append_to(path),
            None => Ok(path),
        }
    }

    /// Registers a validator for the named parameter.
    ///
    /// The validator runs before every untagged handler and after validators
    /// of parameters declared earlier in the pattern. Validators for
    /// parameters the pattern does not declare are dropped.
    ///
    /// Ranks are read from the current pattern, so after [`Layer::set_prefix`]
    /// a validator for a newly prefixed parameter goes ahead of validators for
    /// parameters declared after it. A tagged entry whose parameter the
    /// pattern no longer declares ranks like an untagged handler, and new
    /// validators are inserted before it.
    pub fn param<F>(&mut self, name: &str, validator: F) -> &mut Self
    where
        F: for<'a> Fn(Option<String>, &'a mut Context, Next<'a>) -> BoxFuture<'a, Result<()>>
            + Send
            + Sync
            + 'static,
    {
        let Some(rank) = self.compiled.position(name) else {
            debug!(param = name, path = self.path(), "pattern has no such parameter, validator ignored");
            return self;
        };

        let at = self
            .stack
            .iter()
            .position(|mw| self.rank(mw) > rank)
            .unwrap_or(self.stack.len());
        self.stack.insert(at, Middleware::for_param(name, validator));
        debug!(param = name, path = self.path(), position = at, "registered param validator");
        self
    }

    /// Untagged handlers rank after every parameter.
    fn rank(&self, mw: &Middleware) -> usize {
        mw.param()
            .and_then(|name| self.compiled.position(name))
            .unwrap_or(usize::MAX)
    }

    /// Prepends `prefix` to the pattern and recompiles it.
    ///
    /// Does nothing if the pattern is empty. On error the layer is unchanged.
    pub fn set_prefix(&mut self, prefix: &str) -> Result<&mut Self> {
        if self.compiled.path.is_empty() {
            return Ok(self);
        }
        let path = format!("{prefix}{}", self.compiled.path);
        self.compiled = CompiledPath::compile(path, &self.opts.pattern_options())?;
        debug!(prefix, path = self.path(), "prefixed layer");
        Ok(self)
    }

    /// Parses this layer's params into the context and runs the stack.
    pub fn handle<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a, Result<()>> {
        let captures = self.captures(&ctx.path);
        let existing = std::mem::take(&mut ctx.params);
        ctx.params = self.params(&ctx.path, &captures, Some(existing));
        Next::new(&self.stack).run(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{self, FutureExt};
    use routekit_pattern::BuildError;

    fn layer(path: &str) -> Layer {
        Layer::new(path, ["get"], Vec::new(), LayerOptions::default()).unwrap()
    }

    fn noop() -> Middleware {
        Middleware::new(|ctx, next| next.run(ctx))
    }

    fn pass<'a>(
        _value: Option<String>,
        ctx: &'a mut Context,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        next.run(ctx)
    }

    fn tags(layer: &Layer) -> Vec<Option<&str>> {
        layer.stack().iter().map(Middleware::param).collect()
    }

    #[test]
    fn test_new_normalizes_methods() {
        let l = Layer::new("/", ["get", "post"], Vec::new(), LayerOptions::default()).unwrap();
        assert_eq!(l.methods(), &[Method::Head, Method::Get, Method::Post]);
    }

    #[test]
    fn test_new_rejects_bad_pattern() {
        let err = Layer::new("/:id([)", ["get"], Vec::new(), LayerOptions::default());
        assert!(matches!(err, Err(LayerError::Pattern(_))));
    }

    #[test]
    fn test_descriptor_count_matches_captures() {
        let l = layer("/:a/:b?/(.*)");
        assert_eq!(l.param_names().len(), l.captures("/x/y/z").len());
    }

    #[test]
    fn test_captures() {
        let l = layer("/users/:id");
        assert_eq!(l.captures("/users/42"), vec![Some("42".to_string())]);
        assert!(l.captures("/posts/42").is_empty());
    }

    #[test]
    fn test_ignore_captures() {
        let l = Layer::new(
            "/users/:id",
            ["get"],
            Vec::new(),
            LayerOptions::new().ignore_captures(true),
        )
        .unwrap();
        assert!(l.matches("/users/42"));
        assert!(l.captures("/users/42").is_empty());
    }

    #[test]
    fn test_params_merge_into_existing() {
        let l = layer("/users/:id");
        let mut existing = Params::new();
        existing.insert("org", Some("acme".to_string()));
        existing.insert("id", Some("stale".to_string()));

        let params = l.params("/users/9", &l.captures("/users/9"), Some(existing));
        assert_eq!(params.get("org"), Some("acme"));
        assert_eq!(params.get("id"), Some("9"));
    }

    #[test]
    fn test_params_decode_and_fallback() {
        let l = layer("/search/:term");
        let params = l.params("/search/a%20b", &l.captures("/search/a%20b"), None);
        assert_eq!(params.get("term"), Some("a b"));

        let params = l.params("/search/%zz", &l.captures("/search/%zz"), None);
        assert_eq!(params.get("term"), Some("%zz"));
    }

    #[test]
    fn test_params_ignores_positions_without_descriptor() {
        let l = layer("/users/:id");
        let captures = vec![Some("1".to_string()), Some("extra".to_string())];
        let params = l.params("/users/1", &captures, None);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_params_absent_optional_capture() {
        let l = layer("/users/:id?");
        let params = l.params("/users", &l.captures("/users"), None);
        assert!(params.contains("id"));
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_url_strips_catch_all() {
        let l = layer("/files/:dir/(.*)");
        assert_eq!(l.url([("dir", "docs")], None).unwrap(), "/files/docs/");
    }

    #[test]
    fn test_url_drops_asterisk() {
        assert_eq!(layer("/files/*").url((), None).unwrap(), "/files/");
        assert_eq!(
            layer("/files/:dir/*").url([("dir", "img")], None).unwrap(),
            "/files/img/"
        );
    }

    #[test]
    fn test_url_custom_pattern_follows_sensitivity() {
        let l = layer("/codes/:code([a-z]+)");
        assert!(l.matches("/codes/ABC"));
        assert_eq!(l.url([("code", "ABC")], None).unwrap(), "/codes/ABC");

        let l = Layer::new(
            "/codes/:code([a-z]+)",
            ["get"],
            Vec::new(),
            LayerOptions::new().sensitive(true),
        )
        .unwrap();
        assert!(!l.matches("/codes/ABC"));
        assert!(matches!(
            l.url([("code", "ABC")], None),
            Err(LayerError::Build(BuildError::Mismatch { .. }))
        ));
    }

    #[test]
    fn test_url_keeps_sub_delimiters() {
        let l = layer("/u/:email([\\w@.]+)");
        assert!(l.matches("/u/a@b.com"));
        assert_eq!(l.url([("email", "a@b.com")], None).unwrap(), "/u/a@b.com");
    }

    #[test]
    fn test_url_missing_param_errors() {
        let err = layer("/users/:id").url(UrlArgs::none(), None).unwrap_err();
        assert!(matches!(
            err,
            LayerError::Build(BuildError::Missing { ref name }) if name == "id"
        ));
    }

    #[test]
    fn test_url_without_params() {
        let opts = UrlOptions::new().query(crate::Query::pairs([("a", "1")]));
        assert_eq!(layer("/about").url((), Some(&opts)).unwrap(), "/about?a=1");
    }

    #[test]
    fn test_param_orders_by_declaration() {
        let mut l = Layer::new("/:x/:y", ["get"], vec![noop()], LayerOptions::default()).unwrap();
        l.param("y", pass).param("x", pass);
        assert_eq!(tags(&l), vec![Some("x"), Some("y"), None]);
    }

    #[test]
    fn test_param_same_name_keeps_registration_order() {
        let mut l = Layer::new("/:x", ["get"], vec![noop()], LayerOptions::default()).unwrap();
        l.param("x", pass).param("x", pass);
        assert_eq!(tags(&l), vec![Some("x"), Some("x"), None]);
    }

    #[test]
    fn test_param_unknown_name_is_noop() {
        let mut l = Layer::new("/:x", ["get"], vec![noop()], LayerOptions::default()).unwrap();
        l.param("nope", pass);
        assert_eq!(tags(&l), vec![None]);
    }

    #[test]
    fn test_param_appends_when_stack_has_no_later_entry() {
        let mut l = layer("/:x/:y");
        l.param("x", pass).param("y", pass);
        assert_eq!(tags(&l), vec![Some("x"), Some("y")]);
    }

    #[test]
    fn test_param_ranks_follow_prefixed_pattern() {
        let mut l = Layer::new("/users/:id", ["get"], vec![noop()], LayerOptions::default()).unwrap();
        l.param("id", pass);
        l.set_prefix("/orgs/:org").unwrap();
        l.param("org", pass);
        assert_eq!(tags(&l), vec![Some("org"), Some("id"), None]);
    }

    #[test]
    fn test_set_prefix_recompiles() {
        let mut l = layer("/users/:id");
        l.set_prefix("/api").unwrap();
        assert_eq!(l.path(), "/api/users/:id");
        assert!(l.matches("/api/users/7"));
        assert!(!l.matches("/users/7"));
    }

    #[test]
    fn test_set_prefix_replaces_descriptors() {
        let mut l = layer("/users/:id");
        l.set_prefix("/orgs/:org").unwrap();
        let names: Vec<&str> = l.param_names().iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["org", "id"]);
        let params = l.params("/orgs/a/users/1", &l.captures("/orgs/a/users/1"), None);
        assert_eq!(params.get("org"), Some("a"));
        assert_eq!(params.get("id"), Some("1"));
    }

    #[test]
    fn test_set_prefix_on_empty_path_is_noop() {
        let mut l = layer("");
        l.set_prefix("/api").unwrap();
        assert_eq!(l.path(), "");
    }

    #[test]
    fn test_set_prefix_failure_leaves_layer_unchanged() {
        let mut l = layer("/users/:id");
        assert!(l.set_prefix("/:bad([)").is_err());
        assert_eq!(l.path(), "/users/:id");
        assert!(l.matches("/users/1"));
    }

    #[tokio::test]
    async fn test_handle_any_method() {
        let l = Layer::new("/users/:id", ["post"], vec![noop()], LayerOptions::default()).unwrap();
        let mut ctx = Context::post("/users/8");
        l.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.method, Method::Post);
        assert_eq!(ctx.params.get("id"), Some("8"));
    }

    #[tokio::test]
    async fn test_handle_populates_params() {
        let show = Middleware::new(|ctx, _next| {
            let id = ctx.params.get("id").unwrap_or_default().to_string();
            ctx.set_state("shown", id);
            future::ready(Ok(())).boxed()
        });
        let l = Layer::new("/users/:id", ["get"], vec![show], LayerOptions::default()).unwrap();
        let mut ctx = Context::get("/users/5");
        l.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.get_state("shown"), Some(&"5".into()));
    }
}
