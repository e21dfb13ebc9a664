//! # routekit-layer
//!
//! The per-route building block of an HTTP router.
//!
//! This crate provides:
//! - Path matching and capture extraction for one route pattern
//! - Lenient percent-decoding of path parameters
//! - URL generation from named or positional values
//! - An ordered middleware stack with parameter validators
//! - Mount-prefix rewriting
//!
//! ## Quick Start
//!
//! ```
//! use routekit_layer::{Layer, LayerOptions, Method};
//!
//! let layer = Layer::new("/users/:id", ["get"], Vec::new(), LayerOptions::default()).unwrap();
//!
//! assert_eq!(layer.methods(), &[Method::Head, Method::Get]);
//! assert!(layer.matches("/users/42"));
//!
//! let captures = layer.captures("/users/42");
//! let params = layer.params("/users/42", &captures, None);
//! assert_eq!(params.get("id"), Some("42"));
//! ```
//!
//! ## Parameter Validators
//!
//! Validators run in the order their parameters appear in the pattern, ahead
//! of every other handler, whatever order they were registered in:
//!
//! ```
//! use futures::FutureExt;
//! use routekit_layer::{Layer, LayerError, LayerOptions, Middleware};
//!
//! let show = Middleware::new(|ctx, next| next.run(ctx));
//! let mut layer = Layer::new("/:user/:post", ["get"], vec![show], LayerOptions::default()).unwrap();
//!
//! layer
//!     .param("post", |value, ctx, next| {
//!         async move {
//!             if value.is_none() {
//!                 return Err(LayerError::Middleware("missing post".to_string()));
//!             }
//!             next.run(ctx).await
//!         }
//!         .boxed()
//!     })
//!     .param("user", |_value, ctx, next| next.run(ctx));
//!
//! let order: Vec<_> = layer.stack().iter().map(|mw| mw.param()).collect();
//! assert_eq!(order, vec![Some("user"), Some("post"), None]);
//! ```
//!
//! ## Mounting
//!
//! ```
//! use routekit_layer::{Layer, LayerOptions};
//!
//! let mut layer = Layer::new("/users/:id", ["get"], Vec::new(), LayerOptions::default()).unwrap();
//! layer.set_prefix("/api").unwrap();
//! assert!(layer.matches("/api/users/7"));
//! assert!(!layer.matches("/users/7"));
//! ```

mod config;
mod context;
mod error;
mod layer;
mod middleware;
mod params;
mod url;

pub use config::{HandlerRegistry, LayerOptions, RouteConfig};
pub use context::{Context, Method};
pub use error::{LayerError, Result};
pub use layer::Layer;
pub use middleware::{BoxFuture, Middleware, Next};
pub use params::{safe_decode_component, Params};
pub use routekit_pattern::{BuildError, Key, ParamValue, PatternError};
pub use url::{Query, UrlArgs, UrlOptions};
