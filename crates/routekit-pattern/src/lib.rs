//! # routekit-pattern
//!
//! Express-style path patterns for routekit.
//!
//! This crate provides:
//! - A tokenizer turning `/users/:id` into literal and parameter tokens
//! - A compiled matcher with ordered parameter descriptors
//! - A reverse builder that substitutes values back into a pattern
//!
//! ## Quick Start
//!
//! ```
//! use routekit_pattern::{compile, compile_builder, Bindings, PatternOptions};
//!
//! let mut keys = Vec::new();
//! let matcher = compile("/users/:id", &mut keys, &PatternOptions::default()).unwrap();
//! assert!(matcher.is_match("/users/42"));
//! assert_eq!(keys[0].name, "id");
//!
//! let builder = compile_builder("/users/:id", &PatternOptions::default()).unwrap();
//! let mut bindings = Bindings::new();
//! bindings.insert("id".to_string(), 42.into());
//! assert_eq!(builder.build(&bindings).unwrap(), "/users/42");
//! ```
//!
//! ## Pattern Syntax
//!
//! - `:name` matches one segment
//! - `:name(regex)` matches a custom pattern
//! - `(regex)` and `*` are unnamed parameters keyed `"0"`, `"1"`, ...
//! - `?`, `*` and `+` make a parameter optional, repeated, or both

mod builder;
mod error;
mod path;
mod token;

pub use builder::{compile_builder, Bindings, ParamValue, PathBuilder};
pub use error::{BuildError, PatternError, Result};
pub use path::{compile, Matcher, PatternOptions};
pub use token::{parse, Key, Token};
