//! Reverse path building.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{BuildError, PatternError, Result};
use crate::path::PatternOptions;
use crate::token::{parse, Key, Token};

/// Characters besides the unreserved set that stay literal in a built segment.
const SEGMENT_SAFE: &[char] = &[
    ';', ',', ':', '@', '&', '=', '+', '$', '!', '*', '\'', '(', ')',
];

/// A value bound to a pattern token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A single segment.
    One(String),
    /// Values for a repeated (`*` or `+`) token.
    Many(Vec<String>),
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::One(value.clone())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

macro_rules! param_value_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::One(value.to_string())
                }
            }
        )*
    };
}

param_value_from_display!(i32, i64, u32, u64, usize, bool);

/// Token name to value bindings used by [`PathBuilder::build`].
pub type Bindings = HashMap<String, ParamValue>;

/// Substitutes bindings back into a pattern.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    tokens: Vec<Token>,
    /// One anchored matcher per token; `None` for literals.
    matchers: Vec<Option<Regex>>,
}

/// Compiles a pattern into a reverse path builder.
///
/// Values are checked against their token pattern with the same case
/// sensitivity the matcher uses.
///
/// # Example
///
/// ```
/// use routekit_pattern::{compile_builder, Bindings, PatternOptions};
///
/// let builder = compile_builder("/posts/:id", &PatternOptions::default()).unwrap();
/// let mut bindings = Bindings::new();
/// bindings.insert("id".to_string(), "123".into());
/// assert_eq!(builder.build(&bindings).unwrap(), "/posts/123");
/// ```
pub fn compile_builder(path: &str, options: &PatternOptions) -> Result<PathBuilder> {
    let flags = if options.sensitive { "" } else { "(?i)" };
    let tokens = parse(path);
    let matchers = tokens
        .iter()
        .map(|token| {
            token
                .key()
                .map(|key| Regex::new(&format!("{flags}^(?:{})$", key.pattern)))
                .transpose()
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| PatternError::InvalidRegex {
            path: path.to_string(),
            source,
        })?;

    Ok(PathBuilder { tokens, matchers })
}

impl PathBuilder {
    /// Returns the parameter descriptors in pattern order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.tokens.iter().filter_map(Token::key)
    }

    /// Drops catch-all parameters (`*` and `(.*)`), keeping their prefix as
    /// literal text.
    ///
    /// ```
    /// use routekit_pattern::{compile_builder, Bindings, PatternOptions};
    ///
    /// let builder = compile_builder("/files/*", &PatternOptions::default())
    ///     .unwrap()
    ///     .without_wildcards();
    /// assert_eq!(builder.build(&Bindings::new()).unwrap(), "/files/");
    /// ```
    #[must_use]
    pub fn without_wildcards(self) -> Self {
        let (tokens, matchers): (Vec<Token>, Vec<Option<Regex>>) = self
            .tokens
            .into_iter()
            .zip(self.matchers)
            .map(|(token, matcher)| match token {
                Token::Param(key) if key.is_wildcard() => (Token::Literal(key.prefix), None),
                token => (token, matcher),
            })
            .unzip();
        Self { tokens, matchers }
    }

    /// Builds a concrete path. Values are percent-encoded before being checked
    /// against their token's pattern.
    pub fn build(&self, bindings: &Bindings) -> std::result::Result<String, BuildError> {
        let mut path = String::new();

        for (token, matcher) in self.tokens.iter().zip(&self.matchers) {
            let key = match token {
                Token::Literal(s) => {
                    path.push_str(s);
                    continue;
                }
                Token::Param(key) => key,
            };
            let Some(matcher) = matcher else { continue };

            match bindings.get(&key.name) {
                None => {
                    if !key.optional {
                        return Err(BuildError::Missing {
                            name: key.name.clone(),
                        });
                    }
                    if key.partial {
                        path.push_str(&key.prefix);
                    }
                }
                Some(ParamValue::Many(values)) => {
                    if !key.repeat {
                        return Err(BuildError::NotRepeatable {
                            name: key.name.clone(),
                        });
                    }
                    if values.is_empty() && !key.optional {
                        return Err(BuildError::Empty {
                            name: key.name.clone(),
                        });
                    }
                    for (i, value) in values.iter().enumerate() {
                        let segment = check(key, matcher, encode_segment(key, value))?;
                        if i == 0 {
                            path.push_str(&key.prefix);
                        } else {
                            path.push(key.delimiter);
                        }
                        path.push_str(&segment);
                    }
                }
                Some(ParamValue::One(value)) => {
                    let segment = check(key, matcher, encode_segment(key, value))?;
                    path.push_str(&key.prefix);
                    path.push_str(&segment);
                }
            }
        }

        Ok(path)
    }
}

fn encode_segment(key: &Key, value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        // Catch-alls keep their slashes.
        if SEGMENT_SAFE.contains(&c) || (key.asterisk && c == '/') {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    encoded
}

fn check(key: &Key, matcher: &Regex, segment: String) -> std::result::Result<String, BuildError> {
    if matcher.is_match(&segment) {
        Ok(segment)
    } else {
        Err(BuildError::Mismatch {
            name: key.name.clone(),
            pattern: key.pattern.clone(),
            segment,
        })
    }
}
