//! Path pattern matching.

use regex::Regex;
use serde::Deserialize;

use crate::error::{PatternError, Result};
use crate::token::{parse, Key, Token, DEFAULT_DELIMITER};

/// Options controlling how a pattern is turned into a matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatternOptions {
    /// Match case-sensitively.
    pub sensitive: bool,
    /// Require the exact trailing-slash form.
    pub strict: bool,
    /// Anchor the match at the end of the path. When false, the pattern
    /// matches any path it is a segment-aligned prefix of.
    pub end: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            sensitive: false,
            strict: false,
            end: true,
        }
    }
}

/// A compiled matcher for concrete request paths.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Returns true if the path is accepted.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Returns the capture groups for a path, excluding the whole match.
    ///
    /// Returns `None` if the path does not match.
    ///
    /// # Example
    ///
    /// ```
    /// use routekit_pattern::{compile, PatternOptions};
    ///
    /// let mut keys = Vec::new();
    /// let matcher = compile("/posts/:id/comments/:comment_id", &mut keys, &PatternOptions::default()).unwrap();
    /// let caps = matcher.captures("/posts/123/comments/456").unwrap();
    /// assert_eq!(caps, vec![Some("123".to_string()), Some("456".to_string())]);
    /// ```
    pub fn captures(&self, path: &str) -> Option<Vec<Option<String>>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect(),
        )
    }

    /// Number of capture groups, excluding the whole match.
    pub fn capture_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Returns the generated regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// Compiles a pattern into a matcher, appending its parameter descriptors to `keys`.
///
/// Pattern syntax:
/// - `/users` - Literal path
/// - `/users/:id` - Path with parameter
/// - `/users/:id(\\d+)` - Parameter with a custom pattern
/// - `/users/:id?`, `/files/:path*`, `/tags/:tag+` - Optional and repeated parameters
/// - `/files/(.*)` or `/files/*` - Unnamed parameters, keyed by ordinal
pub fn compile(path: &str, keys: &mut Vec<Key>, options: &PatternOptions) -> Result<Matcher> {
    tokens_to_matcher(&parse(path), keys, options).map_err(|source| PatternError::InvalidRegex {
        path: path.to_string(),
        source,
    })
}

fn tokens_to_matcher(
    tokens: &[Token],
    keys: &mut Vec<Key>,
    options: &PatternOptions,
) -> std::result::Result<Matcher, regex::Error> {
    let mut route = String::new();

    for token in tokens {
        match token {
            Token::Literal(s) => route.push_str(&regex::escape(s)),
            Token::Param(key) => {
                // Validate the custom pattern on its own so a stray group
                // cannot silently shift capture positions.
                Regex::new(&key.pattern)?;

                let prefix = regex::escape(&key.prefix);
                let mut capture = format!("(?:{})", key.pattern);
                if key.repeat {
                    capture = format!("{capture}(?:{prefix}{capture})*");
                }

                let group = if !key.optional {
                    format!("{prefix}({capture})")
                } else if key.partial {
                    format!("{prefix}({capture})?")
                } else {
                    format!("(?:{prefix}({capture}))?")
                };
                route.push_str(&group);
                keys.push(key.clone());
            }
        }
    }

    let delimiter = regex::escape(&DEFAULT_DELIMITER.to_string());
    let ends_with_delimiter = route.ends_with(&delimiter);

    if !options.strict {
        if ends_with_delimiter {
            route.truncate(route.len() - delimiter.len());
        }
        route.push_str(&format!("(?:{delimiter})?"));
    }

    if options.end {
        route.push('$');
    } else if !(options.strict && ends_with_delimiter) {
        route.push_str(&format!("(?:{delimiter}|$)"));
    }

    let flags = if options.sensitive { "" } else { "(?i)" };
    let regex = Regex::new(&format!("{flags}^{route}"))?;
    Ok(Matcher { regex })
}
