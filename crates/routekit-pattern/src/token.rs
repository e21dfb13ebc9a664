//! Pattern tokenizer.

use std::sync::LazyLock;

use regex::Regex;

/// Matches escapes, named/unnamed parameters with modifiers, and bare asterisks.
///
/// Groups: 1 escaped char, 2 prefix, 3 name, 4 custom pattern of a named
/// parameter, 5 unnamed group, 6 modifier, 7 asterisk.
static PATH_REGEXP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\\.)|([/.])?(?:(?::(\w+)(?:\(((?:\\.|[^\\()])+)\))?|\(((?:\\.|[^\\()])+)\))([+*?])?|(\*))",
    )
    .expect("Invalid path tokenizer regex")
});

pub(crate) const DEFAULT_DELIMITER: char = '/';

/// Descriptor of one parameter in a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Parameter name. Unnamed groups are keyed by their ordinal (`"0"`, `"1"`, ...).
    pub name: String,
    /// Literal character preceding the parameter (`/`, `.` or empty).
    pub prefix: String,
    /// Separator between repeated values.
    pub delimiter: char,
    /// `?` or `*` modifier.
    pub optional: bool,
    /// `+` or `*` modifier.
    pub repeat: bool,
    /// The parameter is followed by something other than its prefix.
    pub partial: bool,
    /// Declared with a bare `*`.
    pub asterisk: bool,
    /// Regex source a single value must match.
    pub pattern: String,
}

/// A parsed piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text.
    Literal(String),
    /// A parameter.
    Param(Key),
}

impl Key {
    /// True for catch-all parameters: a bare `*` or an unnamed `(.*)` group.
    pub fn is_wildcard(&self) -> bool {
        self.asterisk || (self.pattern == ".*" && self.name.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl Token {
    /// Returns the parameter descriptor, if this is a parameter token.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::Literal(_) => None,
            Self::Param(key) => Some(key),
        }
    }
}

/// Parses a pattern into literal and parameter tokens.
///
/// # Example
///
/// ```
/// use routekit_pattern::{parse, Token};
///
/// let tokens = parse("/users/:id");
/// assert_eq!(tokens[0], Token::Literal("/users".to_string()));
/// assert_eq!(tokens[1].key().unwrap().name, "id");
/// ```
pub fn parse(path: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut unnamed = 0usize;
    let mut index = 0;
    let mut literal = String::new();

    for caps in PATH_REGEXP.captures_iter(path) {
        let Some(whole) = caps.get(0) else { continue };
        literal.push_str(&path[index..whole.start()]);
        index = whole.end();

        if let Some(escaped) = caps.get(1) {
            literal.push_str(&escaped.as_str()[1..]);
            continue;
        }

        let next = path[index..].chars().next();
        let prefix = caps.get(2).map(|m| m.as_str());
        let modifier = caps.get(6).map(|m| m.as_str());
        let asterisk = caps.get(7).is_some();

        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }

        let name = caps.get(3).map_or_else(
            || {
                let name = unnamed.to_string();
                unnamed += 1;
                name
            },
            |m| m.as_str().to_string(),
        );
        let delimiter = prefix
            .and_then(|p| p.chars().next())
            .unwrap_or(DEFAULT_DELIMITER);
        let custom = caps.get(4).or_else(|| caps.get(5)).map(|m| m.as_str());
        let pattern = match custom {
            Some(group) => group.to_string(),
            None if asterisk => ".*".to_string(),
            None => format!("[^{}]+?", regex::escape(&delimiter.to_string())),
        };

        tokens.push(Token::Param(Key {
            name,
            prefix: prefix.unwrap_or_default().to_string(),
            delimiter,
            optional: matches!(modifier, Some("?" | "*")),
            repeat: matches!(modifier, Some("+" | "*")),
            partial: prefix.is_some_and(|p| next.is_some_and(|c| !p.starts_with(c))),
            asterisk,
            pattern,
        }));
    }

    literal.push_str(&path[index..]);
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(path: &str) -> Vec<Key> {
        parse(path).into_iter().filter_map(|t| t.key().cloned()).collect()
    }

    #[test]
    fn test_literal_only() {
        assert_eq!(parse("/users"), vec![Token::Literal("/users".to_string())]);
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_named_params_in_order() {
        let names: Vec<String> = keys("/posts/:post_id/comments/:comment_id")
            .into_iter()
            .map(|k| k.name)
            .collect();
        assert_eq!(names, vec!["post_id", "comment_id"]);
    }

    #[test]
    fn test_param_defaults() {
        let key = &keys("/users/:id")[0];
        assert_eq!(key.prefix, "/");
        assert_eq!(key.delimiter, '/');
        assert_eq!(key.pattern, "[^/]+?");
        assert!(!key.optional);
        assert!(!key.repeat);
        assert!(!key.partial);
    }

    #[test]
    fn test_modifiers() {
        let ks = keys("/:a?/:b*/:c+");
        assert!(ks[0].optional && !ks[0].repeat);
        assert!(ks[1].optional && ks[1].repeat);
        assert!(!ks[2].optional && ks[2].repeat);
    }

    #[test]
    fn test_custom_and_unnamed_groups() {
        let ks = keys("/users/:id(\\d+)/(.*)");
        assert_eq!(ks[0].name, "id");
        assert_eq!(ks[0].pattern, "\\d+");
        assert_eq!(ks[1].name, "0");
        assert_eq!(ks[1].pattern, ".*");
        assert!(!ks[0].is_wildcard());
        assert!(ks[1].is_wildcard());
    }

    #[test]
    fn test_asterisk() {
        let ks = keys("/files/*");
        assert_eq!(ks.len(), 1);
        assert!(ks[0].asterisk);
        assert_eq!(ks[0].pattern, ".*");
        assert!(ks[0].is_wildcard());
        assert!(!keys("/:rest(.*)")[0].is_wildcard());
    }

    #[test]
    fn test_dot_prefix_and_partial() {
        let ks = keys("/:file.:ext");
        assert_eq!(ks[1].prefix, ".");
        assert_eq!(ks[1].pattern, "[^\\.]+?");

        let ks = keys("/:from-:to");
        assert!(ks[0].partial);
        assert_eq!(ks[1].prefix, "");
    }

    #[test]
    fn test_escaped_characters_stay_literal() {
        assert_eq!(
            parse("/api\\:v1"),
            vec![Token::Literal("/api:v1".to_string())]
        );
    }
}
