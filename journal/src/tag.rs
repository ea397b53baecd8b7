//! Inline `@name` / `@name(value)` tags.
//!
//! Grammar, applied anywhere in a line:
//!
//! ```text
//! tag   := '@' name ( '(' value ')' | ws* )?
//! name  := [^(\s]+          trimmed
//! value := [^)]*            shortest match
//! ```
//!
//! Every occurrence is returned in left-to-right order. Duplicates are kept.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([^(\s]+)(?:\(([^)]*?)\)|\s*?)?").expect("tag grammar compiles")
});

#[allow(clippy::expect_used)]
static ONE_ON_ONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:one)/(.*?)/(.*)$").expect("one-on-one pattern compiles"));

/// Name of the tag that creates quick links.
pub const QUICK: &str = "quick";

/// Name of the tag that stops tag scanning after its line.
pub const NOSCAN: &str = "noscan";

/// Name of the tag that marks an entry for the "Open With" attribute.
pub const FT: &str = "ft";

/// Name of the tag carrying a project path.
pub const PROJECT: &str = "project";

/// A single parsed tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    name: String,
    value: Option<String>,
}

impl Tag {
    /// A tag without a value, e.g. `@ft`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// A tag with a value, e.g. `@quick(daily/2009-11-28)`.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// All tags found in `line`, in order.
    pub fn parse(line: &str) -> Vec<Tag> {
        TAG_RE
            .captures_iter(line)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str().trim();
                let value = caps.get(2).map(|m| m.as_str().to_string());
                Some(Tag {
                    name: name.to_string(),
                    value,
                })
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The date of a `@quick(daily/<date>)` tag.
    pub fn daily(&self) -> Option<&str> {
        self.quick_value()?
            .strip_prefix("daily/")
            .filter(|date| !date.is_empty())
    }

    /// `(person, date)` of a `@quick(One/<person>/<date>)` tag.
    pub fn one_on_one(&self) -> Option<(&str, &str)> {
        let caps = ONE_ON_ONE_RE.captures(self.quick_value()?)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    fn quick_value(&self) -> Option<&str> {
        if self.name != QUICK {
            return None;
        }
        self.value().filter(|v| !v.is_empty())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "@{}({value})", self.name),
            None => write!(f, "@{}", self.name),
        }
    }
}
