// src/matchers/predicate.rs

//! String predicates applied to captured stdout.

use std::fmt;

use regex::Regex;

/// A caller-supplied condition on a session's stdout.
pub trait OutputPredicate: Send + Sync {
    /// Human-readable form used in failure diagnostics.
    fn describe(&self) -> String;

    fn holds(&self, text: &str) -> bool;
}

/// Stdout equals the expected text exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equal(pub String);

impl OutputPredicate for Equal {
    fn describe(&self) -> String {
        format!("equal {:?}", self.0)
    }

    fn holds(&self, text: &str) -> bool {
        text == self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainSubstring(pub String);

impl OutputPredicate for ContainSubstring {
    fn describe(&self) -> String {
        format!("contain substring {:?}", self.0)
    }

    fn holds(&self, text: &str) -> bool {
        text.contains(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct MatchRegex(pub Regex);

impl OutputPredicate for MatchRegex {
    fn describe(&self) -> String {
        format!("match regular expression {:?}", self.0.as_str())
    }

    fn holds(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

/// Arbitrary closure with a description.
pub struct Satisfy<F> {
    description: String,
    check: F,
}

impl<F> fmt::Debug for Satisfy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Satisfy")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> OutputPredicate for Satisfy<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn describe(&self) -> String {
        format!("satisfy {}", self.description)
    }

    fn holds(&self, text: &str) -> bool {
        (self.check)(text)
    }
}

impl OutputPredicate for Box<dyn OutputPredicate> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn holds(&self, text: &str) -> bool {
        (**self).holds(text)
    }
}

pub fn equal(expected: impl Into<String>) -> Equal {
    Equal(expected.into())
}

pub fn contain_substring(needle: impl Into<String>) -> ContainSubstring {
    ContainSubstring(needle.into())
}

pub fn match_regex(pattern: &str) -> Result<MatchRegex, regex::Error> {
    Regex::new(pattern).map(MatchRegex)
}

pub fn satisfy<F>(description: impl Into<String>, check: F) -> Satisfy<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    Satisfy {
        description: description.into(),
        check,
    }
}
