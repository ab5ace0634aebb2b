//! Path filters
//!
//! Decides whether a test path (the ordered names from the root of the test
//! tree down to a leaf, e.g. `["es6", "bindings", "const", "basic support"]`)
//! is part of a generation run.
//!
//! A filter string such as `es6//const` is split on `/`. Each non-empty,
//! non-`*` segment is a regular expression constraining the path segment at
//! the same position; empty and `*` segments accept anything. A filter with a
//! single segment is *relaxed*: it accepts a path if any of its segments
//! matches.

mod presets;

pub use presets::{preset, PRESETS};

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A constraint on a single path segment.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Accepts any segment, including a missing one.
    Wildcard,
    /// Accepts segments the expression finds a match in.
    Regex(Regex),
}

impl Pattern {
    /// Parse one filter segment.
    pub fn parse(segment: &str) -> Result<Self> {
        if segment.is_empty() || segment == "*" {
            return Ok(Pattern::Wildcard);
        }
        Regex::new(segment)
            .map(Pattern::Regex)
            .map_err(|e| Error::InvalidFilter {
                filter: segment.to_string(),
                message: e.to_string(),
            })
    }

    /// Test a path segment; a missing segment is matched as `""`.
    pub fn matches(&self, segment: Option<&str>) -> bool {
        match self {
            Pattern::Wildcard => true,
            Pattern::Regex(re) => re.is_match(segment.unwrap_or("")),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Wildcard => write!(f, "*"),
            Pattern::Regex(re) => write!(f, "{}", re.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// One include or exclude filter.
#[derive(Debug, Clone)]
pub enum FilterSpec {
    /// Matches when the pattern matches any segment of the path.
    Single(Pattern),
    /// Pattern `i` must match path segment `i`; extra path segments are free.
    Positional(Vec<Pattern>),
}

impl FilterSpec {
    /// Returns true if `path` satisfies this filter.
    pub fn matches<S: AsRef<str>>(&self, path: &[S]) -> bool {
        match self {
            FilterSpec::Single(pattern) => path
                .iter()
                .any(|segment| pattern.matches(Some(segment.as_ref()))),
            FilterSpec::Positional(patterns) => patterns
                .iter()
                .enumerate()
                .all(|(i, pattern)| pattern.matches(path.get(i).map(AsRef::as_ref))),
        }
    }
}

impl FromStr for FilterSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut patterns = s
            .split('/')
            .map(Pattern::parse)
            .collect::<Result<Vec<_>>>()?;
        if patterns.len() == 1 {
            Ok(FilterSpec::Single(patterns.remove(0)))
        } else {
            Ok(FilterSpec::Positional(patterns))
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Single(pattern) => write!(f, "{}", pattern),
            FilterSpec::Positional(patterns) => {
                let parts: Vec<String> = patterns.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join("/"))
            }
        }
    }
}

/// Returns true if `path` matches at least one of `filters`.
pub fn match_any<S: AsRef<str>>(filters: &[FilterSpec], path: &[S]) -> bool {
    filters.iter().any(|filter| filter.matches(path))
}

// ---------------------------------------------------------------------------
// Acceptance
// ---------------------------------------------------------------------------

/// Include and exclude lists for a generation run.
///
/// `None` and an empty list both mean "no constraint": a missing include list
/// includes everything, a missing exclude list excludes nothing.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    /// Paths must match one of these, if present.
    pub includes: Option<Vec<FilterSpec>>,
    /// Paths matching one of these are rejected.
    pub excludes: Option<Vec<FilterSpec>>,
}

/// Why a path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No include filter matched.
    NotIncluded,
    /// An exclude filter matched.
    Excluded,
}

impl PathFilter {
    /// Build a filter from optional include/exclude lists.
    pub fn new(includes: Option<Vec<FilterSpec>>, excludes: Option<Vec<FilterSpec>>) -> Self {
        Self { includes, excludes }
    }

    /// Parse include/exclude filter strings; empty lists become `None`.
    pub fn parse<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Result<Self> {
        Ok(Self::new(parse_list(includes)?, parse_list(excludes)?))
    }

    /// Check `path` against the include and exclude lists.
    pub fn check<S: AsRef<str>>(&self, path: &[S]) -> std::result::Result<(), Rejection> {
        let included = match &self.includes {
            Some(list) if !list.is_empty() => match_any(list, path),
            _ => true,
        };
        if !included {
            return Err(Rejection::NotIncluded);
        }
        let excluded = match &self.excludes {
            Some(list) if !list.is_empty() => match_any(list, path),
            _ => false,
        };
        if excluded {
            return Err(Rejection::Excluded);
        }
        Ok(())
    }

    /// Returns true if `path` is included and not excluded.
    pub fn accept<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.check(path).is_ok()
    }
}

fn parse_list<S: AsRef<str>>(items: &[S]) -> Result<Option<Vec<FilterSpec>>> {
    if items.is_empty() {
        return Ok(None);
    }
    items
        .iter()
        .map(|item| item.as_ref().parse())
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(s: &str) -> FilterSpec {
        s.parse().unwrap()
    }

    fn path(s: &str) -> Vec<String> {
        s.split('/').map(String::from).collect()
    }

    #[test]
    fn test_wildcard_matches_missing_segment() {
        assert!(Pattern::Wildcard.matches(None));
        assert!(Pattern::parse("*").unwrap().matches(Some("anything")));
        assert!(Pattern::parse("").unwrap().matches(None));
    }

    #[test]
    fn test_regex_against_missing_segment_uses_empty_string() {
        assert!(Pattern::parse("^$").unwrap().matches(None));
        assert!(!Pattern::parse("let").unwrap().matches(None));
    }

    #[test]
    fn test_single_matches_any_segment() {
        let f = spec("const");
        assert!(matches!(f, FilterSpec::Single(_)));
        assert!(f.matches(&path("es6/bindings/const/basic support")));
        assert!(!f.matches(&path("es6/bindings/let/basic support")));
    }

    #[test]
    fn test_positional_is_anchored_by_index() {
        let f = spec("es6//const");
        assert!(matches!(f, FilterSpec::Positional(ref p) if p.len() == 3));
        assert!(f.matches(&path("es6/bindings/const/basic support")));
        assert!(!f.matches(&path("es5/bindings/const/basic support")));
        assert!(!f.matches(&path("es6/const/bindings")));
    }

    #[test]
    fn test_positional_ignores_trailing_segments() {
        let f = spec("es6/bindings");
        for tail in ["a", "b", "temporal dead zone"] {
            assert!(f.matches(&path(&format!("es6/bindings/const/{}", tail))));
        }
    }

    #[test]
    fn test_positional_longer_than_path() {
        assert!(!spec("es6/bindings/const").matches(&path("es6/bindings")));
        assert!(spec("es6/bindings/*").matches(&path("es6/bindings")));
    }

    #[test]
    fn test_no_includes_accepts_everything() {
        let filter = PathFilter::default();
        assert!(filter.accept(&path("es5/anything")));
        let filter = PathFilter::new(Some(vec![]), None);
        assert!(filter.accept(&path("es5/anything")));
    }

    #[test]
    fn test_excludes_win_over_includes() {
        let filter = PathFilter::parse(&["es6"], &["es6//let"]).unwrap();
        assert_eq!(filter.check(&path("es6/bindings/const/x")), Ok(()));
        assert_eq!(
            filter.check(&path("es6/bindings/let/x")),
            Err(Rejection::Excluded)
        );
        assert_eq!(
            filter.check(&path("es5/Object.create")),
            Err(Rejection::NotIncluded)
        );
    }

    #[test]
    fn test_includes_are_alternatives() {
        let filter = PathFilter::parse(&["es5/", "es7/"], &[]).unwrap();
        assert!(filter.accept(&path("es5/x")));
        assert!(filter.accept(&path("es7/y")));
        assert!(!filter.accept(&path("es6/z")));
    }

    #[test]
    fn test_invalid_regex() {
        let err = "es6/(unclosed".parse::<FilterSpec>().unwrap_err();
        assert!(matches!(err, Error::InvalidFilter { ref filter, .. } if filter == "(unclosed"));
    }

    #[test]
    fn test_display_round_trips_source() {
        assert_eq!(spec("es6//const").to_string(), "es6/*/const");
        assert_eq!(spec("let").to_string(), "let");
    }
}
