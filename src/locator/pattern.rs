//! Resource selectors and their matching strategies
//!
//! - literal: direct resolution first, then file-name equality on the last
//!   segment or a segment-aligned path fragment
//! - glob: `*` stays inside one segment, `**` spans any number of segments,
//!   a pattern without `/` matches anywhere below the directory
//! - regex: full match against the POSIX path relative to the directory

use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

use super::ExclusionFilter;
use crate::error::NavigationError;
use crate::workspace::relative_posix;

#[derive(Debug, Clone)]
pub enum ResourceSelector {
    Literal(String),
    Glob { pattern: String, matcher: GlobMatcher },
    Regex(Regex),
}

impl ResourceSelector {
    /// A `path` query value: glob when it carries a `*`, literal otherwise.
    pub fn from_path(raw: &str) -> Result<Self, NavigationError> {
        let trimmed = raw.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(NavigationError::InvalidReference(
                "resource path is empty".to_string(),
            ));
        }
        if trimmed.split('/').any(|segment| segment == "..") {
            return Err(NavigationError::InvalidReference(format!(
                "resource path '{}' must not contain '..'",
                raw
            )));
        }

        if trimmed.contains('*') {
            Self::glob(trimmed)
        } else {
            Ok(ResourceSelector::Literal(trimmed.to_string()))
        }
    }

    pub fn glob(raw: &str) -> Result<Self, NavigationError> {
        let pattern = translate_glob(raw);
        let matcher = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                NavigationError::InvalidReference(format!("invalid glob '{}': {}", raw, e))
            })?
            .compile_matcher();
        Ok(ResourceSelector::Glob { pattern, matcher })
    }

    /// A `regex` query value, anchored at both ends.
    pub fn regex(raw: &str) -> Result<Self, NavigationError> {
        if raw.is_empty() {
            return Err(NavigationError::InvalidReference(
                "regex is empty".to_string(),
            ));
        }
        Regex::new(&format!("^(?:{})$", raw))
            .map(ResourceSelector::Regex)
            .map_err(|e| NavigationError::InvalidReference(format!("invalid regex: {}", e)))
    }

    /// Does a path relative to a resource directory match?
    pub fn matches(&self, relative: &str) -> bool {
        match self {
            ResourceSelector::Literal(literal) => literal_matches(literal, relative),
            ResourceSelector::Glob { matcher, .. } => matcher.is_match(relative),
            ResourceSelector::Regex(regex) => regex.is_match(relative),
        }
    }

    /// Matching files below `dir`, in walk order.
    pub fn find_in(
        &self,
        dir: &Path,
        workspace_root: &Path,
        filter: &ExclusionFilter,
    ) -> Vec<PathBuf> {
        if let ResourceSelector::Literal(literal) = self {
            let direct = dir.join(literal);
            if direct.is_file() && !filter.is_excluded_path(workspace_root, &direct) {
                return vec![direct];
            }
        }

        filter
            .walk_files(dir, workspace_root, None)
            .filter(|entry| {
                relative_posix(dir, entry.path())
                    .map(|relative| self.matches(&relative))
                    .unwrap_or(false)
            })
            .map(|entry| entry.into_path())
            .collect()
    }
}

impl fmt::Display for ResourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceSelector::Literal(literal) => write!(f, "path '{}'", literal),
            ResourceSelector::Glob { pattern, .. } => write!(f, "glob '{}'", pattern),
            ResourceSelector::Regex(regex) => write!(f, "regex '{}'", regex.as_str()),
        }
    }
}

/// Normalise a user glob: strip surrounding slashes and anchor bare names
/// anywhere below the search directory.
pub fn translate_glob(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        "**".to_string()
    } else if trimmed.contains('/') {
        trimmed.to_string()
    } else {
        format!("**/{}", trimmed)
    }
}

fn literal_matches(literal: &str, relative: &str) -> bool {
    file_name(relative) == file_name(literal) || contains_at_segment(relative, literal)
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// `needle` occurs in `haystack` starting at a segment boundary.
fn contains_at_segment(haystack: &str, needle: &str) -> bool {
    haystack
        .match_indices(needle)
        .any(|(index, _)| index == 0 || haystack.as_bytes()[index - 1] == b'/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_glob_anchors_bare_names() {
        assert_eq!(translate_glob("*.html"), "**/*.html");
        assert_eq!(translate_glob("/templates/**/x.html/"), "templates/**/x.html");
        assert_eq!(translate_glob(""), "**");
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let selector = ResourceSelector::from_path("/templates/*/example.html").unwrap();
        assert!(selector.matches("templates/mail/example.html"));
        assert!(!selector.matches("templates/mail/deep/example.html"));
        assert!(!selector.matches("templates/example.html"));
    }

    #[test]
    fn test_double_star_spans_zero_or_more_segments() {
        let selector = ResourceSelector::from_path("/templates/**/example.html").unwrap();
        assert!(selector.matches("templates/example.html"));
        assert!(selector.matches("templates/a/b/example.html"));
        assert!(!selector.matches("other/example.html"));
    }

    #[test]
    fn test_bare_glob_matches_anywhere() {
        let selector = ResourceSelector::from_path("*.html").unwrap();
        assert!(selector.matches("index.html"));
        assert!(selector.matches("static/pages/about.html"));
        assert!(!selector.matches("static/app.css"));
    }

    #[test]
    fn test_regex_is_full_match() {
        let selector = ResourceSelector::regex(r".*\.html").unwrap();
        assert!(selector.matches("a/b.html"));
        assert!(!selector.matches("a/b.html.bak"));

        let partial = ResourceSelector::regex("example").unwrap();
        assert!(!partial.matches("templates/example.html"));
    }

    #[test]
    fn test_literal_matches_fragment_or_file_name() {
        let selector = ResourceSelector::from_path("/templates/example.html").unwrap();
        assert!(selector.matches("templates/example.html"));
        assert!(selector.matches("web/templates/example.html"));
        assert!(selector.matches("mail/example.html"));
        assert!(!selector.matches("templates/example.html.bak"));

        let dir_fragment = ResourceSelector::from_path("/i18n/").unwrap();
        assert!(dir_fragment.matches("i18n/messages.properties"));
        assert!(!dir_fragment.matches("xi18n/messages.properties"));

        let bare = ResourceSelector::from_path("example.html").unwrap();
        assert!(bare.matches("deep/dir/example.html"));
        assert!(!bare.matches("deep/dir/my-example.html"));
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(ResourceSelector::regex("(unclosed").is_err());
        assert!(ResourceSelector::from_path("").is_err());
        assert!(ResourceSelector::from_path("../secrets/*.txt").is_err());
        assert!(ResourceSelector::from_path("a/[b*.txt").is_err());
    }
}
