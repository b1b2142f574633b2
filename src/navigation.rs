//! Navigation requests and the IDE navigation reference
//!
//! A [`NavigationRequest`] is what a caller asks for (project, class or
//! resource, optional line). A [`NavigationReference`] is the URI the IDE
//! understands:
//!
//! ```text
//! <scheme>://idea/navigate/reference?project=<project>&path=<relative>[:<line-1>]
//! ```

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::fmt;

use crate::error::NavigationError;
use crate::locator::{ResourceSelector, SymbolicReference};
use crate::workspace::validate_project_name;

/// Query key that moves test resources to the front of the search order.
pub const TEST_PRIORITY_KEY: &str = "focustestresource";

/// Path characters left readable in the URI.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'.')
    .remove(b'-')
    .remove(b'_');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Class,
    Resource,
}

impl RequestKind {
    /// Error reported when the lookup comes back empty.
    pub fn not_found(self) -> NavigationError {
        match self {
            RequestKind::Class => NavigationError::NotFound("Class file".to_string()),
            RequestKind::Resource => NavigationError::NotFound("Resource".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NavigationTarget {
    Class(SymbolicReference),
    Resource(ResourceSelector),
}

#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub project: String,
    pub target: NavigationTarget,
    /// 1-based, as callers count lines
    pub line: Option<u32>,
    pub test_priority: bool,
}

impl NavigationRequest {
    /// Build from raw query parameters.
    pub fn from_query(
        kind: RequestKind,
        params: &HashMap<String, String>,
    ) -> Result<Self, NavigationError> {
        let project = non_empty(params, "project")
            .ok_or_else(|| missing("project"))?
            .to_string();
        validate_project_name(&project)?;

        let target = match kind {
            RequestKind::Class => {
                let class = non_empty(params, "class").ok_or_else(|| missing("class"))?;
                NavigationTarget::Class(SymbolicReference::parse(class)?)
            }
            RequestKind::Resource => {
                let selector = if let Some(regex) = non_empty(params, "regex") {
                    ResourceSelector::regex(regex)?
                } else if let Some(path) = non_empty(params, "path") {
                    ResourceSelector::from_path(path)?
                } else {
                    return Err(missing("path' or 'regex"));
                };
                NavigationTarget::Resource(selector)
            }
        };

        let line = params.get("line").map(|raw| parse_line(raw)).transpose()?;

        Ok(Self {
            project,
            target,
            line,
            test_priority: params.contains_key(TEST_PRIORITY_KEY),
        })
    }

    pub fn kind(&self) -> RequestKind {
        match self.target {
            NavigationTarget::Class(_) => RequestKind::Class,
            NavigationTarget::Resource(_) => RequestKind::Resource,
        }
    }
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn missing(key: &str) -> NavigationError {
    NavigationError::InvalidReference(format!("missing '{}'", key))
}

pub fn parse_line(raw: &str) -> Result<u32, NavigationError> {
    match raw.trim().parse::<u32>() {
        Ok(line) if line >= 1 => Ok(line),
        _ => Err(NavigationError::InvalidReference(format!(
            "line '{}' must be a positive integer",
            raw
        ))),
    }
}

/// The URI handed to the IDE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationReference(String);

impl NavigationReference {
    /// `line` is 1-based; the URI carries it 0-based.
    pub fn new(scheme: &str, project: &str, relative_path: &str, line: Option<u32>) -> Self {
        let mut uri = format!(
            "{}://idea/navigate/reference?project={}&path={}",
            scheme,
            utf8_percent_encode(project, PATH_ENCODE_SET),
            utf8_percent_encode(relative_path, PATH_ENCODE_SET)
        );
        if let Some(line) = line {
            uri.push_str(&format!(":{}", line.saturating_sub(1)));
        }
        Self(uri)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NavigationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tests live in `src/tests/navigation_tests.rs`
