//! Route table
//!
//! Append-only: entries are registered once at startup, in order, and
//! looked up by walking that order. The first matching pattern wins.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{ConversionError, RouteError};
use crate::handler::Handler;
use crate::logger;
use crate::routing::convert::{convert, PathArgs};
use crate::routing::pattern::RoutePattern;

/// Registration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    methods: BTreeSet<String>,
    cors: bool,
    name: Option<String>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            methods: BTreeSet::from(["GET".to_string()]),
            cors: false,
            name: None,
        }
    }
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the allowed methods (default: `GET`)
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn cors(mut self, cors: bool) -> Self {
        self.cors = cors;
        self
    }

    /// Display name (default: the handler's name)
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One registered route
pub struct RouteEntry {
    pattern: RoutePattern,
    handler: Arc<dyn Handler>,
    methods: BTreeSet<String>,
    cors: bool,
    name: String,
}

impl RouteEntry {
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    pub const fn methods(&self) -> &BTreeSet<String> {
        &self.methods
    }

    pub fn allows(&self, method: &str) -> bool {
        self.methods.contains(method)
    }

    pub const fn cors(&self) -> bool {
        self.cors
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("pattern", &self.pattern.raw())
            .field("methods", &self.methods)
            .field("cors", &self.cors)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A successful lookup: the entry and the raw captured segments
#[derive(Debug)]
pub struct RouteMatch<'a, 'p> {
    pub entry: &'a RouteEntry,
    pub captures: Vec<&'p str>,
}

impl RouteMatch<'_, '_> {
    /// Convert the captures into typed positional arguments
    pub fn arguments(&self) -> Result<PathArgs, ConversionError> {
        self.entry
            .pattern
            .placeholders()
            .iter()
            .zip(&self.captures)
            .map(|(placeholder, raw)| convert(raw, placeholder))
            .collect::<Result<Vec<_>, _>>()
            .map(PathArgs::new)
    }
}

/// Ordered registry of routes keyed by their pattern string
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    by_pattern: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route
    ///
    /// Fails if the pattern string is already registered (the first
    /// registration is kept), if the pattern does not compile, or if no
    /// method is allowed.
    pub fn register<H>(
        &mut self,
        pattern: &str,
        handler: H,
        options: RouteOptions,
    ) -> Result<&RouteEntry, RouteError>
    where
        H: Handler + 'static,
    {
        if self.by_pattern.contains_key(pattern) {
            return Err(RouteError::Duplicate(pattern.to_string()));
        }
        if options.methods.is_empty() {
            return Err(RouteError::NoMethods(pattern.to_string()));
        }
        let compiled = RoutePattern::compile(pattern)?;

        let sample = compiled.sample_path();
        if let Some(earlier) = self.entries.iter().find(|e| e.pattern.is_match(sample)) {
            logger::log_warning(&format!(
                "Route \"{pattern}\" overlaps earlier route \"{}\"; the earlier one wins for paths like {sample}",
                earlier.pattern.raw()
            ));
        }

        let name = options
            .name
            .unwrap_or_else(|| handler.name().to_string());
        let entry = RouteEntry {
            pattern: compiled,
            handler: Arc::new(handler),
            methods: options.methods,
            cors: options.cors,
            name,
        };
        logger::log_route_registered(&entry.name, pattern, &entry.methods);

        let index = self.entries.len();
        self.by_pattern.insert(pattern.to_string(), index);
        self.entries.push(entry);
        Ok(&self.entries[index])
    }

    /// First route, in registration order, whose pattern matches `path`
    pub fn lookup<'a, 'p>(&'a self, path: &'p str) -> Option<RouteMatch<'a, 'p>> {
        self.entries.iter().find_map(|entry| {
            entry
                .pattern
                .captures(path)
                .map(|captures| RouteMatch { entry, captures })
        })
    }

    /// Entry registered under exactly this pattern string
    pub fn get(&self, pattern: &str) -> Option<&RouteEntry> {
        self.by_pattern.get(pattern).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
