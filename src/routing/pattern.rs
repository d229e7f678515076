//! Route pattern compilation and matching
//!
//! A template such as `/landsat/tiles/<scene>/<int:z>/<int:x>/<int:y>.<ext>`
//! compiles into one anchored regular expression: literal text is escaped and
//! every placeholder becomes a capture group with its type's sub-pattern.

use std::fmt;

use regex::Regex;

use crate::error::RouteError;

/// Declared type of a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderType {
    /// `<name>`: a word token, passed through as text
    Untyped,
    /// `<int:name>`
    Int,
    /// `<float:name>`
    Float,
    /// `<string:name>`
    Str,
    /// `<uuid:name>`: lowercase 8-4-4-4-12 hex
    Uuid,
}

impl PlaceholderType {
    fn from_converter(converter: &str) -> Option<Self> {
        match converter {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "string" => Some(Self::Str),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }

    /// Sub-pattern substituted for the placeholder; contains no capture groups
    const fn sub_pattern(self) -> &'static str {
        match self {
            Self::Untyped | Self::Str => r"\w+",
            Self::Int => "[0-9]+",
            Self::Float => r"[+-]?(?:[0-9]*\.)?[0-9]+",
            Self::Uuid => "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        }
    }

    /// Value used to build sample paths when checking for overlapping routes
    const fn sample(self) -> &'static str {
        match self {
            Self::Untyped | Self::Str => "a",
            Self::Int => "1",
            Self::Float => "1.5",
            Self::Uuid => "00000000-0000-0000-0000-000000000000",
        }
    }
}

impl fmt::Display for PlaceholderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Untyped => "untyped",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
            Self::Uuid => "uuid",
        };
        f.write_str(name)
    }
}

/// A named variable part of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub kind: PlaceholderType,
}

/// A compiled route template
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    regex: Regex,
    placeholders: Vec<Placeholder>,
    sample: String,
}

impl RoutePattern {
    /// Compile a route template
    ///
    /// Fails on unbalanced `<`/`>`, empty or non-word placeholder names and
    /// unknown converters.
    pub fn compile(template: &str) -> Result<Self, RouteError> {
        let mut source = String::from("^");
        let mut sample = String::new();
        let mut placeholders = Vec::new();
        let mut rest = template;

        while !rest.is_empty() {
            let (literal, placeholder) = match rest.find('<') {
                Some(open) => (&rest[..open], Some(&rest[open + 1..])),
                None => (rest, None),
            };
            if literal.contains('>') {
                return Err(RouteError::malformed(template, "unmatched '>'"));
            }
            source.push_str(&regex::escape(literal));
            sample.push_str(literal);

            let Some(after_open) = placeholder else {
                break;
            };
            let Some(close) = after_open.find('>') else {
                return Err(RouteError::malformed(template, "unclosed '<'"));
            };
            let inner = &after_open[..close];
            if inner.contains('<') {
                return Err(RouteError::malformed(template, "nested '<'"));
            }

            let placeholder = parse_placeholder(template, inner)?;
            source.push('(');
            source.push_str(placeholder.kind.sub_pattern());
            source.push(')');
            sample.push_str(placeholder.kind.sample());
            placeholders.push(placeholder);
            rest = &after_open[close + 1..];
        }
        source.push('$');

        let regex =
            Regex::new(&source).map_err(|e| RouteError::malformed(template, e.to_string()))?;

        Ok(Self {
            raw: template.to_string(),
            regex,
            placeholders,
            sample,
        })
    }

    /// The template string this pattern was compiled from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Placeholders in declaration order
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` start-to-end and return the raw text of every placeholder,
    /// in declaration order. `None` means no match.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let caps = self.regex.captures(path)?;
        (1..=self.placeholders.len())
            .map(|group| caps.get(group).map(|m| m.as_str()))
            .collect()
    }

    /// A concrete path this pattern accepts, with a sample value per placeholder
    pub(crate) fn sample_path(&self) -> &str {
        &self.sample
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_placeholder(template: &str, inner: &str) -> Result<Placeholder, RouteError> {
    let (kind, name) = match inner.split_once(':') {
        Some((converter, name)) => {
            let kind = PlaceholderType::from_converter(converter).ok_or_else(|| {
                RouteError::UnknownConverter {
                    pattern: template.to_string(),
                    converter: converter.to_string(),
                }
            })?;
            (kind, name)
        }
        None => (PlaceholderType::Untyped, inner),
    };

    if name.is_empty() {
        return Err(RouteError::malformed(template, "empty placeholder name"));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(RouteError::malformed(
            template,
            format!("invalid placeholder name '{name}'"),
        ));
    }

    Ok(Placeholder {
        name: name.to_string(),
        kind,
    })
}
