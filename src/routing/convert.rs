//! Path argument conversion
//!
//! Captured segments come straight from the caller, so numbers are parsed
//! with `str::parse` and nothing else.

use std::ops::Index;

use crate::error::{ConversionError, HandlerError};
use crate::routing::pattern::{Placeholder, PlaceholderType};

/// A typed path argument handed to a handler
#[derive(Debug, Clone, PartialEq)]
pub enum PathArg {
    Str(String),
    Int(i64),
    Float(f64),
}

impl PathArg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for PathArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<i64> for PathArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PathArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Convert one raw segment according to its placeholder's declared type
pub fn convert(raw: &str, placeholder: &Placeholder) -> Result<PathArg, ConversionError> {
    let fail = |reason: String| ConversionError {
        name: placeholder.name.clone(),
        kind: placeholder.kind,
        raw: raw.to_string(),
        reason,
    };

    match placeholder.kind {
        PlaceholderType::Int => raw
            .parse::<i64>()
            .map(PathArg::Int)
            .map_err(|e| fail(e.to_string())),
        PlaceholderType::Float => raw
            .parse::<f64>()
            .map(PathArg::Float)
            .map_err(|e| fail(e.to_string())),
        PlaceholderType::Untyped | PlaceholderType::Str | PlaceholderType::Uuid => {
            Ok(PathArg::Str(raw.to_string()))
        }
    }
}

/// Positional arguments for one handler call, in placeholder order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathArgs(Vec<PathArg>);

impl PathArgs {
    pub const fn new(args: Vec<PathArg>) -> Self {
        Self(args)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathArg> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[PathArg] {
        &self.0
    }

    /// Text argument at `index`
    pub fn str(&self, index: usize) -> Result<&str, HandlerError> {
        self.0
            .get(index)
            .and_then(PathArg::as_str)
            .ok_or_else(|| HandlerError::msg(format!("Path argument {index} is not a string")))
    }

    /// Integer argument at `index`
    pub fn int(&self, index: usize) -> Result<i64, HandlerError> {
        self.0
            .get(index)
            .and_then(PathArg::as_int)
            .ok_or_else(|| HandlerError::msg(format!("Path argument {index} is not an int")))
    }

    /// Float argument at `index`
    pub fn float(&self, index: usize) -> Result<f64, HandlerError> {
        self.0
            .get(index)
            .and_then(PathArg::as_float)
            .ok_or_else(|| HandlerError::msg(format!("Path argument {index} is not a float")))
    }
}

impl Index<usize> for PathArgs {
    type Output = PathArg;

    fn index(&self, index: usize) -> &PathArg {
        &self.0[index]
    }
}

impl From<Vec<PathArg>> for PathArgs {
    fn from(args: Vec<PathArg>) -> Self {
        Self(args)
    }
}
