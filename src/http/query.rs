//! Typed query-string decoding
//!
//! Every parameter a handler reads is declared with a target type and a
//! default, and decoded once here. Handlers never see loosely-typed values.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Value;

use crate::error::QueryError;

/// A value that can be decoded from one query-string parameter
pub trait QueryValue: Sized {
    /// Human readable description used in error messages
    fn expected() -> String;

    fn decode(raw: &str) -> Option<Self>;
}

macro_rules! impl_query_value {
    ($($ty:ty => $expected:expr),* $(,)?) => {
        $(
            impl QueryValue for $ty {
                fn expected() -> String {
                    $expected.to_string()
                }

                fn decode(raw: &str) -> Option<Self> {
                    <$ty>::from_str(raw.trim()).ok()
                }
            }
        )*
    };
}

impl_query_value! {
    u8 => "an integer between 0 and 255",
    u32 => "a non-negative integer",
    i64 => "an integer",
    f64 => "a number",
}

impl QueryValue for String {
    fn expected() -> String {
        "a string".to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

/// Comma separated list of exactly `N` values, e.g. `rgb=4,3,2`
impl<T: QueryValue, const N: usize> QueryValue for [T; N] {
    fn expected() -> String {
        format!("{N} comma separated values, each {}", T::expected())
    }

    fn decode(raw: &str) -> Option<Self> {
        let items = raw
            .split(',')
            .map(T::decode)
            .collect::<Option<Vec<T>>>()?;
        items.try_into().ok()
    }
}

/// Query parameters of one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub const fn new(params: HashMap<String, String>) -> Self {
        Self(params)
    }

    /// An absent mapping is treated as empty
    ///
    /// Typed JSON values are rendered back to query-string text so every
    /// parameter goes through the same decoding: numbers as written, arrays
    /// as comma lists, `true` as `"true"`. `null` and `false` count as
    /// absent.
    pub fn from_event(params: Option<&HashMap<String, Value>>) -> Self {
        params
            .into_iter()
            .flatten()
            .filter_map(|(key, value)| Some((key.clone(), query_text(value)?)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode `key` as `T`, or return `default` when it is absent
    pub fn decode<T: QueryValue>(&self, key: &str, default: T) -> Result<T, QueryError> {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        T::decode(raw).ok_or_else(|| QueryError {
            key: key.to_string(),
            value: raw.to_string(),
            expected: T::expected(),
        })
    }

    /// True when `key` is present with a non-empty value
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| item.as_str().map_or_else(|| item.to_string(), ToString::to_string))
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
