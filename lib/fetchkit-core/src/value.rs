//! Parameter values for query encoding.
//!
//! A [`ParamObject`] is an ordered mapping from key to [`ParamValue`]. Only
//! scalars and sequences of scalars reach the query string; `Undefined` and
//! nested objects are accepted as input but never serialized.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// A single query value: string, number, boolean or date.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text value.
    String(String),
    /// Numeric value. Decoding yields `NaN` for non-numeric input.
    Number(f64),
    /// Boolean value, rendered as `true` / `false`.
    Bool(bool),
    /// Date value, rendered as ISO-8601 with millisecond precision.
    Date(DateTime<Utc>),
}

impl Scalar {
    /// Returns the string if this is a [`Scalar::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is a [`Scalar::Number`].
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the date if this is a [`Scalar::Date`].
    #[must_use]
    pub const fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Render a number the way query strings expect it: integral values have no
/// fractional part, and non-finite values use `NaN` / `Infinity`.
#[allow(clippy::float_cmp)]
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        // -0 renders as 0
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else {
        n.to_string()
    }
}

/// Shortest exponent form with an explicit sign on positive exponents
/// (`1e+21`, `1.5e-7`).
fn exponent_form(n: f64) -> String {
    let formatted = format!("{n:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

/// A value stored in a [`ParamObject`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamValue {
    /// Missing value. Dropped by the encoder.
    #[default]
    Undefined,
    /// A single scalar.
    Scalar(Scalar),
    /// A sequence of scalars, encoded as a repeated key.
    List(Vec<Scalar>),
    /// A nested mapping. Dropped by the encoder.
    Object(ParamObject),
}

impl ParamValue {
    /// Short name of the value kind, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Scalar(Scalar::String(_)) => "string",
            Self::Scalar(Scalar::Number(_)) => "number",
            Self::Scalar(Scalar::Bool(_)) => "boolean",
            Self::Scalar(Scalar::Date(_)) => "date",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` for [`ParamValue::Undefined`].
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns the scalar if this holds one.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the sequence if this holds one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested mapping if this holds one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ParamObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

macro_rules! scalar_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from($v: $ty) -> Self {
                    $body
                }
            }

            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

scalar_from! {
    &str => |v| Scalar::String(v.to_string()),
    String => |v| Scalar::String(v),
    &String => |v| Scalar::String(v.clone()),
    bool => |v| Scalar::Bool(v),
    f64 => |v| Scalar::Number(v),
    f32 => |v| Scalar::Number(f64::from(v)),
    i8 => |v| Scalar::Number(f64::from(v)),
    i16 => |v| Scalar::Number(f64::from(v)),
    i32 => |v| Scalar::Number(f64::from(v)),
    u8 => |v| Scalar::Number(f64::from(v)),
    u16 => |v| Scalar::Number(f64::from(v)),
    u32 => |v| Scalar::Number(f64::from(v)),
    DateTime<Utc> => |v| Scalar::Date(v),
}

// Query numbers share the f64 range of their source representation.
#[allow(clippy::cast_precision_loss)]
mod wide_numbers {
    use super::{ParamValue, Scalar};

    scalar_from! {
        i64 => |v| Scalar::Number(v as f64),
        u64 => |v| Scalar::Number(v as f64),
        isize => |v| Scalar::Number(v as f64),
        usize => |v| Scalar::Number(v as f64),
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

impl From<()> for ParamValue {
    fn from((): ()) -> Self {
        Self::Undefined
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<ParamObject> for ParamValue {
    fn from(value: ParamObject) -> Self {
        Self::Object(value)
    }
}

impl From<serde_json::Value> for ParamValue {
    /// `null` becomes `Undefined`, arrays keep only their scalar elements and
    /// objects become nested mappings in their source key order.
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Undefined,
            Value::Array(items) => {
                Self::List(items.into_iter().filter_map(json_scalar).collect())
            }
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            scalar => json_scalar(scalar).map_or(Self::Undefined, Self::Scalar),
        }
    }
}

fn json_scalar(value: serde_json::Value) -> Option<Scalar> {
    use serde_json::Value;

    match value {
        Value::Bool(b) => Some(Scalar::Bool(b)),
        Value::Number(n) => Some(Scalar::Number(n.as_f64().unwrap_or(f64::NAN))),
        Value::String(s) => Some(Scalar::String(s)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// ============================================================================
// ParamObject
// ============================================================================

/// Ordered mapping of query parameters.
///
/// Iteration follows insertion order. Inserting an existing key replaces its
/// value in place. Equality ignores key order.
#[derive(Debug, Clone, Default)]
pub struct ParamObject {
    entries: Vec<(String, ParamValue)>,
}

impl ParamObject {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for ParamObject {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Self::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

impl IntoIterator for ParamObject {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ============================================================================
// ToParams
// ============================================================================

/// Trait for types that can be turned into query parameters.
///
/// This is automatically implemented by the `#[derive(Params)]` macro.
///
/// # Example
///
/// ```ignore
/// use fetchkit::Params;
///
/// #[derive(Params)]
/// #[params(rename_all = "camelCase")]
/// struct Search {
///     search_text: String,
///     page: Option<u32>,
///     tags: Vec<String>,
/// }
/// ```
pub trait ToParams {
    /// Build the parameter mapping for this value.
    fn to_params(&self) -> ParamObject;
}

impl ToParams for ParamObject {
    fn to_params(&self) -> ParamObject {
        self.clone()
    }
}

/// Conversion of a single field into a [`ParamValue`], used by derived
/// [`ToParams`] implementations.
pub trait ToParamValue {
    /// Convert by reference.
    fn to_param_value(&self) -> ParamValue;
}

impl<T> ToParamValue for T
where
    T: Clone + Into<ParamValue>,
{
    fn to_param_value(&self) -> ParamValue {
        self.clone().into()
    }
}
