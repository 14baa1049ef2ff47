//! Data models for stored procedure calls.
//!
//! Parameters flow out through [`ParameterSet`]; decoded results come back
//! as [`Table`]s of [`Row`]s holding [`TypedValue`]s. Status-array calls
//! yield a [`StatusArray`], and reference tables project into a
//! [`LookupMap`].

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

// =============================================================================
// Outgoing parameters
// =============================================================================

/// A single outgoing parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for ParamValue {
    /// Request-string form of the value.
    ///
    /// Booleans are sent as `1`/`0` and null as the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Integer(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            ParamValue::Null => Ok(()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

/// Insertion-ordered set of named parameters.
///
/// The remote side binds parameters by name and position, so the order in
/// which keys are first inserted is the order they are encoded in.
/// Re-inserting a key replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```ignore
    /// let params = ParameterSet::new()
    ///     .with("ApplicationCode", "COMMON")
    ///     .with("UserID", 42);
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

impl Serialize for ParameterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// =============================================================================
// Decoded values
// =============================================================================

/// A scalar value recovered from a loosely-typed response field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl TypedValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(x) => Some(*x),
            TypedValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Explicitly read the value as a flag.
    ///
    /// Inference cannot tell a `0`/`1` bit from an integer, so fields that
    /// carry boolean semantics must be read through this method. Accepts
    /// `Boolean` and the integers `0` and `1`; anything else is `None`.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            TypedValue::Integer(0) => Some(false),
            TypedValue::Integer(1) => Some(true),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Integer(_) => "integer",
            TypedValue::Float(_) => "float",
            TypedValue::Boolean(_) => "boolean",
            TypedValue::String(_) => "string",
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Float(x) => write!(f, "{}", x),
            TypedValue::Boolean(b) => write!(f, "{}", b),
            TypedValue::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Integer(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

/// One decoded row: field name → typed value, in document order.
///
/// A field missing from the response is missing from the row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, TypedValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. A repeated name overwrites the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: TypedValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in stored order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Values in stored order.
    pub fn values(&self) -> impl Iterator<Item = &TypedValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, TypedValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, TypedValue)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// An ordered sequence of rows. Tables are identified only by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// =============================================================================
// Status arrays and lookups
// =============================================================================

/// The `[id_or_flag, code, message]` triad returned by write operations.
///
/// Positions the remote side omitted are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusArray {
    positions: [Option<String>; 3],
}

impl StatusArray {
    /// Build from split segments; anything past the third is ignored.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut positions: [Option<String>; 3] = Default::default();
        for (slot, segment) in positions.iter_mut().zip(segments) {
            *slot = Some(segment.to_string());
        }
        Self { positions }
    }

    /// Position 0: new record ID, GUID, or success flag.
    pub fn id(&self) -> Option<&str> {
        self.get(0)
    }

    /// Position 1: status or error code.
    pub fn code(&self) -> Option<&str> {
        self.get(1)
    }

    /// Position 2: human-readable message.
    pub fn message(&self) -> Option<&str> {
        self.get(2)
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.positions.get(position).and_then(|p| p.as_deref())
    }

    /// Position 0 parsed as a numeric identifier.
    pub fn id_as_i64(&self) -> Option<i64> {
        self.id().and_then(|id| id.trim().parse().ok())
    }
}

/// Key→value projection of a reference table.
///
/// Rows with two or more fields land in the keyed part; single-field rows
/// land in the ordered value list. Both parts preserve row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LookupMap {
    pairs: Vec<(TypedValue, TypedValue)>,
    values: Vec<TypedValue>,
}

impl LookupMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyed entry. A repeated key keeps its first position and
    /// takes the newer value.
    pub fn insert(&mut self, key: TypedValue, value: TypedValue) {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn push(&mut self, value: TypedValue) {
        self.values.push(value);
    }

    pub fn get(&self, key: &TypedValue) -> Option<&TypedValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up by the textual form of the key, e.g. a setting name.
    pub fn get_by_text(&self, key: &str) -> Option<&TypedValue> {
        self.pairs
            .iter()
            .find(|(k, _)| k.to_string() == key)
            .map(|(_, v)| v)
    }

    pub fn pairs(&self) -> &[(TypedValue, TypedValue)] {
        &self.pairs
    }

    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.pairs.len() + self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.values.is_empty()
    }
}
