//! Core data model types: scalar cells, rows and column metadata.
//!
//! A [`crate::store::ChartData`] holds ordered [`Row`]s whose cells are [`Scalar`]s, together with
//! an ordered set of [`Column`]s resolved from user-provided [`ColumnDef`]s.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{ChartDataError, ChartDataResult};

/// A single cell value.
///
/// Anything outside this domain is coerced to [`Scalar::Null`] at ingestion.
///
/// Equality and hashing follow same-value-zero semantics: `NaN` equals `NaN` and `-0.0` equals
/// `0.0`. This is what lets scalars key unique-value lists and frames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Missing/empty value.
    #[default]
    Null,
    /// Any number (integers included).
    Number(f64),
    /// UTF-8 string.
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Returns the number if this is a [`Scalar::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string if this is a [`Scalar::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert a JSON value, returning `None` for values outside the scalar domain
    /// (booleans, arrays, objects).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Scalar::Null),
            serde_json::Value::Number(n) => n.as_f64().map(Scalar::Number),
            serde_json::Value::String(s) => Some(Scalar::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Scalar::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Shared null cell for reads of absent keys.
pub(crate) static NULL: Scalar = Scalar::Null;

/// Bit pattern under which equal numbers hash alike: one NaN, one zero.
pub(crate) fn canonical_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Number(a), Scalar::Number(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Scalar::Null => {}
            Scalar::Number(n) => canonical_bits(*n).hash(state),
            Scalar::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(v as f64)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(f64::from(v))
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// An insertion-ordered mapping from column key to [`Scalar`].
///
/// Rows do not need to carry every column: a key that is not present reads as `None`, which is
/// distinct from a present [`Scalar::Null`]. Lookups go through a key index, so wide rows stay
/// constant-time per read.
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: Vec<(String, Scalar)>,
    index: HashMap<String, usize>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Builder-style [`Row::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.index.get(key).map(|&i| &self.cells[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Set `key` to `value`, keeping the original position if the key already exists.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.cells[i].1, value)),
            None => {
                self.index.insert(key.clone(), self.cells.len());
                self.cells.push((key, value));
                None
            }
        }
    }

    /// Remove `key`, shifting later cells down one position.
    pub fn remove(&mut self, key: &str) -> Option<Scalar> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.cells.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// The index is derived from `cells`, so equal cells mean equal rows.
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// A raw column declaration, as supplied by the caller.
///
/// ```
/// use chart_data::types::ColumnDef;
///
/// let def: ColumnDef = serde_json::from_str(r#"{"key":"year","isContinuous":false}"#).unwrap();
/// assert_eq!(def.is_continuous, Some(false));
/// assert_eq!(def.label, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Unique column key.
    pub key: String,
    /// Display label; defaults to the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Explicit continuity; inferred from the data when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_continuous: Option<bool>,
}

impl ColumnDef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            is_continuous: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Declare continuity explicitly instead of letting it be inferred.
    pub fn continuous(mut self, is_continuous: bool) -> Self {
        self.is_continuous = Some(is_continuous);
        self
    }
}

impl From<&str> for ColumnDef {
    fn from(key: &str) -> Self {
        ColumnDef::new(key)
    }
}

/// Resolved metadata for one named field across all rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub key: String,
    pub label: String,
    /// Values have intrinsic numeric order; eligible for interpolation and linear scales.
    pub is_continuous: bool,
}

/// Ordered column metadata keyed by column key.
///
/// Iteration follows declaration order; lookup by key is a hash lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Columns {
    /// Resolve declarations against `rows`, inferring continuity where it was not supplied.
    ///
    /// A column is inferred continuous only when it has at least one non-null value and every
    /// non-null value is a number. Declared columns that appear in no row are kept.
    pub fn resolve(defs: &[ColumnDef], rows: &[Row]) -> ChartDataResult<Self> {
        let mut columns = Vec::with_capacity(defs.len());
        let mut index = HashMap::with_capacity(defs.len());

        for def in defs {
            if index.contains_key(&def.key) {
                return Err(ChartDataError::invalid_configuration(format!(
                    "duplicate column key '{}'",
                    def.key
                )));
            }
            let is_continuous = def
                .is_continuous
                .unwrap_or_else(|| infer_continuous(&def.key, rows));
            index.insert(def.key.clone(), columns.len());
            columns.push(Column {
                key: def.key.clone(),
                label: def.label.clone().unwrap_or_else(|| def.key.clone()),
                is_continuous,
            });
        }

        Ok(Self { columns, index })
    }

    pub fn get(&self, key: &str) -> Option<&Column> {
        self.index.get(key).map(|&i| &self.columns[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn infer_continuous(key: &str, rows: &[Row]) -> bool {
    let mut seen = false;
    for value in rows.iter().filter_map(|r| r.get(key)) {
        match value {
            Scalar::Null => {}
            Scalar::Number(_) => seen = true,
            Scalar::Text(_) => return false,
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_equality_is_same_value_zero() {
        assert_eq!(Scalar::Number(f64::NAN), Scalar::Number(f64::NAN));
        assert_eq!(Scalar::Number(-0.0), Scalar::Number(0.0));
        assert_ne!(Scalar::Number(1.0), Scalar::Text("1".to_string()));
        assert_ne!(Scalar::Null, Scalar::Number(0.0));
    }

    #[test]
    fn scalar_from_json_rejects_non_scalars() {
        assert_eq!(
            Scalar::from_json(&serde_json::json!(2)),
            Some(Scalar::Number(2.0))
        );
        assert_eq!(
            Scalar::from_json(&serde_json::json!("a")),
            Some(Scalar::Text("a".to_string()))
        );
        assert_eq!(Scalar::from_json(&serde_json::Value::Null), Some(Scalar::Null));
        assert_eq!(Scalar::from_json(&serde_json::json!(true)), None);
        assert_eq!(Scalar::from_json(&serde_json::json!([1])), None);
        assert_eq!(Scalar::from_json(&serde_json::json!({"a": 1})), None);
    }

    #[test]
    fn row_insert_keeps_position_and_distinguishes_absent_from_null() {
        let mut row = Row::new().with("a", 1.0).with("b", Scalar::Null);
        assert_eq!(row.insert("a", "x"), Some(Scalar::Number(1.0)));
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("b"), Some(&Scalar::Null));
        assert_eq!(row.get("c"), None);
    }

    #[test]
    fn row_remove_keeps_later_keys_addressable() {
        let mut row: Row = (0..64).map(|i| (format!("c{i}"), Scalar::Number(i as f64))).collect();
        assert_eq!(row.get("c63"), Some(&Scalar::Number(63.0)));

        assert_eq!(row.remove("c10"), Some(Scalar::Number(10.0)));
        assert_eq!(row.remove("c10"), None);
        assert_eq!(row.len(), 63);
        assert_eq!(row.get("c10"), None);
        assert_eq!(row.get("c11"), Some(&Scalar::Number(11.0)));
        assert_eq!(row.get("c63"), Some(&Scalar::Number(63.0)));

        assert_eq!(row.insert("c10", 10.5), None);
        assert_eq!(row.keys().last(), Some("c10"));
        assert_eq!(row.insert("c0", "zero"), Some(Scalar::Number(0.0)));
        assert_eq!(row.keys().next(), Some("c0"));
    }

    #[test]
    fn row_equality_follows_cells_in_order() {
        let mut built = Row::new().with("a", 1.0).with("b", 2.0).with("c", 3.0);
        built.remove("b");
        assert_eq!(built, Row::new().with("a", 1.0).with("c", 3.0));
        assert_ne!(built, Row::new().with("c", 3.0).with("a", 1.0));
    }

    #[test]
    fn scalar_accessors_by_variant() {
        assert_eq!(Scalar::from("x").as_text(), Some("x"));
        assert_eq!(Scalar::Number(2.0).as_text(), None);
        assert_eq!(Scalar::Number(2.0).as_number(), Some(2.0));
        assert_eq!(Scalar::Null.as_number(), None);
    }

    #[test]
    fn columns_infer_continuity_from_values() {
        let rows = vec![
            Row::new().with("a", 1.0).with("b", "x").with("c", Scalar::Null),
            Row::new().with("a", Scalar::Null).with("b", 2.0),
            Row::new().with("a", 3.0),
        ];
        let defs = vec![
            ColumnDef::new("a"),
            ColumnDef::new("b"),
            ColumnDef::new("c"),
            ColumnDef::new("d").with_label("Dee"),
            ColumnDef::new("e").continuous(true),
        ];
        let cols = Columns::resolve(&defs, &rows).unwrap();

        assert!(cols.get("a").unwrap().is_continuous);
        assert!(!cols.get("b").unwrap().is_continuous);
        assert!(!cols.get("c").unwrap().is_continuous);
        assert!(!cols.get("d").unwrap().is_continuous);
        assert_eq!(cols.get("d").unwrap().label, "Dee");
        assert!(cols.get("e").unwrap().is_continuous);
        assert_eq!(cols.keys().collect::<Vec<_>>(), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(cols.index_of("d"), Some(3));
        assert_eq!(cols.index_of("z"), None);
    }

    #[test]
    fn columns_reject_duplicate_keys() {
        let defs = vec![ColumnDef::new("a"), ColumnDef::new("a")];
        let err = Columns::resolve(&defs, &[]).unwrap_err();
        assert!(err.to_string().contains("duplicate column key 'a'"));
    }
}
