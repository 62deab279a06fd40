//! The generic persistent dictionary format.
//!
//! Manifests are stored as nested, string-keyed dictionaries whose values
//! are tuples: integer, real or string arrays (a scalar is a tuple of
//! length one), a nested dictionary, arrays of nested dictionaries, or a
//! concatenated region object. The format does not distinguish an absent key from an empty
//! tuple, and neither does [`Dict::get`].
//!
//! On disk a dictionary is JSON; see [`io_json`].

pub mod codec;
pub mod io_json;

use std::collections::BTreeMap;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::geometry::{Region, RegionSet};

/// Key under which a region object is stored in JSON.
const REGIONS_KEY: &str = "$regions";

/// One value of a [`Dict`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(Vec<i64>),
    Real(Vec<f64>),
    Str(Vec<String>),
    Dict(Dict),
    /// Nested dictionaries; `None` marks an uninitialized entry.
    Dicts(Vec<Option<Dict>>),
    Regions(RegionSet),
}

impl Value {
    /// Number of tuple elements, member regions, or non-empty entries of a
    /// nested dict.
    pub fn len(&self) -> usize {
        match self {
            Value::Int(v) => v.len(),
            Value::Real(v) => v.len(),
            Value::Str(v) => v.len(),
            // a nested dict holding only empty entries reads as absent
            Value::Dict(d) => d.iter().filter(|(_, v)| !v.is_empty()).count(),
            Value::Dicts(v) => v.len(),
            Value::Regions(r) => r.count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A short name for the value's element type, used in log messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Str(_) => "string",
            Value::Dict(_) => "dict",
            Value::Dicts(_) => "dict array",
            Value::Regions(_) => "regions",
        }
    }

    /// The single integer of a length-one integer tuple.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<Vec<i64>> {
        match self {
            Value::Int(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Real tuple; integer tuples are widened.
    pub fn as_reals(&self) -> Option<Vec<f64>> {
        match self {
            Value::Real(v) => Some(v.clone()),
            Value::Int(v) => Some(v.iter().map(|&i| i as f64).collect()),
            _ => None,
        }
    }

    /// The single string of a length-one string tuple.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) if v.len() == 1 => Some(v[0].as_str()),
            _ => None,
        }
    }

    pub fn as_strs(&self) -> Option<Vec<String>> {
        match self {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dicts(&self) -> Option<&[Option<Dict>]> {
        match self {
            Value::Dicts(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_regions(&self) -> Option<&RegionSet> {
        match self {
            Value::Regions(r) => Some(r),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(vec![v])
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(vec![v])
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(vec![v.to_string()])
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(vec![v])
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Str(v)
    }
}

impl From<Dict> for Value {
    fn from(v: Dict) -> Self {
        Value::Dict(v)
    }
}

impl From<Vec<Option<Dict>>> for Value {
    fn from(v: Vec<Option<Dict>>) -> Self {
        Value::Dicts(v)
    }
}

impl From<Vec<Dict>> for Value {
    fn from(v: Vec<Dict>) -> Self {
        Value::Dicts(v.into_iter().map(Some).collect())
    }
}

impl From<RegionSet> for Value {
    fn from(v: RegionSet) -> Self {
        Value::Regions(v)
    }
}

/// A string-keyed dictionary of tuple values.
///
/// Entries are kept in key order so written files are deterministic.
#[derive(Clone, Debug, Default)]
pub struct Dict {
    entries: BTreeMap<String, Value>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`, treating an empty value exactly like a missing key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).filter(|v| !v.is_empty())
    }

    /// Returns true if `key` holds a non-empty value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets `key`, replacing any previous value. Empty values are stored as
    /// given; they read back as absent.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Builder-style [`Dict::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Iterates over the raw entries, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Two dictionaries are equal when their non-empty entries are equal.
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        let lhs = self.entries.iter().filter(|(_, v)| !v.is_empty());
        let rhs = other.entries.iter().filter(|(_, v)| !v.is_empty());
        lhs.eq(rhs)
    }
}

impl Serialize for Dict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Dict { entries })
    }
}

// Length-one numeric and string tuples are written as JSON scalars, the
// way the format treats scalars as single-element tuples.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) if v.len() == 1 => serializer.serialize_i64(v[0]),
            Value::Int(v) => v.serialize(serializer),
            Value::Real(v) if v.len() == 1 => serializer.serialize_f64(v[0]),
            Value::Real(v) => v.serialize(serializer),
            Value::Str(v) if v.len() == 1 => serializer.serialize_str(&v[0]),
            Value::Str(v) => v.serialize(serializer),
            Value::Dict(d) => d.serialize(serializer),
            Value::Dicts(v) => v.serialize(serializer),
            Value::Regions(r) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(REGIONS_KEY, r)?;
                map.end()
            }
        }
    }
}

/// Every JSON shape a [`Value`] may be read from.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawValue {
    Null,
    Int(i64),
    Real(f64),
    Str(String),
    Ints(Vec<i64>),
    Reals(Vec<f64>),
    Strs(Vec<String>),
    Dicts(Vec<Option<Dict>>),
    Regions(RawRegions),
    // any object that is not a region object
    Dict(Dict),
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegions {
    #[serde(rename = "$regions")]
    regions: Vec<Region>,
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawValue::deserialize(deserializer)? {
            RawValue::Null => Value::Int(Vec::new()),
            RawValue::Int(v) => Value::Int(vec![v]),
            RawValue::Real(v) => Value::Real(vec![v]),
            RawValue::Str(v) => Value::Str(vec![v]),
            RawValue::Ints(v) => Value::Int(v),
            RawValue::Reals(v) => Value::Real(v),
            RawValue::Strs(v) => Value::Str(v),
            RawValue::Dicts(v) => Value::Dicts(v),
            RawValue::Regions(r) => Value::Regions(r.regions.into_iter().collect()),
            RawValue::Dict(d) => Value::Dict(d),
        })
    }
}
