//! Field-level conversion between typed values and [`Dict`] entries.
//!
//! Decoding is permissive: a missing or empty entry decodes to `None`
//! without calling the parser, and a value of the wrong shape also decodes
//! to `None` (with a warning in the log). Nothing here returns an error;
//! complaints about missing data belong to validation.

use super::{Dict, Value};
use crate::geometry::{Region, RegionSet};

/// Decodes `key` with `parser`, yielding `None` for absent or empty values.
pub fn decode_field<T>(
    dict: &Dict,
    key: &str,
    parser: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = dict.get(key)?;
    let parsed = parser(value);
    if parsed.is_none() {
        log::warn!(
            "field '{}' holds an unexpected {} tuple of length {}; treating it as absent",
            key,
            value.type_name(),
            value.len()
        );
    }
    parsed
}

/// Writes `value` under `key`; `None` leaves the key unset.
pub fn encode_field<V: Into<Value>>(dict: &mut Dict, key: &str, value: Option<V>) {
    if let Some(value) = value {
        dict.insert(key, value);
    }
}

/// Parser for a single string.
pub fn string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Decodes an array of nested records, running `decode` on a view of each
/// entry. Uninitialized entries decode from an empty dict.
pub fn decode_records<T>(
    dict: &Dict,
    key: &str,
    mut decode: impl FnMut(&Dict) -> T,
) -> Option<Vec<T>> {
    let empty = Dict::new();
    decode_field(dict, key, |value| {
        value.as_dicts().map(|entries| {
            entries
                .iter()
                .map(|entry| decode(entry.as_ref().unwrap_or(&empty)))
                .collect()
        })
    })
}

/// Writes nested records as an array of sub-dicts.
pub fn encode_records(dict: &mut Dict, key: &str, records: impl IntoIterator<Item = Dict>) {
    let records: Vec<Dict> = records.into_iter().collect();
    dict.insert(key, records);
}

/// Decodes a concatenated region object into its members, in stored order.
///
/// An object with no members is absent.
pub fn decode_regions(dict: &Dict, key: &str) -> Option<Vec<Region>> {
    decode_field(dict, key, |value| {
        value.as_regions().map(|set| set.iter().cloned().collect())
    })
}

/// Concatenates `regions` into one object under `key`.
///
/// `None` and an empty sequence both leave the key unset.
pub fn encode_regions(dict: &mut Dict, key: &str, regions: Option<&[Region]>) {
    let Some(regions) = regions.filter(|r| !r.is_empty()) else {
        return;
    };

    let set = regions
        .iter()
        .cloned()
        .fold(RegionSet::empty(), RegionSet::concat);
    dict.insert(key, set);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_absent_does_not_call_parser() {
        let dict = Dict::new().with("empty", Vec::<f64>::new());
        let mut called = false;
        let out: Option<i64> = decode_field(&dict, "empty", |_| {
            called = true;
            Some(1)
        });
        assert_eq!(out, None);
        assert!(!called);
    }

    #[test]
    fn test_decode_wrong_type_is_absent() {
        let dict = Dict::new().with("image_id", "not a number");
        assert_eq!(decode_field(&dict, "image_id", Value::as_int), None);
    }

    #[test]
    fn test_encode_none_leaves_key_unset() {
        let mut dict = Dict::new();
        encode_field::<i64>(&mut dict, "image_id", None);
        encode_field(&mut dict, "image_label_id", Some(4i64));
        assert!(dict.get("image_id").is_none());
        assert_eq!(dict.get("image_label_id"), Some(&Value::Int(vec![4])));
    }

    #[test]
    fn test_records_roundtrip() {
        let mut dict = Dict::new();
        encode_records(
            &mut dict,
            "samples",
            (1..=3i64).map(|i| Dict::new().with("image_id", i)),
        );
        let ids = decode_records(&dict, "samples", |d| {
            decode_field(d, "image_id", Value::as_int)
        });
        assert_eq!(ids, Some(vec![Some(1), Some(2), Some(3)]));
    }

    #[test]
    fn test_uninitialized_record_decodes_from_empty_dict() {
        let dict = Dict::new().with(
            "samples",
            vec![None, Some(Dict::new().with("image_id", 2i64))],
        );
        let ids = decode_records(&dict, "samples", |d| {
            decode_field(d, "image_id", Value::as_int)
        });
        assert_eq!(ids, Some(vec![None, Some(2)]));
    }

    #[test]
    fn test_empty_region_sequence_omits_key() {
        let mut dict = Dict::new();
        encode_regions(&mut dict, "mask", Some(&[][..]));
        assert!(dict.is_empty());
        assert_eq!(decode_regions(&dict, "mask"), None);
    }

    #[test]
    fn test_regions_keep_order() {
        let regions = vec![Region::rectangle(4, 4, 5, 5), Region::rectangle(0, 0, 1, 1)];
        let mut dict = Dict::new();
        encode_regions(&mut dict, "mask", Some(regions.as_slice()));
        assert_eq!(decode_regions(&dict, "mask"), Some(regions));
    }
}
