//! Tag value utility functions.
//!
//! Low-level helpers for the common access patterns of the saveframe
//! categories: pulling a single typed value out of a free table, pulling a
//! typed column out of a looped table, and converting between Rust
//! `Option`s and the NMR-STAR `?` placeholder convention.
#![allow(unused)]

use crate::error::StarError;
use crate::model::TagTable;
use crate::schema::TagMap;

// ============================================================================
// The '?' placeholder convention
// ============================================================================

/// Render an optional scalar, with `None` as the `?` placeholder.
pub fn to_star(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

/// Render an optional list as a string column of length `n`; a missing
/// list becomes a `?` column.
pub fn to_star_column<T: ToString>(values: Option<&[T]>, n: usize) -> Vec<String> {
    match values {
        Some(list) => list.iter().map(ToString::to_string).collect(),
        None => vec!["?".to_string(); n],
    }
}

/// Render a list of per-row optional values.
pub fn to_star_opt_column<T: ToString>(values: Option<&[Option<T>]>, n: usize) -> Vec<String> {
    match values {
        Some(list) => list
            .iter()
            .map(|v| v.as_ref().map_or_else(|| "?".to_string(), ToString::to_string))
            .collect(),
        None => vec!["?".to_string(); n],
    }
}

/// The inverse: `?`, `.` and the empty string all read back as missing.
pub fn from_star(value: &str) -> Option<&str> {
    match value {
        "?" | "." | "" => None,
        other => Some(other),
    }
}

// ============================================================================
// Required-field checks
// ============================================================================

/// Require that a list argument was supplied at all.
pub fn require_list<'a, T>(field: &str, values: &'a Option<Vec<T>>) -> Result<&'a [T], StarError> {
    values
        .as_deref()
        .ok_or_else(|| StarError::missing(field.to_string()))
}

/// Reject required string lists that smuggle in missing entries as the
/// literal text `None`.
pub fn reject_missing_entries(field: &str, values: &[String]) -> Result<(), StarError> {
    if values.iter().any(|v| v == "None") {
        return Err(StarError::missing(format!(
            "{field} (the list contains a missing entry)"
        )));
    }
    Ok(())
}

/// Check that an optional parallel list, when supplied, matches the
/// reference length.
pub fn check_parallel<T>(
    field: &str,
    values: &Option<Vec<T>>,
    n: usize,
) -> Result<(), StarError> {
    if let Some(list) = values {
        if list.len() != n {
            return Err(StarError::cardinality(
                field,
                format!("{} elements supplied, expected {}", list.len(), n),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Single typed value helpers (free tables)
// ============================================================================

/// The scalar value of a free tag, if the tag is present.
pub fn get_single_str<'a>(table: &'a TagTable, tag: &str) -> Option<&'a str> {
    table.single(tag)
}

/// The scalar value of a free tag, required.
pub fn get_required_str<'a>(table: &'a TagTable, tag: &str) -> Result<&'a str, StarError> {
    table
        .single(tag)
        .ok_or_else(|| StarError::missing(tag.to_string()))
}

/// The scalar value of a free tag as `f64`, required.
pub fn get_required_f64(table: &TagTable, tag: &str) -> Result<f64, StarError> {
    let value = get_required_str(table, tag)?;
    parse_f64(tag, value)
}

/// The scalar value of a free tag resolved through a tag map key; `None`
/// when the key is absent in this version or the tag is not in the table.
pub fn get_mapped_str<'a>(
    table: &'a TagTable,
    map: &TagMap,
    key: &str,
) -> Result<Option<&'a str>, StarError> {
    Ok(match map.full_tag(key)? {
        Some(name) => table.single(&name),
        None => None,
    })
}

// ============================================================================
// Typed column helpers (looped tables)
// ============================================================================

/// A raw string column, if the tag is present.
pub fn column_str<'a>(table: &'a TagTable, tag: &str) -> Option<&'a [String]> {
    table.column(tag)
}

/// A required string column.
pub fn column_required<'a>(table: &'a TagTable, tag: &str) -> Result<&'a [String], StarError> {
    table
        .column(tag)
        .ok_or_else(|| StarError::missing(tag.to_string()))
}

/// A required column coerced to `i64`.
pub fn column_i64(table: &TagTable, tag: &str) -> Result<Vec<i64>, StarError> {
    column_required(table, tag)?
        .iter()
        .map(|v| parse_i64(tag, v))
        .collect()
}

/// A required column coerced to `f64`.
pub fn column_f64(table: &TagTable, tag: &str) -> Result<Vec<f64>, StarError> {
    column_required(table, tag)?
        .iter()
        .map(|v| parse_f64(tag, v))
        .collect()
}

/// An optional column of per-row optional `f64` values: a missing tag
/// yields `None`, a `?`/`.` entry yields a `None` row.
pub fn column_opt_f64(table: &TagTable, tag: &str) -> Result<Option<Vec<Option<f64>>>, StarError> {
    match table.column(tag) {
        None => Ok(None),
        Some(column) => column
            .iter()
            .map(|v| from_star(v).map(|present| parse_f64(tag, present)).transpose())
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
    }
}

fn parse_i64(tag: &str, value: &str) -> Result<i64, StarError> {
    value.parse().map_err(|_| StarError::Coerce {
        tag: tag.to_string(),
        value: value.to_string(),
        wanted: "an integer",
    })
}

fn parse_f64(tag: &str, value: &str) -> Result<f64, StarError> {
    value.parse().map_err(|_| StarError::Coerce {
        tag: tag.to_string(),
        value: value.to_string(),
        wanted: "a number",
    })
}
