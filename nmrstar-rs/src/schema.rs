//! Versioned tag-dictionary support.
//!
//! NMR-STAR dictionary versions rename tags and move them between
//! categories (e.g. the residue number column is `_Residue_seq_code` in a
//! 2.1 file but `_Auto_relaxation.Comp_index_ID` in a 3.1 one). Each
//! category module in this crate therefore builds one [`TagMap`] per
//! (category, version) pair as plain data: an ordered list of abstract
//! field keys mapped to version-specific tag-name suffixes, with `None`
//! marking a field that does not exist in that dictionary version. There is
//! no inheritance chain to override; a map is looked up whole for the
//! version in hand.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::StarError;
use crate::model::{Document, TagTable};

// ============================================================================
// Dictionary versions
// ============================================================================

/// An NMR-STAR dictionary version.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum StarVersion {
    #[strum(serialize = "2.1")]
    V2_1,
    #[strum(serialize = "3.0")]
    V3_0,
    #[strum(serialize = "3.1")]
    V3_1,
    #[strum(serialize = "3.2")]
    V3_2,
}

impl FromStr for StarVersion {
    type Err = StarError;

    fn from_str(s: &str) -> Result<Self, StarError> {
        match s {
            "2.1" => Ok(StarVersion::V2_1),
            "3.0" => Ok(StarVersion::V3_0),
            "3.1" => Ok(StarVersion::V3_1),
            "3.2" => Ok(StarVersion::V3_2),
            other => Err(StarError::Coerce {
                tag: "NMR_STAR_version".to_string(),
                value: other.to_string(),
                wanted: "one of 2.1, 3.0, 3.1, 3.2",
            }),
        }
    }
}

impl StarVersion {
    pub fn major(self) -> u8 {
        match self {
            StarVersion::V2_1 => 2,
            _ => 3,
        }
    }

    /// Whether this version uses the 3.x `Category.Tag` naming scheme.
    pub fn dotted_tags(self) -> bool {
        self.major() >= 3
    }

    /// Sniff the dictionary version of a parsed document from the version
    /// tag of its entry-information frame (any free tag whose name ends in
    /// `NMR_STAR_version`). Patch components beyond `major.minor` are
    /// ignored.
    pub fn detect(document: &Document) -> Option<StarVersion> {
        let tables = document.datanodes.iter().flat_map(|node| match node {
            crate::model::DataNode::Frame(frame) => frame.tagtables.iter(),
            crate::model::DataNode::Table(table) => std::slice::from_ref(table).iter(),
        });
        for table in tables.filter(|t| t.free) {
            for (name, column) in table.tagnames.iter().zip(&table.tagvalues) {
                if name.ends_with("NMR_STAR_version") {
                    let value = column.first()?;
                    let short = value.split('.').take(2).collect::<Vec<_>>().join(".");
                    if let Ok(version) = StarVersion::from_str(&short) {
                        return Some(version);
                    }
                }
            }
        }
        None
    }
}

// ============================================================================
// Tag maps
// ============================================================================

/// The tag dictionary of one category under one version: an ordered list of
/// `(key, suffix)` entries under a shared name prefix. 2.1-era categories
/// carry no label, so their full tag names are just `_<suffix>`.
#[derive(Clone, Debug)]
pub struct TagMap {
    label: Option<&'static str>,
    sep: &'static str,
    entries: Vec<(&'static str, Option<&'static str>)>,
}

impl TagMap {
    pub fn new(label: Option<&'static str>) -> Self {
        TagMap {
            label,
            sep: ".",
            entries: Vec::new(),
        }
    }

    /// Builder: register a key and its suffix (`None` = the field does not
    /// exist in this version).
    pub fn tag(mut self, key: &'static str, suffix: Option<&'static str>) -> Self {
        self.entries.push((key, suffix));
        self
    }

    pub fn label(&self) -> Option<&'static str> {
        self.label
    }

    /// The `_` or `_<label><sep>` prefix applied to every suffix.
    pub fn prefix(&self) -> String {
        match self.label {
            Some(label) => format!("_{}{}", label, self.sep),
            None => "_".to_string(),
        }
    }

    fn category_name(&self) -> String {
        self.label.unwrap_or("<uncategorized>").to_string()
    }

    /// The full tag name for a key: `Ok(None)` if the key is legitimately
    /// absent in this version, an [`StarError::UnknownKey`] if the key is
    /// not part of this category's dictionary at all.
    pub fn full_tag(&self, key: &str) -> Result<Option<String>, StarError> {
        match self.entries.iter().find(|(k, _)| *k == key) {
            None => Err(StarError::UnknownKey {
                category: self.category_name(),
                key: key.to_string(),
            }),
            Some((_, None)) => Ok(None),
            Some((_, Some(suffix))) => Ok(Some(format!("{}{}", self.prefix(), suffix))),
        }
    }

    /// The full tag name for a key that the caller knows exists in this
    /// version; absence is reported as an [`StarError::UnknownKey`].
    pub fn required_tag(&self, key: &str) -> Result<String, StarError> {
        self.full_tag(key)?.ok_or_else(|| StarError::UnknownKey {
            category: self.category_name(),
            key: key.to_string(),
        })
    }

    /// Reverse lookup: the key whose full tag name matches.
    pub fn key_for(&self, full_tag: &str) -> Option<&'static str> {
        let prefix = self.prefix();
        let suffix = full_tag.strip_prefix(&prefix)?;
        self.entries
            .iter()
            .find(|(_, s)| *s == Some(suffix))
            .map(|(k, _)| *k)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }
}

// ============================================================================
// Table building
// ============================================================================

/// One field's values when building a tag table: a scalar broadcast over
/// every row, or a full column.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Single(String),
    Column(Vec<String>),
}

impl FieldValue {
    /// A scalar field, with `None` rendered as the `?` placeholder.
    pub fn single(value: Option<impl ToString>) -> Self {
        FieldValue::Single(crate::tag_utils::to_star(value))
    }

    /// A column field; a missing list becomes a `?` column of length `n`.
    pub fn column<T: ToString>(values: Option<&[T]>, n: usize) -> Self {
        FieldValue::Column(crate::tag_utils::to_star_column(values, n))
    }

    /// A column of per-row optional values.
    pub fn opt_column<T: ToString>(values: Option<&[Option<T>]>, n: usize) -> Self {
        FieldValue::Column(crate::tag_utils::to_star_opt_column(values, n))
    }
}

/// Build one tag table from `(key, value)` pairs resolved through a tag
/// map. Keys mapped to `None` are skipped silently; unknown keys fail; a
/// scalar among columns is broadcast to the row count; ragged columns are a
/// cardinality error.
pub fn build_tag_table(
    map: &TagMap,
    free: bool,
    fields: Vec<(&'static str, FieldValue)>,
) -> Result<TagTable, StarError> {
    let mut resolved: Vec<(String, FieldValue)> = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        if let Some(name) = map.full_tag(key)? {
            resolved.push((name, value));
        }
    }

    let n_rows = resolved
        .iter()
        .filter_map(|(_, value)| match value {
            FieldValue::Column(column) => Some(column.len()),
            FieldValue::Single(_) => None,
        })
        .max()
        .unwrap_or(1);

    let mut tagnames = Vec::with_capacity(resolved.len());
    let mut tagvalues = Vec::with_capacity(resolved.len());
    for (name, value) in resolved {
        let column = match value {
            FieldValue::Single(v) => vec![v; n_rows],
            FieldValue::Column(column) if column.len() == n_rows => column,
            FieldValue::Column(column) if column.len() == 1 => {
                vec![column[0].clone(); n_rows]
            }
            FieldValue::Column(column) => {
                return Err(StarError::cardinality(
                    map.category_name(),
                    format!(
                        "column '{}' has {} values, expected {}",
                        name,
                        column.len(),
                        n_rows
                    ),
                ));
            }
        };
        tagnames.push(name);
        tagvalues.push(column);
    }

    TagTable::new(free, tagnames, tagvalues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> TagMap {
        TagMap::new(Some("Auto_relaxation"))
            .tag("RxID", Some("ID"))
            .tag("CompIndexID", Some("Comp_index_ID"))
            .tag("SeqID", None)
            .tag("Val", Some("Auto_relaxation_val"))
    }

    #[test]
    fn full_tag_resolution() {
        let map = map();
        assert_eq!(
            map.full_tag("CompIndexID").unwrap().as_deref(),
            Some("_Auto_relaxation.Comp_index_ID")
        );
        assert_eq!(map.full_tag("SeqID").unwrap(), None);
        assert!(matches!(
            map.full_tag("Bogus"),
            Err(StarError::UnknownKey { .. })
        ));
    }

    #[test]
    fn bare_prefix_for_unlabeled_categories() {
        let map = TagMap::new(None).tag("CompIndexID", Some("Residue_seq_code"));
        assert_eq!(
            map.full_tag("CompIndexID").unwrap().as_deref(),
            Some("_Residue_seq_code")
        );
    }

    #[test]
    fn reverse_lookup_is_the_inverse() {
        let map = map();
        for key in ["RxID", "CompIndexID", "Val"] {
            let full = map.full_tag(key).unwrap().unwrap();
            assert_eq!(map.key_for(&full), Some(key));
        }
        assert_eq!(map.key_for("_Auto_relaxation.Seq_ID"), None);
    }

    #[test]
    fn absent_keys_never_reach_built_tables() {
        let table = build_tag_table(
            &map(),
            false,
            vec![
                ("CompIndexID", FieldValue::Column(vec!["1".into(), "2".into()])),
                ("SeqID", FieldValue::Column(vec!["9".into(), "9".into()])),
                ("Val", FieldValue::Column(vec!["1.1".into(), "2.2".into()])),
            ],
        )
        .unwrap();
        assert_eq!(
            table.tagnames,
            [
                "_Auto_relaxation.Comp_index_ID",
                "_Auto_relaxation.Auto_relaxation_val"
            ]
        );
    }

    #[test]
    fn singles_broadcast_to_the_row_count() {
        let table = build_tag_table(
            &map(),
            false,
            vec![
                ("RxID", FieldValue::Single("7".into())),
                ("Val", FieldValue::Column(vec!["1.1".into(), "2.2".into()])),
            ],
        )
        .unwrap();
        assert_eq!(table.tagvalues[0], ["7", "7"]);
    }

    #[test]
    fn ragged_columns_rejected() {
        let result = build_tag_table(
            &map(),
            false,
            vec![
                ("CompIndexID", FieldValue::Column(vec!["1".into(), "2".into()])),
                (
                    "Val",
                    FieldValue::Column(vec!["1.1".into(), "2.2".into(), "3.3".into()]),
                ),
            ],
        );
        assert!(matches!(result, Err(StarError::Cardinality { .. })));
    }

    #[test]
    fn version_strings_round_trip() {
        for (version, text) in [
            (StarVersion::V2_1, "2.1"),
            (StarVersion::V3_0, "3.0"),
            (StarVersion::V3_1, "3.1"),
            (StarVersion::V3_2, "3.2"),
        ] {
            assert_eq!(version.to_string(), text);
            assert_eq!(StarVersion::from_str(text).unwrap(), version);
        }
        assert_eq!(StarVersion::V2_1.major(), 2);
        assert!(StarVersion::V3_1.dotted_tags());
    }

    #[test]
    fn version_detected_from_entry_tag() {
        let doc = crate::parse::parse(
            "data_t\nsave_entry_information_1\n_Entry.Sf_category entry_information\n_Entry.NMR_STAR_version 3.1.1.61\nsave_\n",
        )
        .unwrap();
        assert_eq!(StarVersion::detect(&doc), Some(StarVersion::V3_1));
    }
}
