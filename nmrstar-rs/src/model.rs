//! Core STAR data model: tag tables, save frames and documents.
//!
//! A [`Document`] is the parsed form of one STAR file: a title plus an
//! ordered sequence of data nodes, where each node is either a bare
//! [`TagTable`] or a [`SaveFrame`] grouping several tables. Values are
//! always strings at this layer; typed interpretation happens in the
//! tag-dictionary layer on top.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::StarError;
use crate::write::Flavor;

// ============================================================================
// TagTable
// ============================================================================

/// One STAR tag table: either *free* (one scalar value per tag) or *looped*
/// (N rows of values under a fixed set of tag columns).
///
/// Data is stored column-major: `tagvalues[i]` is the full value column for
/// `tagnames[i]`. Every column must have the same length; this invariant is
/// enforced on construction and re-checked before serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagTable {
    /// Free (scalar record) or looped (tabular) table.
    pub free: bool,
    /// Comment text emitted verbatim before the table.
    pub comment: String,
    /// Column names, including the leading underscore (e.g. `_Atom_ID` or
    /// `_Auto_relaxation.Val`).
    pub tagnames: Vec<String>,
    /// One value column per tag name, all of equal length.
    pub tagvalues: Vec<Vec<String>>,
}

impl TagTable {
    /// Build a table, validating the cardinality invariant: unique tag
    /// names and equal-length value columns.
    pub fn new(
        free: bool,
        tagnames: Vec<String>,
        tagvalues: Vec<Vec<String>>,
    ) -> Result<Self, StarError> {
        let table = TagTable {
            free,
            comment: String::new(),
            tagnames,
            tagvalues,
        };
        table.check_integrity()?;
        Ok(table)
    }

    /// Re-validate the cardinality invariant on demand.
    pub fn check_integrity(&self) -> Result<(), StarError> {
        if self.tagnames.len() != self.tagvalues.len() {
            return Err(StarError::cardinality(
                self.title(),
                format!(
                    "{} tag names but {} value columns",
                    self.tagnames.len(),
                    self.tagvalues.len()
                ),
            ));
        }
        let mut seen = HashSet::new();
        for name in &self.tagnames {
            if !seen.insert(name.as_str()) {
                return Err(StarError::cardinality(
                    self.title(),
                    format!("duplicate tag name '{name}'"),
                ));
            }
        }
        if let Some(first) = self.tagvalues.first() {
            for (i, column) in self.tagvalues.iter().enumerate() {
                if column.len() != first.len() {
                    return Err(StarError::cardinality(
                        self.title(),
                        format!(
                            "column '{}' has {} values but column '{}' has {}",
                            self.tagnames[i],
                            column.len(),
                            self.tagnames[0],
                            first.len()
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Number of value rows (0 for an empty table).
    pub fn n_rows(&self) -> usize {
        self.tagvalues.first().map_or(0, Vec::len)
    }

    /// A title identifying the table by its tag names.
    pub fn title(&self) -> String {
        self.tagnames.join(" ")
    }

    /// Index of a tag column by exact name.
    pub fn column_index(&self, tag: &str) -> Option<usize> {
        self.tagnames.iter().position(|t| t == tag)
    }

    /// The value column for a tag, if present.
    pub fn column(&self, tag: &str) -> Option<&[String]> {
        self.column_index(tag)
            .map(|i| self.tagvalues[i].as_slice())
    }

    /// The first value of a tag column (the scalar value of a free table).
    pub fn single(&self, tag: &str) -> Option<&str> {
        self.column(tag)?.first().map(String::as_str)
    }

    /// Whether any column of this table carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.column_index(tag).is_some()
    }

    /// The STAR text representation of this table.
    pub fn star_text(&self, flavor: Flavor) -> String {
        crate::write::table_text(self, flavor)
    }
}

// ============================================================================
// SaveFrame
// ============================================================================

/// A named, ordered group of tag tables delimited by `save_<title>` /
/// `save_` in STAR text. Save frames do not nest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveFrame {
    pub title: String,
    /// Comment text emitted verbatim before the frame.
    pub comment: String,
    pub tagtables: Vec<TagTable>,
}

impl SaveFrame {
    pub fn new(title: impl Into<String>) -> Self {
        SaveFrame {
            title: title.into(),
            comment: String::new(),
            tagtables: Vec::new(),
        }
    }

    /// The saveframe category: the first value of the first tag table's
    /// first column. Lenient by design: if that tag is not a recognized
    /// category tag (`_Saveframe_category` in 2.1 files, `.Sf_category` in
    /// 3.x files) a warning is logged and the value is returned anyway.
    /// Callers that need certainty must verify the tag name themselves.
    pub fn category(&self) -> Option<&str> {
        let table = self.tagtables.first()?;
        let name = table.tagnames.first()?;
        let value = table.tagvalues.first()?.first()?;
        if !(name.ends_with("_Saveframe_category") || name.ends_with(".Sf_category")) {
            log::warn!(
                "save frame '{}': first tag '{}' is not a saveframe category tag, \
                 using its value '{}' anyway",
                self.title,
                name,
                value
            );
        }
        Some(value.as_str())
    }

    pub fn check_integrity(&self) -> Result<(), StarError> {
        for table in &self.tagtables {
            table.check_integrity()?;
        }
        Ok(())
    }

    /// The STAR text representation of this frame, delimiters included.
    pub fn star_text(&self, flavor: Flavor) -> String {
        crate::write::frame_text(self, flavor)
    }
}

// ============================================================================
// DataNode / Document
// ============================================================================

/// A top-level data node: a save frame or a bare tag table. Bare top-level
/// tables are legal STAR, used e.g. for entry-level metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DataNode {
    Frame(SaveFrame),
    Table(TagTable),
}

impl DataNode {
    pub fn as_frame(&self) -> Option<&SaveFrame> {
        match self {
            DataNode::Frame(frame) => Some(frame),
            DataNode::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&TagTable> {
        match self {
            DataNode::Table(table) => Some(table),
            DataNode::Frame(_) => None,
        }
    }

    /// The node's leading comment text.
    pub fn comment(&self) -> &str {
        match self {
            DataNode::Frame(frame) => &frame.comment,
            DataNode::Table(table) => &table.comment,
        }
    }

    pub fn check_integrity(&self) -> Result<(), StarError> {
        match self {
            DataNode::Frame(frame) => frame.check_integrity(),
            DataNode::Table(table) => table.check_integrity(),
        }
    }

    pub fn star_text(&self, flavor: Flavor) -> String {
        match self {
            DataNode::Frame(frame) => frame.star_text(flavor),
            DataNode::Table(table) => table.star_text(flavor),
        }
    }
}

/// A whole STAR document: the `data_<title>` header plus an ordered
/// sequence of data nodes. Node order is significant and preserved on
/// round-trip; mutation is append-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub datanodes: Vec<DataNode>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Document {
            title: title.into(),
            datanodes: Vec::new(),
        }
    }

    /// Parse STAR text into a document. See [`crate::parse::parse`].
    pub fn parse(text: &str) -> Result<Self, StarError> {
        crate::parse::parse(text)
    }

    /// Read and parse a STAR file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, StarError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Serialize and write the document wholesale.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), StarError> {
        self.check_integrity()?;
        std::fs::write(path, self.star_text(Flavor::NmrStar))?;
        Ok(())
    }

    /// The STAR text representation of the whole document.
    pub fn star_text(&self, flavor: Flavor) -> String {
        crate::write::document_text(self, flavor)
    }

    pub fn check_integrity(&self) -> Result<(), StarError> {
        for node in &self.datanodes {
            node.check_integrity()?;
        }
        Ok(())
    }

    pub fn push(&mut self, node: DataNode) {
        self.datanodes.push(node);
    }

    pub fn push_frame(&mut self, frame: SaveFrame) {
        self.datanodes.push(DataNode::Frame(frame));
    }

    pub fn push_table(&mut self, table: TagTable) {
        self.datanodes.push(DataNode::Table(table));
    }

    /// All top-level save frames whose [`SaveFrame::category`] equals the
    /// requested category.
    pub fn save_frames(&self, category: &str) -> Vec<&SaveFrame> {
        self.datanodes
            .iter()
            .filter_map(DataNode::as_frame)
            .filter(|frame| frame.category() == Some(category))
            .collect()
    }

    /// Iterator over all top-level save frames.
    pub fn frames(&self) -> impl Iterator<Item = &SaveFrame> {
        self.datanodes.iter().filter_map(DataNode::as_frame)
    }
}
