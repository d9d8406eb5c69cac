//! STAR text serialization.
//!
//! The layout follows the NMR-STAR conventions: free tags are emitted one
//! `name value` pair per line, looped tables as `loop_`, the tag run, a
//! blank line, one row per line and a closing `stop_`. The [`Flavor`]
//! controls indentation only (NMR-STAR indents tables three spaces, mmCIF
//! none); it never changes the token stream.

use itertools::Itertools;

use crate::model::{Document, SaveFrame, TagTable};
use crate::text::quote_value;

/// Output dialect. Cosmetic: controls indent widths only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, strum_macros::Display)]
pub enum Flavor {
    #[default]
    #[strum(serialize = "NMR-STAR")]
    NmrStar,
    #[strum(serialize = "mmCIF")]
    MmCif,
}

impl Flavor {
    fn loop_indent(self) -> usize {
        match self {
            Flavor::NmrStar => 3,
            Flavor::MmCif => 0,
        }
    }
}

/// Serialize one tag table.
pub fn table_text(table: &TagTable, flavor: Flavor) -> String {
    let indent = " ".repeat(flavor.loop_indent());
    let tag_indent = " ".repeat(flavor.loop_indent() + 3);

    // Free tags: one name/value pair per line.
    if table.free {
        let mut out = String::new();
        for (name, column) in table.tagnames.iter().zip(&table.tagvalues) {
            let value = quote_value(column.first().map(String::as_str).unwrap_or(""));
            out.push_str(&indent);
            out.push_str(name);
            out.push(' ');
            out.push_str(&value);
            if !value.ends_with('\n') {
                out.push('\n');
            }
        }
        return out;
    }

    // Looped tags: the tag run, a blank line, then one row per line.
    let mut out = format!("{indent}loop_\n");
    for name in &table.tagnames {
        out.push_str(&tag_indent);
        out.push_str(name);
        out.push('\n');
    }
    out.push('\n');

    let rows = (0..table.n_rows())
        .map(|row| {
            table
                .tagvalues
                .iter()
                .map(|column| quote_value(&column[row]))
                .join(" ")
        })
        .join("\n");
    out.push_str(&rows);
    out.push_str(&format!("\n\n{indent}stop_\n"));
    out
}

/// Serialize one save frame, delimiters included.
pub fn frame_text(frame: &SaveFrame, flavor: Flavor) -> String {
    let mut out = format!("\nsave_{}\n", frame.title);
    for table in &frame.tagtables {
        out.push_str(&table.comment);
        out.push_str(&table.star_text(flavor));
    }
    out.push_str("\nsave_\n");
    out
}

/// Serialize a whole document.
pub fn document_text(document: &Document, flavor: Flavor) -> String {
    let mut out = format!("data_{}\n", document.title);
    for node in &document.datanodes {
        out.push_str(node.comment());
        out.push_str(&node.star_text(flavor));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataNode;

    fn free_table() -> TagTable {
        TagTable::new(
            true,
            vec!["_Cat.Sf_category".into(), "_Cat.Details".into()],
            vec![vec!["my_cat".into()], vec!["two words".into()]],
        )
        .unwrap()
    }

    #[test]
    fn free_table_layout() {
        let text = table_text(&free_table(), Flavor::NmrStar);
        assert_eq!(
            text,
            "   _Cat.Sf_category my_cat\n   _Cat.Details \"two words\"\n"
        );
    }

    #[test]
    fn looped_table_layout() {
        let table = TagTable::new(
            false,
            vec!["_T.A".into(), "_T.B".into()],
            vec![
                vec!["1".into(), "2".into()],
                vec!["x".into(), "y z".into()],
            ],
        )
        .unwrap();
        let text = table_text(&table, Flavor::NmrStar);
        assert_eq!(
            text,
            "   loop_\n      _T.A\n      _T.B\n\n1 x\n2 \"y z\"\n\n   stop_\n"
        );
    }

    #[test]
    fn mmcif_flavor_drops_indent() {
        let table = TagTable::new(false, vec!["_T.A".into()], vec![vec!["1".into()]]).unwrap();
        let text = table_text(&table, Flavor::MmCif);
        assert!(text.starts_with("loop_\n   _T.A\n"));
    }

    #[test]
    fn document_layout() {
        let mut doc = Document::new("demo");
        let mut frame = SaveFrame::new("frame_1");
        frame.tagtables.push(free_table());
        doc.push_frame(frame);
        let text = document_text(&doc, Flavor::NmrStar);
        assert!(text.starts_with("data_demo\n\nsave_frame_1\n"));
        assert!(text.ends_with("\nsave_\n"));
    }

    #[test]
    fn node_comments_are_emitted() {
        let mut doc = Document::new("demo");
        let mut table = free_table();
        table.comment = "# provenance note\n".to_string();
        doc.push(DataNode::Table(table));
        let text = document_text(&doc, Flavor::NmrStar);
        assert!(text.contains("# provenance note\n   _Cat.Sf_category"));
    }
}
