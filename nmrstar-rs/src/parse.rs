//! Whole-document STAR parser.
//!
//! The grammar has exactly four top-level productions after the
//! `data_<title>` header: save-frame begin (`save_<name>`), save-frame end
//! (bare `save_`), a free tag table (`_<name> <value>` pairs), and a looped
//! tag table (`loop_`). The parser classifies the next non-whitespace
//! position as one of these with O(1) lookahead and drives an explicit
//! state machine (`frame_open`), so nesting violations and unmatched frame
//! terminators fail immediately with positional context.
//!
//! Input is preprocessed before tokenizing (see [`crate::text`]): line
//! endings normalized, comments stripped, semicolon blocks collapsed onto
//! single lines. Looped tables need no explicit `stop_` terminator: the end
//! of a loop is located by scanning ahead (outside quoted regions) for the
//! nearest whitespace-preceded `loop_`, `stop_` or `_tag`, as CIF-derived
//! files require.

use crate::error::StarError;
use crate::model::{Document, SaveFrame, TagTable};
use crate::text;
use crate::text::EOL_MARK;

/// Parse STAR text into a [`Document`].
pub fn parse(input: &str) -> Result<Document, StarError> {
    parse_with_options(input, false)
}

/// Parse STAR text, optionally applying the nmrView `{ }` compression pass.
pub fn parse_with_options(input: &str, nmrview: bool) -> Result<Document, StarError> {
    let text = text::normalize_line_endings(input);
    let text = text::strip_comments(&text);
    let text = text::collapse_semicolon_blocks(&text);
    let text = if nmrview {
        text::compress_nmrview(&text)
    } else {
        text
    };
    Parser::new(&text).parse_document()
}

/// Parse one tag table from preprocessed STAR text starting at `pos`,
/// returning the table and the position of the first character after it.
///
/// For a free table, `pos` must be at the first `_` of the tag run. For a
/// looped table, `pos` may be at the `loop_` keyword or just after it.
pub fn parse_tag_table(
    text: &str,
    pos: usize,
    free: bool,
) -> Result<(TagTable, usize), StarError> {
    let mut parser = Parser::new(text);
    parser.pos = pos;
    parser.skip_ws();
    let table = if free {
        parser.parse_free_table()?
    } else {
        if parser.rest().starts_with(b"loop_") {
            parser.pos += 5;
        }
        parser.parse_loop_table()?
    };
    Ok((table, parser.pos))
}

// ============================================================================
// Token classification
// ============================================================================

#[derive(Copy, Clone, Debug, PartialEq)]
enum TokenKind {
    SaveBegin,
    SaveEnd,
    FreeTagStart,
    LoopStart,
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Parser {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn skip_ws_bounded(&mut self, end: usize) {
        while self.pos < end && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Read a run of non-whitespace characters.
    fn take_word(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len() && !self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        self.text[start..self.pos].to_string()
    }

    /// Classify the token at the current (non-whitespace) position.
    /// Precedence: save begin, save end, free tag, loop start.
    fn classify(&self) -> Option<TokenKind> {
        let rest = self.rest();
        if rest.starts_with(b"save_") {
            if rest.len() > 5 && !rest[5].is_ascii_whitespace() {
                return Some(TokenKind::SaveBegin);
            }
            return Some(TokenKind::SaveEnd);
        }
        if rest.first() == Some(&b'_') && rest.len() > 1 && !rest[1].is_ascii_whitespace() {
            return Some(TokenKind::FreeTagStart);
        }
        if rest.starts_with(b"loop_") && (rest.len() == 5 || rest[5].is_ascii_whitespace()) {
            return Some(TokenKind::LoopStart);
        }
        None
    }

    // ========================================================================
    // Document
    // ========================================================================

    fn parse_document(&mut self) -> Result<Document, StarError> {
        // The mandatory data_<title> header.
        self.skip_ws();
        if !self.rest().starts_with(b"data_") {
            return Err(StarError::parse_at(
                self.text,
                self.pos,
                "expected a 'data_<title>' header",
            ));
        }
        self.pos += 5;
        let title = self.take_word();
        if title.is_empty() {
            return Err(StarError::parse_at(
                self.text,
                self.pos,
                "the 'data_' header carries no title",
            ));
        }
        log::debug!("parsing STAR document 'data_{title}'");

        let mut document = Document::new(title);
        let mut open_frame: Option<SaveFrame> = None;

        loop {
            self.skip_ws();
            if self.pos >= self.bytes.len() {
                break;
            }
            let kind = self.classify().ok_or_else(|| {
                StarError::parse_at(
                    self.text,
                    self.pos,
                    "expected a save frame begin or end, a free tag, or 'loop_'",
                )
            })?;
            match kind {
                TokenKind::SaveBegin => {
                    if open_frame.is_some() {
                        return Err(StarError::parse_at(
                            self.text,
                            self.pos,
                            "save frame begins while the previous frame is still open \
                             (save frames do not nest)",
                        ));
                    }
                    self.pos += 5;
                    open_frame = Some(SaveFrame::new(self.take_word()));
                }
                TokenKind::SaveEnd => {
                    let frame = open_frame.take().ok_or_else(|| {
                        StarError::parse_at(
                            self.text,
                            self.pos,
                            "save frame end without a matching begin",
                        )
                    })?;
                    self.pos += 5;
                    document.push_frame(frame);
                }
                TokenKind::FreeTagStart => {
                    let table = self.parse_free_table()?;
                    match open_frame.as_mut() {
                        Some(frame) => frame.tagtables.push(table),
                        None => document.push_table(table),
                    }
                }
                TokenKind::LoopStart => {
                    self.pos += 5;
                    let table = self.parse_loop_table()?;
                    match open_frame.as_mut() {
                        Some(frame) => frame.tagtables.push(table),
                        None => document.push_table(table),
                    }
                }
            }
        }

        if let Some(frame) = open_frame.take() {
            log::warn!(
                "save frame '{}' was not closed before the end of the file",
                frame.title
            );
            document.push_frame(frame);
        }

        log::debug!(
            "parsed {} top-level data nodes",
            document.datanodes.len()
        );
        Ok(document)
    }

    // ========================================================================
    // Free tag tables
    // ========================================================================

    /// Parse `_name value` pairs while the next token starts with `_`.
    fn parse_free_table(&mut self) -> Result<TagTable, StarError> {
        let mut tagnames = Vec::new();
        let mut tagvalues = Vec::new();
        loop {
            self.skip_ws();
            if self.rest().first() != Some(&b'_') {
                break;
            }
            let name = self.take_word();
            self.skip_ws();
            if self.pos >= self.bytes.len() {
                return Err(StarError::parse_at(
                    self.text,
                    self.pos,
                    format!("free tag '{name}' has no value"),
                ));
            }
            let value = self.parse_value()?;
            tagnames.push(name);
            tagvalues.push(vec![value]);
        }
        TagTable::new(true, tagnames, tagvalues)
    }

    // ========================================================================
    // Looped tag tables
    // ========================================================================

    /// Parse a looped table; the `loop_` keyword has already been consumed.
    fn parse_loop_table(&mut self) -> Result<TagTable, StarError> {
        // The contiguous run of tag names fixes the column count.
        let mut tagnames = Vec::new();
        loop {
            self.skip_ws();
            if self.rest().first() == Some(&b'_') {
                tagnames.push(self.take_word());
            } else {
                break;
            }
        }
        if tagnames.is_empty() {
            return Err(StarError::parse_at(
                self.text,
                self.pos,
                "no tag names found for looped tag table",
            ));
        }
        if self.pos >= self.bytes.len() {
            return Err(StarError::parse_at(
                self.text,
                self.pos,
                "no tag values found for looped tag table",
            ));
        }

        // The table end is the nearest whitespace-preceded loop_, stop_ or
        // _tag outside quoted regions; CIF-derived files may omit stop_.
        let (pos_end, terminated_by_stop) = self.find_loop_end();

        let n_columns = tagnames.len();
        let mut columns: Vec<Vec<String>> = vec![Vec::new(); n_columns];
        let mut tag_id = 0;
        loop {
            self.skip_ws_bounded(pos_end);
            if self.pos >= pos_end {
                break;
            }
            let value = self.parse_value_bounded(pos_end)?;
            columns[tag_id].push(value);
            tag_id = (tag_id + 1) % n_columns;
        }
        self.pos = pos_end;

        let table_title = tagnames.join(" ");
        if tag_id != 0 {
            let complete_rows = columns[n_columns - 1].len().min(columns[0].len());
            return Err(StarError::cardinality(
                table_title,
                format!(
                    "total value count is not a multiple of the column count: \
                     {complete_rows} complete row(s) and {tag_id} value(s) in the \
                     incomplete last row"
                ),
            ));
        }
        if columns[0].is_empty() {
            return Err(StarError::cardinality(table_title, "no tag values parsed"));
        }

        if terminated_by_stop {
            self.skip_ws();
            if self.rest().starts_with(b"stop_") {
                self.pos += 5;
            } else {
                return Err(StarError::parse_at(
                    self.text,
                    self.pos,
                    "expected the 'stop_' located by the end-of-table scan",
                ));
            }
        }

        TagTable::new(false, tagnames, columns)
    }

    /// Scan ahead from the current position for the nearest table
    /// terminator, skipping quoted regions and collapsed semicolon-block
    /// lines. Returns the terminator position (the keyword start) and
    /// whether it is a `stop_`; end of text if none is found.
    fn find_loop_end(&self) -> (usize, bool) {
        let bytes = self.bytes;
        let len = bytes.len();
        // Start one character back so a terminator at the current token is
        // seen; the preceding character is always whitespace here.
        let mut i = self.pos.saturating_sub(1);
        let mut in_quote: Option<u8> = None;
        while i < len {
            let c = bytes[i];
            if c == b'\n' {
                in_quote = None;
                // A collapsed semicolon block occupies the whole next line;
                // nothing inside it can terminate the table.
                if i + 1 < len && bytes[i + 1] == b';' {
                    i += 1;
                    while i < len && bytes[i] != b'\n' {
                        i += 1;
                    }
                    continue;
                }
            }
            match in_quote {
                Some(quote) => {
                    if c == quote && (i + 1 >= len || bytes[i + 1].is_ascii_whitespace()) {
                        in_quote = None;
                    }
                }
                None => {
                    if (c == b'\'' || c == b'"')
                        && i > 0
                        && bytes[i - 1].is_ascii_whitespace()
                    {
                        in_quote = Some(c);
                    } else if c.is_ascii_whitespace() && i + 1 < len {
                        let rest = &bytes[i + 1..];
                        if starts_keyword(rest, b"stop_") {
                            return (i + 1, true);
                        }
                        if starts_keyword(rest, b"loop_") {
                            return (i + 1, false);
                        }
                        if rest[0] == b'_' && rest.len() > 1 && !rest[1].is_ascii_whitespace()
                        {
                            return (i + 1, false);
                        }
                    }
                }
            }
            i += 1;
        }
        (len, false)
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Parse one value token: quoted, semicolon block, or bare word. A
    /// quote character opens a quoted token only at the start of the token
    /// (i.e. after whitespace); an apostrophe inside a bare word such as
    /// `H5''` is ordinary text.
    fn parse_value(&mut self) -> Result<String, StarError> {
        let c = self.bytes[self.pos];
        if c == b'\'' || c == b'"' {
            return self.parse_quoted(c);
        }
        if c == b';' && self.at_line_start() {
            return self.parse_semicolon_value();
        }
        Ok(self.take_word())
    }

    fn parse_value_bounded(&mut self, end: usize) -> Result<String, StarError> {
        let start = self.pos;
        let value = self.parse_value()?;
        if self.pos > end {
            return Err(StarError::parse_at(
                self.text,
                start,
                "quoted value is not wholly within the tag table boundaries",
            ));
        }
        Ok(value)
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.bytes[self.pos - 1] == b'\n'
    }

    /// Parse a quoted value. The closing quote is the matching quote
    /// character immediately followed by whitespace or end of text.
    fn parse_quoted(&mut self, quote: u8) -> Result<String, StarError> {
        let open = self.pos;
        let start = open + 1;
        let mut i = start;
        while i < self.bytes.len() {
            if self.bytes[i] == quote
                && (i + 1 >= self.bytes.len() || self.bytes[i + 1].is_ascii_whitespace())
            {
                self.pos = i + 1;
                return Ok(self.text[start..i].to_string());
            }
            i += 1;
        }
        Err(StarError::parse_at(
            self.text,
            open,
            format!("no matching closing quote for {}", quote as char),
        ))
    }

    /// Parse a collapsed semicolon-block value. The content excludes the
    /// delimiter lines' own newlines, so serializing the returned value
    /// again reproduces it exactly.
    fn parse_semicolon_value(&mut self) -> Result<String, StarError> {
        let open = self.pos;
        let body_start = open + 1;
        let mut search_from = body_start;
        while let Some(found) = self.text[search_from..].find(EOL_MARK) {
            let mark = search_from + found;
            let after = mark + EOL_MARK.len();
            if self.bytes.get(after) == Some(&b';') {
                let raw = &self.text[body_start..mark];
                let raw = raw.strip_prefix(EOL_MARK).unwrap_or(raw);
                self.pos = after + 1;
                return Ok(text::expand_semicolon_block(raw));
            }
            search_from = after;
        }
        Err(StarError::parse_at(
            self.text,
            open,
            "no matching terminator for semicolon-delimited block",
        ))
    }
}

fn starts_keyword(rest: &[u8], keyword: &[u8]) -> bool {
    rest.starts_with(keyword)
        && (rest.len() == keyword.len() || rest[keyword.len()].is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_table_at_top_level() {
        let doc = parse("data_test\n_Saveframe_category test_cat\n").unwrap();
        assert_eq!(doc.title, "test");
        assert_eq!(doc.datanodes.len(), 1);
        let table = doc.datanodes[0].as_table().unwrap();
        assert!(table.free);
        assert_eq!(table.tagnames, ["_Saveframe_category"]);
        assert_eq!(table.tagvalues, [["test_cat"]]);
    }

    #[test]
    fn looped_table_round_robin() {
        let doc = parse("data_test\nloop_\n_A\n_B\n\n1 x\n2 y\nstop_\n").unwrap();
        let table = doc.datanodes[0].as_table().unwrap();
        assert!(!table.free);
        assert_eq!(table.tagnames, ["_A", "_B"]);
        assert_eq!(table.tagvalues, [["1", "2"], ["x", "y"]]);
    }

    #[test]
    fn loop_without_stop_ended_by_next_tag() {
        let doc = parse("data_test\nloop_\n_A\n1\n2\n_Next value\n").unwrap();
        assert_eq!(doc.datanodes.len(), 2);
        let looped = doc.datanodes[0].as_table().unwrap();
        assert_eq!(looped.tagvalues, [["1", "2"]]);
        let free = doc.datanodes[1].as_table().unwrap();
        assert!(free.free);
        assert_eq!(free.tagnames, ["_Next"]);
    }

    #[test]
    fn loop_ended_by_next_loop() {
        let doc = parse("data_test\nloop_\n_A\n1\nloop_\n_B\n2\nstop_\n").unwrap();
        assert_eq!(doc.datanodes.len(), 2);
        assert_eq!(doc.datanodes[0].as_table().unwrap().tagvalues, [["1"]]);
        assert_eq!(doc.datanodes[1].as_table().unwrap().tagvalues, [["2"]]);
    }

    #[test]
    fn save_frame_collects_tables() {
        let text = "data_test\nsave_frame_1\n_Cat.Sf_category my_cat\nloop_\n_Cat.ID\n1\n2\nstop_\nsave_\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.datanodes.len(), 1);
        let frame = doc.datanodes[0].as_frame().unwrap();
        assert_eq!(frame.title, "frame_1");
        assert_eq!(frame.tagtables.len(), 2);
        assert_eq!(frame.category(), Some("my_cat"));
    }

    #[test]
    fn nested_save_frames_rejected() {
        let err = parse("data_t\nsave_a\nsave_b\nsave_\n").unwrap_err();
        assert!(matches!(err, StarError::Parse { .. }));
    }

    #[test]
    fn unmatched_save_end_rejected() {
        let err = parse("data_t\nsave_\n").unwrap_err();
        assert!(matches!(err, StarError::Parse { .. }));
    }

    #[test]
    fn missing_data_header_rejected() {
        let err = parse("_Tag value\n").unwrap_err();
        assert!(matches!(err, StarError::Parse { .. }));
    }

    #[test]
    fn unclassifiable_token_rejected() {
        let err = parse("data_t\nstray value\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("save frame"));
        assert!(message.contains("<<here>>"));
    }

    #[test]
    fn partial_row_is_a_cardinality_error() {
        let err = parse("data_t\nloop_\n_A\n_B\n1 x\n2\nstop_\n").unwrap_err();
        assert!(matches!(err, StarError::Cardinality { .. }));
    }

    #[test]
    fn empty_loop_is_a_cardinality_error() {
        let err = parse("data_t\nloop_\n_A\n_B\nstop_\n").unwrap_err();
        assert!(matches!(err, StarError::Cardinality { .. }));
    }

    #[test]
    fn quoted_values() {
        let doc = parse("data_t\n_A 'two words'\n_B \"other words\"\n").unwrap();
        let table = doc.datanodes[0].as_table().unwrap();
        assert_eq!(table.single("_A"), Some("two words"));
        assert_eq!(table.single("_B"), Some("other words"));
    }

    #[test]
    fn apostrophe_inside_bare_word() {
        let doc = parse("data_t\nloop_\n_Atom\nH5''\nO3'\nstop_\n").unwrap();
        let table = doc.datanodes[0].as_table().unwrap();
        assert_eq!(table.tagvalues, [["H5''", "O3'"]]);
    }

    #[test]
    fn closing_quote_requires_following_whitespace() {
        let doc = parse("data_t\n_A 'it's fine'\n").unwrap();
        let table = doc.datanodes[0].as_table().unwrap();
        assert_eq!(table.single("_A"), Some("it's fine"));
    }

    #[test]
    fn semicolon_block_value() {
        let doc = parse("data_t\n_Details\n;\nline one\nline two\n;\n_Next ok\n").unwrap();
        let table = doc.datanodes[0].as_table().unwrap();
        assert_eq!(table.single("_Details"), Some("line one\nline two"));
        assert_eq!(table.single("_Next"), Some("ok"));
    }

    #[test]
    fn semicolon_block_inside_loop() {
        let text = "data_t\nloop_\n_A\n_B\n1\n;\nmulti line\nwith stop_ inside\n;\n2 two\nstop_\n";
        let doc = parse(text).unwrap();
        let table = doc.datanodes[0].as_table().unwrap();
        assert_eq!(table.tagvalues[0], ["1", "2"]);
        assert_eq!(table.tagvalues[1][0], "multi line\nwith stop_ inside");
        assert_eq!(table.tagvalues[1][1], "two");
    }

    #[test]
    fn comments_and_crlf_preprocessed() {
        let doc = parse("data_t\r\n# header comment\r\n_A value # trailing\r\n").unwrap();
        let table = doc.datanodes[0].as_table().unwrap();
        assert_eq!(table.single("_A"), Some("value"));
    }

    #[test]
    fn parse_tag_table_public_entry() {
        let (table, _) = parse_tag_table("loop_\n_A\n_B\n\n1 x\n2 y\nstop_\n", 0, false).unwrap();
        assert_eq!(table.tagnames, ["_A", "_B"]);
        assert_eq!(table.tagvalues, [["1", "2"], ["x", "y"]]);

        let (table, pos) = parse_tag_table("_A 1\n_B two\nsave_\n", 0, true).unwrap();
        assert_eq!(table.tagnames, ["_A", "_B"]);
        assert_eq!(table.tagvalues, [["1"], ["two"]]);
        assert_eq!(&"_A 1\n_B two\nsave_\n"[pos..], "save_\n");
    }
}
