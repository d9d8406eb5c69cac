//! STAR text helpers: preprocessing passes and value quoting.
//!
//! The parser requires its input to have gone through the passes below in
//! order: line-ending normalization, comment stripping, semicolon-block
//! collapse, and (for nmrView-flavored files) `{ }` compression. Collapsing
//! rewrites each `;`-delimited multi-line block onto a single line by
//! substituting an internal sentinel for the embedded newlines, so the rest
//! of the grammar can treat the block as one token.

/// Sentinel substituted for newlines inside a collapsed semicolon block.
/// Must not contain whitespace or underscores.
pub(crate) const EOL_MARK: &str = "<eol-string>";

const PREFERRED_QUOTE: char = '"';

// ============================================================================
// Preprocessing passes
// ============================================================================

/// Normalize `\r\n` and bare `\r` line endings to `\n`.
pub(crate) fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Strip `#` comments. A `#` introduces a comment only at the start of a
/// line or after whitespace, and never inside a quoted value or a
/// semicolon-delimited block.
pub(crate) fn strip_comments(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut in_block = false;
    for line in lines {
        if line.starts_with(';') {
            in_block = !in_block;
            out.push(line);
        } else if in_block {
            out.push(line);
        } else {
            out.push(strip_comment_line(line));
        }
    }
    out.join("\n")
}

#[derive(PartialEq)]
enum QuoteState {
    Free,
    Single,
    Double,
}

/// Strip the comment from one line, honoring the quoting state machine: a
/// quote opens only after whitespace (or at line start) and closes only
/// before whitespace (or at line end).
fn strip_comment_line(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut state = QuoteState::Free;
    let mut i = 0;
    while i < bytes.len() {
        let ch = bytes[i];
        let after_ws = i == 0 || bytes[i - 1].is_ascii_whitespace();
        let before_ws = i + 1 == bytes.len() || bytes[i + 1].is_ascii_whitespace();
        match state {
            QuoteState::Free => {
                if ch == b'#' && after_ws {
                    return &line[..i];
                }
                if ch == b'"' && after_ws {
                    state = QuoteState::Double;
                } else if ch == b'\'' && after_ws {
                    state = QuoteState::Single;
                }
            }
            QuoteState::Double => {
                if ch == b'"' && before_ws {
                    state = QuoteState::Free;
                }
            }
            QuoteState::Single => {
                if ch == b'\'' && before_ws {
                    state = QuoteState::Free;
                }
            }
        }
        i += 1;
    }
    line
}

/// Collapse each `;`-delimited block onto one line, replacing the embedded
/// newlines with [`EOL_MARK`]. The opening and closing `;` must each start
/// a line.
pub(crate) fn collapse_semicolon_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_block = false;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str(if in_block { EOL_MARK } else { "\n" });
        }
        out.push_str(line);
        if line.starts_with(';') {
            in_block = !in_block;
        }
    }
    out
}

/// Restore the newlines of a collapsed semicolon-block value.
pub(crate) fn expand_semicolon_block(value: &str) -> String {
    value.replace(EOL_MARK, "\n")
}

/// Compress nmrView-specific `{  }` and `{  ?}` spans to `{}` / `{?}`.
pub(crate) fn compress_nmrview(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() {
                if bytes[j] == b'}' {
                    out.push_str("{}");
                    i = j + 1;
                    continue;
                }
                if bytes[j] == b'?' && j + 1 < bytes.len() && bytes[j + 1] == b'}' {
                    out.push_str("{?}");
                    i = j + 2;
                    continue;
                }
            }
        }
        let Some(ch) = text[i..].chars().next() else {
            break;
        };
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

// ============================================================================
// Quoting
// ============================================================================

/// Whether a value can be emitted bare. Whitespace, quote characters, and a
/// leading `_`, `#` or `;` all force quoting, as does the empty string.
pub(crate) fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"')
        || value.starts_with('_')
        || value.starts_with('#')
        || value.starts_with(';')
}

/// Quote a value minimally: bare if possible, else single or double quotes,
/// else a semicolon-delimited block (for embedded newlines or values mixing
/// both quote characters).
pub(crate) fn quote_value(value: &str) -> String {
    if !needs_quotes(value) {
        return value.to_string();
    }
    if value.contains(['\n', '\x0b', '\x0c']) {
        return semicolons_add(value);
    }
    let has_single = value.contains('\'');
    let has_double = value.contains('"');
    if has_single && has_double {
        semicolons_add(value)
    } else if has_single {
        format!("\"{value}\"")
    } else if has_double {
        format!("'{value}'")
    } else {
        format!("{PREFERRED_QUOTE}{value}{PREFERRED_QUOTE}")
    }
}

/// Wrap a value in a semicolon-delimited block. The closing `;` must start
/// its own line, so a trailing newline is ensured first.
pub(crate) fn semicolons_add(value: &str) -> String {
    if value.ends_with('\n') {
        format!("\n;\n{value};\n")
    } else {
        format!("\n;\n{value}\n;\n")
    }
}
