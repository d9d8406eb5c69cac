//! Structured error types for the STAR engine and the tag-dictionary layer.
//!
//! All failures are raised at the point of detection; there is no
//! print-and-return-sentinel path anywhere in this crate.

use thiserror::Error;

/// Errors produced while parsing STAR text, building tag tables, or
/// resolving tag-dictionary keys.
#[derive(Debug, Error)]
pub enum StarError {
    /// The tokenizer could not classify the text at the given byte offset
    /// as any expected grammar production, or found mismatched saveframe
    /// delimiters.
    #[error("STAR parse error at offset {pos}: {message}\n{context}")]
    Parse {
        pos: usize,
        message: String,
        /// Surrounding text, `[before] <<here>> [after]`.
        context: String,
    },

    /// A tag table broke the equal-column-length rule, or a looped table's
    /// token count was not a multiple of its column count.
    #[error("tag table '{table}': {message}")]
    Cardinality { table: String, message: String },

    /// A schema key that no dictionary version of the category defines.
    /// This signals a programming error in a schema table, not a data
    /// problem.
    #[error("unknown key '{key}' in tag category '{category}'")]
    UnknownKey { category: String, key: String },

    /// A required identifying field was not supplied, or a required list
    /// contained a missing entry.
    #[error("missing required field: {field}")]
    MissingValue { field: String },

    /// A tag value could not be coerced to the requested type.
    #[error("tag '{tag}': cannot interpret value '{value}' as {wanted}")]
    Coerce {
        tag: String,
        value: String,
        wanted: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StarError {
    /// Build a parse error carrying up to 70 characters of context on each
    /// side of the offending position.
    pub(crate) fn parse_at(text: &str, pos: usize, message: impl Into<String>) -> Self {
        StarError::Parse {
            pos,
            message: message.into(),
            context: snippet(text, pos),
        }
    }

    pub(crate) fn cardinality(table: impl Into<String>, message: impl Into<String>) -> Self {
        StarError::Cardinality {
            table: table.into(),
            message: message.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        StarError::MissingValue {
            field: field.into(),
        }
    }
}

/// Extract `[before] <<here>> [after]` context around a byte offset,
/// clamped to char boundaries.
fn snippet(text: &str, pos: usize) -> String {
    let pos = pos.min(text.len());
    let pos = floor_char_boundary(text, pos);
    let start = text[..pos]
        .char_indices()
        .rev()
        .nth(69)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end = text[pos..]
        .char_indices()
        .nth(70)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len());
    format!("[{}] <<here>> [{}]", &text[start..pos], &text[pos..end])
}

fn floor_char_boundary(text: &str, mut pos: usize) -> usize {
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_clamped() {
        let s = snippet("abc", 1);
        assert_eq!(s, "[a] <<here>> [bc]");
        let s = snippet("abc", 10);
        assert_eq!(s, "[abc] <<here>> []");
    }

    #[test]
    fn parse_error_formats_position() {
        let err = StarError::parse_at("hello world", 6, "unexpected token");
        let msg = err.to_string();
        assert!(msg.contains("offset 6"));
        assert!(msg.contains("unexpected token"));
        assert!(msg.contains("<<here>> [world]"));
    }
}
