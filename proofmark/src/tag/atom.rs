use core::fmt;

use crate::{DiffError, Result};

/// What an [`Atom`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomKind {
    /// A complete markup tag, such as `<p class="x">` or `</p>`.
    Tag,
    /// A run of text without delimiters.
    Text,
    /// One delimiter character.
    Delimiter,
}

/// A token of raw markup.
///
/// Atoms compare by identifier. For tags, the identifier is the tag name
/// (with its leading `/` for end tags), and the raw attribute text is kept
/// apart as the internal identifiers, compared only when refining a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    kind: AtomKind,
    text: String,
    identifier_end: usize,
}

impl Atom {
    /// A tag atom over `text`, which must start with its only `<`, end with
    /// its only `>`, and hold something in between.
    pub fn tag(text: &str) -> Result<Self> {
        if !is_valid_tag(text) {
            return Err(DiffError::invalid_tree(format!("invalid tag atom {text:?}")));
        }
        let inner = &text[1..text.len() - 1];
        let identifier_end = 1 + inner.find(' ').unwrap_or(inner.len());
        Ok(Self {
            kind: AtomKind::Tag,
            text: text.to_string(),
            identifier_end,
        })
    }

    /// A text atom. Text must not be empty.
    pub fn text(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(DiffError::invalid_tree("empty text atom"));
        }
        Ok(Self {
            kind: AtomKind::Text,
            text: text.to_string(),
            identifier_end: text.len(),
        })
    }

    /// A delimiter atom.
    pub fn delimiter(c: char) -> Self {
        Self {
            kind: AtomKind::Delimiter,
            text: c.to_string(),
            identifier_end: c.len_utf8(),
        }
    }

    /// The kind of atom.
    pub fn kind(&self) -> AtomKind {
        self.kind
    }

    /// The identifier the atom compares by.
    pub fn identifier(&self) -> &str {
        match self.kind {
            AtomKind::Tag => &self.text[1..self.identifier_end],
            AtomKind::Text | AtomKind::Delimiter => &self.text,
        }
    }

    /// Raw attribute text of a tag; empty for everything else.
    pub fn internal_identifiers(&self) -> &str {
        match self.kind {
            AtomKind::Tag => self
                .text
                .get(self.identifier_end + 1..self.text.len() - 1)
                .unwrap_or_default(),
            AtomKind::Text | AtomKind::Delimiter => "",
        }
    }

    /// Whether the atom carries attribute text.
    pub fn has_internal_identifiers(&self) -> bool {
        !self.internal_identifiers().is_empty()
    }

    /// The atom as it appeared in the markup.
    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// Whether the atom matches `other`: same kind and identifier. Carriage
    /// returns and newlines are interchangeable.
    pub fn equals_identifier(&self, other: &Atom) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if self.kind == AtomKind::Delimiter {
            let newline = |s: &str| s == "\r" || s == "\n";
            if newline(self.identifier()) && newline(other.identifier()) {
                return true;
            }
        }
        self.identifier() == other.identifier()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            AtomKind::Tag => "TagAtom",
            AtomKind::Text => "TextAtom",
            AtomKind::Delimiter => "DelimiterAtom",
        };
        write!(f, "{name}({})", self.text)
    }
}

/// Whether `text` is a complete tag.
pub(crate) fn is_valid_tag(text: &str) -> bool {
    text.len() >= 3
        && text.rfind('<') == Some(0)
        && text.find('>') == Some(text.len() - 1)
}

/// Characters that split markup text into atoms.
pub(crate) fn is_atom_delimiter(c: char) -> bool {
    matches!(
        c,
        '/' | '.'
            | '!'
            | ','
            | ';'
            | '?'
            | ' '
            | '\t'
            | '\r'
            | '\n'
            | '['
            | ']'
            | '{'
            | '}'
            | '('
            | ')'
            | '&'
            | '|'
            | '\\'
            | '-'
            | '_'
            | '+'
            | '*'
            | ':'
    )
}
