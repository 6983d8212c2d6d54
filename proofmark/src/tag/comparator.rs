use snakepit::RangeComparator;

use crate::tag::atom::{is_atom_delimiter, is_valid_tag};
use crate::tag::Atom;
use crate::{DiffError, Result};

/// A sequence of atoms cut from some text.
pub trait AtomSplitter {
    /// The atoms, in order.
    fn atoms(&self) -> &[Atom];

    /// The atom at `index`.
    fn atom(&self, index: usize) -> Result<&Atom> {
        let atoms = self.atoms();
        atoms.get(index).ok_or(DiffError::IndexOutOfRange {
            index,
            size: atoms.len(),
        })
    }

    /// The text of the atoms in `start..end`.
    fn substring(&self, start: usize, end: usize) -> Result<String> {
        let atoms = self.atoms();
        if end > atoms.len() {
            return Err(DiffError::IndexOutOfRange {
                index: end,
                size: atoms.len(),
            });
        }
        Ok(atoms
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(Atom::full_text)
            .collect())
    }
}

/// Cuts `text` into atoms. With `tags`, a `<` opening a complete tag starts a
/// tag atom; without, angle brackets are atoms of their own.
fn split(text: &str, tags: bool) -> Result<Vec<Atom>> {
    let mut atoms = Vec::new();
    let mut word = String::new();
    let flush = |word: &mut String, atoms: &mut Vec<Atom>| -> Result<()> {
        if !word.is_empty() {
            atoms.push(Atom::text(word)?);
            word.clear();
        }
        Ok(())
    };

    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        if tags && c == '<' {
            if let Some(len) = text[i..].find('>') {
                let candidate = &text[i..=i + len];
                if is_valid_tag(candidate) {
                    flush(&mut word, &mut atoms)?;
                    atoms.push(Atom::tag(candidate)?);
                    // skip to the closing '>'
                    for _ in candidate[1..].chars() {
                        chars.next();
                    }
                    continue;
                }
            }
        }
        if !tags && (c == '<' || c == '>') {
            flush(&mut word, &mut atoms)?;
            atoms.push(Atom::text(&c.to_string())?);
        } else if is_atom_delimiter(c) {
            flush(&mut word, &mut atoms)?;
            atoms.push(Atom::delimiter(c));
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut atoms)?;
    Ok(atoms)
}

macro_rules! atom_comparator {
    ($name:ident) => {
        impl AtomSplitter for $name {
            fn atoms(&self) -> &[Atom] {
                &self.atoms
            }
        }

        impl RangeComparator for $name {
            fn range_count(&self) -> usize {
                self.atoms.len()
            }

            fn ranges_equal(&self, own: usize, other: &Self, other_index: usize) -> bool {
                match (self.atoms.get(own), other.atoms.get(other_index)) {
                    (Some(a), Some(b)) => a.equals_identifier(b),
                    _ => false,
                }
            }
        }
    };
}

/// Markup cut into tags, words and delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagComparator {
    atoms: Vec<Atom>,
}

impl TagComparator {
    /// Tokenize `markup`.
    pub fn new(markup: &str) -> Result<Self> {
        Ok(Self {
            atoms: split(markup, true)?,
        })
    }
}

atom_comparator!(TagComparator);

/// The text of one tag cut into words and delimiters, with its angle
/// brackets standing alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentComparator {
    atoms: Vec<Atom>,
}

impl ArgumentComparator {
    /// Tokenize the tag text `text`.
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self {
            atoms: split(text, false)?,
        })
    }
}

atom_comparator!(ArgumentComparator);
