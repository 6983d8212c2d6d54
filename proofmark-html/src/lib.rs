#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! HTML front end for [`proofmark`].
//!
//! Tokenizes HTML text with `html5gum` and feeds it to proofmark's
//! [`ContentHandler`] event contract, with the usual leniency of a browser:
//! tag names are lowercased, void elements close themselves, stray end tags
//! are ignored and unclosed elements are closed when an enclosing one ends.
//! Script and style content, comments and doctypes are dropped.
//!
//! ```
//! let markup = proofmark_html::diff_html(
//!     "<p>This is a blue book</p>",
//!     "<p>This is a big blue book</p>",
//! )
//! .unwrap();
//! assert!(markup.contains("<ins class=\"diff-html-added\""));
//! ```

mod macros;

use html5gum::{State, Token, Tokenizer};
use proofmark::tag::{TagDiffer, TagMarkupOutput};
use proofmark::{
    AnnotatedDocument, Attributes, ContentHandler, DiffError, DiffSettings, DomTree,
    DomTreeBuilder, HtmlDiffer, MarkupWriter, Vocabulary,
};

use crate::macros::trace;

/// Errors of the HTML front end.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input is not UTF-8.
    #[error("invalid UTF-8 in HTML")]
    InvalidUtf8,

    /// The tokenizer failed.
    #[error("HTML tokenizer error: {0}")]
    Tokenizer(String),

    /// Building or diffing the documents failed.
    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// HTML void elements: they never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Elements whose content is dropped along with them.
fn is_hidden_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

struct OpenElement {
    name: String,
    hidden: bool,
}

/// Tokenize `html` and report it to `handler` as a complete document.
pub fn feed_html<H: ContentHandler + ?Sized>(html: &str, handler: &mut H) -> Result<(), Error> {
    let mut tokenizer = Tokenizer::new(html);
    let mut stack: Vec<OpenElement> = Vec::new();

    handler.start_document()?;
    while let Some(token) = tokenizer.next() {
        let token = token.map_err(|_| Error::Tokenizer("tokenizer error".into()))?;

        match token {
            Token::StartTag(tag) => {
                let name = String::from_utf8_lossy(&tag.name).to_ascii_lowercase();
                let attributes: Attributes = tag
                    .attributes
                    .iter()
                    .map(|(k, v)| {
                        (
                            String::from_utf8_lossy(k).to_ascii_lowercase(),
                            String::from_utf8_lossy(v).into_owned(),
                        )
                    })
                    .collect();
                let hidden = is_hidden_element(&name)
                    || stack.last().is_some_and(|open| open.hidden);

                if tag.self_closing || is_void_element(&name) {
                    if !hidden {
                        handler.start_element(&name, &attributes)?;
                        handler.end_element(&name)?;
                    }
                } else {
                    match name.as_str() {
                        "script" | "style" => tokenizer.set_state(State::ScriptData),
                        "textarea" | "title" => tokenizer.set_state(State::RcData),
                        _ => {}
                    }
                    if !hidden {
                        handler.start_element(&name, &attributes)?;
                    }
                    stack.push(OpenElement { name, hidden });
                }
            }
            Token::EndTag(tag) => {
                let name = String::from_utf8_lossy(&tag.name).to_ascii_lowercase();
                match stack.iter().rposition(|open| open.name == name) {
                    Some(index) => {
                        while stack.len() > index {
                            if let Some(open) = stack.pop() {
                                if !open.hidden {
                                    handler.end_element(&open.name)?;
                                }
                            }
                        }
                    }
                    None => {
                        trace!(name = name.as_str(), "ignoring stray end tag");
                    }
                }
            }
            Token::String(text) => {
                if !stack.last().is_some_and(|open| open.hidden) {
                    handler.characters(&String::from_utf8_lossy(&text))?;
                }
            }
            Token::Doctype(_) | Token::Comment(_) | Token::Error(_) => {}
        }
    }

    while let Some(open) = stack.pop() {
        if !open.hidden {
            handler.end_element(&open.name)?;
        }
    }
    handler.end_document()?;
    Ok(())
}

/// Parse `html` into a document tree classified with `vocabulary`.
pub fn parse_html(html: &str, vocabulary: &'static Vocabulary) -> Result<DomTree, Error> {
    let mut builder = DomTreeBuilder::new(vocabulary);
    feed_html(html, &mut builder)?;
    Ok(builder.finish()?)
}

/// Like [`parse_html`], for raw bytes that must be UTF-8.
pub fn parse_html_bytes(html: &[u8], vocabulary: &'static Vocabulary) -> Result<DomTree, Error> {
    let html = core::str::from_utf8(html).map_err(|_| Error::InvalidUtf8)?;
    parse_html(html, vocabulary)
}

/// Diff two HTML documents with `settings`.
pub fn diff_html_with(
    old: &str,
    new: &str,
    settings: &DiffSettings,
) -> Result<AnnotatedDocument, Error> {
    let old = parse_html(old, settings.vocabulary)?;
    let new = parse_html(new, settings.vocabulary)?;
    Ok(HtmlDiffer::new(settings.clone()).diff(old, new)?)
}

/// Diff two HTML documents, returning the annotated newer one as markup.
pub fn diff_html(old: &str, new: &str) -> Result<String, Error> {
    Ok(diff_html_with(old, new, &DiffSettings::default())?.to_markup()?)
}

/// Diff `left` and `right` against their common `ancestor`, returning the
/// annotated `right` as markup.
pub fn diff_html3(ancestor: &str, left: &str, right: &str) -> Result<String, Error> {
    let settings = DiffSettings::default();
    let ancestor = parse_html(ancestor, settings.vocabulary)?;
    let left = parse_html(left, settings.vocabulary)?;
    let right = parse_html(right, settings.vocabulary)?;
    let document = HtmlDiffer::new(settings).diff3(ancestor, left, right)?;
    Ok(document.to_markup()?)
}

/// Diff the markup of two documents token by token, tags included. The
/// result shows both documents' markup as text, with removed and added
/// tokens highlighted.
pub fn diff_markup(old: &str, new: &str) -> Result<String, Error> {
    let mut writer = MarkupWriter::new();
    TagDiffer::default().diff(old, new, &mut TagMarkupOutput::new(&mut writer))?;
    Ok(writer.into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmark::NodeKind;
    use proofmark_testhelpers::test;

    fn words(tree: &DomTree) -> Vec<String> {
        tree.leaves()
            .iter()
            .filter(|&&id| !matches!(tree.node(id).kind, NodeKind::Separator))
            .map(|&id| tree.node(id).text_content().to_string())
            .collect()
    }

    #[test]
    fn lenient_parsing() {
        let tree = parse_html(
            "<!DOCTYPE html><HTML><head><title>t</title><style>p{}</style></head>\
             <body><P>one<br>two</span><script>x()</script><!-- c --><B>three</P></body></HTML>",
            &Vocabulary::ENGLISH,
        )
        .unwrap();
        assert_eq!(words(&tree), ["one", "two", "three"]);
        let p = tree.child_at(tree.body(), 0).unwrap();
        assert_eq!(tree.node(p).tag_name(), Some("p"));
    }

    #[test]
    fn entities_are_decoded() {
        let tree = parse_html("<p>a&amp;b</p>", &Vocabulary::ENGLISH).unwrap();
        assert_eq!(words(&tree), ["a", "&", "b"]);
    }

    #[test]
    fn bytes_must_be_utf8() {
        assert_eq!(
            parse_html_bytes(&[0xff, 0xfe], &Vocabulary::ENGLISH).unwrap_err(),
            Error::InvalidUtf8
        );
    }
}
