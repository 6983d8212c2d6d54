//! The event contract between markup parsers, the differ and markup sinks.

use indexmap::IndexMap;

use crate::Result;

/// Ordered attribute map of an element. Names are unique.
pub type Attributes = IndexMap<String, String>;

/// Receiver of a stream of document events.
///
/// A parser drives a [`DomTreeBuilder`](crate::DomTreeBuilder) through this
/// trait, and the differ drives a sink such as [`MarkupWriter`] through it
/// when rendering. Element names are matched case-sensitively; folding case
/// is the parser's job.
pub trait ContentHandler {
    /// The document begins.
    fn start_document(&mut self) -> Result<()>;

    /// An element opens.
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()>;

    /// Character data inside the current element.
    fn characters(&mut self, text: &str) -> Result<()>;

    /// The current element closes.
    fn end_element(&mut self, name: &str) -> Result<()>;

    /// The document ends.
    fn end_document(&mut self) -> Result<()>;
}

/// HTML void elements: written without an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Serializes events back to HTML markup.
#[derive(Debug, Default)]
pub struct MarkupWriter {
    out: String,
}

impl MarkupWriter {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The markup written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consume the writer, returning the markup.
    pub fn into_string(self) -> String {
        self.out
    }
}

impl ContentHandler for MarkupWriter {
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attributes {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out
                .push_str(&html_escape::encode_double_quoted_attribute(value));
            self.out.push('"');
        }
        self.out.push('>');
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.out.push_str(&html_escape::encode_text(text));
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        if !is_void_element(name) {
            self.out.push_str("</");
            self.out.push_str(name);
            self.out.push('>');
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmark_testhelpers::test;

    #[test]
    fn writes_escaped_markup() {
        let mut writer = MarkupWriter::new();
        let mut attributes = Attributes::new();
        attributes.insert("title".into(), "say \"hi\"".into());
        writer.start_element("p", &attributes).unwrap();
        writer.characters("a < b & c").unwrap();
        writer.start_element("br", &Attributes::new()).unwrap();
        writer.end_element("br").unwrap();
        writer.end_element("p").unwrap();
        assert_eq!(
            writer.into_string(),
            "<p title=\"say &quot;hi&quot;\">a &lt; b &amp; c<br></p>"
        );
    }
}
