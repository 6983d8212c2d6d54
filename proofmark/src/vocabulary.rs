//! Static tag classification tables and phrase templates.
//!
//! Everything language- or markup-specific that the differ consults lives in
//! a [`Vocabulary`]. The tables are immutable `'static` data handed to the
//! differ through [`DiffSettings`](crate::DiffSettings), so a localized or
//! extended vocabulary is just another `static`.

/// How a change to an enclosing tag is described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagChangeSemantic {
    /// Structural container: content moved into or out of it.
    Moved,
    /// Inline formatting: a style was added or removed.
    Style,
    /// Anything else: the tag itself was added or removed.
    Unknown,
}

/// Human-readable name of one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPhrase {
    /// Tag name, lowercase.
    pub tag: &'static str,
    /// Capitalized description, such as `"Paragraph"`.
    pub description: &'static str,
    /// Indefinite article used in front of the lowercased description.
    pub article: &'static str,
}

/// Sentence fragments of the change narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrases {
    /// Container tag removed around content.
    pub moved_out_of: &'static str,
    /// Container tag added around content.
    pub moved_to: &'static str,
    /// Formatting tag removed.
    pub style_removed: &'static str,
    /// Formatting tag added.
    pub style_added: &'static str,
    /// Any other tag removed.
    pub removed: &'static str,
    /// Any other tag added.
    pub added: &'static str,
    /// Old value of a content-less element or replaced text.
    pub changed_from: &'static str,
    /// New value of a content-less element.
    pub changed_to: &'static str,
    /// Introduces the first attribute.
    pub with: &'static str,
    /// Introduces the last attribute.
    pub and: &'static str,
    /// Introduces the target of a link.
    pub with_destination: &'static str,
    /// Article for tags missing from the tag table.
    pub default_article: &'static str,
}

/// Tag classification and phrase tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    /// Tags that break the text flow. Their content is kept apart from
    /// neighboring content by separator leaves.
    pub block_tags: &'static [&'static str],
    /// Tags whose addition or removal reads as content moving.
    pub moved_tags: &'static [&'static str],
    /// Tags whose addition or removal reads as a style change.
    pub style_tags: &'static [&'static str],
    /// Tags without content, described as "changed from/to".
    pub no_content_tags: &'static [&'static str],
    /// Tags whose `href` is described as a destination.
    pub link_tags: &'static [&'static str],
    /// Descriptions of known tags.
    pub tags: &'static [TagPhrase],
    /// Readable names of attributes, keyed by attribute name.
    pub attribute_names: &'static [(&'static str, &'static str)],
    /// Sentence fragments.
    pub phrases: Phrases,
}

impl Vocabulary {
    /// Default English vocabulary.
    pub const ENGLISH: Vocabulary = Vocabulary {
        block_tags: &[
            "html", "body", "p", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "div",
            "ul", "ol", "li", "table", "tbody", "thead", "tfoot", "tr", "td", "th", "br", "hr",
            "dl", "dt", "dd", "form", "section", "article", "header", "footer", "nav", "aside",
        ],
        moved_tags: &[
            "html", "body", "p", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "div",
            "ul", "ol", "li", "table", "tbody", "tr", "td", "th", "br", "hr", "code", "dl", "dt",
            "dd", "input", "form", "img", "span", "a",
        ],
        style_tags: &[
            "i", "b", "strong", "em", "font", "big", "del", "tt", "sub", "sup", "strike", "u", "s",
            "small",
        ],
        no_content_tags: &["img"],
        link_tags: &["a"],
        tags: &[
            TagPhrase { tag: "html", description: "Html page", article: "an" },
            TagPhrase { tag: "body", description: "Html body", article: "an" },
            TagPhrase { tag: "p", description: "Paragraph", article: "a" },
            TagPhrase { tag: "blockquote", description: "Quote", article: "a" },
            TagPhrase { tag: "h1", description: "Heading level 1", article: "a" },
            TagPhrase { tag: "h2", description: "Heading level 2", article: "a" },
            TagPhrase { tag: "h3", description: "Heading level 3", article: "a" },
            TagPhrase { tag: "h4", description: "Heading level 4", article: "a" },
            TagPhrase { tag: "h5", description: "Heading level 5", article: "a" },
            TagPhrase { tag: "h6", description: "Heading level 6", article: "a" },
            TagPhrase { tag: "pre", description: "Preformatted block", article: "a" },
            TagPhrase { tag: "div", description: "Division", article: "a" },
            TagPhrase { tag: "ul", description: "Bulleted list", article: "a" },
            TagPhrase { tag: "ol", description: "Numbered list", article: "a" },
            TagPhrase { tag: "li", description: "List item", article: "a" },
            TagPhrase { tag: "table", description: "Table", article: "a" },
            TagPhrase { tag: "tbody", description: "Table body", article: "a" },
            TagPhrase { tag: "thead", description: "Table head", article: "a" },
            TagPhrase { tag: "tfoot", description: "Table foot", article: "a" },
            TagPhrase { tag: "tr", description: "Row", article: "a" },
            TagPhrase { tag: "td", description: "Cell", article: "a" },
            TagPhrase { tag: "th", description: "Table header", article: "a" },
            TagPhrase { tag: "br", description: "Break", article: "a" },
            TagPhrase { tag: "hr", description: "Horizontal rule", article: "a" },
            TagPhrase { tag: "code", description: "Computer code block", article: "a" },
            TagPhrase { tag: "dl", description: "Definition list", article: "a" },
            TagPhrase { tag: "dt", description: "Definition term", article: "a" },
            TagPhrase { tag: "dd", description: "Definition", article: "a" },
            TagPhrase { tag: "input", description: "Input", article: "an" },
            TagPhrase { tag: "form", description: "Form", article: "a" },
            TagPhrase { tag: "img", description: "Image", article: "an" },
            TagPhrase { tag: "span", description: "Span", article: "a" },
            TagPhrase { tag: "a", description: "Link", article: "a" },
            TagPhrase { tag: "i", description: "Italics", article: "an" },
            TagPhrase { tag: "b", description: "Bold", article: "a" },
            TagPhrase { tag: "strong", description: "Strong", article: "a" },
            TagPhrase { tag: "em", description: "Emphasis", article: "an" },
            TagPhrase { tag: "font", description: "Font", article: "a" },
            TagPhrase { tag: "big", description: "Big", article: "a" },
            TagPhrase { tag: "del", description: "Deleted", article: "a" },
            TagPhrase { tag: "tt", description: "Fixed width", article: "a" },
            TagPhrase { tag: "sub", description: "Subscript", article: "a" },
            TagPhrase { tag: "sup", description: "Superscript", article: "a" },
            TagPhrase { tag: "strike", description: "Strikethrough", article: "a" },
            TagPhrase { tag: "s", description: "Strikethrough", article: "a" },
            TagPhrase { tag: "u", description: "Underline", article: "an" },
            TagPhrase { tag: "small", description: "Small", article: "a" },
        ],
        attribute_names: &[("src", "source"), ("width", "width"), ("height", "height")],
        phrases: Phrases {
            moved_out_of: "Moved out of",
            moved_to: "Moved to",
            style_removed: "Style removed",
            style_added: "Style added",
            removed: "Removed",
            added: "Added",
            changed_from: "Changed from",
            changed_to: "Changed to",
            with: "With",
            and: "And",
            with_destination: "With destination",
            default_article: "a",
        },
    };

    /// Whether `tag` breaks the text flow.
    pub fn is_block(&self, tag: &str) -> bool {
        self.block_tags.iter().any(|t| *t == tag)
    }

    /// Whether `tag` flows with the surrounding text.
    pub fn is_inline(&self, tag: &str) -> bool {
        !self.is_block(tag)
    }

    /// How a change to `tag` is described.
    pub fn semantic(&self, tag: &str) -> TagChangeSemantic {
        if self.moved_tags.iter().any(|t| *t == tag) {
            TagChangeSemantic::Moved
        } else if self.style_tags.iter().any(|t| *t == tag) {
            TagChangeSemantic::Style
        } else {
            TagChangeSemantic::Unknown
        }
    }

    /// Whether `tag` never has content of its own.
    pub fn is_no_content(&self, tag: &str) -> bool {
        self.no_content_tags.iter().any(|t| *t == tag)
    }

    /// Whether `tag` links somewhere through its `href`.
    pub fn is_link(&self, tag: &str) -> bool {
        self.link_tags.iter().any(|t| *t == tag)
    }

    /// Description and article of `tag`. Unknown tags are described by their
    /// own name.
    pub fn describe<'a>(&self, tag: &'a str) -> (&'a str, &'static str) {
        match self.tags.iter().find(|phrase| phrase.tag == tag) {
            Some(phrase) => (phrase.description, phrase.article),
            None => (tag, self.phrases.default_article),
        }
    }

    /// Readable name of an attribute.
    pub fn attribute_name<'a>(&self, attribute: &'a str) -> &'a str {
        self.attribute_names
            .iter()
            .find(|(name, _)| *name == attribute)
            .map_or(attribute, |(_, readable)| readable)
    }
}
