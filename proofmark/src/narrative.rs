//! Human-readable descriptions of structural changes.
//!
//! When a leaf keeps its text but ends up under different enclosing tags, the
//! differ describes what happened to those tags ("Moved to a paragraph",
//! "Bold style added") both as HTML, for the `changes` attribute of the
//! rendered wrapper, and as plain text. Every described tag also yields an
//! [`HtmlLayoutChange`] record for programmatic consumers.

use snakepit::RangeDifference;

use crate::ancestor::TagSnapshot;
use crate::{ChangeTextSettings, TagChangeSemantic, Vocabulary};

/// Whether a layout change added or removed a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutChangeType {
    /// The tag now encloses the content.
    TagAdded,
    /// The tag no longer encloses the content.
    TagRemoved,
}

/// A tag added or removed around some content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HtmlLayoutChange {
    /// Added or removed.
    pub change_type: LayoutChangeType,
    /// The opening tag, with its attributes, such as `<a href="x">`.
    pub opening_tag: String,
    /// The closing tag, such as `</a>`. Empty for content-less tags.
    pub ending_tag: String,
}

/// Narrative text built in two renditions at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeText {
    html: String,
    plain: String,
    chars_this_line: usize,
    max_chars_per_line: usize,
}

impl ChangeText {
    /// Empty text with the line budget of `settings`.
    pub fn new(settings: &ChangeTextSettings) -> Self {
        Self {
            html: String::new(),
            plain: String::new(),
            chars_this_line: 0,
            max_chars_per_line: settings.max_chars_per_line,
        }
    }

    /// Append text, escaped in the HTML rendition. Newlines are dropped.
    pub fn add_text(&mut self, text: &str) {
        let text = text.replace('\n', "");
        self.html
            .push_str(&html_escape::encode_quoted_attribute(&text));
        self.plain.push_str(&text);
        self.chars_this_line += text.chars().count();
    }

    /// Start a new sentence in the plain rendition. The HTML rendition
    /// separates sentences with list items instead.
    fn break_sentence(&mut self) {
        if !self.plain.is_empty() && !self.plain.ends_with(' ') {
            self.plain.push(' ');
            self.chars_this_line += 1;
        }
    }

    /// Append markup to the HTML rendition only.
    pub fn add_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    /// The HTML rendition.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The plain-text rendition.
    pub fn plain(&self) -> &str {
        &self.plain
    }

    /// Whether the current line has gone past the line budget. The budget is
    /// advisory: lines are never broken.
    pub fn line_exceeded(&self) -> bool {
        self.chars_this_line > self.max_chars_per_line
    }

    /// Whether nothing was written yet.
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Builds the narrative for the differences between two ancestor chains.
#[derive(Debug, Clone, Copy)]
pub struct ChangeTextGenerator<'a> {
    vocabulary: &'static Vocabulary,
    settings: &'a ChangeTextSettings,
}

impl<'a> ChangeTextGenerator<'a> {
    /// A generator phrasing with `vocabulary`.
    pub fn new(vocabulary: &'static Vocabulary, settings: &'a ChangeTextSettings) -> Self {
        Self {
            vocabulary,
            settings,
        }
    }

    /// Describe `differences` between the `old` chain (their left side) and
    /// the `new` chain (their right side).
    ///
    /// Several differences become a bulleted list, and so do differences
    /// touching more than one tag.
    pub fn generate(
        &self,
        differences: &[RangeDifference],
        old: &[TagSnapshot],
        new: &[TagSnapshot],
    ) -> (ChangeText, Vec<HtmlLayoutChange>) {
        let mut text = ChangeText::new(self.settings);
        let mut layout = Vec::new();

        let root_list = differences.len() > 1;
        if root_list {
            text.add_html("<ul class='changelist'>");
        }
        for difference in differences {
            if root_list {
                text.add_html("<li>");
            }
            let list = difference.left_len() + difference.right_len() > 1;
            if list {
                text.add_html("<ul class='changelist'>");
            }
            let removed = old.get(difference.left()).unwrap_or_default();
            let added = new.get(difference.right()).unwrap_or_default();
            for tag in removed {
                if list {
                    text.add_html("<li>");
                }
                text.break_sentence();
                layout.push(self.describe(&mut text, tag, LayoutChangeType::TagRemoved));
                if list {
                    text.add_html("</li>");
                }
            }
            for tag in added {
                if list {
                    text.add_html("<li>");
                }
                text.break_sentence();
                layout.push(self.describe(&mut text, tag, LayoutChangeType::TagAdded));
                if list {
                    text.add_html("</li>");
                }
            }
            if list {
                text.add_html("</ul>");
            }
            if root_list {
                text.add_html("</li>");
            }
        }
        if root_list {
            text.add_html("</ul>");
        }
        (text, layout)
    }

    /// Narrative of a replaced stretch of text.
    pub fn changed_from(&self, old: &str) -> ChangeText {
        let mut text = ChangeText::new(self.settings);
        text.add_text(self.vocabulary.phrases.changed_from);
        text.add_text(" ");
        text.add_html("<b>");
        text.add_text(old);
        text.add_html("</b>");
        text.add_text(".");
        text
    }

    fn describe(
        &self,
        text: &mut ChangeText,
        tag: &TagSnapshot,
        change: LayoutChangeType,
    ) -> HtmlLayoutChange {
        let vocabulary = self.vocabulary;
        let phrases = &vocabulary.phrases;
        let (description, article) = vocabulary.describe(&tag.name);
        let added = change == LayoutChangeType::TagAdded;

        let no_content = vocabulary.is_no_content(&tag.name);
        let semantic = vocabulary.semantic(&tag.name);
        if no_content || semantic == TagChangeSemantic::Moved {
            let lead = match (no_content, added) {
                (true, false) => phrases.changed_from,
                (true, true) => phrases.changed_to,
                (false, false) => phrases.moved_out_of,
                (false, true) => phrases.moved_to,
            };
            let lead = if no_content { lead.to_lowercase() } else { lead.to_string() };
            text.add_text(&format!("{lead} {article} "));
            text.add_html("<b>");
            text.add_text(&description.to_lowercase());
            text.add_html("</b>");
        } else {
            let verb = match (semantic, added) {
                (TagChangeSemantic::Style, false) => phrases.style_removed,
                (TagChangeSemantic::Style, true) => phrases.style_added,
                (_, false) => phrases.removed,
                (_, true) => phrases.added,
            };
            text.add_html("<b>");
            text.add_text(description);
            text.add_html("</b>");
            text.add_text(&format!(" {}", verb.to_lowercase()));
        }
        self.describe_attributes(text, tag);
        text.add_text(".");

        HtmlLayoutChange {
            change_type: change,
            opening_tag: opening_tag(tag),
            ending_tag: if no_content {
                String::new()
            } else {
                format!("</{}>", tag.name)
            },
        }
    }

    fn describe_attributes(&self, text: &mut ChangeText, tag: &TagSnapshot) {
        let phrases = &self.vocabulary.phrases;
        let mut attributes: Vec<(&str, &str)> = tag
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        if self.vocabulary.is_link(&tag.name) {
            if let Some(position) = attributes.iter().position(|(name, _)| *name == "href") {
                let (_, href) = attributes.remove(position);
                text.add_text(&format!(
                    " {} {href}",
                    phrases.with_destination.to_lowercase()
                ));
            }
        }

        let count = attributes.len();
        for (i, (name, value)) in attributes.into_iter().enumerate() {
            let name = self.vocabulary.attribute_name(name);
            if i == 0 {
                text.add_text(&format!(" {} {name} {value}", phrases.with.to_lowercase()));
            } else if i + 1 == count {
                text.add_text(&format!(" {} {name} {value}", phrases.and.to_lowercase()));
            } else {
                text.add_text(&format!(", {name} {value}"));
            }
        }
    }
}

fn opening_tag(tag: &TagSnapshot) -> String {
    let mut out = format!("<{}", tag.name);
    for (name, value) in &tag.attributes {
        out.push_str(&format!(
            " {name}=\"{}\"",
            html_escape::encode_double_quoted_attribute(value)
        ));
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attributes;
    use proofmark_testhelpers::test;
    use snakepit::DifferenceKind;

    fn tag(name: &str, pairs: &[(&str, &str)]) -> TagSnapshot {
        TagSnapshot {
            name: name.to_string(),
            attributes: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Attributes>(),
        }
    }

    fn generate(
        differences: &[RangeDifference],
        old: &[TagSnapshot],
        new: &[TagSnapshot],
    ) -> (ChangeText, Vec<HtmlLayoutChange>) {
        let settings = ChangeTextSettings::default();
        ChangeTextGenerator::new(&Vocabulary::ENGLISH, &settings).generate(differences, old, new)
    }

    #[test]
    fn separate_differences_are_separate_sentences() {
        let old = [tag("body", &[])];
        let new = [tag("body", &[]), tag("b", &[]), tag("i", &[])];
        let differences = [
            RangeDifference::new(DifferenceKind::Change, 1, 0, 1, 1),
            RangeDifference::new(DifferenceKind::Change, 1, 0, 2, 1),
        ];
        let (text, layout) = generate(&differences, &old, &new);
        assert_eq!(text.plain(), "Bold style added. Italics style added.");
        assert!(text.html().starts_with("<ul class='changelist'><li>"));
        assert_eq!(layout.len(), 2);
    }

    #[test]
    fn container_swap_reads_as_a_move() {
        let old = [tag("body", &[]), tag("div", &[])];
        let new = [tag("body", &[]), tag("span", &[])];
        let difference = RangeDifference::new(DifferenceKind::Change, 1, 1, 1, 1);
        let (text, layout) = generate(&[difference], &old, &new);
        assert_eq!(
            text.html(),
            "<ul class='changelist'><li>Moved out of a <b>division</b>.</li><li>Moved to a <b>span</b>.</li></ul>"
        );
        assert_eq!(text.plain(), "Moved out of a division. Moved to a span.");
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].change_type, LayoutChangeType::TagRemoved);
        assert_eq!(layout[0].opening_tag, "<div>");
        assert_eq!(layout[1].ending_tag, "</span>");
    }

    #[test]
    fn style_tags_with_attributes() {
        let new = [tag("body", &[]), tag("font", &[("color", "red"), ("size", "2"), ("face", "x")])];
        let difference = RangeDifference::new(DifferenceKind::Change, 1, 0, 1, 1);
        let (text, layout) = generate(&[difference], &new[..1], &new);
        assert_eq!(
            text.plain(),
            "Font style added with color red, size 2 and face x."
        );
        assert_eq!(layout[0].opening_tag, "<font color=\"red\" size=\"2\" face=\"x\">");
    }

    #[test]
    fn links_lead_with_their_destination() {
        let old = [tag("body", &[])];
        let new = [tag("body", &[]), tag("a", &[("href", "x.html"), ("title", "t")])];
        let difference = RangeDifference::new(DifferenceKind::Change, 1, 0, 1, 1);
        let (text, _) = generate(&[difference], &old, &new);
        assert_eq!(
            text.plain(),
            "Moved to a link with destination x.html with title t."
        );
    }

    #[test]
    fn images_are_changed_to() {
        let old = [tag("body", &[])];
        let new = [tag("body", &[]), tag("img", &[("src", "a.png")])];
        let difference = RangeDifference::new(DifferenceKind::Change, 1, 0, 1, 1);
        let (text, layout) = generate(&[difference], &old, &new);
        assert_eq!(text.plain(), "changed to an image with source a.png.");
        assert_eq!(layout[0].ending_tag, "");
    }

    #[test]
    fn replaced_text_is_escaped() {
        let settings = ChangeTextSettings::default();
        let text = ChangeTextGenerator::new(&Vocabulary::ENGLISH, &settings).changed_from("a<b");
        assert_eq!(text.html(), "Changed from <b>a&lt;b</b>.");
        assert_eq!(text.plain(), "Changed from a<b.");
        assert!(!text.line_exceeded());
    }
}
