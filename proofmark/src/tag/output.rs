use crate::tag::TextDiffOutput;
use crate::{Attributes, ContentHandler, Result};

/// Renders an atom-level diff as markup events: removed and added parts are
/// wrapped in `span`s, and newlines become `<br>` followed by a newline.
///
/// Parts are emitted as text, so the markup of the compared documents shows
/// up literally.
#[derive(Debug)]
pub struct TagMarkupOutput<'a, H: ContentHandler + ?Sized> {
    handler: &'a mut H,
    removed_id: u64,
    added_id: u64,
}

impl<'a, H: ContentHandler + ?Sized> TagMarkupOutput<'a, H> {
    /// An output writing to `handler`.
    pub fn new(handler: &'a mut H) -> Self {
        Self {
            handler,
            removed_id: 1,
            added_id: 1,
        }
    }

    fn add_basic_text(&mut self, text: &str) -> Result<()> {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            if !first.is_empty() {
                self.handler.characters(first)?;
            }
        }
        for line in lines {
            self.handler.start_element("br", &Attributes::new())?;
            self.handler.end_element("br")?;
            self.handler.characters("\n")?;
            if !line.is_empty() {
                self.handler.characters(line)?;
            }
        }
        Ok(())
    }

    fn add_wrapped(&mut self, text: &str, class: &str, name: &str, id: u64) -> Result<()> {
        let mut attributes = Attributes::new();
        attributes.insert("class".into(), class.into());
        attributes.insert("id".into(), format!("{name}{id}"));
        attributes.insert("title".into(), format!("#{name}{id}"));
        self.handler.start_element("span", &attributes)?;
        self.add_basic_text(text)?;
        self.handler.end_element("span")
    }
}

impl<H: ContentHandler + ?Sized> TextDiffOutput for TagMarkupOutput<'_, H> {
    fn add_clear_part(&mut self, text: &str) -> Result<()> {
        self.add_basic_text(text)
    }

    fn add_removed_part(&mut self, text: &str) -> Result<()> {
        let id = self.removed_id;
        self.removed_id += 1;
        self.add_wrapped(text, "diff-tag-removed", "removed", id)
    }

    fn add_added_part(&mut self, text: &str) -> Result<()> {
        let id = self.added_id;
        self.added_id += 1;
        self.add_wrapped(text, "diff-tag-added", "added", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkupWriter;
    use crate::tag::TagDiffer;
    use proofmark_testhelpers::test;

    #[test]
    fn parts_are_wrapped_and_numbered() {
        let mut writer = MarkupWriter::new();
        let mut output = TagMarkupOutput::new(&mut writer);
        output.add_clear_part("a\nb").unwrap();
        output.add_removed_part("c").unwrap();
        output.add_added_part("d").unwrap();
        output.add_removed_part("e").unwrap();
        assert_eq!(
            writer.into_string(),
            "a<br>\nb\
             <span class=\"diff-tag-removed\" id=\"removed1\" title=\"#removed1\">c</span>\
             <span class=\"diff-tag-added\" id=\"added1\" title=\"#added1\">d</span>\
             <span class=\"diff-tag-removed\" id=\"removed2\" title=\"#removed2\">e</span>"
        );
    }

    #[test]
    fn markup_is_shown_literally() {
        let mut writer = MarkupWriter::new();
        TagDiffer::default()
            .diff("<p>a</p>", "<p>b</p>", &mut TagMarkupOutput::new(&mut writer))
            .unwrap();
        assert_eq!(
            writer.into_string(),
            "&lt;p&gt;<span class=\"diff-tag-removed\" id=\"removed1\" title=\"#removed1\">a</span>\
             <span class=\"diff-tag-added\" id=\"added1\" title=\"#added1\">b</span>&lt;/p&gt;"
        );
    }
}
