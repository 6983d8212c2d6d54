//! Rendering of an annotated tree as markup events.

use indextree::{NodeEdge, NodeId};

use crate::dom::BODY;
use crate::{Attributes, ContentHandler, DomTree, Modification, ModificationType, NodeKind, Result};

/// The wrapper element and class of a rendered run.
fn wrapper(output: ModificationType) -> Option<(&'static str, &'static str)> {
    match output {
        ModificationType::Added => Some(("ins", "diff-html-added")),
        ModificationType::Removed => Some(("del", "diff-html-removed")),
        ModificationType::Changed => Some(("span", "diff-html-changed")),
        ModificationType::Conflict => Some(("span", "diff-html-conflict")),
        ModificationType::None => None,
    }
}

struct OpenWrapper {
    element: &'static str,
    output: ModificationType,
    changes: Option<String>,
}

/// Walks a tree and emits its content, wrapping every modification run in
/// one `ins`, `del` or `span` element.
pub(crate) struct HtmlRenderer<'a, H: ContentHandler + ?Sized> {
    tree: &'a DomTree,
    prefix: &'a str,
    handler: &'a mut H,
    open: Option<OpenWrapper>,
}

impl<'a, H: ContentHandler + ?Sized> HtmlRenderer<'a, H> {
    pub(crate) fn new(tree: &'a DomTree, prefix: &'a str, handler: &'a mut H) -> Self {
        Self {
            tree,
            prefix,
            handler,
            open: None,
        }
    }

    /// Emit the body's content.
    pub(crate) fn render(mut self) -> Result<()> {
        let body = self.tree.body();
        let edges: Vec<NodeEdge> = self.tree.traverse(body).collect();
        for edge in edges {
            match edge {
                NodeEdge::Start(id) => self.enter(id)?,
                NodeEdge::End(id) => self.leave(id)?,
            }
        }
        self.close()
    }

    /// Tags emitted as elements, and so closing any open wrapper. An `img`
    /// container is rendered through its image leaf instead, so the image
    /// joins the run around it.
    fn is_rendered_tag(&self, id: NodeId) -> Option<(&'a str, &'a Attributes)> {
        let tree = self.tree;
        match &tree.node(id).kind {
            NodeKind::Tag { name, attributes }
                if id != tree.body() && name != BODY && name != "img" =>
            {
                Some((name.as_str(), attributes))
            }
            _ => None,
        }
    }

    fn enter(&mut self, id: NodeId) -> Result<()> {
        let tree = self.tree;
        let node = tree.node(id);
        match &node.kind {
            NodeKind::Tag { .. } => {
                if let Some((name, attributes)) = self.is_rendered_tag(id) {
                    self.close()?;
                    self.handler.start_element(name, attributes)?;
                }
            }
            NodeKind::Separator => {}
            NodeKind::Text(_) | NodeKind::WhiteSpace => {
                self.wrap(node.modification.as_ref())?;
                self.handler.characters(node.text_content())?;
            }
            NodeKind::Image { attributes, .. } => {
                self.wrap(node.modification.as_ref())?;
                let mut attributes = attributes.clone();
                match node.modification.as_ref().map(|m| m.kind) {
                    Some(ModificationType::Removed) => {
                        attributes.insert("changeType".into(), "diff-removed-image".into());
                    }
                    Some(ModificationType::Added) => {
                        attributes.insert("changeType".into(), "diff-added-image".into());
                    }
                    _ => {}
                }
                self.handler.start_element("img", &attributes)?;
                self.handler.end_element("img")?;
            }
        }
        Ok(())
    }

    fn leave(&mut self, id: NodeId) -> Result<()> {
        if let Some((name, _)) = self.is_rendered_tag(id) {
            self.close()?;
            self.handler.end_element(name)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(open) = self.open.take() {
            self.handler.end_element(open.element)?;
        }
        Ok(())
    }

    /// Make sure the right wrapper is open for a leaf with `modification`.
    fn wrap(&mut self, modification: Option<&Modification>) -> Result<()> {
        let Some(modification) = modification else {
            return self.close();
        };
        let Some((element, class)) = wrapper(modification.output) else {
            return self.close();
        };

        if let Some(open) = &self.open {
            let same_run = open.output == modification.output
                && !modification.first_of_id
                && (modification.output != ModificationType::Changed
                    || open.changes == modification.changes);
            if same_run {
                return Ok(());
            }
            self.close()?;
        }

        let prefix = self.prefix;
        let anchor = modification.link().anchor(prefix);
        let mut attributes = Attributes::new();
        attributes.insert("class".into(), class.into());
        if modification.first_of_id {
            attributes.insert("id".into(), anchor.clone());
        }
        if modification.output == ModificationType::Changed {
            if let Some(changes) = &modification.changes {
                attributes.insert("changes".into(), changes.clone());
            }
            if let Some(summary) = &modification.summary {
                attributes.insert("title".into(), summary.clone());
            }
        }
        attributes.insert(
            "previous".into(),
            modification
                .previous
                .map_or_else(|| format!("first-{prefix}"), |link| link.anchor(prefix)),
        );
        attributes.insert("changeId".into(), anchor);
        attributes.insert(
            "next".into(),
            modification
                .next
                .map_or_else(|| format!("last-{prefix}"), |link| link.anchor(prefix)),
        );
        self.handler.start_element(element, &attributes)?;
        self.open = Some(OpenWrapper {
            element,
            output: modification.output,
            changes: modification.changes.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Attributes, ContentHandler, DomTree, DomTreeBuilder, HtmlDiffer, Vocabulary};
    use proofmark_testhelpers::test;

    fn paragraph(before: &str, image: Option<&str>, after: &str) -> DomTree {
        let mut builder = DomTreeBuilder::new(&Vocabulary::ENGLISH);
        builder.start_document().unwrap();
        builder.start_element("p", &Attributes::new()).unwrap();
        builder.characters(before).unwrap();
        if let Some(src) = image {
            let mut attributes = Attributes::new();
            attributes.insert("src".into(), src.into());
            builder.start_element("img", &attributes).unwrap();
            builder.end_element("img").unwrap();
        }
        builder.characters(after).unwrap();
        builder.end_element("p").unwrap();
        builder.end_document().unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn an_added_image_shares_the_wrapper_of_its_run() {
        let document = HtmlDiffer::default()
            .diff(
                paragraph("one ", None, "three"),
                paragraph("one ", Some("a.png"), "two three"),
            )
            .unwrap();
        let markup = document.to_markup().unwrap();
        assert_eq!(markup.matches("<ins").count(), 1);
        assert!(markup.contains(
            "><img src=\"a.png\" changeType=\"diff-added-image\">two </ins>three</p>"
        ));
    }

    #[test]
    fn element_boundaries_close_the_wrapper() {
        let document = HtmlDiffer::default()
            .diff(
                paragraph("one", None, ""),
                paragraph("one two", None, ""),
            )
            .unwrap();
        let markup = document.to_markup().unwrap();
        assert!(markup.ends_with("two</ins></p>"));
    }
}
