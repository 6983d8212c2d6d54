use indextree::NodeId;

use crate::dom::{BODY, DomNode, DomTree, NodeKind, PRE};
use crate::macros::trace;
use crate::{Attributes, ContentHandler, DiffError, Result, Vocabulary};

/// Characters that end a word. Whitespace only sets flags on the neighboring
/// leaves; every other delimiter becomes a leaf of its own.
pub(crate) fn is_delimiter(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '/' | '.'
                | '!'
                | ','
                | ';'
                | '?'
                | '='
                | '\''
                | '"'
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Building,
    Done,
}

#[derive(Debug, Clone)]
enum Open {
    /// An element of the document.
    Element(NodeId),
    /// A wrapper (`html`, `head`, `body`) or something inside `head`.
    Skipped(String),
}

/// Builds a [`DomTree`] from a stream of [`ContentHandler`] events.
///
/// Text is cut into words at whitespace and punctuation: each word, and each
/// punctuation character, becomes a text leaf. Whitespace is
/// recorded on the neighboring nodes instead, except inside `pre`.
/// Block-level elements are fenced with separator leaves.
#[derive(Debug)]
pub struct DomTreeBuilder {
    vocabulary: &'static Vocabulary,
    tree: DomTree,
    phase: Phase,
    open: Vec<Open>,
    current: NodeId,
    head_depth: usize,
    pre_depth: usize,
    word: String,
    white_pending: bool,
    last_sibling: Option<NodeId>,
}

impl DomTreeBuilder {
    /// A builder classifying tags with `vocabulary`.
    pub fn new(vocabulary: &'static Vocabulary) -> Self {
        let tree = DomTree::new();
        let current = tree.body();
        Self {
            vocabulary,
            tree,
            phase: Phase::Idle,
            open: Vec::new(),
            current,
            head_depth: 0,
            pre_depth: 0,
            word: String::new(),
            white_pending: false,
            last_sibling: None,
        }
    }

    /// The finished tree. Fails unless the document was ended.
    pub fn finish(self) -> Result<DomTree> {
        match self.phase {
            Phase::Done => Ok(self.tree),
            _ => Err(DiffError::invalid_tree("document was not ended")),
        }
    }

    fn ensure_building(&self, event: &str) -> Result<()> {
        match self.phase {
            Phase::Building => Ok(()),
            Phase::Idle => Err(DiffError::invalid_tree(format!(
                "{event} before start of document"
            ))),
            Phase::Done => Err(DiffError::invalid_tree(format!(
                "{event} after end of document"
            ))),
        }
    }

    fn append_leaf(&mut self, node: DomNode) -> Result<NodeId> {
        let id = self.tree.new_node(node);
        self.tree.add_child(self.current, id, None)?;
        self.tree.push_leaf(id);
        Ok(id)
    }

    fn end_word(&mut self) -> Result<()> {
        if self.word.is_empty() {
            return Ok(());
        }
        let mut node = DomNode::text(core::mem::take(&mut self.word));
        node.white_before = self.white_pending;
        self.white_pending = false;
        let id = self.append_leaf(node)?;
        self.last_sibling = Some(id);
        Ok(())
    }

    fn add_separator(&mut self) -> Result<()> {
        let Some(&last) = self.tree.leaves().last() else {
            return Ok(());
        };
        if matches!(self.tree.node(last).kind, NodeKind::Separator) {
            return Ok(());
        }
        self.append_leaf(DomNode::separator())?;
        Ok(())
    }

    fn in_content(&self) -> bool {
        self.head_depth == 0
    }
}

impl ContentHandler for DomTreeBuilder {
    fn start_document(&mut self) -> Result<()> {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Building;
                Ok(())
            }
            _ => Err(DiffError::invalid_tree("document started twice")),
        }
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<()> {
        self.ensure_building("start of element")?;

        let at_top = !self.open.iter().any(|open| matches!(open, Open::Element(_)));
        if self.head_depth > 0 || name == "head" {
            self.head_depth += 1;
            self.open.push(Open::Skipped(name.to_string()));
            return Ok(());
        }
        if at_top && (name == "html" || name == BODY) {
            self.open.push(Open::Skipped(name.to_string()));
            return Ok(());
        }

        self.end_word()?;
        let mut node = DomNode::tag(name, attributes.clone());
        let inline = self.vocabulary.is_inline(name);
        if self.white_pending && inline {
            node.white_before = true;
        }
        self.white_pending = false;
        let id = self.tree.new_node(node);
        self.tree.add_child(self.current, id, None)?;
        self.current = id;
        self.last_sibling = None;
        self.open.push(Open::Element(id));
        if name == PRE {
            self.pre_depth += 1;
        }
        if !inline {
            self.add_separator()?;
        }
        trace!(name, "opened element");
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.ensure_building("character data")?;
        if !self.in_content() {
            return Ok(());
        }
        for c in text.chars() {
            if !is_delimiter(c) {
                self.word.push(c);
                continue;
            }
            self.end_word()?;
            if c.is_whitespace() && self.pre_depth == 0 {
                if let Some(last) = self.last_sibling {
                    self.tree.node_mut(last).white_after = true;
                }
                self.white_pending = true;
            } else {
                let mut node = DomNode::text(c.to_string());
                node.white_before = self.white_pending;
                self.white_pending = false;
                let id = self.append_leaf(node)?;
                self.last_sibling = Some(id);
            }
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        self.ensure_building("end of element")?;
        let open = match self.open.pop() {
            Some(open) => open,
            None => {
                return Err(DiffError::invalid_tree(format!(
                    "end of element {name} without a start"
                )));
            }
        };

        let id = match open {
            Open::Skipped(open_name) => {
                if open_name != name {
                    return Err(DiffError::invalid_tree(format!(
                        "end of element {name} inside {open_name}"
                    )));
                }
                if self.head_depth > 0 {
                    self.head_depth -= 1;
                } else {
                    self.end_word()?;
                }
                return Ok(());
            }
            Open::Element(id) => id,
        };

        let open_name = self.tree.node(id).tag_name().unwrap_or_default().to_string();
        if open_name != name {
            return Err(DiffError::invalid_tree(format!(
                "end of element {name} inside {open_name}"
            )));
        }

        self.end_word()?;
        if name == "img" {
            let attributes = self.tree.node(id).attributes().cloned().unwrap_or_default();
            self.append_leaf(DomNode::image(attributes))?;
        }
        let inline = self.vocabulary.is_inline(name);
        self.last_sibling = inline.then_some(id);
        if !inline {
            self.add_separator()?;
        }
        if name == PRE {
            self.pre_depth = self.pre_depth.saturating_sub(1);
        }

        self.current = self
            .tree
            .parent(id)
            .ok_or_else(|| DiffError::invalid_tree("element lost its parent"))?;
        self.white_pending = false;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.ensure_building("end of document")?;
        self.end_word()?;
        if let Some(open) = self.open.last() {
            let name = match open {
                Open::Element(id) => self.tree.node(*id).tag_name().unwrap_or_default(),
                Open::Skipped(name) => name,
            };
            return Err(DiffError::invalid_tree(format!(
                "element {name} still open at end of document"
            )));
        }
        self.phase = Phase::Done;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmark_testhelpers::test;

    enum Event<'a> {
        Start(&'a str),
        StartWith(&'a str, &'a [(&'a str, &'a str)]),
        Text(&'a str),
        End(&'a str),
    }
    use Event::*;

    fn build(events: &[Event<'_>]) -> Result<DomTree> {
        let mut builder = DomTreeBuilder::new(&Vocabulary::ENGLISH);
        builder.start_document()?;
        for event in events {
            match event {
                Start(name) => builder.start_element(name, &Attributes::new())?,
                StartWith(name, pairs) => {
                    let attributes = pairs
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect();
                    builder.start_element(name, &attributes)?
                }
                Text(text) => builder.characters(text)?,
                End(name) => builder.end_element(name)?,
            }
        }
        builder.end_document()?;
        builder.finish()
    }

    fn leaf_texts(tree: &DomTree) -> Vec<String> {
        tree.leaves()
            .iter()
            .map(|&id| match &tree.node(id).kind {
                NodeKind::Separator => "|".to_string(),
                _ => tree.node(id).text_content().to_string(),
            })
            .collect()
    }

    #[test]
    fn words_delimiters_and_separators() {
        let tree = build(&[
            Start("p"),
            Text("Hello, big world."),
            End("p"),
            Start("p"),
            Text("Again"),
            End("p"),
        ])
        .unwrap();
        assert_eq!(
            leaf_texts(&tree),
            ["Hello", ",", "big", "world", ".", "|", "Again", "|"]
        );
        let comma = tree.node(tree.leaves()[1]);
        assert!(comma.white_after);
        assert!(!comma.white_before);
        assert!(tree.node(tree.leaves()[2]).white_before);
    }

    #[test]
    fn inline_tags_take_the_whitespace_before_them() {
        let tree = build(&[
            Start("p"),
            Text("a "),
            Start("b"),
            Text("bold"),
            End("b"),
            Text(" c"),
            End("p"),
        ])
        .unwrap();
        let p = tree.child_at(tree.body(), 0).unwrap();
        let b = tree.child_at(p, 1).unwrap();
        assert_eq!(tree.node(b).tag_name(), Some("b"));
        assert!(tree.node(b).white_before);
        assert!(tree.node(b).white_after);
        assert!(tree.node(tree.leaves()[0]).white_after);
    }

    #[test]
    fn whitespace_inside_pre_is_kept() {
        let tree = build(&[Start("pre"), Text("a  b"), End("pre")]).unwrap();
        assert_eq!(leaf_texts(&tree), ["a", " ", " ", "b", "|"]);
    }

    #[test]
    fn head_is_dropped_and_body_is_implicit() {
        let tree = build(&[
            Start("html"),
            Start("head"),
            Start("title"),
            Text("ignored"),
            End("title"),
            End("head"),
            Start("body"),
            Start("p"),
            Text("kept"),
            End("p"),
            End("body"),
            End("html"),
        ])
        .unwrap();
        assert_eq!(leaf_texts(&tree), ["kept", "|"]);
        assert_eq!(tree.child_count(tree.body()), 1);

        let bare = build(&[Text("loose "), Start("i"), Text("text"), End("i")]).unwrap();
        assert_eq!(leaf_texts(&bare), ["loose", "text"]);
    }

    #[test]
    fn images_become_leaves_inside_their_tag() {
        let tree = build(&[
            Start("p"),
            StartWith("img", &[("src", "a.png")]),
            End("img"),
            End("p"),
        ])
        .unwrap();
        let image = tree.leaves()[0];
        assert!(matches!(tree.node(image).kind, NodeKind::Image { .. }));
        let img = tree.parent(image).unwrap();
        assert_eq!(tree.node(img).tag_name(), Some("img"));
    }

    #[test]
    fn whitespace_before_an_image_stays_on_its_tag() {
        let mut tree = build(&[
            Start("p"),
            Text(" "),
            StartWith("img", &[("src", "a.png")]),
            End("img"),
            End("p"),
        ])
        .unwrap();
        let image = tree.leaves()[0];
        let img = tree.parent(image).unwrap();
        let p = tree.parent(img).unwrap();
        assert!(tree.node(img).white_before);

        tree.expand_whitespace(tree.body()).unwrap();
        assert!(matches!(
            tree.node(tree.child_at(p, 0).unwrap()).kind,
            NodeKind::WhiteSpace
        ));
        assert_eq!(tree.child_at(p, 1), Some(img));
        // the space goes before the container, not inside it
        assert_eq!(tree.child_count(img), 1);
    }

    #[test]
    fn event_order_violations_are_rejected() {
        let mut builder = DomTreeBuilder::new(&Vocabulary::ENGLISH);
        assert!(matches!(
            builder.start_element("p", &Attributes::new()),
            Err(DiffError::InvalidTree { .. })
        ));
        assert!(matches!(
            build(&[Start("p"), End("div")]),
            Err(DiffError::InvalidTree { .. })
        ));
        assert!(matches!(
            build(&[End("p")]),
            Err(DiffError::InvalidTree { .. })
        ));
        assert!(matches!(
            build(&[Start("p")]),
            Err(DiffError::InvalidTree { .. })
        ));
    }
}
