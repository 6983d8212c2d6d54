use crate::{Attributes, Modification, ModificationType};

/// Kind-specific payload of a [`DomNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A container element.
    Tag {
        /// Element name.
        name: String,
        /// Element attributes.
        attributes: Attributes,
    },
    /// A word, or a single delimiter character.
    Text(String),
    /// Leaf standing for an `img` element.
    Image {
        /// Attributes of the `img` element.
        attributes: Attributes,
        /// Comparison key: `<img>` followed by the lowercased `src`.
        text: String,
    },
    /// Empty leaf at the boundary of a block element, so that text on either
    /// side of the boundary never reads as one continuous run.
    Separator,
    /// One normalized space, inserted when whitespace is expanded.
    WhiteSpace,
}

/// A node of a [`DomTree`](crate::DomTree).
#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    /// Payload.
    pub kind: NodeKind,
    /// Whitespace preceded the node in the source.
    pub white_before: bool,
    /// Whitespace followed the node in the source.
    pub white_after: bool,
    /// Change state. Only ever set on leaves.
    pub modification: Option<Modification>,
}

impl DomNode {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            white_before: false,
            white_after: false,
            modification: None,
        }
    }

    /// A container element.
    pub fn tag(name: impl Into<String>, attributes: Attributes) -> Self {
        Self::with_kind(NodeKind::Tag {
            name: name.into(),
            attributes,
        })
    }

    /// A text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Text(text.into()))
    }

    /// An image leaf for an `img` element with `attributes`.
    pub fn image(attributes: Attributes) -> Self {
        let src = attributes.get("src").map(String::as_str).unwrap_or_default();
        let text = format!("<img>{}", src.to_lowercase());
        Self::with_kind(NodeKind::Image { attributes, text })
    }

    /// A separator leaf.
    pub fn separator() -> Self {
        Self::with_kind(NodeKind::Separator)
    }

    /// A single space.
    pub fn white_space() -> Self {
        Self::with_kind(NodeKind::WhiteSpace)
    }

    /// Whether the node is a container.
    pub fn is_tag(&self) -> bool {
        matches!(self.kind, NodeKind::Tag { .. })
    }

    /// Element name of a container.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Tag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Attributes of a container or image.
    pub fn attributes(&self) -> Option<&Attributes> {
        match &self.kind {
            NodeKind::Tag { attributes, .. } | NodeKind::Image { attributes, .. } => {
                Some(attributes)
            }
            _ => None,
        }
    }

    /// Text content of a leaf. Containers have none.
    pub fn text_content(&self) -> &str {
        match &self.kind {
            NodeKind::Text(text) => text,
            NodeKind::Image { text, .. } => text,
            NodeKind::WhiteSpace => " ",
            NodeKind::Separator | NodeKind::Tag { .. } => "",
        }
    }

    /// How the node is rendered; [`ModificationType::None`] when untouched.
    pub fn output_type(&self) -> ModificationType {
        self.modification
            .as_ref()
            .map_or(ModificationType::None, |modification| modification.output)
    }

    /// Whether two containers are the same element: same name, same set of
    /// attributes.
    pub fn same_tag(&self, other: &DomNode) -> bool {
        match (&self.kind, &other.kind) {
            (
                NodeKind::Tag { name, attributes },
                NodeKind::Tag {
                    name: other_name,
                    attributes: other_attributes,
                },
            ) => name == other_name && attributes == other_attributes,
            _ => false,
        }
    }

    /// Whether two leaves hold the same content. Newlines compare as spaces,
    /// image sources compare case-insensitively, and separators only equal
    /// separators.
    pub fn same_text(&self, other: &DomNode) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Separator, NodeKind::Separator) => true,
            (NodeKind::Image { text, .. }, NodeKind::Image { text: other, .. }) => {
                text.eq_ignore_ascii_case(other)
            }
            (
                NodeKind::Text(_) | NodeKind::WhiteSpace,
                NodeKind::Text(_) | NodeKind::WhiteSpace,
            ) => {
                let normalize = |c: char| if c == '\n' { ' ' } else { c };
                self.text_content()
                    .chars()
                    .map(normalize)
                    .eq(other.text_content().chars().map(normalize))
            }
            _ => false,
        }
    }
}
