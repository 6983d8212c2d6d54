use core::fmt;

use crate::HtmlLayoutChange;

/// What happened to a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModificationType {
    /// Same content, different enclosing tags.
    Changed,
    /// Present in the old document only.
    Removed,
    /// Present in the new document only.
    Added,
    /// Changed differently on both sides of a three-way diff.
    Conflict,
    /// Untouched.
    #[default]
    None,
}

impl fmt::Display for ModificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModificationType::Changed => "changed",
            ModificationType::Removed => "removed",
            ModificationType::Added => "added",
            ModificationType::Conflict => "conflict",
            ModificationType::None => "none",
        })
    }
}

/// Reference to a modification run from a neighboring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModificationLink {
    /// How the target run is rendered.
    pub output: ModificationType,
    /// Id of the target run.
    pub id: u64,
}

impl ModificationLink {
    /// The anchor name of the run, as used by `id`, `changeId`, `previous` and
    /// `next` attributes.
    pub fn anchor(&self, prefix: &str) -> String {
        format!("{}-{}-{}", self.output, prefix, self.id)
    }
}

/// Change state of one leaf.
///
/// Leaves sharing a `kind` and an `id` form a run: a single logical change,
/// rendered as one wrapper element. Exactly one leaf of a run has
/// `first_of_id` set.
#[derive(Debug, Clone, PartialEq)]
pub struct Modification {
    /// What happened to the leaf.
    pub kind: ModificationType,
    /// How the change is rendered. Differs from `kind` for conflicts.
    pub output: ModificationType,
    /// Run id, counted separately per kind.
    pub id: u64,
    /// Whether this leaf opens its run.
    pub first_of_id: bool,
    /// HTML narrative of a [`ModificationType::Changed`] run.
    pub changes: Option<String>,
    /// Plain-text narrative of a [`ModificationType::Changed`] run.
    pub summary: Option<String>,
    /// Tags added or removed around the leaf.
    pub layout_changes: Vec<HtmlLayoutChange>,
    /// The run marked just before this one.
    pub previous: Option<ModificationLink>,
    /// The run marked just after this one.
    pub next: Option<ModificationLink>,
    /// Position of the run in the marking history.
    pub(crate) sequence: usize,
}

impl Modification {
    pub(crate) fn new(kind: ModificationType, output: ModificationType, id: u64, sequence: usize) -> Self {
        Self {
            kind,
            output,
            id,
            first_of_id: false,
            changes: None,
            summary: None,
            layout_changes: Vec::new(),
            previous: None,
            next: None,
            sequence,
        }
    }

    /// Link to this modification's run.
    pub fn link(&self) -> ModificationLink {
        ModificationLink {
            output: self.output,
            id: self.id,
        }
    }
}
