use snakepit::LcsSettings;

use crate::Vocabulary;

/// Settings of the change narrative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTextSettings {
    /// Line budget of a narrative. Advisory: the narrative tracks how many
    /// characters the current line holds but never breaks it.
    pub max_chars_per_line: usize,
}

impl Default for ChangeTextSettings {
    fn default() -> Self {
        Self {
            max_chars_per_line: 55,
        }
    }
}

/// Settings of an [`HtmlDiffer`](crate::HtmlDiffer).
#[derive(Debug, Clone, PartialEq)]
pub struct DiffSettings {
    /// LCS tuning, shared by every comparison the differ runs.
    pub lcs: LcsSettings,

    /// Narrative settings.
    pub change_text: ChangeTextSettings,

    /// Prefix of the ids and link attributes in the rendered markup, as in
    /// `added-diff-3`.
    pub prefix: String,

    /// Render a replaced stretch of text whose old and new versions are
    /// mostly the same characters as a single change, rather than as a
    /// removal followed by an addition.
    pub refine_replacements: bool,

    /// Tag tables and phrases.
    pub vocabulary: &'static Vocabulary,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            lcs: LcsSettings::default(),
            change_text: ChangeTextSettings::default(),
            prefix: "diff".to_string(),
            refine_replacements: true,
            vocabulary: &Vocabulary::ENGLISH,
        }
    }
}
