/// Errors raised by the differencer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The settings ask for an engine or mode that is not implemented.
    #[error("unsupported setting: {setting}")]
    UnsupportedSetting {
        /// Name of the offending setting.
        setting: &'static str,
    },
}
