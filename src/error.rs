use crate::assets::AssetError;

/// Failures surfaced by configurator operations. None of them are fatal to the
/// running session; each stays local to the operation that raised it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("asset failed to load: {0}")]
    AssetLoad(#[from] AssetError),
    #[error("could not read image '{label}': {reason}")]
    ImageDecode { label: String, reason: String },
    #[error("{0}")]
    PreconditionUnmet(&'static str),
}

impl ConfigError {
    pub const SELECT_PART_FIRST: Self =
        Self::PreconditionUnmet("Please select a part of the shoe first.");

    /// Text shown to the user in the warning line.
    pub fn user_message(&self) -> String {
        match self {
            Self::AssetLoad(_) => "Part of the model could not be loaded.".to_string(),
            Self::ImageDecode { label, .. } => {
                format!("{} could not be read as an image. Try a PNG or JPEG.", label)
            }
            Self::PreconditionUnmet(message) => (*message).to_string(),
        }
    }
}
