use thiserror::Error;

use crate::scene::EntityId;

#[derive(Debug, Error)]
pub enum Error {
    /// A configured entity is absent from the scene; its wiring is skipped.
    #[error("scene entity `{0}` not found")]
    MissingEntity(EntityId),

    #[error("invalid narrative configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("audio host rejected `{clip}`: {reason}")]
    Audio { clip: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
