use page::PageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InteractError {
    /// A configured selector failed to parse.
    #[error("{behavior}: {source}")]
    Page {
        behavior: &'static str,
        #[source]
        source: PageError,
    },

    #[error("interactivity is already installed on this page")]
    AlreadyInstalled,

    #[error("invalid options: {0}")]
    Options(#[from] toml::de::Error),

    #[error("failed to serialize options: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, InteractError>;
