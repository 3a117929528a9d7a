use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("failed to parse markup: {0}")]
    Html(String),

    #[error("invalid selector `{selector}`: {source}")]
    Selector {
        selector: String,
        #[source]
        source: dom::SelectorError,
    },
}

pub type Result<T> = std::result::Result<T, PageError>;
