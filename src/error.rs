use thiserror::Error;

/// Why a single field could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The key (or a nested key, given as a path) is absent or `null`.
    #[error("missing field `{0}`")]
    Missing(String),
    #[error("field `{field}` holds {found}, which cannot be rendered as text")]
    NotText { field: String, found: &'static str },
}

impl FieldError {
    pub fn missing(path: impl Into<String>) -> Self {
        FieldError::Missing(path.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// First author's family name or publication year is unavailable.
    #[error("cannot build citation label: {0}")]
    Label(#[source] FieldError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("response from {url} is not a valid JSON object: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
