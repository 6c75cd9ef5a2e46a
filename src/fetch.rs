use std::time::Duration;

use url::Url;

use crate::{error::FetchError, record::Record};

/// Content types we ask for. DOI resolvers honour the CSL-JSON media type; plain JSON APIs
/// ignore it.
const ACCEPT: &str = "application/vnd.citationstyles.csl+json, application/json;q=0.9";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Something that can turn a URL into a [`Record`].
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Record, FetchError>;
}

/// Blocking HTTP(S) fetcher: one GET per call, no caching, no retries.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// `timeout` bounds each whole request; `None` leaves it unbounded.
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build();
        HttpFetcher {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Record, FetchError> {
        let url = parse_url(url)?;
        tracing::debug!(%url, "fetching citation metadata");
        let body: String = self
            .agent
            .get(url.as_str())
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .call()
            .and_then(|mut res| res.body_mut().read_to_string())
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        tracing::trace!(%url, bytes = body.len(), "response received");
        parse_body(&url, &body)
    }
}

/// Tolerates surrounding whitespace, including the line terminator of the input file.
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    Url::parse(trimmed).map_err(|source| FetchError::InvalidUrl {
        url: trimmed.to_string(),
        source,
    })
}

fn parse_body(url: &Url, body: &str) -> Result<Record, FetchError> {
    Record::from_json(body).map_err(|source| FetchError::Parse {
        url: url.to_string(),
        source,
    })
}
