use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

const PAPER_FIELDS: &str =
    "title,venue,year,citationCount,citations.venue,citations.title,citations.year";

/// Upper bound on a single page body; pages carry every citation of up to a hundred papers.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] ureq::Error),
    #[error("non-success response: HTTP {status} - {body}")]
    Status { status: u16, body: String },
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One authored paper as returned by the bibliography API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paper {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(rename = "citationCount", default)]
    pub citation_count: Option<u32>,
    #[serde(default)]
    pub citations: Option<Vec<Citation>>,
}

/// A work citing one of the authored papers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub venue: Option<String>,
}

impl Paper {
    pub fn citations(&self) -> impl Iterator<Item = &Citation> {
        self.citations.iter().flatten()
    }
}

#[derive(Debug, Deserialize)]
struct PapersPage {
    #[serde(default)]
    data: Option<Vec<Paper>>,
}

/// Paginated, read-only access to an author's papers.
pub trait PaperSource {
    /// Fetch up to `limit` papers of `author_id`, starting at `offset`.
    fn fetch_page(
        &self,
        author_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Paper>, SourceError>;
}

/// The Semantic Scholar Graph API.
pub struct SemanticScholar {
    agent: ureq::Agent,
    base_url: String,
}

impl SemanticScholar {
    pub fn new(base_url: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(10)))
            .timeout_global(Some(Duration::from_secs(60)))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn papers_url(&self, author_id: &str, offset: usize, limit: usize) -> Result<Url, SourceError> {
        let author = utf8_percent_encode(author_id, PATH_SEGMENT_ENCODE_SET).to_string();
        let mut url = Url::parse(&format!("{}/author/{}/papers", self.base_url, author))?;
        url.query_pairs_mut()
            .append_pair("fields", PAPER_FIELDS)
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }
}

impl PaperSource for SemanticScholar {
    fn fetch_page(
        &self,
        author_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Paper>, SourceError> {
        let url = self.papers_url(author_id, offset, limit)?;
        let mut response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", "venuegraph/0.1")
            .call()?;
        let status = response.status();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_page(&body)
    }
}

/// Decode a page body. A missing or null `data` array is an empty page.
fn parse_page(body: &str) -> Result<Vec<Paper>, SourceError> {
    let page: PapersPage = serde_json::from_str(body)?;
    Ok(page.data.unwrap_or_default())
}
