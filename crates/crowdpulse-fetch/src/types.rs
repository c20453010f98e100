use chrono::{DateTime, FixedOffset};
use crowdpulse_core::{SourceType, Target};

/// One HTTP GET a source adapter wants performed for a target/page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source: SourceType,
    pub target: Target,
    pub page: u32,
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Source-specific request profile (`Accept`, `Referer`, ...).
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    #[must_use]
    pub fn get(source: SourceType, target: Target, page: u32, url: impl Into<String>) -> Self {
        Self {
            source,
            target,
            page,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

/// A fetched body plus the metadata extraction needs. Consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub source: SourceType,
    pub target: Target,
    pub page: u32,
    /// When the response was received, in the source's local offset.
    pub fetched_at: DateTime<FixedOffset>,
    pub status: u16,
    pub body: String,
}

impl RawPayload {
    /// Payload built from an in-memory body, stamped with `fetched_at`.
    #[must_use]
    pub fn from_body(
        source: SourceType,
        target: Target,
        page: u32,
        fetched_at: DateTime<FixedOffset>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            page,
            fetched_at,
            status: 200,
            body: body.into(),
        }
    }
}
