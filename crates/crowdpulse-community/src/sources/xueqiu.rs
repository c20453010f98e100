use crowdpulse_core::{CanonicalPost, SourceType, Target, XueqiuTargets};
use crowdpulse_fetch::{FetchClient, FetchRequest, RawPayload, SessionToken};

use super::SourceAdapter;
use crate::extract::xueqiu::extract_timeline;
use crate::gate::QualityGate;
use crate::scorer::QualityModel;

const SITE_BASE: &str = "https://xueqiu.com";
const TIMELINE_PATH: &str = "/v4/statuses/public_timeline_by_category.json";
const SESSION_COOKIE: &str = "xq_a_token";
const STATUSES_PER_PAGE: u32 = 20;

/// Xueqiu public timeline, paged per topic category.
///
/// The JSON API only answers clients holding the anonymous `xq_a_token`
/// cookie, so each run first visits the landing page.
#[derive(Debug, Clone)]
pub struct XueqiuAdapter {
    base_url: String,
    targets: XueqiuTargets,
    gate: QualityGate,
}

impl XueqiuAdapter {
    #[must_use]
    pub fn new(targets: XueqiuTargets, gate: QualityGate) -> Self {
        Self {
            base_url: SITE_BASE.to_string(),
            targets,
            gate,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn site_headers() -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), "application/json, text/plain, */*".to_string()),
            ("Accept-Language".to_string(), "zh-CN,zh;q=0.9,en;q=0.8".to_string()),
            ("Referer".to_string(), format!("{SITE_BASE}/")),
            ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl SourceAdapter for XueqiuAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::XueqiuCommunity
    }

    fn enumerate_targets(&self) -> Vec<Target> {
        self.targets.targets()
    }

    fn pages_per_target(&self) -> u32 {
        self.targets.pages
    }

    fn request(&self, target: &Target, page: u32) -> FetchRequest {
        let mut request = FetchRequest::get(
            self.source_type(),
            target.clone(),
            page,
            format!("{}{TIMELINE_PATH}", self.base_url),
        )
        .query("since_id", -1)
        .query("max_id", -1)
        .query("count", STATUSES_PER_PAGE)
        .query("category", &target.id)
        .query("page", page);
        request.headers = Self::site_headers();
        request
    }

    async fn warm_up(&self, fetcher: &FetchClient) -> SessionToken {
        let landing = format!("{}/", self.base_url);
        match fetcher
            .warm_up(&landing, SESSION_COOKIE, &Self::site_headers())
            .await
        {
            Ok(token) => {
                tracing::debug!(
                    source = %self.source_type(),
                    has_token = !token.is_empty(),
                    "session warm-up finished"
                );
                token
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.source_type(),
                    error = %e,
                    "session warm-up failed; continuing without token"
                );
                SessionToken::none()
            }
        }
    }

    fn extract(&self, payload: &RawPayload) -> Vec<CanonicalPost> {
        extract_timeline(payload, &self.base_url)
    }

    fn quality_model(&self) -> QualityModel {
        QualityModel::Audience
    }

    fn gate(&self) -> &QualityGate {
        &self.gate
    }
}
