use crowdpulse_core::{CanonicalPost, EastmoneyTargets, SourceType, Target};
use crowdpulse_fetch::{FetchRequest, RawPayload};

use super::SourceAdapter;
use crate::extract::eastmoney::extract_list_page;
use crate::gate::QualityGate;
use crate::scorer::QualityModel;

const SITE_BASE: &str = "https://guba.eastmoney.com";
const POSTS_PER_PAGE: usize = 10;

/// Eastmoney Guba per-stock discussion boards. One list page per stock.
#[derive(Debug, Clone)]
pub struct EastmoneyAdapter {
    base_url: String,
    targets: EastmoneyTargets,
    gate: QualityGate,
    posts_per_page: usize,
}

impl EastmoneyAdapter {
    #[must_use]
    pub fn new(targets: EastmoneyTargets, gate: QualityGate) -> Self {
        Self {
            base_url: SITE_BASE.to_string(),
            targets,
            gate,
            posts_per_page: POSTS_PER_PAGE,
        }
    }

    /// Keep at most `n` rows from each list page.
    #[must_use]
    pub fn with_posts_per_page(mut self, n: usize) -> Self {
        self.posts_per_page = n;
        self
    }

    /// Point requests and link resolution at another host (test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait::async_trait]
impl SourceAdapter for EastmoneyAdapter {
    fn source_type(&self) -> SourceType {
        SourceType::EastmoneyCommunity
    }

    fn enumerate_targets(&self) -> Vec<Target> {
        self.targets.targets()
    }

    fn request(&self, target: &Target, page: u32) -> FetchRequest {
        let url = format!("{}/list,{}_{page}.html", self.base_url, target.id);
        FetchRequest::get(self.source_type(), target.clone(), page, url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
            .header("Referer", &format!("{SITE_BASE}/"))
    }

    fn extract(&self, payload: &RawPayload) -> Vec<CanonicalPost> {
        extract_list_page(payload, &self.base_url, self.posts_per_page)
    }

    fn quality_model(&self) -> QualityModel {
        QualityModel::Engagement
    }

    fn gate(&self) -> &QualityGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> EastmoneyAdapter {
        let targets = EastmoneyTargets {
            stocks: vec!["600519".into(), "000858".into(), "300750".into()],
            top_stocks: 2,
        };
        EastmoneyAdapter::new(targets, QualityGate::views_only(100))
    }

    #[test]
    fn enumerates_top_stocks_only() {
        let targets = adapter().enumerate_targets();
        assert_eq!(
            targets,
            vec![Target::instrument("600519"), Target::instrument("000858")]
        );
    }

    #[test]
    fn list_url_embeds_code_and_page() {
        let req = adapter().request(&Target::instrument("600519"), 1);
        assert_eq!(req.url, "https://guba.eastmoney.com/list,600519_1.html");
        assert!(req.query.is_empty());
        assert!(req
            .headers
            .iter()
            .any(|(k, v)| k == "Referer" && v == "https://guba.eastmoney.com/"));
    }

    #[test]
    fn base_url_override_is_used() {
        let req = adapter()
            .with_base_url("http://127.0.0.1:9999/")
            .request(&Target::instrument("000001"), 2);
        assert_eq!(req.url, "http://127.0.0.1:9999/list,000001_2.html");
    }

    #[test]
    fn posts_per_page_limits_extraction() {
        let body: String = (1..=4)
            .map(|i| format!(r#"<a href="/news,600519,{i}.html">帖子{i}</a><em>200</em>"#))
            .collect();
        let payload = RawPayload::from_body(
            SourceType::EastmoneyCommunity,
            Target::instrument("600519"),
            1,
            chrono::DateTime::parse_from_rfc3339("2026-03-02T15:00:00+08:00").unwrap(),
            body,
        );
        assert_eq!(adapter().extract(&payload).len(), 4);
        assert_eq!(adapter().with_posts_per_page(2).extract(&payload).len(), 2);
    }

    #[test]
    fn single_page_per_stock() {
        assert_eq!(adapter().pages_per_target(), 1);
    }
}
