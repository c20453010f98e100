//! Per-site source adapters.
//!
//! An adapter knows how to enumerate targets, shape requests and parse
//! payloads for one community site. Fetching itself goes through the shared
//! [`FetchClient`] so every adapter obeys the same concurrency ceiling.

mod eastmoney;
mod xueqiu;

pub use eastmoney::EastmoneyAdapter;
pub use xueqiu::XueqiuAdapter;

use async_trait::async_trait;
use crowdpulse_core::{CanonicalPost, SourceType, Target};
use crowdpulse_fetch::{FetchClient, FetchError, FetchRequest, RawPayload, SessionToken};

use crate::gate::QualityGate;
use crate::scorer::QualityModel;

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// Targets for one run, in fetch order.
    fn enumerate_targets(&self) -> Vec<Target>;

    /// Pages fetched per target, starting at 1. Paging stops early on an
    /// empty page or a failed fetch.
    fn pages_per_target(&self) -> u32 {
        1
    }

    fn request(&self, target: &Target, page: u32) -> FetchRequest;

    /// Acquire whatever session state the site requires. Failure is logged
    /// and yields an empty token; it never aborts the run.
    async fn warm_up(&self, _fetcher: &FetchClient) -> SessionToken {
        SessionToken::none()
    }

    /// Fetch one target/page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the request fails or the site answers
    /// with a non-success status.
    async fn fetch_raw(
        &self,
        fetcher: &FetchClient,
        session: &SessionToken,
        target: &Target,
        page: u32,
    ) -> Result<RawPayload, FetchError> {
        fetcher.fetch(&self.request(target, page), session).await
    }

    fn extract(&self, payload: &RawPayload) -> Vec<CanonicalPost>;

    fn quality_model(&self) -> QualityModel;

    fn gate(&self) -> &QualityGate;
}
