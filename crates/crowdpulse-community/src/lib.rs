//! Community-post crawling, sentiment scoring and ranking for Chinese
//! retail-investor forums.
//!
//! A [`Pipeline`] drives one [`SourceAdapter`] per run: targets are fetched
//! through a shared rate-limited client, payloads are extracted into
//! canonical posts, gated, scored against a keyword [`Lexicon`], ranked by
//! quality and cached per `(source, trigger_time)`.

pub mod cache;
pub mod error;
pub(crate) mod extract;
pub mod gate;
pub mod lexicon;
pub mod pipeline;
pub mod rank;
pub mod scorer;
pub mod sources;
pub mod table;
pub mod types;

pub use cache::{CacheKey, FileCache, MemoryCache, SessionCache};
pub use error::CommunityError;
pub use gate::{EngagementWeights, QualityGate};
pub use lexicon::{KeywordLexicon, Lexicon, LexiconHits};
pub use pipeline::{Pipeline, PipelineConfig};
pub use rank::rank;
pub use scorer::{classify, QualityModel, Scorer, SENTIMENT_MARGIN};
pub use sources::{EastmoneyAdapter, SourceAdapter, XueqiuAdapter};
pub use table::{PostRow, PostTable, COLUMNS};
pub use types::ResultSet;
