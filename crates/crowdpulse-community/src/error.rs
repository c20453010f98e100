use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("cache I/O error at {path}: {source}")]
    CacheIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache entry at {path} is not valid JSON: {source}")]
    CacheFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache entry at {path} belongs to a different key")]
    CacheKeyMismatch { path: String },
}
