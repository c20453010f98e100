use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// YAML file overriding the built-in target lists.
    pub targets_path: Option<PathBuf>,
    /// YAML file overriding the built-in sentiment lexicon.
    pub lexicon_path: Option<PathBuf>,
    /// Directory for the on-disk result cache; in-memory only when unset.
    pub cache_dir: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Ceiling on concurrent in-flight requests per source.
    pub max_in_flight: usize,
    pub pacing_min_ms: u64,
    pub pacing_max_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_posts: usize,
    /// Optional deadline for one whole pipeline run.
    pub run_timeout_secs: Option<u64>,
    pub eastmoney_min_views: u64,
    pub xueqiu_min_followers: u64,
    pub xueqiu_min_engagement: u64,
    pub xueqiu_min_content_chars: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("targets_path", &self.targets_path)
            .field("lexicon_path", &self.lexicon_path)
            .field("cache_dir", &self.cache_dir)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_in_flight", &self.max_in_flight)
            .field("pacing_min_ms", &self.pacing_min_ms)
            .field("pacing_max_ms", &self.pacing_max_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("max_posts", &self.max_posts)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("eastmoney_min_views", &self.eastmoney_min_views)
            .field("xueqiu_min_followers", &self.xueqiu_min_followers)
            .field("xueqiu_min_engagement", &self.xueqiu_min_engagement)
            .field("xueqiu_min_content_chars", &self.xueqiu_min_content_chars)
            .finish()
    }
}
