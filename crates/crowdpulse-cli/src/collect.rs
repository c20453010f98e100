//! `collect` and `targets` command handlers.
//!
//! Wires `AppConfig` into the fetch client, adapters, cache and pipeline.
//! Per-target failures never surface here; only configuration problems do.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crowdpulse_community::{
    EastmoneyAdapter, FileCache, KeywordLexicon, MemoryCache, Pipeline, PipelineConfig,
    QualityGate, SessionCache, SourceAdapter, XueqiuAdapter,
};
use crowdpulse_core::{AppConfig, LexiconTerms, SourceType, TargetsFile};
use crowdpulse_fetch::{FetchClient, FetchConfig, Pacing};

use crate::output;
use crate::OutputFormat;

const TRIGGER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn default_trigger_time() -> String {
    Utc::now()
        .with_timezone(&crowdpulse_core::source_offset())
        .format(TRIGGER_TIME_FORMAT)
        .to_string()
}

pub(crate) fn fetch_config(config: &AppConfig) -> FetchConfig {
    FetchConfig {
        request_timeout: Duration::from_secs(config.fetch_timeout_secs),
        user_agent: config.user_agent.clone(),
        max_in_flight: config.max_in_flight,
        pacing: Pacing::new(config.pacing_min_ms, config.pacing_max_ms),
        max_retries: config.max_retries,
        retry_backoff_base_ms: config.retry_backoff_base_ms,
    }
}

pub(crate) fn pipeline_config(config: &AppConfig, max_posts: Option<usize>) -> PipelineConfig {
    PipelineConfig {
        max_posts: max_posts.unwrap_or(config.max_posts),
        max_concurrent_targets: config.max_in_flight,
        run_timeout: config.run_timeout_secs.map(Duration::from_secs),
    }
}

fn load_targets_file(config: &AppConfig) -> anyhow::Result<TargetsFile> {
    match &config.targets_path {
        Some(path) => Ok(crowdpulse_core::load_targets(path)?),
        None => Ok(TargetsFile::default()),
    }
}

fn load_lexicon_terms(config: &AppConfig) -> anyhow::Result<LexiconTerms> {
    match &config.lexicon_path {
        Some(path) => Ok(crowdpulse_core::load_lexicon(path)?),
        None => Ok(LexiconTerms::default()),
    }
}

pub(crate) fn build_adapter(
    source: SourceType,
    targets: &TargetsFile,
    config: &AppConfig,
) -> Box<dyn SourceAdapter> {
    match source {
        SourceType::EastmoneyCommunity => Box::new(EastmoneyAdapter::new(
            targets.eastmoney.clone(),
            QualityGate::views_only(config.eastmoney_min_views),
        )),
        SourceType::XueqiuCommunity => Box::new(XueqiuAdapter::new(
            targets.xueqiu.clone(),
            QualityGate::influence(
                config.xueqiu_min_followers,
                config.xueqiu_min_engagement,
                config.xueqiu_min_content_chars,
            ),
        )),
    }
}

/// Run the pipeline once per selected source and print the results.
///
/// # Errors
///
/// Returns an error if the targets or lexicon file is invalid or the HTTP
/// client cannot be built.
pub(crate) async fn run_collect(
    config: &AppConfig,
    sources: &[SourceType],
    trigger_time: &str,
    max_posts: Option<usize>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let targets = load_targets_file(config)?;
    let lexicon = KeywordLexicon::new(load_lexicon_terms(config)?);
    let fetcher = FetchClient::new(&fetch_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build fetch client: {e}"))?;
    let cache: Arc<dyn SessionCache> = match &config.cache_dir {
        Some(dir) => Arc::new(FileCache::new(dir)),
        None => Arc::new(MemoryCache::new()),
    };
    let pipeline = Pipeline::new(
        Arc::new(fetcher),
        cache,
        Arc::new(lexicon),
        pipeline_config(config, max_posts),
    );

    tracing::info!(
        env = %config.env,
        sources = sources.len(),
        trigger_time,
        "starting collect"
    );

    let mut results = Vec::with_capacity(sources.len());
    for &source in sources {
        let adapter = build_adapter(source, &targets, config);
        let result = pipeline.run(adapter.as_ref(), trigger_time).await;
        if result.is_empty() {
            tracing::warn!(source = %source, "no posts collected");
        }
        results.push((source, result));
    }

    tracing::info!(
        requests = pipeline.fetcher().requests_sent(),
        peak_in_flight = pipeline.fetcher().peak_in_flight(),
        "collect finished"
    );

    output::print_results(&results, trigger_time, format)
}

/// Print the targets each selected source would enumerate.
///
/// # Errors
///
/// Returns an error if the targets file is invalid.
pub(crate) fn print_targets(config: &AppConfig, sources: &[SourceType]) -> anyhow::Result<()> {
    let targets = load_targets_file(config)?;
    for &source in sources {
        let adapter = build_adapter(source, &targets, config);
        let enumerated = adapter.enumerate_targets();
        let ids: Vec<&str> = enumerated.iter().map(|t| t.id.as_str()).collect();
        println!(
            "{source}: {} targets x {} pages [{}]",
            ids.len(),
            adapter.pages_per_target(),
            ids.join(", ")
        );
    }
    Ok(())
}
