//! End-to-end runs of the real source adapters against local `wiremock`
//! servers standing in for the community sites.

use std::sync::Arc;
use std::time::Duration;

use crowdpulse_community::{
    EastmoneyAdapter, KeywordLexicon, MemoryCache, Pipeline, PipelineConfig, QualityGate,
    XueqiuAdapter,
};
use crowdpulse_core::{EastmoneyTargets, Sentiment, SourceType, XueqiuTargets};
use crowdpulse_fetch::{FetchClient, FetchConfig, Pacing};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline() -> Pipeline {
    pipeline_with_timeouts(Duration::from_secs(2), Duration::from_secs(10))
}

fn pipeline_with_timeouts(request_timeout: Duration, run_timeout: Duration) -> Pipeline {
    let fetcher = FetchClient::new(&FetchConfig {
        request_timeout,
        user_agent: "crowdpulse-test/0.1".to_owned(),
        max_in_flight: 2,
        pacing: Pacing::none(),
        max_retries: 0,
        retry_backoff_base_ms: 0,
    })
    .expect("fetch client");
    Pipeline::new(
        Arc::new(fetcher),
        Arc::new(MemoryCache::new()),
        Arc::new(KeywordLexicon::default()),
        PipelineConfig {
            max_posts: 50,
            max_concurrent_targets: 2,
            run_timeout: Some(run_timeout),
        },
    )
}

fn list_row(id: u32, title: &str, reads: u64, time: &str) -> String {
    format!(
        r#"<div class="articleh normal_post">
             <span class="l1 a1"><em>{reads}</em></span>
             <span class="l3 a3"><a href="/news,600519,{id}.html" title="{title}">{title}</a></span>
             <span class="l5 a5">{time}</span>
           </div>"#
    )
}

// ---------------------------------------------------------------------------
// Eastmoney
// ---------------------------------------------------------------------------

#[tokio::test]
async fn eastmoney_run_ranks_gated_list_posts() {
    let server = MockServer::start().await;
    let body = format!(
        "<html><body>{}{}{}</body></html>",
        list_row(1, "茅台突破新高，继续加仓", 2_500, "03-02 10:15"),
        list_row(2, "没人看的帖子", 50, "03-02 10:10"),
        list_row(3, "小心风险，注意跌破", 300, "03-02 09:58"),
    );
    Mock::given(method("GET"))
        .and(path("/list,600519_1.html"))
        .and(header("referer", "https://guba.eastmoney.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list,000858_1.html"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let adapter = EastmoneyAdapter::new(
        EastmoneyTargets {
            stocks: vec!["600519".into(), "000858".into()],
            top_stocks: 2,
        },
        QualityGate::views_only(100),
    )
    .with_base_url(server.uri());

    let result = pipeline().run(&adapter, "2026-03-02 10:30").await;

    assert_eq!(result.len(), 2, "low-view post must be gated out");
    let top = &result.posts()[0];
    assert_eq!(top.post.title, "茅台突破新高，继续加仓");
    assert_eq!(top.post.url, format!("{}/news,600519,1.html", server.uri()));
    assert_eq!(top.post.source_type, SourceType::EastmoneyCommunity);
    assert_eq!(top.sentiment, Sentiment::Bullish);
    assert!(top.post.title_only);

    let second = &result.posts()[1];
    assert_eq!(second.sentiment, Sentiment::Bearish);
    assert!(top.quality_score > second.quality_score);
}

// ---------------------------------------------------------------------------
// Xueqiu
// ---------------------------------------------------------------------------

const TIMELINE: &str = "/v4/statuses/public_timeline_by_category.json";

async fn mount_landing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "xq_a_token=tok; path=/; httponly"),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn xueqiu_run_uses_session_and_pages_until_empty() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    let long_text = format!("长文分析：{}", "基本面稳健".repeat(12));
    let page_one = serde_json::json!({
        "statuses": [
            {
                "id": 1, "text": "<p>大V说：$SH600519$ 要起飞</p>",
                "created_at": 1_772_420_400_000_u64,
                "like_count": 3, "comment_count": 1, "retweet_count": 0,
                "user": {"screen_name": "大V", "followers_count": 20_000}
            },
            {
                "id": 2, "text": "随便看看",
                "like_count": 1, "comment_count": 0,
                "user": {"screen_name": "路人", "followers_count": 10}
            },
            {
                "id": 3, "text": long_text,
                "user": {"screen_name": "作者", "followers_count": 12}
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("category", "102"))
        .and(query_param("page", "1"))
        .and(query_param("count", "20"))
        .and(header("cookie", "xq_a_token=tok"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_one))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"statuses": []})))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = XueqiuAdapter::new(
        XueqiuTargets {
            categories: vec![102],
            pages: 5,
        },
        QualityGate::influence(1_000, 50, 50),
    )
    .with_base_url(server.uri());

    let p = pipeline();
    let result = p.run(&adapter, "2026-03-02T11:00:00+08:00").await;

    assert_eq!(result.len(), 2, "unknown low-engagement author must be gated out");
    let top = &result.posts()[0];
    assert_eq!(top.post.url, format!("{}/1", server.uri()));
    assert_eq!(top.post.stock_mentions, vec!["600519"]);
    assert_eq!(top.sentiment, Sentiment::Bullish);
    assert_eq!(result.posts()[1].post.url, format!("{}/3", server.uri()));

    // landing page + page 1 + empty page 2
    assert_eq!(p.fetcher().requests_sent(), 3);
}

#[tokio::test]
async fn xueqiu_warm_up_failure_is_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "statuses": [{
                "id": 9, "text": "没有令牌也能看到",
                "user": {"screen_name": "大V", "followers_count": 50_000}
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let adapter = XueqiuAdapter::new(
        XueqiuTargets {
            categories: vec![105],
            pages: 2,
        },
        QualityGate::influence(1_000, 50, 50),
    )
    .with_base_url(server.uri());

    let result = pipeline().run(&adapter, "t").await;
    assert_eq!(result.len(), 1);
    assert_eq!(result.posts()[0].post.audience_size(), 50_000);
}

#[tokio::test]
async fn run_deadline_covers_a_slow_warm_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "xq_a_token=tok; path=/")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TIMELINE))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "statuses": [{
                "id": 1, "text": "不该被抓取",
                "user": {"screen_name": "大V", "followers_count": 50_000}
            }]
        })))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = XueqiuAdapter::new(
        XueqiuTargets {
            categories: vec![102],
            pages: 1,
        },
        QualityGate::influence(1_000, 50, 50),
    )
    .with_base_url(server.uri());
    let p = pipeline_with_timeouts(Duration::from_secs(5), Duration::from_millis(300));

    let started = std::time::Instant::now();
    let result = p.run(&adapter, "t").await;

    assert!(
        started.elapsed() < Duration::from_secs(1),
        "warm-up ran past the run deadline: {:?}",
        started.elapsed()
    );
    assert!(result.is_empty());
}
