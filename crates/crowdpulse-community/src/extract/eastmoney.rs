//! Eastmoney Guba list-page extraction.
//!
//! List pages are server-rendered HTML. Post links, read counters and
//! `MM-DD HH:MM` timestamps are matched independently and paired by index,
//! so a page whose rows lack a counter shifts later pairings. Only titles
//! are available; `content` repeats the title and `title_only` is set.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime};
use crowdpulse_core::{CanonicalPost, Engagement, SourceType};
use crowdpulse_fetch::RawPayload;
use regex::Regex;

use super::{absolutize_url, clean_text};

static POST_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]*href="([^"]*news,[^"]*)"[^>]*>([^<]+)</a>"#).expect("valid post link regex")
});
static READ_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<em[^>]*>(\d+)</em>").expect("valid read count regex"));
static POST_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2})-(\d{2})\s+(\d{2}):(\d{2})").expect("valid post time regex")
});

/// Extract up to `max_posts` posts from one list page.
pub(crate) fn extract_list_page(
    payload: &RawPayload,
    site_base: &str,
    max_posts: usize,
) -> Vec<CanonicalPost> {
    let body = payload.body.as_str();
    let links: Vec<(&str, &str)> = POST_LINK_RE
        .captures_iter(body)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect();
    let read_counts: Vec<u64> = READ_COUNT_RE
        .captures_iter(body)
        .map(|c| c.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0))
        .collect();
    let times: Vec<Option<DateTime<FixedOffset>>> = POST_TIME_RE
        .captures_iter(body)
        .map(|c| parse_list_time(&c, payload.fetched_at))
        .collect();

    let mut posts = Vec::new();
    for (idx, (href, raw_title)) in links.into_iter().enumerate() {
        if posts.len() >= max_posts {
            break;
        }
        let title = clean_text(raw_title);
        if title.is_empty() {
            tracing::debug!(fetch_target = %payload.target, href, "skipping list row with empty title");
            continue;
        }
        let views = read_counts.get(idx).copied().unwrap_or(0);
        let publish_time = times
            .get(idx)
            .copied()
            .flatten()
            .unwrap_or(payload.fetched_at);

        posts.push(CanonicalPost {
            content: title.clone(),
            title,
            publish_time,
            url: absolutize_url(site_base, href),
            source_target: payload.target.clone(),
            author: None,
            engagement: Engagement {
                views,
                ..Engagement::default()
            },
            source_type: SourceType::EastmoneyCommunity,
            stock_mentions: Vec::new(),
            title_only: true,
        });
    }
    posts
}

/// List times carry no year. The fetch year is assumed unless that puts the
/// post after the fetch, in which case it is from the previous year.
/// Impossible dates (e.g. `02-30`) yield `None`.
fn parse_list_time(
    caps: &regex::Captures<'_>,
    fetched_at: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let field = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
    let (month, day) = (field(1)?, field(2)?);
    let time = NaiveTime::from_hms_opt(field(3)?, field(4)?, 0)?;
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_time(time)
            .and_local_timezone(*fetched_at.offset())
            .single()
    };

    match in_year(fetched_at.year()) {
        Some(resolved) if resolved <= fetched_at => Some(resolved),
        _ => in_year(fetched_at.year() - 1),
    }
}
