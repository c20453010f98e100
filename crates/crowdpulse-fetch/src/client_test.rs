use std::sync::atomic::AtomicUsize;

use super::in_flight::InFlightGuard;
use super::*;

#[test]
fn build_url_appends_query_pairs() {
    let url = build_url(
        "https://xueqiu.com/v4/statuses/public_timeline_by_category.json",
        &[
            ("since_id".to_owned(), "-1".to_owned()),
            ("category".to_owned(), "102".to_owned()),
        ],
    )
    .unwrap();
    assert_eq!(
        url.as_str(),
        "https://xueqiu.com/v4/statuses/public_timeline_by_category.json?since_id=-1&category=102"
    );
}

#[test]
fn build_url_keeps_comma_path() {
    let url = build_url("https://guba.eastmoney.com/list,600519_1.html", &[]).unwrap();
    assert_eq!(url.path(), "/list,600519_1.html");
}

#[test]
fn build_url_rejects_relative_url() {
    let err = build_url("/list,600519_1.html", &[]).unwrap_err();
    assert!(
        matches!(err, FetchError::InvalidUrl { .. }),
        "expected InvalidUrl, got: {err:?}"
    );
}

#[test]
fn in_flight_guard_tracks_peak_and_releases() {
    let counter = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    {
        let _a = InFlightGuard::enter(&counter, &peak);
        let _b = InFlightGuard::enter(&counter, &peak);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(peak.load(Ordering::SeqCst), 2);
}

#[test]
fn new_client_starts_idle() {
    let client = FetchClient::new(&FetchConfig::default()).unwrap();
    assert_eq!(client.in_flight(), 0);
    assert_eq!(client.peak_in_flight(), 0);
    assert_eq!(client.requests_sent(), 0);
}
