// tests/scanner_tests.rs

mod test_utils;

use std::sync::Arc;

use feedhush_common::models::Selector;
use feedhush_common::traits::FeedPage;
use feedhush_core::{DecisionCache, DecisionEngine, DecisionStrategy, MemoryPage, Scanner};
use test_utils::helpers::{bare_post, config_with, feed, post, FakeCompletion};

fn engine() -> DecisionEngine {
    DecisionEngine::new(Arc::new(DecisionCache::default()), DecisionStrategy::ContainsNo)
}

fn article_ids(page: &MemoryPage, nodes: &[feedhush_common::models::NodeId]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|n| page.attribute(*n, "id"))
        .collect()
}

#[tokio::test]
async fn test_scan_hides_matching_articles() {
    let page = MemoryPage::from_snapshot(feed(vec![
        post("p1", "Lovely sunset today"),
        post("p2", "BUY CRYPTO NOW scam scam"),
        post("p3", "Meeting notes"),
    ]));
    let fake = Arc::new(FakeCompletion::hiding_posts_with("scam"));
    let config = config_with(Arc::clone(&fake));
    let engine = engine();

    let report = Scanner::default().scan(&page, &engine, &config).await;

    assert_eq!(report.examined, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(article_ids(&page, &report.hidden), vec!["p2"]);
    assert_eq!(article_ids(&page, &page.hidden_elements()), vec!["p2"]);
}

#[tokio::test]
async fn test_scan_visits_posts_in_document_order() {
    let page = MemoryPage::from_snapshot(feed(vec![
        post("p1", "first"),
        post("p2", "second"),
        post("p3", "third"),
    ]));
    let fake = Arc::new(FakeCompletion::answering("Yes"));
    let config = config_with(Arc::clone(&fake));

    Scanner::default().scan(&page, &engine(), &config).await;

    assert_eq!(
        fake.prompts(),
        vec!["Hide spam: first", "Hide spam: second", "Hide spam: third"]
    );
}

#[tokio::test]
async fn test_post_without_container_is_skipped() {
    let page = MemoryPage::from_snapshot(feed(vec![bare_post("scam without article"), post("p1", "scam")]));
    let fake = Arc::new(FakeCompletion::hiding_posts_with("scam"));
    let config = config_with(Arc::clone(&fake));

    let report = Scanner::default().scan(&page, &engine(), &config).await;

    assert_eq!(report.examined, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(article_ids(&page, &report.hidden), vec!["p1"]);
}

#[tokio::test]
async fn test_rescan_reuses_cached_decisions() {
    let page = MemoryPage::from_snapshot(feed(vec![post("p1", "scam"), post("p2", "fine")]));
    let fake = Arc::new(FakeCompletion::hiding_posts_with("scam"));
    let config = config_with(Arc::clone(&fake));
    let engine = engine();
    let scanner = Scanner::default();

    scanner.scan(&page, &engine, &config).await;
    page.append_child(page.root(), post("p3", "scam")).unwrap();
    let second = scanner.scan(&page, &engine, &config).await;

    // p3 repeats p1's text, so it is decided from the cache.
    assert_eq!(fake.calls(), 2);
    assert_eq!(second.examined, 3);
    assert_eq!(article_ids(&page, &page.hidden_elements()), vec!["p1", "p3"]);
}

#[tokio::test]
async fn test_failures_leave_posts_visible() {
    let page = MemoryPage::from_snapshot(feed(vec![post("p1", "anything")]));
    let fake = Arc::new(FakeCompletion::failing("503 service unavailable"));
    let config = config_with(Arc::clone(&fake));

    let report = Scanner::default().scan(&page, &engine(), &config).await;

    assert_eq!(report.examined, 1);
    assert!(report.hidden.is_empty());
    assert!(page.hidden_elements().is_empty());
}

#[tokio::test]
async fn test_custom_selector_and_container() {
    let page = MemoryPage::from_snapshot(
        feedhush_common::models::PageNode::new("body").with_child(
            feedhush_common::models::PageNode::new("section")
                .with_attribute("id", "s1")
                .with_child(
                    feedhush_common::models::PageNode::new("p")
                        .with_attribute("class", "post-body")
                        .with_text("scam"),
                ),
        ),
    );
    let fake = Arc::new(FakeCompletion::hiding_posts_with("scam"));
    let config = config_with(Arc::clone(&fake));
    let scanner = Scanner::new(Selector::parse("p.post-body").unwrap()).with_container_tag("section");

    let report = scanner.scan(&page, &engine(), &config).await;
    assert_eq!(article_ids(&page, &report.hidden), vec!["s1"]);
}
