// tests/decision_engine_tests.rs

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use feedhush_ai::ChatCompletion;
use feedhush_core::{DecisionCache, DecisionEngine, DecisionStrategy};
use serde_json::json;
use test_utils::helpers::{config_with, wait_until, FakeCompletion};

fn engine(capacity: usize, strategy: DecisionStrategy) -> DecisionEngine {
    DecisionEngine::new(Arc::new(DecisionCache::new(capacity)), strategy)
}

#[tokio::test]
async fn test_concurrent_same_text_single_remote_call() {
    let (fake, gate) = FakeCompletion::answering("No").gated();
    let fake = Arc::new(fake);
    let config = config_with(Arc::clone(&fake));
    let engine = Arc::new(engine(16, DecisionStrategy::ContainsNo));

    let first = {
        let (engine, config) = (Arc::clone(&engine), Arc::clone(&config));
        tokio::spawn(async move { engine.decide(&config, "Buy now!!!").await })
    };
    let second = {
        let (engine, config) = (Arc::clone(&engine), Arc::clone(&config));
        tokio::spawn(async move { engine.decide(&config, "Buy now!!!").await })
    };

    // Both callers are waiting on the one gated call.
    assert!(wait_until(Duration::from_secs(1), || fake.calls() == 1).await);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fake.calls(), 1);
    assert!(!first.is_finished());
    assert!(!second.is_finished());

    gate.add_permits(8);
    assert!(first.await.unwrap());
    assert!(second.await.unwrap());
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_completion_text_rule() {
    let cases = [
        ("No, this should be hidden.", true),
        ("Yes, keep it.", false),
        ("Maybe", false),
        ("  NO  ", true),
    ];

    for (answer, expected) in cases {
        let fake = Arc::new(FakeCompletion::answering(answer));
        let config = config_with(Arc::clone(&fake));
        let engine = engine(4, DecisionStrategy::ContainsNo);
        assert_eq!(engine.decide(&config, "some post").await, expected, "answer {answer:?}");
    }
}

#[tokio::test]
async fn test_remote_failure_resolves_to_keep() {
    let fake = Arc::new(FakeCompletion::failing("connection refused"));
    let config = config_with(Arc::clone(&fake));
    let engine = engine(4, DecisionStrategy::ContainsNo);

    assert!(!engine.decide(&config, "post").await);
    // The failed decision is cached like any other.
    assert!(!engine.decide(&config, "post").await);
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn test_request_carries_prompt_and_model() {
    let fake = Arc::new(FakeCompletion::answering("Yes"));
    let config = config_with(Arc::clone(&fake));
    let engine = engine(4, DecisionStrategy::ContainsNo);

    engine.decide(&config, "Buy now!!!").await;

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "test-model");
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[0].messages[0].role, "user");
    assert_eq!(requests[0].messages[0].content, "Hide spam: Buy now!!!");
    assert_eq!(requests[0].logprobs, None);
}

#[tokio::test]
async fn test_text_is_not_normalized() {
    let fake = Arc::new(FakeCompletion::answering("Yes"));
    let config = config_with(Arc::clone(&fake));
    let engine = engine(8, DecisionStrategy::ContainsNo);

    engine.decide(&config, "hello").await;
    engine.decide(&config, "hello ").await;
    engine.decide(&config, "Hello").await;
    engine.decide(&config, "hello").await;
    assert_eq!(fake.calls(), 3);
}

#[tokio::test]
async fn test_evicted_text_is_recomputed() {
    let fake = Arc::new(FakeCompletion::answering("Yes"));
    let config = config_with(Arc::clone(&fake));
    let engine = engine(2, DecisionStrategy::ContainsNo);

    engine.decide(&config, "a").await;
    engine.decide(&config, "b").await;
    engine.decide(&config, "a").await; // refresh "a"
    engine.decide(&config, "c").await; // evicts "b"
    assert_eq!(fake.calls(), 3);

    engine.decide(&config, "a").await;
    assert_eq!(fake.calls(), 3);
    engine.decide(&config, "b").await;
    assert_eq!(fake.calls(), 4);
    assert!(engine.cache().len() <= 2);
}

#[tokio::test]
async fn test_threshold_strategy_uses_logprobs() {
    let fake = Arc::new(FakeCompletion::new(|prompt| {
        let top = if prompt.contains("cheap") {
            json!({"NO": -0.05, "YES": -3.0})
        } else {
            json!({"YES": -0.05, "NO": -3.0})
        };
        // The answer text alone would say the opposite.
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{
                "message": {"content": "yes no"},
                "logprobs": {"top_logprobs": [top]}
            }]
        }))?;
        Ok(completion)
    }));
    let config = config_with(Arc::clone(&fake));
    let engine = engine(4, DecisionStrategy::LogprobThreshold);

    assert!(engine.decide(&config, "cheap pills here").await);
    assert!(!engine.decide(&config, "a nice photo").await);

    let requests = fake.requests();
    assert_eq!(requests[0].logprobs, Some(true));
    assert!(requests[0].top_logprobs.is_some());
}

#[tokio::test]
async fn test_threshold_strategy_without_logprobs_keeps_post() {
    let fake = Arc::new(FakeCompletion::answering("No"));
    let config = config_with(Arc::clone(&fake));
    let engine = engine(4, DecisionStrategy::LogprobThreshold);

    assert!(!engine.decide(&config, "post").await);
}
