//! Retry, pacing and classification behaviour against a scripted transport
//!
//! All tests run on Tokio's paused clock, so sleeps and deadlines complete
//! instantly while elapsed time stays exact.

mod support;

use std::sync::Arc;
use std::time::Duration;

use jk_http::ApiError;
use jk_http::JikanClient;
use jk_http::JsonDecoder;
use jk_http::RequestDescriptor;
use jk_http::RetryConfig;
use jk_http::TransportError;
use serde_json::Value;
use support::RecordingObserver;
use support::ScriptedTransport;
use support::Step;
use support::anime_body;
use support::client;
use support::rate_limited;
use support::respond;
use support::response;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const ANIME_URL: &str = "http://jikan.test/v4/anime/1";

fn json() -> JsonDecoder<Value> {
    JsonDecoder::new()
}

#[tokio::test(start_paused = true)]
async fn test_success_returns_decoded_value() {
    let transport = ScriptedTransport::new([respond(200, &anime_body(1, "Cowboy Bebop"))]);
    let client = client(&transport, RetryConfig::default());

    let anime = client.anime(1).await.unwrap();

    assert_eq!(anime.title, "Cowboy Bebop");
    assert_eq!(transport.dispatches(), 1);
    assert_eq!(transport.urls(), vec![ANIME_URL.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_is_not_retried() {
    let transport = ScriptedTransport::always(response(404, r#"{"status":404,"type":"BadResponseException","message":"Resource does not exist"}"#));
    let client = client(&transport, RetryConfig::default());

    let err = client.fetch_with_budget(ANIME_URL, json(), 5).await.unwrap_err();

    assert_eq!(err, ApiError::NotFound { message: Some("Resource does not exist".into()) });
    assert_eq!(transport.dispatches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_bad_request_is_not_retried() {
    let transport = ScriptedTransport::always(response(400, "{}"));
    let client = client(&transport, RetryConfig::default());

    let err = client.fetch(ANIME_URL, json()).await.unwrap_err();

    assert!(matches!(err, ApiError::BadRequest { message: None }));
    assert_eq!(transport.dispatches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_waits_retry_after_plus_padding() {
    let transport = ScriptedTransport::new([rate_limited("3"), respond(200, "{}")]);
    let client = client(&transport, RetryConfig::default());

    client.fetch(ANIME_URL, json()).await.unwrap();

    assert_eq!(transport.dispatches(), 2);
    assert!(transport.gaps()[0] >= Duration::from_millis(4000), "gap was {:?}", transport.gaps()[0]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_does_not_consume_budget() {
    let transport = ScriptedTransport::new([rate_limited("1"), rate_limited("1"), rate_limited("1"), respond(200, "{}")]);
    let client = client(&transport, RetryConfig::default());

    let result = client.fetch_with_budget(ANIME_URL, json(), 1).await;

    assert!(result.is_ok(), "{result:?}");
    assert_eq!(transport.dispatches(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_missing_retry_after_defaults_to_two_seconds() {
    let transport = ScriptedTransport::new([respond(429, ""), respond(200, "{}")]);
    let client = client(&transport, RetryConfig::default());

    client.fetch(ANIME_URL, json()).await.unwrap();

    let gap = transport.gaps()[0];
    assert!(gap >= Duration::from_secs(3) && gap < Duration::from_millis(3100), "gap was {gap:?}");
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_back_off_linearly() {
    let transport = ScriptedTransport::always(response(500, r#"{"message":"boom","report_url":"https://example.test/report"}"#));
    let client = client(&transport, RetryConfig::default());

    let err = client.fetch(ANIME_URL, json()).await.unwrap_err();

    assert_eq!(err, ApiError::ServerError { message: Some("boom".into()), report_url: Some("https://example.test/report".into()) });
    assert_eq!(transport.dispatches(), 3);

    let gaps = transport.gaps();
    assert!(gaps[0] >= Duration::from_millis(1000) && gaps[0] < Duration::from_millis(1100), "{gaps:?}");
    assert!(gaps[1] >= Duration::from_millis(2000) && gaps[1] < Duration::from_millis(2100), "{gaps:?}");
}

#[tokio::test(start_paused = true)]
async fn test_service_unavailable_recovers() {
    let transport = ScriptedTransport::new([respond(503, ""), respond(200, r#"{"ok":true}"#)]);
    let client = client(&transport, RetryConfig::default());

    let value = client.fetch(ANIME_URL, json()).await.unwrap();

    assert_eq!(value["ok"], Value::Bool(true));
    assert_eq!(transport.dispatches(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_decode_failure_is_terminal() {
    let transport = ScriptedTransport::always(response(200, r#"{"data":{"mal_id":1}}"#));
    let client = client(&transport, RetryConfig::default());

    let err = client.anime(1).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)), "{err:?}");
    assert_eq!(transport.dispatches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_with_single_attempt() {
    let transport = ScriptedTransport::new([Step::Hang]);
    let client = client(&transport, RetryConfig::default());
    let start = Instant::now();

    let err = client.fetch_with_budget(ANIME_URL, json(), 1).await.unwrap_err();

    assert_eq!(err, ApiError::Timeout { after: Duration::from_secs(10) });
    assert_eq!(transport.dispatches(), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_then_success() {
    let transport = ScriptedTransport::new([Step::Hang, respond(200, "{}")]);
    let client = client(&transport, RetryConfig::default());

    client.fetch(ANIME_URL, json()).await.unwrap();

    assert_eq!(transport.dispatches(), 2);
    // 10s deadline plus the first backoff step
    assert!(transport.gaps()[0] >= Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn test_network_errors_exhaust_budget() {
    let transport = ScriptedTransport::new([
        Step::Fail(TransportError::Connect("connection refused".into())),
        Step::Fail(TransportError::Connect("connection refused".into())),
    ]);
    let client = client(&transport, RetryConfig::default());

    let err = client.fetch_with_budget(ANIME_URL, json(), 2).await.unwrap_err();

    assert!(matches!(err, ApiError::Network { ref cause } if cause.contains("connection refused")), "{err:?}");
    assert_eq!(transport.dispatches(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transport_timeout_maps_to_timeout() {
    let transport = ScriptedTransport::new([Step::Fail(TransportError::Timeout)]);
    let client = client(&transport, RetryConfig::default());

    let err = client.fetch_with_budget(ANIME_URL, json(), 1).await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_server_status_is_retried() {
    let transport = ScriptedTransport::new([respond(502, ""), respond(200, "{}")]);
    let client = client(&transport, RetryConfig::default());

    client.fetch(ANIME_URL, json()).await.unwrap();

    assert_eq!(transport.dispatches(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_client_status_is_terminal() {
    let transport = ScriptedTransport::always(response(401, r#"{"type":"UnauthorizedException"}"#));
    let client = client(&transport, RetryConfig::default());

    let err = client.fetch(ANIME_URL, json()).await.unwrap_err();

    assert_eq!(err.status(), 401);
    assert_eq!(err.error_type(), "UnauthorizedException");
    assert_eq!(transport.dispatches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_ceiling() {
    let transport = ScriptedTransport::always(response(429, ""));
    let config = RetryConfig { max_rate_limit_waits: Some(2), ..Default::default() };
    let client = client(&transport, config);

    let err = client.fetch(ANIME_URL, json()).await.unwrap_err();

    assert_eq!(err, ApiError::MaxRetriesExceeded { attempts: 3 });
    assert_eq!(transport.dispatches(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_backoff() {
    let transport = ScriptedTransport::always(response(429, ""));
    let client = client(&transport, RetryConfig::default());
    let token = CancellationToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            token.cancel();
        })
    };

    let request = RequestDescriptor::new(ANIME_URL, json()).with_cancellation(token);
    let err = client.execute(request).await.unwrap_err();
    canceller.await.unwrap();

    assert_eq!(err, ApiError::Cancelled);
    assert_eq!(transport.dispatches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_client_token_cancels_requests() {
    let transport = ScriptedTransport::always(response(200, "{}"));
    let token = CancellationToken::new();
    let client = JikanClient::builder()
        .base_url(support::BASE_URL)
        .transport(transport.clone())
        .cancellation(token.clone())
        .build()
        .unwrap();

    token.cancel();
    let err = client.fetch(ANIME_URL, json()).await.unwrap_err();

    assert_eq!(err, ApiError::Cancelled);
    assert_eq!(transport.dispatches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_limiter_acquired_once_per_request_by_default() {
    let transport = ScriptedTransport::new([respond(500, ""), respond(200, "{}")]);
    let config = RetryConfig { backoff_step: Duration::ZERO, ..Default::default() };
    let client = client(&transport, config);

    client.fetch(ANIME_URL, json()).await.unwrap();

    assert_eq!(transport.gaps()[0], Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_acquire_per_attempt_spaces_retries() {
    let transport = ScriptedTransport::new([respond(500, ""), respond(200, "{}")]);
    let config = RetryConfig { backoff_step: Duration::ZERO, acquire_per_attempt: true, ..Default::default() };
    let client = client(&transport, config);

    client.fetch(ANIME_URL, json()).await.unwrap();

    assert!(transport.gaps()[0] >= Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_are_spaced() {
    let transport = ScriptedTransport::always(response(200, "{}"));
    let client = client(&transport, RetryConfig::default());

    let mut handles = Vec::new();
    for id in 0..5 {
        let client = client.clone();
        handles.push(tokio::spawn(async move { client.fetch(format!("http://jikan.test/v4/anime/{id}"), json()).await }));
        tokio::task::yield_now().await;
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(transport.dispatches(), 5);
    let expected: Vec<String> = (0..5).map(|id| format!("http://jikan.test/v4/anime/{id}")).collect();
    assert_eq!(transport.urls(), expected);
    for gap in transport.gaps() {
        assert!(gap >= Duration::from_millis(500), "gap was {gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_observer_sees_each_retry() {
    let transport = ScriptedTransport::new([rate_limited("2"), respond(500, ""), respond(503, ""), respond(200, "{}")]);
    let observer = Arc::new(RecordingObserver::default());
    let client = JikanClient::builder()
        .base_url(support::BASE_URL)
        .transport(transport.clone())
        .observer(observer.clone())
        .build()
        .unwrap();

    client.fetch(ANIME_URL, json()).await.unwrap();

    let retries = observer.retries.lock().clone();
    assert_eq!(
        retries,
        vec![(0, Duration::from_secs(3), false), (0, Duration::from_secs(1), true), (1, Duration::from_secs(2), true)]
    );
    assert!(observer.failures.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_observer_sees_terminal_failure() {
    let transport = ScriptedTransport::always(response(404, ""));
    let observer = Arc::new(RecordingObserver::default());
    let client = JikanClient::builder()
        .base_url(support::BASE_URL)
        .transport(transport.clone())
        .observer(observer.clone())
        .build()
        .unwrap();

    let _ = client.fetch(ANIME_URL, json()).await;

    assert!(observer.retries.lock().is_empty());
    assert_eq!(observer.failures.lock().clone(), vec![ApiError::NotFound { message: None }]);
}
