//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use jk_http::ApiError;
use jk_http::JikanClient;
use jk_http::RawResponse;
use jk_http::RetryConfig;
use jk_http::RetryEvent;
use jk_http::RetryObserver;
use jk_http::Transport;
use jk_http::TransportError;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::RETRY_AFTER;
use tokio::time::Instant;

pub const BASE_URL: &str = "http://jikan.test/v4";

/// What the transport does for one dispatch
pub enum Step {
    Respond(RawResponse),
    Fail(TransportError),
    /// Never completes, so the per-attempt deadline fires
    Hang,
}

/// Replays a fixed script and records every dispatch
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    fallback: Mutex<Option<RawResponse>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(steps.into_iter().collect()), ..Default::default() })
    }

    /// Answer every dispatch with the same response
    pub fn always(response: RawResponse) -> Arc<Self> {
        Self::then(std::iter::empty(), response)
    }

    /// Replay `steps`, then answer every later dispatch with `response`
    pub fn then(steps: impl IntoIterator<Item = Step>, response: RawResponse) -> Arc<Self> {
        let transport = Self { script: Mutex::new(steps.into_iter().collect()), ..Default::default() };
        *transport.fallback.lock() = Some(response);
        Arc::new(transport)
    }

    pub fn dispatches(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Time between consecutive dispatches
    pub fn gaps(&self) -> Vec<Duration> {
        self.calls.lock().windows(2).map(|pair| pair[1].1 - pair[0].1).collect()
    }

    fn next_step(&self) -> Step {
        if let Some(step) = self.script.lock().pop_front() {
            return step;
        }
        match self.fallback.lock().clone() {
            Some(response) => Step::Respond(response),
            None => Step::Fail(TransportError::Request("script exhausted".into())),
        }
    }
}

impl Transport for ScriptedTransport {
    fn get<'a>(&'a self, url: &'a str) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>> {
        self.calls.lock().push((url.to_string(), Instant::now()));
        let step = self.next_step();

        Box::pin(async move {
            match step {
                Step::Respond(response) => Ok(response),
                Step::Fail(err) => Err(err),
                Step::Hang => std::future::pending().await,
            }
        })
    }
}

pub fn respond(status: u16, body: &str) -> Step {
    Step::Respond(response(status, body))
}

pub fn response(status: u16, body: &str) -> RawResponse {
    RawResponse::new(status, HeaderMap::new(), body.to_string())
}

pub fn rate_limited(retry_after: &str) -> Step {
    let mut headers = HeaderMap::new();
    headers.insert(RETRY_AFTER, HeaderValue::from_str(retry_after).unwrap());
    Step::Respond(RawResponse::new(429, headers, r#"{"status":429,"type":"RateLimitException","message":"Too many requests"}"#.to_string()))
}

pub fn anime_body(id: u64, title: &str) -> String {
    format!(r#"{{"data":{{"mal_id":{id},"title":"{title}","images":{{}}}}}}"#)
}

pub fn episodes_body(ids: &[u64], last_page: u32) -> String {
    let data: Vec<String> = ids.iter().map(|id| format!(r#"{{"mal_id":{id},"title":"Episode {id}"}}"#)).collect();
    format!(r#"{{"data":[{}],"pagination":{{"last_visible_page":{last_page},"has_next_page":false}}}}"#, data.join(","))
}

pub fn client(transport: &Arc<ScriptedTransport>, config: RetryConfig) -> JikanClient {
    JikanClient::builder().base_url(BASE_URL).retry_config(config).transport(transport.clone()).build().unwrap()
}

/// Observer that keeps what it was told
#[derive(Default)]
pub struct RecordingObserver {
    pub retries: Mutex<Vec<(u32, Duration, bool)>>,
    pub failures: Mutex<Vec<ApiError>>,
}

impl RetryObserver for RecordingObserver {
    fn on_retry(&self, event: &RetryEvent<'_>) {
        self.retries.lock().push((event.attempt, event.delay, event.budgeted));
    }

    fn on_failure(&self, _url: &str, error: &ApiError) {
        self.failures.lock().push(error.clone());
    }
}
