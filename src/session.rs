// src/session.rs

use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::config::{MAX_BURST_REQUESTS, MAX_RETRIES, REQUESTS_PER_SECOND, USER_AGENT};
use crate::decoder::{decode_body, PayloadDecoder};
use crate::error::DecodeError;

lazy_static! {
    static ref SHARED_TRANSPORT: Arc<Mutex<Transport>> = Arc::new(Mutex::new(Transport::new()));
}

struct Transport {
    client: Client,
    rate_limiter: Arc<Mutex<YahooRateLimiter>>,
}

impl Transport {
    fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Transport {
            client,
            rate_limiter: Arc::new(Mutex::new(YahooRateLimiter::new(REQUESTS_PER_SECOND))),
        }
    }
}

/// HTTP-backed [`PayloadDecoder`] sharing one client and rate limiter per process.
#[derive(Debug, Default, Clone, Copy)]
pub struct YahooSession;

impl YahooSession {
    pub fn new() -> Self {
        YahooSession
    }

    /// Sends a GET request and returns the body text, retrying throttled and
    /// transient failures with exponential backoff.
    pub async fn send_request(url: &str) -> Result<String, DecodeError> {
        let mut attempt = 0;
        loop {
            match Self::send_once(url).await {
                Ok(body) => return Ok(body),
                Err(error) if attempt < MAX_RETRIES && is_transient(&error) => {
                    attempt += 1;
                    let backoff_duration = Duration::from_secs(2u64.pow(attempt));
                    log::warn!("{error}; retry {attempt}/{MAX_RETRIES} in {backoff_duration:?}");
                    sleep(backoff_duration).await;
                }
                Err(error) => {
                    log::error!("giving up on {url}: {error}");
                    return Err(error);
                }
            }
        }
    }

    async fn send_once(url: &str) -> Result<String, DecodeError> {
        let (client, rate_limiter) = {
            let transport = SHARED_TRANSPORT.lock().await;
            (transport.client.clone(), Arc::clone(&transport.rate_limiter))
        };

        rate_limiter.lock().await.acquire().await;

        let response = client.get(url).send().await.map_err(|source| DecodeError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DecodeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| DecodeError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PayloadDecoder for YahooSession {
    async fn fetch_json(&self, url: &str) -> Result<Value, DecodeError> {
        let body = Self::send_request(url).await?;
        decode_body(url, &body)
    }
}

fn is_transient(error: &DecodeError) -> bool {
    match error {
        DecodeError::Transport { .. } => true,
        DecodeError::Status { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        _ => false,
    }
}

/// Token bucket shared by every Yahoo request: `capacity` calls in a burst,
/// then one more per `refill_interval`.
struct YahooRateLimiter {
    tokens: u32,
    capacity: u32,
    last_refill_time: Instant,
    refill_interval: Duration,
}

impl YahooRateLimiter {
    fn new(requests_per_second: u32) -> Self {
        Self::with_capacity(requests_per_second, MAX_BURST_REQUESTS)
    }

    fn with_capacity(requests_per_second: u32, capacity: u32) -> Self {
        YahooRateLimiter {
            tokens: capacity,
            capacity,
            last_refill_time: Instant::now(),
            refill_interval: Duration::from_secs(1) / requests_per_second.max(1),
        }
    }

    /// Credits whole intervals elapsed since the last refill. The partial
    /// interval left over still counts towards the next token.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill_time);
        let intervals = (elapsed.as_nanos() / self.refill_interval.as_nanos().max(1)) as u32;
        if intervals == 0 {
            return;
        }
        if self.tokens.saturating_add(intervals) >= self.capacity {
            self.tokens = self.capacity;
            self.last_refill_time = now;
        } else {
            self.tokens += intervals;
            self.last_refill_time += self.refill_interval * intervals;
        }
    }

    async fn acquire(&mut self) {
        loop {
            let now = Instant::now();
            self.refill(now);
            if self.tokens > 0 {
                self.tokens -= 1;
                return;
            }
            let next_token = self.last_refill_time + self.refill_interval;
            sleep(next_token.saturating_duration_since(now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_and_server_errors_are_retried() {
        let throttled = DecodeError::Status { url: "u".into(), status: 429 };
        let unavailable = DecodeError::Status { url: "u".into(), status: 503 };
        let not_found = DecodeError::Status { url: "u".into(), status: 404 };
        assert!(is_transient(&throttled));
        assert!(is_transient(&unavailable));
        assert!(!is_transient(&not_found));
        assert!(!is_transient(&DecodeError::Shape("timeseries.result")));
    }

    #[test]
    fn refill_keeps_partial_interval() {
        let mut limiter = YahooRateLimiter::with_capacity(4, 8);
        limiter.tokens = 0;
        let start = limiter.last_refill_time;
        let interval = limiter.refill_interval;

        limiter.refill(start + interval * 5 / 2);
        assert_eq!(limiter.tokens, 2);
        assert_eq!(limiter.last_refill_time, start + interval * 2);

        // the half interval carried over completes the third token
        limiter.refill(start + interval * 3);
        assert_eq!(limiter.tokens, 3);
    }

    #[test]
    fn refill_caps_at_capacity() {
        let mut limiter = YahooRateLimiter::with_capacity(4, 3);
        limiter.tokens = 1;
        let start = limiter.last_refill_time;
        limiter.refill(start + limiter.refill_interval * 10);
        assert_eq!(limiter.tokens, 3);
        limiter.refill(start + limiter.refill_interval * 10);
        assert_eq!(limiter.tokens, 3);
    }

    #[tokio::test]
    async fn rate_limiter_spends_burst_then_refills() {
        let mut limiter = YahooRateLimiter::new(1000);
        for _ in 0..MAX_BURST_REQUESTS {
            limiter.acquire().await;
        }
        assert_eq!(limiter.tokens, 0);
        limiter.acquire().await;
        assert!(limiter.tokens < MAX_BURST_REQUESTS);
    }
}
