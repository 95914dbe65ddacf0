use log::{debug, warn};
use reqwest::blocking::Client;
use std::thread::sleep;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{Result, ScrapeError};

/// Anything that can turn a URL into page HTML.
pub trait PageSource {
    fn fetch(&mut self, url: &str) -> Result<String>;
}

/// Exponential backoff between attempts of the same request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

pub struct Fetcher {
    client: Client,
    delay: Duration,
    retry: RetryPolicy,
    last_request: Option<Instant>,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self {
            client,
            delay: config.request_delay(),
            retry: RetryPolicy::from_config(config),
            last_request: None,
        })
    }

    fn wait_turn(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                sleep(self.delay - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }

    fn get_once(&mut self, url: &str) -> Result<String> {
        self.wait_turn();
        debug!("GET {}", url);

        let response = self.client.get(url).send().map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch a page body, retrying transport errors and 429/5xx responses.
    pub fn get(&mut self, url: &str) -> Result<String> {
        let policy = self.retry.clone();
        retry(&policy, url, || self.get_once(url))
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or has been
/// tried `max_retries + 1` times.
pub fn retry<T>(policy: &RetryPolicy, what: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", what, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    what,
                    attempt + 1,
                    policy.max_retries + 1,
                    e,
                    delay
                );
                sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

impl PageSource for Fetcher {
    fn fetch(&mut self, url: &str) -> Result<String> {
        self.get(url)
    }
}
