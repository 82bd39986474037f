//! HTTP GET with retries and exponential backoff.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{ConnectorError, Result};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// GET with up to `max_retries` attempts and exponential backoff (1, 2,
/// 4 s) on timeouts and connection errors. Non-transport failures (bad
/// status, unparsable body) are not retried here; callers classify them.
pub fn get_with_retries(
    client: &reqwest::blocking::Client,
    url: &str,
    query: &[(&str, String)],
    max_retries: u32,
    initial_backoff: Duration,
) -> Result<reqwest::blocking::Response> {
    let mut last_error = String::new();
    for attempt in 0..max_retries {
        match client.get(url).query(query).send() {
            Ok(resp) => return Ok(resp),
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_error = e.to_string();
                warn!(
                    attempt = attempt + 1,
                    max = max_retries,
                    url = &url[..url.len().min(60)],
                    error = %last_error,
                    "external API retry"
                );
            }
            Err(e) => {
                return Err(ConnectorError::Transport {
                    attempts: attempt + 1,
                    message: e.to_string(),
                });
            }
        }
        if attempt + 1 < max_retries {
            let delay = initial_backoff * 2u32.pow(attempt);
            info!(delay_secs = delay.as_secs_f32(), "external API backoff before retry");
            std::thread::sleep(delay);
        }
    }
    Err(ConnectorError::Transport {
        attempts: max_retries,
        message: last_error,
    })
}
