//! Shared HTTP plumbing for the remote adapters

use formqa_core::error::{FormqaError, Result};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

/// One initial attempt plus one retry
const MAX_ATTEMPTS: u32 = 2;

/// Diagnostic bodies longer than this are cut in error messages
const MAX_ERROR_BODY: usize = 512;

pub(crate) fn build_client(service: &str, timeout: Duration) -> Result<Client> {
    Client::builder().timeout(timeout).build().map_err(|e| FormqaError::Transport {
        service: service.to_string(),
        reason: format!("failed to build HTTP client: {}", e),
    })
}

/// Send a request, retrying once when it never reached the service
///
/// Only connect and timeout failures are retried; any HTTP reply, including
/// 5xx, is final. `build` is called again for the retry because multipart
/// bodies cannot be cloned. Non-2xx replies become [`FormqaError::Upstream`].
pub(crate) async fn send_with_retry<F>(service: &str, build: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 1;
    loop {
        let retries_left = attempt < MAX_ATTEMPTS;

        match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(FormqaError::Upstream {
                    service: service.to_string(),
                    status,
                    body: truncate(&body),
                });
            }
            Err(e) if (e.is_connect() || e.is_timeout()) && retries_left => {
                tracing::warn!(service, error = %e, attempt, "Request failed, retrying");
            }
            Err(e) => {
                return Err(FormqaError::Transport {
                    service: service.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        attempt += 1;
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!("{}…", cut)
}
