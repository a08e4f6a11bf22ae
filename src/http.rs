//! Shared HTTP plumbing for the external service clients.
//!
//! Retry strategy, applied uniformly to the embedding, chat, and vector
//! calls:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::time::Duration;

use crate::error::ClientError;

/// POST a JSON body and return the parsed JSON response, retrying
/// transient failures with exponential backoff.
pub(crate) async fn post_json_with_retry(
    client: &reqwest::Client,
    url: &str,
    headers: &[(&str, String)],
    body: &serde_json::Value,
    max_retries: u32,
) -> Result<serde_json::Value, ClientError> {
    let mut last_err: Option<ClientError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let mut request = client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response.json().await.map_err(ClientError::Http);
                }

                let body_text = response.text().await.unwrap_or_default();

                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(ClientError::Api {
                        status: status.as_u16(),
                        body: body_text,
                    });
                    continue;
                }

                // Client error (not 429) — don't retry
                return Err(ClientError::Api {
                    status: status.as_u16(),
                    body: body_text,
                });
            }
            Err(e) => {
                last_err = Some(ClientError::Http(e));
                continue;
            }
        }
    }

    Err(last_err
        .unwrap_or_else(|| ClientError::InvalidResponse("request failed after retries".into())))
}
