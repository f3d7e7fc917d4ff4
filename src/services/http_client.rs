use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::ServiceError;
use crate::services::log_redaction::redact_secrets;

const USER_AGENT: &str = "PocketAtlas/1.0";
const CONNECT_TIMEOUT_SECS: u64 = 5;
const ERROR_BODY_CHARS: usize = 200;

/// One pooled client shared by every provider; per-endpoint timeouts are set per request.
pub fn build_http_client() -> Result<Client, ServiceError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()?)
}

/// Send a request and decode a JSON body, mapping non-2xx statuses to [`ServiceError::Status`].
pub async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    context: &str,
) -> Result<T, ServiceError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let excerpt: String = body.chars().take(ERROR_BODY_CHARS).collect();
        return Err(ServiceError::Status {
            status: status.as_u16(),
            body: redact_secrets(&excerpt),
        });
    }

    serde_json::from_str(&body).map_err(|source| ServiceError::Deserialize {
        context: context.to_string(),
        source,
    })
}

pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
