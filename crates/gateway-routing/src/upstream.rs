//! Single upstream HTTP attempt.

use gateway_resilience::AttemptError;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

/// How the credential travels to the upstream
#[derive(Debug, Clone)]
pub enum UpstreamAuth {
    /// `Authorization: Bearer <key>`
    Bearer(SecretString),
    /// Key sent in a provider-specific header
    Header {
        /// Header name
        name: &'static str,
        /// Key value
        key: SecretString,
    },
}

/// POST `body` to `url` once
///
/// A success status returns the response with its body unread, so callers
/// can stream it.
///
/// # Errors
/// Connection failures map to [`AttemptError::Transport`] and non-success
/// statuses to [`AttemptError::Status`] carrying the response body.
pub async fn send_once<B>(
    client: &Client,
    url: &str,
    auth: &UpstreamAuth,
    body: &B,
) -> Result<Response, AttemptError>
where
    B: Serialize + ?Sized,
{
    let builder = client.post(url).json(body);
    let builder = match auth {
        UpstreamAuth::Bearer(key) => builder.bearer_auth(key.expose_secret()),
        UpstreamAuth::Header { name, key } => builder.header(*name, key.expose_secret().as_str()),
    };

    let response = builder
        .send()
        .await
        .map_err(|e| AttemptError::Transport(e.to_string()))?;

    let status = response.status();
    debug!(url = %url, status = status.as_u16(), "Upstream responded");

    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AttemptError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
