//! ServerChan (WeChat push) notifier implementing NotifyPort.

use log::debug;
use reqwest::blocking::Client;
use std::time::Duration;

use crate::domain::error::DigestError;
use crate::domain::settings::PushSettings;
use crate::ports::notify_port::{Digest, NotifyPort};

pub const KEY_ENV: &str = "SERVERCHAN_KEY";

pub struct ServerChanAdapter {
    client: Client,
    endpoint: String,
    key: String,
}

impl ServerChanAdapter {
    pub fn new(settings: &PushSettings, key: String, timeout: Duration) -> Result<Self, DigestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DigestError::Io(std::io::Error::other(e)))?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            key,
        })
    }

    /// Builds the sink when the key is present in the environment lookup.
    pub fn from_lookup(
        settings: &PushSettings,
        timeout: Duration,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<Result<Self, DigestError>> {
        lookup(KEY_ENV)
            .filter(|k| !k.trim().is_empty())
            .map(|key| Self::new(settings, key.trim().to_string(), timeout))
    }

    fn url(&self) -> String {
        format!("{}/{}.send", self.endpoint, self.key)
    }

    fn failed(&self, reason: impl Into<String>) -> DigestError {
        DigestError::NotificationFailed {
            sink: self.name().to_string(),
            reason: reason.into(),
        }
    }
}

impl NotifyPort for ServerChanAdapter {
    fn name(&self) -> &str {
        "serverchan"
    }

    fn send(&self, digest: &Digest) -> Result<(), DigestError> {
        let form = [("title", digest.title.as_str()), ("desp", digest.markdown.as_str())];
        let response = self
            .client
            .post(self.url())
            .form(&form)
            .send()
            // The URL embeds the key; keep it out of logged errors.
            .map_err(|e| self.failed(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        debug!("serverchan response {status}: {body}");
        if !status.is_success() {
            return Err(self.failed(format!("HTTP {status}: {body}")));
        }
        check_response_body(&body).map_err(|reason| self.failed(reason))
    }
}

/// ServerChan answers 200 with `{"code": <n>, "message": ...}`; any
/// non-zero code is a rejected push. Non-JSON bodies are accepted.
pub fn check_response_body(body: &str) -> Result<(), String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Ok(());
    };
    match value.get("code").and_then(serde_json::Value::as_i64) {
        Some(0) | None => Ok(()),
        Some(code) => {
            let message = value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("no message");
            Err(format!("rejected with code {code}: {message}"))
        }
    }
}
