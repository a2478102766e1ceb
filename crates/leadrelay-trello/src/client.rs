// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Trello REST API.
//!
//! Trello authenticates with `key` and `token` query parameters on every
//! request rather than a header.

use std::time::Duration;

use leadrelay_core::LeadRelayError;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TrelloClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    token: String,
}

impl TrelloClient {
    pub fn new(api_key: String, token: String, base_url: &str) -> Result<Self, LeadRelayError> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LeadRelayError::Board {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            token,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, LeadRelayError> {
        let auth = [("key", self.api_key.as_str()), ("token", self.token.as_str())];
        Url::parse_with_params(
            &format!("{}/{}", self.base_url, path.trim_start_matches('/')),
            params.iter().chain(auth.iter()),
        )
        .map_err(|e| LeadRelayError::Board {
            message: format!("invalid Trello URL for {path}: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// `GET {path}` and decode the JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, LeadRelayError> {
        let url = self.url(path, params)?;
        self.execute(self.client.get(url), path).await
    }

    /// Sends `body` as JSON with `method` and decode the JSON response.
    pub async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, LeadRelayError> {
        let url = self.url(path, &[])?;
        self.execute(self.client.request(method, url).json(body), path)
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<T, LeadRelayError> {
        let response = request.send().await.map_err(|e| LeadRelayError::Board {
            message: format!("HTTP request failed: {}", e.without_url()),
            source: None,
        })?;
        let status = response.status();
        debug!(status = %status, path, "Trello response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LeadRelayError::board(format!(
                "Trello returned {status} for {path}: {body}"
            )));
        }
        response.json().await.map_err(|e| LeadRelayError::Board {
            message: format!(
                "failed to parse Trello response for {path}: {}",
                e.without_url()
            ),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn auth_rides_on_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members/me/boards"))
            .and(query_param("key", "k"))
            .and(query_param("token", "t"))
            .and(query_param("fields", "name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = TrelloClient::new("k".into(), "t".into(), "https://unused.invalid")
            .unwrap()
            .with_base_url(server.uri());
        let boards: Vec<serde_json::Value> =
            client.get("members/me/boards", &[("fields", "name")]).await.unwrap();
        assert!(boards.is_empty());
    }

    #[tokio::test]
    async fn error_status_becomes_board_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let client = TrelloClient::new("k".into(), "t".into(), "https://unused.invalid")
            .unwrap()
            .with_base_url(server.uri());
        let err = client
            .get::<serde_json::Value>("members/me/boards", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, LeadRelayError::Board { .. }));
        assert!(err.to_string().contains("401"));
    }
}
