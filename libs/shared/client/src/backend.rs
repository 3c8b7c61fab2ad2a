use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::ApiResponse;

use crate::error::ClientError;

/// HTTP/JSON client for the administration backend.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers()?);

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("API error ({}): {}", status, text);
            return Err(ClientError::Http { status, body: text });
        }

        Ok(text)
    }

    /// Issues a request and unwraps the `data` field of the response envelope.
    /// A successful response without `data` yields `None`.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let text = self.send(method, path, query, body).await?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
        Ok(envelope.into_data())
    }

    /// Issues a request whose response body is irrelevant beyond its status.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(), ClientError> {
        self.send(method, path, &[], body).await.map(|_| ())
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
