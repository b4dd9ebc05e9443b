use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Clinic API unreachable: {0}")]
    Unreachable(String),

    #[error("Clinic API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed clinic API response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Transport and status failures, as opposed to a body that could not be decoded.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Malformed(_))
    }
}

/// JSON client for the clinic backend. Cloning is cheap and shares the
/// underlying connection pool.
#[derive(Clone)]
pub struct ClinicApiClient {
    client: Client,
    base_url: String,
}

impl ClinicApiClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.clinic_api_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            query: Option<&[(&str, &str)]>, body: Option<Value>)
                            -> Result<T, ApiError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers());

        if let Some(params) = query {
            req = req.query(params);
        }

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            ApiError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }

        serde_json::from_str::<T>(&text).map_err(|e| {
            error!("Could not decode response from {}: {}", url, e);
            ApiError::Malformed(e.to_string())
        })
    }

    pub async fn get<T>(&self, path: &str, query: Option<&[(&str, &str)]>) -> Result<T, ApiError>
    where T: DeserializeOwned {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post<T>(&self, path: &str, body: Value) -> Result<T, ApiError>
    where T: DeserializeOwned {
        self.request(Method::POST, path, None, Some(body)).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
