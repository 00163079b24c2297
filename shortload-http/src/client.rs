//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpMethod, HttpRequest, HttpResponse};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect, Client,
};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, trace};

/// HTTP client trait the workload sends its requests through
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// HTTP Manager backed by `reqwest`, with offline mock support
///
/// Two clients are built up front and share nothing but configuration: one
/// follows redirects up to `max_redirects`, the other never does. Requests
/// pick one by their `follow_redirects` flag, so connection pools are reused
/// across every virtual user.
#[derive(Debug, Clone)]
pub struct HttpManager {
    offline: bool,
    mocks: HashMap<String, HttpResponse>,
    config: HttpConfig,
    following: Client,
    direct: Client,
}

impl HttpManager {
    /// Create a new HttpManager in online mode with default configuration
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a new HttpManager with specific configuration
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HttpManager with timeout: {}s, max redirects: {}",
            config.timeout.as_secs(),
            config.max_redirects
        );
        let following = Self::build_client(
            &config,
            redirect::Policy::limited(config.max_redirects as usize),
        )?;
        let direct = Self::build_client(&config, redirect::Policy::none())?;

        Ok(Self {
            offline: false,
            mocks: HashMap::new(),
            config,
            following,
            direct,
        })
    }

    fn build_client(config: &HttpConfig, policy: redirect::Policy) -> Result<Client, HttpError> {
        Ok(Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(policy)
            .build()?)
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Set offline mode
    pub fn set_offline(&mut self) {
        self.offline = true;
        debug!("HttpManager set to offline mode");
    }

    /// Add a single HTTP mock, served for `method` requests to `url` or any
    /// URL below it
    pub fn add_mock(&mut self, method: HttpMethod, url: &str, response: HttpResponse) {
        let key = format!("{}:{}", method.as_str(), url);
        self.mocks.insert(key, response);
        debug!("Added HTTP mock for {} {}", method, url);
    }

    /// Clear all mocks
    pub fn clear_mocks(&mut self) {
        self.mocks.clear();
        debug!("Cleared all HTTP mocks");
    }

    fn mock_response(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let key = request.mock_key();
        if let Some(response) = self.mocks.get(&key) {
            trace!("Found matching mock response for {}", key);
            return Ok(response.clone());
        }

        // Longest registered prefix wins, so `GET:http://svc` covers `GET:http://svc/<token>`
        let prefix_match = self
            .mocks
            .iter()
            .filter(|(mock_key, _)| {
                key.starts_with(mock_key.as_str())
                    && key[mock_key.len()..].starts_with('/')
            })
            .max_by_key(|(mock_key, _)| mock_key.len());

        match prefix_match {
            Some((mock_key, response)) => {
                trace!("Found prefix mock {} for {}", mock_key, key);
                Ok(response.clone())
            }
            None => {
                debug!("No matching mock response found for {}", key);
                Err(HttpError::MockNotFound(key))
            }
        }
    }

    fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, HttpError> {
        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (key, value) in headers {
            let header_name = HeaderName::from_str(key)
                .map_err(|_| HttpError::InvalidHeaderName(key.to_string()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| HttpError::InvalidHeaderValue(key.to_string()))?;
            header_map.insert(header_name, header_value);
        }
        Ok(header_map)
    }
}

#[async_trait::async_trait]
impl HttpClient for HttpManager {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        if self.offline {
            return self.mock_response(&request);
        }

        reqwest::Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        let client = if request.follow_redirects {
            &self.following
        } else {
            &self.direct
        };

        trace!("Building {} request to {}", request.method, request.url);
        let mut builder = client
            .request(reqwest::Method::from(request.method), &request.url)
            .headers(Self::header_map(&request.headers)?);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.text().await?;
        trace!(
            "{} {} -> {} ({} bytes)",
            request.method,
            request.url,
            status,
            body.len()
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
