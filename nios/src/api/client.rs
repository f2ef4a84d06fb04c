use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tfplug::context::Context;

use super::common::{ApiErrorResponse, ApiQueryParams};
use super::error::ApiError;

pub const DEFAULT_WAPI_VERSION: &str = "2.13.6";

/// Connection settings for one NIOS grid master
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host_url: String,
    pub username: String,
    pub password: String,
    pub wapi_version: String,
    pub insecure: bool,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        host_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host_url: host_url.into(),
            username: username.into(),
            password: password.into(),
            wapi_version: DEFAULT_WAPI_VERSION.to_string(),
            insecure: false,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_wapi_version(mut self, version: impl Into<String>) -> Self {
        self.wapi_version = version.into();
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }
}

/// NIOS WAPI client
///
/// Cheap to clone; every clone shares one connection pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let host = url::Url::parse(config.host_url.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.host_url, e)))?;
        if !matches!(host.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                config.host_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let base_url = format!(
            "{}/wapi/v{}/",
            config.host_url.trim_end_matches('/'),
            config.wapi_version.trim_start_matches('v')
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                username: config.username,
                password: config.password,
            }),
        })
    }

    /// `<host>/wapi/v<version>/`
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path, params);
        self.execute(ctx, request, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &Context,
        path: &str,
        params: &ApiQueryParams,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path, params).json(body);
        self.execute(ctx, request, path).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        ctx: &Context,
        path: &str,
        params: &ApiQueryParams,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::PUT, path, params).json(body);
        self.execute(ctx, request, path).await
    }

    /// WAPI answers a delete with the deleted reference, which is discarded
    pub async fn delete(&self, ctx: &Context, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path, &ApiQueryParams::new());
        self.execute::<serde_json::Value>(ctx, request, path)
            .await
            .map(|_| ())
    }

    fn request(&self, method: Method, path: &str, params: &ApiQueryParams) -> RequestBuilder {
        let url = format!(
            "{}{}{}",
            self.inner.base_url,
            extract_resource_ref(path),
            params.to_query_string()
        );

        tracing::debug!("{} request to: {}", method, url);

        self.inner
            .http_client
            .request(method, url)
            .basic_auth(&self.inner.username, Some(&self.inner.password))
    }

    /// Sends the request unless `ctx` is cancelled first
    async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            tracing::debug!("Response status for {}: {}", path, status);

            if status.is_success() {
                return self.parse_success_response(response).await;
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(ApiError::AuthError);
            }

            self.handle_error_response(response, path).await
        };

        ctx.run(exchange).await.map_err(|_| ApiError::Cancelled)?
    }

    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    async fn handle_error_response<T>(
        &self,
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let details = serde_json::from_str::<ApiErrorResponse>(&text).ok();

        let not_found = status == StatusCode::NOT_FOUND
            || details.as_ref().is_some_and(|d| d.is_not_found());
        if not_found {
            return Err(ApiError::NotFound(extract_resource_ref(path)));
        }

        tracing::error!("API error response ({}): {}", status, text);

        let message = match &details {
            Some(d) if !d.text.is_empty() => d.text.clone(),
            _ => text,
        };

        Err(ApiError::ApiError {
            status: status.as_u16(),
            message,
            details: details.map(Box::new),
        })
    }
}

/// Normalizes a reference to its `<objtype>/<id>` form
///
/// Accepts bare references, references with a leading slash and full URLs
/// such as `https://gm/wapi/v2.13.6/filtermac/ZG5z:office`.
pub fn extract_resource_ref(reference: &str) -> String {
    let trimmed = match reference.find("/wapi/v") {
        Some(pos) => {
            let after = &reference[pos + "/wapi/v".len()..];
            match after.find('/') {
                Some(slash) => &after[slash + 1..],
                None => "",
            }
        }
        None => reference,
    };
    trimmed.trim_start_matches('/').to_string()
}
