use std::time::Duration;

use reqwest::{header::ACCEPT, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    errors::{ErrorResponse, ServiceError},
    ApiEnvelope,
};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Shared HTTP client for the storefront REST API.
///
/// Every successful response is a `{ "data": ... }` envelope; the client
/// unwraps it so callers only see the payload type. Non-2xx responses are
/// turned into [`ServiceError`] through [`ServiceError::from_status`].
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Builds a client from application configuration.
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let client = Self::with_timeout(&config.api_base_url, config.api_timeout())?;
        Ok(match &config.api_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            auth_token: None,
        })
    }

    /// Attaches a bearer token obtained by the session layer.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ServiceError> {
        let url = self.endpoint(path)?;
        let request_id = Uuid::new_v4();
        debug!(%method, %url, %request_id, "dispatching API request");

        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string());

        Ok(match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let builder = self.request(Method::GET, path)?;
        self.send(builder).await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path)?.query(query);
        self.send(builder).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path)?.json(body);
        self.send(builder).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path)?.json(body);
        self.send(builder).await
    }

    /// `DELETE` whose response body, if any, is ignored.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ServiceError> {
        let builder = self.request(Method::DELETE, path)?;
        self.execute(builder).await.map(|_| ())
    }

    /// `DELETE` that answers with the updated resource.
    pub(crate) async fn delete_returning<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ServiceError> {
        let builder = self.request(Method::DELETE, path)?;
        self.send(builder).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ServiceError> {
        let response = self.execute(builder).await?;
        let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| {
            warn!(error = %e, "API response did not match the expected envelope");
            ServiceError::SerializationError(e.to_string())
        })?;
        Ok(envelope.data)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ServiceError> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "API request could not be completed");
            ServiceError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.json::<ErrorResponse>().await.ok();
        let err = ServiceError::from_status(status, body);
        warn!(status = status.as_u16(), %url, error = %err, "API request failed");
        Err(err)
    }
}

/// Ensures the base URL ends with `/` so relative joins keep its path.
fn normalize_base_url(raw: &str) -> Result<Url, ServiceError> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
