use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::endpoints::PortalEndpoints;
use crate::constants::http;
use crate::errors::{RegistrarError, Result, TransportError};

/// Header set sent with a call, by kind of call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProfile {
    /// Browser navigation returning HTML
    Document,
    /// Url-encoded form post
    Form,
    /// JSON body and JSON response
    Json,
}

/// HTTP transport for one task. Cloning shares the cookie jar.
#[derive(Clone)]
pub struct PortalClient {
    http: Client,
    endpoints: Arc<PortalEndpoints>,
}

impl PortalClient {
    pub fn new(endpoints: PortalEndpoints) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(http::REQUEST_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .user_agent(http::USER_AGENT)
            .build()
            .map_err(|e| RegistrarError::request_failed("Building HTTP client", e))?;

        Ok(Self {
            http,
            endpoints: Arc::new(endpoints),
        })
    }

    pub fn endpoints(&self) -> &PortalEndpoints {
        &self.endpoints
    }

    fn request(&self, method: Method, url: &str, profile: HeaderProfile) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT_LANGUAGE, http::ACCEPT_LANGUAGE);

        match profile {
            HeaderProfile::Document => builder.header(ACCEPT, http::ACCEPT_DOCUMENT),
            HeaderProfile::Form => builder
                .header(ACCEPT, "*/*")
                .header(CONTENT_TYPE, http::FORM_CONTENT_TYPE),
            HeaderProfile::Json => builder
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json"),
        }
    }

    async fn send(&self, builder: RequestBuilder, operation: &str) -> Result<(StatusCode, String)> {
        let response = builder
            .send()
            .await
            .map_err(|e| RegistrarError::request_failed(operation, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RegistrarError::request_failed(operation, e))?;

        debug!("{} -> HTTP {} ({} bytes)", operation, status.as_u16(), body.len());
        Ok((status, body))
    }

    fn require_success(status: StatusCode, operation: &str) -> Result<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
            }
            .into())
        }
    }

    /// GET returning the body regardless of status
    pub async fn get_raw(
        &self,
        url: &str,
        query: &[(&str, &str)],
        profile: HeaderProfile,
        operation: &str,
    ) -> Result<(StatusCode, String)> {
        let builder = self.request(Method::GET, url, profile).query(query);
        self.send(builder, operation).await
    }

    pub async fn get_text(
        &self,
        url: &str,
        query: &[(&str, &str)],
        profile: HeaderProfile,
        operation: &str,
    ) -> Result<String> {
        let (status, body) = self.get_raw(url, query, profile, operation).await?;
        Self::require_success(status, operation)?;
        Ok(body)
    }

    pub async fn post_form(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
        operation: &str,
    ) -> Result<String> {
        let builder = self
            .request(Method::POST, url, HeaderProfile::Form)
            .query(query)
            .form(form);
        let (status, body) = self.send(builder, operation).await?;
        Self::require_success(status, operation)?;
        Ok(body)
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
        operation: &str,
    ) -> Result<String> {
        let body = serde_json::to_vec(payload).map_err(|e| RegistrarError::json(operation, e))?;
        let builder = self.request(Method::POST, url, HeaderProfile::Json).body(body);
        let (status, body) = self.send(builder, operation).await?;
        Self::require_success(status, operation)?;
        Ok(body)
    }

    pub async fn head(&self, url: &str, operation: &str) -> Result<()> {
        let response = self
            .request(Method::HEAD, url, HeaderProfile::Document)
            .send()
            .await
            .map_err(|e| RegistrarError::request_failed(operation, e))?;
        debug!("{} -> HTTP {}", operation, response.status().as_u16());
        Self::require_success(response.status(), operation)
    }
}

/// Decode a JSON response body, naming the call on failure
pub fn decode_json<T: DeserializeOwned>(body: &str, operation: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| RegistrarError::json(operation, e))
}
