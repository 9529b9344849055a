// src/api/client.rs
//! HTTP gateway to the MOJi backend.
//!
//! This module is a thin wrapper around reqwest that dresses each request
//! the way the web client does: Parse fields in the body for Cloud
//! Functions, MOJi headers for REST resources, and a browser identity on
//! both. It handles authentication and transport only; envelope semantics
//! live in [`super::envelope`].

use super::{MojiGateway, RemoteCall};
use crate::constants::{
    BROWSER_ORIGIN, BROWSER_REFERER, BROWSER_USER_AGENT, CLIENT_OS, DEFAULT_API_BASE,
    DEFAULT_CLIENT_VERSION, DEFAULT_MOJI_APP_ID, DEFAULT_MOJI_APP_VERSION, DEFAULT_PARSE_SERVER,
    PARSE_APP_ID, RESOURCE_REFERER,
};
use crate::error::{excerpt, GatewayError};
use crate::types::{SessionToken, ValidationError};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// Base URLs of the two endpoint families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    parse_server: Url,
    api_base: Url,
}

impl ApiEndpoints {
    pub fn new(parse_server: &str, api_base: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            parse_server: parse_base_url(parse_server)?,
            api_base: parse_base_url(api_base)?,
        })
    }

    pub fn parse_server(&self) -> &Url {
        &self.parse_server
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn function_url(&self, name: &str) -> Result<Url, GatewayError> {
        extend_path(&self.parse_server, &["functions", name])
    }

    fn resource_url(&self, segments: &[String], query: &[(String, String)]) -> Result<Url, GatewayError> {
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let mut url = extend_path(&self.api_base, &segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self::new(DEFAULT_PARSE_SERVER, DEFAULT_API_BASE)
            .unwrap_or_else(|_| unreachable!("built-in endpoints are valid URLs"))
    }
}

fn parse_base_url(input: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(input.trim()).map_err(|e| ValidationError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::InvalidUrl {
            url: input.to_string(),
            reason: "Only HTTP and HTTPS URLs are supported".to_string(),
        });
    }
    if url.cannot_be_a_base() {
        return Err(ValidationError::InvalidUrl {
            url: input.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    Ok(url)
}

/// Appends path segments, percent-encoding each one.
fn extend_path(base: &Url, segments: &[&str]) -> Result<Url, GatewayError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GatewayError::InvalidUrl {
            base: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Identifiers of the client application the requests claim to come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub parse_app_id: String,
    pub moji_app_id: String,
    pub moji_app_version: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            parse_app_id: PARSE_APP_ID.to_string(),
            moji_app_id: DEFAULT_MOJI_APP_ID.to_string(),
            moji_app_version: DEFAULT_MOJI_APP_VERSION.to_string(),
        }
    }
}

/// Immutable per-run authentication bundle, applied to every call.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_token: SessionToken,
    pub installation_id: Option<String>,
    pub device_id: Option<String>,
    pub client_version: String,
    pub app: AppIdentity,
    pub endpoints: ApiEndpoints,
}

impl SessionContext {
    pub fn new(session_token: SessionToken) -> Self {
        Self {
            session_token,
            installation_id: None,
            device_id: None,
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            app: AppIdentity::default(),
            endpoints: ApiEndpoints::default(),
        }
    }

    /// Cloud Function body: caller params plus the fields the site's
    /// wrapper adds. Caller-supplied keys win.
    fn function_body(&self, params: Map<String, Value>) -> Map<String, Value> {
        let mut body = params;
        let mut set_default = |key: &str, value: &str| {
            body.entry(key.to_string())
                .or_insert_with(|| Value::String(value.to_string()));
        };
        set_default("_SessionToken", self.session_token.as_str());
        set_default("_ApplicationId", &self.app.parse_app_id);
        set_default("_ClientVersion", &self.client_version);
        set_default("g_os", CLIENT_OS);
        if let Some(installation_id) = &self.installation_id {
            set_default("_InstallationId", installation_id);
        }
        body
    }

    /// MOJi REST headers. The web app sends these on Parse calls too, which
    /// helps avoid edge blocks.
    fn moji_headers(&self, headers: &mut HeaderMap) -> Result<(), GatewayError> {
        let token = self.session_token.as_str();
        insert(headers, "x-moji-os", CLIENT_OS)?;
        insert(headers, "x-moji-app-version", &self.app.moji_app_version)?;
        insert(headers, "x-moji-app-id", &self.app.moji_app_id)?;
        insert(headers, "x-moji-token", token)?;
        insert(headers, "x-moji-session-id", token)?;
        if let Some(device_id) = &self.device_id {
            insert(headers, "x-moji-device-id", device_id)?;
        }
        Ok(())
    }

    fn function_headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ja,en-US;q=0.9,en;q=0.8"),
        );
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ORIGIN, HeaderValue::from_static(BROWSER_ORIGIN));
        headers.insert(header::REFERER, HeaderValue::from_static(BROWSER_REFERER));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        insert(&mut headers, "x-parse-application-id", &self.app.parse_app_id)?;
        insert(&mut headers, "x-parse-client-version", &self.client_version)?;
        insert(&mut headers, "x-parse-session-token", self.session_token.as_str())?;
        if let Some(installation_id) = &self.installation_id {
            insert(&mut headers, "x-parse-installation-id", installation_id)?;
        }
        self.moji_headers(&mut headers)?;
        Ok(headers)
    }

    fn resource_headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::ORIGIN, HeaderValue::from_static(BROWSER_ORIGIN));
        headers.insert(header::REFERER, HeaderValue::from_static(RESOURCE_REFERER));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        self.moji_headers(&mut headers)?;
        Ok(headers)
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), GatewayError> {
    let value = HeaderValue::from_str(value).map_err(|e| GatewayError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

/// reqwest-backed [`MojiGateway`].
#[derive(Clone)]
pub struct MojiHttpClient {
    client: Client,
    session: SessionContext,
}

impl MojiHttpClient {
    /// Creates a client with a fixed per-request timeout.
    pub fn new(session: SessionContext, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::transport("<client builder>", e))?;
        Ok(Self { client, session })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Makes a Cloud Function POST.
    pub async fn post_function(
        &self,
        name: &str,
        params: Map<String, Value>,
    ) -> Result<Value, GatewayError> {
        let url = self.session.endpoints.function_url(name)?;
        log::debug!("POST {}", url);

        let body = Value::Object(self.session.function_body(params));
        let response = self
            .client
            .post(url.clone())
            .headers(self.session.function_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::transport(url.as_str(), e))?;
        read_json(response, url.as_str()).await
    }

    /// Makes a REST GET.
    pub async fn get_json(
        &self,
        segments: &[String],
        query: &[(String, String)],
    ) -> Result<Value, GatewayError> {
        let url = self.session.endpoints.resource_url(segments, query)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .headers(self.session.resource_headers()?)
            .send()
            .await
            .map_err(|e| GatewayError::transport(url.as_str(), e))?;
        read_json(response, url.as_str()).await
    }
}

#[async_trait::async_trait]
impl MojiGateway for MojiHttpClient {
    async fn send(&self, call: RemoteCall) -> Result<Value, GatewayError> {
        match call {
            RemoteCall::Function { name, params } => self.post_function(&name, params).await,
            RemoteCall::Resource { segments, query } => self.get_json(&segments, &query).await,
        }
    }
}

/// Reads the body, mapping non-2xx statuses and non-JSON bodies to errors.
async fn read_json(response: Response, url: &str) -> Result<Value, GatewayError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| GatewayError::transport(url, e))?;

    if !status.is_success() {
        return Err(GatewayError::HttpStatus {
            status,
            url: url.to_string(),
            excerpt: excerpt(&text),
        });
    }

    serde_json::from_str(&text).map_err(|_| GatewayError::Protocol {
        url: url.to_string(),
        excerpt: excerpt(&text),
    })
}
