// request handling follows the third party API client design from
// https://github.com/oxidecomputer/third-party-api-clients/tree/main
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::api::{
    ApiError, ApiResult, DeployHandle, HostingApi, Manifest, RemoteSite, SitePatch,
};

pub const DEFAULT_API_URL: &str = "https://api.netlify.com/api/v1";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("sitesmith/", env!("CARGO_PKG_VERSION"));

mod support {
    use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

    const PATH_SET: &AsciiSet = &CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'#')
        .add(b'%')
        .add(b'<')
        .add(b'>')
        .add(b'?')
        .add(b'`')
        .add(b'{')
        .add(b'}');

    /// Encodes a relative path keeping `/` separators intact.
    pub(crate) fn encode_path(pc: &str) -> String {
        utf8_percent_encode(pc, PATH_SET).to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Transport(error.to_string())
        }
    }
}

#[derive(Debug, Default)]
struct Message {
    body: Option<reqwest::Body>,
    content_type: Option<MediaType>,
}

impl Message {
    fn json<T: Serialize>(value: &T) -> ApiResult<Self> {
        let body = serde_json::to_vec(value).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(Self {
            body: Some(body.into()),
            content_type: Some(MediaType::Json),
        })
    }

    fn bytes(content: Vec<u8>) -> Self {
        Self {
            body: Some(content.into()),
            content_type: Some(MediaType::OctetStream),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
enum MediaType {
    #[default]
    Json,
    OctetStream,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MediaType::Json => write!(f, "application/json"),
            MediaType::OctetStream => write!(f, "application/octet-stream"),
        }
    }
}

/// Personal access token used as a bearer token.
#[derive(PartialEq, Clone)]
pub enum Credentials {
    Token(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token(value) => f
                .debug_tuple("Credentials::Token")
                .field(&"*".repeat(value.len()))
                .finish(),
        }
    }
}

/// Client for the Netlify REST API.
#[derive(Clone)]
pub struct NetlifyClient {
    host: String,
    client: reqwest::Client,
    credentials: Option<Credentials>,
}

impl NetlifyClient {
    pub fn new<H, C>(host: H, credentials: C, timeout: Duration) -> ApiResult<Self>
    where
        H: Into<String>,
        C: Into<Option<Credentials>>,
    {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            host: host.into().trim_end_matches('/').to_string(),
            client: http,
            credentials: credentials.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    async fn request(&self, method: Method, path: &str, message: Message) -> ApiResult<Vec<u8>> {
        let mut req = self
            .client
            .request(method.clone(), self.url(path))
            .header(ACCEPT, MediaType::Json.to_string());

        if let Some(content_type) = message.content_type {
            req = req.header(CONTENT_TYPE, content_type.to_string());
        }

        if let Some(Credentials::Token(token)) = &self.credentials {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        if let Some(body) = message.body {
            req = req.body(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let response_body = response.bytes().await?;

        if status.is_success() {
            debug!(%method, path, status = status.as_u16(), "received successful response");
            return Ok(response_body.to_vec());
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        let body = if response_body.is_empty() {
            "empty response".to_string()
        } else {
            String::from_utf8_lossy(&response_body).into_owned()
        };
        error!(%method, path, status = status.as_u16(), body, "request failed");

        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn request_entity<D>(&self, method: Method, path: &str, message: Message) -> ApiResult<D>
    where
        D: DeserializeOwned,
    {
        let body = self.request(method, path, message).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl HostingApi for NetlifyClient {
    async fn list_sites(&self) -> ApiResult<Vec<RemoteSite>> {
        self.request_entity(Method::GET, "/sites", Message::default())
            .await
    }

    async fn create_site(&self, name: &str) -> ApiResult<RemoteSite> {
        let message = Message::json(&serde_json::json!({ "name": name }))?;
        match self.request_entity(Method::POST, "/sites", message).await {
            Err(ApiError::Status { status, body })
                if status == StatusCode::UNPROCESSABLE_ENTITY.as_u16()
                    && body.contains("already in use") =>
            {
                Err(ApiError::NameTaken(name.to_string()))
            }
            other => other,
        }
    }

    async fn get_site(&self, site_id: &str) -> ApiResult<RemoteSite> {
        let path = format!("/sites/{}", support::encode_path(site_id));
        self.request_entity(Method::GET, &path, Message::default())
            .await
    }

    async fn update_site(&self, site_id: &str, patch: &SitePatch) -> ApiResult<()> {
        let path = format!("/sites/{}", support::encode_path(site_id));
        self.request(Method::PATCH, &path, Message::json(patch)?)
            .await
            .map(|_| ())
    }

    async fn create_deploy(&self, site_id: &str, manifest: &Manifest) -> ApiResult<DeployHandle> {
        let path = format!("/sites/{}/deploys", support::encode_path(site_id));
        let message = Message::json(&serde_json::json!({ "files": manifest }))?;
        self.request_entity(Method::POST, &path, message).await
    }

    async fn upload_file(&self, deploy_id: &str, path: &str, content: Vec<u8>) -> ApiResult<()> {
        let path = format!(
            "/deploys/{}/files/{}",
            support::encode_path(deploy_id),
            support::encode_path(path.trim_start_matches('/'))
        );
        self.request(Method::PUT, &path, Message::bytes(content))
            .await
            .map(|_| ())
    }

    async fn add_domain(&self, site_id: &str, hostname: &str) -> ApiResult<()> {
        let path = format!("/sites/{}/domains", support::encode_path(site_id));
        let message = Message::json(&serde_json::json!({ "hostname": hostname }))?;
        self.request(Method::POST, &path, message).await.map(|_| ())
    }

    async fn set_primary_domain(&self, site_id: &str, hostname: &str) -> ApiResult<()> {
        let path = format!(
            "/sites/{}/domain_aliases/{}/primary",
            support::encode_path(site_id),
            support::encode_path(hostname)
        );
        self.request(Method::POST, &path, Message::default())
            .await
            .map(|_| ())
    }

    async fn restore_deploy(&self, site_id: &str, deploy_id: &str) -> ApiResult<()> {
        let path = format!(
            "/sites/{}/deploys/{}/restore",
            support::encode_path(site_id),
            support::encode_path(deploy_id)
        );
        self.request(Method::POST, &path, Message::default())
            .await
            .map(|_| ())
    }
}
