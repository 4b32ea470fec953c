use std::path::Path;
use std::sync::Arc;

use attache_core::{Attachment, Issue};
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Request, Response, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::auth::apply_auth;
use crate::error::error_messages;
use crate::{ApiPaths, AttachmentError, AuthType, ClientConfig, MultipartPayload, Transport};

/// The tracker refuses multipart uploads without this header (CSRF guard).
const ATLASSIAN_TOKEN: &str = "x-atlassian-token";

/// Async client for a tracker's attachment endpoints.
///
/// The installation flavor is resolved into [`ApiPaths`] once, here, so
/// individual calls never branch on it.
pub struct AttachmentClient {
    paths: ApiPaths,
    transport: Arc<dyn Transport>,
    auth_type: AuthType,
    login: String,
    token: Option<String>,
}

impl AttachmentClient {
    pub fn new(config: ClientConfig) -> Result<Self, AttachmentError> {
        let paths = ApiPaths::resolve(&config.server, config.installation)?;
        let transport = config.build_transport()?;
        debug!(
            "attachment client: base={} auth={}",
            paths.base(),
            config.auth_type
        );
        Ok(Self {
            paths,
            transport,
            auth_type: config.auth_type,
            login: config.login,
            token: config.token,
        })
    }

    pub fn paths(&self) -> &ApiPaths {
        &self.paths
    }

    /// A request for `url` carrying the configured credentials.
    pub(crate) fn request(&self, method: Method, url: Url) -> Request {
        let mut request = Request::new(method, url);
        apply_auth(
            request.headers_mut(),
            self.auth_type,
            &self.login,
            self.token.as_deref(),
        );
        request
    }

    pub(crate) async fn send(&self, request: Request) -> Result<Response, AttachmentError> {
        debug!("{} {}", request.method(), request.url());
        self.transport
            .execute(request)
            .await?
            .ok_or(AttachmentError::EmptyResponse)
    }

    /// Fetch an issue with only its attachment field populated.
    pub async fn get_issue(&self, issue_key: &str) -> Result<Issue, AttachmentError> {
        let mut url = self.paths.issue(issue_key)?;
        url.query_pairs_mut().append_pair("fields", "attachment");

        let resp = self.send(self.request(Method::GET, url)).await?;
        if resp.status() != StatusCode::OK {
            return Err(unexpected_response(resp).await);
        }
        decode_json(resp).await
    }

    /// Upload one file to an issue.
    ///
    /// The tracker may answer with several records (for example when it
    /// expands archives server-side), so all of them are returned.
    pub async fn upload(
        &self,
        issue_key: &str,
        path: &Path,
    ) -> Result<Vec<Attachment>, AttachmentError> {
        let payload = MultipartPayload::from_file(path).await?;
        let content_type = HeaderValue::from_str(&payload.content_type())
            .map_err(|e| AttachmentError::Encoding(format!("content type: {e}")))?;

        let url = self.paths.issue_attachments(issue_key)?;
        let mut request = self.request(Method::POST, url);
        request.headers_mut().insert(CONTENT_TYPE, content_type);
        request.headers_mut().insert(
            HeaderName::from_static(ATLASSIAN_TOKEN),
            HeaderValue::from_static("no-check"),
        );
        *request.body_mut() = Some(payload.into_body().into());

        let resp = self.send(request).await?;
        if resp.status() != StatusCode::OK {
            return Err(unexpected_response(resp).await);
        }
        let created: Vec<Attachment> = decode_json(resp).await?;
        info!(
            "uploaded {} to {issue_key} ({} attachment(s) created)",
            path.display(),
            created.len()
        );
        Ok(created)
    }

    /// Delete an attachment by ID. 200 and 204 both count as success.
    pub async fn delete(&self, attachment_id: &str) -> Result<(), AttachmentError> {
        let url = self.paths.attachment(attachment_id)?;
        let resp = self.send(self.request(Method::DELETE, url)).await?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                info!("deleted attachment {attachment_id}");
                Ok(())
            }
            _ => Err(unexpected_response(resp).await),
        }
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, AttachmentError> {
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn unexpected_response(resp: Response) -> AttachmentError {
    let status = resp.status();
    let body = resp.bytes().await.unwrap_or_default();
    AttachmentError::UnexpectedResponse {
        status,
        messages: error_messages(&body),
    }
}
