use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Certificate, Client, Identity};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{AttachmentError, Transport};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// How outgoing requests are authenticated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Basic,
    Bearer,
    Mtls,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Basic => "basic",
            AuthType::Bearer => "bearer",
            AuthType::Mtls => "mtls",
        }
    }
}

impl FromStr for AuthType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "basic" => Ok(AuthType::Basic),
            "bearer" => Ok(AuthType::Bearer),
            "mtls" => Ok(AuthType::Mtls),
            other => Err(format!(
                "unknown auth type {other:?} (expected basic, bearer or mtls)"
            )),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor-hosted (`cloud`, REST v3) or self-hosted (`local`, REST v2) tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Installation {
    #[default]
    Cloud,
    Local,
}

impl Installation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Installation::Cloud => "cloud",
            Installation::Local => "local",
        }
    }

    /// REST API generation spoken by this flavor.
    pub fn api_version(&self) -> &'static str {
        match self {
            Installation::Cloud => "3",
            Installation::Local => "2",
        }
    }
}

impl FromStr for Installation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "cloud" => Ok(Installation::Cloud),
            "local" => Ok(Installation::Local),
            other => Err(format!(
                "unknown installation {other:?} (expected cloud or local)"
            )),
        }
    }
}

impl fmt::Display for Installation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side TLS material, all PEM encoded.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Extra root certificate for self-signed or private CAs.
    pub ca_cert: Option<PathBuf>,
    /// Client certificate presented for mutual TLS.
    pub client_cert: Option<PathBuf>,
    /// Private key matching `client_cert`.
    pub client_key: Option<PathBuf>,
}

/// Everything the client needs to talk to one tracker.
///
/// Built once at startup and handed to [`crate::AttachmentClient::new`].
#[derive(Clone)]
pub struct ClientConfig {
    pub server: String,
    pub login: String,
    pub token: Option<String>,
    pub auth_type: AuthType,
    pub installation: Installation,
    /// Limit for connecting and for each wait on the socket. A transfer that
    /// keeps making progress may take longer than this overall.
    pub timeout: Duration,
    pub tls: Option<TlsConfig>,
    /// Replaces the default reqwest client, e.g. in tests.
    pub transport: Option<Arc<dyn Transport>>,
}

impl ClientConfig {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.trim_end_matches('/').to_string(),
            login: String::new(),
            token: None,
            auth_type: AuthType::default(),
            installation: Installation::default(),
            timeout: DEFAULT_TIMEOUT,
            tls: None,
            transport: None,
        }
    }

    pub fn with_basic_auth(mut self, login: &str, token: &str) -> Self {
        self.auth_type = AuthType::Basic;
        self.login = login.to_string();
        self.token = Some(token.to_string());
        self
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.auth_type = AuthType::Bearer;
        self.token = Some(token.to_string());
        self
    }

    pub fn with_installation(mut self, installation: Installation) -> Self {
        self.installation = installation;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The injected transport, or a reqwest client carrying the configured
    /// timeout and TLS material.
    pub(crate) fn build_transport(&self) -> Result<Arc<dyn Transport>, AttachmentError> {
        if let Some(transport) = &self.transport {
            return Ok(transport.clone());
        }

        let mut builder = Client::builder()
            .use_rustls_tls()
            .connect_timeout(self.timeout)
            .read_timeout(self.timeout);
        if let Some(tls) = &self.tls {
            if let Some(ca) = &tls.ca_cert {
                let pem = read_pem(ca)?;
                builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
            }
            if let Some(cert) = &tls.client_cert {
                let mut pem = read_pem(cert)?;
                if let Some(key) = &tls.client_key {
                    pem.push(b'\n');
                    pem.extend(read_pem(key)?);
                }
                builder = builder.identity(Identity::from_pem(&pem)?);
            }
        }
        Ok(Arc::new(builder.build()?))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server", &self.server)
            .field("login", &self.login)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("auth_type", &self.auth_type)
            .field("installation", &self.installation)
            .field("timeout", &self.timeout)
            .field("tls", &self.tls)
            .field(
                "transport",
                &self.transport.as_ref().map(|_| "<custom>"),
            )
            .finish()
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, AttachmentError> {
    std::fs::read(path).map_err(|e| AttachmentError::from_file_io(path, e))
}

/// REST endpoints for one installation flavor, resolved once from the server
/// URL. Issue keys and attachment IDs are appended as encoded path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPaths {
    base: Url,
}

impl ApiPaths {
    pub fn resolve(server: &str, installation: Installation) -> Result<Self, AttachmentError> {
        let mut base = Url::parse(server)
            .map_err(|e| AttachmentError::InvalidUrl(format!("{server}: {e}")))?;
        base.path_segments_mut()
            .map_err(|()| AttachmentError::InvalidUrl(format!("{server}: not a base url")))?
            .pop_if_empty()
            .extend(["rest", "api", installation.api_version()]);
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/issue/{key}`
    pub fn issue(&self, key: &str) -> Result<Url, AttachmentError> {
        self.join(&["issue", key])
    }

    /// `{base}/issue/{key}/attachments`
    pub fn issue_attachments(&self, key: &str) -> Result<Url, AttachmentError> {
        self.join(&["issue", key, "attachments"])
    }

    /// `{base}/attachment/{id}`
    pub fn attachment(&self, id: &str) -> Result<Url, AttachmentError> {
        self.join(&["attachment", id])
    }

    fn join(&self, segments: &[&str]) -> Result<Url, AttachmentError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AttachmentError::InvalidUrl(self.base.to_string()))?
            .extend(segments);
        Ok(url)
    }
}
