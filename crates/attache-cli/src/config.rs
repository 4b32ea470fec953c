use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use attache_service::{AuthType, ClientConfig, Installation, TlsConfig};
use clap::{Args, Parser, Subcommand};

use crate::commands::{add::AddArgs, download::DownloadArgs, list::ListArgs, remove::RemoveArgs};

#[derive(Debug, Parser)]
#[command(name = "attache", about = "Manage issue tracker attachments", version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Project key used to expand bare issue numbers (123 -> KEY-123)
    #[arg(long, short = 'p', env = "ATTACHE_PROJECT", global = true)]
    pub project: Option<String>,

    /// Log transfers to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Log every request to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List attachments on an issue
    #[command(visible_alias = "ls")]
    List(ListArgs),
    /// Download attachments from an issue
    #[command(visible_aliases = ["dl", "get"])]
    Download(DownloadArgs),
    /// Upload files to an issue
    #[command(visible_alias = "upload")]
    Add(AddArgs),
    /// Remove an attachment from an issue
    #[command(visible_aliases = ["rm", "delete", "del"])]
    Remove(RemoveArgs),
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Tracker base URL
    #[arg(long, env = "ATTACHE_SERVER", global = true)]
    pub server: Option<String>,

    /// Login name for basic auth
    #[arg(long, env = "ATTACHE_LOGIN", default_value = "", global = true)]
    pub login: String,

    /// API token or personal access token
    #[arg(long, env = "ATTACHE_API_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// basic, bearer or mtls
    #[arg(
        long,
        env = "ATTACHE_AUTH_TYPE",
        default_value = "basic",
        global = true
    )]
    pub auth_type: AuthType,

    /// cloud (REST v3) or local (REST v2)
    #[arg(
        long,
        env = "ATTACHE_INSTALLATION",
        default_value = "cloud",
        global = true
    )]
    pub installation: Installation,

    /// Seconds to wait for a connection or for more data
    #[arg(long, env = "ATTACHE_TIMEOUT", default_value = "15", global = true)]
    pub timeout: u64,

    /// Extra CA certificate (PEM)
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Client certificate for mutual TLS (PEM)
    #[arg(long, global = true)]
    pub client_cert: Option<PathBuf>,

    /// Private key for the client certificate (PEM)
    #[arg(long, global = true)]
    pub client_key: Option<PathBuf>,
}

impl ConnectionArgs {
    pub fn server(&self) -> Result<&str> {
        match self.server.as_deref().map(str::trim) {
            Some(server) if !server.is_empty() => Ok(server.trim_end_matches('/')),
            _ => bail!("no tracker server configured (use --server or ATTACHE_SERVER)"),
        }
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(self.server()?)
            .with_installation(self.installation)
            .with_timeout(Duration::from_secs(self.timeout));
        config.auth_type = self.auth_type;
        config.login = self.login.clone();
        config.token = self.token.clone();

        if self.auth_type == AuthType::Mtls && self.client_cert.is_none() {
            bail!("mtls auth needs --client-cert");
        }
        if self.ca_cert.is_some() || self.client_cert.is_some() {
            config.tls = Some(TlsConfig {
                ca_cert: self.ca_cert.clone(),
                client_cert: self.client_cert.clone(),
                client_key: self.client_key.clone(),
            });
        }
        Ok(config)
    }
}

/// Expand a bare issue number with the project key; otherwise upper-case it.
pub fn issue_key(project: Option<&str>, raw: &str) -> String {
    let raw = raw.trim();
    match project.map(str::trim).filter(|p| !p.is_empty()) {
        Some(project) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{}-{raw}", project.to_uppercase())
        }
        _ => raw.to_uppercase(),
    }
}

/// Web page for an issue, printed after changes.
pub fn browse_url(server: &str, issue_key: &str) -> String {
    format!("{}/browse/{issue_key}", server.trim_end_matches('/'))
}
