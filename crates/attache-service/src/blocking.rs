use std::path::Path;

use attache_core::{Attachment, Issue};
use tokio::runtime::{Builder, Runtime};

use crate::{ApiPaths, AttachmentClient, AttachmentError, ClientConfig};

/// Blocking wrapper around the async `AttachmentClient`.
///
/// Owns a single-threaded tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the CLI. Must not be used from inside
/// another tokio runtime.
pub struct BlockingAttachmentClient {
    inner: AttachmentClient,
    rt: Runtime,
}

impl BlockingAttachmentClient {
    pub fn new(config: ClientConfig) -> Result<Self, AttachmentError> {
        let rt = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            inner: AttachmentClient::new(config)?,
            rt,
        })
    }

    pub fn paths(&self) -> &ApiPaths {
        self.inner.paths()
    }

    pub fn get_issue(&self, issue_key: &str) -> Result<Issue, AttachmentError> {
        self.rt.block_on(self.inner.get_issue(issue_key))
    }

    pub fn upload(&self, issue_key: &str, path: &Path) -> Result<Vec<Attachment>, AttachmentError> {
        self.rt.block_on(self.inner.upload(issue_key, path))
    }

    pub fn delete(&self, attachment_id: &str) -> Result<(), AttachmentError> {
        self.rt.block_on(self.inner.delete(attachment_id))
    }

    pub fn download(&self, url: &str, dest: &Path) -> Result<u64, AttachmentError> {
        self.rt.block_on(self.inner.download(url, dest))
    }
}
