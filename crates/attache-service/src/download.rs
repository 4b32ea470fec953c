use std::path::Path;

use reqwest::{Method, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::info;
use url::Url;

use crate::{AttachmentClient, AttachmentError};

impl AttachmentClient {
    /// Stream the resource at `url` (an attachment's `content` link) into
    /// `dest`, returning the number of bytes written.
    ///
    /// `dest` is created, or truncated, only once the server has answered
    /// 200. Refusing to overwrite an existing file is the caller's decision.
    /// If the body stops mid-stream the error is returned and the partial
    /// file stays on disk for the caller to deal with.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, AttachmentError> {
        let url = Url::parse(url).map_err(|e| AttachmentError::InvalidUrl(format!("{url}: {e}")))?;
        let mut resp = self.send(self.request(Method::GET, url)).await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(AttachmentError::DownloadFailed { status });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        info!("downloaded {written} bytes to {}", dest.display());
        Ok(written)
    }
}
