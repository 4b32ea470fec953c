use async_trait::async_trait;
use reqwest::{Client, Request, Response};

/// Executes one prepared HTTP request.
///
/// `reqwest::Client` is the production implementation. Custom transports
/// (TLS or proxy wrappers, test doubles) plug in through
/// [`crate::ClientConfig::with_transport`]. `Ok(None)` means the transport
/// produced no response and no error; callers treat it as
/// [`crate::AttachmentError::EmptyResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Option<Response>, reqwest::Error>;
}

#[async_trait]
impl Transport for Client {
    async fn execute(&self, request: Request) -> Result<Option<Response>, reqwest::Error> {
        Client::execute(self, request).await.map(Some)
    }
}
