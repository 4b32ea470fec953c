mod auth;
mod blocking;
mod config;
mod download;
mod error;
mod http;
mod multipart;
mod transport;

pub use auth::apply_auth;
pub use blocking::BlockingAttachmentClient;
pub use config::{ApiPaths, AuthType, ClientConfig, Installation, TlsConfig, DEFAULT_TIMEOUT};
pub use error::AttachmentError;
pub use http::AttachmentClient;
pub use multipart::MultipartPayload;
pub use transport::Transport;
