pub mod add;
pub mod download;
pub mod list;
pub mod remove;

use attache_service::BlockingAttachmentClient;

/// Shared state handed to every subcommand.
pub struct Session<'a> {
    pub client: &'a BlockingAttachmentClient,
    pub server: &'a str,
    pub project: Option<&'a str>,
}
