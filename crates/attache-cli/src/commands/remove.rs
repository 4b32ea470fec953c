use anyhow::{anyhow, Context, Result};
use clap::Args;

use super::Session;
use crate::config::{browse_url, issue_key};
use crate::prompt::require_confirmation;

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Issue key, or a bare number with --project
    pub issue: String,

    /// ID of the attachment to delete
    pub attachment_id: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub no_input: bool,
}

pub fn run(session: &Session<'_>, args: &RemoveArgs) -> Result<()> {
    let key = issue_key(session.project, &args.issue);
    let id = args.attachment_id.trim();

    // The delete endpoint takes any ID, so make sure it belongs to this issue.
    let issue = session
        .client
        .get_issue(&key)
        .with_context(|| format!("failed to fetch issue {key}"))?;
    let attachment = issue
        .find_by_id(id)
        .ok_or_else(|| anyhow!("attachment with ID {id} not found on issue {key}"))?;

    if !args.no_input {
        let question = format!("Delete {} ({id}) from {key}?", attachment.filename);
        require_confirmation(&question)?;
    }

    session
        .client
        .delete(id)
        .with_context(|| format!("failed to delete attachment {id}"))?;
    eprintln!("Removed {} from {key}", attachment.filename);
    println!("{}", browse_url(session.server, &key));
    Ok(())
}
