use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use super::Session;
use crate::config::{browse_url, issue_key};
use crate::prompt::require_confirmation;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Issue key, or a bare number with --project
    pub issue: String,

    /// Files to upload, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub no_input: bool,
}

/// Every path must name an existing regular file before anything is sent.
fn check_files(files: &[PathBuf]) -> Result<()> {
    for path in files {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("cannot access {}", path.display()))?;
        if !meta.is_file() {
            bail!("{} is not a regular file", path.display());
        }
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn run(session: &Session<'_>, args: &AddArgs) -> Result<()> {
    let key = issue_key(session.project, &args.issue);
    check_files(&args.files)?;

    if !args.no_input {
        let question = format!("Upload {} file(s) to {key}?", args.files.len());
        require_confirmation(&question)?;
    }

    // Stop at the first failure; earlier uploads stay on the issue.
    for path in &args.files {
        let created = session
            .client
            .upload(&key, path)
            .with_context(|| format!("failed to upload {}", path.display()))?;
        for attachment in &created {
            eprintln!(
                "Uploaded {} as attachment {}",
                display_name(path),
                attachment.id
            );
        }
    }

    println!("{}", browse_url(session.server, &key));
    Ok(())
}
