use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use attache_core::render::format_size;
use attache_core::{Attachment, Issue};
use clap::Args;

use super::Session;
use crate::config::issue_key;

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Issue key, or a bare number with --project
    pub issue: String,

    /// Name of the attachment to download
    pub filename: Option<String>,

    /// Download every attachment on the issue
    #[arg(long, conflicts_with_all = ["id", "filename"])]
    pub all: bool,

    /// Select the attachment by ID instead of name
    #[arg(long, conflicts_with = "filename")]
    pub id: Option<String>,

    /// Directory to write into (created when missing)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
enum Selection<'a> {
    All,
    Id(&'a str),
    Filename(&'a str),
}

impl DownloadArgs {
    fn selection(&self) -> Result<Selection<'_>> {
        if self.all {
            Ok(Selection::All)
        } else if let Some(id) = &self.id {
            Ok(Selection::Id(id))
        } else if let Some(name) = &self.filename {
            Ok(Selection::Filename(name))
        } else {
            bail!("specify a filename, --id or --all")
        }
    }
}

fn select<'a>(issue: &'a Issue, selection: &Selection<'_>) -> Result<Vec<&'a Attachment>> {
    let chosen = match selection {
        Selection::All if issue.attachments().is_empty() => {
            bail!("no attachments found for issue {}", issue.key)
        }
        Selection::All => issue.attachments().iter().collect(),
        Selection::Id(id) => vec![issue
            .find_by_id(id)
            .ok_or_else(|| anyhow!("attachment with ID {id} not found on issue {}", issue.key))?],
        Selection::Filename(name) => vec![issue
            .find_by_filename(name)
            .ok_or_else(|| anyhow!("attachment {name} not found on issue {}", issue.key))?],
    };
    Ok(chosen)
}

/// Where an attachment lands inside `dir`. Server-supplied names are
/// reduced to their last component so they cannot escape `dir`.
fn destination(dir: &Path, attachment: &Attachment) -> Result<PathBuf> {
    let name = Path::new(&attachment.filename)
        .file_name()
        .ok_or_else(|| anyhow!("attachment {} has no usable filename", attachment.id))?;
    Ok(dir.join(name))
}

pub fn run(session: &Session<'_>, args: &DownloadArgs) -> Result<()> {
    let selection = args.selection()?;
    let key = issue_key(session.project, &args.issue);
    let issue = session
        .client
        .get_issue(&key)
        .with_context(|| format!("failed to fetch issue {key}"))?;

    let chosen = select(&issue, &selection)?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    for attachment in chosen {
        let dest = destination(&args.output, attachment)?;
        if dest.exists() {
            bail!("{} already exists, refusing to overwrite", dest.display());
        }
        let written = session
            .client
            .download(&attachment.content, &dest)
            .with_context(|| format!("failed to download {}", attachment.filename))?;
        eprintln!("Downloaded {} ({})", dest.display(), format_size(written));
    }
    Ok(())
}
