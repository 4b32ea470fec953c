use std::io::{self, Write};

use anyhow::{Context, Result};
use attache_core::render::{render_csv, render_plain, render_table};
use attache_core::Attachment;
use clap::Args;

use super::Session;
use crate::config::issue_key;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Issue key, or a bare number with --project
    pub issue: String,

    /// Aligned columns without a header row
    #[arg(long, conflicts_with = "csv")]
    pub plain: bool,

    /// Comma separated output
    #[arg(long)]
    pub csv: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Plain,
    Csv,
}

impl ListArgs {
    pub fn format(&self) -> Format {
        if self.csv {
            Format::Csv
        } else if self.plain {
            Format::Plain
        } else {
            Format::Table
        }
    }
}

pub fn run(session: &Session<'_>, args: &ListArgs) -> Result<()> {
    let key = issue_key(session.project, &args.issue);
    let issue = session
        .client
        .get_issue(&key)
        .with_context(|| format!("failed to fetch issue {key}"))?;

    if issue.attachments().is_empty() {
        eprintln!("No attachments found for issue {key}");
        return Ok(());
    }
    render(&mut io::stdout().lock(), issue.attachments(), args.format())?;
    Ok(())
}

pub fn render<W: Write>(out: &mut W, attachments: &[Attachment], format: Format) -> io::Result<()> {
    match format {
        Format::Table => render_table(out, attachments),
        Format::Plain => render_plain(out, attachments),
        Format::Csv => render_csv(out, attachments),
    }
}
