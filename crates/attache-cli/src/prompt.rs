use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

/// Ask a yes/no question on stderr and read the answer from stdin. A "no"
/// is an error so the process exits non-zero.
pub fn require_confirmation(question: &str) -> Result<()> {
    require_confirmation_with(&mut io::stdin().lock(), &mut io::stderr(), question)
}

/// Anything other than `y`/`yes` counts as no.
pub fn confirm_with<R, W>(input: &mut R, out: &mut W, question: &str) -> Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{question} [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

pub fn require_confirmation_with<R, W>(input: &mut R, out: &mut W, question: &str) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    if !confirm_with(input, out, question)? {
        bail!("action aborted");
    }
    Ok(())
}
