use crate::config::RunConfig;
use crate::confirm::confirm;
use crate::errors::Result;
use crate::output_formatter::{OutputFormat, OutputFormatter};
use crate::replacer::{PassMode, PassReport, Replacer};
use std::io::{BufRead, Write};
use tracing::info;

/// How a run ended. Every variant is a successful exit.
#[derive(Debug)]
pub enum Outcome {
    /// The preview found nothing to change; no write pass ran.
    NoMatches(PassReport),
    /// The operator declined after the preview; no write pass ran.
    Declined(PassReport),
    /// The write pass ran after the preview.
    Written {
        preview: PassReport,
        written: PassReport,
    },
}

/// Runs preview, confirmation and write in sequence.
///
/// The configuration is validated before anything is walked. The write pass walks
/// and classifies the tree again from scratch instead of reusing the preview's file
/// list, so files added, removed or edited between the two passes are seen as they
/// are when the write pass reaches them.
pub fn run<R: BufRead, W: Write>(
    config: &RunConfig,
    format: OutputFormat,
    input: &mut R,
    out: &mut W,
) -> Result<Outcome> {
    config.validate()?;

    let replacer = Replacer::new(config)?;
    let formatter = OutputFormatter::new(format);

    let preview = replacer.run_pass(PassMode::Preview, out)?;
    formatter.write_summary(out, &preview)?;
    if preview.match_count() == 0 {
        return Ok(Outcome::NoMatches(preview));
    }

    if config.force {
        info!("Force mode: skipping confirmation");
    } else if !confirm(input, out)? {
        formatter.write_declined(out)?;
        return Ok(Outcome::Declined(preview));
    }

    let written = replacer.run_pass(PassMode::Write, out)?;
    formatter.write_summary(out, &written)?;
    Ok(Outcome::Written { preview, written })
}
