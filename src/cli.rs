use crate::config::{ConfigLoader, RunConfig};
use crate::errors::Result;
use crate::output_formatter::OutputFormat;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// Recursive search-and-replace with a preview.
///
/// `sar` shows every line that would change under a directory, asks for
/// confirmation, and then rewrites the matching files in place.
#[derive(Parser, Debug)]
#[command(
    name = "sar",
    author,
    version,
    about = "Recursive literal search-and-replace with preview and confirmation",
    long_about = "sar - replace a literal string in every text file under a directory.

The tree is walked twice: once to preview every changed line, and, after you
answer 'y' to the prompt, once more to write the changes. Binary files (any
NUL byte) and hidden paths are skipped. Files are overwritten in place with
no backup.

EXAMPLES:
  sar \"my-app\" \"my-new-app\" ./my-folder -x .go -x .html
  sar --force \"my-app\" \"my-new-app\" ./my-folder
  sar --verbose \"my-app\" \"my-new-app\" ./my-folder
  sar --include-hidden \"my-app\" \"my-new-app\" ./my-folder"
)]
pub struct Args {
    /// The literal text to search for.
    pub search: String,

    /// The text to put in its place. May be empty.
    pub replace: String,

    /// The directory to process recursively.
    pub root: PathBuf,

    /// Make the replacements without asking for confirmation.
    #[arg(short, long)]
    pub force: bool,

    /// Announce skipped binary files and log each decision to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Also process hidden files and directories (names starting with '.').
    #[arg(long)]
    pub include_hidden: bool,

    /// Only process files with this suffix, including the dot (e.g. `.go`).
    /// Repeatable; also accepts a comma-separated list.
    #[arg(short = 'x', long = "extension", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// The format of the summary printed after each pass.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// A YAML file with default extensions, include_hidden and verbose settings.
    #[arg(short, long, env = "SAR_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Builds the run configuration, merging in the defaults file when one is named.
    pub fn into_run_config(self) -> Result<(RunConfig, OutputFormat)> {
        let mut config = RunConfig {
            search: self.search,
            replace: self.replace,
            root: self.root,
            include_hidden: self.include_hidden,
            extensions: normalize_extensions(self.extensions),
            force: self.force,
            verbose: self.verbose,
        };

        if let Some(config_path) = self.config {
            let resolved = ConfigLoader::find_config(&config_path, &config.root)?;
            let defaults = ConfigLoader::load_defaults(&resolved)?;
            config.apply_defaults(&defaults);
            config.extensions = normalize_extensions(std::mem::take(&mut config.extensions));
        }

        Ok((config, self.format))
    }
}

/// Trims whitespace and drops empty entries. Suffixes are matched exactly, so an
/// entry without a leading dot is kept as-is but flagged.
fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|ext| ext.trim().to_string())
        .filter(|ext| !ext.is_empty())
        .inspect(|ext| {
            if !ext.starts_with('.') {
                warn!("Extension '{ext}' has no leading dot and will not match any file suffix");
            }
        })
        .collect()
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
