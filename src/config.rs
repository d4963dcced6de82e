use crate::errors::{Error, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Everything one run needs: what to replace, where, and which files qualify.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The literal text to search for. Never empty.
    pub search: String,
    /// The literal replacement text. May be empty.
    pub replace: String,
    /// The directory whose tree is processed.
    pub root: PathBuf,
    /// Process dot-prefixed files and directories.
    pub include_hidden: bool,
    /// Accepted file suffixes, leading dot included. Empty accepts all.
    pub extensions: Vec<String>,
    /// Skip the confirmation prompt.
    pub force: bool,
    /// Announce skipped binary files.
    pub verbose: bool,
}

impl RunConfig {
    /// A configuration with the default filters: hidden paths excluded, every
    /// extension accepted, interactive confirmation.
    pub fn new(search: impl Into<String>, replace: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
            root: root.into(),
            include_hidden: false,
            extensions: Vec::new(),
            force: false,
            verbose: false,
        }
    }

    /// Rejects configurations that would make the run a no-op or cannot be walked.
    ///
    /// Runs before any traversal, so a rejected run touches no files.
    pub fn validate(&self) -> Result<()> {
        if self.search.is_empty() {
            return Err("search string must not be empty".into());
        }
        if self.search == self.replace {
            return Err(format!(
                "search and replace strings are identical ('{}'); nothing would change",
                self.search
            )
            .into());
        }
        if !self.root.is_dir() {
            return Err(format!("root '{}' is not a directory", self.root.display()).into());
        }
        Ok(())
    }

    /// Fills in values the command line left unset from a defaults file.
    ///
    /// Flags already switched on stay on; an explicit extension list on the command
    /// line replaces the file's list instead of extending it.
    pub fn apply_defaults(&mut self, defaults: &FileDefaults) {
        if self.extensions.is_empty() {
            if let Some(exts) = &defaults.extensions {
                self.extensions = exts.clone();
            }
        }
        self.include_hidden |= defaults.include_hidden.unwrap_or(false);
        self.verbose |= defaults.verbose.unwrap_or(false);
    }
}

/// Optional per-project defaults, loaded from a YAML file.
///
/// ```yaml
/// extensions: [".rs", ".toml"]
/// include_hidden: false
/// verbose: true
/// ```
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileDefaults {
    /// File suffixes to process when none are given on the command line.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// Process hidden paths.
    #[serde(default)]
    pub include_hidden: Option<bool>,
    /// Announce skipped binary files.
    #[serde(default)]
    pub verbose: Option<bool>,
}

/// A utility for locating and loading defaults files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Finds the defaults file by searching in a prioritized list of locations.
    ///
    /// The search order is:
    /// 1. The absolute path provided in `config_path`, if it exists.
    /// 2. A path relative to the current directory.
    /// 3. A path relative to the `root` being processed.
    /// 4. Inside the `~/.sar` directory.
    pub fn find_config(config_path: &Path, root: &Path) -> Result<PathBuf> {
        if config_path.is_absolute() && config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        if config_path.exists() {
            return Ok(config_path.to_path_buf());
        }

        let in_root = root.join(config_path);
        if in_root.exists() {
            return Ok(in_root);
        }

        let home_config = dirs::home_dir().map(|home| home.join(".sar").join(config_path));
        if let Some(candidate) = &home_config {
            if candidate.exists() {
                return Ok(candidate.clone());
            }
        }

        let mut tried_locations = vec![
            config_path.display().to_string(),
            in_root.display().to_string(),
        ];
        if let Some(candidate) = home_config {
            tried_locations.push(candidate.display().to_string());
        }

        Err(format!(
            "Config file '{}' not found. Searched in:\n  - {}",
            config_path.display(),
            tried_locations.join("\n  - ")
        )
        .into())
    }

    /// Loads `FileDefaults` from a YAML file.
    pub fn load_defaults(path: &Path) -> Result<FileDefaults> {
        let file = File::open(path).map_err(|source| Error::FileIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_reader(file).map_err(|source| Error::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}
