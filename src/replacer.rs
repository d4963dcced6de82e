use crate::classifier::{Classification, Classifier};
use crate::config::RunConfig;
use crate::errors::{Error, Result};
use crate::file_io::{file_changed, read_file, write_file};
use colored::Colorize;
use regex::bytes::{NoExpand, Regex};
use serde::Serialize;
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Whether a pass only shows what would change or actually rewrites files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassMode {
    /// Render a line diff of every file that would change; touch nothing.
    Preview,
    /// Overwrite every file whose content changes.
    Write,
}

/// What one pass over the tree observed.
///
/// Each pass builds its own report from scratch; nothing is carried over from an
/// earlier pass, so the write pass re-derives everything from the files as they are
/// at that moment.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub mode: PassMode,
    /// Files whose content would change (preview) or did change (write), in walk order.
    pub changed_files: Vec<PathBuf>,
    /// Non-directory entries seen, whether or not they were eligible.
    pub files_visited: usize,
    /// Eligible-by-path files skipped because they contain a NUL byte.
    pub binary_skipped: usize,
}

impl PassReport {
    fn new(mode: PassMode) -> Self {
        Self {
            mode,
            changed_files: Vec::new(),
            files_visited: 0,
            binary_skipped: 0,
        }
    }

    /// The number of files whose content differs before and after substitution.
    pub fn match_count(&self) -> usize {
        self.changed_files.len()
    }
}

/// One line index at which the old and new content disagree.
///
/// `None` means the line does not exist on that side, which happens when the
/// replacement adds or removes newlines.
#[derive(Debug, PartialEq, Eq)]
pub struct ChangedLine<'a> {
    pub index: usize,
    pub old: Option<&'a [u8]>,
    pub new: Option<&'a [u8]>,
}

/// Core engine for literal search-and-replace over a directory tree.
pub struct Replacer {
    search: String,
    replace: String,
    matcher: Regex,
    classifier: Classifier,
    root: PathBuf,
    verbose: bool,
}

impl Replacer {
    /// Creates a new `Replacer` from a validated `RunConfig`.
    ///
    /// The search text is escaped, so the matcher only ever finds the literal bytes.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let matcher = Regex::new(&regex::escape(&config.search))?;
        Ok(Self {
            search: config.search.clone(),
            replace: config.replace.clone(),
            matcher,
            classifier: Classifier::new(config.include_hidden, config.extensions.clone()),
            root: config.root.clone(),
            verbose: config.verbose,
        })
    }

    /// Replaces every non-overlapping occurrence of the search text, left to right.
    ///
    /// Inserted text is never rescanned. Returns the input unchanged (borrowed) when
    /// there is no occurrence at all.
    pub fn substitute<'a>(&self, content: &'a [u8]) -> Cow<'a, [u8]> {
        self.matcher
            .replace_all(content, NoExpand(self.replace.as_bytes()))
    }

    /// Walks the tree once and processes every non-directory entry.
    ///
    /// The first traversal or file error stops the pass; files already written in
    /// write mode stay written.
    pub fn run_pass<W: Write>(&self, mode: PassMode, out: &mut W) -> Result<PassReport> {
        info!(
            "Starting {:?} pass over {} for '{}'",
            mode,
            self.root.display(),
            self.search
        );
        let mut report = PassReport::new(mode);

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !entry.file_type().is_dir()
                    || self.classifier.should_descend(entry.path(), &self.root)
            });

        for entry in walker {
            let entry = entry.map_err(|e| Error::walk(&self.root, e))?;
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            report.files_visited += 1;
            if !path.is_file() {
                debug!("Skipping {}: not a regular file", path.display());
                continue;
            }

            if self.process_file(path, mode, &mut report, out)? {
                report.changed_files.push(path.to_path_buf());
            }
        }

        info!(
            "{:?} pass finished: {} visited, {} changed, {} binary skipped",
            mode,
            report.files_visited,
            report.match_count(),
            report.binary_skipped
        );
        Ok(report)
    }

    /// Classifies, substitutes and then previews or writes a single file.
    ///
    /// Returns `true` if the file counts towards the pass's match count.
    fn process_file<W: Write>(
        &self,
        path: &Path,
        mode: PassMode,
        report: &mut PassReport,
        out: &mut W,
    ) -> Result<bool> {
        match self.classifier.classify(path, &self.root)? {
            Classification::Eligible => {}
            Classification::Binary => {
                report.binary_skipped += 1;
                if self.verbose {
                    writeln!(out, "Skipping binary file: {}", path.display())?;
                }
                return Ok(false);
            }
            other => {
                debug!("Skipping {}: {:?}", path.display(), other);
                return Ok(false);
            }
        }

        let content = read_file(path)?;
        let new_content = self.substitute(&content);
        if !file_changed(&content, &new_content) {
            return Ok(false);
        }

        match mode {
            PassMode::Write => {
                write_file(path, &new_content)?;
                debug!("Wrote {}", path.display());
                Ok(true)
            }
            PassMode::Preview => {
                let lines = changed_lines(&content, &new_content);
                self.render_preview(path, &lines, out)?;
                Ok(!lines.is_empty())
            }
        }
    }

    /// Prints the path once, then every differing line pair with the terms highlighted.
    fn render_preview<W: Write>(
        &self,
        path: &Path,
        lines: &[ChangedLine<'_>],
        out: &mut W,
    ) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }

        writeln!(out, "{}", path.display().to_string().blue().bold())?;
        for line in lines {
            if let Some(old) = line.old {
                writeln!(
                    out,
                    "{} {}",
                    "-".red(),
                    highlight(old, &self.search, |term| term.red().bold().to_string())
                )?;
            }
            if let Some(new) = line.new {
                writeln!(
                    out,
                    "{} {}",
                    "+".green(),
                    highlight(new, &self.replace, |term| term.green().bold().to_string())
                )?;
            }
        }
        Ok(())
    }
}

/// Compares the two buffers line by line, by position.
///
/// Lines are split on `\n`. Indexes past the end of the shorter side compare
/// unequal to whatever the longer side holds there.
pub fn changed_lines<'a>(old: &'a [u8], new: &'a [u8]) -> Vec<ChangedLine<'a>> {
    let old_lines: Vec<&[u8]> = old.split(|&b| b == b'\n').collect();
    let new_lines: Vec<&[u8]> = new.split(|&b| b == b'\n').collect();
    let len = old_lines.len().max(new_lines.len());

    (0..len)
        .filter_map(|index| {
            let old = old_lines.get(index).copied();
            let new = new_lines.get(index).copied();
            (old != new).then_some(ChangedLine { index, old, new })
        })
        .collect()
}

/// Wraps every occurrence of `term` in `line` with `paint`.
fn highlight(line: &[u8], term: &str, paint: impl Fn(&str) -> String) -> String {
    let line = String::from_utf8_lossy(line);
    if term.is_empty() {
        return line.into_owned();
    }
    line.replace(term, &paint(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &Path, search: &str, replace: &str) -> RunConfig {
        RunConfig::new(search, replace, dir)
    }

    fn run(config: &RunConfig, mode: PassMode) -> (PassReport, String) {
        colored::control::set_override(false);
        let replacer = Replacer::new(config).unwrap();
        let mut out = Vec::new();
        let report = replacer.run_pass(mode, &mut out).unwrap();
        (report, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_substitute_is_literal_and_non_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let replacer = Replacer::new(&config_for(temp_dir.path(), "a.c", "[$0]")).unwrap();
        assert_eq!(replacer.substitute(b"abc a.c a.c").as_ref(), b"abc [$0] [$0]");

        let growing = Replacer::new(&config_for(temp_dir.path(), "a", "aa")).unwrap();
        assert_eq!(growing.substitute(b"aba").as_ref(), b"aabaa");

        let overlapping = Replacer::new(&config_for(temp_dir.path(), "aa", "b")).unwrap();
        assert_eq!(overlapping.substitute(b"aaa").as_ref(), b"ba");
    }

    #[test]
    fn test_substitute_without_match_borrows() {
        let temp_dir = TempDir::new().unwrap();
        let replacer = Replacer::new(&config_for(temp_dir.path(), "needle", "pin")).unwrap();
        assert!(matches!(replacer.substitute(b"haystack"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_substitute_raw_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let replacer = Replacer::new(&config_for(temp_dir.path(), "old", "new")).unwrap();
        let content = [0xff, b'o', b'l', b'd', 0xfe];
        assert_eq!(
            replacer.substitute(&content).as_ref(),
            &[0xff, b'n', b'e', b'w', 0xfe]
        );
    }

    #[test]
    fn test_changed_lines_by_position() {
        let lines = changed_lines(b"one\ntwo X\nthree", b"one\ntwo Y\nthree");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].index, 1);
        assert_eq!(lines[0].old, Some(&b"two X"[..]));
        assert_eq!(lines[0].new, Some(&b"two Y"[..]));

        // A replacement containing a newline shifts later lines.
        let shifted = changed_lines(b"a X\nb", b"a Y\nZ\nb");
        assert_eq!(shifted.len(), 3);
        assert_eq!(shifted[2].old, None);
        assert_eq!(shifted[2].new, Some(&b"b"[..]));
    }

    #[test]
    fn test_preview_counts_without_writing() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("greeting.txt");
        fs::write(&file, "hello X\nX again\nunrelated\n").unwrap();

        let config = config_for(temp_dir.path(), "X", "Y");
        let (report, output) = run(&config, PassMode::Preview);

        assert_eq!(report.match_count(), 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), "hello X\nX again\nunrelated\n");
        assert_eq!(output.matches("greeting.txt").count(), 1);
        assert!(output.contains("- hello X"));
        assert!(output.contains("+ hello Y"));
        assert!(output.contains("- X again"));
        assert!(!output.contains("unrelated"));
    }

    #[test]
    fn test_preview_then_write() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("main.go");
        fs::write(&file, "package my-app\n").unwrap();

        let config = config_for(temp_dir.path(), "my-app", "my-new-app");
        let (preview, _) = run(&config, PassMode::Preview);
        assert_eq!(preview.match_count(), 1);

        let (written, output) = run(&config, PassMode::Write);
        assert_eq!(written.match_count(), 1);
        assert_eq!(written.changed_files, vec![file.clone()]);
        assert_eq!(fs::read_to_string(&file).unwrap(), "package my-new-app\n");
        assert!(output.is_empty());
    }

    #[test]
    fn test_write_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("data.txt");
        fs::write(&file, "X marks X").unwrap();

        let config = config_for(temp_dir.path(), "X", "Y");
        let (first, _) = run(&config, PassMode::Write);
        assert_eq!(first.match_count(), 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), "Y marks Y");

        let (second, _) = run(&config, PassMode::Write);
        assert_eq!(second.match_count(), 0);
        assert_eq!(fs::read_to_string(&file).unwrap(), "Y marks Y");
    }

    #[test]
    fn test_count_is_per_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("a.txt"), "X\nX\nX\n").unwrap();
        fs::write(temp_dir.path().join("nested/b.txt"), "X").unwrap();
        fs::write(temp_dir.path().join("nested/c.txt"), "nothing here").unwrap();

        let config = config_for(temp_dir.path(), "X", "Y");
        let (report, _) = run(&config, PassMode::Preview);
        assert_eq!(report.match_count(), 2);
        assert_eq!(report.files_visited, 3);
    }

    #[test]
    fn test_extension_filter() {
        let temp_dir = TempDir::new().unwrap();
        let txt = temp_dir.path().join("a.txt");
        let go = temp_dir.path().join("a.go");
        fs::write(&txt, "needle").unwrap();
        fs::write(&go, "needle").unwrap();

        let mut config = config_for(temp_dir.path(), "needle", "pin");
        config.extensions = vec![".go".to_string()];
        let (report, _) = run(&config, PassMode::Write);

        assert_eq!(report.changed_files, vec![go.clone()]);
        assert_eq!(fs::read_to_string(&txt).unwrap(), "needle");
        assert_eq!(fs::read_to_string(&go).unwrap(), "pin");
    }

    #[test]
    fn test_hidden_paths() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        let in_hidden_dir = temp_dir.path().join(".git/config");
        let hidden_file = temp_dir.path().join(".env");
        let visible = temp_dir.path().join("visible.txt");
        for path in [&in_hidden_dir, &hidden_file, &visible] {
            fs::write(path, "token").unwrap();
        }

        let mut config = config_for(temp_dir.path(), "token", "secret");
        let (excluded, _) = run(&config, PassMode::Write);
        assert_eq!(excluded.changed_files, vec![visible.clone()]);
        assert_eq!(fs::read_to_string(&hidden_file).unwrap(), "token");
        assert_eq!(fs::read_to_string(&in_hidden_dir).unwrap(), "token");

        config.include_hidden = true;
        let (included, _) = run(&config, PassMode::Write);
        assert_eq!(included.match_count(), 2);
        assert_eq!(fs::read_to_string(&in_hidden_dir).unwrap(), "secret");
    }

    #[test]
    fn test_binary_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let binary = temp_dir.path().join("blob.bin");
        fs::write(&binary, b"X\x00X").unwrap();

        let mut config = config_for(temp_dir.path(), "X", "Y");
        let (quiet, quiet_output) = run(&config, PassMode::Write);
        assert_eq!(quiet.match_count(), 0);
        assert_eq!(quiet.binary_skipped, 1);
        assert!(quiet_output.is_empty());

        config.verbose = true;
        let (_, verbose_output) = run(&config, PassMode::Write);
        assert!(verbose_output.contains("Skipping binary file:"));
        assert!(verbose_output.contains("blob.bin"));
        assert_eq!(fs::read(&binary).unwrap(), b"X\x00X");
    }

    #[test]
    fn test_empty_replacement_deletes() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("log.txt");
        fs::write(&file, "keep DEBUG keep").unwrap();

        let config = config_for(temp_dir.path(), "DEBUG ", "");
        let (report, _) = run(&config, PassMode::Write);
        assert_eq!(report.match_count(), 1);
        assert_eq!(fs::read_to_string(&file).unwrap(), "keep keep");
    }

    /// Sets `mode` on `path` and reports whether the process is still able to open it
    /// for writing anyway (privileged users bypass file permissions).
    #[cfg(unix)]
    fn restrict(path: &Path, mode: u32) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        fs::OpenOptions::new().write(true).open(path).is_ok()
    }

    #[cfg(unix)]
    #[test]
    fn test_write_failure_stops_pass_after_earlier_writes() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.txt");
        let second = temp_dir.path().join("b.txt");
        let third = temp_dir.path().join("c.txt");
        fs::write(&first, "X one").unwrap();
        fs::write(&second, "X two").unwrap();
        fs::write(&third, "X three").unwrap();
        if restrict(&second, 0o444) {
            return;
        }

        let config = config_for(temp_dir.path(), "X", "Y");
        let replacer = Replacer::new(&config).unwrap();
        let err = replacer.run_pass(PassMode::Write, &mut Vec::new()).unwrap_err();

        assert!(matches!(err, Error::FileIo { .. }));
        assert!(err.to_string().contains("b.txt"));
        assert_eq!(fs::read_to_string(&first).unwrap(), "Y one");
        assert_eq!(fs::read_to_string(&second).unwrap(), "X two");
        assert_eq!(fs::read_to_string(&third).unwrap(), "X three");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_stops_pass_after_earlier_writes() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.txt");
        let second = temp_dir.path().join("b.txt");
        fs::write(&first, "X one").unwrap();
        fs::write(&second, "X two").unwrap();
        if restrict(&second, 0o000) {
            return;
        }

        let config = config_for(temp_dir.path(), "X", "Y");
        let replacer = Replacer::new(&config).unwrap();
        let err = replacer.run_pass(PassMode::Write, &mut Vec::new()).unwrap_err();

        assert!(matches!(err, Error::BinaryDetection { .. }));
        assert!(err.to_string().contains("b.txt"));
        assert_eq!(fs::read_to_string(&first).unwrap(), "Y one");
    }

    #[test]
    fn test_unreadable_directory_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir.path().join("vanished"), "a", "b");
        let replacer = Replacer::new(&config).unwrap();
        let err = replacer.run_pass(PassMode::Preview, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Walk { .. }));
        assert!(err.to_string().contains("vanished"));
    }
}
