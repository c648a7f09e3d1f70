use std::fs;
use std::io::{self, Read};
use std::path::Path;

use termcolor::WriteColor;
use tracing::{debug, info, trace};

use super::matcher::PatternMatcher;
use super::processor::FileProcessor;
use crate::config::{DeviceAction, DirectoryAction, SearchConfig};
use crate::errors::{SearchError, SearchResult};
use crate::filters::FilterSet;
use crate::results::RunSummary;

/// Display name used when searching standard input.
pub const STDIN_NAME: &str = "(standard input)";

/// Searches the given operands and renders output as it goes.
///
/// An operand of `-` means standard input. With no operands at all, a
/// recursive run searches the current directory and any other run reads
/// standard input. Unreadable operands are reported and skipped; the
/// returned summary covers everything that was searched.
pub fn search_paths<W: WriteColor>(
    roots: &[String],
    config: &SearchConfig,
    out: &mut W,
) -> SearchResult<RunSummary> {
    let matcher = PatternMatcher::new(config)?;

    let mut config = config.clone();
    if config.only_matching && config.has_context() {
        eprintln!("scour: the only-matching option cannot be combined with context");
        config.before_context = 0;
        config.after_context = 0;
    }

    info!(
        "searching {} operands with {} patterns",
        roots.len(),
        config.patterns.len()
    );

    let show_name = (roots.len() > 1 && !config.no_filename) || config.with_filename;
    let mut walker = Walker {
        filters: FilterSet::from_config(&config),
        config: &config,
        matcher: &matcher,
        show_name,
        out,
        summary: RunSummary::new(),
    };

    if roots.is_empty() {
        if walker.config.recursive {
            walker.walk_directory(Path::new("."))?;
        } else {
            walker.search_stdin()?;
        }
    } else {
        for root in roots {
            walker.search_root(root)?;
        }
    }

    let summary = walker.summary;
    info!(
        "search complete: {} selected records in {} of {} inputs",
        summary.total_matches, summary.files_matched, summary.files_searched
    );
    Ok(summary)
}

/// Walks the operand set, dispatching each input to the processor and
/// folding the reports into one summary.
struct Walker<'a, W: WriteColor> {
    config: &'a SearchConfig,
    matcher: &'a PatternMatcher,
    filters: FilterSet,
    show_name: bool,
    out: &'a mut W,
    summary: RunSummary,
}

impl<W: WriteColor> Walker<'_, W> {
    /// Handles one command-line operand.
    fn search_root(&mut self, root: &str) -> SearchResult<()> {
        if root == "-" {
            return self.search_stdin();
        }

        let path = Path::new(root);
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                self.report_skip(root, &SearchError::from_io(path, e));
                return Ok(());
            }
        };

        if metadata.is_dir() {
            match self.config.directories {
                DirectoryAction::Recurse => self.walk_directory(path),
                DirectoryAction::Read => {
                    if !self.config.no_messages {
                        eprintln!("scour: {}: Is a directory", root);
                    }
                    Ok(())
                }
                DirectoryAction::Skip => {
                    debug!("skipping directory {}", root);
                    Ok(())
                }
            }
        } else if metadata.is_file() {
            self.process_file(path, root)
        } else if self.config.devices == DeviceAction::Read {
            self.process_file(path, root)
        } else {
            debug!("skipping device {}", root);
            Ok(())
        }
    }

    /// Recursive descent in sorted name order. Directory entries are
    /// filtered by bare name; unreadable ones are reported and skipped.
    fn walk_directory(&mut self, dir: &Path) -> SearchResult<()> {
        trace!("walking {}", dir.display());
        let reader = match fs::read_dir(dir) {
            Ok(reader) => reader,
            Err(e) => {
                self.report_skip(&dir.display().to_string(), &SearchError::from_io(dir, e));
                return Ok(());
            }
        };

        let mut entries = Vec::new();
        for entry in reader {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    self.report_skip(&dir.display().to_string(), &SearchError::IoError(e));
                }
            }
        }
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    self.report_skip(&path.display().to_string(), &SearchError::from_io(&path, e));
                    continue;
                }
            };

            if file_type.is_dir() {
                if self.filters.admits_dir(&name) {
                    self.walk_directory(&path)?;
                } else {
                    debug!("pruned directory {}", path.display());
                }
            } else if file_type.is_file() {
                if self.filters.admits_file(&name) {
                    self.process_file(&path, &path.display().to_string())?;
                }
            } else if file_type.is_symlink() {
                if self.config.follow_symlinks {
                    self.follow_symlink(&path, &name)?;
                } else {
                    trace!("not following symlink {}", path.display());
                }
            } else if self.config.devices == DeviceAction::Read && self.filters.admits_file(&name) {
                self.process_file(&path, &path.display().to_string())?;
            }
        }
        Ok(())
    }

    /// Resolves a symlinked entry and dispatches on the target type.
    fn follow_symlink(&mut self, path: &Path, name: &str) -> SearchResult<()> {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => {
                if self.filters.admits_dir(name) {
                    self.walk_directory(path)?;
                }
                Ok(())
            }
            Ok(metadata) if metadata.is_file() => {
                if self.filters.admits_file(name) {
                    self.process_file(path, &path.display().to_string())?;
                }
                Ok(())
            }
            Ok(_) => {
                if self.config.devices == DeviceAction::Read && self.filters.admits_file(name) {
                    self.process_file(path, &path.display().to_string())?;
                }
                Ok(())
            }
            Err(e) => {
                self.report_skip(&path.display().to_string(), &SearchError::from_io(path, e));
                Ok(())
            }
        }
    }

    /// Searches one file, isolating per-file failures so the walk goes on.
    /// A dead output stream still aborts the whole run.
    fn process_file(&mut self, path: &Path, name: &str) -> SearchResult<()> {
        let processor = FileProcessor::new(self.config, self.matcher);
        match processor.process_path(path, name, self.show_name, self.out) {
            Ok(report) => {
                self.summary.add_file(&report);
                Ok(())
            }
            Err(SearchError::IoError(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                Err(SearchError::IoError(e))
            }
            Err(err) => {
                self.report_skip(name, &err);
                Ok(())
            }
        }
    }

    /// Reads standard input to the end and searches it as one unnamed
    /// input. Context is not available here.
    fn search_stdin(&mut self) -> SearchResult<()> {
        let adjusted = if self.config.has_context() {
            eprintln!("scour: context is not supported when reading standard input");
            let mut config = self.config.clone();
            config.before_context = 0;
            config.after_context = 0;
            Some(config)
        } else {
            None
        };
        let config = adjusted.as_ref().unwrap_or(self.config);

        let mut content = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut content)
            .map_err(SearchError::IoError)?;

        let processor = FileProcessor::new(config, self.matcher);
        let report = processor.process_content(&content, STDIN_NAME, false, self.out)?;
        self.summary.add_file(&report);
        Ok(())
    }

    fn report_skip(&self, name: &str, err: &SearchError) {
        if !self.config.no_messages {
            match err {
                SearchError::FileNotFound(_) | SearchError::PermissionDenied(_) => {
                    eprintln!("scour: {}", err);
                }
                _ => eprintln!("scour: {}: {}", name, err),
            }
        }
        trace!("skipped {}: {}", name, err);
    }
}
