use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use termcolor::WriteColor;
use tracing::{debug, trace};

use super::matcher::PatternMatcher;
use super::splitter::split_records;
use crate::config::{BinaryMode, SearchConfig};
use crate::errors::{SearchError, SearchResult};
use crate::printer::Printer;
use crate::results::FileReport;

const BUFFER_CAPACITY: usize = 64 * 1024;

/// Runs the whole record pipeline for one input: read, sniff, split,
/// match, render.
pub struct FileProcessor<'a> {
    config: &'a SearchConfig,
    matcher: &'a PatternMatcher,
}

impl<'a> FileProcessor<'a> {
    pub fn new(config: &'a SearchConfig, matcher: &'a PatternMatcher) -> Self {
        FileProcessor { config, matcher }
    }

    /// Searches one file on disk and renders its output.
    pub fn process_path<W: WriteColor>(
        &self,
        path: &Path,
        name: &str,
        show_name: bool,
        out: &mut W,
    ) -> SearchResult<FileReport> {
        trace!("processing {}", path.display());
        let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| SearchError::from_io(path, e))?;
        self.process_content(&content, name, show_name, out)
    }

    /// Searches already-read content, used for standard input as well.
    ///
    /// Content with a NUL byte counts as binary, except in NUL-delimited
    /// mode where NUL is the record terminator.
    pub fn process_content<W: WriteColor>(
        &self,
        content: &[u8],
        name: &str,
        show_name: bool,
        out: &mut W,
    ) -> SearchResult<FileReport> {
        let binary = !self.config.null_data && content.contains(&0);
        let mut records = split_records(content, self.config);
        let mut report = FileReport {
            records: records.len(),
            matched: 0,
            binary,
        };

        if binary && self.config.binary_mode == BinaryMode::WithoutMatch {
            debug!("binary content of {} treated as unmatched", name);
        } else {
            for record in records.iter_mut() {
                record.is_match = self.matcher.matches(&record.text) != self.config.invert_match;
                if record.is_match {
                    report.matched += 1;
                }
            }
        }

        Printer::new(out, self.config)
            .render(name, show_name, &records, &report, self.matcher)
            .map_err(SearchError::IoError)?;

        debug!(
            "{}: {} of {} records selected",
            name, report.matched, report.records
        );
        Ok(report)
    }
}
