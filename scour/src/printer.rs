use std::io;
use std::io::Write;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::config::{BinaryMode, SearchConfig};
use crate::results::FileReport;
use crate::search::context::ContextWindow;
use crate::search::matcher::PatternMatcher;
use crate::search::splitter::Record;

/// Output mode, in priority order: name listing beats counting beats
/// occurrence output beats record output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    FilesWithMatches,
    FilesWithoutMatch,
    Count,
    OnlyMatching,
    Records,
}

impl OutputMode {
    fn from_config(config: &SearchConfig) -> Self {
        if config.files_with_matches {
            OutputMode::FilesWithMatches
        } else if config.files_without_match {
            OutputMode::FilesWithoutMatch
        } else if config.count {
            OutputMode::Count
        } else if config.only_matching {
            OutputMode::OnlyMatching
        } else {
            OutputMode::Records
        }
    }
}

/// Highlight for selected records, the classic bold red.
fn match_highlight() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_bold(true);
    spec
}

/// Renders one input's records in the configured output mode.
///
/// The writer decides whether highlight sequences reach the output, so
/// callers pick color behavior by picking the writer.
pub struct Printer<'a, W: WriteColor> {
    out: &'a mut W,
    config: &'a SearchConfig,
}

impl<'a, W: WriteColor> Printer<'a, W> {
    pub fn new(out: &'a mut W, config: &'a SearchConfig) -> Self {
        Printer { out, config }
    }

    /// Renders one input. `name` is the display name; `show_name`
    /// controls the per-record prefix, while name listings and binary
    /// notices always use `name`.
    pub fn render(
        &mut self,
        name: &str,
        show_name: bool,
        records: &[Record],
        report: &FileReport,
        matcher: &PatternMatcher,
    ) -> io::Result<()> {
        if self.config.quiet {
            return Ok(());
        }

        match OutputMode::from_config(self.config) {
            OutputMode::FilesWithMatches => {
                if report.has_match() {
                    self.write_name_line(name)?;
                }
            }
            OutputMode::FilesWithoutMatch => {
                if !report.has_match() {
                    self.write_name_line(name)?;
                }
            }
            OutputMode::Count => {
                if show_name {
                    write!(self.out, "{}:", name)?;
                }
                writeln!(self.out, "{}", report.matched)?;
            }
            OutputMode::OnlyMatching => {
                if self.suppress_binary(report) {
                    self.write_binary_notice(name, report)?;
                } else {
                    self.render_occurrences(name, show_name, records, matcher)?;
                }
            }
            OutputMode::Records => {
                if self.suppress_binary(report) {
                    self.write_binary_notice(name, report)?;
                } else {
                    self.render_records(name, show_name, records)?;
                }
            }
        }

        if self.config.line_buffered {
            self.out.flush()?;
        }
        Ok(())
    }

    fn suppress_binary(&self, report: &FileReport) -> bool {
        report.binary && self.config.binary_mode == BinaryMode::Binary
    }

    fn write_binary_notice(&mut self, name: &str, report: &FileReport) -> io::Result<()> {
        if report.has_match() {
            writeln!(self.out, "Binary file {} matches", name)?;
        }
        Ok(())
    }

    fn write_name_line(&mut self, name: &str) -> io::Result<()> {
        if self.config.null_terminate_names {
            write!(self.out, "{}\0", name)?;
        } else {
            writeln!(self.out, "{}", name)?;
        }
        Ok(())
    }

    /// Record output: context windows, group separators, the printed-record
    /// cap, and per-record highlighting.
    fn render_records(&mut self, name: &str, show_name: bool, records: &[Record]) -> io::Result<()> {
        let window =
            ContextWindow::build(records, self.config.before_context, self.config.after_context);
        let mut printed = 0usize;
        let mut any_group_emitted = false;

        for (i, record) in records.iter().enumerate() {
            if !window.is_printable(i) {
                continue;
            }
            if let Some(cap) = self.config.max_count {
                if printed >= cap {
                    break;
                }
            }

            if window.starts_group(i) {
                if any_group_emitted && self.config.has_context() {
                    if let Some(separator) = &self.config.group_separator {
                        writeln!(self.out, "{}", separator)?;
                    }
                }
                any_group_emitted = true;
            }

            self.write_prefix(name, show_name, i, record.byte_offset)?;
            if record.is_match {
                self.out.set_color(&match_highlight())?;
                self.out.write_all(&record.text)?;
                self.out.reset()?;
            } else {
                self.out.write_all(&record.text)?;
            }
            self.out.write_all(b"\n")?;
            if self.config.line_buffered {
                self.out.flush()?;
            }
            printed += 1;
        }
        Ok(())
    }

    /// Occurrence output: each hit on its own line, offsets pointing at
    /// the hit rather than the record. Inverted selections have no
    /// occurrences to show.
    fn render_occurrences(
        &mut self,
        name: &str,
        show_name: bool,
        records: &[Record],
        matcher: &PatternMatcher,
    ) -> io::Result<()> {
        if self.config.invert_match {
            return Ok(());
        }
        for (i, record) in records.iter().enumerate() {
            if !record.is_match {
                continue;
            }
            for (start, end) in matcher.occurrences(&record.text) {
                if show_name {
                    write!(self.out, "{}:", name)?;
                }
                if self.config.line_number {
                    write!(self.out, "{}:", i + 1)?;
                }
                if self.config.byte_offset {
                    write!(self.out, "{}:", record.byte_offset + start as u64)?;
                }
                self.out.write_all(&record.text[start..end])?;
                self.out.write_all(b"\n")?;
                if self.config.line_buffered {
                    self.out.flush()?;
                }
            }
        }
        Ok(())
    }

    fn write_prefix(
        &mut self,
        name: &str,
        show_name: bool,
        index: usize,
        byte_offset: u64,
    ) -> io::Result<()> {
        if show_name {
            if self.config.null_terminate_names {
                write!(self.out, "{}\0", name)?;
            } else {
                write!(self.out, "{}:", name)?;
            }
        }
        if self.config.line_number {
            write!(self.out, "{}:", index + 1)?;
        }
        if self.config.byte_offset {
            write!(self.out, "{}:", byte_offset)?;
        }
        if self.config.initial_tab {
            self.out.write_all(b"\t")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::splitter::split_lines;
    use termcolor::{Ansi, NoColor};

    fn mark(records: &mut [Record], matcher: &PatternMatcher, invert: bool) -> FileReport {
        let mut report = FileReport {
            records: records.len(),
            ..FileReport::default()
        };
        for record in records.iter_mut() {
            record.is_match = matcher.matches(&record.text) != invert;
            if record.is_match {
                report.matched += 1;
            }
        }
        report
    }

    fn render_plain(content: &[u8], config: &SearchConfig) -> String {
        let matcher = PatternMatcher::new(config).unwrap();
        let mut records = split_lines(content, false);
        let report = mark(&mut records, &matcher, config.invert_match);
        let mut out = NoColor::new(Vec::new());
        Printer::new(&mut out, config)
            .render("input.txt", false, &records, &report, &matcher)
            .unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    fn render_named(content: &[u8], config: &SearchConfig) -> String {
        let matcher = PatternMatcher::new(config).unwrap();
        let mut records = split_lines(content, false);
        let report = mark(&mut records, &matcher, config.invert_match);
        let mut out = NoColor::new(Vec::new());
        Printer::new(&mut out, config)
            .render("input.txt", true, &records, &report, &matcher)
            .unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_plain_record_output() {
        let config = SearchConfig::with_pattern("hit");
        let out = render_plain(b"a hit\nmiss\nanother hit\n", &config);
        assert_eq!(out, "a hit\nanother hit\n");
    }

    #[test]
    fn test_name_and_line_number_prefix() {
        let mut config = SearchConfig::with_pattern("hit");
        config.line_number = true;
        let out = render_named(b"a hit\nmiss\nanother hit\n", &config);
        assert_eq!(out, "input.txt:1:a hit\ninput.txt:3:another hit\n");
    }

    #[test]
    fn test_byte_offset_prefix() {
        let mut config = SearchConfig::with_pattern("beta");
        config.byte_offset = true;
        let out = render_plain(b"alpha\nbeta\n", &config);
        assert_eq!(out, "5:beta\n");
    }

    #[test]
    fn test_prefix_order_and_tab() {
        let mut config = SearchConfig::with_pattern("x");
        config.line_number = true;
        config.byte_offset = true;
        config.initial_tab = true;
        let out = render_named(b"x\n", &config);
        assert_eq!(out, "input.txt:1:0:\tx\n");
    }

    #[test]
    fn test_context_and_group_separator() {
        let mut config = SearchConfig::with_pattern("hit");
        config.after_context = 1;
        let content = b"hit one\ntail\ngap\ngap\nhit two\ntail\n";
        let out = render_plain(content, &config);
        assert_eq!(out, "hit one\ntail\n--\nhit two\ntail\n");
    }

    #[test]
    fn test_no_separator_before_first_group() {
        let mut config = SearchConfig::with_pattern("hit");
        config.before_context = 1;
        let out = render_plain(b"lead\nhit\n", &config);
        assert!(!out.starts_with("--"));
        assert_eq!(out, "lead\nhit\n");
    }

    #[test]
    fn test_custom_and_suppressed_separator() {
        let mut config = SearchConfig::with_pattern("hit");
        config.after_context = 1;
        config.group_separator = Some("====".to_string());
        let content = b"hit\ntail\ngap\ngap\nhit\ntail\n";
        let out = render_plain(content, &config);
        assert!(out.contains("====\n"));

        config.group_separator = None;
        let out = render_plain(content, &config);
        assert_eq!(out, "hit\ntail\nhit\ntail\n");
    }

    #[test]
    fn test_no_separator_without_context() {
        let mut config = SearchConfig::with_pattern("hit");
        let out = render_plain(b"hit\nmiss\nhit\n", &config);
        assert_eq!(out, "hit\nhit\n");
    }

    #[test]
    fn test_max_count_bounds_printed_records() {
        let mut config = SearchConfig::with_pattern("hit");
        config.max_count = Some(2);
        let out = render_plain(b"hit 1\nhit 2\nhit 3\n", &config);
        assert_eq!(out, "hit 1\nhit 2\n");
    }

    #[test]
    fn test_max_count_includes_context_records() {
        let mut config = SearchConfig::with_pattern("hit");
        config.after_context = 1;
        config.max_count = Some(2);
        // the cap counts printed records, so the match plus its one
        // context record exhaust it
        let out = render_plain(b"hit\ntail\nhit again\n", &config);
        assert_eq!(out, "hit\ntail\n");
    }

    #[test]
    fn test_max_count_zero_prints_nothing() {
        let mut config = SearchConfig::with_pattern("hit");
        config.max_count = Some(0);
        let out = render_plain(b"hit\n", &config);
        assert_eq!(out, "");
    }

    #[test]
    fn test_count_mode() {
        let mut config = SearchConfig::with_pattern("hit");
        config.count = true;
        let out = render_plain(b"hit\nmiss\nhit\n", &config);
        assert_eq!(out, "2\n");
        let out = render_named(b"hit\nmiss\nhit\n", &config);
        assert_eq!(out, "input.txt:2\n");
    }

    #[test]
    fn test_count_mode_zero() {
        let mut config = SearchConfig::with_pattern("absent");
        config.count = true;
        let out = render_plain(b"nothing here\n", &config);
        assert_eq!(out, "0\n");
    }

    #[test]
    fn test_list_modes() {
        let mut config = SearchConfig::with_pattern("hit");
        config.files_with_matches = true;
        assert_eq!(render_plain(b"hit\n", &config), "input.txt\n");
        assert_eq!(render_plain(b"miss\n", &config), "");

        let mut config = SearchConfig::with_pattern("hit");
        config.files_without_match = true;
        assert_eq!(render_plain(b"hit\n", &config), "");
        assert_eq!(render_plain(b"miss\n", &config), "input.txt\n");
    }

    #[test]
    fn test_list_mode_with_null_terminator() {
        let mut config = SearchConfig::with_pattern("hit");
        config.files_with_matches = true;
        config.null_terminate_names = true;
        assert_eq!(render_plain(b"hit\n", &config), "input.txt\0");
    }

    #[test]
    fn test_null_terminated_record_prefix() {
        let mut config = SearchConfig::with_pattern("hit");
        config.null_terminate_names = true;
        assert_eq!(render_named(b"hit\n", &config), "input.txt\0hit\n");
    }

    #[test]
    fn test_count_keeps_colon_with_null_terminator() {
        let mut config = SearchConfig::with_pattern("hit");
        config.count = true;
        config.null_terminate_names = true;
        assert_eq!(render_named(b"hit\n", &config), "input.txt:1\n");
    }

    #[test]
    fn test_quiet_suppresses_everything() {
        let mut config = SearchConfig::with_pattern("hit");
        config.quiet = true;
        assert_eq!(render_named(b"hit\n", &config), "");

        config.count = true;
        assert_eq!(render_plain(b"hit\n", &config), "");
    }

    #[test]
    fn test_only_matching_output() {
        let mut config = SearchConfig::with_pattern("ab");
        config.only_matching = true;
        let out = render_plain(b"ab then ab\nnothing\n", &config);
        assert_eq!(out, "ab\nab\n");
    }

    #[test]
    fn test_only_matching_offsets_point_at_hits() {
        let mut config = SearchConfig::with_pattern("ab");
        config.only_matching = true;
        config.byte_offset = true;
        config.line_number = true;
        let out = render_plain(b"xxab\nab\n", &config);
        assert_eq!(out, "1:2:ab\n2:4:ab\n");
    }

    #[test]
    fn test_only_matching_inverted_prints_nothing() {
        let mut config = SearchConfig::with_pattern("hit");
        config.only_matching = true;
        config.invert_match = true;
        let out = render_plain(b"miss\nhit\n", &config);
        assert_eq!(out, "");
    }

    #[test]
    fn test_inverted_selection_prints_non_matching() {
        let mut config = SearchConfig::with_pattern("hit");
        config.invert_match = true;
        let out = render_plain(b"hit\nmiss\n", &config);
        assert_eq!(out, "miss\n");
    }

    #[test]
    fn test_binary_notice() {
        let config = SearchConfig::with_pattern("hit");
        let matcher = PatternMatcher::new(&config).unwrap();
        let records = Vec::new();
        let report = FileReport {
            records: 3,
            matched: 1,
            binary: true,
        };
        let mut out = NoColor::new(Vec::new());
        Printer::new(&mut out, &config)
            .render("blob.bin", false, &records, &report, &matcher)
            .unwrap();
        assert_eq!(
            String::from_utf8(out.into_inner()).unwrap(),
            "Binary file blob.bin matches\n"
        );
    }

    #[test]
    fn test_binary_without_match_stays_silent() {
        let config = SearchConfig::with_pattern("hit");
        let matcher = PatternMatcher::new(&config).unwrap();
        let report = FileReport {
            records: 3,
            matched: 0,
            binary: true,
        };
        let mut out = NoColor::new(Vec::new());
        Printer::new(&mut out, &config)
            .render("blob.bin", false, &[], &report, &matcher)
            .unwrap();
        assert_eq!(String::from_utf8(out.into_inner()).unwrap(), "");
    }

    #[test]
    fn test_binary_text_mode_prints_records() {
        let mut config = SearchConfig::with_pattern("hit");
        config.binary_mode = BinaryMode::Text;
        let matcher = PatternMatcher::new(&config).unwrap();
        let mut records = split_lines(b"a hit\x00with a nul\n", false);
        let mut report = mark(&mut records, &matcher, false);
        report.binary = true;
        let mut out = NoColor::new(Vec::new());
        Printer::new(&mut out, &config)
            .render("blob.bin", false, &records, &report, &matcher)
            .unwrap();
        let bytes = out.into_inner();
        assert_eq!(bytes, b"a hit\x00with a nul\n");
    }

    #[test]
    fn test_highlight_encloses_match_text_only() {
        let config = SearchConfig::with_pattern("hit");
        let matcher = PatternMatcher::new(&config).unwrap();
        let mut records = split_lines(b"a hit\n", false);
        let report = mark(&mut records, &matcher, false);
        let mut out = Ansi::new(Vec::new());
        Printer::new(&mut out, &config)
            .render("input.txt", true, &records, &report, &matcher)
            .unwrap();
        let rendered = String::from_utf8(out.into_inner()).unwrap();
        assert!(rendered.starts_with("input.txt:\x1b["));
        assert!(rendered.contains("a hit"));
        assert!(rendered.ends_with("\n"));
    }

    #[test]
    fn test_no_color_writer_emits_no_escapes() {
        let config = SearchConfig::with_pattern("hit");
        let out = render_plain(b"a hit\n", &config);
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_context_records_are_not_highlighted() {
        let mut config = SearchConfig::with_pattern("hit");
        config.after_context = 1;
        let matcher = PatternMatcher::new(&config).unwrap();
        let mut records = split_lines(b"hit\ntail\n", false);
        let report = mark(&mut records, &matcher, false);
        let mut out = Ansi::new(Vec::new());
        Printer::new(&mut out, &config)
            .render("input.txt", false, &records, &report, &matcher)
            .unwrap();
        let rendered = String::from_utf8(out.into_inner()).unwrap();
        let tail_line = rendered.lines().last().unwrap();
        assert_eq!(tail_line, "tail");
    }
}
