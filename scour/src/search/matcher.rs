use regex::bytes::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::config::{PatternSyntax, SearchConfig};
use crate::errors::{SearchError, SearchResult};

/// How records are tested against the pattern set.
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Any pattern occurring as a substring selects the record.
    Substring(Vec<Vec<u8>>),
    /// Substring occurrences bounded by non-word bytes on both sides.
    WholeWord(Vec<Vec<u8>>),
    /// The whole record must equal one of the patterns.
    WholeLine(Vec<Vec<u8>>),
    /// A compiled program built from the first pattern.
    Regex(Regex),
}

/// Compiled matcher applied to every record in a run.
///
/// Selection happens once, up front: regular-expression syntaxes compile
/// the first pattern into a program, and the literal syntaxes pick a
/// substring scan shaped by the whole-word and whole-line options.
#[derive(Debug)]
pub struct PatternMatcher {
    strategy: MatchStrategy,
    ignore_case: bool,
}

impl PatternMatcher {
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        if config.patterns.is_empty() {
            return Err(SearchError::config_error("no patterns given"));
        }

        let strategy = match config.syntax {
            PatternSyntax::Extended | PatternSyntax::Perl => {
                MatchStrategy::Regex(compile_program(config)?)
            }
            PatternSyntax::Basic | PatternSyntax::Fixed => {
                let patterns: Vec<Vec<u8>> = config
                    .patterns
                    .iter()
                    .map(|p| p.clone().into_bytes())
                    .collect();
                if config.line_regexp {
                    MatchStrategy::WholeLine(patterns)
                } else if config.word_regexp {
                    MatchStrategy::WholeWord(patterns)
                } else {
                    MatchStrategy::Substring(patterns)
                }
            }
        };
        debug!("matching with {} strategy", strategy_name(&strategy));

        Ok(PatternMatcher {
            strategy,
            ignore_case: config.ignore_case,
        })
    }

    /// Tests a record; the caller applies inversion.
    ///
    /// Patterns are tried in the order given and the scan stops at the
    /// first hit.
    pub fn matches(&self, text: &[u8]) -> bool {
        match &self.strategy {
            MatchStrategy::Substring(patterns) => patterns
                .iter()
                .any(|p| self.find_from(text, p, 0).is_some()),
            MatchStrategy::WholeWord(patterns) => {
                patterns.iter().any(|p| self.find_word(text, p).is_some())
            }
            MatchStrategy::WholeLine(patterns) => {
                patterns.iter().any(|p| self.equals(text, p))
            }
            MatchStrategy::Regex(program) => program.is_match(text),
        }
    }

    /// Non-overlapping occurrence spans within one record, for
    /// occurrence-level output. Empty occurrences are skipped.
    ///
    /// The literal strategies re-scan with the first pattern as a plain
    /// substring, without the whole-word or whole-line bounds.
    pub fn occurrences(&self, text: &[u8]) -> Vec<(usize, usize)> {
        match &self.strategy {
            MatchStrategy::Substring(patterns)
            | MatchStrategy::WholeWord(patterns)
            | MatchStrategy::WholeLine(patterns) => {
                let pattern = &patterns[0];
                let mut spans = Vec::new();
                if pattern.is_empty() {
                    return spans;
                }
                let mut from = 0;
                while let Some(at) = self.find_from(text, pattern, from) {
                    spans.push((at, at + pattern.len()));
                    from = at + pattern.len();
                }
                spans
            }
            MatchStrategy::Regex(program) => {
                let mut spans = Vec::new();
                let mut offset = 0;
                while offset <= text.len() {
                    let found = match program.find_at(text, offset) {
                        Some(found) => found,
                        None => break,
                    };
                    if found.start() == found.end() {
                        offset = found.end() + 1;
                        continue;
                    }
                    spans.push((found.start(), found.end()));
                    offset = found.end();
                }
                spans
            }
        }
    }

    fn equals(&self, text: &[u8], pattern: &[u8]) -> bool {
        if self.ignore_case {
            text.eq_ignore_ascii_case(pattern)
        } else {
            text == pattern
        }
    }

    /// First occurrence of `pattern` in `text` at or after `from`. An
    /// empty pattern matches at any position, including on empty text.
    fn find_from(&self, text: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
        if from > text.len() {
            return None;
        }
        if pattern.is_empty() {
            return Some(from);
        }
        if text.len() < pattern.len() {
            return None;
        }
        (from..=text.len() - pattern.len()).find(|&i| {
            let window = &text[i..i + pattern.len()];
            if self.ignore_case {
                window.eq_ignore_ascii_case(pattern)
            } else {
                window == pattern
            }
        })
    }

    /// First occurrence with non-word bytes (or edges) on both sides.
    /// Every occurrence is tried, not just the first.
    fn find_word(&self, text: &[u8], pattern: &[u8]) -> Option<usize> {
        let mut from = 0;
        while let Some(at) = self.find_from(text, pattern, from) {
            if word_bounded(text, at, at + pattern.len()) {
                return Some(at);
            }
            from = at + 1;
        }
        None
    }
}

fn strategy_name(strategy: &MatchStrategy) -> &'static str {
    match strategy {
        MatchStrategy::Substring(_) => "substring",
        MatchStrategy::WholeWord(_) => "whole-word",
        MatchStrategy::WholeLine(_) => "whole-line",
        MatchStrategy::Regex(_) => "regex",
    }
}

/// Compiles the first pattern; additional patterns are ignored in the
/// regular-expression syntaxes.
fn compile_program(config: &SearchConfig) -> SearchResult<Regex> {
    if config.patterns.len() > 1 {
        warn!(
            "{} extra patterns ignored; only the first compiles in regex mode",
            config.patterns.len() - 1
        );
    }

    let mut source = config.patterns[0].clone();
    if config.word_regexp {
        source = format!(r"\b{}\b", source);
    }
    if config.line_regexp {
        source = format!("^{}$", source);
    }

    RegexBuilder::new(&source)
        .case_insensitive(config.ignore_case)
        .ignore_whitespace(config.syntax == PatternSyntax::Extended)
        .build()
        .map_err(|e| SearchError::invalid_pattern(e.to_string()))
}

/// Word bytes are ASCII alphanumerics and underscore.
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn word_bounded(text: &[u8], start: usize, end: usize) -> bool {
    let before = start.checked_sub(1).map(|i| text[i]);
    let after = text.get(end).copied();
    !before.is_some_and(is_word_byte) && !after.is_some_and(is_word_byte)
}
