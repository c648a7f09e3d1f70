/// How the pattern set is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternSyntax {
    /// Patterns are matched as literal substrings (the default).
    #[default]
    Basic,
    /// The first pattern compiles as a regular expression with
    /// insignificant-whitespace mode enabled.
    Extended,
    /// Patterns are fixed strings.
    Fixed,
    /// The first pattern compiles as a regular expression.
    Perl,
}

/// What to do when an input operand names a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryAction {
    /// Report the directory and move on.
    #[default]
    Read,
    /// Descend into it.
    Recurse,
    /// Ignore it silently.
    Skip,
}

/// What to do with devices, FIFOs, and sockets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceAction {
    #[default]
    Read,
    Skip,
}

/// How content that looks binary is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryMode {
    /// Report that the file matches without printing its records.
    #[default]
    Binary,
    /// Search and print it like any text file.
    Text,
    /// Treat it as if it contained no selected records.
    WithoutMatch,
}

/// Immutable options for a whole search run.
///
/// Built once by the caller, then shared by every stage of the pipeline.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Patterns to search for; a record is selected when any of them hits.
    pub patterns: Vec<String>,
    /// Pattern interpretation mode.
    pub syntax: PatternSyntax,
    /// Fold ASCII case in patterns and data.
    pub ignore_case: bool,
    /// Select the records that do not match.
    pub invert_match: bool,
    /// Require matches to be bounded by non-word bytes.
    pub word_regexp: bool,
    /// Require the whole record to match.
    pub line_regexp: bool,
    /// Records end at NUL bytes instead of newlines.
    pub null_data: bool,
    /// Keep carriage returns at end of line, stripping only the newline.
    pub keep_cr: bool,
    /// Prefix output records with their 1-based record number.
    pub line_number: bool,
    /// Prefix output records with their byte offset.
    pub byte_offset: bool,
    /// Print each occurrence of the pattern instead of the whole record.
    pub only_matching: bool,
    /// Print a count of selected records per input instead of the records.
    pub count: bool,
    /// Print only the names of inputs with selected records.
    pub files_with_matches: bool,
    /// Print only the names of inputs without selected records.
    pub files_without_match: bool,
    /// Suppress all normal output; the exit status still reports matches.
    pub quiet: bool,
    /// Suppress diagnostics about unreadable inputs.
    pub no_messages: bool,
    /// Stop printing after this many selected records per input.
    pub max_count: Option<usize>,
    /// Records of leading context around each match.
    pub before_context: usize,
    /// Records of trailing context around each match.
    pub after_context: usize,
    /// Separator printed between context groups; `None` suppresses it.
    pub group_separator: Option<String>,
    /// Descend into directories named on the command line.
    pub recursive: bool,
    /// Follow symbolic links while descending.
    pub follow_symlinks: bool,
    /// Directory handling for command-line operands.
    pub directories: DirectoryAction,
    /// Device, FIFO, and socket handling.
    pub devices: DeviceAction,
    /// Binary content handling.
    pub binary_mode: BinaryMode,
    /// Search only files whose name matches this pattern.
    pub include_glob: Option<String>,
    /// Skip files whose name matches this pattern.
    pub exclude_glob: Option<String>,
    /// Skip directories whose name matches this pattern.
    pub exclude_dir_glob: Option<String>,
    /// Skip files whose name matches any of these patterns.
    pub exclude_names: Vec<String>,
    /// Always prefix output records with the input name.
    pub with_filename: bool,
    /// Never prefix output records with the input name.
    pub no_filename: bool,
    /// Terminate printed input names with a NUL byte instead of a colon
    /// or newline.
    pub null_terminate_names: bool,
    /// Put a tab between the prefix and the record text.
    pub initial_tab: bool,
    /// Flush output after every printed record.
    pub line_buffered: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            patterns: Vec::new(),
            syntax: PatternSyntax::default(),
            ignore_case: false,
            invert_match: false,
            word_regexp: false,
            line_regexp: false,
            null_data: false,
            keep_cr: false,
            line_number: false,
            byte_offset: false,
            only_matching: false,
            count: false,
            files_with_matches: false,
            files_without_match: false,
            quiet: false,
            no_messages: false,
            max_count: None,
            before_context: 0,
            after_context: 0,
            group_separator: Some(String::from("--")),
            recursive: false,
            follow_symlinks: false,
            directories: DirectoryAction::default(),
            devices: DeviceAction::default(),
            binary_mode: BinaryMode::default(),
            include_glob: None,
            exclude_glob: None,
            exclude_dir_glob: None,
            exclude_names: Vec::new(),
            with_filename: false,
            no_filename: false,
            null_terminate_names: false,
            initial_tab: false,
            line_buffered: false,
        }
    }
}

impl SearchConfig {
    /// Convenience constructor for the common single-pattern case.
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        SearchConfig {
            patterns: vec![pattern.into()],
            ..SearchConfig::default()
        }
    }

    /// Whether any context records surround the matches.
    pub fn has_context(&self) -> bool {
        self.before_context > 0 || self.after_context > 0
    }
}
