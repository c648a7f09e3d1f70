use anyhow::{anyhow, Result};
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use scour::{
    search_paths, BinaryMode, DeviceAction, DirectoryAction, PatternSyntax, SearchConfig,
};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use termcolor::{ColorChoice, StandardStream};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PATTERN_HEADING: &str = "Pattern selection and interpretation";
const MISC_HEADING: &str = "Miscellaneous";
const OUTPUT_HEADING: &str = "Output control";
const CONTEXT_HEADING: &str = "Context control";

#[derive(Parser, Debug)]
#[command(
    name = "scour",
    version,
    about = "Search for PATTERNS in each FILE or standard input",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true,
    after_help = "When FILE is '-', read standard input. With no FILE, read '.' if\n\
                  recursive, '-' otherwise. With fewer than two FILEs, assume -h.\n\
                  Exit status is 0 if any line is selected, 1 otherwise,\n\
                  2 on usage or pattern errors."
)]
struct Cli {
    /// Patterns are extended regular expressions
    #[arg(short = 'E', long = "extended-regexp", group = "syntax", help_heading = PATTERN_HEADING)]
    extended_regexp: bool,

    /// Patterns are fixed strings
    #[arg(short = 'F', long = "fixed-strings", group = "syntax", help_heading = PATTERN_HEADING)]
    fixed_strings: bool,

    /// Patterns are basic regular expressions (the default)
    #[arg(short = 'G', long = "basic-regexp", group = "syntax", help_heading = PATTERN_HEADING)]
    basic_regexp: bool,

    /// Patterns are Perl-style regular expressions
    #[arg(short = 'P', long = "perl-regexp", group = "syntax", help_heading = PATTERN_HEADING)]
    perl_regexp: bool,

    /// Use PATTERN for matching; may be given more than once
    #[arg(
        short = 'e',
        long = "regexp",
        value_name = "PATTERN",
        action = ArgAction::Append,
        help_heading = PATTERN_HEADING
    )]
    regexp: Vec<String>,

    /// Take patterns from FILE, one per line
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = PATTERN_HEADING)]
    pattern_file: Option<PathBuf>,

    /// Ignore case distinctions in patterns and data
    #[arg(
        short = 'i',
        long = "ignore-case",
        overrides_with = "no_ignore_case",
        help_heading = PATTERN_HEADING
    )]
    ignore_case: bool,

    /// Do not ignore case distinctions (the default)
    #[arg(long = "no-ignore-case", help_heading = PATTERN_HEADING)]
    no_ignore_case: bool,

    /// Match only whole words
    #[arg(short = 'w', long = "word-regexp", help_heading = PATTERN_HEADING)]
    word_regexp: bool,

    /// Match only whole lines
    #[arg(short = 'x', long = "line-regexp", help_heading = PATTERN_HEADING)]
    line_regexp: bool,

    /// A data line ends in a 0 byte, not a newline
    #[arg(short = 'z', long = "null-data", help_heading = PATTERN_HEADING)]
    null_data: bool,

    /// Suppress error messages about unreadable files
    #[arg(short = 's', long = "no-messages", help_heading = MISC_HEADING)]
    no_messages: bool,

    /// Select non-matching lines
    #[arg(short = 'v', long = "invert-match", help_heading = MISC_HEADING)]
    invert_match: bool,

    /// Print version information and exit
    #[arg(short = 'V', long = "version", action = ArgAction::Version, help_heading = MISC_HEADING)]
    version: Option<bool>,

    /// Print this help text and exit
    #[arg(long = "help", action = ArgAction::Help, help_heading = MISC_HEADING)]
    help: Option<bool>,

    /// Stop after NUM selected lines per file
    #[arg(short = 'm', long = "max-count", value_name = "NUM", help_heading = OUTPUT_HEADING)]
    max_count: Option<usize>,

    /// Print the 0-based byte offset with output lines
    #[arg(short = 'b', long = "byte-offset", help_heading = OUTPUT_HEADING)]
    byte_offset: bool,

    /// Print the 1-based line number with output lines
    #[arg(short = 'n', long = "line-number", help_heading = OUTPUT_HEADING)]
    line_number: bool,

    /// Flush output on every line
    #[arg(long = "line-buffered", help_heading = OUTPUT_HEADING)]
    line_buffered: bool,

    /// Print the file name with output lines
    #[arg(short = 'H', long = "with-filename", help_heading = OUTPUT_HEADING)]
    with_filename: bool,

    /// Suppress the file name prefix on output
    #[arg(short = 'h', long = "no-filename", help_heading = OUTPUT_HEADING)]
    no_filename: bool,

    /// Show only nonempty parts of lines that match
    #[arg(short = 'o', long = "only-matching", help_heading = OUTPUT_HEADING)]
    only_matching: bool,

    /// Suppress all normal output
    #[arg(short = 'q', long = "quiet", visible_alias = "silent", help_heading = OUTPUT_HEADING)]
    quiet: bool,

    /// Assume binary files are TYPE: binary, text, or without-match
    #[arg(long = "binary-files", value_name = "TYPE", value_enum, help_heading = OUTPUT_HEADING)]
    binary_files: Option<BinaryFilesArg>,

    /// Process binary files as text; same as --binary-files=text
    #[arg(short = 'a', long = "text", help_heading = OUTPUT_HEADING)]
    text: bool,

    /// Skip binary files; same as --binary-files=without-match
    #[arg(short = 'I', help_heading = OUTPUT_HEADING)]
    skip_binary: bool,

    /// How to handle directories: read, recurse, or skip
    #[arg(
        short = 'd',
        long = "directories",
        value_name = "ACTION",
        value_enum,
        help_heading = OUTPUT_HEADING
    )]
    directories: Option<DirectoriesArg>,

    /// How to handle devices, FIFOs, and sockets: read or skip
    #[arg(
        short = 'D',
        long = "devices",
        value_name = "ACTION",
        value_enum,
        help_heading = OUTPUT_HEADING
    )]
    devices: Option<DevicesArg>,

    /// Search directories recursively
    #[arg(short = 'r', long = "recursive", help_heading = OUTPUT_HEADING)]
    recursive: bool,

    /// Likewise, but follow symbolic links
    #[arg(short = 'R', long = "dereference-recursive", help_heading = OUTPUT_HEADING)]
    dereference_recursive: bool,

    /// Search only files whose base name matches GLOB
    #[arg(long = "include", value_name = "GLOB", help_heading = OUTPUT_HEADING)]
    include: Option<String>,

    /// Skip files whose base name matches GLOB
    #[arg(long = "exclude", value_name = "GLOB", help_heading = OUTPUT_HEADING)]
    exclude: Option<String>,

    /// Skip files whose base name matches any pattern from FILE
    #[arg(long = "exclude-from", value_name = "FILE", help_heading = OUTPUT_HEADING)]
    exclude_from: Option<PathBuf>,

    /// Skip directories whose base name matches GLOB
    #[arg(long = "exclude-dir", value_name = "GLOB", help_heading = OUTPUT_HEADING)]
    exclude_dir: Option<String>,

    /// Print only names of files with no selected lines
    #[arg(short = 'L', long = "files-without-match", help_heading = OUTPUT_HEADING)]
    files_without_match: bool,

    /// Print only names of files with selected lines
    #[arg(short = 'l', long = "files-with-matches", help_heading = OUTPUT_HEADING)]
    files_with_matches: bool,

    /// Print only a count of selected lines per file
    #[arg(short = 'c', long = "count", help_heading = OUTPUT_HEADING)]
    count: bool,

    /// Make tabs line up by printing one before the line text
    #[arg(short = 'T', long = "initial-tab", help_heading = OUTPUT_HEADING)]
    initial_tab: bool,

    /// Print a 0 byte after each file name
    #[arg(short = 'Z', long = "null", help_heading = OUTPUT_HEADING)]
    null: bool,

    /// Print NUM lines of leading context
    #[arg(short = 'B', long = "before-context", value_name = "NUM", help_heading = CONTEXT_HEADING)]
    before_context: Option<usize>,

    /// Print NUM lines of trailing context
    #[arg(short = 'A', long = "after-context", value_name = "NUM", help_heading = CONTEXT_HEADING)]
    after_context: Option<usize>,

    /// Print NUM lines of leading and trailing context
    #[arg(short = 'C', long = "context", value_name = "NUM", help_heading = CONTEXT_HEADING)]
    context: Option<usize>,

    /// Print SEP between groups of context lines
    #[arg(long = "group-separator", value_name = "SEP", help_heading = CONTEXT_HEADING)]
    group_separator: Option<String>,

    /// Do not print a separator between groups of context lines
    #[arg(long = "no-group-separator", help_heading = CONTEXT_HEADING)]
    no_group_separator: bool,

    /// Highlight matching lines; WHEN is always, never, or auto
    #[arg(
        long = "color",
        visible_alias = "colour",
        value_name = "WHEN",
        value_enum,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "always",
        help_heading = CONTEXT_HEADING
    )]
    color: Option<ColorWhen>,

    /// Do not strip carriage returns at end of line
    #[arg(short = 'U', long = "binary", help_heading = CONTEXT_HEADING)]
    keep_cr: bool,

    /// PATTERNS if -e and -f are not given, then files to search
    #[arg(value_name = "PATTERNS | FILE")]
    operands: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorWhen {
    Never,
    Always,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BinaryFilesArg {
    Binary,
    Text,
    WithoutMatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DirectoriesArg {
    Read,
    Recurse,
    Skip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DevicesArg {
    Read,
    Skip,
}

fn main() -> ExitCode {
    match run() {
        Ok(found) => {
            if found {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(err) => {
            if is_broken_pipe(&err) {
                return ExitCode::SUCCESS;
            }
            eprintln!("scour: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let cli = parse_args(std::env::args());
    init_tracing();

    let color = resolve_color(cli.color);
    let (config, roots) = build_config(cli)?;
    debug!(
        "{} patterns, {} operands",
        config.patterns.len(),
        roots.len()
    );

    let mut stdout = StandardStream::stdout(color);
    let summary = search_paths(&roots, &config, &mut stdout)?;
    Ok(summary.any_match())
}

fn parse_args(args: impl Iterator<Item = String>) -> Cli {
    match Cli::try_parse_from(rewrite_context_shorthand(args)) {
        Ok(cli) => cli,
        Err(err) => exit_with(err),
    }
}

/// Prints a parse-stage message and exits: 0 for help and version
/// output, 2 for usage errors.
fn exit_with(err: clap::Error) -> ! {
    err.print().ok();
    if err.use_stderr() {
        std::process::exit(2);
    }
    std::process::exit(0);
}

/// Rewrites grep-style `-NUM` shorthand into `--context=NUM` before
/// clap sees the arguments. Everything after `--` is left alone.
fn rewrite_context_shorthand(args: impl Iterator<Item = String>) -> Vec<String> {
    let mut rewritten = Vec::new();
    let mut past_options = false;
    for arg in args {
        if !past_options {
            if arg == "--" {
                past_options = true;
            } else if arg.len() > 1
                && arg.starts_with('-')
                && arg[1..].bytes().all(|b| b.is_ascii_digit())
            {
                rewritten.push(format!("--context={}", &arg[1..]));
                continue;
            }
        }
        rewritten.push(arg);
    }
    rewritten
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SCOUR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Turns parsed arguments into the run configuration and operand list.
fn build_config(cli: Cli) -> Result<(SearchConfig, Vec<String>)> {
    let mut patterns = cli.regexp;
    let mut operands = cli.operands;

    if patterns.is_empty() && cli.pattern_file.is_none() {
        if operands.is_empty() {
            exit_with(
                Cli::command()
                    .error(clap::error::ErrorKind::MissingRequiredArgument, "no pattern given"),
            );
        }
        patterns.push(operands.remove(0));
    }
    if let Some(path) = &cli.pattern_file {
        patterns.extend(load_config_lines(path)?);
    }

    let exclude_names = match &cli.exclude_from {
        Some(path) => load_config_lines(path)?,
        None => Vec::new(),
    };

    let syntax = if cli.extended_regexp {
        PatternSyntax::Extended
    } else if cli.fixed_strings {
        PatternSyntax::Fixed
    } else if cli.perl_regexp {
        PatternSyntax::Perl
    } else {
        PatternSyntax::Basic
    };

    let mut directories = match cli.directories {
        Some(DirectoriesArg::Recurse) => DirectoryAction::Recurse,
        Some(DirectoriesArg::Skip) => DirectoryAction::Skip,
        Some(DirectoriesArg::Read) | None => DirectoryAction::Read,
    };
    if cli.recursive || cli.dereference_recursive {
        directories = DirectoryAction::Recurse;
    }

    let devices = match cli.devices {
        Some(DevicesArg::Skip) => DeviceAction::Skip,
        Some(DevicesArg::Read) | None => DeviceAction::Read,
    };

    let binary_mode = if let Some(mode) = cli.binary_files {
        match mode {
            BinaryFilesArg::Binary => BinaryMode::Binary,
            BinaryFilesArg::Text => BinaryMode::Text,
            BinaryFilesArg::WithoutMatch => BinaryMode::WithoutMatch,
        }
    } else if cli.skip_binary {
        BinaryMode::WithoutMatch
    } else if cli.text {
        BinaryMode::Text
    } else {
        BinaryMode::Binary
    };

    let group_separator = if cli.no_group_separator {
        None
    } else {
        Some(cli.group_separator.unwrap_or_else(|| "--".to_string()))
    };

    let config = SearchConfig {
        patterns,
        syntax,
        ignore_case: cli.ignore_case && !cli.no_ignore_case,
        invert_match: cli.invert_match,
        word_regexp: cli.word_regexp,
        line_regexp: cli.line_regexp,
        null_data: cli.null_data,
        keep_cr: cli.keep_cr,
        line_number: cli.line_number,
        byte_offset: cli.byte_offset,
        only_matching: cli.only_matching,
        count: cli.count,
        files_with_matches: cli.files_with_matches,
        files_without_match: cli.files_without_match,
        quiet: cli.quiet,
        no_messages: cli.no_messages,
        max_count: cli.max_count,
        before_context: cli.before_context.or(cli.context).unwrap_or(0),
        after_context: cli.after_context.or(cli.context).unwrap_or(0),
        group_separator,
        recursive: directories == DirectoryAction::Recurse,
        follow_symlinks: cli.dereference_recursive,
        directories,
        devices,
        binary_mode,
        include_glob: cli.include,
        exclude_glob: cli.exclude,
        exclude_dir_glob: cli.exclude_dir,
        exclude_names,
        with_filename: cli.with_filename,
        no_filename: cli.no_filename,
        null_terminate_names: cli.null,
        initial_tab: cli.initial_tab,
        line_buffered: cli.line_buffered,
    };

    Ok((config, operands))
}

/// Reads a pattern or exclusion file: one entry per line, trailing CR
/// and LF stripped, blank lines kept as empty entries.
fn load_config_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| anyhow!("{}: {}", path.display(), e))?;
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();
    if text.ends_with('\n') {
        lines.pop();
    }
    Ok(lines)
}

fn resolve_color(when: Option<ColorWhen>) -> ColorChoice {
    match when.unwrap_or(ColorWhen::Never) {
        ColorWhen::Never => ColorChoice::Never,
        ColorWhen::Always => ColorChoice::Always,
        ColorWhen::Auto => {
            if io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
}
