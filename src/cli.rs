//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::batch::ProgressCallback;
use crate::stats::{PageAlgorithm, StatisticKind};

/// Exit codes for the CLI
///
/// These codes follow standard Unix conventions and provide
/// specific error categories for scripting and automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArgs = 2,
    InputNotFound = 3,
    OutputError = 4,
    ProcessingError = 5,
    ConfigError = 6,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get human-readable description
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::InvalidArgs => "Invalid arguments",
            ExitCode::InputNotFound => "Input file not found",
            ExitCode::OutputError => "Output error (permission denied, disk full, etc.)",
            ExitCode::ProcessingError => "Processing error",
            ExitCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code() as u8)
    }
}

/// Page, word and readability statistics for e-book files
#[derive(Parser, Debug)]
#[command(name = "bookstat")]
#[command(version)]
#[command(about = "Estimate page, word and readability statistics for e-books", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count statistics for one or more books
    Count(CountArgs),
    /// Show the effective configuration and supported formats
    Info,
}

/// Statistic selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatArg {
    Pages,
    Words,
    FleschReading,
    FleschGrade,
    GunningFog,
}

impl From<StatArg> for StatisticKind {
    fn from(arg: StatArg) -> Self {
        match arg {
            StatArg::Pages => StatisticKind::PageCount,
            StatArg::Words => StatisticKind::WordCount,
            StatArg::FleschReading => StatisticKind::FleschReadingEase,
            StatArg::FleschGrade => StatisticKind::FleschKincaidGrade,
            StatArg::GunningFog => StatisticKind::GunningFogIndex,
        }
    }
}

/// Page-count algorithm selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// Paragraph-density scan of the markup
    Paragraph,
    /// Reflow pagination engine totals
    Reader,
    /// Compressed container bytes
    FixedSize,
}

impl From<AlgorithmArg> for PageAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Paragraph => PageAlgorithm::ParagraphDensity,
            AlgorithmArg::Reader => PageAlgorithm::ReaderPagination,
            AlgorithmArg::FixedSize => PageAlgorithm::FixedSize,
        }
    }
}

/// Arguments for the count command
#[derive(clap::Args, Debug)]
pub struct CountArgs {
    /// Book files to process (EPUB, HTML, PDF, CBZ, CBR)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Statistics to compute (defaults to all)
    #[arg(short, long, value_enum)]
    pub statistics: Vec<StatArg>,

    /// Page-count algorithm for reflowable books
    #[arg(short, long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// Fetch page counts from the remote metadata site instead of
    /// estimating locally
    #[arg(short, long)]
    pub remote: bool,

    /// Remote identifier (single input only)
    #[arg(long)]
    pub remote_id: Option<String>,

    /// Write results to this JSON store
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep statistics already present in the store
    #[arg(long)]
    pub no_overwrite: bool,

    /// Number of worker threads
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CountArgs {
    /// Requested statistic kinds, defaulting to all of them.
    pub fn statistic_kinds(&self) -> Vec<StatisticKind> {
        if self.statistics.is_empty() {
            StatisticKind::ALL.to_vec()
        } else {
            self.statistics.iter().map(|s| (*s).into()).collect()
        }
    }

    /// Get thread count (default to available CPUs)
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }
}

/// Create a styled progress bar for batch processing
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb
}

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Progress callback driving an indicatif bar.
pub struct BarProgress {
    bar: ProgressBar,
    total: u64,
}

impl BarProgress {
    pub fn new(total: u64) -> Self {
        Self {
            bar: create_progress_bar(total),
            total,
        }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, fraction: f64, label: &str) {
        let position = (fraction * self.total as f64).round() as u64;
        self.bar.set_position(position.min(self.total));
        self.bar.set_message(label.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        // Verify CLI can be built
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_display() {
        let mut cmd = Cli::command();
        let help = cmd.render_help().to_string();
        assert!(help.contains("bookstat"));
        assert!(help.contains("count"));
    }

    #[test]
    fn test_missing_input_error() {
        let result = Cli::try_parse_from(["bookstat", "count"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_option_parsing() {
        let cli = Cli::try_parse_from([
            "bookstat",
            "count",
            "book.epub",
            "--statistics",
            "pages",
            "--statistics",
            "gunning-fog",
            "--algorithm",
            "fixed-size",
            "-vv",
        ])
        .unwrap();

        if let Commands::Count(args) = cli.command {
            assert_eq!(args.inputs, vec![PathBuf::from("book.epub")]);
            assert_eq!(
                args.statistic_kinds(),
                vec![StatisticKind::PageCount, StatisticKind::GunningFogIndex]
            );
            assert_eq!(args.algorithm, Some(AlgorithmArg::FixedSize));
            assert_eq!(args.verbose, 2);
        } else {
            panic!("Expected Count command");
        }
    }

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["bookstat", "count", "book.epub"]).unwrap();

        if let Commands::Count(args) = cli.command {
            assert_eq!(args.statistic_kinds().len(), 5);
            assert!(args.algorithm.is_none());
            assert!(!args.remote);
            assert!(!args.no_overwrite);
            assert!(!args.quiet);
            assert_eq!(args.verbose, 0);
        } else {
            panic!("Expected Count command");
        }
    }

    #[test]
    fn test_remote_options() {
        let cli = Cli::try_parse_from([
            "bookstat",
            "count",
            "book.epub",
            "--remote",
            "--remote-id",
            "12345",
        ])
        .unwrap();

        if let Commands::Count(args) = cli.command {
            assert!(args.remote);
            assert_eq!(args.remote_id.as_deref(), Some("12345"));
        } else {
            panic!("Expected Count command");
        }
    }

    #[test]
    fn test_info_command() {
        let cli = Cli::try_parse_from(["bookstat", "info"]).unwrap();
        assert!(matches!(cli.command, Commands::Info));
    }

    #[test]
    fn test_algorithm_conversion() {
        assert_eq!(
            PageAlgorithm::from(AlgorithmArg::Paragraph),
            PageAlgorithm::ParagraphDensity
        );
        assert_eq!(
            PageAlgorithm::from(AlgorithmArg::Reader),
            PageAlgorithm::ReaderPagination
        );
        assert_eq!(
            PageAlgorithm::from(AlgorithmArg::FixedSize),
            PageAlgorithm::FixedSize
        );
    }

    #[test]
    fn test_progress_bar_display() {
        let pb = create_progress_bar(100);
        assert_eq!(pb.length(), Some(100));

        pb.set_position(50);
        assert_eq!(pb.position(), 50);

        pb.finish_with_message("done");
    }

    #[test]
    fn test_bar_progress_callback() {
        let progress = BarProgress::new(4);
        progress.on_progress(0.5, "Counting statistics");
        assert_eq!(progress.bar.position(), 2);
        progress.on_progress(1.0, "Counting statistics");
        assert_eq!(progress.bar.position(), 4);
        progress.finish();
    }

    #[test]
    fn test_spinner_creation() {
        let spinner = create_spinner("Processing...");
        assert_eq!(spinner.message(), "Processing...");
        spinner.finish_with_message("Complete");
    }

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::GeneralError.code(), 1);
        assert_eq!(ExitCode::InvalidArgs.code(), 2);
        assert_eq!(ExitCode::InputNotFound.code(), 3);
        assert_eq!(ExitCode::OutputError.code(), 4);
        assert_eq!(ExitCode::ProcessingError.code(), 5);
        assert_eq!(ExitCode::ConfigError.code(), 6);
    }

    #[test]
    fn test_exit_code_descriptions() {
        assert_eq!(ExitCode::Success.description(), "Success");
        assert!(!ExitCode::ProcessingError.description().is_empty());
        assert!(!ExitCode::ConfigError.description().is_empty());
    }

    #[test]
    fn test_exit_code_into_i32() {
        let code: i32 = ExitCode::Success.into();
        assert_eq!(code, 0);

        let code: i32 = ExitCode::ConfigError.into();
        assert_eq!(code, 6);
    }
}
