//! bookstat - Book statistics estimator
//!
//! CLI entry point

use clap::Parser;
use std::time::Duration;

use bookstat::{
    run_batch, write_results_store, BarProgress, BatchOptions, BatchReport, BookSpec, CancelFlag,
    Cli, Commands, CountArgs, ExitCode, FileConfig, ProgressCallback, SilentProgress,
    StatisticKind,
};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Count(args) => run_count(&args),
        Commands::Info => run_info(),
    };
    code.into()
}

/// Initialize logging from the verbosity flag; RUST_LOG still wins when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

// ============ Count Command ============

fn run_count(args: &CountArgs) -> ExitCode {
    init_logging(args.verbose);

    if args.inputs.iter().all(|p| !p.exists()) {
        eprintln!("Error: no input file exists");
        return ExitCode::InputNotFound;
    }

    // Config file first, CLI arguments take precedence.
    let config = match FileConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::ConfigError;
        }
    };

    let mut options = BatchOptions::default();
    config.apply_to(&mut options);

    if !args.statistics.is_empty() {
        options.statistics = args.statistic_kinds();
    }
    if let Some(algorithm) = args.algorithm {
        options.page_algorithm = algorithm.into();
    }
    if args.remote {
        options.use_remote = true;
    }
    if let Some(threads) = args.threads {
        options.threads = Some(threads);
    }

    let books = collect_books(args);
    if books.is_empty() {
        eprintln!("Error: no books to process");
        return ExitCode::InputNotFound;
    }

    let bar = if args.quiet {
        None
    } else {
        Some(BarProgress::new(books.len() as u64))
    };
    let progress: &dyn ProgressCallback = match &bar {
        Some(bar) => bar,
        None => &SilentProgress,
    };

    let cancel = CancelFlag::new();
    let report = match run_batch(&books, &options, progress, &cancel) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::ProcessingError;
        }
    };
    if let Some(bar) = &bar {
        bar.finish();
    }

    print_report(&books, &report, &options.statistics);

    let store_path = args
        .output
        .clone()
        .or_else(|| config.output.store_path.clone());
    if let Some(path) = store_path {
        let overwrite = !args.no_overwrite && config.overwrite_existing();
        if let Err(e) = write_results_store(&path, &report, overwrite) {
            eprintln!("Error: failed to write result store: {e}");
            return ExitCode::OutputError;
        }
        println!("Results written to {}", path.display());
    }

    if report.results.is_empty() {
        ExitCode::ProcessingError
    } else {
        ExitCode::Success
    }
}

/// Number the inputs and derive display titles from file names.
fn collect_books(args: &CountArgs) -> Vec<BookSpec> {
    let single_input = args.inputs.len() == 1;
    args.inputs
        .iter()
        .enumerate()
        .map(|(index, path)| BookSpec {
            id: index as u64 + 1,
            title: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            path: path.clone(),
            remote_id: if single_input {
                args.remote_id.clone()
            } else {
                None
            },
        })
        .collect()
}

fn print_report(books: &[BookSpec], report: &BatchReport, requested: &[StatisticKind]) {
    for book in books {
        let Some(result) = report.results.get(&book.id) else {
            continue;
        };
        println!("{}:", book.title);
        for kind in requested {
            if let Some(value) = result.get(kind) {
                println!("  {}: {}", kind.label(), value);
            }
        }
    }

    if !report.failures.is_empty() {
        println!();
        println!("Failed books:");
        for failure in &report.failures {
            println!("  {}: {}", failure.title, failure.reason);
        }
    }
    if report.skipped > 0 {
        println!("Skipped {} books after cancellation", report.skipped);
    }

    println!();
    println!(
        "Counted statistics for {} of {} books in {}",
        report.counted(),
        books.len(),
        bookstat::util::format_duration(Duration::from_secs_f64(report.elapsed_seconds)),
    );
}

// ============ Info Command ============

fn run_info() -> ExitCode {
    println!("bookstat {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Supported formats:");
    println!("  EPUB / HTML / XHTML (reflowable estimators)");
    println!("  PDF (embedded page count)");
    println!("  CBZ / CBR (comic page count)");
    println!();
    println!("Page algorithms: paragraph, reader, fixed-size");
    println!("Worker threads: {}", num_cpus::get());

    match FileConfig::find_config_file() {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: none (defaults in effect)"),
    }
    ExitCode::Success
}
