//! # CLI Module
//!
//! Command-line interface for the asset optimizer.
//!
//! ## Usage
//! ```bash
//! # Optimize into ./photon-output
//! photon ./assets
//!
//! # Custom output, quality and resize
//! photon ./assets --out ./dist --quality 70 --width 1280 --webp
//!
//! # Overwrite originals in place (asks for confirmation)
//! photon ./assets --replace
//!
//! # See what would be saved without writing anything
//! photon ./assets --dry-run --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photon_optimizer::core::optimizer::ImageSettings;
use photon_optimizer::core::pipeline::{
    default_concurrency, validate_input_dir, Pipeline, RunStatistics,
};
use photon_optimizer::core::reporter::{ReportContext, RunReport, REPORT_FILE_NAME};
use photon_optimizer::core::scanner::parse_size;
use photon_optimizer::error::{ReportError, Result};
use photon_optimizer::events::{Event, EventChannel, OptimizeEvent, PipelineEvent, ScanEvent};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

/// Photon - batch-optimize JPEG, PNG and SVG assets
#[derive(Parser, Debug)]
#[command(name = "photon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to optimize
    input: PathBuf,

    /// Output directory
    #[arg(short = 'o', long = "out", default_value = "./photon-output")]
    out: PathBuf,

    /// Quality for JPEG and PNG (1-100)
    #[arg(short, long, default_value_t = 80, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// JPEG quality, overrides --quality for JPEG files
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: Option<u8>,

    /// PNG quality, overrides --quality for PNG files
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    png_quality: Option<u8>,

    /// Resize images to this width in pixels, keeping aspect ratio (0 = keep size)
    #[arg(short, long, default_value_t = 0)]
    width: u32,

    /// Also write a lossless WebP copy of each image
    #[arg(long)]
    webp: bool,

    /// Number of worker threads (default: number of CPUs)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Overwrite the original files instead of writing to --out
    #[arg(short, long)]
    replace: bool,

    /// Skip the confirmation prompt of --replace
    #[arg(long)]
    yes: bool,

    /// Report potential savings without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Skip files smaller than this (e.g. 10kb, 1.5mb)
    #[arg(long, default_value = "0", value_parser = parse_size)]
    min_size: u64,

    /// Maximum directory depth (0 = unlimited, 1 = top level only)
    #[arg(long, default_value_t = 0)]
    depth: usize,

    /// Comma-separated patterns to skip (e.g. node_modules,dist,.git)
    #[arg(long, default_value = "")]
    ignore: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format
    #[arg(long, default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON report on stdout for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    photon_optimizer::init_tracing(cli.verbose);

    validate_input_dir(&cli.input)?;

    let term = Term::stderr();
    let pretty = matches!(cli.output, OutputFormat::Pretty);

    let output_dir = if cli.replace {
        if !cli.yes && !confirm_replace(&term, &cli.input) {
            term.write_line(&format!(
                "{} Operation cancelled. Your files are safe.",
                style("✗").red()
            ))
            .ok();
            return Ok(());
        }
        cli.input.clone()
    } else {
        cli.out.clone()
    };

    let concurrency = cli.concurrency.unwrap_or_else(default_concurrency).max(1);
    let settings = ImageSettings {
        quality: cli.quality,
        jpeg_quality: cli.jpeg_quality.unwrap_or(0),
        png_quality: cli.png_quality.unwrap_or(0),
        width: cli.width,
        webp: cli.webp,
    };

    if pretty {
        print_header(&term, &cli, &output_dir, concurrency);
    }

    let pipeline = Pipeline::builder()
        .input(&cli.input)
        .output(&output_dir)
        .ignore_patterns(&cli.ignore)
        .max_depth(cli.depth)
        .min_size(cli.min_size)
        .concurrency(concurrency)
        .dry_run(cli.dry_run)
        .image_settings(settings)
        .build()?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            // Drain so senders never notice a missing listener
            for _ in receiver.iter() {}
            return;
        };
        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::AssetFound { .. }) => pb.inc_length(1),
                Event::Scan(ScanEvent::Completed { total_assets }) => {
                    pb.set_length(total_assets as u64);
                }
                Event::Optimize(OptimizeEvent::Processed(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => pb.finish_and_clear(),
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let stats = result?;
    let report = RunReport::new(
        &ReportContext {
            quality: cli.quality,
            width: cli.width,
            webp: cli.webp,
            concurrency,
            input: cli.input.clone(),
            output: output_dir.clone(),
        },
        &stats,
    );

    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &stats, &output_dir, verbose),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if cli.dry_run {
        if pretty {
            term.write_line(&format!(
                "  {} Report skipped in dry-run mode",
                style("📄").dim()
            ))
            .ok();
        }
        return Ok(());
    }

    let report_path = output_dir.join(REPORT_FILE_NAME);
    let written = fs::create_dir_all(&output_dir)
        .map_err(|source| ReportError::Write {
            path: output_dir.clone(),
            source,
        })
        .and_then(|_| report.write_to_file(&report_path));
    match written {
        Ok(()) if pretty => {
            term.write_line(&format!(
                "  {} Report: {}",
                style("📄").cyan(),
                report_path.display()
            ))
            .ok();
        }
        Ok(()) => {}
        Err(e) => {
            term.write_line(&format!(
                "  {} Could not write report: {}",
                style("⚠").yellow(),
                e
            ))
            .ok();
        }
    }

    Ok(())
}

/// Ask for a typed `yes` before overwriting originals
fn confirm_replace(term: &Term, input: &Path) -> bool {
    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("⚠  WARNING: Replace mode enabled").yellow().bold()
    ))
    .ok();
    term.write_line(&format!("  All optimizable files in {} will be overwritten.", input.display()))
        .ok();
    term.write_line("  This cannot be undone. Make sure you have a backup.")
        .ok();
    term.write_line("").ok();
    term.write_str("Type 'yes' to continue or press Enter to cancel: ")
        .ok();

    term.read_line()
        .map(|answer| is_confirmation(&answer))
        .unwrap_or(false)
}

fn is_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

fn print_header(term: &Term, cli: &Cli, output_dir: &Path, concurrency: usize) {
    term.write_line(&format!(
        "{} {}",
        style("Photon").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line(&format!("  Input:       {}", cli.input.display()))
        .ok();
    term.write_line(&format!("  Output:      {}", output_dir.display()))
        .ok();
    if cli.dry_run {
        term.write_line(&format!(
            "  Mode:        {}",
            style("DRY RUN (no files will be written)").yellow()
        ))
        .ok();
    }
    if cli.replace {
        term.write_line(&format!(
            "  Mode:        {}",
            style("REPLACE (files will be overwritten)").red()
        ))
        .ok();
    }
    term.write_line(&format!("  Quality:     {}%", cli.quality)).ok();
    if let Some(q) = cli.jpeg_quality {
        term.write_line(&format!("  JPEG:        {}%", q)).ok();
    }
    if let Some(q) = cli.png_quality {
        term.write_line(&format!("  PNG:         {}%", q)).ok();
    }
    term.write_line(&format!("  WebP:        {}", cli.webp)).ok();
    term.write_line(&format!("  Workers:     {}", concurrency)).ok();
    if cli.width > 0 {
        term.write_line(&format!("  Resize:      {}px width", cli.width))
            .ok();
    }
    if cli.min_size > 0 {
        term.write_line(&format!(
            "  Min size:    {}",
            format_bytes(cli.min_size as i64)
        ))
        .ok();
    }
    if cli.depth > 0 {
        term.write_line(&format!("  Max depth:   {} levels", cli.depth))
            .ok();
    }
    if !cli.ignore.is_empty() {
        term.write_line(&format!("  Ignore:      {}", cli.ignore)).ok();
    }
    term.write_line("").ok();
}

fn print_pretty_results(term: &Term, stats: &RunStatistics, output_dir: &Path, verbose: bool) {
    term.write_line(&format!(
        "{} Processing complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files processed",
        style(stats.total_files()).cyan()
    ))
    .ok();
    term.write_line(&format!("  {} successful", style(stats.successful).green()))
        .ok();
    term.write_line(&format!("  {} failed", style(stats.failed).red()))
        .ok();
    term.write_line(&format!(
        "  {} saved in total",
        style(format_bytes(stats.total_bytes_saved)).yellow()
    ))
    .ok();
    if stats.successful > 0 {
        term.write_line(&format!(
            "  {} saved per file on average",
            style(format_bytes(stats.average_savings())).yellow()
        ))
        .ok();
    }
    term.write_line(&format!(
        "  {:.1}% success rate",
        stats.success_rate()
    ))
    .ok();
    term.write_line("").ok();

    let failures: Vec<_> = stats.failures().collect();
    if !failures.is_empty() {
        term.write_line(&format!("{}", style("Failures:").bold().underlined()))
            .ok();
        for record in failures {
            term.write_line(&format!(
                "  {} {}",
                style("✗").red(),
                record.path.display()
            ))
            .ok();
            if verbose {
                if let Some(error) = &record.error {
                    term.write_line(&format!("    {}", style(error).dim())).ok();
                }
            }
        }
        term.write_line("").ok();
    }

    let shown = fs::canonicalize(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    term.write_line(&format!("  {} Output: {}", style("📁").cyan(), shown.display()))
        .ok();
}

/// Human-readable byte count; negative values keep their sign
fn format_bytes(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let sign = if bytes < 0 { "-" } else { "" };
    let abs = bytes.unsigned_abs() as f64;

    if abs >= GB {
        format!("{sign}{:.1} GB", abs / GB)
    } else if abs >= MB {
        format!("{sign}{:.1} MB", abs / MB)
    } else if abs >= KB {
        format!("{sign}{:.1} KB", abs / KB)
    } else {
        format!("{sign}{} bytes", abs as u64)
    }
}
