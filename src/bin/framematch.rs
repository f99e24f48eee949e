use std::{error::Error, path::PathBuf, process, sync::Arc};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use framematch::{
    DiffMode, ExportSettings, FfmpegLogLevel, MatchOptions, PngWriter, ResizeFilter, ScanObserver,
    ScanUpdate, VideoSource, comparison_dimensions, evenly_spaced, export_matches,
    load_reference_frames, match_all_sources, parse_dimensions, parse_frame_list,
    set_ffmpeg_log_level,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framematch v1.mkv v2.mkv v3.mkv\n  framematch v1.mkv v2.mkv --number 10 --ratio 8 --precision\n  framematch v1.mkv v2.mkv --frames 1000,5000,9000 --grouping\n  framematch v1.mkv v2.mkv --output 1280x720 --noref --json";

#[derive(Debug, Parser)]
#[command(
    name = "framematch",
    version,
    about = "Find matching frames across differently-encoded video sources and export them as images",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Video sources. The first is the reference; order is significant.
    #[arg(required = true, num_args = 1..)]
    sources: Vec<PathBuf>,

    /// Number of evenly spaced reference frames (ignored with --frames).
    #[arg(short, long, default_value_t = 5)]
    number: u64,

    /// Export resolution as WIDTHxHEIGHT (default: the reference source's
    /// native resolution).
    #[arg(short, long)]
    output: Option<String>,

    /// Comparison-downscale multiplier. Larger values compare bigger
    /// thumbnails: slower, but can disambiguate near-identical frames.
    #[arg(short, long, default_value_t = 5)]
    ratio: u32,

    /// Score all three planes instead of luma only (slower).
    #[arg(short, long)]
    precision: bool,

    /// Do not decode or save frames of the reference source.
    #[arg(long)]
    noref: bool,

    /// Explicit comma-separated reference frame indices; overrides --number.
    #[arg(short, long)]
    frames: Option<String>,

    /// Dump the current best matches at every progress tick.
    #[arg(short, long)]
    verbose: bool,

    /// Resize filter: point, bilinear, bicubic, area, spline, lanczos.
    #[arg(long, default_value = "spline")]
    resizer: String,

    /// Name files REFERENCE-SOURCE-(FRAME).png instead of
    /// SOURCE-REFERENCE-(FRAME).png, so matches for one reference sort
    /// together.
    #[arg(short, long)]
    grouping: bool,

    /// Print the final match table as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Directory receiving the exported images.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info,
    /// verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate shell completions and exit.
    #[arg(long, value_enum)]
    completions: Option<Shell>,
}

/// Prints scan progress lines, and the current best matches when verbose.
struct TerminalProgress {
    verbose: bool,
}

impl ScanObserver for TerminalProgress {
    fn on_progress(&self, update: &ScanUpdate<'_>) {
        let total = update
            .total
            .map(|total| format!("/{total}"))
            .unwrap_or_default();
        eprintln!(
            "{} {} after {}{} frames",
            "progress:".cyan().bold(),
            update.source,
            update.scanned,
            total,
        );
        if self.verbose {
            for (position, entry) in update.matches.iter().enumerate() {
                eprintln!(
                    "  reference {position}: frame {} (score {:.6})",
                    entry.frame_index, entry.score,
                );
            }
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "framematch", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let parsed =
            FfmpegLogLevel::parse(level).ok_or(format!("unsupported --log-level: {level}"))?;
        set_ffmpeg_log_level(parsed);
    }

    // Resolve all configuration before touching any file.
    let filter: ResizeFilter = cli.resizer.parse()?;
    let output_dimensions = cli.output.as_deref().map(parse_dimensions).transpose()?;
    let explicit_frames = cli.frames.as_deref().map(parse_frame_list).transpose()?;
    let diff_mode = if cli.precision {
        DiffMode::Precision
    } else {
        DiffMode::Fast
    };

    eprintln!("{} Loading sources", "info:".cyan().bold());
    let mut sources = Vec::with_capacity(cli.sources.len());
    for path in &cli.sources {
        let source = VideoSource::open(path)?;
        let metadata = source.metadata();
        eprintln!(
            "- {} ({}x{}, {} frames, {})",
            source.basename(),
            metadata.width,
            metadata.height,
            metadata.frame_count,
            metadata.codec,
        );
        sources.push(source);
    }

    let mut reference_source = sources.remove(0);
    let mut scanned_sources = sources;
    let reference_metadata = reference_source.metadata().clone();

    let (comparison_width, comparison_height) = comparison_dimensions(
        reference_metadata.width,
        reference_metadata.height,
        cli.ratio,
    )?;
    eprintln!(
        "{} Reference is {}x{}, comparing at {}x{} (ratio {}, {} filter)",
        "info:".cyan().bold(),
        reference_metadata.width,
        reference_metadata.height,
        comparison_width,
        comparison_height,
        cli.ratio,
        filter,
    );

    let reference_indices = match explicit_frames {
        Some(indices) => indices,
        None => evenly_spaced(reference_metadata.frame_count, cli.number)?,
    };
    eprintln!(
        "{} Reference frames: {:?}",
        "info:".cyan().bold(),
        reference_indices,
    );

    let references = load_reference_frames(
        &reference_source,
        &reference_indices,
        comparison_width,
        comparison_height,
        filter,
    )?;

    let options = MatchOptions::new()
        .with_ratio(cli.ratio)
        .with_diff_mode(diff_mode)
        .with_resize_filter(filter)
        .with_observer(Arc::new(TerminalProgress {
            verbose: cli.verbose,
        }));

    eprintln!(
        "{} Scanning {} source(s) ({})",
        "info:".cyan().bold(),
        scanned_sources.len(),
        if cli.precision {
            "precision enabled"
        } else {
            "precision disabled"
        },
    );
    let table = match_all_sources(
        &scanned_sources,
        &references,
        comparison_width,
        comparison_height,
        &options,
    )?;

    if cli.json {
        let payload = json!({
            "reference": reference_source.basename(),
            "reference_frames": reference_indices,
            "sources": scanned_sources
                .iter()
                .zip(table.rows())
                .map(|(source, row)| {
                    json!({
                        "name": source.basename(),
                        "matches": reference_indices
                            .iter()
                            .zip(row)
                            .map(|(reference_index, entry)| json!({
                                "reference": reference_index,
                                "frame": entry.frame_index,
                                "score": entry.score,
                            }))
                            .collect::<Vec<_>>(),
                    })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    let settings = ExportSettings {
        output_dimensions,
        filter,
        grouping: cli.grouping,
        include_reference: !cli.noref,
        out_dir: cli.out_dir.clone(),
    };

    let export_total = {
        let per_source = reference_indices.len() as u64;
        let source_count = scanned_sources.len() as u64 + u64::from(!cli.noref);
        per_source * source_count
    };
    let progress_bar = ProgressBar::new(export_total);
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    progress_bar.set_message("exporting");

    let writer = CountingWriter {
        inner: PngWriter,
        bar: progress_bar.clone(),
    };
    let report = export_matches(
        &mut reference_source,
        &mut scanned_sources,
        &reference_indices,
        &table,
        &writer,
        &settings,
    )?;
    progress_bar.finish_with_message("done");

    for (path, error) in &report.failed {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("failed to export {}: {error}", path.display()).yellow(),
        );
    }

    if report.is_complete() {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!(
                "Exported {} image(s) to {}",
                report.written.len(),
                settings.out_dir.display()
            )
            .green(),
        );
        Ok(())
    } else {
        Err(format!(
            "{} of {} image(s) failed to export",
            report.failed.len(),
            report.failed.len() + report.written.len(),
        )
        .into())
    }
}

/// Wraps the PNG writer to advance the export progress bar per image.
struct CountingWriter {
    inner: PngWriter,
    bar: ProgressBar,
}

impl framematch::ImageWriter for CountingWriter {
    fn write(
        &self,
        image: &image::DynamicImage,
        path: &std::path::Path,
    ) -> Result<(), framematch::FrameMatchError> {
        let result = self.inner.write(image, path);
        self.bar.inc(1);
        result
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["framematch", "v1.mkv", "v2.mkv"]).unwrap();
        assert_eq!(cli.number, 5);
        assert_eq!(cli.ratio, 5);
        assert_eq!(cli.resizer, "spline");
        assert!(!cli.precision);
        assert!(!cli.noref);
        assert!(!cli.grouping);
        assert_eq!(cli.sources.len(), 2);
    }

    #[test]
    fn requires_at_least_one_source() {
        assert!(Cli::try_parse_from(["framematch"]).is_err());
    }

    #[test]
    fn short_flags_parse() {
        let cli = Cli::try_parse_from([
            "framematch", "-n", "3", "-r", "8", "-p", "-g", "-f", "10,20", "a.mkv", "b.mkv",
        ])
        .unwrap();
        assert_eq!(cli.number, 3);
        assert_eq!(cli.ratio, 8);
        assert!(cli.precision);
        assert!(cli.grouping);
        assert_eq!(cli.frames.as_deref(), Some("10,20"));
    }
}
