//! The `pictag tag` command.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, ValueEnum};
use futures_util::stream::{self, StreamExt};
use pictag_core::types::ProcessingStats;
use pictag_core::{
    Config, FileDiscovery, OutputFormat as CoreOutputFormat, OutputWriter, Pictag, ProcessOptions,
};

#[derive(Args, Debug)]
pub struct TagArgs {
    /// Image file or directory to tag
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Also pick zero-shot keywords for each image
    #[arg(long)]
    pub keywords: bool,

    /// Include the raw classifier and detector output
    #[arg(long)]
    pub raw: bool,

    /// Images recognized concurrently (defaults to processing.parallel_workers)
    #[arg(short, long)]
    pub parallel: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

pub async fn execute(args: TagArgs, config: Config) -> anyhow::Result<()> {
    let format = match args.format {
        Some(format) => format.into(),
        None => config
            .output
            .format
            .parse::<CoreOutputFormat>()
            .map_err(|e| anyhow::anyhow!("output.format: {e}"))?,
    };
    let pretty = config.output.pretty;
    let parallel = args
        .parallel
        .unwrap_or(config.processing.parallel_workers)
        .max(1);

    let pictag = Arc::new(Pictag::new(config));
    let files = pictag.discover(&args.input);
    if files.is_empty() {
        anyhow::bail!("No supported images found at {:?}", args.input);
    }
    tracing::info!(
        "Found {} image(s) to tag ({:.1} MB)",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / (1024.0 * 1024.0)
    );

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let mut writer = OutputWriter::new(sink, format, pretty);

    let options = ProcessOptions {
        keywords: args.keywords,
        include_recognition: args.raw,
    };

    let progress = (files.len() > 1).then(|| create_progress_bar(files.len() as u64));
    let start = Instant::now();
    let mut stats = ProcessingStats::default();

    let mut results = stream::iter(files)
        .map(|file| {
            let pictag = pictag.clone();
            async move {
                let outcome = pictag.process(&file.path, options).await;
                (file.path, outcome)
            }
        })
        .buffered(parallel);

    while let Some((path, outcome)) = results.next().await {
        match outcome {
            Ok(suggestion) => {
                stats.succeeded += 1;
                writer.write(&suggestion)?;
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!("Failed: {:?} - {}", path, e);
            }
        }

        if let Some(progress) = &progress {
            progress.inc(1);
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let done = stats.succeeded + stats.failed;
                progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
            }
        }
    }

    writer.finish()?;

    stats.total_seconds = start.elapsed().as_secs_f64();
    stats.images_per_second = if stats.total_seconds > 0.0 {
        stats.succeeded as f64 / stats.total_seconds
    } else {
        0.0
    };

    if let Some(progress) = progress {
        progress.finish_and_clear();
        print_summary(&stats);
    }
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    if stats.succeeded == 0 {
        anyhow::bail!("All {} image(s) failed", stats.failed);
    }
    Ok(())
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("loading models...");
    pb
}

fn print_summary(stats: &ProcessingStats) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Tagged:       {:>8}", stats.succeeded);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", stats.total_seconds);
    eprintln!("    Rate:         {:>7.1} img/sec", stats.images_per_second);
    eprintln!("  ====================================");
}
