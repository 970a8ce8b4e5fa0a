//! Compare command - diff two documents and write the reports.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use pdfdiff_core::{
    Cancellation, DiffConfig, DiffError, DiffReport, LoadOptions, ReportSynthesizer, ReportWriter,
    SourceDocument, open_source,
};

use super::config::load_config;

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// First ("original") document: a PDF file or a rendered-page directory
    file1: PathBuf,

    /// Second document to compare against the first
    file2: PathBuf,

    /// Output prefix for the report files
    prefix: PathBuf,

    /// Also write the summary to <prefix>_summary.txt
    #[arg(short, long)]
    dump: bool,

    /// Compare page rasters and write <prefix>_visual_diff.pdf
    #[arg(short, long)]
    graphical: bool,

    /// Also write <prefix>_report.json
    #[arg(long)]
    json: bool,

    /// What to print on stdout
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Only compare the first N pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Compare pages on a single thread
    #[arg(long)]
    sequential: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text summary
    Text,
    /// JSON report
    Json,
}

impl CompareArgs {
    /// Apply command-line flags on top of the loaded configuration.
    fn apply(&self, config: &mut DiffConfig) {
        if self.dump {
            config.report.dump_summary = true;
        }
        if self.graphical {
            config.raster.enabled = true;
        }
        if let Some(max_pages) = self.max_pages {
            config.source.max_pages = max_pages;
        }
        if let Some(timeout) = self.timeout {
            config.run.deadline_secs = timeout;
        }
        if self.sequential {
            config.run.parallel = false;
        }
    }
}

pub async fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.apply(&mut config);

    for input in [&args.file1, &args.file2] {
        if !input.exists() {
            anyhow::bail!("Input not found: {}", input.display());
        }
    }

    info!(
        "Comparing {} with {}",
        args.file1.display(),
        args.file2.display()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let cancel = Cancellation::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling comparison");
            interrupt.cancel();
        }
    });

    let report = {
        let (file1, file2) = (args.file1.clone(), args.file2.clone());
        let config = config.clone();
        let pb = pb.clone();
        tokio::task::spawn_blocking(move || compare(&file1, &file2, &config, cancel, &pb))
            .await
            .context("Comparison task failed")??
    };
    pb.finish_and_clear();

    let writer = ReportWriter::new(&args.prefix).with_search_tag(config.report.search_tag.clone());
    let written = writer
        .write_all(&report, config.report.dump_summary)
        .context("Failed to write reports")?;

    eprintln!("{} Wrote {}", style("✓").green(), written.whole.display());
    if let Some(path) = &written.paginated {
        eprintln!("{} Wrote {}", style("✓").green(), path.display());
    }
    if let Some(visual) = &written.visual {
        eprintln!("{} Wrote {}", style("✓").green(), visual.path.display());
        if let Some(reason) = &visual.aborted {
            eprintln!(
                "{} Visual report is incomplete ({} pages written): {}",
                style("!").yellow(),
                visual.pages.len(),
                reason
            );
        }
    }
    if let Some(path) = &written.summary {
        eprintln!("{} Wrote {}", style("✓").green(), path.display());
    }
    if args.json {
        let path = writer.write_json(&report).context("Failed to write JSON report")?;
        eprintln!("{} Wrote {}", style("✓").green(), path.display());
    }

    match args.format {
        OutputFormat::Text => println!("{}", report.summary),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "file1": args.file1.display().to_string(),
                "file2": args.file2.display().to_string(),
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    debug!("Total comparison time: {:?}", start.elapsed());

    Ok(())
}

/// Load both documents and run the comparison, falling back to the
/// whole-document report when either cannot be paginated.
fn compare(
    file1: &Path,
    file2: &Path,
    config: &DiffConfig,
    cancel: Cancellation,
    pb: &ProgressBar,
) -> anyhow::Result<DiffReport> {
    let options = LoadOptions::from_config(config);

    pb.set_message(format!("Reading {}...", file1.display()));
    let a = load_document(file1, &options)?;
    pb.set_message(format!("Reading {}...", file2.display()));
    let b = load_document(file2, &options)?;

    pb.set_message("Comparing documents...");
    let synthesizer = ReportSynthesizer::new(config.clone()).with_cancellation(cancel);
    match synthesizer.run(&a, &b) {
        Ok(report) => Ok(report),
        Err(DiffError::Pagination(reason)) => {
            warn!("{}, comparing whole documents only", reason);
            synthesizer
                .whole_document_report(&a.text, &b.text)
                .context("Whole-document comparison failed")
        }
        Err(e) => Err(e).context("Comparison failed"),
    }
}

fn load_document(path: &Path, options: &LoadOptions) -> anyhow::Result<SourceDocument> {
    let document = open_source(path)
        .and_then(|source| source.load(options))
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!(
        "{}: {} pages",
        path.display(),
        document
            .page_count()
            .map_or_else(|| "unpaginated".to_string(), |n| n.to_string())
    );
    Ok(document)
}
