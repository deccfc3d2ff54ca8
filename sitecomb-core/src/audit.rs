use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitecomb_crawler::error::Result;
use sitecomb_crawler::{AuditMode, Crawler, DEFAULT_EXCLUDED_EXTENSIONS, PageRecord};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Options for configuring an audit run
pub struct AuditOptions {
    pub seed_url: String,
    pub mode: AuditMode,
    pub delay: Duration,
    pub timeout: Duration,
    pub max_pages: Option<usize>,
    pub excluded_extensions: Vec<String>,
    pub show_progress: bool,
}

impl AuditOptions {
    pub fn new(seed_url: impl Into<String>, mode: AuditMode) -> Self {
        Self {
            seed_url: seed_url.into(),
            mode,
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
            max_pages: None,
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            show_progress: true,
        }
    }
}

/// Execute an audit crawl with the given options.
/// Returns one record per visited page.
pub async fn execute_audit(options: AuditOptions) -> Result<Vec<PageRecord>> {
    let AuditOptions {
        seed_url,
        mode,
        delay,
        timeout,
        max_pages,
        excluded_extensions,
        show_progress,
    } = options;

    // Spinner for overall progress (only if enabled)
    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting audit...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = Crawler::new(mode)
        .with_delay(delay)
        .with_timeout(timeout)
        .with_excluded_extensions(excluded_extensions);
    if let Some(cap) = max_pages {
        crawler = crawler.with_max_pages(cap);
    }

    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        let processed = Arc::new(AtomicUsize::new(0));
        crawler = crawler.with_progress_callback(Arc::new(move |record: &PageRecord| {
            let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
            pb_clone.set_message(format!("Auditing... {} pages ({})", count, record.url));
            pb_clone.tick();
        }));
    }

    let records = crawler.crawl(&seed_url).await?;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("Audit complete: {} pages visited", records.len()));
    }

    Ok(records)
}

/// Pages that answered 404 during a status audit.
pub fn broken_pages(records: &[PageRecord]) -> Vec<&PageRecord> {
    records.iter().filter(|r| r.is_broken()).collect()
}

/// Generate the console summary for a finished audit.
pub fn summarize_audit(records: &[PageRecord], mode: AuditMode) -> String {
    if records.is_empty() {
        return "No pages found.\n".to_string();
    }

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Pages visited: {}\n", records.len()));

    let unreachable = records.iter().filter(|r| r.is_unreachable()).count();

    match mode {
        AuditMode::Status => {
            let count_in = |low: u16, high: u16| {
                records
                    .iter()
                    .filter(|r| r.status_code().is_some_and(|c| (low..=high).contains(&c)))
                    .count()
            };
            report.push_str(&format!(
                "  2xx success:     {}\n",
                count_in(200, 299).to_string().green()
            ));
            report.push_str(&format!(
                "  3xx redirect:    {}\n",
                count_in(300, 399).to_string().cyan()
            ));
            report.push_str(&format!(
                "  4xx client err:  {}\n",
                count_in(400, 499).to_string().yellow()
            ));
            report.push_str(&format!(
                "  5xx server err:  {}\n",
                count_in(500, 599).to_string().red()
            ));
            report.push_str(&format!("  Unreachable:     {}\n", unreachable));

            let broken = broken_pages(records);
            if !broken.is_empty() {
                report.push_str("\n# Broken pages (404):\n");
                for record in broken {
                    report.push_str(&format!("  {}\n", record.url));
                }
            }
        }
        AuditMode::Readability => {
            let scores: Vec<f64> = records.iter().filter_map(|r| r.score()).collect();
            if !scores.is_empty() {
                let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                report.push_str(&format!(
                    "  Grade level:     {:.2} min / {:.2} mean / {:.2} max\n",
                    min, mean, max
                ));
            }
            report.push_str(&format!("  Unreachable:     {}\n", unreachable));
        }
        AuditMode::Sitemap => {}
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report
}
