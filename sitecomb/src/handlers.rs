use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use sitecomb_core::audit::{AuditOptions, broken_pages, execute_audit, summarize_audit};
use sitecomb_core::matcher::{generate_matches_csv, load_url_pairs, match_redirects};
use sitecomb_core::report::{
    ReportFormat, generate_csv, generate_json_report, generate_sitemap_xml, generate_text_report,
    save_report,
};
use sitecomb_crawler::{AuditMode, PageRecord};
use std::time::Duration;
use url::Url;

// Helper functions for the audit handlers

/// Normalize a seed argument to an absolute URL, trying http:// for bare hosts
pub fn normalize_seed_url(raw: &str) -> Option<String> {
    // Try to parse as-is
    if Url::parse(raw).is_ok() {
        return Some(raw.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", raw);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    None
}

/// Split a comma-separated extension list into lowercase filters.
/// An empty argument disables extension skipping entirely.
pub fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn audit_options_from_args(
    sub_matches: &ArgMatches,
    mode: AuditMode,
    quiet: bool,
) -> Result<AuditOptions> {
    let raw_url = sub_matches.get_one::<String>("url").unwrap();
    let seed_url = normalize_seed_url(raw_url)
        .with_context(|| format!("Invalid seed URL '{}'", raw_url))?;

    let mut options = AuditOptions::new(seed_url, mode);
    options.delay = Duration::from_secs(*sub_matches.get_one::<u64>("delay").unwrap_or(&1));
    options.timeout = Duration::from_secs(*sub_matches.get_one::<u64>("timeout").unwrap_or(&5));
    options.max_pages = sub_matches.get_one::<usize>("max-pages").copied();
    if let Some(raw) = sub_matches.get_one::<String>("skip-ext") {
        options.excluded_extensions = parse_extension_list(raw);
    }
    options.show_progress = !quiet;

    Ok(options)
}

async fn run_crawl(
    sub_matches: &ArgMatches,
    mode: AuditMode,
    quiet: bool,
) -> Result<(Vec<PageRecord>, String)> {
    let options = audit_options_from_args(sub_matches, mode, quiet)?;
    let seed_url = options.seed_url.clone();

    // Print crawl configuration
    if !quiet {
        println!("\n🕸️  Crawling {}", seed_url);
        println!("Mode: {}", mode);
        println!("Delay: {}s", options.delay.as_secs());
        println!("Timeout: {}s", options.timeout.as_secs());
        match options.max_pages {
            Some(cap) => println!("Max pages: {}\n", cap),
            None => println!("Max pages: unlimited\n"),
        }
    }

    let records = execute_audit(options).await?;
    Ok((records, seed_url))
}

fn render_report(
    records: &[PageRecord],
    seed_url: &str,
    mode: AuditMode,
    format: ReportFormat,
) -> Result<String> {
    let content = match format {
        ReportFormat::Csv => generate_csv(records, mode)?,
        ReportFormat::Json => generate_json_report(records, seed_url, mode)?,
        ReportFormat::Text => generate_text_report(records, seed_url, mode),
        ReportFormat::Xml => generate_sitemap_xml(records),
    };
    Ok(content)
}

fn resolve_format(sub_matches: &ArgMatches) -> Result<ReportFormat> {
    let raw = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("csv");
    ReportFormat::from_str(raw).with_context(|| format!("Unknown report format '{}'", raw))
}

/// Run a status or readability audit and emit the report per the output flags.
pub async fn handle_audit(sub_matches: &ArgMatches, mode: AuditMode, quiet: bool) -> Result<()> {
    let (records, seed_url) = run_crawl(sub_matches, mode, quiet).await?;

    if !quiet {
        print!("{}", summarize_audit(&records, mode));
    }

    let format = resolve_format(sub_matches)?;
    let content = render_report(&records, &seed_url, mode, format)?;

    match sub_matches.get_one::<String>("output") {
        Some(path) => {
            let saved = save_report(&content, path)
                .with_context(|| format!("Failed to write report to {}", path))?;
            println!("{} Report saved to: {}", "✓".green().bold(), saved.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}

/// Status-mode crawl that reports only the pages answering 404.
pub async fn handle_broken(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let (records, _) = run_crawl(sub_matches, AuditMode::Status, quiet).await?;
    let broken = broken_pages(&records);

    if broken.is_empty() {
        println!(
            "{} No broken pages found ({} pages checked)",
            "✓".green().bold(),
            records.len()
        );
    } else {
        println!(
            "{} {} broken page(s) out of {} checked:\n",
            "✗".red().bold(),
            broken.len(),
            records.len()
        );
        for record in &broken {
            println!("  {}", record.url);
        }
    }

    if let Some(path) = sub_matches.get_one::<String>("output") {
        let mut content = String::new();
        for record in &broken {
            content.push_str(&record.url);
            content.push('\n');
        }
        let saved = save_report(&content, path)
            .with_context(|| format!("Failed to write broken page list to {}", path))?;
        println!(
            "{} Broken page list saved to: {}",
            "✓".green().bold(),
            saved.display()
        );
    }

    Ok(())
}

/// Discovery crawl that writes the sitemap XML document.
pub async fn handle_sitemap(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let (records, _) = run_crawl(sub_matches, AuditMode::Sitemap, quiet).await?;

    let xml = generate_sitemap_xml(&records);
    let path = sub_matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or("sitemap.xml");
    let saved = save_report(&xml, path)
        .with_context(|| format!("Failed to write sitemap to {}", path))?;

    println!(
        "{} Sitemap with {} URL(s) saved to: {}",
        "✓".green().bold(),
        records.len(),
        saved.display()
    );

    Ok(())
}

/// Offline staging-to-public URL matching over a CSV of URL pairs.
pub fn handle_match(sub_matches: &ArgMatches) -> Result<()> {
    let input = sub_matches.get_one::<String>("input").unwrap();
    let (staging, public) = load_url_pairs(input)
        .with_context(|| format!("Failed to read URL pairs from {}", input))?;
    if staging.is_empty() {
        bail!("No URL pairs found in {}", input);
    }

    let matches = match_redirects(&staging, &public);
    let csv = generate_matches_csv(&matches)?;

    match sub_matches.get_one::<String>("output") {
        Some(path) => {
            let saved = save_report(&csv, path)
                .with_context(|| format!("Failed to write match table to {}", path))?;
            println!(
                "{} {} match(es) saved to: {}",
                "✓".green().bold(),
                matches.len(),
                saved.display()
            );
        }
        None => print!("{}", csv),
    }

    Ok(())
}
