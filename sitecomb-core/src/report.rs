use sitecomb_crawler::{AuditMode, PageOutcome, PageRecord};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    Text,
    Xml,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "json" => Some(ReportFormat::Json),
            "text" | "txt" => Some(ReportFormat::Text),
            "xml" => Some(ReportFormat::Xml),
            _ => None,
        }
    }
}

/// CSV rows for a status or readability audit. Unreachable pages keep their
/// row with an empty value cell.
pub fn generate_csv(records: &[PageRecord], mode: AuditMode) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(vec![]);

    let value_header = match mode {
        AuditMode::Readability => "Readability Score",
        _ => "Status Code",
    };
    writer.write_record(["URL", value_header])?;

    for record in records {
        let value = match record.outcome {
            PageOutcome::Status(code) => code.to_string(),
            PageOutcome::Readability(score) => format!("{:.2}", score),
            PageOutcome::Discovered | PageOutcome::Unreachable => String::new(),
        };
        writer.write_record([record.url.as_str(), value.as_str()])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Sitemap-protocol XML document with one `<url><loc>` entry per record.
pub fn generate_sitemap_xml(records: &[PageRecord]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for record in records {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&record.url)));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// The `<loc>` values of a sitemap document, unescaped.
pub fn sitemap_locations(xml: &str) -> Vec<String> {
    let mut locations = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<loc>") {
        let after = &rest[start + 5..];
        match after.find("</loc>") {
            Some(end) => {
                locations.push(unescape_xml(&after[..end]));
                rest = &after[end + 6..];
            }
            None => break,
        }
    }
    locations
}

pub fn generate_json_report(
    records: &[PageRecord],
    seed_url: &str,
    mode: AuditMode,
) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sitecomb",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "audit": {
                "seed_url": seed_url,
                "mode": mode.to_string(),
                "total_pages": records.len(),
                "unreachable": records.iter().filter(|r| r.is_unreachable()).count()
            },
            "pages": records
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_text_report(records: &[PageRecord], seed_url: &str, mode: AuditMode) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                SITECOMB AUDIT REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Seed URL:     {}\n", seed_url));
    report.push_str(&format!("Mode:         {}\n", mode));
    report.push_str(&format!(
        "Generated:    {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str(&format!("Pages:        {}\n\n", records.len()));

    for record in records {
        let line = match record.outcome {
            PageOutcome::Status(code) => format!("  {:>11}  {}\n", code, record.url),
            PageOutcome::Readability(score) => format!("  {:>11.2}  {}\n", score, record.url),
            PageOutcome::Discovered => format!("  {:>11}  {}\n", "-", record.url),
            PageOutcome::Unreachable => format!("  {:>11}  {}\n", "unreachable", record.url),
        };
        report.push_str(&line);
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report
}

/// Write `content` to `path`, expanding a leading tilde first.
/// Returns the expanded path.
pub fn save_report(content: &str, path: &str) -> std::io::Result<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());
    let mut file = File::create(&expanded)?;
    file.write_all(content.as_bytes())?;
    Ok(expanded)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
