//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including statistics, failures, discarded URLs and the pages crawled.

use crate::crawler::CrawlReport;
use crate::output::stats::CrawlStatistics;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum number of rows listed per table
const MAX_ROWS: usize = 50;

/// Generates a markdown summary of a crawl and writes it to a file
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `config_hash` - Hash of the configuration file, if one was used
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(std::io::Error)` - Failed to write summary
pub fn generate_markdown_summary(
    report: &CrawlReport,
    config_hash: Option<&str>,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_markdown_summary(report, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(report: &CrawlReport, config_hash: Option<&str>) -> String {
    let stats = CrawlStatistics::from_report(report);
    let mut md = String::new();

    // Title
    md.push_str("# Link-Crawler Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        stats.duration_seconds
    ));
    md.push_str(&format!(
        "- **Status**: {}\n",
        if report.cancelled {
            "cancelled"
        } else {
            "completed"
        }
    ));
    if let Some(hash) = config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total URLs**: {}\n", stats.total_urls));
    md.push_str(&format!("- **Pages Crawled**: {}\n", stats.pages_crawled));
    md.push_str(&format!("- **Pages Failed**: {}\n", stats.pages_failed));
    md.push_str(&format!("- **Unique Domains**: {}\n", stats.unique_domains));
    md.push_str(&format!("- **Total Links**: {}\n", stats.total_links));
    md.push_str(&format!("- **Invalid Links**: {}\n", stats.invalid_links));
    md.push_str(&format!(
        "- **Requests**: {} ({} retries)\n",
        stats.requests_made, stats.retries
    ));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    // Depth breakdown
    if !stats.depth_breakdown.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &stats.depth_breakdown {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    // Discarded URLs
    if !stats.discarded_by_reason.is_empty() {
        md.push_str("## Discarded URLs\n\n");
        md.push_str("| Reason | Count |\n");
        md.push_str("|--------|-------|\n");
        for (reason, count) in &stats.discarded_by_reason {
            md.push_str(&format!("| {} | {} |\n", reason, count));
        }
        md.push('\n');
    }

    // Failures
    if !report.failed.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Attempts | Error |\n");
        md.push_str("|-----|----------|-------|\n");
        for failure in report.failed.values().take(MAX_ROWS) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.url.get_basic_url(),
                failure.attempts,
                failure.error
            ));
        }
        push_overflow(&mut md, report.failed.len());
    }

    // Crawled pages, most links first
    if !report.succeeded.is_empty() {
        md.push_str("## Crawled Pages\n\n");
        md.push_str("| URL | Depth | Links |\n");
        md.push_str("|-----|-------|-------|\n");

        let mut pages: Vec<_> = report.succeeded.values().collect();
        pages.sort_by(|a, b| b.links.len().cmp(&a.links.len()));

        for page in pages.iter().take(MAX_ROWS) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                page.url.get_basic_url(),
                page.depth,
                page.links.len()
            ));
        }
        push_overflow(&mut md, pages.len());
    }

    md
}

fn push_overflow(md: &mut String, total: usize) {
    if total > MAX_ROWS {
        md.push_str(&format!("\n... and {} more\n\n", total - MAX_ROWS));
    } else {
        md.push('\n');
    }
}
