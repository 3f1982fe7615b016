//! Markdown report generation
//!
//! Human-readable rendering of a run: summary statistics, an overview table
//! of every site, per-site detail sections, and a dedicated error section.

use crate::crawler::{RunResult, SiteOutcome};
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Renders the run result and writes it to a file
///
/// # Arguments
///
/// * `result` - The finished run result
/// * `path` - Destination file path
pub fn write_report(result: &RunResult, path: &Path) -> OutputResult<()> {
    let markdown = render_report(result);

    let mut file = File::create(path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Report written: {}", path.display());
    Ok(())
}

/// Formats the run result as a Markdown document
pub fn render_report(result: &RunResult) -> String {
    let mut md = String::new();

    md.push_str("# Sitesweep Crawl Report\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Total Sites**: {}\n", result.attempted));
    md.push_str(&format!("- **Succeeded**: {}\n", result.succeeded));
    md.push_str(&format!("- **Failed**: {}\n", result.failed));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n\n",
        result.elapsed.as_secs_f64()
    ));

    push_summary_table(&mut md, result);
    push_site_details(&mut md, result);
    push_error_section(&mut md, result);

    md
}

/// Overview table: one row per site
fn push_summary_table(md: &mut String, result: &RunResult) {
    md.push_str("## Summary Overview\n\n");
    md.push_str("| # | URL | Title | Status |\n");
    md.push_str("|---|-----|-------|--------|\n");

    for (idx, outcome) in result.outcomes.iter().enumerate() {
        let (title, status) = match outcome {
            SiteOutcome::Success { record, .. } => {
                (truncate(&record.title, 50), "Success".to_string())
            }
            SiteOutcome::ExtractionError { kind, .. } => {
                (String::new(), format!("Failed ({})", kind))
            }
            SiteOutcome::FetchError { kind, .. } => {
                (String::new(), format!("Failed ({})", kind))
            }
        };

        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            idx + 1,
            truncate(outcome.url(), 60),
            title,
            status
        ));
    }
    md.push('\n');
}

/// One detail section per successfully scraped site
fn push_site_details(md: &mut String, result: &RunResult) {
    for (idx, outcome) in result.outcomes.iter().enumerate() {
        let SiteOutcome::Success { record, .. } = outcome else {
            continue;
        };

        md.push_str(&format!("## Site #{}: {}\n\n", idx + 1, record.url));

        md.push_str(&format!("- **Title**: {}\n", record.title));
        md.push_str(&format!(
            "- **Description**: {}\n",
            truncate(&record.meta_description, 200)
        ));
        md.push_str(&format!("- **Author**: {}\n", record.author));
        md.push_str(&format!("- **Publish Date**: {}\n", record.publish_date));
        md.push_str(&format!("- **Language**: {}\n", record.language));
        md.push_str(&format!("- **Canonical URL**: {}\n", record.canonical_url));
        md.push_str(&format!("- **Status Code**: {}\n", record.http_status));

        if !record.meta_keywords.is_empty() {
            md.push_str(&format!(
                "- **Keywords**: {}\n",
                record.meta_keywords.join(", ")
            ));
        }

        if record.headings.total() > 0 {
            md.push_str("\n**Headings**\n\n");
            for (level, texts) in [
                ("H1", &record.headings.h1),
                ("H2", &record.headings.h2),
                ("H3", &record.headings.h3),
                ("H4", &record.headings.h4),
                ("H5", &record.headings.h5),
                ("H6", &record.headings.h6),
            ] {
                if !texts.is_empty() {
                    let preview: Vec<&str> =
                        texts.iter().take(3).map(String::as_str).collect();
                    md.push_str(&format!("- **{}**: {}\n", level, preview.join(", ")));
                }
            }
        }

        md.push_str(&format!(
            "\n**Links Found**: {} internal, {} external\n",
            record.links.internal.len(),
            record.links.external.len()
        ));
        md.push_str(&format!("**Images Found**: {}\n", record.images.len()));
        md.push_str(&format!(
            "**Structured Data Blocks**: {}\n\n",
            record.structured_data.len()
        ));
    }
}

/// Dedicated section listing every failed target
fn push_error_section(md: &mut String, result: &RunResult) {
    let errors: Vec<&SiteOutcome> = result
        .outcomes
        .iter()
        .filter(|o| !o.is_success())
        .collect();

    if errors.is_empty() {
        return;
    }

    md.push_str("## Errors\n\n");
    md.push_str("| URL | Kind | Detail |\n");
    md.push_str("|-----|------|--------|\n");

    for outcome in errors {
        match outcome {
            SiteOutcome::FetchError {
                url,
                kind,
                message,
                attempts,
                ..
            } => {
                md.push_str(&format!(
                    "| {} | {} | {} ({} attempts) |\n",
                    url,
                    kind,
                    truncate(message, 80),
                    attempts
                ));
            }
            SiteOutcome::ExtractionError {
                url,
                kind,
                message,
                ..
            } => {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    url,
                    kind,
                    truncate(message, 80)
                ));
            }
            SiteOutcome::Success { .. } => {}
        }
    }
    md.push('\n');
}

/// Truncates on a character boundary, appending an ellipsis when shortened
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
