//! Report renderers.

use crate::args::OutputFormat;
use crate::error::CliError;
use storyloom_core::{BacklogReport, InvestCheck, Priority, Story};

/// CSV header row.
pub const CSV_HEADER: &str = "id,title,type,narrative,priority,estimation,invest_check";

pub fn render(report: &BacklogReport, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Csv => Ok(render_csv(report)),
    }
}

pub fn render_json(report: &BacklogReport) -> Result<String, CliError> {
    let mut out = serde_json::to_string_pretty(report)?;
    out.push('\n');
    Ok(out)
}

// ============================================================================
// TEXT
// ============================================================================

pub fn render_text(report: &BacklogReport) -> String {
    let meta = &report.metadata;
    let mut lines = vec![format!(
        "Backlog: {} stories, {} points",
        meta.total_stories, meta.total_points
    )];
    let breakdown: Vec<String> = Priority::ALL
        .iter()
        .map(|p| format!("{}: {}", p, meta.priority_breakdown.get(p).copied().unwrap_or(0)))
        .collect();
    lines.push(format!("  {}", breakdown.join("  ")));

    for story in &report.stories {
        lines.push(String::new());
        lines.extend(story_lines(story));
    }

    if let Some(sprint) = &report.sprint {
        lines.push(String::new());
        lines.push(format!("Sprint ({}, capacity {})", sprint.strategy, sprint.capacity));
        lines.push(format!(
            "  Committed ({} pts): {}",
            sprint.committed_points,
            id_list(&sprint.committed)
        ));
        lines.push(format!(
            "  Stretch ({} pts): {}",
            sprint.stretch_points,
            id_list(&sprint.stretch)
        ));
        lines.push(format!("  Total: {} pts", sprint.total_points));
        lines.push(format!("  Utilization: {:.1}%", sprint.utilization));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn story_lines(story: &Story) -> Vec<String> {
    let unit = if story.estimation == 1 { "pt" } else { "pts" };
    let mut lines = vec![
        format!(
            "{} [{}] {}, {} {}",
            story.id, story.story_type, story.priority, story.estimation, unit
        ),
        format!("  {}", story.title),
        format!("  {}", story.narrative),
    ];
    if !story.dependencies.is_empty() {
        lines.push(format!("  Depends on: {}", story.dependencies.join(", ")));
    }
    let failures = story.invest_check.failures();
    if failures.is_empty() {
        lines.push("  INVEST: ok".to_string());
    } else {
        lines.push(format!("  INVEST: not {}", failures.join(", not ")));
    }
    lines.extend(story.acceptance_criteria.iter().map(|c| format!("  - {}", c)));
    lines
}

fn id_list(ids: &[String]) -> String {
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}

// ============================================================================
// CSV
// ============================================================================

pub fn render_csv(report: &BacklogReport) -> String {
    let mut out = String::with_capacity(128 * (report.stories.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for story in &report.stories {
        let row = [
            csv_field(&story.id),
            csv_field(&story.title),
            csv_field(story.story_type.as_str()),
            csv_field(&story.narrative),
            csv_field(story.priority.as_str()),
            story.estimation.to_string(),
            csv_field(&flatten_invest(&story.invest_check)),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// `independent:true,negotiable:true,...`
pub fn flatten_invest(check: &InvestCheck) -> String {
    check
        .pairs()
        .iter()
        .map(|(name, ok)| format!("{}:{}", name, ok))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a field when it contains a comma, quote, or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
