use crate::models::{AggregateResult, RequestState};
use colored::*;
use std::fmt::Write;

const NAME_WIDTH: usize = 32;
const DESCRIPTION_WIDTH: usize = 60;
const STARS_WIDTH: usize = 8;
const LINK_WIDTH: usize = 40;

/// Plain-text rendering of one lookup: totals header, a table sorted by
/// stars with a link per repository, a total footer, and a warning for
/// every source that failed.
pub fn render_report(result: &AggregateResult) -> String {
    let mut out = String::new();
    let rule_width = NAME_WIDTH + DESCRIPTION_WIDTH + STARS_WIDTH + LINK_WIDTH + 4;

    let _ = writeln!(
        out,
        "{}    {}",
        format!("H-Index: {}", result.h_index).bold().green(),
        format!("All Stars: {}", result.total_stars).bold()
    );
    let _ = writeln!(out, "{}", "=".repeat(rule_width).dimmed());
    let _ = writeln!(
        out,
        "{:<name$} {:<desc$} {:>stars$}  {}",
        "Name",
        "Description",
        "Stars",
        "Link",
        name = NAME_WIDTH,
        desc = DESCRIPTION_WIDTH,
        stars = STARS_WIDTH
    );
    let _ = writeln!(out, "{}", "-".repeat(rule_width).dimmed());

    let mut repositories: Vec<_> = result.repositories.iter().collect();
    repositories.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));

    for repo in repositories {
        let _ = writeln!(
            out,
            "{:<name$} {:<desc$} {:>stars$}  {}",
            truncate(&repo.name, NAME_WIDTH),
            truncate(repo.description.as_deref().unwrap_or(""), DESCRIPTION_WIDTH),
            repo.stargazers_count,
            repo.html_url().blue(),
            name = NAME_WIDTH,
            desc = DESCRIPTION_WIDTH,
            stars = STARS_WIDTH
        );
    }

    let _ = writeln!(out, "{}", "-".repeat(rule_width).dimmed());
    let _ = writeln!(
        out,
        "{:<width$} {:>stars$}",
        "Total",
        result.total_stars,
        width = NAME_WIDTH + DESCRIPTION_WIDTH + 1,
        stars = STARS_WIDTH
    );

    for failure in &result.failures {
        let source = match &failure.source {
            Some(source) => source.to_string(),
            None => "organization listing".to_string(),
        };
        let page = failure
            .page
            .map(|page| format!(" (page {})", page))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}",
            format!("⚠️ Results are partial: {}{} failed: {}", source, page, failure.message).yellow()
        );
    }

    out
}

/// One status line for a session state
pub fn render_status(state: &RequestState) -> String {
    let username = state.username.as_deref().unwrap_or("-");
    if state.is_loading() {
        format!("⏳ Fetching repositories for {} (#{})...", username, state.generation)
    } else {
        format!(
            "✅ {} (#{}): {} repositories",
            username,
            state.generation,
            state.result.repositories.len()
        )
    }
}

fn truncate(text: &str, width: usize) -> String {
    let text = text.replace(['\n', '\r'], " ");
    if text.chars().count() <= width {
        return text;
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
