/*
[INPUT]:  Tasks, executions, board counts, templates, public stats
[OUTPUT]: Styled terminal strings for the CLI commands
[POS]:    Presentation layer - console output formatting
[UPDATE]: When changing what the list/detail/history views show
*/

use chrono::{DateTime, Utc};
use console::{StyledObject, style};

use searchwatch_adapter::{
    DisplayStatus, ExecutionStatus, PublicStats, Task, TaskExecution, TaskTemplate, classify,
};

use crate::board::StatusCounts;
use crate::preview::PreviewOutcome;
use crate::schedule;

const SNIPPET_LEN: usize = 96;

pub fn status_badge(status: DisplayStatus) -> String {
    let text = format!("{} {}", status.icon(), status.label());
    let styled = match status {
        DisplayStatus::Active => style(text).green(),
        DisplayStatus::Paused => style(text).yellow(),
        DisplayStatus::Completed => style(text).blue(),
    };
    styled.to_string()
}

fn execution_badge(status: ExecutionStatus) -> StyledObject<&'static str> {
    let text = status.as_str();
    match status {
        ExecutionStatus::Success => style(text).green(),
        ExecutionStatus::Failed => style(text).red(),
        ExecutionStatus::Pending | ExecutionStatus::Running => style(text).yellow(),
    }
}

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Single-line summary with whitespace collapsed.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

pub fn task_row(task: &Task) -> String {
    format!(
        "{}  {}  {}  {}",
        status_badge(classify(task)),
        style(&task.name).bold(),
        style(schedule::describe(&task.schedule)).dim(),
        style(&task.id).dim()
    )
}

pub fn task_detail(task: &Task) -> String {
    let mut lines = vec![
        format!("{}  {}", style(&task.name).bold().cyan(), status_badge(classify(task))),
        format!("  id:         {}", task.id),
        format!("  query:      {}", task.search_query),
        format!("  condition:  {}", task.condition_description),
        format!(
            "  schedule:   {} ({})",
            schedule::describe(&task.schedule),
            task.schedule
        ),
        format!(
            "  notify:     {} - {}",
            task.notify_behavior,
            task.notify_behavior.description()
        ),
    ];

    let channels = task
        .notification_channels
        .iter()
        .map(|channel| channel.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if !channels.is_empty() {
        lines.push(format!("  channels:   {channels}"));
    }
    if let Some(email) = &task.notification_email {
        lines.push(format!("  email:      {email}"));
    }
    if let Some(url) = &task.webhook_url {
        lines.push(format!("  webhook:    {url}"));
    }
    lines.push(format!("  created:    {}", timestamp(&task.created_at)));
    if let Some(updated) = &task.updated_at {
        lines.push(format!("  updated:    {}", timestamp(updated)));
    }
    if let Some(execution) = &task.last_execution {
        lines.push(format!("  last run:   {}", execution_line(execution)));
    }
    lines.join("\n")
}

/// One timeline entry.
pub fn execution_line(execution: &TaskExecution) -> String {
    let mut line = format!(
        "{}  {:<7}",
        timestamp(&execution.started_at),
        execution_badge(execution.status)
    );
    if let Some(duration) = execution.duration() {
        line.push_str(&format!("  {:>4}s", duration.num_seconds()));
    }
    if execution.condition_met == Some(true) {
        line.push_str(&format!("  {}", style("condition met").green().bold()));
    }
    let detail = match execution.status {
        ExecutionStatus::Failed => execution.error_message.as_deref(),
        _ => execution.answer(),
    };
    if let Some(detail) = detail {
        line.push_str(&format!("  {}", snippet(detail, SNIPPET_LEN)));
    }
    line
}

pub fn execution_detail(execution: &TaskExecution) -> String {
    let mut lines = vec![execution_line(execution)];
    if let Some(answer) = execution.answer() {
        lines.push(String::new());
        lines.push(answer.trim().to_string());
    }
    if let Some(summary) = &execution.change_summary {
        lines.push(format!("\n{} {}", style("Changed:").bold(), summary.trim()));
    }
    let sources = execution.sources();
    if !sources.is_empty() {
        lines.push(format!("\n{}", style("Sources").bold()));
        for source in sources {
            match &source.title {
                Some(title) => lines.push(format!("  - {title} <{}>", source.url)),
                None => lines.push(format!("  - {}", source.url)),
            }
        }
    }
    lines.join("\n")
}

/// Notification changelog entry: what changed, falling back to the answer.
pub fn changelog_entry(execution: &TaskExecution) -> String {
    let text = execution
        .change_summary
        .as_deref()
        .filter(|summary| !summary.trim().is_empty())
        .or_else(|| execution.answer())
        .unwrap_or("Condition met");
    format!(
        "{}  {}",
        style(timestamp(&execution.started_at)).dim(),
        snippet(text, SNIPPET_LEN * 2)
    )
}

pub fn preview_outcome(outcome: &PreviewOutcome) -> String {
    match outcome {
        PreviewOutcome::Completed(execution) => {
            let verdict = match execution.condition_met {
                Some(true) => style("Condition met").green().bold().to_string(),
                Some(false) => style("Condition not met").yellow().to_string(),
                None => style("No condition verdict").dim().to_string(),
            };
            format!("{verdict}\n{}", execution_detail(execution))
        }
        PreviewOutcome::Failed { message } => format!("{} {message}", style("Run failed:").red()),
        PreviewOutcome::TimedOut => format!(
            "{} the run is still going; check `history` later",
            style("Timed out:").yellow()
        ),
        PreviewOutcome::RequestFailed { message } => {
            format!("{} {message}", style("Request failed:").red())
        }
        PreviewOutcome::Abandoned => style("Stopped waiting for the run").dim().to_string(),
    }
}

pub fn counts(counts: &StatusCounts) -> String {
    DisplayStatus::ALL
        .iter()
        .map(|status| format!("{} {}", status_badge(*status), counts.get(*status)))
        .chain(std::iter::once(format!("total {}", counts.total())))
        .collect::<Vec<_>>()
        .join("   ")
}

pub fn template_row(template: &TaskTemplate) -> String {
    let category = template
        .category
        .as_deref()
        .map(|category| format!("[{category}] "))
        .unwrap_or_default();
    format!(
        "{}{}  {}\n    {}",
        style(category).dim(),
        style(&template.name).bold(),
        style(schedule::describe(&template.schedule)).dim(),
        snippet(&template.description, SNIPPET_LEN)
    )
}

pub fn stats(stats: &PublicStats) -> String {
    let capacity = &stats.capacity;
    let state = if stats.signups_open() {
        style("open").green()
    } else {
        style("full").red()
    };
    format!(
        "Users {}/{}  ({} slots left, signups {})",
        capacity.current_users, capacity.max_users, capacity.available_slots, state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use searchwatch_adapter::{ExecutionResult, GroundingSource};

    fn execution(status: ExecutionStatus) -> TaskExecution {
        TaskExecution {
            id: "e1".to_string(),
            task_id: "t1".to_string(),
            status,
            started_at: Utc.with_ymd_and_hms(2026, 9, 2, 9, 0, 0).unwrap(),
            completed_at: Some(Utc.with_ymd_and_hms(2026, 9, 2, 9, 0, 4).unwrap()),
            result: Some(ExecutionResult {
                answer: Some("Tickets go on sale Friday".to_string()),
                grounding_sources: vec![GroundingSource {
                    url: "https://news.example.com/tour".to_string(),
                    title: Some("Tour announced".to_string()),
                }],
                ..ExecutionResult::default()
            }),
            error_message: None,
            condition_met: Some(true),
            change_summary: None,
            grounding_sources: Vec::new(),
        }
    }

    #[test]
    fn snippet_collapses_and_truncates() {
        assert_eq!(snippet("  a\n b   c ", 20), "a b c");
        assert_eq!(snippet("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn execution_line_shows_answer_and_duration() {
        let line = execution_line(&execution(ExecutionStatus::Success));
        assert!(line.contains("2026-09-02 09:00"));
        assert!(line.contains("4s"));
        assert!(line.contains("Tickets go on sale Friday"));
    }

    #[test]
    fn failed_line_shows_error_message() {
        let mut failed = execution(ExecutionStatus::Failed);
        failed.error_message = Some("Search backend unavailable".to_string());
        assert!(execution_line(&failed).contains("Search backend unavailable"));
    }

    #[test]
    fn detail_lists_sources() {
        let detail = execution_detail(&execution(ExecutionStatus::Success));
        assert!(detail.contains("Tour announced <https://news.example.com/tour>"));
    }

    #[test]
    fn changelog_prefers_change_summary() {
        let mut entry = execution(ExecutionStatus::Success);
        assert!(changelog_entry(&entry).contains("Tickets go on sale Friday"));
        entry.change_summary = Some("Sale date moved to Thursday".to_string());
        assert!(changelog_entry(&entry).contains("Sale date moved to Thursday"));
    }

    #[test]
    fn outcome_messages() {
        assert!(preview_outcome(&PreviewOutcome::TimedOut).contains("Timed out"));
        assert!(
            preview_outcome(&PreviewOutcome::Failed {
                message: "boom".to_string()
            })
            .contains("boom")
        );
    }
}
