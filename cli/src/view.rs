//! Plain-text rendering of a list snapshot.

use std::fmt::Write;

use todo_sync::validation::format_for_display;
use todo_sync::{CompletionStats, Priority, Stats, ToDoListState, TodoItem};

pub fn render(state: &ToDoListState) -> String {
    let mut out = String::new();
    render_items(&mut out, &state.items);
    render_pagination(&mut out, state);
    if let Some(stats) = &state.stats {
        render_stats(&mut out, stats);
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

fn render_items(out: &mut String, items: &[TodoItem]) {
    if items.is_empty() {
        out.push_str("No to-dos.\n");
        return;
    }
    for item in items {
        let due = item.due_date.map(format_for_display).unwrap_or_default();
        let _ = writeln!(
            out,
            "[{}] {:<6} {:<10} {}  ({})",
            if item.done { "x" } else { " " },
            item.priority.as_str(),
            due,
            item.text,
            item.id
        );
    }
}

fn render_pagination(out: &mut String, state: &ToDoListState) {
    let p = &state.pagination;
    let _ = writeln!(
        out,
        "page {} of {} ({} items{})",
        p.current_page + 1,
        p.total_pages.max(1),
        state.total_count,
        if p.is_last { "" } else { ", more" }
    );
}

fn render_stats(out: &mut String, stats: &Stats) {
    out.push_str("\nCompleted:\n");
    render_bucket(out, "all", &stats.completed);
    for priority in [Priority::Low, Priority::Medium, Priority::High] {
        render_bucket(out, priority.as_str(), stats.for_priority(priority));
    }
}

fn render_bucket(out: &mut String, label: &str, bucket: &CompletionStats) {
    let avg = bucket.avg_time.as_deref().unwrap_or("--:--");
    let _ = writeln!(out, "  {label:<6} {:>4}  avg {avg}", bucket.count);
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn item(id: &str, done: bool) -> TodoItem {
        TodoItem {
            id: id.to_string(),
            text: format!("Task {id}"),
            done,
            priority: Priority::High,
            creation_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 4),
            done_date: None,
        }
    }

    #[test]
    fn renders_empty_state() {
        let out = render(&ToDoListState::new());
        assert_eq!(out, "No to-dos.\npage 1 of 1 (0 items)\n");
    }

    #[test]
    fn renders_items_with_display_dates() {
        let mut state = ToDoListState::new();
        state.items = vec![item("a", true), item("b", false)];
        state.total_count = 12;
        state.pagination.total_pages = 2;
        state.pagination.is_last = false;

        let out = render(&state);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[x] HIGH   2026/03/04 Task a  (a)");
        assert!(lines[1].starts_with("[ ] HIGH"));
        assert_eq!(lines[2], "page 1 of 2 (12 items, more)");
    }

    #[test]
    fn renders_stats_and_error() {
        let mut state = ToDoListState::new();
        state.stats = Some(Stats {
            completed: CompletionStats { count: 2, avg_time: Some("01:30".into()) },
            high: CompletionStats { count: 2, avg_time: Some("01:30".into()) },
            ..Default::default()
        });
        state.error = Some("To Do not found with id 9".into());

        let out = render(&state);
        assert!(out.contains("  all       2  avg 01:30\n"));
        assert!(out.contains("  LOW       0  avg --:--\n"));
        assert!(out.ends_with("error: To Do not found with id 9\n"));
    }
}
