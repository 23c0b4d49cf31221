use colored::Colorize;
use serde_json::{Value, json};

use crate::controller::LookupSnapshot;
use crate::domain::{DropdownState, OpenState, SearchMode, SelectionChange};
use crate::pagination::DEFAULT_VISIBLE_PAGES;
use crate::query::format_identifier;

pub fn dropdown_label(state: &DropdownState) -> &'static str {
    match state {
        DropdownState::Closed => "closed",
        DropdownState::Loading => "loading",
        DropdownState::Open(OpenState::Results) => "open",
        DropdownState::Open(OpenState::NoResults) => "no_results",
    }
}

/// `Showing 11 to 20 of 23 entries`, or `No entries` for an empty set.
pub fn status_line(snapshot: &LookupSnapshot) -> String {
    let page = &snapshot.page;
    if page.total == 0 {
        return "No entries".to_string();
    }
    let mut line = format!(
        "Showing {} to {} of {} entries",
        page.start_record(),
        page.end_record(),
        page.total
    );
    if snapshot.reported_total > page.total {
        line.push_str(&format!(" ({} matched)", snapshot.reported_total));
    }
    line
}

fn display_id(mode: Option<SearchMode>, id: &str) -> String {
    match mode {
        Some(mode) if mode.is_exact() => format_identifier(mode, id),
        _ => id.to_string(),
    }
}

fn page_bar(snapshot: &LookupSnapshot, use_color: bool) -> String {
    let page = &snapshot.page;
    page.page_numbers(DEFAULT_VISIBLE_PAGES)
        .into_iter()
        .map(|n| {
            if n == page.index {
                let current = format!("[{n}]");
                if use_color {
                    current.bright_yellow().bold().to_string()
                } else {
                    current
                }
            } else {
                n.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the dropdown the way a terminal user would see it.
pub fn format_snapshot(snapshot: &LookupSnapshot, use_color: bool) -> String {
    let mut output = String::new();

    if let Some(error) = &snapshot.error {
        let message = error.user_message();
        if use_color {
            output.push_str(&message.bright_red().to_string());
        } else {
            output.push_str(&message);
        }
        output.push('\n');
        return output;
    }

    match snapshot.dropdown {
        DropdownState::Closed => output.push_str("(closed)\n"),
        DropdownState::Loading => output.push_str("Searching...\n"),
        DropdownState::Open(OpenState::NoResults) => output.push_str("No results found.\n"),
        DropdownState::Open(OpenState::Results) => {
            let header = match snapshot.mode {
                Some(mode) => format!("{} search for \"{}\"", mode.label(), snapshot.text),
                None => format!("Search for \"{}\"", snapshot.text),
            };
            if use_color {
                output.push_str(&header.bright_blue().bold().to_string());
            } else {
                output.push_str(&header);
            }
            output.push('\n');

            for item in &snapshot.page.items {
                let id = display_id(snapshot.mode, &item.id);
                if use_color {
                    output.push_str(&format!("  {}  {}\n", id.bright_green(), item.label));
                } else {
                    output.push_str(&format!("  {id}  {}\n", item.label));
                }
            }

            let status = status_line(snapshot);
            if use_color {
                output.push_str(&status.dimmed().to_string());
            } else {
                output.push_str(&status);
            }
            if snapshot.page.total_pages() > 1 {
                output.push_str(&format!("  Page: {}", page_bar(snapshot, use_color)));
            }
            output.push('\n');
        }
    }

    output
}

pub fn format_selection(change: &SelectionChange, use_color: bool) -> String {
    let SelectionChange::Selected(event) = change else {
        return if use_color {
            "Selection cleared".bright_cyan().bold().to_string()
        } else {
            "Selection cleared".to_string()
        };
    };
    if use_color {
        format!(
            "{} {} {}",
            "Selected".bright_cyan().bold(),
            event.id.bright_green(),
            event.label
        )
    } else {
        format!("Selected {} {}", event.id, event.label)
    }
}

pub fn snapshot_json(snapshot: &LookupSnapshot) -> Value {
    json!({
        "text": snapshot.text,
        "mode": snapshot.mode,
        "dropdown": dropdown_label(&snapshot.dropdown),
        "page": {
            "index": snapshot.page.index,
            "size": snapshot.page.size,
            "total": snapshot.page.total,
            "total_pages": snapshot.page.total_pages(),
            "items": snapshot.page.items,
        },
        "reported_total": snapshot.reported_total,
        "error": snapshot.error.as_ref().map(|e| e.user_message()),
        "seq": snapshot.latest_seq,
    })
}

pub fn selection_json(change: &SelectionChange) -> Value {
    json!({ "selection": change })
}
