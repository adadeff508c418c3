use colored::*;
use jiff::civil::Date;

use crate::{
    models::{
        activity::{Activity, Priority},
        view::{SortKey, StatusFilter, ViewState},
    },
    services::{stats::Stats, theme::Theme},
};

/// Characters of the UUID shown in listings, enough to address a record
const SHORT_ID_LEN: usize = 8;

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

fn accent(text: &str, theme: Theme) -> ColoredString {
    match theme {
        Theme::Dark => text.cyan().bold(),
        Theme::Light => text.blue().bold(),
    }
}

pub fn short_id(activity: &Activity) -> String {
    activity.id.to_string()[..SHORT_ID_LEN].to_string()
}

/// Get the appropriate status glyph for an activity
pub fn get_status_glyph(activity: &Activity, is_overdue: bool) -> ColoredString {
    if activity.completed {
        "✓".dimmed()
    } else if is_overdue {
        "●".red()
    } else {
        "○".normal()
    }
}

fn priority_badge(priority: Priority) -> ColoredString {
    let label = priority.to_string();
    match priority {
        Priority::High => label.red(),
        Priority::Medium => label.yellow(),
        Priority::Low => label.green(),
    }
}

/// An activity is overdue when it is still open and its deadline parses as
/// a date before today. Free-form deadlines never count as overdue.
pub fn is_overdue(activity: &Activity, today: Date) -> bool {
    if activity.completed {
        return false;
    }
    activity
        .deadline
        .trim()
        .parse::<Date>()
        .map(|deadline| deadline < today)
        .unwrap_or(false)
}

/// Render a single activity line with id, glyph, title and right-aligned details
pub fn render_activity_line(activity: &Activity, today: Date) {
    let terminal_width = get_terminal_width();
    let overdue = is_overdue(activity, today);

    let id_str = short_id(activity);
    let glyph = get_status_glyph(activity, overdue);
    let marker = if activity.important { "★" } else { " " };

    let left_section = format!("  {}  {} {} {}", id_str, glyph, marker, activity.title);
    let styled_left = if activity.completed {
        left_section.dimmed().strikethrough()
    } else if activity.important {
        left_section.magenta().bold()
    } else {
        left_section.bold()
    };

    let mut details = vec![];
    if !activity.subject.is_empty() {
        details.push(activity.subject.clone());
    }
    details.push(activity.kind.label().to_string());
    if !activity.deadline.is_empty() {
        details.push(activity.deadline.clone());
    }
    if activity.estimated_time > 0.0 {
        details.push(format!("{}h", activity.estimated_time));
    }
    let right_section = details.join("  ·  ");
    let badge = priority_badge(activity.priority);

    // Visible widths, without ANSI codes
    let left_visible_len = format!("  {}  {} {} {}", id_str, " ", " ", activity.title)
        .chars()
        .count();
    let right_visible_len = right_section.chars().count() + 2 + badge.chars().count();
    let total_content = left_visible_len + right_visible_len;

    if total_content + 4 < terminal_width {
        let padding = terminal_width - total_content - 2;
        println!(
            "{}{}{}  {}",
            styled_left,
            " ".repeat(padding),
            right_section.dimmed(),
            badge
        );
    } else {
        println!("{}", styled_left);
        println!("        {}  {}", right_section.dimmed(), badge);
    }
}

/// Render a view header with title and count
pub fn render_view_header(view: &ViewState, count: usize, theme: Theme) {
    let title = match view.status_filter {
        StatusFilter::All => "All activities",
        StatusFilter::Pending => "Pending",
        StatusFilter::Completed => "Completed",
    };
    let word = if count == 1 { "activity" } else { "activities" };

    let mut qualifiers = vec![];
    let query = view.search_query.trim();
    if !query.is_empty() {
        qualifiers.push(format!("matching \"{}\"", query));
    }
    match view.sort_key {
        SortKey::None => {}
        SortKey::Title => qualifiers.push("by title".to_string()),
        SortKey::Priority => qualifiers.push("by priority".to_string()),
        SortKey::Deadline => qualifiers.push("by deadline".to_string()),
    }

    let suffix = if qualifiers.is_empty() {
        String::new()
    } else {
        format!(" {}", qualifiers.join(", ").dimmed())
    };
    println!("\n  {} ({} {}){}\n", accent(title, theme), count, word, suffix);
}

pub fn render_empty_state() {
    println!("\n  {}\n", "No activities to show".dimmed());
}

pub fn render_stats(stats: &Stats, theme: Theme) {
    println!("\n  {}\n", accent("Summary", theme));
    println!("  {:<12}{}", "Total", stats.total);
    println!("  {:<12}{}", "Completed", stats.completed.to_string().green());
    println!("  {:<12}{}", "Pending", stats.pending.to_string().yellow());
    println!("  {:<12}{}h", "Hours", stats.estimated_hours);
    println!();
}

pub fn render_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn render_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

pub fn render_warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), message);
}
