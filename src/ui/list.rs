// Article list rendering.
// Provides the styled article list with loading and empty states.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::state::{PostEntry, PostListState};

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Articles "));
    frame.render_widget(text, area);
}

/// Render the empty state, with the last load failure if there was one.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str, last_error: Option<&str>) {
    let mut lines = vec![Line::styled(message.to_string(), Style::default().fg(Color::DarkGray))];
    if let Some(error) = last_error {
        lines.push(Line::default());
        lines.push(Line::styled(
            format!("❌ {}", error),
            Style::default().fg(Color::Red),
        ));
    }

    let text = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Articles "));
    frame.render_widget(text, area);
}

/// Build the list row for one article.
fn entry_item(entry: &PostEntry) -> ListItem<'static> {
    let marker = if entry.is_expanded() { "▾ " } else { "▸ " };

    let header = Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(
            entry.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ◉ {}", entry.picture),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let mut detail = vec![Span::raw("  ")];
    if let Some(title) = &entry.title {
        detail.push(Span::styled(title.clone(), Style::default().fg(Color::White)));
    }
    if let Some(published) = &entry.published_at {
        detail.push(Span::styled(
            format!("  {}", format_relative_time(published)),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if detail.len() > 1 {
        ListItem::new(vec![header, Line::from(detail)])
    } else {
        ListItem::new(header)
    }
}

/// Render the article list.
pub fn render_posts_list(frame: &mut Frame, state: &mut PostListState, area: Rect) {
    if state.loading {
        render_loading(frame, area, "Loading articles");
        return;
    }

    let entries = state.entries();
    if entries.is_empty() {
        render_empty(
            frame,
            area,
            "No articles found",
            state.feed.last_error.as_deref(),
        );
        return;
    }

    let items: Vec<ListItem> = entries.iter().map(entry_item).collect();
    let title = format!(" Recent Blogs ({}) ", entries.len());

    let list_widget = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut state.list_state);
}
