// Reader pane for the expanded article.
// Shows author details, summary, and the rendered markdown body with scrolling.

use ratatui::{prelude::*, widgets::*};

use crate::state::PostEntry;

use super::list::format_relative_time;
use super::markdown;

/// Lines shown in the reader for an expanded entry.
pub fn reader_lines(entry: &PostEntry) -> Vec<Line<'static>> {
    let mut byline = vec![
        Span::styled("by ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            entry.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(published) = &entry.published_at {
        byline.push(Span::styled(
            format!("  {}", format_relative_time(published)),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines = vec![
        Line::from(byline),
        Line::styled(
            format!("◉ {}", entry.picture),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if let Some(summary) = &entry.summary {
        lines.push(Line::styled(
            summary.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        ));
    }

    lines.push(Line::default());
    if let Some(content) = &entry.content {
        lines.extend(markdown::render(content));
    }
    lines
}

/// Draw the reader pane.
pub fn draw_reader(frame: &mut Frame, entry: &PostEntry, scroll: u16, area: Rect) {
    let title = entry.title.as_deref().unwrap_or("Article");
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", title))
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(reader_lines(entry))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}
