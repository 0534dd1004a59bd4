// UI module for rendering the TUI.
// Contains the title bar, article list, reader pane, status bar, and help overlay.

mod list;
mod markdown;
mod reader;

use ratatui::{prelude::*, widgets::*};

use crate::app::App;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_title_bar(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.posts.loading {
        Span::styled("loading", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            format!("{} articles", app.posts.article_count()),
            Style::default().fg(Color::DarkGray),
        )
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Recent Blogs",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        status,
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" longread ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
    );
    frame.render_widget(title, area);
}

/// Draw the list, plus the reader pane while an article is expanded.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.posts.expanded_entry() {
        Some(entry) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(35), Constraint::Min(3)])
                .split(area);
            list::render_posts_list(frame, &mut app.posts, chunks[0]);
            reader::draw_reader(frame, &entry, app.posts.reader_scroll, chunks[1]);
        }
        None => list::render_posts_list(frame, &mut app.posts, area),
    }
}

/// Draw the status bar with keybinding hints.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = vec![
        Span::raw(" ↑↓ "),
        Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
        Span::raw("  ↵ "),
        Span::styled("Expand", Style::default().fg(Color::DarkGray)),
    ];

    if app.posts.expansion.expanded().is_some() {
        hints.extend([
            Span::raw("  PgUp/Dn "),
            Span::styled("Scroll", Style::default().fg(Color::DarkGray)),
            Span::raw("  Esc "),
            Span::styled("Collapse", Style::default().fg(Color::DarkGray)),
        ]);
    }

    hints.extend([
        Span::raw("  ? "),
        Span::styled("Help", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ]);

    if let Some(summary) = &app.posts.summary {
        if summary.attempts > 1 {
            hints.push(Span::styled(
                format!("  attempts: {}", summary.attempts),
                Style::default().fg(Color::Yellow),
            ));
        }
    }

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = 50;
    let popup_height = 14;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(
        popup_x,
        popup_y,
        popup_width.min(area.width),
        popup_height.min(area.height),
    );

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(Color::Cyan)),
            Span::raw(desc),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("  ↑/↓ or j/k    ", "Select article"),
        key("  g/G           ", "First / last article"),
        key("  Enter/Space   ", "Expand / collapse article"),
        key("  PgUp/PgDn     ", "Scroll expanded article"),
        key("  Esc           ", "Collapse / close help"),
        key("  ?             ", "Show/hide this help"),
        key("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
