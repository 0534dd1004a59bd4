// Markdown to terminal text conversion.
// Walks pulldown-cmark events and emits styled ratatui lines for the reader pane.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use ratatui::prelude::*;

/// Block or inline element currently open in the event stream.
#[derive(Debug, Clone, PartialEq)]
enum Open {
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock,
    List,
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image(String),
    Table,
    TableHead,
    TableRow,
    TableCell,
    Other,
}

/// Render markdown into styled lines.
pub fn render(markdown: &str) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = Writer::default();
    for event in Parser::new_ext(markdown, options) {
        writer.handle(event);
    }
    writer.finish()
}

#[derive(Default)]
struct Writer {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    open: Vec<Open>,
    /// Next number for each open list; `None` for bullet lists.
    counters: Vec<Option<u64>>,
    /// Cells already written on the current table row.
    cells: usize,
}

impl Writer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => {
                if self.in_code_block() {
                    self.code_text(&text);
                } else {
                    let style = self.inline_style();
                    self.spans.push(Span::styled(text.into_string(), style));
                }
            }
            Event::Code(code) => {
                self.spans.push(Span::styled(
                    code.into_string(),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let text = html.trim_end_matches('\n').to_string();
                self.spans
                    .push(Span::styled(text, Style::default().fg(Color::DarkGray)));
            }
            Event::SoftBreak => self.spans.push(Span::raw(" ")),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                ));
                self.blank();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.spans.push(Span::styled(marker, Style::default().fg(Color::Green)));
            }
            Event::FootnoteReference(label) => {
                self.spans.push(Span::styled(
                    format!("[^{}]", label),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => {
                if !self.in_item() {
                    self.flush();
                }
                Open::Paragraph
            }
            Tag::Heading { level, .. } => {
                self.flush();
                Open::Heading(level as u8)
            }
            Tag::BlockQuote(_) => {
                self.flush();
                Open::BlockQuote
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.lines.push(self.prefixed(vec![Span::styled(
                            format!("```{}", lang),
                            Style::default().fg(Color::DarkGray),
                        )]));
                    }
                }
                Open::CodeBlock
            }
            Tag::List(start) => {
                self.flush();
                self.counters.push(start);
                Open::List
            }
            Tag::Item => {
                self.flush();
                let bullet = match self.counters.last_mut() {
                    Some(Some(n)) => {
                        let bullet = format!("{}. ", n);
                        *n += 1;
                        bullet
                    }
                    _ => "• ".to_string(),
                };
                self.spans
                    .push(Span::styled(bullet, Style::default().fg(Color::Cyan)));
                Open::Item
            }
            Tag::Table(_) => {
                self.flush();
                Open::Table
            }
            Tag::TableHead => {
                self.cells = 0;
                Open::TableHead
            }
            Tag::TableRow => {
                self.cells = 0;
                Open::TableRow
            }
            Tag::TableCell => {
                if self.cells > 0 {
                    self.spans
                        .push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                }
                self.cells += 1;
                Open::TableCell
            }
            Tag::Emphasis => Open::Emphasis,
            Tag::Strong => Open::Strong,
            Tag::Strikethrough => Open::Strikethrough,
            Tag::Link { dest_url, .. } => Open::Link(dest_url.into_string()),
            Tag::Image { dest_url, .. } => {
                self.spans
                    .push(Span::styled("[image] ", Style::default().fg(Color::Magenta)));
                Open::Image(dest_url.into_string())
            }
            _ => Open::Other,
        };
        self.open.push(open);
    }

    fn end(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };

        match open {
            Open::Paragraph => {
                self.flush();
                if !self.in_item() {
                    self.blank();
                }
            }
            Open::Heading(_) | Open::CodeBlock | Open::BlockQuote | Open::Table => {
                self.flush();
                self.blank();
            }
            Open::List => {
                self.flush();
                self.counters.pop();
                if !self.in_item() {
                    self.blank();
                }
            }
            Open::Item | Open::TableHead | Open::TableRow => self.flush(),
            Open::Link(url) | Open::Image(url) => {
                if !url.is_empty() {
                    self.spans.push(Span::styled(
                        format!(" <{}>", url),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            Open::Emphasis
            | Open::Strong
            | Open::Strikethrough
            | Open::TableCell
            | Open::Other => {}
        }
    }

    fn code_text(&mut self, text: &str) {
        let style = Style::default().fg(Color::Yellow);
        for line in text.lines() {
            self.spans.push(Span::styled(format!("  {}", line), style));
            self.flush();
        }
    }

    fn in_code_block(&self) -> bool {
        self.open.contains(&Open::CodeBlock)
    }

    fn in_item(&self) -> bool {
        self.open.contains(&Open::Item)
    }

    /// Style for inline text given the open elements.
    fn inline_style(&self) -> Style {
        self.open.iter().fold(Style::default(), |style, open| match open {
            Open::Heading(1) => style
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            Open::Heading(2) => style.fg(Color::Cyan).add_modifier(Modifier::BOLD),
            Open::Heading(_) | Open::Strong | Open::TableHead => {
                style.add_modifier(Modifier::BOLD)
            }
            Open::Emphasis => style.add_modifier(Modifier::ITALIC),
            Open::Strikethrough => style.add_modifier(Modifier::CROSSED_OUT),
            Open::Link(_) => style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            Open::BlockQuote => style.fg(Color::Gray),
            _ => style,
        })
    }

    /// Quote bars and list indentation for the current nesting.
    fn prefixed(&self, spans: Vec<Span<'static>>) -> Line<'static> {
        let quotes = self.open.iter().filter(|o| **o == Open::BlockQuote).count();
        let lists = self.counters.len().saturating_sub(1);

        let mut prefix = Vec::new();
        if quotes > 0 {
            prefix.push(Span::styled(
                "│ ".repeat(quotes),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if lists > 0 {
            prefix.push(Span::raw("  ".repeat(lists)));
        }
        prefix.extend(spans);
        Line::from(prefix)
    }

    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let line = self.prefixed(spans);
        self.lines.push(line);
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_empty() {
        assert!(render("").is_empty());
    }

    #[test]
    fn test_heading_and_paragraph() {
        let lines = render("# Hi\n\nSome *soft*\nwrapped text.");
        assert_eq!(text(&lines), vec!["Hi", "", "Some soft wrapped text."]);

        let heading = &lines[0].spans[0];
        assert!(heading.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(heading.style.fg, Some(Color::Magenta));

        let emphasis = lines[2].spans.iter().find(|s| s.content == "soft").unwrap();
        assert!(emphasis.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_lists() {
        let lines = render("- one\n- two\n\n3. three\n4. four\n");
        assert_eq!(text(&lines), vec!["• one", "• two", "", "3. three", "4. four"]);
    }

    #[test]
    fn test_nested_list_is_indented() {
        let lines = render("- outer\n  - inner\n");
        assert_eq!(text(&lines), vec!["• outer", "  • inner"]);
    }

    #[test]
    fn test_code_block() {
        let lines = render("```rust\nfn main() {}\nlet x = 1;\n```\n");
        assert_eq!(
            text(&lines),
            vec!["```rust", "  fn main() {}", "  let x = 1;"]
        );
        assert_eq!(lines[1].spans[0].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_link_shows_url() {
        let lines = render("See [docs](https://example.com) now.");
        assert_eq!(text(&lines), vec!["See docs <https://example.com> now."]);
    }

    #[test]
    fn test_block_quote_prefix() {
        let lines = render("> quoted\n");
        assert_eq!(text(&lines), vec!["│ quoted"]);
    }

    #[test]
    fn test_rule_and_inline_code() {
        let lines = render("use `x`\n\n---\n\nafter");
        let rendered = text(&lines);
        assert_eq!(rendered[0], "use x");
        assert!(rendered[2].starts_with('─'));
        assert_eq!(rendered.last().unwrap(), "after");
    }

    #[test]
    fn test_table_rows_and_cells() {
        let lines = render("| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |\n\nafter");
        assert_eq!(text(&lines), vec!["a │ b", "1 │ 2", "3 │ 4", "", "after"]);

        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[1].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }
}
