//! Terminal setup and rendering

use std::io::{self, stdout, Stdout};

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use todo_core::{FilterMode, FooterView, HeaderView, ItemMode, ItemView};

use crate::app::{Pane, Screen};

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

pub fn init_terminal() -> Result<Terminal> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = ratatui::Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

pub fn draw(frame: &mut Frame, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // New todo input
            Constraint::Min(3),    // List
            Constraint::Length(1), // Footer
            Constraint::Length(1), // Error banner
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let title = Paragraph::new(Line::from(Span::styled(
        "todos",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_header(frame, screen, chunks[1]);
    draw_list(frame, screen, chunks[2]);
    if let Some(footer) = &screen.snapshot.footer {
        draw_footer(frame, footer, chunks[3]);
    }
    if let Some(text) = &screen.snapshot.error_text {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(format!(" {text} "), Style::default().fg(Color::White).bg(Color::Red)),
            Span::styled("  Ctrl+x dismiss", Style::default().fg(Color::DarkGray)),
        ]));
        frame.render_widget(banner, chunks[4]);
    }
    draw_help(frame, screen, chunks[5]);
}

fn draw_header(frame: &mut Frame, screen: &Screen, area: Rect) {
    let header: &HeaderView = &screen.snapshot.header;
    let focused = screen.pane == Pane::Input && !screen.editing;

    let toggle = if !header.show_toggle_all {
        "   "
    } else if header.all_completed {
        "[x]"
    } else {
        "[ ]"
    };

    let (text, text_style) = if header.draft.is_empty() {
        ("What needs to be done?".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (header.draft.clone(), Style::default())
    };

    let border_style = if !header.input_enabled {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let input = Paragraph::new(Line::from(vec![
        Span::raw(format!("{toggle} ")),
        Span::styled(text, text_style),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(border_style));
    frame.render_widget(input, area);

    if focused && header.input_enabled {
        // Border + toggle column + space
        let typed = u16::try_from(header.draft.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(5).saturating_add(typed);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn item_line(item: &ItemView) -> Line<'static> {
    let check = if item.completed { "[x]" } else { "[ ]" };
    let mut spans = vec![Span::raw(format!("{check} "))];

    match &item.mode {
        ItemMode::Editing { draft } => {
            spans.push(Span::styled(
                format!("{draft}_"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
            ));
        }
        ItemMode::Display => {
            let style = if item.completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            spans.push(Span::styled(item.title.clone(), style));
        }
    }

    if item.loading {
        spans.push(Span::styled(" ...", Style::default().fg(Color::Cyan)));
    }
    if let Some(kind) = item.failed {
        spans.push(Span::styled(format!(" ! {kind}"), Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

fn draw_list(frame: &mut Frame, screen: &Screen, area: Rect) {
    let snapshot = &screen.snapshot;
    let focused = screen.pane == Pane::List || screen.editing;

    let mut items: Vec<ListItem> = snapshot.items.iter().map(|item| ListItem::new(item_line(item))).collect();
    if let Some(placeholder) = &snapshot.placeholder {
        items.push(ListItem::new(item_line(placeholder)).style(Style::default().fg(Color::DarkGray)));
    }

    let title = if snapshot.loading && snapshot.items.is_empty() && snapshot.placeholder.is_none() {
        "Loading..."
    } else {
        "Todos"
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(if focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(screen.selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(frame: &mut Frame, footer: &FooterView, area: Rect) {
    let mut spans = vec![Span::raw(footer.items_left_label()), Span::raw("   ")];

    for (n, mode) in FilterMode::ALL_MODES.iter().enumerate() {
        let style = if *mode == footer.filter {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("{}:{}", n + 1, mode.label()), style));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw("  "));
    let clear_style = if footer.clear_completed_enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    spans.push(Span::styled("c:Clear completed", clear_style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help(frame: &mut Frame, screen: &Screen, area: Rect) {
    let b = Style::default().add_modifier(Modifier::BOLD);
    let pairs: &[(&str, &str)] = if screen.editing {
        &[("Enter/Tab", " save  "), ("Esc", " cancel  "), ("Ctrl+c", " quit")]
    } else if screen.pane == Pane::Input {
        &[("Enter", " add  "), ("Tab", " list  "), ("Ctrl+c", " quit")]
    } else {
        &[
            ("Space", " toggle  "),
            ("e", " edit  "),
            ("d", " delete  "),
            ("a", " toggle all  "),
            ("r", " reload  "),
            ("i", " input  "),
            ("q", " quit"),
        ]
    };

    let spans: Vec<Span> = pairs
        .iter()
        .flat_map(|(key, what)| [Span::styled(*key, b), Span::raw(*what)])
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::Gray)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Position;
    use todo_core::{ErrorKind, Focus, Snapshot};

    fn item(id: i64, title: &str, completed: bool) -> ItemView {
        ItemView {
            id,
            title: title.to_string(),
            completed,
            mode: ItemMode::Display,
            loading: false,
            failed: None,
        }
    }

    fn screen() -> Screen {
        Screen {
            snapshot: Snapshot {
                header: HeaderView {
                    show_toggle_all: true,
                    all_completed: false,
                    draft: String::new(),
                    input_enabled: true,
                },
                items: vec![item(1, "Buy milk", false), item(2, "Walk dog", true)],
                placeholder: None,
                footer: Some(FooterView {
                    items_left: 1,
                    filter: FilterMode::All,
                    clear_completed_enabled: true,
                }),
                error_text: Some(ErrorKind::DeleteFailed.to_string()),
                focus: Focus::NewTodo,
                loading: false,
            },
            pane: Pane::List,
            selected: Some(0),
            editing: false,
        }
    }

    fn render(screen: &Screen) -> String {
        let mut terminal = ratatui::Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| draw(frame, screen)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_items_footer_and_banner() {
        let text = render(&screen());
        assert!(text.contains("[ ] Buy milk"));
        assert!(text.contains("[x] Walk dog"));
        assert!(text.contains("1 items left"));
        assert!(text.contains("Unable to delete a todo"));
    }

    #[test]
    fn marks_pending_and_failed_rows() {
        let mut screen = screen();
        screen.snapshot.items[0].loading = true;
        screen.snapshot.items[1].failed = Some(ErrorKind::UpdateFailed);
        let text = render(&screen);
        assert!(text.contains("Buy milk ..."));
        assert!(text.contains("! Unable to update a todo"));
    }

    #[test]
    fn oversized_draft_keeps_cursor_inside_input() {
        let mut screen = screen();
        screen.pane = Pane::Input;
        screen.snapshot.header.draft = "x".repeat(70_000);
        let mut terminal = ratatui::Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| draw(frame, &screen)).unwrap();
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor, Position::new(78, 2));
    }

    #[test]
    fn empty_list_has_no_footer() {
        let mut screen = screen();
        screen.snapshot.items.clear();
        screen.snapshot.footer = None;
        screen.snapshot.error_text = None;
        let text = render(&screen);
        assert!(!text.contains("items left"));
    }
}
