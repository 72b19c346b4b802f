use crate::state::App;
use crate::theme::{self, icons};
use chrono::{Duration, NaiveDateTime};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.size();

    if app.show_help {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        render_main(f, app, main[0]);
        render_help(f, main[1]);
    } else {
        render_main(f, app, area);
    }
}

fn render_main(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_table(f, app, chunks[1]);
    render_footer(f, app, chunks[2]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Daily Reset");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            app.now.format("%H:%M:%S").to_string(),
            theme::CLOCK_STYLE,
        )),
        Line::from(Span::styled(
            format!("Today: {}", app.now.format("%A, %d %B %Y")),
            theme::MUTED_STYLE,
        )),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn render_table(f: &mut Frame, app: &mut App, area: Rect) {
    if app.views.is_empty() {
        let message = app
            .last_error
            .clone()
            .unwrap_or_else(|| "No reminders configured".to_string());
        let block = Block::default().borders(Borders::ALL).title("Reminders");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let text = vec![
            Line::from(Span::styled(message, Color::Yellow)),
            Line::from(""),
            Line::from(format!("data dir: {}", app.store_dir().display())),
            Line::from("Add reminders with `drb add <name> --hour H`."),
            Line::from("Press r to retry, q to quit."),
        ];
        f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
        return;
    }

    let rows: Vec<Row> = app
        .views
        .iter()
        .enumerate()
        .map(|(idx, view)| {
            let icon = if view.done {
                icons::CHECK
            } else {
                icons::PENDING
            };
            let name_style = if view.done {
                Style::default()
                    .fg(theme::done_color(true))
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(Span::styled(icon, theme::done_color(view.done))),
                Cell::from(Span::styled(view.name.clone(), name_style)),
                Cell::from(view.next_reset.format("%H:%M").to_string()),
                Cell::from(Span::styled(
                    format!("in {}", format_until(view.next_reset, app.now)),
                    theme::MUTED_STYLE,
                )),
            ])
            .style(theme::zebra_row_style(idx))
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Min(12),
        Constraint::Length(6),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Reminder", "Reset", "Next"]).style(theme::HEADER_STYLE))
        .block(Block::default().borders(Borders::ALL).title("Reminders"))
        .highlight_style(theme::SELECTED_STYLE);

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let line = if let Some(error) = &app.last_error {
        Line::from(Span::styled(error.clone(), theme::ERROR_STYLE))
    } else {
        let completed = app.tracker.completed_names(app.now);
        if completed.is_empty() {
            Line::from(Span::styled(
                "No reminders completed today.",
                theme::MUTED_STYLE,
            ))
        } else {
            Line::from(vec![
                Span::styled("Completed: ", theme::MUTED_STYLE),
                Span::styled(completed.join(", "), Style::default().fg(theme::done_color(true))),
            ])
        }
    };
    f.render_widget(Paragraph::new(vec![line]), inner);
}

fn render_help(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("j / Down", Color::Cyan),
            Span::raw("   Next reminder"),
        ]),
        Line::from(vec![
            Span::styled("k / Up", Color::Cyan),
            Span::raw("     Previous reminder"),
        ]),
        Line::from(vec![
            Span::styled("x / Space", Color::Cyan),
            Span::raw("  Toggle done"),
        ]),
        Line::from(vec![
            Span::styled("R", Color::Cyan),
            Span::raw("          Reset all markers"),
        ]),
        Line::from(vec![
            Span::styled("r", Color::Cyan),
            Span::raw("          Reload from disk"),
        ]),
        Line::from(vec![
            Span::styled("?", Color::Cyan),
            Span::raw("          Toggle help"),
        ]),
        Line::from(vec![
            Span::styled("q", Color::Cyan),
            Span::raw("          Quit"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Add or edit reminders with the drb CLI.",
            theme::MUTED_STYLE,
        )),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

fn format_until(next_reset: NaiveDateTime, now: NaiveDateTime) -> String {
    let remaining: Duration = next_reset - now;
    let minutes = remaining.num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
