use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputMode, ViewMode};
use crate::admin::{frequency_label, time_label};
use crate::recurrence::Recurrence;

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Help / status
        ].as_ref())
        .split(f.area());

    let heading = format!("{} - {}", app.title, app.now.format("%a %d %b %Y %H:%M"));

    match app.view_mode {
        ViewMode::Board => {
            let rows: Vec<Row> = app
                .entries
                .iter()
                .map(|e| {
                    let status = match (&e.completed_by, e.completed_today, e.overdue) {
                        (Some(s), _, _) => format!("Done - {}", s.name),
                        (None, true, _) => "Done".to_string(),
                        (None, false, true) => "OVERDUE".to_string(),
                        _ => "Pending".to_string(),
                    };
                    let dated = matches!(e.task.recurrence, Recurrence::SpecificDate { .. });
                    let style = if e.completed_today {
                        Style::default().fg(Color::Green)
                    } else if e.overdue {
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                    } else if dated {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default()
                    };

                    Row::new(vec![
                        Cell::from(time_label(e.task.due_time.as_deref())),
                        Cell::from(e.task.title.clone()),
                        Cell::from(frequency_label(&e.task.recurrence)),
                        Cell::from(e.task.points.to_string()),
                        Cell::from(status),
                    ]).style(style)
                })
                .collect();

            let widths = [
                Constraint::Length(6),
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Length(6),
                Constraint::Length(24),
            ];

            let title = if app.entries.is_empty() {
                format!("{} - No tasks scheduled for today", heading)
            } else {
                heading
            };
            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Due", "Task", "Frequency", "Pts", "Status"])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title(title))
                .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.state);
        }
        ViewMode::Leaderboard => {
            let rows: Vec<Row> = app
                .standings
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    Row::new(vec![
                        Cell::from((i + 1).to_string()),
                        Cell::from(s.name.clone()),
                        Cell::from(s.completions.to_string()),
                        Cell::from(s.points.to_string()),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Length(6),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(8),
            ];

            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Rank", "Name", "Completions", "Points"])
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title(format!("{} - Leaderboard (this month)", app.title)));

            f.render_widget(table, chunks[0]);
        }
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Board => "q: Quit | Space/Enter: Done | u: Undo | r: Refresh | v: Leaderboard",
            ViewMode::Leaderboard => "q: Quit | r: Refresh | v: Board",
        },
        InputMode::PickStaff => "Enter: Confirm | Esc: Cancel",
    };
    let bottom = match &app.status {
        Some(msg) => format!("{} | {}", msg, help_text),
        None => help_text.to_string(),
    };

    let help = Paragraph::new(bottom)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[1]);

    if app.input_mode == InputMode::PickStaff {
        let height = (app.staff.len() as u16 + 2).min(f.area().height.saturating_sub(2)).max(3);
        let area = centered_rect(50, height, f.area());
        f.render_widget(Clear, area);

        let rows: Vec<Row> = app
            .staff
            .iter()
            .map(|s| Row::new(vec![Cell::from(s.initials()), Cell::from(s.name.clone())]))
            .collect();
        let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(10)])
            .block(Block::default().borders(Borders::ALL).title("Who did it?"))
            .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        f.render_stateful_widget(table, area, &mut app.staff_state);
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
