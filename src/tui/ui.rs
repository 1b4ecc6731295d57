//! Stateless rendering of the board view.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::app::{App, Focus};
use crate::view::{Activity, BoardView, GameView, SubBoardView};

const STUCK: &str = "No open cell in the active board. Press a for an AI move.";

const HELP: &str = "arrows move · enter play · a AI move · tab history · n new game · q quit";

/// Draws one frame.
pub fn draw(frame: &mut Frame, view: &BoardView, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(13),   // Board and history
            Constraint::Length(4), // Status
        ])
        .split(area);

    let title = Paragraph::new("Strictly Games - Super Tic Tac Toe")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    match view {
        BoardView::Loading => draw_message(frame, chunks[1], "loading", Color::Yellow),
        BoardView::Empty => draw_message(
            frame,
            chunks[1],
            "No game open. Press n to start one.",
            Color::DarkGray,
        ),
        BoardView::Board(game) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(45), Constraint::Min(20)])
                .split(chunks[1]);
            draw_board(frame, columns[0], game, app);
            draw_history(frame, columns[1], game, app);
        }
    }

    draw_status(frame, chunks[2], view);
}

/// Hint shown when the game is running but no cell accepts a move.
fn stuck_hint(game: &GameView) -> Option<&'static str> {
    (!game.winner().is_decided() && !game.has_playable_cell()).then_some(STUCK)
}

fn draw_message(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_board(frame: &mut Frame, area: Rect, game: &GameView, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5); 3])
        .split(area);

    for (row, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(15); 3])
            .split(*row_area);
        for (col, cell_area) in cols.iter().enumerate() {
            let sub = &game.sub_boards()[row * 3 + col];
            draw_sub_board(frame, *cell_area, sub, app);
        }
    }
}

fn draw_sub_board(frame: &mut Frame, area: Rect, sub: &SubBoardView, app: &App) {
    let border = if *sub.highlighted() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        match sub.activity() {
            Activity::ActivePlayable => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            Activity::ActiveFull => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            Activity::Inactive => Style::default().fg(Color::DarkGray),
        }
    };

    let cursor = app.cursor().target();
    let lines: Vec<Line> = sub
        .cells()
        .chunks(3)
        .map(|row| {
            let mut spans = Vec::with_capacity(5);
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
                }
                let symbol = if cell.symbol().is_empty() { "·" } else { cell.symbol() };
                let mut style = match cell.symbol() {
                    "X" => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
                    "O" => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    _ if cell.playable() => Style::default().fg(Color::Gray),
                    _ => Style::default().fg(Color::DarkGray),
                };
                if cell.highlighted() {
                    style = style.fg(Color::Green);
                }
                if app.focus() == Focus::Board && cell.target() == cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                spans.push(Span::styled(format!(" {} ", symbol), style));
            }
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(paragraph, area);
}

fn draw_history(frame: &mut Frame, area: Rect, game: &GameView, app: &App) {
    let focused = app.focus() == Focus::History;
    let lines: Vec<Line> = game
        .steps()
        .iter()
        .map(|step| {
            let marker = if *step.current() { "▶ " } else { "  " };
            let mut style = Style::default();
            if focused && *step.step() == app.selected_step() {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(format!("{}{}", marker, step.label()), style))
        })
        .collect();

    // Keep the selection visible in long games.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = app.selected_step().saturating_sub(visible.saturating_sub(1));

    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0)).block(
        Block::default()
            .title("History")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_status(frame: &mut Frame, area: Rect, view: &BoardView) {
    let mut lines = Vec::new();
    if let Some(game) = view.game() {
        let style = if game.winner().is_decided() {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        lines.push(Line::from(Span::styled(game.status().clone(), style)));
        if let Some(hint) = stuck_hint(game) {
            lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::Blue))));
        }
        if let Some(error) = game.last_error() {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines.push(Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray))));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}
