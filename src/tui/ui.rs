//! Stateless UI rendering for tic-tac-toe.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tictactoe_oracle::{Board, GameSession, Mark, Phase, Position, Square, WinningLine};

use super::app::{App, Screen, SetupField, SetupForm};

/// Renders whichever screen is active.
pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen() {
        Screen::Setup(form) => draw_setup(frame, form, app.notice()),
        Screen::Playing => draw_game(frame, app),
    }
}

fn draw_setup(frame: &mut Frame, form: &SetupForm, notice: Option<&str>) {
    let area = center_rect(frame.area(), 50, 14);

    let field_style = |field: SetupField| {
        if form.focus() == field {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default()
        }
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("Mode:    "),
            Span::styled(format!("< {} >", form.mode()), field_style(SetupField::Mode)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("X name:  "),
            Span::styled(form.player_one().to_string(), field_style(SetupField::PlayerOne)),
        ]),
        Line::from(vec![
            Span::raw("O name:  "),
            Span::styled(form.player_two().to_string(), field_style(SetupField::PlayerTwo)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "[ Start Game ]",
            field_style(SetupField::Start).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            notice.unwrap_or("Tab: next field  Enter: start  Esc: quit"),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let form_widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title("Game Setup")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(form_widget, area);
}

fn draw_game(frame: &mut Frame, app: &App) {
    let session = app.controller().session();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Scoreboard
            Constraint::Length(3), // Status
            Constraint::Min(11),   // Board
            Constraint::Length(2), // Help
        ])
        .split(frame.area());

    let title = Paragraph::new("Tic-Tac-Toe")
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_scoreboard(frame, chunks[1], session);

    let status_style = if app.controller().is_thinking() {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let mut status_lines = vec![Line::from(Span::styled(app.status(), status_style))];
    if let Some(notice) = app.notice() {
        status_lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(
        Paragraph::new(status_lines).alignment(Alignment::Center),
        chunks[2],
    );

    let winning_line = session.outcome().and_then(|o| o.winning_line().copied());
    draw_board(frame, chunks[3], session.board(), app.cursor(), winning_line.as_ref());

    let help = match session.phase() {
        Phase::RoundOver(_) => "p: play again  n: new game  q: quit",
        _ => "arrows/1-9: choose  enter: place  n: new game  q: quit",
    };
    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[4],
    );
}

fn draw_scoreboard(frame: &mut Frame, area: Rect, session: &GameSession) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (mark, col) in [(Mark::X, cols[0]), (Mark::O, cols[1])] {
        let Some(player) = session.player(mark) else {
            continue;
        };
        let active = session.phase() == Phase::InRound && session.to_move() == mark;
        let border = if active {
            Style::default().fg(mark_color(mark))
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let card = Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", mark), mark_style(mark)),
            Span::raw(format!("{}: {}", player.name(), player.score())),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
        frame.render_widget(card, col);
    }
}

fn draw_board(
    frame: &mut Frame,
    area: Rect,
    board: &Board,
    cursor: Position,
    winning_line: Option<&WinningLine>,
) {
    let board_area = center_rect(area, 40, 11);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(board_area);

    for (row, positions) in Position::ALL.chunks(3).enumerate() {
        let row_area = rows[row * 2];
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12),
                Constraint::Length(2),
                Constraint::Length(12),
                Constraint::Length(2),
                Constraint::Length(12),
            ])
            .split(row_area);

        for (col, &pos) in positions.iter().enumerate() {
            let highlighted = winning_line.is_some_and(|line| line.contains(pos));
            draw_cell(frame, cols[col * 2], board.get(pos), pos == cursor, highlighted);
            if col < 2 {
                frame.render_widget(
                    Paragraph::new("│").style(Style::default().fg(Color::DarkGray)),
                    cols[col * 2 + 1],
                );
            }
        }

        if row < 2 {
            frame.render_widget(
                Paragraph::new("──────────────────────────────────────")
                    .style(Style::default().fg(Color::DarkGray)),
                rows[row * 2 + 1],
            );
        }
    }
}

fn draw_cell(frame: &mut Frame, area: Rect, square: Square, is_cursor: bool, highlighted: bool) {
    let (symbol, mut style) = match square {
        Square::Empty => ("   ", Style::default().fg(Color::DarkGray)),
        Square::Occupied(Mark::X) => (" X ", mark_style(Mark::X)),
        Square::Occupied(Mark::O) => (" O ", mark_style(Mark::O)),
    };

    if highlighted {
        style = style.bg(Color::Green).fg(Color::Black);
    }
    if is_cursor {
        style = style.bg(Color::White).fg(Color::Black);
    }

    let paragraph =
        Paragraph::new(Line::from(Span::styled(symbol, style))).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn mark_color(mark: Mark) -> Color {
    match mark {
        Mark::X => Color::Blue,
        Mark::O => Color::Red,
    }
}

fn mark_style(mark: Mark) -> Style {
    Style::default()
        .fg(mark_color(mark))
        .add_modifier(Modifier::BOLD)
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}
